use crate::{Generation, Quote, QuoteBatch, SortField};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User asked for a refresh (also sent once on activation).
    RefreshRequested,
    /// The owned refresh timer fired.
    TimerTick,
    /// User edited the filter box.
    FilterChanged(String),
    /// User picked a row.
    QuoteSelected(String),
    /// User clicked a column header.
    SortClicked(SortField),
    /// A fetch issued by `Effect::FetchQuotes` finished.
    ///
    /// `Err` is produced for caller misuse or when the fetch could not be
    /// started; remote failures arrive as a fallback batch.
    QuotesFetched {
        generation: Generation,
        result: Result<QuoteBatch, String>,
        received_at: Option<String>,
    },
    /// A search issued by `Effect::SearchQuotes` finished or could not run.
    SearchCompleted {
        generation: Generation,
        result: Result<Vec<Quote>, String>,
    },
}
