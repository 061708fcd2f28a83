use crate::{BoardState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: BoardState, msg: Msg) -> (BoardState, Vec<Effect>) {
    let effects = match msg {
        // The timer goes through exactly the same path as a manual refresh.
        Msg::RefreshRequested | Msg::TimerTick => state.begin_refresh().into_iter().collect(),
        Msg::FilterChanged(text) => state.set_filter_text(text).into_iter().collect(),
        Msg::QuoteSelected(symbol) => {
            state.select_quote(&symbol);
            Vec::new()
        }
        Msg::SortClicked(field) => {
            state.sort_by(field);
            Vec::new()
        }
        Msg::QuotesFetched {
            generation,
            result,
            received_at,
        } => {
            state.apply_fetch(generation, result, received_at);
            Vec::new()
        }
        Msg::SearchCompleted { generation, result } => {
            state.apply_search(generation, result);
            Vec::new()
        }
    };

    (state, effects)
}
