use pebble_logging::{pebble_debug, pebble_error, pebble_info, pebble_warn};

use crate::view_model::{
    BoardViewModel, MarketSummary, QuoteRowView, SortDirection, SortField, SortSpec,
};
use crate::{Effect, Quote, Symbol};

/// Monotonic request tag. Responses carrying anything but the latest issued
/// generation for their kind are discarded.
pub type Generation = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPhase {
    #[default]
    Idle,
    Fetching,
}

/// How the most recent refresh cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Populated,
    DegradedFallback,
    Failed,
}

/// Where the current filtered list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterSource {
    /// No filter; filtered mirrors canonical.
    #[default]
    All,
    /// Substring match over canonical.
    Local,
    /// Adopted from a remote symbol search.
    Remote,
}

/// Result of one quote fetch, tagged with its provenance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuoteBatch {
    pub quotes: Vec<Quote>,
    pub used_fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardState {
    symbols: Vec<Symbol>,
    canonical: Vec<Quote>,
    filter_text: String,
    filtered: Vec<Quote>,
    filter_source: FilterSource,
    selected: Option<Quote>,
    last_error: Option<String>,
    used_fallback: bool,
    last_outcome: Option<RefreshOutcome>,
    last_updated: Option<String>,
    sort: SortSpec,
    next_generation: Generation,
    refresh_generation: Generation,
    refresh_in_flight: bool,
    search_generation: Generation,
    search_in_flight: bool,
    dirty: bool,
}

impl BoardState {
    /// Creates an empty board that refreshes `symbols`.
    pub fn new(symbols: Vec<Symbol>) -> Self {
        let mut unique: Vec<Symbol> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !unique.contains(&symbol) {
                unique.push(symbol);
            }
        }
        Self {
            symbols: unique,
            ..Self::default()
        }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn canonical(&self) -> &[Quote] {
        &self.canonical
    }

    pub fn filtered(&self) -> &[Quote] {
        &self.filtered
    }

    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn filter_source(&self) -> FilterSource {
        self.filter_source
    }

    pub fn selected(&self) -> Option<&Quote> {
        self.selected.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn used_fallback(&self) -> bool {
        self.used_fallback
    }

    pub fn last_outcome(&self) -> Option<RefreshOutcome> {
        self.last_outcome
    }

    pub fn phase(&self) -> RefreshPhase {
        if self.refresh_in_flight {
            RefreshPhase::Fetching
        } else {
            RefreshPhase::Idle
        }
    }

    pub fn view(&self) -> BoardViewModel {
        let selected_symbol = self.selected.as_ref().map(|q| q.symbol.as_str());
        let mut rows: Vec<QuoteRowView> = self
            .filtered
            .iter()
            .map(|quote| QuoteRowView {
                symbol: quote.symbol.clone(),
                price: quote.price,
                change: quote.change,
                change_percent: quote.change_percent,
                volume: quote.volume,
                market_cap: quote.market_cap,
                selected: selected_symbol == Some(quote.symbol.as_str()),
            })
            .collect();
        self.sort.apply(&mut rows);

        BoardViewModel {
            phase: self.phase(),
            last_outcome: self.last_outcome,
            used_fallback: self.used_fallback,
            last_error: self.last_error.clone(),
            last_updated: self.last_updated.clone(),
            filter_text: self.filter_text.clone(),
            filter_source: self.filter_source,
            search_in_flight: self.search_in_flight,
            canonical_count: self.canonical.len(),
            summary: MarketSummary::from_quotes(&self.filtered),
            rows,
            selected: self.selected.clone(),
            sort: self.sort,
            dirty: self.dirty,
        }
    }

    /// Returns whether anything visible changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn issue_generation(&mut self) -> Generation {
        self.next_generation += 1;
        self.next_generation
    }

    /// Starts a refresh cycle. A cycle already in flight is superseded, and its
    /// response will be discarded when it arrives.
    pub(crate) fn begin_refresh(&mut self) -> Option<Effect> {
        if self.symbols.is_empty() {
            pebble_error!("refresh requested with no symbols configured");
            self.last_error = Some("No symbols configured; nothing to refresh.".to_string());
            self.last_outcome = Some(RefreshOutcome::Failed);
            self.dirty = true;
            return None;
        }

        let generation = self.issue_generation();
        if self.refresh_in_flight {
            pebble_debug!(
                "refresh {} supersedes pending refresh {}",
                generation,
                self.refresh_generation
            );
        }
        self.refresh_generation = generation;
        self.refresh_in_flight = true;
        self.dirty = true;
        pebble_info!("refresh {} issued for {} symbols", generation, self.symbols.len());
        Some(Effect::FetchQuotes {
            generation,
            symbols: self.symbols.clone(),
        })
    }

    pub(crate) fn apply_fetch(
        &mut self,
        generation: Generation,
        result: Result<QuoteBatch, String>,
        received_at: Option<String>,
    ) {
        if generation != self.refresh_generation || !self.refresh_in_flight {
            pebble_debug!(
                "discarding stale refresh {} (latest {})",
                generation,
                self.refresh_generation
            );
            return;
        }
        self.refresh_in_flight = false;
        self.dirty = true;

        let batch = match result {
            Ok(batch) if !batch.quotes.is_empty() => batch,
            Ok(_) => {
                pebble_error!("refresh {} returned an empty batch", generation);
                self.fail_refresh("Quote source returned no quotes.".to_string());
                return;
            }
            Err(reason) => {
                pebble_error!("refresh {} failed: {}", generation, reason);
                self.fail_refresh(reason);
                return;
            }
        };

        if batch.used_fallback {
            pebble_warn!("refresh {} is showing fallback data", generation);
        }
        self.canonical = batch.quotes;
        self.used_fallback = batch.used_fallback;
        self.last_error = None;
        self.last_outcome = Some(if batch.used_fallback {
            RefreshOutcome::DegradedFallback
        } else {
            RefreshOutcome::Populated
        });
        if received_at.is_some() {
            self.last_updated = received_at;
        }
        self.reapply_local_filter();
        self.revalidate_selection();
    }

    fn fail_refresh(&mut self, reason: String) {
        self.last_error = Some(reason);
        self.last_outcome = Some(RefreshOutcome::Failed);
    }

    /// Stores the filter text verbatim and returns a remote search to try, if any.
    ///
    /// The local substring filter is applied immediately so the view never
    /// shows stale rows while the search is pending.
    pub(crate) fn set_filter_text(&mut self, text: String) -> Option<Effect> {
        self.filter_text = text;
        // Issued even for an empty filter so a pending search cannot land later.
        let generation = self.issue_generation();
        self.search_generation = generation;
        self.dirty = true;
        self.reapply_local_filter();

        let query = self.filter_text.trim();
        if query.is_empty() {
            self.search_in_flight = false;
            return None;
        }
        self.search_in_flight = true;
        pebble_debug!("search {} issued for {:?}", generation, query);
        Some(Effect::SearchQuotes {
            generation,
            text: query.to_string(),
        })
    }

    pub(crate) fn apply_search(
        &mut self,
        generation: Generation,
        result: Result<Vec<Quote>, String>,
    ) {
        if generation != self.search_generation || !self.search_in_flight {
            pebble_debug!(
                "discarding stale search {} (latest {})",
                generation,
                self.search_generation
            );
            return;
        }
        self.search_in_flight = false;
        self.dirty = true;

        match result {
            Ok(quotes) if !quotes.is_empty() => {
                self.filtered = quotes;
                self.filter_source = FilterSource::Remote;
            }
            Ok(_) => {
                pebble_debug!("search {} found nothing; filtering locally", generation);
                self.reapply_local_filter();
            }
            Err(reason) => {
                pebble_warn!("search {} unavailable ({}); filtering locally", generation, reason);
                self.reapply_local_filter();
            }
        }
    }

    fn reapply_local_filter(&mut self) {
        let query = self.filter_text.trim();
        if query.is_empty() {
            self.filtered = self.canonical.clone();
            self.filter_source = FilterSource::All;
        } else {
            self.filtered = filter_by_symbol(&self.canonical, query);
            self.filter_source = FilterSource::Local;
        }
    }

    /// Selects from the filtered list first, then canonical. Unknown symbols are ignored.
    pub(crate) fn select_quote(&mut self, symbol: &str) {
        let found = self
            .filtered
            .iter()
            .chain(self.canonical.iter())
            .find(|quote| quote.has_symbol(symbol))
            .cloned();
        if let Some(quote) = found {
            self.selected = Some(quote);
            self.dirty = true;
        }
    }

    fn revalidate_selection(&mut self) {
        let Some(current) = self.selected.take() else {
            return;
        };
        self.selected = self
            .canonical
            .iter()
            .find(|quote| quote.symbol == current.symbol)
            .cloned();
        if self.selected.is_none() {
            pebble_debug!("selection {} dropped after refresh", current.symbol);
        }
    }

    pub(crate) fn sort_by(&mut self, field: SortField) {
        self.sort = if self.sort.field == field {
            SortSpec {
                field,
                direction: self.sort.direction.reversed(),
            }
        } else {
            SortSpec {
                field,
                direction: SortDirection::Ascending,
            }
        };
        self.dirty = true;
    }
}

/// Quotes whose symbol contains `query` case-insensitively, in input order.
pub fn filter_by_symbol(quotes: &[Quote], query: &str) -> Vec<Quote> {
    let needle = query.trim().to_lowercase();
    quotes
        .iter()
        .filter(|quote| quote.symbol.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
