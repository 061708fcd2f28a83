//! Pebble core: pure refresh state machine and view-model helpers.
mod effect;
mod msg;
mod quote;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use quote::{Quote, QuoteViolation, Symbol, SymbolError, MAX_SYMBOL_LEN};
pub use state::{
    filter_by_symbol, BoardState, FilterSource, Generation, QuoteBatch, RefreshOutcome,
    RefreshPhase,
};
pub use update::update;
pub use view_model::{
    BoardViewModel, MarketSummary, QuoteRowView, SortDirection, SortField, SortSpec,
};
