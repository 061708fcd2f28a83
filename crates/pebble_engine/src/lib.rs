//! Pebble engine: quote acquisition, fallback data and effect execution.
mod engine;
mod fallback;
mod payload;
mod provider;
mod source;
mod types;

pub use engine::EngineHandle;
pub use fallback::{fallback_matches, fallback_quotes};
pub use payload::{
    GlobalQuoteEnvelope, GlobalQuoteRecord, PayloadError, SymbolMatch, SymbolSearchEnvelope,
};
pub use provider::{AlphaVantageProvider, ProviderSettings, QuoteProvider, DEFAULT_BASE_URL};
pub use source::{QuoteSource, SourceError, DEFAULT_SEARCH_LIMIT};
pub use types::{EngineEvent, EngineStopped, FailureKind, FetchError};
