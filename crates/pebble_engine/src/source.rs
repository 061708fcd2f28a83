use std::sync::Arc;

use futures_util::future::join_all;
use pebble_core::{Quote, QuoteBatch, Symbol};
use pebble_logging::{pebble_debug, pebble_info, pebble_warn};

use crate::fallback::{fallback_matches, fallback_quotes};
use crate::QuoteProvider;

/// Symbols resolved per free-text search, bounding the follow-up quote lookups.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("no symbols were requested")]
    EmptySymbolSet,
}

/// Best-effort quote acquisition that degrades to the embedded dataset
/// instead of failing.
#[derive(Clone)]
pub struct QuoteSource {
    provider: Arc<dyn QuoteProvider>,
    search_limit: usize,
}

impl QuoteSource {
    pub fn new(provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            provider,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    pub fn with_search_limit(mut self, search_limit: usize) -> Self {
        self.search_limit = search_limit.max(1);
        self
    }

    /// Looks every symbol up concurrently and keeps the trusted results in
    /// request order. If none survive, the full fallback dataset is returned.
    ///
    /// The only error is an empty request, which is caller misuse.
    pub async fn fetch_quotes(&self, symbols: &[Symbol]) -> Result<QuoteBatch, SourceError> {
        if symbols.is_empty() {
            return Err(SourceError::EmptySymbolSet);
        }
        let mut requested: Vec<&Symbol> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            if !requested.contains(&symbol) {
                requested.push(symbol);
            }
        }

        let lookups = requested.iter().map(|symbol| {
            let provider = self.provider.clone();
            async move { provider.global_quote(symbol).await }
        });
        let results = join_all(lookups).await;

        let mut quotes = Vec::with_capacity(requested.len());
        for (symbol, result) in requested.iter().zip(results) {
            let quote = match result {
                Ok(quote) => quote,
                Err(err) => {
                    pebble_debug!("no usable quote for {}: {}", symbol, err);
                    continue;
                }
            };
            if let Err(violation) = quote.check() {
                pebble_warn!("dropping untrusted quote for {}: {}", symbol, violation);
                continue;
            }
            if quotes.iter().any(|q: &Quote| q.symbol == quote.symbol) {
                pebble_warn!("dropping duplicate quote for {}", quote.symbol);
                continue;
            }
            quotes.push(quote);
        }

        if quotes.is_empty() {
            pebble_warn!(
                "all {} lookups failed; serving the fallback dataset",
                requested.len()
            );
            return Ok(QuoteBatch {
                quotes: fallback_quotes(),
                used_fallback: true,
            });
        }
        pebble_info!("resolved {}/{} quotes", quotes.len(), requested.len());
        Ok(QuoteBatch {
            quotes,
            used_fallback: false,
        })
    }

    /// Resolves free text to candidate symbols and fetches their quotes.
    ///
    /// If the provider cannot resolve the text, the fallback dataset is
    /// searched instead. If the candidates resolve but none of their quotes
    /// can be fetched, the whole fallback dataset comes back, as with any
    /// other fetch. Never fails; empty text yields nothing.
    pub async fn search_quotes(&self, text: &str) -> Vec<Quote> {
        let query = text.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let candidates = match self.provider.symbol_search(query).await {
            Ok(candidates) => candidates,
            Err(err) => {
                pebble_warn!("symbol search for {:?} failed ({}); matching fallback dataset", query, err);
                return fallback_matches(query);
            }
        };

        let mut symbols: Vec<Symbol> = Vec::new();
        for raw in &candidates {
            if symbols.len() == self.search_limit {
                break;
            }
            match Symbol::parse(raw) {
                Ok(symbol) if !symbols.contains(&symbol) => symbols.push(symbol),
                Ok(_) => {}
                Err(err) => pebble_debug!("skipping search candidate {:?}: {}", raw, err),
            }
        }
        if symbols.is_empty() {
            return Vec::new();
        }

        match self.fetch_quotes(&symbols).await {
            Ok(batch) => batch.quotes,
            Err(_) => Vec::new(),
        }
    }
}
