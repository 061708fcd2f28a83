use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pebble_core::{Quote, Symbol};
use pebble_engine::{
    fallback_quotes, FailureKind, FetchError, QuoteProvider, QuoteSource, SourceError,
};
use pretty_assertions::assert_eq;

/// In-process provider with canned answers and optional per-symbol delays.
#[derive(Default)]
struct FakeProvider {
    quotes: HashMap<String, Result<Quote, FailureKind>>,
    delays: HashMap<String, Duration>,
    search: Option<Result<Vec<String>, FailureKind>>,
    calls: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn with_quote(mut self, quote: Quote) -> Self {
        self.quotes.insert(quote.symbol.clone(), Ok(quote));
        self
    }

    fn with_failure(mut self, symbol: &str, kind: FailureKind) -> Self {
        self.quotes.insert(symbol.to_string(), Err(kind));
        self
    }

    fn with_delay(mut self, symbol: &str, delay: Duration) -> Self {
        self.delays.insert(symbol.to_string(), delay);
        self
    }

    fn with_search(mut self, result: Result<Vec<&str>, FailureKind>) -> Self {
        self.search = Some(result.map(|list| list.into_iter().map(String::from).collect()));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl QuoteProvider for FakeProvider {
    async fn global_quote(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        self.calls.lock().unwrap().push(symbol.to_string());
        if let Some(delay) = self.delays.get(symbol.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        match self.quotes.get(symbol.as_str()) {
            Some(Ok(quote)) => Ok(quote.clone()),
            Some(Err(kind)) => Err(FetchError {
                kind: kind.clone(),
                message: "canned failure".into(),
            }),
            None => Err(FetchError {
                kind: FailureKind::Malformed,
                message: "missing field \"05. price\"".into(),
            }),
        }
    }

    async fn symbol_search(&self, _keywords: &str) -> Result<Vec<String>, FetchError> {
        match &self.search {
            Some(Ok(list)) => Ok(list.clone()),
            Some(Err(kind)) => Err(FetchError {
                kind: kind.clone(),
                message: "canned failure".into(),
            }),
            None => Err(FetchError {
                kind: FailureKind::Network,
                message: "offline".into(),
            }),
        }
    }
}

fn symbols(list: &[&str]) -> Vec<Symbol> {
    list.iter().map(|s| Symbol::parse(s).unwrap()).collect()
}

fn quote(symbol: &str, price: f64) -> Quote {
    Quote::new(symbol, price, 1.5, 0.8, 1_000)
}

fn source(provider: FakeProvider) -> (QuoteSource, Arc<FakeProvider>) {
    let provider = Arc::new(provider);
    (QuoteSource::new(provider.clone()), provider)
}

fn names(quotes: &[Quote]) -> Vec<&str> {
    quotes.iter().map(|q| q.symbol.as_str()).collect()
}

#[tokio::test]
async fn empty_symbol_set_is_caller_misuse() {
    let (source, provider) = source(FakeProvider::default());
    assert_eq!(
        source.fetch_quotes(&[]).await,
        Err(SourceError::EmptySymbolSet)
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn total_failure_returns_the_exact_fallback_dataset() {
    let provider = FakeProvider::default()
        .with_failure("AAPL", FailureKind::Timeout)
        .with_failure("GOOGL", FailureKind::HttpStatus(503))
        .with_failure("MSFT", FailureKind::Throttled);
    let (source, _) = source(provider);

    let batch = source
        .fetch_quotes(&symbols(&["AAPL", "GOOGL", "MSFT"]))
        .await
        .unwrap();

    assert!(batch.used_fallback);
    assert_eq!(batch.quotes, fallback_quotes());
}

#[tokio::test]
async fn partial_failure_keeps_only_valid_quotes_in_request_order() {
    let provider = FakeProvider::default()
        .with_quote(quote("AAPL", 175.0))
        .with_failure("GOOGL", FailureKind::Network)
        .with_quote(quote("MSFT", 338.0));
    let (source, _) = source(provider);

    let batch = source
        .fetch_quotes(&symbols(&["MSFT", "GOOGL", "AAPL"]))
        .await
        .unwrap();

    assert!(!batch.used_fallback);
    assert_eq!(names(&batch.quotes), vec!["MSFT", "AAPL"]);
}

#[tokio::test]
async fn lookups_run_concurrently_and_are_joined_in_request_order() {
    let provider = FakeProvider::default()
        .with_quote(quote("AAPL", 1.0))
        .with_quote(quote("MSFT", 2.0))
        .with_quote(quote("NVDA", 3.0))
        .with_delay("AAPL", Duration::from_millis(150))
        .with_delay("MSFT", Duration::from_millis(150))
        .with_delay("NVDA", Duration::from_millis(150));
    let (source, _) = source(provider);

    let started = std::time::Instant::now();
    let batch = source
        .fetch_quotes(&symbols(&["NVDA", "AAPL", "MSFT"]))
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_millis(400));
    assert_eq!(names(&batch.quotes), vec!["NVDA", "AAPL", "MSFT"]);
}

#[tokio::test]
async fn duplicate_symbols_are_looked_up_once() {
    let (source, provider) = source(FakeProvider::default().with_quote(quote("AAPL", 1.0)));
    let batch = source
        .fetch_quotes(&symbols(&["AAPL", "aapl"]))
        .await
        .unwrap();

    assert_eq!(names(&batch.quotes), vec!["AAPL"]);
    assert_eq!(provider.calls(), vec!["AAPL"]);
}

#[tokio::test]
async fn sign_mismatch_is_dropped_at_the_boundary() {
    let provider = FakeProvider::default()
        .with_quote(Quote::new("AAPL", 10.0, 1.0, -1.0, 5))
        .with_quote(quote("MSFT", 20.0));
    let (source, _) = source(provider);

    let batch = source
        .fetch_quotes(&symbols(&["AAPL", "MSFT"]))
        .await
        .unwrap();

    assert_eq!(names(&batch.quotes), vec!["MSFT"]);
    for quote in &batch.quotes {
        assert_eq!(quote.change.signum(), quote.change_percent.signum());
    }
}

#[tokio::test]
async fn only_untrusted_quotes_degrade_to_fallback() {
    let provider = FakeProvider::default().with_quote(Quote::new("AAPL", 10.0, -1.0, 2.0, 5));
    let (source, _) = source(provider);

    let batch = source.fetch_quotes(&symbols(&["AAPL"])).await.unwrap();
    assert!(batch.used_fallback);
    assert_eq!(batch.quotes.len(), 12);
}

#[tokio::test]
async fn failed_resolution_matches_the_fallback_dataset() {
    let (source, provider) =
        source(FakeProvider::default().with_search(Err(FailureKind::Timeout)));

    let found = source.search_quotes("  ms ").await;

    assert_eq!(names(&found), vec!["MSFT"]);
    assert!(provider.calls().is_empty());
    assert!(source.search_quotes("qqqq").await.is_empty());
}

#[tokio::test]
async fn blank_search_text_does_nothing() {
    let (source, provider) = source(FakeProvider::default().with_search(Ok(vec!["AAPL"])));
    assert!(source.search_quotes("   ").await.is_empty());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn search_fetches_at_most_five_candidates_in_provider_order() {
    let provider = FakeProvider::default()
        .with_search(Ok(vec!["TSLA", "bad symbol", "TL0.DEX", "TSLA", "T", "TXN", "TT", "TTD"]))
        .with_quote(quote("TSLA", 242.0))
        .with_quote(quote("T", 17.0))
        .with_quote(quote("TXN", 160.0))
        .with_quote(quote("TT", 300.0))
        .with_quote(quote("TTD", 70.0));
    let (source, provider) = source(provider);

    let found = source.search_quotes("t").await;

    assert_eq!(provider.calls(), vec!["TSLA", "TL0.DEX", "T", "TXN", "TT"]);
    assert_eq!(names(&found), vec!["TSLA", "T", "TXN", "TT"]);
}

#[tokio::test]
async fn search_with_no_matches_is_empty() {
    let (source, _) = source(FakeProvider::default().with_search(Ok(Vec::new())));
    assert!(source.search_quotes("nothing").await.is_empty());
}

#[tokio::test]
async fn search_returns_the_full_fallback_when_candidate_lookups_fail() {
    let provider = FakeProvider::default()
        .with_search(Ok(vec!["NFLX34.SAO"]))
        .with_failure("NFLX34.SAO", FailureKind::Timeout);
    let (source, provider) = source(provider);

    let found = source.search_quotes("netflix").await;

    assert_eq!(provider.calls(), vec!["NFLX34.SAO"]);
    assert_eq!(found, fallback_quotes());
    assert_eq!(found.len(), 12);
}
