use std::time::Duration;

use futures_util::StreamExt;
use pebble_core::{Quote, Symbol};
use pebble_logging::pebble_trace;
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;

use crate::payload::{GlobalQuoteEnvelope, PayloadError, SymbolSearchEnvelope};
use crate::source::DEFAULT_SEARCH_LIMIT;
use crate::{FailureKind, FetchError};

pub const DEFAULT_BASE_URL: &str = "https://www.alphavantage.co/query";

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub allowed_content_types: Vec<String>,
    /// Upper bound on symbols resolved per search.
    pub search_limit: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "demo".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 1024 * 1024,
            allowed_content_types: vec![
                "application/json".to_string(),
                "text/json".to_string(),
            ],
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Remote quote lookups. Implementations report every failure as a
/// [`FetchError`]; deciding what to do about it is the caller's job.
#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn global_quote(&self, symbol: &Symbol) -> Result<Quote, FetchError>;

    /// Candidate symbols for free text, in provider order.
    async fn symbol_search(&self, keywords: &str) -> Result<Vec<String>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct AlphaVantageProvider {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl AlphaVantageProvider {
    pub fn new(settings: ProviderSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type.split(';').next().unwrap_or(content_type).trim();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ct))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("apikey", self.settings.api_key.as_str()));
        let url = reqwest::Url::parse_with_params(&self.settings.base_url, &query)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());
        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        pebble_trace!("{:?} returned {} bytes", params, bytes.len());

        serde_json::from_slice(&bytes)
            .map_err(|err| FetchError::new(FailureKind::Malformed, err.to_string()))
    }
}

#[async_trait::async_trait]
impl QuoteProvider for AlphaVantageProvider {
    async fn global_quote(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        let envelope: GlobalQuoteEnvelope = self
            .get_json(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol.as_str())])
            .await?;
        envelope.into_quote(symbol).map_err(map_payload_error)
    }

    async fn symbol_search(&self, keywords: &str) -> Result<Vec<String>, FetchError> {
        let envelope: SymbolSearchEnvelope = self
            .get_json(&[("function", "SYMBOL_SEARCH"), ("keywords", keywords)])
            .await?;
        envelope.into_symbols().map_err(map_payload_error)
    }
}

fn map_payload_error(err: PayloadError) -> FetchError {
    let kind = match err {
        PayloadError::Throttled(_) => FailureKind::Throttled,
        _ => FailureKind::Malformed,
    };
    FetchError::new(kind, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    // The request url carries the api key.
    let err = err.without_url();
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
