//! Typed shapes of the quote provider's JSON bodies.
//!
//! Every field is optional at the serde level so that a partial body still
//! deserializes; conversion into a [`Quote`] then decides which fields are
//! required. Absent required fields reject the record rather than defaulting.

use pebble_core::{Quote, Symbol};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("missing field {field:?}")]
    MissingField { field: &'static str },
    #[error("field {field:?} is not numeric: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("response has no {section:?} section")]
    MissingSection { section: &'static str },
    #[error("provider throttled the request: {0}")]
    Throttled(String),
    #[error("provider rejected the request: {0}")]
    Rejected(String),
}

/// Notes the provider sends instead of data (rate limits, bad keys, bad params).
#[derive(Debug, Clone, Default, Deserialize)]
struct ProviderNotice {
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

impl ProviderNotice {
    fn into_error(self) -> Option<PayloadError> {
        if let Some(message) = self.error_message {
            return Some(PayloadError::Rejected(message));
        }
        self.note
            .or(self.information)
            .map(PayloadError::Throttled)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuoteEnvelope {
    #[serde(rename = "Global Quote")]
    pub global_quote: Option<GlobalQuoteRecord>,
    #[serde(flatten)]
    notice: ProviderNotice,
}

impl GlobalQuoteEnvelope {
    /// Extracts the quote for `requested`, which also becomes the quote's symbol.
    pub fn into_quote(self, requested: &Symbol) -> Result<Quote, PayloadError> {
        match self.global_quote {
            Some(record) => record.into_quote(requested),
            None => Err(self.notice.into_error().unwrap_or(PayloadError::MissingSection {
                section: "Global Quote",
            })),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalQuoteRecord {
    #[serde(rename = "01. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "02. open")]
    pub open: Option<String>,
    #[serde(rename = "03. high")]
    pub high: Option<String>,
    #[serde(rename = "04. low")]
    pub low: Option<String>,
    #[serde(rename = "05. price")]
    pub price: Option<String>,
    #[serde(rename = "06. volume")]
    pub volume: Option<String>,
    #[serde(rename = "07. latest trading day")]
    pub latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    pub previous_close: Option<String>,
    #[serde(rename = "09. change")]
    pub change: Option<String>,
    #[serde(rename = "10. change percent")]
    pub change_percent: Option<String>,
}

impl GlobalQuoteRecord {
    pub fn into_quote(self, requested: &Symbol) -> Result<Quote, PayloadError> {
        // An unknown symbol comes back as an empty object; price is checked
        // first so that case reports the field callers care about.
        let price = required_decimal("05. price", self.price.as_deref())?;
        let change = required_decimal("09. change", self.change.as_deref())?;
        let change_percent = required_decimal(
            "10. change percent",
            self.change_percent
                .as_deref()
                .map(|raw| raw.trim().trim_end_matches('%')),
        )?;
        let volume = match self.volume.as_deref().map(str::trim) {
            None | Some("") => return Err(PayloadError::MissingField { field: "06. volume" }),
            Some(raw) => raw.parse::<u64>().map_err(|_| PayloadError::InvalidNumber {
                field: "06. volume",
                value: raw.to_string(),
            })?,
        };

        Ok(Quote {
            symbol: requested.to_string(),
            price,
            change,
            change_percent,
            volume,
            market_cap: None,
            previous_close: optional_decimal("08. previous close", self.previous_close.as_deref())?,
            open: optional_decimal("02. open", self.open.as_deref())?,
            high: optional_decimal("03. high", self.high.as_deref())?,
            low: optional_decimal("04. low", self.low.as_deref())?,
        })
    }
}

fn required_decimal(field: &'static str, raw: Option<&str>) -> Result<f64, PayloadError> {
    optional_decimal(field, raw)?.ok_or(PayloadError::MissingField { field })
}

fn optional_decimal(field: &'static str, raw: Option<&str>) -> Result<Option<f64>, PayloadError> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(PayloadError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolSearchEnvelope {
    #[serde(rename = "bestMatches")]
    pub best_matches: Option<Vec<SymbolMatch>>,
    #[serde(flatten)]
    notice: ProviderNotice,
}

impl SymbolSearchEnvelope {
    /// Candidate symbols in provider order. Matches without a symbol are skipped.
    pub fn into_symbols(self) -> Result<Vec<String>, PayloadError> {
        match self.best_matches {
            Some(matches) => Ok(matches
                .into_iter()
                .filter_map(|m| m.symbol)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()),
            None => Err(self.notice.into_error().unwrap_or(PayloadError::MissingSection {
                section: "bestMatches",
            })),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolMatch {
    #[serde(rename = "1. symbol")]
    pub symbol: Option<String>,
    #[serde(rename = "2. name")]
    pub name: Option<String>,
    #[serde(rename = "4. region")]
    pub region: Option<String>,
    #[serde(rename = "9. matchScore")]
    pub match_score: Option<String>,
}
