use std::fmt;
use std::str::FromStr;

/// Longest ticker identifier accepted, exchange suffix included (e.g. `TSCO.LON`).
pub const MAX_SYMBOL_LEN: usize = 12;

/// A validated, uppercase ticker identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("symbol is empty")]
    Empty,
    #[error("symbol is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },
    #[error("symbol contains invalid character {ch:?}")]
    InvalidChar { ch: char },
}

impl Symbol {
    /// Trims and uppercases `raw`, accepting ASCII alphanumerics plus `.` and `-`
    /// after a leading alphanumeric.
    pub fn parse(raw: &str) -> Result<Self, SymbolError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SymbolError::Empty);
        }
        let len = trimmed.chars().count();
        if len > MAX_SYMBOL_LEN {
            return Err(SymbolError::TooLong {
                len,
                max: MAX_SYMBOL_LEN,
            });
        }
        for (idx, ch) in trimmed.chars().enumerate() {
            let ok = ch.is_ascii_alphanumeric() || (idx > 0 && matches!(ch, '.' | '-'));
            if !ok {
                return Err(SymbolError::InvalidChar { ch });
            }
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = SymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single ticker's price, change and volume snapshot.
///
/// The optional fields are only populated when the source supplied them.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: Option<u64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteViolation {
    #[error("{field} is not a finite number")]
    NonFinite { field: &'static str },
    #[error("price {price} is negative")]
    NegativePrice { price: f64 },
    #[error("change {change} and change percent {change_percent} disagree in sign")]
    SignMismatch { change: f64, change_percent: f64 },
}

impl Quote {
    /// Builds a quote with only the required fields set.
    pub fn new(
        symbol: impl Into<String>,
        price: f64,
        change: f64,
        change_percent: f64,
        volume: u64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change,
            change_percent,
            volume,
            market_cap: None,
            previous_close: None,
            open: None,
            high: None,
            low: None,
        }
    }

    /// Checks the record-level invariants a provider response must satisfy
    /// before it is trusted.
    pub fn check(&self) -> Result<(), QuoteViolation> {
        let numbers = [
            ("price", Some(self.price)),
            ("change", Some(self.change)),
            ("change percent", Some(self.change_percent)),
            ("previous close", self.previous_close),
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
        ];
        for (field, value) in numbers {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(QuoteViolation::NonFinite { field });
            }
        }
        if self.price < 0.0 {
            return Err(QuoteViolation::NegativePrice { price: self.price });
        }
        if sign(self.change) != sign(self.change_percent) {
            return Err(QuoteViolation::SignMismatch {
                change: self.change,
                change_percent: self.change_percent,
            });
        }
        Ok(())
    }

    /// Case-insensitive symbol comparison.
    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbol.eq_ignore_ascii_case(symbol.trim())
    }
}

fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}
