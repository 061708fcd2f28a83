use std::cmp::Ordering;

use crate::{FilterSource, Quote, RefreshOutcome, RefreshPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Symbol,
    Price,
    Change,
    ChangePercent,
    Volume,
}

impl SortField {
    /// Parses the column names accepted by the shell (`symbol`, `price`, `change`,
    /// `pct`/`percent`, `volume`).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "symbol" | "sym" => Some(Self::Symbol),
            "price" => Some(Self::Price),
            "change" => Some(Self::Change),
            "pct" | "percent" | "change%" | "changepercent" => Some(Self::ChangePercent),
            "volume" | "vol" => Some(Self::Volume),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Stable sort, so equal keys keep their filtered-list order.
    pub(crate) fn apply(&self, rows: &mut [QuoteRowView]) {
        rows.sort_by(|a, b| {
            let ordering = match self.field {
                SortField::Symbol => a.symbol.to_lowercase().cmp(&b.symbol.to_lowercase()),
                SortField::Price => cmp_f64(a.price, b.price),
                SortField::Change => cmp_f64(a.change, b.change),
                SortField::ChangePercent => cmp_f64(a.change_percent, b.change_percent),
                SortField::Volume => a.volume.cmp(&b.volume),
            };
            match self.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
    }
}

fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Gainers/losers breakdown of the filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarketSummary {
    pub total: usize,
    pub gainers: usize,
    pub losers: usize,
    pub unchanged: usize,
}

impl MarketSummary {
    pub fn from_quotes(quotes: &[Quote]) -> Self {
        quotes.iter().fold(
            Self {
                total: quotes.len(),
                ..Self::default()
            },
            |mut summary, quote| {
                if quote.change_percent > 0.0 {
                    summary.gainers += 1;
                } else if quote.change_percent < 0.0 {
                    summary.losers += 1;
                } else {
                    summary.unchanged += 1;
                }
                summary
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoardViewModel {
    pub phase: RefreshPhase,
    pub last_outcome: Option<RefreshOutcome>,
    pub used_fallback: bool,
    pub last_error: Option<String>,
    pub last_updated: Option<String>,
    pub filter_text: String,
    pub filter_source: FilterSource,
    pub search_in_flight: bool,
    pub canonical_count: usize,
    pub summary: MarketSummary,
    pub rows: Vec<QuoteRowView>,
    pub selected: Option<Quote>,
    pub sort: SortSpec,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRowView {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: u64,
    pub market_cap: Option<u64>,
    pub selected: bool,
}
