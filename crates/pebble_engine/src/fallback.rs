use pebble_core::Quote;

struct FallbackRow {
    symbol: &'static str,
    price: f64,
    change: f64,
    change_percent: f64,
    volume: u64,
    market_cap: u64,
    previous_close: f64,
    open: f64,
    high: f64,
    low: f64,
}

const FALLBACK: [FallbackRow; 12] = [
    FallbackRow { symbol: "AAPL", price: 175.43, change: 2.15, change_percent: 1.24, volume: 45_678_900, market_cap: 2_750_000_000_000, previous_close: 173.28, open: 173.50, high: 176.20, low: 172.80 },
    FallbackRow { symbol: "GOOGL", price: 142.56, change: -1.23, change_percent: -0.85, volume: 23_456_700, market_cap: 1_790_000_000_000, previous_close: 143.79, open: 144.00, high: 144.50, low: 142.00 },
    FallbackRow { symbol: "MSFT", price: 338.11, change: 4.67, change_percent: 1.40, volume: 34_567_800, market_cap: 2_510_000_000_000, previous_close: 333.44, open: 334.00, high: 339.20, low: 333.50 },
    FallbackRow { symbol: "AMZN", price: 145.24, change: 3.21, change_percent: 2.26, volume: 56_789_000, market_cap: 1_500_000_000_000, previous_close: 142.03, open: 142.50, high: 146.00, low: 142.00 },
    FallbackRow { symbol: "TSLA", price: 242.54, change: -8.76, change_percent: -3.49, volume: 78_901_200, market_cap: 770_000_000_000, previous_close: 251.30, open: 250.00, high: 252.00, low: 240.50 },
    FallbackRow { symbol: "META", price: 312.87, change: 5.43, change_percent: 1.77, volume: 23_456_700, market_cap: 790_000_000_000, previous_close: 307.44, open: 308.00, high: 314.00, low: 307.50 },
    FallbackRow { symbol: "NVDA", price: 485.09, change: 12.34, change_percent: 2.61, volume: 45_678_900, market_cap: 1_190_000_000_000, previous_close: 472.75, open: 473.00, high: 487.50, low: 471.80 },
    FallbackRow { symbol: "NFLX", price: 485.09, change: -8.76, change_percent: -1.77, volume: 34_567_800, market_cap: 215_000_000_000, previous_close: 493.85, open: 494.00, high: 495.20, low: 483.50 },
    FallbackRow { symbol: "AMD", price: 128.45, change: 3.21, change_percent: 2.56, volume: 67_890_100, market_cap: 207_000_000_000, previous_close: 125.24, open: 125.50, high: 129.00, low: 125.00 },
    FallbackRow { symbol: "INTC", price: 44.67, change: -0.89, change_percent: -1.95, volume: 45_678_900, market_cap: 189_000_000_000, previous_close: 45.56, open: 45.60, high: 45.80, low: 44.50 },
    FallbackRow { symbol: "CRM", price: 267.56, change: 5.43, change_percent: 2.07, volume: 23_456_700, market_cap: 260_000_000_000, previous_close: 262.13, open: 262.50, high: 268.00, low: 262.00 },
    FallbackRow { symbol: "ORCL", price: 125.34, change: -2.15, change_percent: -1.69, volume: 34_567_800, market_cap: 340_000_000_000, previous_close: 127.49, open: 127.50, high: 127.80, low: 125.00 },
];

impl FallbackRow {
    fn to_quote(&self) -> Quote {
        Quote {
            symbol: self.symbol.to_string(),
            price: self.price,
            change: self.change,
            change_percent: self.change_percent,
            volume: self.volume,
            market_cap: Some(self.market_cap),
            previous_close: Some(self.previous_close),
            open: Some(self.open),
            high: Some(self.high),
            low: Some(self.low),
        }
    }
}

/// The full embedded dataset, always in the same order.
pub fn fallback_quotes() -> Vec<Quote> {
    FALLBACK.iter().map(FallbackRow::to_quote).collect()
}

/// Embedded quotes whose symbol contains `text`, ignoring case.
pub fn fallback_matches(text: &str) -> Vec<Quote> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    FALLBACK
        .iter()
        .filter(|row| row.symbol.to_lowercase().contains(&needle))
        .map(FallbackRow::to_quote)
        .collect()
}
