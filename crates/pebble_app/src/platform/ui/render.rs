use std::fmt::Write;

use pebble_core::{
    BoardViewModel, FilterSource, QuoteRowView, RefreshOutcome, RefreshPhase, SortDirection,
    SortField,
};

const COLUMNS: [(SortField, &str); 5] = [
    (SortField::Symbol, "Symbol"),
    (SortField::Price, "Price"),
    (SortField::Change, "Change"),
    (SortField::ChangePercent, "Change %"),
    (SortField::Volume, "Volume"),
];

/// Renders the whole board as plain text.
pub fn render(view: &BoardViewModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(view));

    if let Some(error) = &view.last_error {
        let _ = writeln!(out, "! {error} (type 'r' to retry)");
    }
    if view.used_fallback {
        let _ = writeln!(out, "* live quotes unavailable; showing sample data");
    }
    if !view.filter_text.trim().is_empty() {
        let source = match (view.search_in_flight, view.filter_source) {
            (true, _) => "searching...",
            (false, FilterSource::Remote) => "search results",
            (false, _) => "local filter",
        };
        let _ = writeln!(out, "Filter: {:?} ({source})", view.filter_text);
    }

    let _ = writeln!(out);
    out.push_str(&table(view));

    let summary = view.summary;
    let _ = writeln!(
        out,
        "\nTotal {} | Gainers {} | Losers {} | Unchanged {}",
        summary.total, summary.gainers, summary.losers, summary.unchanged
    );

    if let Some(selected) = &view.selected {
        let _ = writeln!(
            out,
            "Selected {}: ${:.2} ({}) volume {}",
            selected.symbol,
            selected.price,
            format_percent(selected.change_percent),
            format_with_commas(selected.volume)
        );
        if let (Some(open), Some(high), Some(low)) = (selected.open, selected.high, selected.low) {
            let _ = writeln!(out, "  open {open:.2} high {high:.2} low {low:.2}");
        }
        if let Some(cap) = selected.market_cap {
            let _ = writeln!(out, "  market cap {}", format_compact(cap));
        }
    }
    out
}

fn status_line(view: &BoardViewModel) -> String {
    let phase = match view.phase {
        RefreshPhase::Idle => "idle",
        RefreshPhase::Fetching => "refreshing",
    };
    let outcome = match view.last_outcome {
        None => "no data yet",
        Some(RefreshOutcome::Populated) => "live",
        Some(RefreshOutcome::DegradedFallback) => "fallback",
        Some(RefreshOutcome::Failed) => "failed",
    };
    let updated = view.last_updated.as_deref().unwrap_or("never");
    format!(
        "Pebble Stocks | {} quotes | {phase} | last refresh: {outcome} | updated {updated}",
        view.canonical_count
    )
}

fn table(view: &BoardViewModel) -> String {
    if view.rows.is_empty() {
        return "No stocks found. Try adjusting your search.\n".to_string();
    }

    let mut out = String::new();
    let header: Vec<String> = COLUMNS
        .iter()
        .map(|(field, label)| {
            if *field == view.sort.field {
                let arrow = match view.sort.direction {
                    SortDirection::Ascending => '^',
                    SortDirection::Descending => 'v',
                };
                format!("{label}{arrow}")
            } else {
                label.to_string()
            }
        })
        .collect();
    let _ = writeln!(
        out,
        "  {:<9}{:>11}{:>10}{:>10}{:>10}",
        header[0], header[1], header[2], header[3], header[4]
    );
    for row in &view.rows {
        out.push_str(&format_row(row));
    }
    out
}

fn format_row(row: &QuoteRowView) -> String {
    format!(
        "{} {:<9}{:>11.2}{:>10}{:>10}{:>10}\n",
        if row.selected { '>' } else { ' ' },
        row.symbol,
        row.price,
        format_signed(row.change),
        format_percent(row.change_percent),
        format_compact(row.volume)
    )
}

pub fn format_signed(value: f64) -> String {
    if value > 0.0 {
        format!("+{value:.2}")
    } else {
        format!("{value:.2}")
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_signed(value))
}

/// `45678900` -> `45.7M`.
pub fn format_compact(value: u64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e12, "T"), (1e9, "B"), (1e6, "M"), (1e3, "K")];
    let v = value as f64;
    for (scale, suffix) in UNITS {
        if v >= scale {
            return format!("{:.1}{suffix}", v / scale);
        }
    }
    value.to_string()
}

fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
