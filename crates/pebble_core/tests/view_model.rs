use pebble_core::{
    update, BoardState, Effect, MarketSummary, Msg, Quote, QuoteBatch, SortDirection, SortField,
    Symbol,
};
use pretty_assertions::assert_eq;

fn board(quotes: Vec<Quote>) -> BoardState {
    let symbols = quotes
        .iter()
        .map(|q| Symbol::parse(&q.symbol).unwrap())
        .collect();
    let (state, effects) = update(BoardState::new(symbols), Msg::RefreshRequested);
    let generation = match effects.as_slice() {
        [Effect::FetchQuotes { generation, .. }] => *generation,
        other => panic!("unexpected effects {other:?}"),
    };
    let (state, _) = update(
        state,
        Msg::QuotesFetched {
            generation,
            result: Ok(QuoteBatch {
                quotes,
                used_fallback: false,
            }),
            received_at: None,
        },
    );
    state
}

fn sample() -> Vec<Quote> {
    vec![
        Quote::new("msft", 338.11, 4.67, 1.40, 300),
        Quote::new("AAPL", 175.43, 2.15, 1.24, 100),
        Quote::new("TSLA", 242.54, -8.76, -3.49, 200),
        Quote::new("IBM", 150.00, 0.0, 0.0, 50),
    ]
}

fn row_symbols(state: &BoardState) -> Vec<String> {
    state.view().rows.into_iter().map(|row| row.symbol).collect()
}

#[test]
fn rows_default_to_symbol_ascending_case_insensitive() {
    let state = board(sample());
    assert_eq!(row_symbols(&state), vec!["AAPL", "IBM", "msft", "TSLA"]);
    // Sorting is a view concern; the filtered list keeps fetch order.
    assert_eq!(state.filtered()[0].symbol, "msft");
}

#[test]
fn sort_clicks_toggle_direction_on_same_field() {
    let state = board(sample());
    let (state, _) = update(state, Msg::SortClicked(SortField::Price));
    assert_eq!(row_symbols(&state), vec!["IBM", "AAPL", "TSLA", "msft"]);

    let (state, _) = update(state, Msg::SortClicked(SortField::Price));
    assert_eq!(state.view().sort.direction, SortDirection::Descending);
    assert_eq!(row_symbols(&state), vec!["msft", "TSLA", "AAPL", "IBM"]);

    let (state, _) = update(state, Msg::SortClicked(SortField::Volume));
    assert_eq!(state.view().sort.direction, SortDirection::Ascending);
    assert_eq!(row_symbols(&state), vec!["IBM", "AAPL", "TSLA", "msft"]);
}

#[test]
fn summary_counts_gainers_losers_and_unchanged() {
    let state = board(sample());
    assert_eq!(
        state.view().summary,
        MarketSummary {
            total: 4,
            gainers: 2,
            losers: 1,
            unchanged: 1,
        }
    );
}

#[test]
fn selected_row_is_marked() {
    let state = board(sample());
    let (state, _) = update(state, Msg::QuoteSelected("tsla".to_string()));
    let view = state.view();
    let marked: Vec<_> = view.rows.iter().filter(|r| r.selected).map(|r| r.symbol.as_str()).collect();
    assert_eq!(marked, vec!["TSLA"]);
    assert_eq!(view.selected.map(|q| q.price), Some(242.54));
}

#[test]
fn sort_field_names_parse() {
    assert_eq!(SortField::from_name("PCT"), Some(SortField::ChangePercent));
    assert_eq!(SortField::from_name(" vol "), Some(SortField::Volume));
    assert_eq!(SortField::from_name("market"), None);
}
