use std::sync::Once;

use pebble_core::{
    update, BoardState, Effect, Generation, Msg, Quote, QuoteBatch, RefreshOutcome, RefreshPhase,
    Symbol,
};
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pebble_logging::initialize_for_tests);
}

fn symbols(list: &[&str]) -> Vec<Symbol> {
    list.iter().map(|s| Symbol::parse(s).unwrap()).collect()
}

fn quote(symbol: &str, price: f64) -> Quote {
    Quote::new(symbol, price, 1.0, 0.5, 1_000)
}

fn fetch_generation(effects: &[Effect]) -> Generation {
    match effects {
        [Effect::FetchQuotes { generation, .. }] => *generation,
        other => panic!("expected a single fetch effect, got {other:?}"),
    }
}

fn deliver(state: BoardState, generation: Generation, quotes: Vec<Quote>, used_fallback: bool) -> BoardState {
    let (state, effects) = update(
        state,
        Msg::QuotesFetched {
            generation,
            result: Ok(QuoteBatch {
                quotes,
                used_fallback,
            }),
            received_at: Some("2026-10-19T10:00:00Z".to_string()),
        },
    );
    assert!(effects.is_empty());
    state
}

fn refreshed(list: &[&str]) -> BoardState {
    let state = BoardState::new(symbols(list));
    let (state, effects) = update(state, Msg::RefreshRequested);
    let generation = fetch_generation(&effects);
    let quotes = list.iter().map(|s| quote(s, 100.0)).collect();
    deliver(state, generation, quotes, false)
}

#[test]
fn refresh_emits_fetch_for_configured_symbols() {
    init_logging();
    let state = BoardState::new(symbols(&["AAPL", "GOOGL", "aapl"]));
    let (state, effects) = update(state, Msg::RefreshRequested);

    assert_eq!(
        effects,
        vec![Effect::FetchQuotes {
            generation: 1,
            symbols: symbols(&["AAPL", "GOOGL"]),
        }]
    );
    assert_eq!(state.phase(), RefreshPhase::Fetching);
    assert_eq!(state.view().phase, RefreshPhase::Fetching);
}

#[test]
fn timer_tick_follows_the_manual_refresh_path() {
    init_logging();
    let manual = update(BoardState::new(symbols(&["MSFT"])), Msg::RefreshRequested);
    let timed = update(BoardState::new(symbols(&["MSFT"])), Msg::TimerTick);

    assert_eq!(manual, timed);
}

#[test]
fn successful_fetch_replaces_canonical_and_returns_to_idle() {
    init_logging();
    let mut state = refreshed(&["AAPL", "GOOGL", "MSFT"]);

    let names: Vec<_> = state.canonical().iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(names, vec!["AAPL", "GOOGL", "MSFT"]);
    assert_eq!(state.filtered(), state.canonical());
    assert_eq!(state.phase(), RefreshPhase::Idle);
    assert_eq!(state.last_outcome(), Some(RefreshOutcome::Populated));
    assert!(!state.used_fallback());
    assert_eq!(
        state.view().last_updated.as_deref(),
        Some("2026-10-19T10:00:00Z")
    );
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn fallback_batch_is_flagged_as_degraded() {
    init_logging();
    let state = BoardState::new(symbols(&["AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META"]));
    let (state, effects) = update(state, Msg::RefreshRequested);
    let generation = fetch_generation(&effects);

    let fallback: Vec<Quote> = (0..12).map(|i| quote(&format!("SYM{i}"), 10.0)).collect();
    let state = deliver(state, generation, fallback.clone(), true);

    assert_eq!(state.canonical(), fallback.as_slice());
    assert_eq!(state.filtered().len(), 12);
    assert!(state.used_fallback());
    assert!(state.view().used_fallback);
    assert_eq!(state.last_outcome(), Some(RefreshOutcome::DegradedFallback));
    assert_eq!(state.last_error(), None);
}

#[test]
fn refresh_without_symbols_fails_and_keeps_nothing_blank() {
    init_logging();
    let state = BoardState::new(Vec::new());
    let (state, effects) = update(state, Msg::RefreshRequested);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), RefreshPhase::Idle);
    assert_eq!(state.last_outcome(), Some(RefreshOutcome::Failed));
    assert!(state.last_error().is_some());
    assert!(state.canonical().is_empty());
}

#[test]
fn failed_fetch_keeps_last_good_canonical_until_next_success() {
    init_logging();
    let state = refreshed(&["AAPL", "MSFT"]);
    let before = state.canonical().to_vec();

    let (state, effects) = update(state, Msg::RefreshRequested);
    let generation = fetch_generation(&effects);
    let (state, _) = update(
        state,
        Msg::QuotesFetched {
            generation,
            result: Err("empty symbol set".to_string()),
            received_at: None,
        },
    );

    assert_eq!(state.canonical(), before.as_slice());
    assert_eq!(state.last_error(), Some("empty symbol set"));
    assert_eq!(state.last_outcome(), Some(RefreshOutcome::Failed));
    assert_eq!(state.phase(), RefreshPhase::Idle);

    let (state, effects) = update(state, Msg::RefreshRequested);
    let generation = fetch_generation(&effects);
    let state = deliver(state, generation, vec![quote("AAPL", 1.0)], false);
    assert_eq!(state.last_error(), None);
    assert_eq!(state.canonical().len(), 1);
}

#[test]
fn empty_batch_never_blanks_the_board() {
    init_logging();
    let state = refreshed(&["AAPL", "MSFT"]);
    let (state, effects) = update(state, Msg::RefreshRequested);
    let generation = fetch_generation(&effects);
    let state = deliver(state, generation, Vec::new(), false);

    assert_eq!(state.canonical().len(), 2);
    assert_eq!(state.last_outcome(), Some(RefreshOutcome::Failed));
}

#[test]
fn stale_refresh_response_is_discarded() {
    init_logging();
    let state = BoardState::new(symbols(&["AAPL"]));
    let (state, first) = update(state, Msg::RefreshRequested);
    let (state, second) = update(state, Msg::RefreshRequested);
    let first = fetch_generation(&first);
    let second = fetch_generation(&second);
    assert!(second > first);

    // Newer request completes first.
    let state = deliver(state, second, vec![quote("AAPL", 200.0)], false);
    // Older one arrives late and must not win.
    let state = deliver(state, first, vec![quote("AAPL", 100.0)], false);

    assert_eq!(state.canonical()[0].price, 200.0);
    assert_eq!(state.phase(), RefreshPhase::Idle);
}

#[test]
fn superseded_response_keeps_fetching_until_latest_arrives() {
    init_logging();
    let state = BoardState::new(symbols(&["AAPL"]));
    let (state, first) = update(state, Msg::RefreshRequested);
    let (state, second) = update(state, Msg::RefreshRequested);

    let state = deliver(state, fetch_generation(&first), vec![quote("AAPL", 1.0)], false);
    assert_eq!(state.phase(), RefreshPhase::Fetching);
    assert!(state.canonical().is_empty());

    let state = deliver(state, fetch_generation(&second), vec![quote("AAPL", 2.0)], false);
    assert_eq!(state.phase(), RefreshPhase::Idle);
    assert_eq!(state.canonical()[0].price, 2.0);
}

#[test]
fn selection_is_revalidated_or_cleared_on_refresh() {
    init_logging();
    let state = refreshed(&["AAPL", "MSFT"]);
    let (state, _) = update(state, Msg::QuoteSelected("MSFT".to_string()));
    assert_eq!(state.selected().map(|q| q.price), Some(100.0));

    let (state, effects) = update(state, Msg::RefreshRequested);
    let state = deliver(
        state,
        fetch_generation(&effects),
        vec![quote("AAPL", 1.0), quote("MSFT", 333.0)],
        false,
    );
    assert_eq!(state.selected().map(|q| q.price), Some(333.0));

    let (state, effects) = update(state, Msg::RefreshRequested);
    let state = deliver(state, fetch_generation(&effects), vec![quote("AAPL", 1.0)], false);
    assert_eq!(state.selected(), None);
}

#[test]
fn update_does_not_touch_the_log_generation() {
    init_logging();
    let before = pebble_logging::current_generation();
    let state = BoardState::new(symbols(&["AAPL"]));

    let (state, effects) = update(state, Msg::RefreshRequested);
    let (_, search) = update(state, Msg::FilterChanged("aa".into()));

    assert_eq!(effects.len(), 1);
    assert_eq!(search.len(), 1);
    assert_eq!(pebble_logging::current_generation(), before);
}
