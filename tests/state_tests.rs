use arbscan::domain::QuoteUpdate;
use arbscan::state::PriceState;

const PAIR: &str = "BTC-USDT";

fn tracked_state() -> PriceState {
    PriceState::new(
        &[PAIR.to_string()],
        &["bybit".to_string(), "okx".to_string()],
    )
}

#[test]
fn not_ready_until_both_sides_on_all_exchanges() {
    let state = tracked_state();
    assert!(!state.is_ready(PAIR));

    state.update(&QuoteUpdate::new(PAIR, "bybit").with_bid(100.0).with_ask(101.0));
    assert!(!state.is_ready(PAIR));

    state.update(&QuoteUpdate::new(PAIR, "okx").with_bid(100.5));
    assert!(!state.is_ready(PAIR));

    state.update(&QuoteUpdate::new(PAIR, "okx").with_ask(101.5));
    assert!(state.is_ready(PAIR));
}

#[test]
fn bid_only_update_preserves_stored_ask_and_timestamp() {
    let state = tracked_state();
    state.update(
        &QuoteUpdate::new(PAIR, "bybit")
            .with_bid(100.0)
            .with_ask(101.0)
            .with_timestamp(1_700_000_000.0),
    );

    state.update(&QuoteUpdate::new(PAIR, "bybit").with_bid(100.25));

    let quote = state.get(PAIR, "bybit").unwrap();
    assert_eq!(quote.bid, Some(100.25));
    assert_eq!(quote.ask, Some(101.0));
    assert_eq!(quote.timestamp, Some(1_700_000_000.0));
}

#[test]
fn untracked_exchange_update_is_ignored() {
    let state = tracked_state();
    state.update(&QuoteUpdate::new(PAIR, "binance").with_bid(100.0).with_ask(101.0));

    assert!(state.get(PAIR, "binance").is_none());
    assert!(!state.is_ready(PAIR));
}

#[test]
fn untracked_pair_update_is_ignored() {
    let state = tracked_state();
    state.update(&QuoteUpdate::new("ETH-USDT", "bybit").with_bid(100.0));

    assert!(state.get("ETH-USDT", "bybit").is_none());
    assert!(state.get(PAIR, "bybit").unwrap().bid.is_none());
}

#[test]
fn stale_when_any_timestamp_is_absent() {
    let state = tracked_state();
    state.update(
        &QuoteUpdate::new(PAIR, "bybit")
            .with_bid(100.0)
            .with_ask(101.0)
            .with_timestamp(1_000.0),
    );
    state.update(&QuoteUpdate::new(PAIR, "okx").with_bid(100.5).with_ask(101.5));

    assert!(state.is_stale_at(PAIR, 10.0, 1_001.0));
}

#[test]
fn stale_when_any_quote_is_too_old() {
    let state = tracked_state();
    state.update(&QuoteUpdate::new(PAIR, "bybit").with_timestamp(1_000.0));
    state.update(&QuoteUpdate::new(PAIR, "okx").with_timestamp(1_020.0));

    // bybit quote is 25s old with a 10s timeout.
    assert!(state.is_stale_at(PAIR, 10.0, 1_025.0));
}

#[test]
fn fresh_when_all_quotes_within_timeout() {
    let state = tracked_state();
    state.update(&QuoteUpdate::new(PAIR, "bybit").with_timestamp(1_000.0));
    state.update(&QuoteUpdate::new(PAIR, "okx").with_timestamp(1_002.0));

    assert!(!state.is_stale_at(PAIR, 10.0, 1_008.0));
}

#[test]
fn age_exactly_at_timeout_is_not_stale() {
    let state = tracked_state();
    state.update(&QuoteUpdate::new(PAIR, "bybit").with_timestamp(1_000.0));
    state.update(&QuoteUpdate::new(PAIR, "okx").with_timestamp(1_000.0));

    assert!(!state.is_stale_at(PAIR, 10.0, 1_010.0));
    assert!(state.is_stale_at(PAIR, 10.0, 1_010.5));
}

#[test]
fn untracked_pair_is_stale_and_never_ready() {
    let state = tracked_state();
    assert!(state.is_stale_at("ETH-USDT", 10.0, 0.0));
    assert!(!state.is_ready("ETH-USDT"));
}

#[test]
fn get_all_for_returns_every_tracked_exchange() {
    let state = tracked_state();
    state.update(&QuoteUpdate::new(PAIR, "bybit").with_bid(100.0));

    let quotes = state.get_all_for(PAIR).unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!(quotes["bybit"].bid, Some(100.0));
    assert!(quotes["okx"].bid.is_none());
}

#[test]
fn concurrent_writers_do_not_corrupt_quotes() {
    use std::sync::Arc;
    use std::thread;

    let state = Arc::new(tracked_state());
    let mut handles = Vec::new();

    for (exchange, base) in [("bybit", 100.0), ("okx", 200.0)] {
        let state = state.clone();
        handles.push(thread::spawn(move || {
            for i in 0..1_000 {
                let price = base + f64::from(i % 10);
                state.update(
                    &QuoteUpdate::new(PAIR, exchange)
                        .with_bid(price)
                        .with_ask(price + 1.0),
                );
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Each exchange only ever saw its own price band, and every stored
    // quote is a consistent bid/ask pair.
    let bybit = state.get(PAIR, "bybit").unwrap();
    let okx = state.get(PAIR, "okx").unwrap();
    assert!((100.0..110.0).contains(&bybit.bid.unwrap()));
    assert!((200.0..210.0).contains(&okx.bid.unwrap()));
    assert_eq!(bybit.ask.unwrap(), bybit.bid.unwrap() + 1.0);
    assert_eq!(okx.ask.unwrap(), okx.bid.unwrap() + 1.0);
}
