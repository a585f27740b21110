//! Thread-safe store of the freshest known quote per (pair, exchange).
//!
//! `PriceState` is the only shared mutable object in the system. Feed clients
//! write through `update`, the evaluator and health reporter read through the
//! getters; nobody mutates quote fields directly, so partial-field merges are
//! enforced in one place.
//!
//! The tracked (pair, exchange) set is fixed at construction and never grows
//! implicitly: updates for unknown keys are logged and dropped. The lock
//! guarantees per-(pair, exchange) snapshot atomicity; readers may still
//! observe quotes from different exchanges captured at different wall-clock
//! moments, which is why staleness checking exists.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use crate::domain::{Quote, QuoteUpdate};

pub struct PriceState {
    quotes: RwLock<HashMap<String, HashMap<String, Quote>>>,
}

/// Seconds since epoch as f64, the store's timestamp convention.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

impl PriceState {
    /// Create a store tracking the cartesian product of `pairs` x `exchanges`,
    /// every quote starting empty.
    pub fn new(pairs: &[String], exchanges: &[String]) -> Self {
        let quotes = pairs
            .iter()
            .map(|pair| {
                let per_exchange = exchanges
                    .iter()
                    .map(|exchange| (exchange.clone(), Quote::default()))
                    .collect();
                (pair.clone(), per_exchange)
            })
            .collect();

        Self {
            quotes: RwLock::new(quotes),
        }
    }

    /// Merge the supplied fields into the stored quote. Updates for untracked
    /// pairs or exchanges are ignored with a warning.
    pub fn update(&self, update: &QuoteUpdate) {
        let mut quotes = self.quotes.write();

        let Some(per_exchange) = quotes.get_mut(&update.pair) else {
            warn!(pair = %update.pair, exchange = %update.exchange, "Update for untracked pair ignored");
            return;
        };
        let Some(quote) = per_exchange.get_mut(&update.exchange) else {
            warn!(pair = %update.pair, exchange = %update.exchange, "Update for untracked exchange ignored");
            return;
        };

        quote.apply(update);
    }

    /// Snapshot of one quote.
    pub fn get(&self, pair: &str, exchange: &str) -> Option<Quote> {
        self.quotes.read().get(pair)?.get(exchange).copied()
    }

    /// Snapshot of all quotes for a pair, taken under a single read lock.
    pub fn get_all_for(&self, pair: &str) -> Option<HashMap<String, Quote>> {
        self.quotes.read().get(pair).cloned()
    }

    /// True iff every tracked exchange for the pair has both bid and ask.
    /// Unknown pairs are never ready.
    pub fn is_ready(&self, pair: &str) -> bool {
        let quotes = self.quotes.read();
        match quotes.get(pair) {
            Some(per_exchange) => per_exchange.values().all(Quote::has_both_sides),
            None => false,
        }
    }

    /// True if any tracked exchange's last update is older than
    /// `timeout_secs`, or has no timestamp at all. Unknown pairs are stale.
    pub fn is_stale(&self, pair: &str, timeout_secs: f64) -> bool {
        self.is_stale_at(pair, timeout_secs, unix_now())
    }

    /// Staleness against an explicit clock reading, for deterministic tests.
    pub fn is_stale_at(&self, pair: &str, timeout_secs: f64, now: f64) -> bool {
        let quotes = self.quotes.read();
        match quotes.get(pair) {
            Some(per_exchange) => per_exchange.values().any(|quote| match quote.timestamp {
                Some(timestamp) => now - timestamp > timeout_secs,
                None => true,
            }),
            None => true,
        }
    }

    /// Age of the last update in seconds, `None` when the quote has no
    /// timestamp or the key is untracked. Used by the health reporter.
    pub fn age_seconds(&self, pair: &str, exchange: &str) -> Option<f64> {
        let timestamp = self.get(pair, exchange)?.timestamp?;
        Some(unix_now() - timestamp)
    }
}
