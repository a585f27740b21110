//! Detected arbitrage opportunity.

use chrono::{DateTime, Utc};
use std::fmt;

/// A detected, fee-adjusted, threshold-qualifying directional price
/// discrepancy between two venues.
///
/// Created only by the evaluator and immediately consumed by notifiers and
/// the paper trader; it is never retained as state.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub pair: String,
    pub buy_exchange: String,
    pub sell_exchange: String,
    /// Ask on the buy venue.
    pub buy_price: f64,
    /// Bid on the sell venue.
    pub sell_price: f64,
    /// Post-fee profit in percent, rounded to 4 decimals for reporting.
    pub profit_percent: f64,
    /// Taker fee fractions, carried for the paper trader.
    pub fee_buy: f64,
    pub fee_sell: f64,
    pub detected_at: DateTime<Utc>,
}

impl fmt::Display for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: buy {} @ {} / sell {} @ {} (+{:.4}%)",
            self.pair,
            self.buy_exchange,
            self.buy_price,
            self.sell_exchange,
            self.sell_price,
            self.profit_percent
        )
    }
}
