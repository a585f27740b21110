//! Fee-adjusted arbitrage evaluation.
//!
//! For a pair with ready quotes, the evaluator enumerates every ordered
//! (buy venue, sell venue) combination and returns the first direction whose
//! post-fee profit meets the configured threshold. First-qualifying, not
//! best-of-all: enumeration follows the configured exchange order, so the
//! reported opportunity is reproducible for a given state.
//!
//! Missing sides, non-positive prices, and unknown fee entries skip the
//! direction; nothing in here can fail an evaluation.

use chrono::Utc;
use std::collections::HashMap;

use crate::domain::{Opportunity, Quote};
use crate::state::PriceState;

/// Immutable taker-fee fractions per exchange. Unknown exchanges pay no fee.
#[derive(Debug, Clone, Default)]
pub struct FeeModel {
    fees: HashMap<String, f64>,
}

impl FeeModel {
    pub fn new(fees: HashMap<String, f64>) -> Self {
        Self { fees }
    }

    pub fn taker_fee(&self, exchange: &str) -> f64 {
        self.fees.get(exchange).copied().unwrap_or(0.0)
    }
}

/// Profit is reported to 4 decimal places.
const PROFIT_ROUND_SCALE: f64 = 10_000.0;

pub struct Evaluator {
    fees: FeeModel,
    min_profit_percent: f64,
    /// Fixed enumeration order; owned copy, not a live config reference.
    exchanges: Vec<String>,
}

impl Evaluator {
    pub fn new(fees: FeeModel, min_profit_percent: f64, exchanges: Vec<String>) -> Self {
        Self {
            fees,
            min_profit_percent,
            exchanges,
        }
    }

    /// Evaluate the current state for `pair`, returning the first qualifying
    /// direction or `None`. Pure over the snapshot it takes; repeated calls
    /// against unchanged state return the same result.
    pub fn evaluate(&self, pair: &str, state: &PriceState) -> Option<Opportunity> {
        let quotes = state.get_all_for(pair)?;

        for buy_exchange in &self.exchanges {
            for sell_exchange in &self.exchanges {
                if buy_exchange == sell_exchange {
                    continue;
                }
                if let Some(opportunity) =
                    self.evaluate_direction(pair, buy_exchange, sell_exchange, &quotes)
                {
                    return Some(opportunity);
                }
            }
        }

        None
    }

    fn evaluate_direction(
        &self,
        pair: &str,
        buy_exchange: &str,
        sell_exchange: &str,
        quotes: &HashMap<String, Quote>,
    ) -> Option<Opportunity> {
        let ask = quotes.get(buy_exchange)?.ask?;
        let bid = quotes.get(sell_exchange)?.bid?;

        if ask <= 0.0 || bid <= 0.0 {
            return None;
        }

        let fee_buy = self.fees.taker_fee(buy_exchange);
        let fee_sell = self.fees.taker_fee(sell_exchange);

        let adjusted_ask = ask * (1.0 + fee_buy);
        let adjusted_bid = bid * (1.0 - fee_sell);

        // No gross profit after fees, skip before the threshold test.
        if adjusted_ask >= adjusted_bid {
            return None;
        }

        let profit_percent = (adjusted_bid - adjusted_ask) / adjusted_ask * 100.0;

        // Threshold compares the unrounded value; rounding is display-only.
        if profit_percent < self.min_profit_percent {
            return None;
        }

        Some(Opportunity {
            pair: pair.to_string(),
            buy_exchange: buy_exchange.to_string(),
            sell_exchange: sell_exchange.to_string(),
            buy_price: ask,
            sell_price: bid,
            profit_percent: (profit_percent * PROFIT_ROUND_SCALE).round() / PROFIT_ROUND_SCALE,
            fee_buy,
            fee_sell,
            detected_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_exchange_pays_no_fee() {
        let model = FeeModel::new(HashMap::from([("bybit".to_string(), 0.0018)]));
        assert_eq!(model.taker_fee("bybit"), 0.0018);
        assert_eq!(model.taker_fee("unknown"), 0.0);
    }
}
