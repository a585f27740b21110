//! Paper trading executor.
//!
//! Consumes opportunity records and updates simulated per-exchange balances,
//! bounded by available funds and a safety margin. Insufficient funds is a
//! logged no-op, never an error.

use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::domain::Opportunity;

/// Simulated holdings on one exchange, in the quote and base currency of the
/// tracked pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExchangeBalance {
    pub quote: f64,
    pub base: f64,
}

pub struct PaperTrader {
    balances: Mutex<HashMap<String, ExchangeBalance>>,
    /// Fraction of each balance held back from every trade.
    safety_margin: f64,
}

impl PaperTrader {
    pub fn new(
        exchanges: &[String],
        initial_quote: f64,
        initial_base: f64,
        safety_margin: f64,
    ) -> Self {
        let balances = exchanges
            .iter()
            .map(|exchange| {
                (
                    exchange.clone(),
                    ExchangeBalance {
                        quote: initial_quote,
                        base: initial_base,
                    },
                )
            })
            .collect();

        Self {
            balances: Mutex::new(balances),
            safety_margin,
        }
    }

    pub fn balance(&self, exchange: &str) -> Option<ExchangeBalance> {
        self.balances.lock().get(exchange).copied()
    }

    /// Simulate the trade: buy base on the buy venue, sell the same amount
    /// on the sell venue. Sized by the available quote balance (after margin
    /// and buy fee) and the available base balance on the sell venue.
    pub fn execute(&self, opportunity: &Opportunity) {
        let mut balances = self.balances.lock();

        if opportunity.buy_exchange == opportunity.sell_exchange {
            warn!(exchange = %opportunity.buy_exchange, "Degenerate opportunity skipped");
            return;
        }

        let (Some(buy_balance), Some(sell_balance)) = (
            balances.get(&opportunity.buy_exchange).copied(),
            balances.get(&opportunity.sell_exchange).copied(),
        ) else {
            warn!(
                buy_exchange = %opportunity.buy_exchange,
                sell_exchange = %opportunity.sell_exchange,
                "Paper trade for unknown exchange skipped"
            );
            return;
        };

        let headroom = 1.0 - self.safety_margin;
        let available_quote = buy_balance.quote * headroom;
        let available_base = sell_balance.base * headroom;

        let base_buyable =
            available_quote * (1.0 - opportunity.fee_buy) / opportunity.buy_price;
        let base_to_trade = base_buyable.min(available_base);

        if base_to_trade <= 0.0 {
            debug!(pair = %opportunity.pair, "Insufficient funds for paper trade");
            return;
        }

        let quote_spent = base_to_trade * opportunity.buy_price / (1.0 - opportunity.fee_buy);
        let quote_received = base_to_trade * opportunity.sell_price * (1.0 - opportunity.fee_sell);
        let profit = quote_received - quote_spent;

        let mut buy = buy_balance;
        buy.quote -= quote_spent;
        buy.base += base_to_trade;
        balances.insert(opportunity.buy_exchange.clone(), buy);

        let mut sell = sell_balance;
        sell.base -= base_to_trade;
        sell.quote += quote_received;
        balances.insert(opportunity.sell_exchange.clone(), sell);

        info!(
            pair = %opportunity.pair,
            buy_exchange = %opportunity.buy_exchange,
            sell_exchange = %opportunity.sell_exchange,
            buy_price = opportunity.buy_price,
            sell_price = opportunity.sell_price,
            base_traded = base_to_trade,
            profit_quote = profit,
            "Paper trade executed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn exchanges() -> Vec<String> {
        vec!["bybit".to_string(), "okx".to_string()]
    }

    fn opportunity(buy_price: f64, sell_price: f64) -> Opportunity {
        Opportunity {
            pair: "BTC-USDT".into(),
            buy_exchange: "bybit".into(),
            sell_exchange: "okx".into(),
            buy_price,
            sell_price,
            profit_percent: 1.0,
            fee_buy: 0.001,
            fee_sell: 0.001,
            detected_at: Utc::now(),
        }
    }

    #[test]
    fn test_insufficient_base_is_noop() {
        let trader = PaperTrader::new(&exchanges(), 500.0, 0.0, 0.05);

        trader.execute(&opportunity(100.0, 105.0));

        assert_eq!(trader.balance("bybit").unwrap().quote, 500.0);
        assert_eq!(trader.balance("okx").unwrap().base, 0.0);
    }

    #[test]
    fn test_unknown_exchange_is_noop() {
        let trader = PaperTrader::new(&["okx".to_string()], 500.0, 1.0, 0.05);

        // Buy venue "bybit" has no balance entry.
        trader.execute(&opportunity(100.0, 105.0));

        assert_eq!(trader.balance("okx").unwrap().quote, 500.0);
    }

    #[test]
    fn test_funded_trade_moves_balances() {
        let trader = PaperTrader::new(&exchanges(), 500.0, 10.0, 0.0);

        trader.execute(&opportunity(100.0, 105.0));

        let buy = trader.balance("bybit").unwrap();
        let sell = trader.balance("okx").unwrap();

        // Full quote balance spent buying base; fee eats into size.
        let base_bought = 500.0 * (1.0 - 0.001) / 100.0;
        assert!((buy.base - (10.0 + base_bought)).abs() < 1e-9);
        assert!(buy.quote.abs() < 1e-9);

        // Sell venue gave up the base and received quote net of fee.
        assert!((sell.base - (10.0 - base_bought)).abs() < 1e-9);
        let quote_received = base_bought * 105.0 * (1.0 - 0.001);
        assert!((sell.quote - (500.0 + quote_received)).abs() < 1e-9);
    }

    #[test]
    fn test_safety_margin_limits_size() {
        let trader = PaperTrader::new(&exchanges(), 500.0, 10.0, 0.5);

        trader.execute(&opportunity(100.0, 105.0));

        let buy = trader.balance("bybit").unwrap();
        // Only half the quote balance was eligible.
        assert!(buy.quote >= 250.0 - 1e-9);
    }
}
