//! Bybit-style ticker feed adapter.
//!
//! Wire shape:
//! `{"topic": "tickers.BTCUSDT", "data": {"bid1Price": "...", "ask1Price": "..."}, "ts": 1700000000000}`
//!
//! Prices arrive as decimal strings and may carry only the changed side;
//! timestamps are epoch milliseconds. Subscription acks and other system
//! messages have no `topic`/`data` and are ignored.

use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::domain::QuoteUpdate;

use super::adapter::ExchangeAdapter;

const TOPIC_PREFIX: &str = "tickers.";

#[derive(Debug, Deserialize)]
struct TickerMessage {
    topic: Option<String>,
    data: Option<TickerData>,
    /// Event time in epoch milliseconds.
    ts: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    #[serde(rename = "bid1Price")]
    bid1_price: Option<String>,
    #[serde(rename = "ask1Price")]
    ask1_price: Option<String>,
}

pub struct BybitAdapter {
    name: String,
    ws_url: String,
    /// Provider symbol (`BTCUSDT`) back to canonical pair (`BTC-USDT`).
    symbol_to_pair: HashMap<String, String>,
}

impl BybitAdapter {
    pub fn new(name: String, ws_url: String, pairs: &[String]) -> Self {
        let symbol_to_pair = pairs
            .iter()
            .map(|pair| (pair.replace('-', ""), pair.clone()))
            .collect();

        Self {
            name,
            ws_url,
            symbol_to_pair,
        }
    }
}

impl ExchangeAdapter for BybitAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn ws_url(&self) -> &str {
        &self.ws_url
    }

    fn subscribe_payload(&self) -> serde_json::Value {
        let args: Vec<String> = self
            .symbol_to_pair
            .keys()
            .map(|symbol| format!("{TOPIC_PREFIX}{symbol}"))
            .collect();
        json!({ "op": "subscribe", "args": args })
    }

    fn parse(&self, raw: &str) -> Option<QuoteUpdate> {
        let message: TickerMessage = match serde_json::from_str(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(exchange = %self.name, error = %e, "Dropping malformed frame");
                return None;
            }
        };

        // Subscription acks and system messages carry no topic/data.
        let topic = message.topic?;
        let data = message.data?;

        let symbol = topic.strip_prefix(TOPIC_PREFIX)?;
        let Some(pair) = self.symbol_to_pair.get(symbol) else {
            debug!(exchange = %self.name, symbol, "Tick for untracked symbol ignored");
            return None;
        };

        let mut update = QuoteUpdate::new(pair.clone(), self.name.clone());

        if let Some(raw_bid) = data.bid1_price {
            match raw_bid.parse::<f64>() {
                Ok(bid) => update.bid = Some(bid),
                Err(e) => {
                    warn!(exchange = %self.name, raw = %raw_bid, error = %e, "Unparsable bid price, dropping frame");
                    return None;
                }
            }
        }
        if let Some(raw_ask) = data.ask1_price {
            match raw_ask.parse::<f64>() {
                Ok(ask) => update.ask = Some(ask),
                Err(e) => {
                    warn!(exchange = %self.name, raw = %raw_ask, error = %e, "Unparsable ask price, dropping frame");
                    return None;
                }
            }
        }

        if update.bid.is_none() && update.ask.is_none() {
            return None;
        }

        update.timestamp = message.ts.map(|ms| ms as f64 / 1000.0);

        Some(update)
    }
}
