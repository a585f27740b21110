//! OKX-style ticker feed adapter.
//!
//! Wire shape:
//! `{"arg": {"channel": "tickers", "instId": "BTC-USDT"},
//!   "data": [{"bidPx": "...", "askPx": "...", "ts": "1700000000000"}]}`
//!
//! Prices and timestamps arrive as decimal strings; timestamps are epoch
//! milliseconds. Frames without a `tickers` channel or with empty `data`
//! (subscription acks, events) are ignored.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use tracing::{debug, warn};

use crate::domain::QuoteUpdate;

use super::adapter::ExchangeAdapter;

const TICKERS_CHANNEL: &str = "tickers";

#[derive(Debug, Serialize)]
struct SubscribeArg {
    channel: &'static str,
    #[serde(rename = "instId")]
    inst_id: String,
}

#[derive(Debug, Deserialize)]
struct TickerMessage {
    arg: Option<ChannelArg>,
    data: Option<Vec<TickerData>>,
}

#[derive(Debug, Deserialize)]
struct ChannelArg {
    channel: String,
    #[serde(rename = "instId")]
    inst_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    #[serde(rename = "bidPx")]
    bid_px: Option<String>,
    #[serde(rename = "askPx")]
    ask_px: Option<String>,
    /// Event time in epoch milliseconds, as a decimal string.
    ts: Option<String>,
}

pub struct OkxAdapter {
    name: String,
    ws_url: String,
    /// OKX instrument IDs match the canonical pair form directly.
    pairs: HashSet<String>,
}

impl OkxAdapter {
    pub fn new(name: String, ws_url: String, pairs: &[String]) -> Self {
        Self {
            name,
            ws_url,
            pairs: pairs.iter().cloned().collect(),
        }
    }

    fn parse_price(&self, raw: &str, side: &str) -> Option<f64> {
        match raw.parse::<f64>() {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(exchange = %self.name, side, raw, error = %e, "Unparsable price, dropping frame");
                None
            }
        }
    }
}

impl ExchangeAdapter for OkxAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn ws_url(&self) -> &str {
        &self.ws_url
    }

    fn subscribe_payload(&self) -> serde_json::Value {
        let args: Vec<SubscribeArg> = self
            .pairs
            .iter()
            .map(|pair| SubscribeArg {
                channel: TICKERS_CHANNEL,
                inst_id: pair.clone(),
            })
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

        let arg = message.arg?;
        if arg.channel != TICKERS_CHANNEL {
            return None;
        }
        let inst_id = arg.inst_id?;
        if !self.pairs.contains(&inst_id) {
            debug!(exchange = %self.name, inst_id, "Tick for untracked instrument ignored");
            return None;
        }

        // Acks repeat the arg without data; ticks carry at least one entry.
        let data = message.data?;
        let tick = data.into_iter().next()?;

        let mut update = QuoteUpdate::new(inst_id, self.name.clone());

        if let Some(raw_bid) = tick.bid_px {
            update.bid = Some(self.parse_price(&raw_bid, "bid")?);
        }
        if let Some(raw_ask) = tick.ask_px {
            update.ask = Some(self.parse_price(&raw_ask, "ask")?);
        }

        if update.bid.is_none() && update.ask.is_none() {
            return None;
        }

        update.timestamp = tick.ts.and_then(|ts| ts.parse::<f64>().ok()).map(|ms| ms / 1000.0);

        Some(update)
    }
}
