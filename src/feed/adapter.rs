//! Exchange adapter trait and factory.
//!
//! An adapter owns everything provider-specific: the endpoint, the
//! subscription payload, and frame decoding into normalized updates. The
//! feed client stays exchange-agnostic.

use crate::config::{ExchangeConfig, ExchangeKind};
use crate::domain::QuoteUpdate;

use super::bybit::BybitAdapter;
use super::okx::OkxAdapter;

pub trait ExchangeAdapter: Send + Sync {
    /// Exchange name as keyed in price state and fee lookups.
    fn name(&self) -> &str;

    fn ws_url(&self) -> &str;

    /// Subscription request sent once immediately after connect.
    fn subscribe_payload(&self) -> serde_json::Value;

    /// Decode one inbound text frame. `Some` for a price tick on a tracked
    /// instrument, `None` for subscription acks, system messages, ticks for
    /// untracked instruments, and malformed frames (the latter are logged
    /// here, never escalated — a bad message must not kill the connection).
    fn parse(&self, raw: &str) -> Option<QuoteUpdate>;
}

/// Build the adapter for an exchange's configured wire protocol.
pub fn build_adapter(config: &ExchangeConfig, pairs: &[String]) -> Box<dyn ExchangeAdapter> {
    match config.kind {
        ExchangeKind::Bybit => Box::new(BybitAdapter::new(
            config.name.clone(),
            config.ws_url.clone(),
            pairs,
        )),
        ExchangeKind::Okx => Box::new(OkxAdapter::new(
            config.name.clone(),
            config.ws_url.clone(),
            pairs,
        )),
    }
}
