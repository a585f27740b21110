//! Quote and normalized update types.

/// Latest known top-of-book for one (pair, exchange).
///
/// All fields are optional: a provider may have sent only one side so far,
/// or nothing at all. The evaluator never uses a quote until both sides are
/// present for every tracked exchange.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quote {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    /// Producer-side event time, seconds since epoch.
    pub timestamp: Option<f64>,
}

impl Quote {
    /// Both sides present.
    pub fn has_both_sides(&self) -> bool {
        self.bid.is_some() && self.ask.is_some()
    }

    /// Merge only the supplied fields; absent fields leave the stored value
    /// untouched. Called exclusively by `PriceState`.
    pub(crate) fn apply(&mut self, update: &QuoteUpdate) {
        if let Some(bid) = update.bid {
            self.bid = Some(bid);
        }
        if let Some(ask) = update.ask {
            self.ask = Some(ask);
        }
        if let Some(timestamp) = update.timestamp {
            self.timestamp = Some(timestamp);
        }
    }
}

/// Normalized price update produced by a feed client.
///
/// Partial ticks are legal: a provider that sends only the changed side
/// yields an update with one of `bid`/`ask` absent, never a spurious zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteUpdate {
    pub pair: String,
    pub exchange: String,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    /// Seconds since epoch (converted from provider milliseconds).
    pub timestamp: Option<f64>,
}

impl QuoteUpdate {
    pub fn new(pair: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            pair: pair.into(),
            exchange: exchange.into(),
            bid: None,
            ask: None,
            timestamp: None,
        }
    }

    pub fn with_bid(mut self, bid: f64) -> Self {
        self.bid = Some(bid);
        self
    }

    pub fn with_ask(mut self, ask: f64) -> Self {
        self.ask = Some(ask);
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_merges_only_supplied_fields() {
        let mut quote = Quote {
            bid: Some(100.0),
            ask: Some(101.0),
            timestamp: Some(1_700_000_000.0),
        };

        quote.apply(&QuoteUpdate::new("BTC-USDT", "bybit").with_bid(100.5));

        assert_eq!(quote.bid, Some(100.5));
        assert_eq!(quote.ask, Some(101.0));
        assert_eq!(quote.timestamp, Some(1_700_000_000.0));
    }

    #[test]
    fn test_has_both_sides() {
        assert!(!Quote::default().has_both_sides());

        let mut quote = Quote::default();
        quote.apply(&QuoteUpdate::new("BTC-USDT", "okx").with_ask(101.0));
        assert!(!quote.has_both_sides());

        quote.apply(&QuoteUpdate::new("BTC-USDT", "okx").with_bid(100.0));
        assert!(quote.has_both_sides());
    }
}
