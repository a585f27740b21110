//! Opportunity notification.
//!
//! Notifiers are fire-and-forget: `notify` must never block the evaluation
//! path. Delivery failures are logged by the backend, never retried and
//! never propagated.

mod cooldown;

#[cfg(feature = "telegram")]
mod telegram;

pub use cooldown::Cooldown;

#[cfg(feature = "telegram")]
pub use telegram::{TelegramConfig, TelegramNotifier};

use tracing::info;

use crate::domain::Opportunity;

pub trait Notifier: Send + Sync {
    fn notify(&self, opportunity: &Opportunity);
}

/// Fan-out container for all configured notifiers.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn notify_all(&self, opportunity: &Opportunity) {
        for notifier in &self.notifiers {
            notifier.notify(opportunity);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs qualifying opportunities via tracing. Always registered.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, opportunity: &Opportunity) {
        info!(
            pair = %opportunity.pair,
            buy_exchange = %opportunity.buy_exchange,
            sell_exchange = %opportunity.sell_exchange,
            buy_price = opportunity.buy_price,
            sell_price = opportunity.sell_price,
            profit_percent = opportunity.profit_percent,
            "Arbitrage opportunity"
        );
    }
}
