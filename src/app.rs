//! Application orchestration.
//!
//! Wires feed clients into the price state and runs the evaluation step
//! after each accepted update. Feed clients each run in their own task and
//! deliver normalized updates over a single mpsc channel; the consume loop
//! here is the only writer path into `PriceState` evaluation. Opportunities
//! are handed to the notifiers fire-and-forget and, when enabled, to the
//! paper trader.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::evaluator::{Evaluator, FeeModel};
use crate::feed::{build_adapter, Backoff, ConnectionHandle, FeedClient};
use crate::notifier::{LogNotifier, NotifierRegistry};
use crate::paper::PaperTrader;
use crate::state::PriceState;

#[cfg(feature = "telegram")]
use crate::notifier::{TelegramConfig, TelegramNotifier};

/// Main application struct.
pub struct App;

impl App {
    /// Run the ingest/evaluate loop until the update channel drains (which
    /// only happens at shutdown, when every feed task has stopped).
    pub async fn run(config: Config) -> Result<()> {
        let pairs = config.pairs.clone();
        let exchange_names: Vec<String> =
            config.exchanges.iter().map(|e| e.name.clone()).collect();

        let state = Arc::new(PriceState::new(&pairs, &exchange_names));

        let fees = FeeModel::new(
            config
                .exchanges
                .iter()
                .map(|e| (e.name.clone(), e.taker_fee))
                .collect::<HashMap<_, _>>(),
        );
        let evaluator = Evaluator::new(
            fees,
            config.scanner.min_profit_percent,
            exchange_names.clone(),
        );

        let notifiers = build_notifier_registry(&config);
        info!(notifiers = notifiers.len(), "Notifiers initialized");

        let paper = config.paper.enabled.then(|| {
            info!("Paper trading enabled");
            PaperTrader::new(
                &exchange_names,
                config.paper.initial_quote,
                config.paper.initial_base,
                config.paper.safety_margin,
            )
        });

        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut handles = Vec::new();

        for exchange in &config.exchanges {
            let adapter = build_adapter(exchange, &pairs);
            let backoff = Backoff::new(
                Duration::from_secs(config.backoff.initial_secs),
                Duration::from_secs(config.backoff.max_secs),
            );
            let client = FeedClient::new(adapter, backoff);
            handles.push((exchange.name.clone(), client.handle()));

            info!(exchange = %exchange.name, "Starting feed client");
            tokio::spawn(client.run(tx.clone()));
        }
        drop(tx);

        tokio::spawn(health_loop(
            Duration::from_secs(config.health.interval_secs),
            handles,
            state.clone(),
            pairs.clone(),
        ));

        let timeout_secs = config.scanner.staleness_timeout_secs;

        while let Some(update) = rx.recv().await {
            let pair = update.pair.clone();
            state.update(&update);

            if !state.is_ready(&pair) {
                continue;
            }
            if state.is_stale(&pair, timeout_secs) {
                debug!(pair = %pair, "Quotes too stale to evaluate");
                continue;
            }

            if let Some(opportunity) = evaluator.evaluate(&pair, &state) {
                notifiers.notify_all(&opportunity);
                if let Some(trader) = &paper {
                    trader.execute(&opportunity);
                }
            }
        }

        Ok(())
    }
}

/// Build the notifier registry from configuration.
fn build_notifier_registry(config: &Config) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();

    registry.register(Box::new(LogNotifier));

    #[cfg(feature = "telegram")]
    if config.telegram.enabled {
        let cooldown = Duration::from_secs_f64(config.telegram.cooldown_secs);
        if let Some(tg_config) = TelegramConfig::from_env(cooldown) {
            registry.register(Box::new(TelegramNotifier::new(tg_config)));
            info!("Telegram notifier enabled");
        } else {
            tracing::warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    #[cfg(not(feature = "telegram"))]
    let _ = config;

    registry
}

/// Periodically log transport state and quote ages per exchange.
async fn health_loop(
    interval: Duration,
    handles: Vec<(String, ConnectionHandle)>,
    state: Arc<PriceState>,
    pairs: Vec<String>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; skip it so the report reflects a
    // running system.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        for (exchange, handle) in &handles {
            for pair in &pairs {
                info!(
                    exchange = %exchange,
                    pair = %pair,
                    connected = handle.is_connected(),
                    age_secs = ?state.age_seconds(pair, exchange),
                    "Feed health"
                );
            }
        }
    }
}
