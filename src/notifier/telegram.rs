//! Telegram notification backend.
//!
//! Requires the `telegram` feature. Credentials come from environment
//! variables, never the config file. Sends go through an unbounded channel
//! to a background worker so the evaluation path never waits on delivery;
//! the worker applies the cooldown and drops suppressed alerts.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::domain::Opportunity;

use super::{Cooldown, Notifier};

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// Chat ID to send alerts to.
    pub chat_id: i64,
    /// Minimum interval between sent alerts.
    pub cooldown: Duration,
}

impl TelegramConfig {
    /// Read credentials from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`.
    pub fn from_env(cooldown: Duration) -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .and_then(|s| s.parse().ok())?;

        Some(Self {
            bot_token,
            chat_id,
            cooldown,
        })
    }
}

pub struct TelegramNotifier {
    sender: mpsc::UnboundedSender<Opportunity>,
}

impl TelegramNotifier {
    /// Create the notifier and spawn its background worker.
    pub fn new(config: TelegramConfig) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::spawn(telegram_worker(config, receiver));

        Self { sender }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, opportunity: &Opportunity) {
        if self.sender.send(opportunity.clone()).is_err() {
            warn!("Telegram notifier channel closed");
        }
    }
}

async fn telegram_worker(
    config: TelegramConfig,
    mut receiver: mpsc::UnboundedReceiver<Opportunity>,
) {
    let bot = Bot::new(&config.bot_token);
    let chat_id = ChatId(config.chat_id);
    let cooldown = Cooldown::new(config.cooldown);

    info!(chat_id = config.chat_id, "Telegram notifier started");

    while let Some(opportunity) = receiver.recv().await {
        if !cooldown.try_acquire() {
            debug!(pair = %opportunity.pair, "Alert suppressed by cooldown");
            continue;
        }

        let text = format_alert(&opportunity);
        if let Err(e) = bot
            .send_message(chat_id, &text)
            .parse_mode(ParseMode::Html)
            .await
        {
            error!(error = %e, "Failed to send Telegram message");
        }
    }

    warn!("Telegram worker shutting down");
}

fn format_alert(opportunity: &Opportunity) -> String {
    format!(
        "💰 Arbitrage! <b>+{:.3}%</b>\n\n\
         📈 Route: {} → {}\n\
         🟢 Buy: {}﹩\n\
         🔴 Sell: {}﹩",
        opportunity.profit_percent,
        opportunity.buy_exchange,
        opportunity.sell_exchange,
        opportunity.buy_price,
        opportunity.sell_price,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Mutex to serialize tests that modify environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_from_env_missing_token() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");

        assert!(TelegramConfig::from_env(Duration::from_secs(30)).is_none());
    }

    #[test]
    fn test_from_env_invalid_chat_id() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "test-token");
        std::env::set_var("TELEGRAM_CHAT_ID", "not-a-number");

        assert!(TelegramConfig::from_env(Duration::from_secs(30)).is_none());

        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }

    #[test]
    fn test_from_env_valid() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "test-token");
        std::env::set_var("TELEGRAM_CHAT_ID", "12345");

        let config = TelegramConfig::from_env(Duration::from_secs(30)).unwrap();
        assert_eq!(config.bot_token, "test-token");
        assert_eq!(config.chat_id, 12345);

        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }

    #[test]
    fn test_format_alert() {
        let text = format_alert(&Opportunity {
            pair: "BTC-USDT".into(),
            buy_exchange: "bybit".into(),
            sell_exchange: "okx".into(),
            buy_price: 100.0,
            sell_price: 105.0,
            profit_percent: 4.7852,
            fee_buy: 0.001,
            fee_sell: 0.001,
            detected_at: Utc::now(),
        });

        assert!(text.contains("+4.785%"));
        assert!(text.contains("bybit → okx"));
    }
}
