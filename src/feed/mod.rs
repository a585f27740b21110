//! Resilient streaming feed clients.
//!
//! One `FeedClient` per exchange owns a long-lived websocket connection:
//! connect, send the subscription request, then decode inbound frames into
//! normalized [`QuoteUpdate`]s delivered over an mpsc channel, in receive
//! order, at most once per decoded frame. Any transport failure tears the
//! session down and the whole cycle restarts after an exponential backoff
//! delay; reconnection is infinite and non-fatal. A single malformed message
//! never terminates the session — the adapter drops it and the loop
//! continues.

mod adapter;
mod backoff;
mod bybit;
mod okx;

pub use adapter::{build_adapter, ExchangeAdapter};
pub use backoff::Backoff;
pub use bybit::BybitAdapter;
pub use okx::OkxAdapter;

use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::domain::QuoteUpdate;
use crate::error::Result;

/// Cheap cloneable view of a client's live transport state, for health
/// checks.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    connected: Arc<AtomicBool>,
}

impl ConnectionHandle {
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Why a session ended.
enum SessionEnd {
    /// Server closed the connection or the stream ran dry.
    Closed,
    /// The update consumer is gone; the client should stop entirely.
    ConsumerGone,
}

pub struct FeedClient {
    adapter: Box<dyn ExchangeAdapter>,
    backoff: Backoff,
    connected: Arc<AtomicBool>,
}

impl FeedClient {
    pub fn new(adapter: Box<dyn ExchangeAdapter>, backoff: Backoff) -> Self {
        Self {
            adapter,
            backoff,
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> ConnectionHandle {
        ConnectionHandle {
            connected: self.connected.clone(),
        }
    }

    /// Run the connect/receive cycle indefinitely, sending normalized
    /// updates into `tx`. Returns only when the receiving side is dropped.
    pub async fn run(mut self, tx: mpsc::UnboundedSender<QuoteUpdate>) {
        loop {
            match self.session(&tx).await {
                Ok(SessionEnd::ConsumerGone) => {
                    info!(exchange = %self.adapter.name(), "Update consumer gone, stopping feed");
                    self.connected.store(false, Ordering::SeqCst);
                    return;
                }
                Ok(SessionEnd::Closed) => {
                    warn!(exchange = %self.adapter.name(), "Connection closed by server");
                }
                Err(e) => {
                    warn!(exchange = %self.adapter.name(), error = %e, "Connection error");
                }
            }
            self.connected.store(false, Ordering::SeqCst);

            let delay = self.backoff.next_delay();
            info!(
                exchange = %self.adapter.name(),
                delay_secs = delay.as_secs(),
                "Reconnecting after delay"
            );
            sleep(delay).await;
        }
    }

    /// One connect + subscribe + receive cycle.
    async fn session(&mut self, tx: &mpsc::UnboundedSender<QuoteUpdate>) -> Result<SessionEnd> {
        info!(exchange = %self.adapter.name(), url = %self.adapter.ws_url(), "Connecting");

        let (mut ws, response) = connect_async(self.adapter.ws_url()).await?;
        info!(exchange = %self.adapter.name(), status = %response.status(), "Connected");

        let payload = serde_json::to_string(&self.adapter.subscribe_payload())?;
        ws.send(Message::Text(payload)).await?;
        info!(exchange = %self.adapter.name(), "Subscribed");

        // Backoff resets only after the full connect+subscribe cycle.
        self.connected.store(true, Ordering::SeqCst);
        self.backoff.reset();

        while let Some(frame) = ws.next().await {
            match frame? {
                Message::Text(text) => {
                    if let Some(update) = self.adapter.parse(&text) {
                        debug!(
                            exchange = %self.adapter.name(),
                            pair = %update.pair,
                            bid = ?update.bid,
                            ask = ?update.ask,
                            "Tick"
                        );
                        if tx.send(update).is_err() {
                            return Ok(SessionEnd::ConsumerGone);
                        }
                    }
                }
                Message::Ping(data) => {
                    ws.send(Message::Pong(data)).await?;
                }
                Message::Close(frame) => {
                    info!(exchange = %self.adapter.name(), frame = ?frame, "Close frame received");
                    break;
                }
                _ => {}
            }
        }

        Ok(SessionEnd::Closed)
    }
}
