//! Arbscan - cross-exchange spot arbitrage watcher.
//!
//! Continuously ingests live bid/ask quotes for tracked pairs from multiple
//! exchange websocket feeds, maintains the freshest quote per
//! (pair, exchange), and reports when a cross-exchange price discrepancy
//! clears a fee-adjusted profitability threshold.
//!
//! # Architecture
//!
//! - [`feed`] - Per-exchange websocket clients with infinite
//!   reconnect/backoff; each produces normalized quote updates over a
//!   channel.
//! - [`state`] - `PriceState`, the single shared store of latest quotes with
//!   readiness and staleness checks.
//! - [`evaluator`] - Fee-adjusted evaluation of every ordered venue pair,
//!   first qualifying direction wins.
//! - [`notifier`] - Fire-and-forget alerting (log always, Telegram behind
//!   the `telegram` feature) with an injectable cooldown rate limiter.
//! - [`paper`] - Simulated balance updates for detected opportunities.
//! - [`app`] - Orchestration: feeds → state → evaluator → collaborators.
//!
//! Detection never places real orders; execution is simulation-only.

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod evaluator;
pub mod feed;
pub mod notifier;
pub mod paper;
pub mod state;
