//! Chat-to-game round coordinator library.
//!
//! Queues chat viewers who opt in with a join command and hands the queue to
//! an external game client over a WebSocket relay when a round starts.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

// shared library
pub mod common;
