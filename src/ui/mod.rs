//! WebSocket relay server for game clients.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::run_relay_server;
