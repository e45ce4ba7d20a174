//! Relay server request handlers.

mod http;
mod websocket;

pub use http::{health_check, queue_status};
pub use websocket::websocket_handler;
