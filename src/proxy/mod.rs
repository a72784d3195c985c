//! Fund data proxy
//!
//! Builds upstream targets from API paths and relays requests to them.

pub mod error;
pub mod forwarder;
pub mod headers;
pub mod target;

pub use error::ProxyError;
pub use forwarder::forward;
pub use target::{FundCode, ProxyTarget};
