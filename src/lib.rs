//! Local proxy for public fund data
//!
//! Serves a static calculator page and relays a small set of fund data API
//! paths to their upstreams with browser-like headers and permissive CORS.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod proxy;
pub mod server;
