//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from routing.
//! Shared between static file serving and the upstream proxy.

pub mod cors;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    build_404_response, build_file_response, build_options_response,
    build_proxy_error_response, BoxError, ResponseBody,
};
