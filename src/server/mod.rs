//! HTTP server for the proxy.
//!
//! - [`proxy_api`]: Request/response types, route handlers and router

pub mod proxy_api;
