//! HTTP layer: route handlers, extractors and middleware

#[cfg(feature = "image")]
pub mod auth;
pub mod constants;
pub mod middleware;
pub mod services;
