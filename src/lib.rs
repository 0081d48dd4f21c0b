//! geoguard - two small HTTP services sharing one toolbox
//!
//! - **geo**: `GET /geo` returns the visitor's location from a local
//!   MaxMind database
//! - **image**: `GET /serve-image` streams a whitelisted image to an
//!   authenticated session
//!
//! # Architecture
//! - `api`: HTTP handlers, extractors and middleware
//! - `services`: GeoIP reader, image directory, session store
//! - `config`: TOML + environment configuration
//! - `runtime`: entry points for each command
//! - `system`: logging and panic handling
//! - `utils`: IP address helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod system;
pub mod utils;
