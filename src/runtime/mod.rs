//! Application runtime
//!
//! - `modes`: entry points for each CLI command (geo server, image server,
//!   session token, config generation)

pub mod modes;
