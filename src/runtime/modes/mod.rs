//! Mode routing
//!
//! One entry point per CLI command. The two HTTP services are independent
//! processes and share nothing except the configuration loader.

pub mod cli;
#[cfg(feature = "geo")]
pub mod geo;
#[cfg(feature = "image")]
pub mod image;

pub use cli::generate_config;
#[cfg(feature = "image")]
pub use cli::issue_session_token;
#[cfg(feature = "geo")]
pub use geo::run_geo_server;
#[cfg(feature = "image")]
pub use image::run_image_server;

use std::time::Duration;

use crate::config::ServerConfig;

/// HTTP keep-alive
pub(crate) const KEEP_ALIVE: Duration = Duration::from_secs(30);
/// 客户端请求头超时
pub(crate) const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
/// worker 数量上限
const MAX_WORKERS: usize = 32;

pub(crate) fn bind_address(server: &ServerConfig, port: u16) -> String {
    format!("{}:{}", server.host, port)
}

pub(crate) fn worker_count(server: &ServerConfig) -> usize {
    server.cpu_count.clamp(1, MAX_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let server = ServerConfig {
            host: "127.0.0.1".to_string(),
            cpu_count: 4,
        };
        assert_eq!(bind_address(&server, 3000), "127.0.0.1:3000");
    }

    #[test]
    fn test_worker_count_is_clamped() {
        let mut server = ServerConfig::default();
        server.cpu_count = 0;
        assert_eq!(worker_count(&server), 1);
        server.cpu_count = 128;
        assert_eq!(worker_count(&server), MAX_WORKERS);
    }
}
