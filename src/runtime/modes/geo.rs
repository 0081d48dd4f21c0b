//! Geo-lookup server mode
//!
//! Opens the MaxMind database, then serves `/geo` and the public assets.
//! The listener is bound only after the database is loaded.

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Compress, web};
use anyhow::Result;
use tracing::{error, info, warn};

use super::{CLIENT_REQUEST_TIMEOUT, KEEP_ALIVE, bind_address, worker_count};
use crate::api::middleware::RequestTrace;
use crate::api::services::{GeoSettings, frontend_routes, geo_routes};
use crate::config::get_config;
use crate::services::{MaxMindProvider, SharedGeoLookup};

/// Run the geo-lookup HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_geo_server() -> Result<()> {
    let config = get_config();

    let provider = MaxMindProvider::open_async(config.geo.database_path.clone())
        .await
        .inspect_err(|e| error!("Failed to open MMDB: {}", e))?;
    let lookup: SharedGeoLookup = Arc::new(provider);

    let settings = GeoSettings::from_config(&config.geo);
    if settings.allow_ip_override {
        warn!("?ip= override is enabled: any caller can look up arbitrary addresses");
    }
    if !settings.include_raw {
        info!("Raw database records are omitted from /geo responses");
    }

    let bind = bind_address(&config.server, config.geo.port);
    let workers = worker_count(&config.server);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Compress::default())
            .wrap(RequestTrace)
            .app_data(web::Data::new(lookup.clone()))
            .app_data(web::Data::new(settings.clone()))
            .service(geo_routes())
            .service(frontend_routes())
    })
    .keep_alive(KEEP_ALIVE)
    .client_request_timeout(CLIENT_REQUEST_TIMEOUT)
    .workers(workers)
    .bind(&bind)
    .inspect_err(|e| error!("Failed to bind {}: {}", bind, e))?;

    info!("Server listening on http://{} ({} workers)", bind, workers);
    server.run().await?;

    info!("Geo server stopped");
    Ok(())
}
