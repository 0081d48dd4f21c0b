//! Protected-image server mode

use std::path::Path;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Result;
use tracing::{error, info, warn};

use super::{CLIENT_REQUEST_TIMEOUT, KEEP_ALIVE, bind_address, worker_count};
use crate::api::middleware::RequestTrace;
use crate::api::services::image_routes;
use crate::config::{SessionConfig, get_config};
use crate::services::{ImageStore, SharedSessionStore, TokenSessionStore};

/// 根据配置构造会话存储
///
/// 未配置密钥时生成随机密钥：服务可以启动，但只有本进程签发的令牌有效。
pub fn build_session_store(config: &SessionConfig) -> SharedSessionStore {
    let secret = if config.secret.is_empty() {
        warn!("session.secret is empty, generating a random one; externally issued sessions will be rejected");
        format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
    } else {
        config.secret.clone()
    };

    Arc::new(TokenSessionStore::new(
        &secret,
        config.cookie_name.clone(),
        config.ttl_minutes,
    ))
}

/// Run the protected-image HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_image_server() -> Result<()> {
    let config = get_config();

    let images_dir = Path::new(&config.image.images_dir);
    if !images_dir.is_dir() {
        warn!(
            "Image directory {} does not exist, every request will be answered with 404",
            images_dir.display()
        );
    }

    let store = ImageStore::new(images_dir);
    let sessions = build_session_store(&config.session);

    let bind = bind_address(&config.server, config.image.port);
    let workers = worker_count(&config.server);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestTrace)
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(sessions.clone()))
            .service(image_routes())
    })
    .keep_alive(KEEP_ALIVE)
    .client_request_timeout(CLIENT_REQUEST_TIMEOUT)
    .workers(workers)
    .bind(&bind)
    .inspect_err(|e| error!("Failed to bind {}: {}", bind, e))?;

    info!("Image server listening on http://{} ({} workers)", bind, workers);
    server.run().await?;

    info!("Image server stopped");
    Ok(())
}
