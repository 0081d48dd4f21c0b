//! `GET /serve-image?file=<name>`: session-gated image download

use actix_web::{HttpRequest, HttpResponse, web};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use crate::api::constants::SERVE_IMAGE_PATH;
use crate::services::{AuthContext, ImageRejection, ImageStore};
use crate::utils::query::last_query_value;

pub struct ImageService;

impl ImageService {
    pub async fn serve_image(
        auth: AuthContext,
        req: HttpRequest,
        store: web::Data<ImageStore>,
    ) -> HttpResponse {
        if !auth.is_authenticated() {
            info!("Protected image request without an authenticated session");
            return HttpResponse::Forbidden().finish();
        }

        // 认证之后再解析查询串
        let requested = last_query_value(req.query_string(), "file").unwrap_or_default();
        let image = match store.resolve(&requested).await {
            Ok(image) => image,
            Err(ImageRejection::NotFound(name)) => {
                debug!("Protected image not found: {}", name);
                return HttpResponse::NotFound().finish();
            }
            Err(rejection) => {
                info!("Protected image request rejected: {:?}", rejection);
                return HttpResponse::Forbidden().finish();
            }
        };

        let file = match tokio::fs::File::open(&image.path).await {
            Ok(file) => file,
            Err(e) => {
                // 文件在检查之后被删除或不可读
                warn!("Failed to open protected image {}: {}", image.name, e);
                return HttpResponse::NotFound().finish();
            }
        };

        let mut response = HttpResponse::Ok();
        response.content_type(image.kind.content_type());
        if let Ok(metadata) = file.metadata().await {
            response.no_chunking(metadata.len());
        }

        debug!(
            "Serving protected image {} for {:?}",
            image.name, auth.subject
        );
        response.streaming(ReaderStream::new(file))
    }
}

pub fn image_routes() -> actix_web::Resource {
    web::resource(SERVE_IMAGE_PATH).route(web::get().to(ImageService::serve_image))
}
