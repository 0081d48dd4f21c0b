use actix_web::{HttpRequest, HttpResponse, Result, web};
use rust_embed::Embed;
use tracing::{debug, trace};

// 公开静态资源（/geo 的演示页面）
#[derive(Embed)]
#[folder = "public/"]
struct PublicAssets;

pub struct FrontendService;

impl FrontendService {
    /// 首页
    pub async fn handle_index() -> Result<HttpResponse> {
        trace!("Serving public index page");
        Ok(Self::serve("index.html"))
    }

    /// 其他静态资源
    pub async fn handle_static(req: HttpRequest) -> Result<HttpResponse> {
        let path = req.match_info().query("path");
        trace!("Serving static file: {}", path);

        let path = if path.is_empty() || path.ends_with('/') {
            format!("{}index.html", path)
        } else {
            path.to_string()
        };
        Ok(Self::serve(&path))
    }

    fn serve(path: &str) -> HttpResponse {
        match PublicAssets::get(path) {
            Some(content) => HttpResponse::Ok()
                .content_type(Self::get_content_type(path))
                .body(content.data.into_owned()),
            None => {
                debug!("Static file not found: {}", path);
                HttpResponse::NotFound().body("File not found")
            }
        }
    }

    /// 根据文件扩展名确定 Content-Type
    fn get_content_type(path: &str) -> &'static str {
        match path.rsplit('.').next() {
            Some("html") => "text/html; charset=utf-8",
            Some("css") => "text/css",
            Some("js") => "application/javascript",
            Some("json") => "application/json",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("gif") => "image/gif",
            Some("svg") => "image/svg+xml",
            Some("ico") => "image/x-icon",
            Some("txt") => "text/plain; charset=utf-8",
            _ => "application/octet-stream",
        }
    }
}

/// 静态资源路由，注册在具体 API 之后
pub fn frontend_routes() -> actix_web::Scope {
    web::scope("")
        .route("/", web::get().to(FrontendService::handle_index))
        .route("/{path:.*}", web::get().to(FrontendService::handle_static))
}
