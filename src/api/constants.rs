//! API 常量定义

/// GeoIP 查询路径
pub const GEO_PATH: &str = "/geo";

/// 受保护图片路径
pub const SERVE_IMAGE_PATH: &str = "/serve-image";

/// 无法确定客户端 IP 时的错误信息
pub const MSG_NO_IP: &str = "Could not determine IP";

/// 数据库中没有该 IP 时的提示
pub const MSG_NO_DATA: &str = "No data for this IP in DB";

/// 请求 ID 响应头
pub const REQUEST_ID_HEADER: &str = "x-request-id";
