//! `GET /geo`: visitor geolocation as JSON
//!
//! `?ip=<addr>` overrides the detected client address and is looked up
//! exactly as given. It exists for operators testing the database and lets
//! any caller probe arbitrary addresses, so production deployments may turn
//! it off with `geo.allow_ip_override = false`.

use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::api::constants::{GEO_PATH, MSG_NO_DATA, MSG_NO_IP};
use crate::config::GeoConfig;
use crate::services::geoip::{GeoMatch, Location};
use crate::services::{GeoLookup, SharedGeoLookup};
use crate::utils::ip::{ProxyTrust, extract_client_ip, normalize_ip};
use crate::utils::query::last_query_value;

/// /geo 的运行参数，启动时从配置生成
#[derive(Debug, Clone)]
pub struct GeoSettings {
    pub allow_ip_override: bool,
    pub include_raw: bool,
    pub proxy_trust: ProxyTrust,
}

impl GeoSettings {
    pub fn from_config(config: &GeoConfig) -> Self {
        Self {
            allow_ip_override: config.allow_ip_override,
            include_raw: config.include_raw,
            proxy_trust: ProxyTrust {
                enabled: config.trust_proxy,
                trusted_proxies: config.trusted_proxies.clone(),
            },
        }
    }
}

impl Default for GeoSettings {
    fn default() -> Self {
        Self::from_config(&GeoConfig::default())
    }
}

#[derive(Debug, Serialize)]
pub struct GeoErrorBody {
    pub error: &'static str,
}

/// 命中时的响应
#[derive(Debug, Serialize)]
pub struct GeoFound {
    pub ip: String,
    pub found: bool,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

/// 未命中时的响应
#[derive(Debug, Serialize)]
pub struct GeoMissing {
    pub ip: String,
    pub found: bool,
    pub message: &'static str,
}

impl GeoFound {
    fn build(ip: String, found: GeoMatch, include_raw: bool) -> Self {
        let record = &found.record;
        Self {
            country: record.country_label().map(String::from),
            region: record.region_label().map(String::from),
            city: record.city_label().map(String::from),
            location: record.location.clone(),
            raw: include_raw.then_some(found.raw),
            found: true,
            ip,
        }
    }
}

pub struct GeoService;

impl GeoService {
    pub async fn handle_geo(
        req: HttpRequest,
        lookup: web::Data<SharedGeoLookup>,
        settings: web::Data<GeoSettings>,
    ) -> impl Responder {
        let override_ip = last_query_value(req.query_string(), "ip");
        let Some(ip) = Self::resolve_ip(&req, override_ip.as_deref(), &settings) else {
            debug!("Could not determine client IP");
            return HttpResponse::BadRequest().json(GeoErrorBody { error: MSG_NO_IP });
        };

        match Self::lookup(lookup.get_ref().as_ref(), &ip) {
            Some(found) => HttpResponse::Ok().json(GeoFound::build(ip, found, settings.include_raw)),
            None => HttpResponse::Ok().json(GeoMissing {
                ip,
                found: false,
                message: MSG_NO_DATA,
            }),
        }
    }

    /// 确定要查询的地址：非空的 `?ip=`（允许时）原样使用，否则取规范化后的连接/代理地址
    fn resolve_ip(req: &HttpRequest, override_ip: Option<&str>, settings: &GeoSettings) -> Option<String> {
        let requested = override_ip.filter(|ip| !ip.is_empty());

        if let Some(ip) = requested {
            if settings.allow_ip_override {
                trace!("Using ?ip= override: {}", ip);
                return Some(ip.to_string());
            }
            debug!("Ignoring ?ip= override, disabled by configuration");
        }

        extract_client_ip(req, &settings.proxy_trust).and_then(|ip| normalize_ip(&ip))
    }

    /// 单次只读查询；查询失败按未命中处理
    fn lookup(lookup: &dyn GeoLookup, ip: &str) -> Option<GeoMatch> {
        match lookup.lookup(ip) {
            Ok(found) => found,
            Err(e) => {
                warn!("Lookup failed for {} via {}: {}", ip, lookup.name(), e);
                None
            }
        }
    }
}

pub fn geo_routes() -> actix_web::Resource {
    web::resource(GEO_PATH).route(web::get().to(GeoService::handle_geo))
}
