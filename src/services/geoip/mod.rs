//! GeoIP 服务模块
//!
//! 基于本地 MaxMind 数据库的 IP 地理位置查询

mod maxmind;
mod provider;
mod record;

pub use maxmind::MaxMindProvider;
pub use provider::{GeoLookup, SharedGeoLookup};
pub use record::{GeoMatch, GeoRecord, Location, Place};
