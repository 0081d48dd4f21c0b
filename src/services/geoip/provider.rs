//! GeoIP 查询抽象层

use std::sync::Arc;

use crate::errors::Result;

use super::record::GeoMatch;

/// GeoIP 查询 trait
///
/// 实现必须是只读的：一个实例在所有 worker 间共享。
pub trait GeoLookup: Send + Sync {
    /// 查询 IP 地址
    ///
    /// - `Ok(Some(_))`: 命中
    /// - `Ok(None)`: 数据库中没有该地址
    /// - `Err(_)`: 地址无法解析或数据库读取失败
    fn lookup(&self, ip: &str) -> Result<Option<GeoMatch>>;

    /// 获取 provider 名称（用于日志）
    fn name(&self) -> &'static str;
}

/// 在 worker 间共享的查询句柄
pub type SharedGeoLookup = Arc<dyn GeoLookup>;
