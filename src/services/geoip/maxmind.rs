//! MaxMind GeoLite2 数据库实现
//!
//! 使用本地 GeoLite2-City.mmdb 文件进行 IP 地理位置查询

use std::net::IpAddr;
use std::path::Path;

use maxminddb::Reader;
use tracing::{info, trace};

use super::provider::GeoLookup;
use super::record::GeoMatch;
use crate::errors::{GeoGuardError, Result};

/// MaxMind GeoIP Provider
pub struct MaxMindProvider {
    reader: Reader<Vec<u8>>,
}

impl MaxMindProvider {
    /// 从文件路径打开数据库（整个文件读入内存）
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = Reader::open_readfile(path).map_err(|e| {
            GeoGuardError::geo_database_open(format!("{}: {}", path.display(), e))
        })?;

        info!(
            "MMDB loaded from {} (type: {}, build: {})",
            path.display(),
            reader.metadata.database_type,
            reader.metadata.build_epoch
        );

        Ok(Self { reader })
    }

    /// 在阻塞线程池中打开数据库，避免占用 async worker
    pub async fn open_async(path: String) -> Result<Self> {
        tokio::task::spawn_blocking(move || Self::open(path))
            .await
            .map_err(|e| GeoGuardError::geo_database_open(format!("open task failed: {}", e)))?
    }
}

impl GeoLookup for MaxMindProvider {
    fn lookup(&self, ip: &str) -> Result<Option<GeoMatch>> {
        let ip_addr: IpAddr = ip
            .parse()
            .map_err(|_| GeoGuardError::invalid_address(ip.to_string()))?;

        let result = self.reader.lookup(ip_addr)?;
        if !result.has_data() {
            trace!("MaxMind lookup for {}: no data", ip);
            return Ok(None);
        }

        let Some(raw) = result.decode::<serde_json::Value>()? else {
            return Ok(None);
        };

        let found = GeoMatch::from_raw(raw)?;
        trace!(
            "MaxMind lookup for {}: country={:?}, city={:?}",
            ip,
            found.record.country_label(),
            found.record.city_label()
        );

        Ok(Some(found))
    }

    fn name(&self) -> &'static str {
        "MaxMind"
    }
}
