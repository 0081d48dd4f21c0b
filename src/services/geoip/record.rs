//! GeoIP 记录模型
//!
//! 只描述响应需要的字段；完整记录以 `serde_json::Value` 原样保留。
//! 数据库中的任何层级都可能缺失，缺失不是错误。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// 本地化名称使用的语言
const ENGLISH: &str = "en";

/// 带本地化名称的地点（国家 / 行政区 / 城市）
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub names: BTreeMap<String, String>,
    #[serde(default)]
    pub iso_code: Option<String>,
}

impl Place {
    pub fn english_name(&self) -> Option<&str> {
        self.names
            .get(ENGLISH)
            .map(String::as_str)
            .filter(|s| !s.is_empty())
    }

    pub fn iso_code(&self) -> Option<&str> {
        self.iso_code.as_deref().filter(|s| !s.is_empty())
    }

    /// 英文名 → ISO 代码 → 无
    pub fn label(&self) -> Option<&str> {
        self.english_name().or_else(|| self.iso_code())
    }
}

/// 坐标信息，缺失的子字段不出现在响应中
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    /// 精度半径（公里）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_radius: Option<u16>,
}

/// GeoLite2-City 记录中用到的部分
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeoRecord {
    #[serde(default)]
    pub country: Option<Place>,
    #[serde(default)]
    pub subdivisions: Vec<Place>,
    #[serde(default)]
    pub city: Option<Place>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl GeoRecord {
    /// 国家：英文名 → ISO 代码 → 无
    pub fn country_label(&self) -> Option<&str> {
        self.country.as_ref().and_then(Place::label)
    }

    /// 地区取第一个 subdivision：英文名 → ISO 代码 → 无
    pub fn region_label(&self) -> Option<&str> {
        self.subdivisions.first().and_then(Place::label)
    }

    /// 城市只取英文名
    pub fn city_label(&self) -> Option<&str> {
        self.city.as_ref().and_then(Place::english_name)
    }
}

/// 一次查询命中的结果
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMatch {
    pub record: GeoRecord,
    /// 数据库返回的完整记录
    pub raw: serde_json::Value,
}

impl GeoMatch {
    /// 从完整记录解析出结构化字段
    pub fn from_raw(raw: serde_json::Value) -> Result<Self> {
        let record = GeoRecord::deserialize(&raw)?;
        Ok(Self { record, raw })
    }
}
