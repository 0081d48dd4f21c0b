//! MaxMind 数据库集成测试
//!
//! 在临时目录里写出一个只包含 8.8.8.8/32 的 GeoLite2-City 格式数据库
//! （IPv4 搜索树，24 位记录），再通过 MaxMindProvider 读取。

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use serde_json::Value;
use tempfile::TempDir;

use geoguard::api::services::{GeoSettings, geo_routes};
use geoguard::services::{GeoLookup, MaxMindProvider, SharedGeoLookup};

// =============================================================================
// MMDB 写入
// =============================================================================

const NODE_COUNT: u32 = 32;
const DATA_SEPARATOR: [u8; 16] = [0; 16];
const METADATA_MARKER: &[u8] = b"\xAB\xCD\xEFMaxMind.com";

#[derive(Default)]
struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    fn control(&mut self, kind: u8, size: usize) -> &mut Self {
        assert!(size < 29, "long payloads are not needed here");
        if kind <= 7 {
            self.buf.push((kind << 5) | size as u8);
        } else {
            self.buf.push(size as u8);
            self.buf.push(kind - 7);
        }
        self
    }

    fn string(&mut self, s: &str) -> &mut Self {
        self.control(2, s.len());
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    fn double(&mut self, v: f64) -> &mut Self {
        self.control(3, 8);
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn unsigned(&mut self, kind: u8, v: u64) -> &mut Self {
        let bytes = v.to_be_bytes();
        let skip = bytes.iter().take_while(|b| **b == 0).count();
        self.control(kind, bytes.len() - skip);
        self.buf.extend_from_slice(&bytes[skip..]);
        self
    }

    fn u16(&mut self, v: u16) -> &mut Self {
        self.unsigned(5, v as u64)
    }

    fn u32(&mut self, v: u32) -> &mut Self {
        self.unsigned(6, v as u64)
    }

    fn u64(&mut self, v: u64) -> &mut Self {
        self.unsigned(9, v)
    }

    fn map(&mut self, entries: usize) -> &mut Self {
        self.control(7, entries)
    }

    fn array(&mut self, items: usize) -> &mut Self {
        self.control(11, items)
    }
}

fn city_record() -> Vec<u8> {
    let mut e = Encoder::default();
    e.map(4);
    e.string("city")
        .map(2)
        .string("geoname_id")
        .u32(5375480)
        .string("names")
        .map(1)
        .string("en")
        .string("Mountain View");
    e.string("country")
        .map(2)
        .string("iso_code")
        .string("US")
        .string("names")
        .map(2)
        .string("de")
        .string("USA")
        .string("en")
        .string("United States");
    e.string("location")
        .map(4)
        .string("accuracy_radius")
        .u16(1000)
        .string("latitude")
        .double(37.386)
        .string("longitude")
        .double(-122.0838)
        .string("time_zone")
        .string("America/Los_Angeles");
    e.string("subdivisions")
        .array(1)
        .map(2)
        .string("iso_code")
        .string("CA")
        .string("names")
        .map(1)
        .string("en")
        .string("California");
    e.buf
}

fn metadata() -> Vec<u8> {
    let mut e = Encoder::default();
    e.map(9);
    e.string("binary_format_major_version").u16(2);
    e.string("binary_format_minor_version").u16(0);
    e.string("build_epoch").u64(1_700_000_000);
    e.string("database_type").string("GeoLite2-City");
    e.string("description")
        .map(1)
        .string("en")
        .string("geoguard test database");
    e.string("ip_version").u16(4);
    e.string("languages").array(1).string("en");
    e.string("node_count").u32(NODE_COUNT);
    e.string("record_size").u16(24);
    e.buf
}

/// 每一层一个节点，沿 `target` 的比特走到底；其余分支都指向"无数据"
fn build_database(target: Ipv4Addr) -> Vec<u8> {
    let bits = u32::from(target);
    let mut out = Vec::new();

    for depth in 0..NODE_COUNT {
        let bit = (bits >> (31 - depth)) & 1;
        let next = if depth == NODE_COUNT - 1 {
            // 数据段偏移 0
            NODE_COUNT + DATA_SEPARATOR.len() as u32
        } else {
            depth + 1
        };
        let (left, right) = if bit == 0 {
            (next, NODE_COUNT)
        } else {
            (NODE_COUNT, next)
        };
        out.extend_from_slice(&left.to_be_bytes()[1..]);
        out.extend_from_slice(&right.to_be_bytes()[1..]);
    }

    out.extend_from_slice(&DATA_SEPARATOR);
    out.extend_from_slice(&city_record());
    out.extend_from_slice(METADATA_MARKER);
    out.extend_from_slice(&metadata());
    out
}

fn write_database(dir: &Path) -> PathBuf {
    let path = dir.join("GeoLite2-City.mmdb");
    std::fs::write(&path, build_database(Ipv4Addr::new(8, 8, 8, 8))).expect("写入测试数据库失败");
    path
}

fn open_provider() -> (TempDir, MaxMindProvider) {
    let dir = TempDir::new().expect("创建临时目录失败");
    let path = write_database(dir.path());
    let provider = MaxMindProvider::open(&path).expect("打开测试数据库失败");
    (dir, provider)
}

// =============================================================================
// Provider
// =============================================================================

#[test]
fn test_lookup_hit() {
    let (_dir, provider) = open_provider();

    let found = provider
        .lookup("8.8.8.8")
        .unwrap()
        .expect("8.8.8.8 is in the database");
    assert_eq!(found.record.country_label(), Some("United States"));
    assert_eq!(found.record.region_label(), Some("California"));
    assert_eq!(found.record.city_label(), Some("Mountain View"));

    let location = found.record.location.as_ref().unwrap();
    assert_eq!(location.accuracy_radius, Some(1000));
    assert_eq!(location.time_zone.as_deref(), Some("America/Los_Angeles"));

    assert_eq!(found.raw["city"]["geoname_id"], 5375480);
    assert_eq!(found.raw["country"]["names"]["de"], "USA");
}

#[test]
fn test_lookup_miss() {
    let (_dir, provider) = open_provider();

    assert!(provider.lookup("8.8.4.4").unwrap().is_none());
    assert!(provider.lookup("203.0.113.1").unwrap().is_none());
}

#[test]
fn test_lookup_unparseable_address() {
    let (_dir, provider) = open_provider();

    let err = provider.lookup("not-an-ip").unwrap_err();
    assert_eq!(err.code(), "E004");
    assert!(provider.lookup("").is_err());
}

#[test]
fn test_ipv6_lookup_in_ipv4_database_is_error() {
    let (_dir, provider) = open_provider();
    assert!(provider.lookup("2001:db8::1").is_err());
}

// =============================================================================
// /geo 端到端
// =============================================================================

#[actix_rt::test]
async fn test_geo_endpoint_against_database() {
    let dir = TempDir::new().unwrap();
    let path = write_database(dir.path());
    let provider = MaxMindProvider::open_async(path.to_string_lossy().into_owned())
        .await
        .unwrap();
    let lookup: SharedGeoLookup = Arc::new(provider);

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(lookup))
            .app_data(web::Data::new(GeoSettings::default()))
            .service(geo_routes()),
    )
    .await;

    let req = TestRequest::get().uri("/geo?ip=8.8.8.8").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["found"], true);
    assert_eq!(body["country"], "United States");
    assert_eq!(body["location"]["latitude"], 37.386);

    let req = TestRequest::get().uri("/geo?ip=8.8.4.4").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["found"], false);
    assert_eq!(body["message"], "No data for this IP in DB");

    // 无法解析的地址按未命中处理
    let req = TestRequest::get().uri("/geo?ip=bogus").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["ip"], "bogus");
    assert_eq!(body["found"], false);
}
