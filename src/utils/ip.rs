//! IP 地址处理工具
//!
//! - 客户端 IP 规范化（zone id、IPv4-mapped IPv6、IPv6 loopback）
//! - 可信代理判断（单 IP / CIDR）
//! - 从连接信息或代理头提取客户端 IP

use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;
use actix_web::http::header::HeaderMap;
use tracing::debug;

const IPV4_MAPPED_PREFIX: &str = "::ffff:";
const IPV6_LOOPBACK: &str = "::1";
const IPV4_LOOPBACK: &str = "127.0.0.1";

/// 规范化 IP 文本
///
/// 1. 去掉 `%` 之后的 IPv6 zone id
/// 2. `::ffff:a.b.c.d` → `a.b.c.d`
/// 3. `::1` → `127.0.0.1`
///
/// 其他输入原样返回（不做合法性校验）。结果为空时返回 `None`。
pub fn normalize_ip(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let without_zone = match trimmed.find('%') {
        Some(idx) => &trimmed[..idx],
        None => trimmed,
    };

    let normalized = if let Some(v4) = strip_prefix_ignore_case(without_zone, IPV4_MAPPED_PREFIX) {
        v4
    } else if without_zone == IPV6_LOOPBACK {
        IPV4_LOOPBACK
    } else {
        without_zone
    };

    (!normalized.is_empty()).then(|| normalized.to_string())
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// 检查 IP 是否在可信代理列表中
pub fn is_trusted_proxy(ip: &str, trusted_proxies: &[String]) -> bool {
    // 先尝试解析为 SocketAddr（支持 ip:port），如果失败再尝试纯 IpAddr
    let ip_addr = if let Ok(socket_addr) = ip.parse::<SocketAddr>() {
        socket_addr.ip()
    } else if let Ok(ip_addr) = ip.parse::<IpAddr>() {
        ip_addr
    } else {
        return false;
    };

    trusted_proxies.iter().any(|proxy| {
        if proxy.contains('/') {
            ip_in_cidr(&ip_addr, proxy)
        } else {
            proxy.parse::<IpAddr>().is_ok_and(|p| p == ip_addr)
        }
    })
}

/// CIDR 检查
pub fn ip_in_cidr(ip: &IpAddr, cidr: &str) -> bool {
    let Some((network, prefix_len)) = cidr.split_once('/') else {
        return false;
    };

    let Ok(prefix_len): Result<u8, _> = prefix_len.parse() else {
        return false;
    };

    let Ok(network_addr) = network.parse::<IpAddr>() else {
        return false;
    };

    match (ip, network_addr) {
        (IpAddr::V4(ip), IpAddr::V4(net)) => {
            if prefix_len > 32 {
                return false;
            }
            let mask = u32::MAX.checked_shl(32 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u32::from_be_bytes(ip.octets());
            let net_bits = u32::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        (IpAddr::V6(ip), IpAddr::V6(net)) => {
            if prefix_len > 128 {
                return false;
            }
            let mask = u128::MAX.checked_shl(128 - prefix_len as u32).unwrap_or(0);
            let ip_bits = u128::from_be_bytes(ip.octets());
            let net_bits = u128::from_be_bytes(net.octets());
            (ip_bits & mask) == (net_bits & mask)
        }
        _ => false,
    }
}

/// 代理信任策略
#[derive(Debug, Clone, Default)]
pub struct ProxyTrust {
    /// 是否读取 X-Forwarded-For / X-Real-IP
    pub enabled: bool,
    /// 可信代理列表，为空表示信任任意上游
    pub trusted_proxies: Vec<String>,
}

impl ProxyTrust {
    /// 不信任任何代理头，只看连接地址
    pub fn disabled() -> Self {
        Self::default()
    }

    fn trusts(&self, peer: Option<&str>) -> bool {
        if !self.enabled {
            return false;
        }
        if self.trusted_proxies.is_empty() {
            return true;
        }
        peer.is_some_and(|p| is_trusted_proxy(p, &self.trusted_proxies))
    }
}

/// 提取客户端 IP（未规范化）
///
/// 策略：
/// 1. 连接来自可信代理 → 代理头中的第一个地址
/// 2. 否则（或代理头缺失）→ 连接地址
pub fn extract_client_ip_with(
    peer: Option<&str>,
    headers: &HeaderMap,
    trust: &ProxyTrust,
) -> Option<String> {
    if trust.trusts(peer)
        && let Some(forwarded) = extract_forwarded_ip_from_headers(headers)
    {
        debug!("Trusted proxy {:?} -> client {}", peer, forwarded);
        return Some(forwarded);
    }

    peer.map(String::from)
}

/// 从 HttpRequest 提取客户端 IP（未规范化）
pub fn extract_client_ip(req: &HttpRequest, trust: &ProxyTrust) -> Option<String> {
    let peer = req.peer_addr().map(|addr| addr.ip().to_string());
    extract_client_ip_with(peer.as_deref(), req.headers(), trust)
}

/// 从 HeaderMap 提取转发的 IP
pub fn extract_forwarded_ip_from_headers(headers: &HeaderMap) -> Option<String> {
    // 优先 X-Forwarded-For（取第一个，即原始客户端 IP）
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|h| h.to_str().ok())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header::{HeaderName, HeaderValue};

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            map.insert(HeaderName::from_static(k), HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_normalize_ipv4_mapped() {
        assert_eq!(normalize_ip("::ffff:8.8.8.8").as_deref(), Some("8.8.8.8"));
        assert_eq!(normalize_ip("::FFFF:10.0.0.1").as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_normalize_loopback() {
        assert_eq!(normalize_ip("::1").as_deref(), Some("127.0.0.1"));
        assert_eq!(normalize_ip("::1%lo0").as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_normalize_strips_zone() {
        assert_eq!(normalize_ip("fe80::1%eth0").as_deref(), Some("fe80::1"));
        assert_eq!(normalize_ip("%eth0"), None);
    }

    #[test]
    fn test_normalize_passthrough() {
        assert_eq!(normalize_ip("8.8.8.8").as_deref(), Some("8.8.8.8"));
        assert_eq!(
            normalize_ip("2001:4860:4860::8888").as_deref(),
            Some("2001:4860:4860::8888")
        );
        // 非法文本也原样透传，由查询层决定
        assert_eq!(normalize_ip("not-an-ip").as_deref(), Some("not-an-ip"));
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_ip(""), None);
        assert_eq!(normalize_ip("   "), None);
        assert_eq!(normalize_ip("::ffff:"), None);
    }

    #[test]
    fn test_ip_in_cidr_ipv4() {
        let ip: IpAddr = "192.168.1.100".parse().unwrap();
        assert!(ip_in_cidr(&ip, "192.168.1.0/24"));
        assert!(ip_in_cidr(&ip, "192.168.0.0/16"));
        assert!(!ip_in_cidr(&ip, "192.168.2.0/24"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/33"));
    }

    #[test]
    fn test_ip_in_cidr_ipv6() {
        let ip: IpAddr = "2001:db8::1".parse().unwrap();
        assert!(ip_in_cidr(&ip, "2001:db8::/32"));
        assert!(!ip_in_cidr(&ip, "2001:db9::/32"));
        assert!(!ip_in_cidr(&ip, "10.0.0.0/8"));
    }

    #[test]
    fn test_is_trusted_proxy() {
        let proxies = vec!["127.0.0.1".to_string(), "192.168.1.0/24".to_string()];

        assert!(is_trusted_proxy("127.0.0.1", &proxies));
        assert!(is_trusted_proxy("127.0.0.1:8080", &proxies));
        assert!(is_trusted_proxy("192.168.1.50", &proxies));
        assert!(!is_trusted_proxy("8.8.8.8", &proxies));
        assert!(!is_trusted_proxy("garbage", &proxies));
    }

    #[test]
    fn test_forwarded_header_first_entry() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.2")]);
        assert_eq!(
            extract_forwarded_ip_from_headers(&map).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_real_ip_fallback() {
        let map = headers(&[("x-real-ip", "198.51.100.4")]);
        assert_eq!(
            extract_forwarded_ip_from_headers(&map).as_deref(),
            Some("198.51.100.4")
        );
    }

    #[test]
    fn test_extract_client_ip_trust_any() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7")]);
        let trust = ProxyTrust {
            enabled: true,
            trusted_proxies: Vec::new(),
        };
        assert_eq!(
            extract_client_ip_with(Some("10.0.0.1"), &map, &trust).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_extract_client_ip_untrusted_peer() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7")]);
        let trust = ProxyTrust {
            enabled: true,
            trusted_proxies: vec!["10.0.0.0/8".to_string()],
        };
        assert_eq!(
            extract_client_ip_with(Some("8.8.4.4"), &map, &trust).as_deref(),
            Some("8.8.4.4")
        );
        assert_eq!(
            extract_client_ip_with(Some("10.1.2.3"), &map, &trust).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_extract_client_ip_disabled() {
        let map = headers(&[("x-forwarded-for", "203.0.113.7")]);
        assert_eq!(
            extract_client_ip_with(Some("10.0.0.1"), &map, &ProxyTrust::disabled()).as_deref(),
            Some("10.0.0.1")
        );
        assert_eq!(
            extract_client_ip_with(None, &HeaderMap::new(), &ProxyTrust::disabled()),
            None
        );
    }
}
