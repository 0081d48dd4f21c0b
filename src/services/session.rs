//! 会话校验
//!
//! 图片服务只关心"当前请求是否已认证"。登录流程不在本服务中：
//! 外部系统签发会话令牌并写入 cookie，这里只负责读取和校验。

use std::sync::Arc;

use actix_web::HttpRequest;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::Result;

/// 一次请求的认证上下文
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub authenticated: bool,
    pub subject: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(subject: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            subject: Some(subject.into()),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// 会话存储 trait
///
/// 把请求映射到认证上下文。读取失败一律视为未认证。
pub trait SessionStore: Send + Sync {
    fn load(&self, req: &HttpRequest) -> AuthContext;
}

/// 在 worker 间共享的会话存储
pub type SharedSessionStore = Arc<dyn SessionStore>;

/// Session Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    /// 显式认证标记，缺失或为 false 都不放行
    #[serde(default)]
    pub authenticated: bool,
}

/// 基于签名 cookie 的会话存储
pub struct TokenSessionStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    cookie_name: String,
    ttl_minutes: u64,
}

impl TokenSessionStore {
    pub fn new(secret: &str, cookie_name: impl Into<String>, ttl_minutes: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            cookie_name: cookie_name.into(),
            ttl_minutes,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// 签发已认证的会话令牌
    pub fn issue(&self, subject: &str) -> Result<String> {
        self.issue_for(subject, self.ttl_minutes)
    }

    /// 签发指定有效期（分钟）的会话令牌
    pub fn issue_for(&self, subject: &str, minutes: u64) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(minutes as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            authenticated: true,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// 校验令牌并返回 claims
    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())?;
        Ok(data.claims)
    }

    /// 把令牌转换为认证上下文
    pub fn context_for(&self, token: &str) -> AuthContext {
        match self.validate(token) {
            Ok(claims) if claims.authenticated => {
                trace!("Session token accepted for {}", claims.sub);
                AuthContext::authenticated(claims.sub)
            }
            Ok(claims) => {
                debug!("Session token for {} lacks the authenticated flag", claims.sub);
                AuthContext::anonymous()
            }
            Err(e) => {
                debug!("Session token rejected: {}", e);
                AuthContext::anonymous()
            }
        }
    }
}

impl SessionStore for TokenSessionStore {
    fn load(&self, req: &HttpRequest) -> AuthContext {
        match req.cookie(&self.cookie_name) {
            Some(cookie) => self.context_for(cookie.value()),
            None => AuthContext::anonymous(),
        }
    }
}
