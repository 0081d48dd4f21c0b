//! Non-server commands

use std::path::Path;

use anyhow::{Result, bail};

use crate::config::StaticConfig;

/// 默认示例配置输出路径
pub const DEFAULT_SAMPLE_PATH: &str = "config.example.toml";

/// 生成示例配置文件
pub fn generate_config(output_path: Option<&str>, force: bool) -> Result<String> {
    let path = output_path.unwrap_or(DEFAULT_SAMPLE_PATH);

    if Path::new(path).exists() && !force {
        bail!("{} already exists, use --force to overwrite", path);
    }

    StaticConfig::default().save_to_file(path)?;
    Ok(path.to_string())
}

/// 签发会话令牌，供外部登录流程写入 cookie
///
/// 必须配置 `session.secret`，否则图片服务无法校验令牌。
#[cfg(feature = "image")]
pub fn issue_session_token(
    config: &StaticConfig,
    subject: &str,
    minutes: Option<u64>,
) -> Result<String> {
    use crate::services::TokenSessionStore;

    let session = &config.session;
    if session.secret.is_empty() {
        bail!("session.secret is not configured; tokens would not be accepted by the image server");
    }

    let store = TokenSessionStore::new(&session.secret, session.cookie_name.clone(), session.ttl_minutes);
    let token = store.issue_for(subject, minutes.unwrap_or(session.ttl_minutes))?;
    Ok(token)
}
