use serde::{Deserialize, Serialize};

use crate::errors::{GeoGuardError, Result};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 环境变量前缀，示例：GG__IMAGE__PORT=4000
pub const ENV_PREFIX: &str = "GG";

/// 托管平台常用的端口变量，优先级高于 geo.port
pub const PORT_ENV: &str = "PORT";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、worker 数量
/// - geo: GeoIP 查询服务
/// - image: 受保护图片服务
/// - session: 会话令牌签名
/// - logging: 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub geo: GeoConfig,
    #[serde(default)]
    pub image: ImageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：PORT（仅 geo.port）> ENV > 配置文件 > 默认值
    /// ENV 前缀：GG，分隔符：__
    pub fn load(path: Option<&str>) -> Result<Self> {
        use config::{Config, Environment, File};

        let explicit = path.is_some();
        let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

        let settings = Config::builder()
            .add_source(File::with_name(path).required(explicit))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("geo.trusted_proxies"),
            )
            .build()?;

        let mut config: StaticConfig = settings.try_deserialize()?;
        config.apply_port_override(std::env::var(PORT_ENV).ok().as_deref())?;

        if std::path::Path::new(path).exists() {
            eprintln!("[INFO] Configuration loaded from: {}", path);
        }

        Ok(config)
    }

    /// 应用 PORT 环境变量（空值忽略）
    pub fn apply_port_override(&mut self, value: Option<&str>) -> Result<()> {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        self.geo.port = raw
            .parse()
            .map_err(|_| GeoGuardError::config(format!("{} is not a valid port: '{}'", PORT_ENV, raw)))?;
        Ok(())
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> Result<String> {
        Ok(toml::to_string_pretty(&Self::default())?)
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置（两个服务共用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// GeoIP 查询服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoConfig {
    #[serde(default = "default_geo_port")]
    pub port: u16,
    /// GeoLite2-City 格式的 MMDB 文件
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// 允许 `?ip=` 覆盖客户端 IP。仅供运维调试：开启后任何调用方都能查询任意 IP
    #[serde(default = "default_true")]
    pub allow_ip_override: bool,
    /// 响应中附带完整的数据库记录（raw 字段）
    #[serde(default = "default_true")]
    pub include_raw: bool,
    /// 信任 X-Forwarded-For / X-Real-IP
    #[serde(default = "default_true")]
    pub trust_proxy: bool,
    /// 可信代理（IP 或 CIDR）。为空表示信任任意上游
    #[serde(default)]
    pub trusted_proxies: Vec<String>,
}

/// 受保护图片服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_image_port")]
    pub port: u16,
    /// 图片目录，应位于任何公开 web root 之外
    #[serde(default = "default_images_dir")]
    pub images_dir: String,
}

/// 会话令牌配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// HMAC 密钥。为空时启动会生成随机密钥，已签发的令牌在重启后失效
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_true")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions
// ============================================================

fn default_true() -> bool {
    true
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_geo_port() -> u16 {
    3000
}

fn default_database_path() -> String {
    "GeoLite2-City.mmdb".to_string()
}

fn default_image_port() -> u16 {
    3001
}

fn default_images_dir() -> String {
    "protected-images".to_string()
}

fn default_cookie_name() -> String {
    "geoguard_session".to_string()
}

fn default_ttl_minutes() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_max_backups() -> u32 {
    5
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            port: default_geo_port(),
            database_path: default_database_path(),
            allow_ip_override: true,
            include_raw: true,
            trust_proxy: true,
            trusted_proxies: Vec::new(),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            port: default_image_port(),
            images_dir: default_images_dir(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            cookie_name: default_cookie_name(),
            ttl_minutes: default_ttl_minutes(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
            max_backups: default_max_backups(),
            enable_rotation: true,
        }
    }
}
