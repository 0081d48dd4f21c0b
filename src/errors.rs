use std::fmt;

#[derive(Debug, Clone)]
pub enum GeoGuardError {
    Config(String),
    GeoDatabaseOpen(String),
    GeoLookup(String),
    InvalidAddress(String),
    FileOperation(String),
    Session(String),
    Serialization(String),
}

impl GeoGuardError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            GeoGuardError::Config(_) => "E001",
            GeoGuardError::GeoDatabaseOpen(_) => "E002",
            GeoGuardError::GeoLookup(_) => "E003",
            GeoGuardError::InvalidAddress(_) => "E004",
            GeoGuardError::FileOperation(_) => "E005",
            GeoGuardError::Session(_) => "E006",
            GeoGuardError::Serialization(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            GeoGuardError::Config(_) => "Configuration Error",
            GeoGuardError::GeoDatabaseOpen(_) => "GeoIP Database Open Error",
            GeoGuardError::GeoLookup(_) => "GeoIP Lookup Error",
            GeoGuardError::InvalidAddress(_) => "Invalid IP Address",
            GeoGuardError::FileOperation(_) => "File Operation Error",
            GeoGuardError::Session(_) => "Session Error",
            GeoGuardError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            GeoGuardError::Config(msg)
            | GeoGuardError::GeoDatabaseOpen(msg)
            | GeoGuardError::GeoLookup(msg)
            | GeoGuardError::InvalidAddress(msg)
            | GeoGuardError::FileOperation(msg)
            | GeoGuardError::Session(msg)
            | GeoGuardError::Serialization(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于服务启动失败）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for GeoGuardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for GeoGuardError {}

// 便捷的构造函数
impl GeoGuardError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        GeoGuardError::Config(msg.into())
    }

    pub fn geo_database_open<T: Into<String>>(msg: T) -> Self {
        GeoGuardError::GeoDatabaseOpen(msg.into())
    }

    pub fn invalid_address<T: Into<String>>(msg: T) -> Self {
        GeoGuardError::InvalidAddress(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        GeoGuardError::FileOperation(msg.into())
    }
}

impl From<std::io::Error> for GeoGuardError {
    fn from(err: std::io::Error) -> Self {
        GeoGuardError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for GeoGuardError {
    fn from(err: serde_json::Error) -> Self {
        GeoGuardError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for GeoGuardError {
    fn from(err: config::ConfigError) -> Self {
        GeoGuardError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for GeoGuardError {
    fn from(err: toml::ser::Error) -> Self {
        GeoGuardError::Serialization(err.to_string())
    }
}

#[cfg(feature = "geo")]
impl From<maxminddb::MaxMindDbError> for GeoGuardError {
    fn from(err: maxminddb::MaxMindDbError) -> Self {
        GeoGuardError::GeoLookup(err.to_string())
    }
}

#[cfg(feature = "image")]
impl From<jsonwebtoken::errors::Error> for GeoGuardError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        GeoGuardError::Session(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeoGuardError>;
