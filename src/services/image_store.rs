//! 受保护图片目录
//!
//! 把不可信的文件名解析为目录内的图片文件。任何请求都只保留
//! 最后一个路径分量，因此解析结果不会离开根目录。

use std::path::{Path, PathBuf};

use tracing::trace;

/// 允许的图片扩展名（小写）
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// 图片类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
}

impl ImageKind {
    /// 根据扩展名识别（大小写不敏感）
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

/// 解析失败的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    /// 文件名为空或只有目录部分
    EmptyName,
    /// 扩展名不在白名单中
    DisallowedExtension(String),
    /// 目录中没有这个文件
    NotFound(String),
}

/// 解析成功的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub path: PathBuf,
    pub kind: ImageKind,
}

/// 取最后一个路径分量（`/` 和 `\` 都视为分隔符）
///
/// `.` 和 `..` 不是文件名，返回 `None`。
pub fn basename(requested: &str) -> Option<&str> {
    let name = requested
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    match name {
        "" | "." | ".." => None,
        _ => Some(name),
    }
}

/// 最后一个 `.` 之后的部分
pub fn extension(name: &str) -> Option<&str> {
    name.rsplit_once('.').map(|(_, ext)| ext)
}

/// 图片根目录
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 校验文件名（不访问文件系统）
    ///
    /// 返回根目录下的候选路径和图片类型。
    pub fn check_name(&self, requested: &str) -> Result<(String, PathBuf, ImageKind), ImageRejection> {
        let name = basename(requested).ok_or(ImageRejection::EmptyName)?;

        let ext = extension(name).unwrap_or_default().to_ascii_lowercase();
        let kind = ImageKind::from_extension(&ext)
            .ok_or_else(|| ImageRejection::DisallowedExtension(ext.clone()))?;

        Ok((name.to_string(), self.root.join(name), kind))
    }

    /// 解析请求的文件名
    ///
    /// 顺序：basename → 扩展名白名单 → 文件存在性
    pub async fn resolve(&self, requested: &str) -> Result<ImageFile, ImageRejection> {
        let (name, path, kind) = self.check_name(requested)?;

        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            trace!("Protected image not found: {}", name);
            return Err(ImageRejection::NotFound(name));
        }

        Ok(ImageFile { name, path, kind })
    }
}
