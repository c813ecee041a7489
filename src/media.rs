use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

mod resolve;

pub use resolve::PathResolver;

/// 路径解析错误
///
/// `NotFound` 同时覆盖文件不存在、目录、不可读以及解析后位于根目录之外等情况。
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("invalid path")]
    InvalidPath,
    #[error("not found")]
    NotFound,
    #[error("media root misconfigured: {0}")]
    Config(String),
}

/// 媒体根目录
///
/// 职责：保存启动时规范化后的根目录绝对路径。进程生命周期内只读，
/// 通过 `Arc` 在请求间共享，不会被复制或修改。
#[derive(Debug, Clone)]
pub struct MediaRoot {
    canonical: PathBuf,
}

impl MediaRoot {
    /// 校验并规范化配置中的根目录
    pub fn new(configured: &str) -> Result<Self, MediaError> {
        let trimmed = configured.trim();
        if trimmed.is_empty() {
            return Err(MediaError::Config("media root is not set".into()));
        }
        let raw = Path::new(trimmed);
        if !raw.is_absolute() {
            return Err(MediaError::Config(format!(
                "media root must be absolute: {}",
                trimmed
            )));
        }
        let canonical = std::fs::canonicalize(raw)
            .map_err(|e| MediaError::Config(format!("cannot resolve {}: {}", trimmed, e)))?;
        if !canonical.is_dir() {
            return Err(MediaError::Config(format!(
                "media root is not a directory: {}",
                canonical.display()
            )));
        }
        Ok(Self { canonical })
    }

    pub fn path(&self) -> &Path {
        &self.canonical
    }
}

/// 调用方提交的相对路径及其小写扩展名
#[derive(Debug, Clone)]
pub struct FileRequest {
    raw: String,
    extension: String,
}

impl FileRequest {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let extension = Path::new(&raw)
            .extension()
            .and_then(|value| value.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        Self { raw, extension }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// 下载文件名：请求路径的最后一段
    pub fn file_name(&self) -> &str {
        self.raw
            .rsplit(['/', '\\'])
            .find(|part| !part.is_empty())
            .unwrap_or("download")
    }
}

/// 已校验的文件
///
/// 规范路径位于 [`MediaRoot`] 之内，且为可读的普通文件，只能由 [`PathResolver`] 构建。
/// 持有校验时打开的文件句柄，流式输出直接读取该句柄，不再按路径重新打开。
#[derive(Debug)]
pub struct ResolvedFile {
    path: PathBuf,
    file: File,
    len: u64,
    modified: Option<SystemTime>,
}

impl ResolvedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn into_file(self) -> File {
        self.file
    }
}
