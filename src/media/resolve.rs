use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

use super::{MediaError, MediaRoot, ResolvedFile};

/// 路径解析器
///
/// 职责：将不可信的相对路径解析为根目录内的真实文件。
/// 包含检查在符号链接解析之后进行，所有失败原因对调用方统一表现为 `NotFound`。
pub struct PathResolver;

impl PathResolver {
    pub fn resolve(root: &MediaRoot, relative: &str) -> Result<ResolvedFile, MediaError> {
        if has_parent_segment(relative) || relative.contains('\0') {
            tracing::debug!("[Resolve] Rejected traversal marker in {:?}", relative);
            return Err(MediaError::InvalidPath);
        }

        // 每次请求重新确认根目录仍然可用
        let root_path = std::fs::canonicalize(root.path()).map_err(|e| {
            MediaError::Config(format!("cannot resolve {}: {}", root.path().display(), e))
        })?;

        let candidate = join_relative(&root_path, relative)?;

        let canonical = match std::fs::canonicalize(&candidate) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!("[Resolve] {:?} not resolvable: {}", relative, e);
                return Err(MediaError::NotFound);
            }
        };

        if !is_contained(&root_path, &canonical) {
            tracing::warn!(
                "[Resolve] {:?} escapes media root via {}",
                relative,
                canonical.display()
            );
            return Err(MediaError::NotFound);
        }

        let file = match std::fs::File::open(&canonical) {
            Ok(file) => file,
            Err(e) => {
                tracing::debug!("[Resolve] {} unreadable: {}", canonical.display(), e);
                return Err(MediaError::NotFound);
            }
        };

        // 以句柄元数据为准，判断实际打开的对象
        let metadata = file.metadata().map_err(|_| MediaError::NotFound)?;
        if !metadata.is_file() {
            tracing::debug!("[Resolve] {} is not a regular file", canonical.display());
            return Err(MediaError::NotFound);
        }

        // 打开之后再次解析：路径仍须位于根目录内，且指向同一个文件
        let reopened = std::fs::canonicalize(&candidate).map_err(|_| MediaError::NotFound)?;
        if reopened != canonical || !is_contained(&root_path, &reopened) {
            tracing::warn!("[Resolve] {:?} changed while opening", relative);
            return Err(MediaError::NotFound);
        }
        let current = std::fs::metadata(&reopened).map_err(|_| MediaError::NotFound)?;
        if !same_file(&metadata, &current) {
            tracing::warn!("[Resolve] {:?} replaced while opening", relative);
            return Err(MediaError::NotFound);
        }

        Ok(ResolvedFile {
            path: canonical,
            file,
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

#[cfg(unix)]
fn same_file(opened: &Metadata, current: &Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    opened.dev() == current.dev() && opened.ino() == current.ino()
}

#[cfg(not(unix))]
fn same_file(opened: &Metadata, current: &Metadata) -> bool {
    opened.len() == current.len() && opened.modified().ok() == current.modified().ok()
}

fn has_parent_segment(relative: &str) -> bool {
    relative.split(['/', '\\']).any(|segment| segment == "..")
}

fn join_relative(root: &Path, relative: &str) -> Result<PathBuf, MediaError> {
    // 去掉前导分隔符，避免 join 时替换掉根目录
    let trimmed = relative.trim_start_matches(['/', '\\']);
    let mut joined = root.to_path_buf();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(MediaError::InvalidPath)
            }
        }
    }
    Ok(joined)
}

/// `Path::starts_with` 按组件比较，`/srv/media2` 不会被视为 `/srv/media` 的子路径
fn is_contained(root: &Path, candidate: &Path) -> bool {
    candidate == root || candidate.starts_with(root)
}
