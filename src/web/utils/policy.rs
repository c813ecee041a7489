use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::mime::OCTET_STREAM;

pub const CACHE_PUBLIC_IMMUTABLE: &str = "public, max-age=31536000, immutable";
pub const CACHE_PRIVATE_REVALIDATE: &str = "private, no-cache, must-revalidate, max-age=0";

/// 文件名编码时保留的字符（RFC 5987 attr-char 子集）
const FILENAME_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// 强制下载的扩展名：办公文档与压缩包
const ATTACHMENT_EXTENSIONS: &[&str] = &[
    "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "ods", "odp", "rtf", "csv", "zip", "gz",
    "tgz", "tar", "bz2", "xz", "7z", "rar",
];

/// 可长期公开缓存的静态资源扩展名
const STATIC_ASSET_EXTENSIONS: &[&str] = &[
    "js", "mjs", "css", "png", "jpg", "jpeg", "gif", "webp", "avif", "svg", "ico", "bmp", "woff",
    "woff2", "ttf", "otf", "eot", "mp3", "wav", "ogg", "oga", "opus", "m4a", "mp4", "m4v", "webm",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    PublicImmutable,
    PrivateRevalidate,
}

impl CachePolicy {
    pub fn header_value(&self) -> &'static str {
        match self {
            CachePolicy::PublicImmutable => CACHE_PUBLIC_IMMUTABLE,
            CachePolicy::PrivateRevalidate => CACHE_PRIVATE_REVALIDATE,
        }
    }
}

/// 响应策略结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsePlan {
    pub mime_type: String,
    pub disposition: Disposition,
    pub cache_policy: CachePolicy,
    pub content_length: u64,
}

impl ResponsePlan {
    /// `Content-Disposition` 头的值，文件名经过 URL 编码
    pub fn content_disposition(&self, file_name: &str) -> String {
        let encoded = utf8_percent_encode(file_name, FILENAME_ENCODE_SET).to_string();
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            self.disposition.as_str(),
            encoded,
            encoded
        )
    }
}

/// 响应策略：根据扩展名与 MIME 决定展示方式与缓存策略
pub struct ResponsePolicy;

impl ResponsePolicy {
    pub fn plan(extension: &str, mime_type: &str, file_size: u64) -> ResponsePlan {
        let extension = extension.to_ascii_lowercase();

        let disposition = if mime_type.eq_ignore_ascii_case(OCTET_STREAM)
            || ATTACHMENT_EXTENSIONS.contains(&extension.as_str())
        {
            Disposition::Attachment
        } else {
            Disposition::Inline
        };

        // 内容受身份保护，默认不允许共享缓存保存
        let cache_policy = if disposition == Disposition::Inline
            && STATIC_ASSET_EXTENSIONS.contains(&extension.as_str())
        {
            CachePolicy::PublicImmutable
        } else {
            CachePolicy::PrivateRevalidate
        };

        ResponsePlan {
            mime_type: mime_type.to_string(),
            disposition,
            cache_policy,
            content_length: file_size,
        }
    }
}
