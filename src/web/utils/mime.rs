use std::path::Path;

use super::sniff::ContentSniffer;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME 来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeSource {
    Table,
    Sniffed,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeDecision {
    pub mime_type: String,
    pub source: MimeSource,
}

/// 固定扩展名映射表
///
/// 对已知扩展名（尤其是 js/css/html/xml 等 Web 资源）具有最高优先级，
/// 不会被内容嗅探结果覆盖。
pub fn content_type_for_extension(ext: &str) -> Option<&'static str> {
    let mime = match ext {
        // Web
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "md" => "text/markdown",
        "vtt" => "text/vtt",
        "svg" => "image/svg+xml",
        "wasm" => "application/wasm",
        "webmanifest" => "application/manifest+json",
        "xhtml" => "application/xhtml+xml",
        // 文档
        "pdf" => "application/pdf",
        "rtf" => "application/rtf",
        "epub" => "application/epub+zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "odt" => "application/vnd.oasis.opendocument.text",
        "ods" => "application/vnd.oasis.opendocument.spreadsheet",
        "odp" => "application/vnd.oasis.opendocument.presentation",
        // 图片
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        // 音视频
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" | "oga" | "opus" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mkv" => "video/x-matroska",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "m3u8" => "application/vnd.apple.mpegurl",
        "ts" => "video/mp2t",
        // 字体
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "eot" => "application/vnd.ms-fontobject",
        // 压缩包
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        "bz2" => "application/x-bzip2",
        "xz" => "application/x-xz",
        "7z" => "application/x-7z-compressed",
        "rar" => "application/vnd.rar",
        _ => return None,
    };
    Some(mime)
}

/// 嗅探结果是否等同于“未识别”
fn is_generic(sniffed: &str) -> bool {
    let essence = sniffed.split(';').next().unwrap_or("").trim();
    essence.is_empty()
        || essence.eq_ignore_ascii_case(OCTET_STREAM)
        || essence.eq_ignore_ascii_case("application/x-empty")
        || essence.eq_ignore_ascii_case("inode/x-empty")
}

/// MIME 解析器：扩展名表 → 内容嗅探 → 通用二进制类型
pub struct MimeResolver<'a> {
    sniffer: &'a dyn ContentSniffer,
}

impl<'a> MimeResolver<'a> {
    pub fn new(sniffer: &'a dyn ContentSniffer) -> Self {
        Self { sniffer }
    }

    pub fn resolve(&self, extension: &str, file_path: &Path) -> MimeDecision {
        if let Some(mime) = content_type_for_extension(&extension.to_ascii_lowercase()) {
            return MimeDecision {
                mime_type: mime.to_string(),
                source: MimeSource::Table,
            };
        }

        match self.sniffer.sniff(file_path) {
            Some(sniffed) if !is_generic(&sniffed) => MimeDecision {
                mime_type: sniffed.trim().to_string(),
                source: MimeSource::Sniffed,
            },
            _ => MimeDecision {
                mime_type: OCTET_STREAM.to_string(),
                source: MimeSource::Fallback,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::utils::sniff::NoSniffer;
    use std::path::PathBuf;

    struct FixedSniffer(&'static str);

    impl ContentSniffer for FixedSniffer {
        fn sniff(&self, _path: &Path) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn dummy_path() -> PathBuf {
        PathBuf::from("/nonexistent/for-tests")
    }

    #[test]
    fn returns_expected_content_types() {
        assert_eq!(content_type_for_extension("mp4"), Some("video/mp4"));
        assert_eq!(content_type_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(content_type_for_extension("woff2"), Some("font/woff2"));
        assert_eq!(content_type_for_extension("zip"), Some("application/zip"));
        assert_eq!(
            content_type_for_extension("m3u8"),
            Some("application/vnd.apple.mpegurl")
        );
        assert_eq!(content_type_for_extension("unknown"), None);
    }

    #[test]
    fn table_wins_over_sniffer() {
        let sniffer = FixedSniffer("text/plain");
        let resolver = MimeResolver::new(&sniffer);
        for (ext, expected) in [
            ("js", "application/javascript"),
            ("css", "text/css"),
            ("xml", "application/xml"),
            ("JS", "application/javascript"),
        ] {
            let decision = resolver.resolve(ext, &dummy_path());
            assert_eq!(decision.mime_type, expected);
            assert_eq!(decision.source, MimeSource::Table);
        }
    }

    #[test]
    fn unknown_extension_uses_sniffer() {
        let sniffer = FixedSniffer("image/png");
        let decision = MimeResolver::new(&sniffer).resolve("dat", &dummy_path());
        assert_eq!(decision.mime_type, "image/png");
        assert_eq!(decision.source, MimeSource::Sniffed);
    }

    #[test]
    fn unknown_extension_without_sniffer_is_octet_stream() {
        let decision = MimeResolver::new(&NoSniffer).resolve("dat", &dummy_path());
        assert_eq!(decision.mime_type, OCTET_STREAM);
        assert_eq!(decision.source, MimeSource::Fallback);

        let decision = MimeResolver::new(&NoSniffer).resolve("", &dummy_path());
        assert_eq!(decision.mime_type, OCTET_STREAM);
    }

    #[test]
    fn generic_sniff_results_fall_back() {
        for generic in ["", "application/octet-stream", "inode/x-empty; charset=binary"] {
            let sniffer = FixedSniffer(generic);
            let decision = MimeResolver::new(&sniffer).resolve("bin", &dummy_path());
            assert_eq!(decision.mime_type, OCTET_STREAM, "{:?}", generic);
        }
    }
}
