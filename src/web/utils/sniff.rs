use std::io::Read;
use std::path::Path;

/// 读取文件头用于嗅探的最大字节数
const SNIFF_LEN: usize = 512;

/// 内容嗅探接口
///
/// 仅在扩展名表无法识别时调用，可替换以便测试不依赖真实文件。
pub trait ContentSniffer: Send + Sync {
    /// 嗅探不可用或无法判断时返回 `None`
    fn sniff(&self, path: &Path) -> Option<String>;
}

/// 不做嗅探（配置关闭或测试环境）
pub struct NoSniffer;

impl ContentSniffer for NoSniffer {
    fn sniff(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// 基于文件魔数的嗅探实现
pub struct MagicSniffer;

impl ContentSniffer for MagicSniffer {
    fn sniff(&self, path: &Path) -> Option<String> {
        let file = std::fs::File::open(path).ok()?;
        let mut head = Vec::with_capacity(SNIFF_LEN);
        file.take(SNIFF_LEN as u64).read_to_end(&mut head).ok()?;
        sniff_bytes(&head).map(str::to_string)
    }
}

pub fn sniff_bytes(head: &[u8]) -> Option<&'static str> {
    if head.is_empty() {
        return None;
    }

    let detected = match head {
        [b'%', b'P', b'D', b'F', b'-', ..] => "application/pdf",
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => "audio/wav",
        [b'P', b'K', 0x03, 0x04, ..] => "application/zip",
        [0x1F, 0x8B, ..] => "application/gzip",
        [0x1A, 0x45, 0xDF, 0xA3, ..] => "video/webm",
        [b'I', b'D', b'3', ..] => "audio/mpeg",
        [b'O', b'g', b'g', b'S', ..] => "audio/ogg",
        [b'f', b'L', b'a', b'C', ..] => "audio/flac",
        [_, _, _, _, b'f', b't', b'y', b'p', ..] => "video/mp4",
        [0x00, b'a', b's', b'm', ..] => "application/wasm",
        [b'<', b'?', b'x', b'm', b'l', ..] => "application/xml",
        _ => return sniff_text(head),
    };
    Some(detected)
}

/// 无 NUL 字节且为合法 UTF-8（允许末尾被截断的多字节字符）时视为纯文本
fn sniff_text(head: &[u8]) -> Option<&'static str> {
    if head.contains(&0) {
        return None;
    }
    match std::str::from_utf8(head) {
        Ok(_) => Some("text/plain"),
        Err(e) if e.error_len().is_none() && head.len() == SNIFF_LEN => Some("text/plain"),
        Err(_) => None,
    }
}
