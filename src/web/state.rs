use crate::auth::Authenticator;
use crate::media::MediaRoot;
use crate::web::utils::sniff::ContentSniffer;
use std::sync::Arc;

/// Web 应用全局状态
///
/// 职责：包含所有跨请求共享的只读对象，通过 Arc 注入到 Axum 的 Handler 中。
/// 不包含任何跨请求的可变状态。
pub struct AppState {
    pub media_root: Arc<MediaRoot>,
    pub authenticator: Arc<dyn Authenticator>,
    pub sniffer: Arc<dyn ContentSniffer>,
    /// 流式读取块大小（字节）
    pub chunk_size: usize,
}
