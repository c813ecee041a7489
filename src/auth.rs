use axum::http::{header, HeaderMap};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::config::AuthSettings;

/// 已通过鉴权的调用方
///
/// 网关本身不使用其中的身份细节，仅用于日志。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
}

/// 鉴权拒绝
///
/// `login_url` 由宿主鉴权组件决定：若存在，错误渲染层输出登录重定向。
#[derive(Debug, Clone, Default)]
pub struct AccessDenied {
    pub login_url: Option<String>,
}

/// 宿主会话服务抽象
///
/// 职责：判断当前请求是否已登录。网关不实现自己的用户/会话模型，
/// 任何“可信内部调用方”都必须由实现者显式授予 `Identity`。
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AccessDenied>;
}

/// 基于会话令牌的默认实现
///
/// 接受 `Authorization: Bearer <token>` 或指定 Cookie 中的令牌。
/// 只保存令牌摘要，比较为常量时间。
pub struct TokenAuthenticator {
    token_digests: Vec<[u8; 32]>,
    cookie_name: String,
    login_url: Option<String>,
}

impl TokenAuthenticator {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            token_digests: settings
                .tokens
                .iter()
                .map(|token| token.trim())
                .filter(|token| !token.is_empty())
                .map(digest)
                .collect(),
            cookie_name: settings.cookie_name.clone(),
            login_url: settings.login_url.clone(),
        }
    }

    fn is_known(&self, presented: &[u8; 32]) -> bool {
        // 不提前退出，逐个比较全部摘要
        self.token_digests
            .iter()
            .fold(0u8, |hit, known| hit | known[..].ct_eq(&presented[..]).unwrap_u8())
            == 1
    }

    fn bearer_token(headers: &HeaderMap) -> Option<&str> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
    }

    fn cookie_token<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim())
    }
}

#[async_trait::async_trait]
impl Authenticator for TokenAuthenticator {
    async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AccessDenied> {
        let presented = Self::bearer_token(headers).or_else(|| self.cookie_token(headers));
        match presented.filter(|token| !token.is_empty()).map(digest) {
            Some(presented) if self.is_known(&presented) => Ok(Identity {
                // 日志中只出现摘要前缀
                subject: format!("session:{}", hex_prefix(&presented)),
            }),
            _ => Err(AccessDenied {
                login_url: self.login_url.clone(),
            }),
        }
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

fn hex_prefix(digest: &[u8; 32]) -> String {
    digest[..4].iter().map(|b| format!("{:02x}", b)).collect()
}
