use config::{Config, Environment, File};
use serde::Deserialize;

/// 应用配置总结构
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub media: MediaSettings,
    pub auth: AuthSettings,
    pub stream: StreamSettings,
}

/// 服务相关配置（监听地址、端口）
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// 媒体根目录配置
///
/// 职责：提供对外服务的文件根目录，启动时规范化一次，运行期间只读。
#[derive(Debug, Deserialize, Clone)]
pub struct MediaSettings {
    /// 文件根目录（绝对路径）。为空时启动失败。
    pub root: String,
    /// 扩展名未知时是否读取文件头进行内容嗅探
    #[serde(default = "default_sniff")]
    pub sniff: bool,
}

/// 鉴权配置
///
/// 会话系统由宿主提供，这里只保存令牌校验所需的最小信息。
#[derive(Debug, Deserialize, Clone)]
pub struct AuthSettings {
    /// 允许访问的会话令牌列表（Bearer 或 Cookie）
    #[serde(default)]
    pub tokens: Vec<String>,
    /// 承载会话令牌的 Cookie 名称
    pub cookie_name: String,
    /// 若设置，未登录请求将被重定向到该地址，而非返回 401
    pub login_url: Option<String>,
}

/// 流式传输配置
#[derive(Debug, Deserialize, Clone)]
pub struct StreamSettings {
    /// 单次读取块大小（单位：KB），默认 64KB
    pub chunk_size_kb: usize,
}

fn default_sniff() -> bool {
    true
}

impl StreamSettings {
    pub fn chunk_size_bytes(&self) -> usize {
        self.chunk_size_kb.max(1) * 1024
    }
}

impl Settings {
    /// 加载配置：支持默认值、可选配置文件、环境变量覆盖
    pub fn new() -> anyhow::Result<Self> {
        let builder = Config::builder()
            // 默认值（代码内硬编码）
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("media.root", "")?
            .set_default("media.sniff", true)?
            .set_default("auth.tokens", Vec::<String>::new())?
            .set_default("auth.cookie_name", "gateway_session")?
            .set_default::<&str, Option<String>>("auth.login_url", None)?
            .set_default("stream.chunk_size_kb", 64)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("GATEWAY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.tokens")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
