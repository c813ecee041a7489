use std::sync::Arc;
use tracing::info;

use file_gateway::auth::TokenAuthenticator;
use file_gateway::config::Settings;
use file_gateway::media::MediaRoot;
use file_gateway::web::{
    self,
    state::AppState,
    utils::sniff::{ContentSniffer, MagicSniffer, NoSniffer},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("file_gateway=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    info!("[Startup] file-gateway initializing...");

    let settings = Settings::new()?;
    info!(
        "[Config] Binding at {}:{}",
        settings.server.host, settings.server.port
    );

    // 根目录只在启动时校验一次，之后只读共享
    let media_root = MediaRoot::new(&settings.media.root)
        .map_err(|e| anyhow::anyhow!("Invalid media root: {}", e))?;
    info!("[Config] Media root: {}", media_root.path().display());

    if settings.auth.tokens.is_empty() {
        tracing::warn!("[Config] No session tokens configured, every file request will be denied");
    }

    let sniffer: Arc<dyn ContentSniffer> = if settings.media.sniff {
        Arc::new(MagicSniffer)
    } else {
        Arc::new(NoSniffer)
    };

    let state = Arc::new(AppState {
        media_root: Arc::new(media_root),
        authenticator: Arc::new(TokenAuthenticator::new(&settings.auth)),
        sniffer,
        chunk_size: settings.stream.chunk_size_bytes(),
    });

    let app = web::router(state);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("[Startup] Service ready at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
