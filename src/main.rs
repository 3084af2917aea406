use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use webdav_link::auth::WebdavAuth;
use webdav_link::server::detect_base_url;
use webdav_link::store::{FileStore, WebdavStore};
use webdav_link::{AppState, ServerConfig, app};

#[tokio::main]
async fn main() {
    // .env 不存在不算错误
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = match ServerConfig::from_env() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("webdav_link: {err}");
            std::process::exit(2);
        }
    };

    let auth = match WebdavAuth::new(&cfg.webdav.username, &cfg.webdav.password, &cfg.webdav.url) {
        Ok(auth) => auth,
        Err(err) => {
            eprintln!("webdav_link: {err}");
            std::process::exit(2);
        }
    };
    let store: Arc<dyn FileStore> = Arc::new(WebdavStore::new(auth, &cfg.webdav.root));

    let base_url = detect_base_url(&cfg.platform, cfg.port).await;
    let state = AppState::new(store, cfg.tuning.clone(), base_url.as_str());
    let gate = state.gate.clone();

    let addr = format!("{}:{}", cfg.bind_address, cfg.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("webdav_link: 无法监听 {addr}: {err}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        bind = %addr,
        base_url = %base_url,
        webdav = ?cfg.webdav,
        max_sessions = cfg.tuning.max_sessions,
        "webdav_link listening"
    );

    let shutdown = async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("收到退出信号，关闭会话闸门");
        gate.close();
    };

    if let Err(err) = axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
    {
        eprintln!("webdav_link server error: {err}");
        std::process::exit(1);
    }
}
