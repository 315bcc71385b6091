//! HTTPサーバー
//!
//! - `POST /analyze`  画像アップロード → 解析テキスト
//! - `POST /download` 解析テキスト(+画像) → PDF

mod handlers;

use crate::analyzer::{AnalysisCapability, GeminiClient};
use crate::config::Config;
use crate::error::{PlantScanError, Result};
use crate::export::ReportRenderer;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// リクエスト間で共有する読み取り専用の状態
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analyzer: Arc<dyn AnalysisCapability>,
    pub renderer: Arc<ReportRenderer>,
    /// 画像URL取得用
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, analyzer: Arc<dyn AnalysisCapability>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.image_fetch_timeout())
            .build()
            .map_err(|e| PlantScanError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            renderer: Arc::new(ReportRenderer::from_config(&config)),
            config: Arc::new(config),
            analyzer,
            http,
        })
    }

    /// `/download` のボディ上限（Base64化された画像を含む）
    fn download_body_limit(&self) -> usize {
        self.config.max_upload_bytes / 3 * 4 + 64 * 1024
    }
}

pub fn router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    let download_limit = state.download_body_limit();
    let public_dir = state.config.public_dir.clone();

    let router = Router::new()
        .route(
            "/analyze",
            post(handlers::analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/download",
            post(handlers::download).layer(DefaultBodyLimit::max(download_limit)),
        )
        .with_state(state);

    // クライアントページ（index.html など）
    let router = match public_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http())
}

pub async fn serve(config: Config) -> Result<()> {
    let analyzer: Arc<dyn AnalysisCapability> = Arc::new(GeminiClient::new(&config)?);
    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(config = ?config, "starting server");

    let state = AppState::new(config, analyzer)?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌱 PlantScan running at http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
