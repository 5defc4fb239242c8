//! Web interface
//!
//! `GET /` serves the chart page, `GET /api/series` the same payload as JSON.
//! Each request re-reads the whole history; storage failures surface as 500.

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::reports::{self, ChartPayload};

#[derive(Debug)]
pub struct AppState {
    db_path: PathBuf,
}

pub struct WebServer {
    state: Arc<AppState>,
}

impl WebServer {
    #[must_use]
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            state: Arc::new(AppState { db_path }),
        }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(chart_page))
            .route("/api/series", get(series_json))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serve on an already bound listener until `signal` resolves.
    pub async fn serve_with_shutdown<F>(self, listener: TcpListener, signal: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!("Web interface listening on http://{}", addr);
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(signal)
            .await
            .context("Web server failed")?;

        Ok(())
    }
}

async fn chart_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let payload = load_payload(&state).await?;
    Ok(Html(reports::render_page(&payload)?))
}

async fn series_json(State(state): State<Arc<AppState>>) -> Result<Json<ChartPayload>, AppError> {
    Ok(Json(load_payload(&state).await?))
}

async fn load_payload(state: &AppState) -> Result<ChartPayload, AppError> {
    let db_path = state.db_path.clone();
    let payload = tokio::task::spawn_blocking(move || reports::load_chart(&db_path)).await??;
    Ok(payload)
}

/// Any failure while building a response; logged and reported as 500
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request failed: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
