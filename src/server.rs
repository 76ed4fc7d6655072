//! Static file server and JSON API for the browser front end.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::gallery::DISPLAY_LIMIT;
use crate::generator::{CycleState, GenerationRequest, Generator, SubmitError};
use crate::progress::ProgressTracker;

const NOT_FOUND_PAGE: &str =
    "<h1>404 - File Not Found</h1><p>The requested file could not be found.</p>";

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Port {0} is already in use. Please use a different port.")]
    PortInUse(u16),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared state for all handlers.
///
/// `progress` must be the observer attached to `generator` for
/// `/api/status` to report live progress.
#[derive(Clone)]
pub struct AppState {
    pub public_dir: Arc<PathBuf>,
    pub generator: Arc<Generator>,
    pub progress: Arc<ProgressTracker>,
}

impl AppState {
    pub fn new(
        public_dir: PathBuf,
        generator: Arc<Generator>,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            public_dir: Arc::new(public_dir),
            generator,
            progress,
        }
    }
}

/// Content type for a file, chosen by its lowercase extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "html" => "text/html",
        "js" => "text/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" => "image/jpg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "woff" => "application/font-woff",
        "woff2" => "application/font-woff2",
        "ttf" => "application/font-ttf",
        "eot" => "application/vnd.ms-fontobject",
        "otf" => "application/font-otf",
        _ => "application/octet-stream",
    }
}

/// Map a request path to a file under `public_dir`.
///
/// `/` serves `index.html`. Returns `None` for paths that would leave the
/// public directory.
pub fn resolve_path(public_dir: &Path, request_path: &str) -> Option<PathBuf> {
    let request_path = if request_path == "/" {
        "/index.html"
    } else {
        request_path
    };

    let mut resolved = public_dir.to_path_buf();
    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(resolved)
}

fn html(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/html")], body).into_response()
}

async fn serve_static(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(path) = resolve_path(&state.public_dir, uri.path()) else {
        log::error!("404: {}", uri);
        return html(StatusCode::NOT_FOUND, NOT_FOUND_PAGE.to_string());
    };

    match tokio::fs::read(&path).await {
        Ok(content) => {
            log::info!("200: {}", uri);
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type_for(&path))],
                content,
            )
                .into_response()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::error!("404: {}", uri);
            html(StatusCode::NOT_FOUND, NOT_FOUND_PAGE.to_string())
        }
        Err(e) => {
            log::error!("500: {:?} - {}", e.kind(), uri);
            html(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("<h1>500 - Server Error</h1><p>Error: {:?}</p>", e.kind()),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct GalleryQuery {
    limit: Option<usize>,
}

async fn gallery(State(state): State<AppState>, Query(query): Query<GalleryQuery>) -> Response {
    let limit = query.limit.unwrap_or(DISPLAY_LIMIT);
    Json(state.generator.gallery_top(limit)).into_response()
}

async fn status(State(state): State<AppState>) -> Response {
    let state_name = match state.generator.state() {
        CycleState::Idle => "idle",
        CycleState::InFlight => "in_flight",
    };
    let progress = state.progress.latest();
    Json(serde_json::json!({
        "state": state_name,
        "percent": progress.as_ref().map(|p| p.percent),
        "message": progress.map(|p| p.message),
    }))
    .into_response()
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Response {
    // The cycle runs on its own task so a dropped connection cannot cancel it.
    let generator = state.generator.clone();
    let cycle = tokio::spawn(async move { generator.submit(request).await });

    match cycle.await {
        Ok(Ok(record)) => Json(record).into_response(),
        Ok(Err(e)) => {
            let status = match e {
                SubmitError::EmptyPrompt | SubmitError::InvalidDuration => StatusCode::BAD_REQUEST,
                SubmitError::InProgress => StatusCode::CONFLICT,
            };
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
        Err(e) => {
            log::error!("Generation task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Video generation failed" })),
            )
                .into_response()
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/gallery", get(gallery))
        .route("/api/status", get(status))
        .route("/api/generate", post(generate))
        .fallback(serve_static)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<(), ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| {
            if source.kind() == std::io::ErrorKind::AddrInUse {
                ServerError::PortInUse(addr.port())
            } else {
                ServerError::Bind { addr, source }
            }
        })?;

    log::info!("Server running at http://localhost:{}", addr.port());
    log::info!("Serving files from: {}", state.public_dir.display());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("index.html")), "text/html");
        assert_eq!(content_type_for(Path::new("app.JS")), "text/javascript");
        assert_eq!(content_type_for(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(content_type_for(Path::new("photo.jpg")), "image/jpg");
        assert_eq!(content_type_for(Path::new("font.woff2")), "application/font-woff2");
        assert_eq!(content_type_for(Path::new("video.mp4")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
    }

    #[test]
    fn test_root_resolves_to_index() {
        let dir = Path::new("/srv/public");
        assert_eq!(resolve_path(dir, "/"), Some(dir.join("index.html")));
        assert_eq!(
            resolve_path(dir, "/css/style.css"),
            Some(dir.join("css").join("style.css"))
        );
        assert_eq!(resolve_path(dir, "/./app.js"), Some(dir.join("app.js")));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let dir = Path::new("/srv/public");
        assert_eq!(resolve_path(dir, "/../secret"), None);
        assert_eq!(resolve_path(dir, "/css/../../etc/passwd"), None);
    }

    #[test]
    fn test_port_in_use_message() {
        assert_eq!(
            ServerError::PortInUse(3001).to_string(),
            "Port 3001 is already in use. Please use a different port."
        );
    }
}
