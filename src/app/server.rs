use crate::app::error::ApiError;
use crate::core::engine::ScanEngine;
use crate::core::{AnalysisResult, Pipeline};
use crate::domain::model::{UploadRequest, UploadedFile};
use crate::utils::error::{Result, ScanError, UploadError};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 16 MiB, the ceiling for a whole upload request body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub struct AppState<P: Pipeline> {
    pub engine: Arc<ScanEngine<P>>,
    pub max_upload_bytes: usize,
}

impl<P: Pipeline> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

pub fn router<P: Pipeline + 'static>(
    engine: Arc<ScanEngine<P>>,
    max_upload_bytes: usize,
) -> Router {
    Router::new()
        .route("/api/upload", post(upload_file::<P>))
        .route("/api/health", get(health::<P>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            engine,
            max_upload_bytes,
        })
}

pub async fn serve(router: Router, bind: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(addr = %listener.local_addr()?, "🚀 Listening for uploads");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down gracefully...");
        },
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::from(ScanError::ProcessingError {
        message: format!("handler panicked: {}", detail),
    })
    .into_response()
}

fn too_large(limit: usize) -> ApiError {
    let err = ScanError::PayloadTooLarge { limit };
    tracing::warn!("{} ({})", err, err.recovery_suggestion());
    ApiError::from(err)
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return too_large(limit);
    }
    tracing::debug!("Malformed multipart body: {}", err.body_text());
    ApiError::BadRequest(UploadError::MissingFile)
}

/// Collect the first `file` part that carries a filename.
///
/// Every field is read to the end, so the body limit covers the whole request and not
/// just the file part.
pub async fn read_upload_request(
    mut multipart: Multipart,
    max_upload_bytes: usize,
) -> std::result::Result<UploadRequest, ApiError> {
    let to_api_error = |err| multipart_error(err, max_upload_bytes);
    let mut file = None;

    while let Some(field) = multipart.next_field().await.map_err(to_api_error)? {
        // 沒有 filename 參數的 "file" 欄位是一般文字欄位
        let file_name = match (field.name(), field.file_name()) {
            (Some("file"), Some(name)) if file.is_none() => Some(name.to_string()),
            _ => None,
        };

        let data = field.bytes().await.map_err(to_api_error)?;

        if let Some(file_name) = file_name {
            file = Some(UploadedFile {
                file_name,
                data: data.to_vec(),
            });
        }
    }

    Ok(UploadRequest { file })
}

async fn upload_file<P: Pipeline + 'static>(
    State(state): State<AppState<P>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> std::result::Result<Json<AnalysisResult>, ApiError> {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(too_large(state.max_upload_bytes));
        }
        Err(rejection) => {
            tracing::debug!("Not a multipart upload: {}", rejection.body_text());
            return Err(ApiError::BadRequest(UploadError::MissingFile));
        }
    };

    let request = read_upload_request(multipart, state.max_upload_bytes).await?;
    let result = state.engine.run(request).await?;
    Ok(Json(result))
}

async fn health<P: Pipeline + 'static>(
    State(state): State<AppState<P>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "banned_substances": state.engine.pipeline().substance_count(),
    }))
}
