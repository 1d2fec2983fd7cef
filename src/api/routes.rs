use axum::{
    routing::post,
    Router,
    extract::{rejection::JsonRejection, Json, State},
};
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::api::models::ParseRequest;
use crate::summary::ArticleSummary;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/parse", post(parse_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state)
}

async fn parse_handler(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<ArticleSummary>, AppError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!(status = rejection.status().as_u16(), "Rejected request body");
        AppError::InvalidRequest(rejection.body_text())
    })?;

    let url = req
        .url()
        .ok_or_else(|| AppError::InvalidRequest("articleUrl is required".to_string()))?;

    info!(url, "Processing request");
    let start_time = std::time::Instant::now();

    // Last-resort bound; the fetch and model clients carry their own timeouts
    let result = tokio::time::timeout(state.request_timeout, state.pipeline.run(url)).await;

    let elapsed = start_time.elapsed();
    match result {
        Ok(Ok(summary)) => {
            info!(url, ?elapsed, "Successfully summarized article");
            Ok(Json(summary))
        }
        Ok(Err(err)) => {
            error!(url, ?elapsed, stage = err.stage(), error = %err, "Failed to summarize article");
            Err(AppError::Pipeline(err))
        }
        Err(_) => {
            warn!(url, ?elapsed, "Request timed out");
            Err(AppError::Timeout)
        }
    }
}
