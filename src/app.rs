use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

pub async fn create_app(state: AppState) -> Router {
    // Slack over the configured cap so multipart framing never trips the
    // transport limit before the per-file check runs.
    let body_limit = (state.config.max_upload_bytes() as usize).saturating_add(1024 * 1024);

    crate::routes::configure_routes(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .with_state(state)
}
