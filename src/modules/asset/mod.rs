use crate::state::AppState;
use axum::Router;
use axum::middleware;
use axum::routing::{get, post};

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;

pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}/download", get(handler::download))
        .route("/{id}/thumbnail", get(handler::thumbnail))
        .route("/{id}/preview", get(handler::preview));

    // Upload routes sit behind admission control.
    let gated_routes = Router::new()
        .route("/upload", post(handler::upload))
        .route("/upload/chunk", post(handler::upload_chunk))
        .route("/upload/complete", post(handler::upload_complete))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::rate_limit::admission_middleware,
        ));

    public_routes.merge(gated_routes)
}
