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
        .route("/", get(handler::history))
        .route("/{id}", get(handler::status))
        .route("/{id}/download", get(handler::download));

    // Job creation sits behind admission control.
    let gated_routes = Router::new()
        .route("/", post(handler::create))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::middleware::rate_limit::admission_middleware,
        ));

    public_routes.merge(gated_routes)
}
