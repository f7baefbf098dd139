use super::cors::{cors_layer, deny_by_default};
use super::handlers;
use super::state::AppState;
use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{get, post},
    Router,
};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let timeout = state.limits.request_timeout;

    Router::new()
        // Liveness
        .route("/ping", get(handlers::ping).fallback(handlers::not_found))
        // URL hand-off
        .route(
            "/send-url",
            post(handlers::send_url).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(CatchPanicLayer::custom(handlers::panic_response))
        // Slow clients must not hold a connection open indefinitely
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handlers::middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        // Preflight answers OPTIONS before routing
        .layer(cors_layer())
        .layer(middleware::map_response(deny_by_default))
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
