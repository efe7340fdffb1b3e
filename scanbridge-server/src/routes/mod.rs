pub mod v1;

use axum::Router;
use axum::routing::get;

use crate::handlers::health;
use crate::infra::app_state::AppState;

/// Assemble the full application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api/v1", v1::create_v1_router())
        .with_state(state)
}
