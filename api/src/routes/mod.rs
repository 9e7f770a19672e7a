//! HTTP route entry point for `/api/...`.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/attendance` → Check-in/check-out processing, history and status
//!   (authenticated users; per-resource authorization in the handlers)

use crate::auth::guards::allow_authenticated;
use crate::routes::{attendance::attendance_routes, health::health_routes};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod attendance;
pub mod health;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router has its state applied and mounts all core API
/// routes under their respective base paths.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/attendance",
            attendance_routes().route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
