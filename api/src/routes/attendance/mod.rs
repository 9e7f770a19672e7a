use axum::{
    Router,
    routing::{get, post},
};
use util::state::AppState;

mod common;
mod get;
mod post;

pub use get::{list_child_statuses, list_events};
pub use post::{bulk_check_in_out, create_event};

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/bulk", post(bulk_check_in_out))
        .route("/events", post(create_event))
        .route("/events", get(list_events))
        .route("/status", get(list_child_statuses))
}
