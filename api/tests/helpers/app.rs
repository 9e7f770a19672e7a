use api::routes::routes;
use axum::Router;
use tempfile::TempDir;
use util::state::AppState;

/// Builds a full application router over a fresh, fully migrated
/// throwaway database.
///
/// The returned `TempDir` guard owns the database file and must be kept
/// alive for the duration of the test.
pub async fn make_test_app() -> (Router, AppState, TempDir) {
    dotenvy::dotenv().ok();

    let (db, tmp) = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db);

    let router = Router::new().nest("/api", routes(app_state.clone()));

    (router, app_state, tmp)
}
