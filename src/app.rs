use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/athletes/:id", get(handlers::get_athlete))
        .route("/api/athletes/:id/plan-day", get(handlers::plan_day))
        .route("/api/athletes/:id/complete", post(handlers::complete_day))
        .route("/api/athletes/:id/compliance", get(handlers::compliance))
        .route("/api/logs", get(handlers::list_logs).post(handlers::create_log))
        .route(
            "/api/logs/:id",
            get(handlers::get_log)
                .patch(handlers::update_log)
                .delete(handlers::delete_log),
        )
        .route("/api/reports/volume", get(handlers::volume_report))
        .route("/api/reports/daily", get(handlers::daily_report))
        .route("/api/reports/records", get(handlers::records_report))
        .with_state(state)
}
