//! Router configuration for the HTTP API.
//!
//! This module sets up all routes and middleware (CORS, tracing, request
//! timeout) and creates the axum router ready for serving.

use std::time::Duration;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
///
/// Requests running longer than `request_timeout` are answered with
/// `408 Request Timeout` and their handler future is dropped.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    // Permissive CORS; the API carries no cookies.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/health", get(handlers::health_check))
        // Schedules
        .route(
            "/schedules",
            get(handlers::list_schedules).post(handlers::create_schedule),
        )
        .route("/schedules/today", get(handlers::today_schedules))
        .route("/schedules/search", get(handlers::search_schedules))
        .route("/schedules/stats", get(handlers::schedule_stats))
        .route(
            "/schedules/{schedule_id}",
            get(handlers::get_schedule)
                .put(handlers::update_schedule)
                .delete(handlers::delete_schedule),
        )
        .route(
            "/schedules/{schedule_id}/status",
            put(handlers::update_schedule_status),
        )
        .route(
            "/schedules/{schedule_id}/analytics",
            get(handlers::schedule_analytics),
        )
        // Visits
        .route(
            "/schedules/{schedule_id}/visit",
            get(handlers::get_schedule_visit),
        )
        .route(
            "/schedules/{schedule_id}/visit/start",
            post(handlers::start_visit),
        )
        .route("/schedules/{schedule_id}/visit/end", post(handlers::end_visit))
        .route("/visits/active", get(handlers::active_visits))
        .route("/visits/stats", get(handlers::visit_stats))
        // Tasks
        .route(
            "/schedules/{schedule_id}/tasks",
            get(handlers::list_schedule_tasks).post(handlers::create_task),
        )
        .route(
            "/schedules/{schedule_id}/tasks/batch",
            post(handlers::create_batch_tasks),
        )
        .route(
            "/schedules/{schedule_id}/tasks/excuse",
            post(handlers::excuse_pending_tasks),
        )
        .route(
            "/schedules/{schedule_id}/tasks/report",
            get(handlers::task_report),
        )
        .route("/tasks/attention", get(handlers::tasks_requiring_attention))
        .route(
            "/tasks/{task_id}",
            patch(handlers::update_task).delete(handlers::delete_task),
        )
        .route("/tasks/{task_id}/status", put(handlers::update_task_status));

    Router::new()
        .nest("/v1", api_v1)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceSettings;
    use crate::db::RepositoryFactory;
    use crate::services::Services;

    #[test]
    fn test_router_creation() {
        let repos = RepositoryFactory::create_local();
        let state = AppState::new(Services::new(&repos, &ServiceSettings::default()));
        let _router = create_router(state, Duration::from_secs(30));
    }
}
