//! HTTP handlers for the REST API.
//!
//! Each handler parses the request, delegates to one service call and
//! returns the result as JSON.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::dto::{
    BatchTasksRequest, EndVisitRequest, HealthResponse, ListQuery, ReasonRequest,
    ScheduleRequest, SearchQuery, SourcedResponse, StartVisitRequest, TaskStatusRequest,
    UpdateStatusRequest, UpdatedCountResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::models::{
    NewTask, Paginated, Schedule, ScheduleAnalytics, ScheduleId, ScheduleWithDetails,
    StatusCounts, Task, TaskId, TaskReport, TaskUpdate, Visit,
};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

fn parse_id<T: FromStr>(raw: &str, what: &str) -> Result<T, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid {} id: {}", what, raw)))
}

// =============================================================================
// Health Check
// =============================================================================

/// GET /v1/health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.services.schedules.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Schedules
// =============================================================================

/// GET /v1/schedules?page&limit&status
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<SourcedResponse<Paginated<Schedule>>> {
    let result = state
        .services
        .schedules
        .get_schedules(query.page, query.limit, &query.status)
        .await?;
    Ok(Json(result.into()))
}

/// POST /v1/schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(request): Json<ScheduleRequest>,
) -> Result<(StatusCode, Json<Schedule>), AppError> {
    let schedule = state
        .services
        .schedules
        .create_schedule(&request.client_name, &request.shift_time, &request.location)
        .await?;
    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /v1/schedules/today
pub async fn today_schedules(
    State(state): State<AppState>,
) -> HandlerResult<SourcedResponse<Vec<Schedule>>> {
    let result = state.services.schedules.get_today_schedules().await?;
    Ok(Json(result.into()))
}

/// GET /v1/schedules/search?q&page&limit
pub async fn search_schedules(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> HandlerResult<SourcedResponse<Paginated<Schedule>>> {
    let result = state
        .services
        .schedules
        .search_schedules(&query.q, query.page, query.limit)
        .await?;
    Ok(Json(result.into()))
}

/// GET /v1/schedules/stats
pub async fn schedule_stats(
    State(state): State<AppState>,
) -> HandlerResult<SourcedResponse<StatusCounts>> {
    let result = state.services.schedules.get_stats().await?;
    Ok(Json(result.into()))
}

/// GET /v1/schedules/{schedule_id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> HandlerResult<SourcedResponse<ScheduleWithDetails>> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let result = state.services.schedules.get_schedule_by_id(id).await?;
    Ok(Json(result.into()))
}

/// PUT /v1/schedules/{schedule_id}
pub async fn update_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(request): Json<ScheduleRequest>,
) -> HandlerResult<Schedule> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let schedule = state
        .services
        .schedules
        .update_schedule(id, &request.client_name, &request.shift_time, &request.location)
        .await?;
    Ok(Json(schedule))
}

/// DELETE /v1/schedules/{schedule_id}
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    state.services.schedules.delete_schedule(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/schedules/{schedule_id}/status
pub async fn update_schedule_status(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<StatusCode, AppError> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    state
        .services
        .schedules
        .update_schedule_status(id, &request.status)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/schedules/{schedule_id}/analytics
pub async fn schedule_analytics(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> HandlerResult<ScheduleAnalytics> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let analytics = state.services.schedules.get_schedule_analytics(id).await?;
    Ok(Json(analytics))
}

// =============================================================================
// Visits
// =============================================================================

/// POST /v1/schedules/{schedule_id}/visit/start
pub async fn start_visit(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(request): Json<StartVisitRequest>,
) -> Result<(StatusCode, Json<Visit>), AppError> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let start_time = request.start_time.unwrap_or_else(Utc::now);
    let visit = state
        .services
        .visits
        .start_visit(id, start_time, request.location())
        .await?;
    Ok((StatusCode::CREATED, Json(visit)))
}

/// POST /v1/schedules/{schedule_id}/visit/end
pub async fn end_visit(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(request): Json<EndVisitRequest>,
) -> HandlerResult<Visit> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let end_time = request.end_time.unwrap_or_else(Utc::now);
    let visit = state
        .services
        .visits
        .end_visit(id, end_time, request.location())
        .await?;
    Ok(Json(visit))
}

/// GET /v1/schedules/{schedule_id}/visit
pub async fn get_schedule_visit(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> HandlerResult<Visit> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let visit = state.services.visits.get_visit_summary(id).await?;
    Ok(Json(visit))
}

/// GET /v1/visits/active
pub async fn active_visits(State(state): State<AppState>) -> HandlerResult<Vec<Visit>> {
    let visits = state.services.visits.get_active_visits().await?;
    Ok(Json(visits))
}

/// GET /v1/visits/stats
pub async fn visit_stats(State(state): State<AppState>) -> HandlerResult<StatusCounts> {
    let stats = state.services.visits.get_visit_stats().await?;
    Ok(Json(stats))
}

// =============================================================================
// Tasks
// =============================================================================

/// GET /v1/schedules/{schedule_id}/tasks
pub async fn list_schedule_tasks(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> HandlerResult<Vec<Task>> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let tasks = state.services.tasks.get_tasks_by_schedule_id(id).await?;
    Ok(Json(tasks))
}

/// POST /v1/schedules/{schedule_id}/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(request): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let task = state
        .services
        .tasks
        .create_task(id, &request.name, request.description)
        .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// POST /v1/schedules/{schedule_id}/tasks/batch
pub async fn create_batch_tasks(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(request): Json<BatchTasksRequest>,
) -> Result<(StatusCode, Json<Vec<Task>>), AppError> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let tasks = state
        .services
        .tasks
        .create_batch_tasks(id, request.tasks)
        .await?;
    Ok((StatusCode::CREATED, Json(tasks)))
}

/// POST /v1/schedules/{schedule_id}/tasks/excuse
///
/// Marks every pending task of the schedule as not completed.
pub async fn excuse_pending_tasks(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
    Json(request): Json<ReasonRequest>,
) -> HandlerResult<UpdatedCountResponse> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let updated = state
        .services
        .tasks
        .mark_pending_tasks_as_not_completed(id, &request.reason)
        .await?;
    Ok(Json(UpdatedCountResponse { updated }))
}

/// GET /v1/schedules/{schedule_id}/tasks/report
pub async fn task_report(
    State(state): State<AppState>,
    Path(schedule_id): Path<String>,
) -> HandlerResult<TaskReport> {
    let id: ScheduleId = parse_id(&schedule_id, "schedule")?;
    let report = state.services.tasks.generate_task_report(id).await?;
    Ok(Json(report))
}

/// PATCH /v1/tasks/{task_id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(update): Json<TaskUpdate>,
) -> HandlerResult<Task> {
    let id: TaskId = parse_id(&task_id, "task")?;
    let task = state.services.tasks.update_task(id, update).await?;
    Ok(Json(task))
}

/// DELETE /v1/tasks/{task_id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id: TaskId = parse_id(&task_id, "task")?;
    state.services.tasks.delete_task(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /v1/tasks/{task_id}/status
pub async fn update_task_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<TaskStatusRequest>,
) -> HandlerResult<Task> {
    let id: TaskId = parse_id(&task_id, "task")?;
    let task = state
        .services
        .tasks
        .update_task_status(id, &request.status, request.reason)
        .await?;
    Ok(Json(task))
}

/// GET /v1/tasks/attention
pub async fn tasks_requiring_attention(State(state): State<AppState>) -> HandlerResult<Vec<Task>> {
    let tasks = state.services.tasks.get_tasks_requiring_attention().await?;
    Ok(Json(tasks))
}
