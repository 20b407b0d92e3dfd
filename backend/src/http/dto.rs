//! Data Transfer Objects for the HTTP API.
//!
//! Domain models already serialize as camelCase JSON and are returned
//! directly; the types here cover request bodies, query strings and the few
//! response envelopes that add information on top of a model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Coordinates, NewTask};
use crate::services::{DataOrigin, Sourced};

/// Request body for creating or replacing a schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub client_name: String,
    pub shift_time: String,
    pub location: String,
}

/// Request body for a bare status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Check-in body. The time defaults to now.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartVisitRequest {
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
}

impl StartVisitRequest {
    pub fn location(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// Check-out body. The time defaults to now.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndVisitRequest {
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
}

impl EndVisitRequest {
    pub fn location(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatusRequest {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTasksRequest {
    pub tasks: Vec<NewTask>,
}

/// Query parameters for `GET /v1/schedules`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Empty means every status
    #[serde(default)]
    pub status: String,
}

/// Query parameters for `GET /v1/schedules/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Body for `POST /v1/schedules/{id}/tasks/excuse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasonRequest {
    pub reason: String,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    10
}

/// Payload tagged with where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcedResponse<T> {
    pub data: T,
    pub source: DataOrigin,
}

impl<T> From<Sourced<T>> for SourcedResponse<T> {
    fn from(sourced: Sourced<T>) -> Self {
        Self {
            data: sourced.data,
            source: sourced.origin,
        }
    }
}

/// Count of tasks touched by a bulk operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedCountResponse {
    pub updated: usize,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Status of the service
    pub status: String,
    /// Version of the API
    pub version: String,
    /// Store connection status
    pub database: String,
}
