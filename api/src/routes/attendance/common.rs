use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::services::bulk_attendance::{BatchItem, BatchOutcome};
use db::models::attendance_event::{EventType, Model as EventModel};
use db::models::child::AttendanceStatus;

pub fn default_method() -> String {
    "STAFF_MANUAL".to_owned()
}

/// Body of `POST /api/attendance/bulk`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCheckReq {
    /// Kept as raw JSON on purpose: "absent, empty, or not a sequence"
    /// must be answered with the contract's exact 400 body rather than a
    /// framework deserialization rejection.
    #[serde(default)]
    pub children: Value,
    pub venue_id: Option<String>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub group_notes: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// One entry of the `children` array once its shape has been validated.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkChildReq {
    pub child_id: String,
    pub event_type: EventType,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl From<BulkChildReq> for BatchItem {
    fn from(req: BulkChildReq) -> Self {
        BatchItem {
            child_id: req.child_id,
            event_type: req.event_type,
            qr_code: req.qr_code,
            notes: req.notes,
            parent_id: req.parent_id,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemResult {
    pub success: bool,
    pub child_id: String,
    pub event_id: String,
    pub child_name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkItemFailure {
    pub child_id: String,
    pub error: String,
}

/// 200 envelope of `POST /api/attendance/bulk`. Partial failure is a
/// success envelope by contract: per-item errors ride in `errors`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCheckResponse {
    pub success: bool,
    pub processed: usize,
    pub error_count: usize,
    pub results: Vec<BulkItemResult>,
    pub errors: Vec<BulkItemFailure>,
    pub message: String,
}

impl From<BatchOutcome> for BulkCheckResponse {
    fn from(outcome: BatchOutcome) -> Self {
        let message = outcome.summary_message();
        Self {
            success: true,
            processed: outcome.successes.len(),
            error_count: outcome.failures.len(),
            results: outcome
                .successes
                .into_iter()
                .map(|s| BulkItemResult {
                    success: true,
                    child_id: s.child_id,
                    event_id: s.event_id,
                    child_name: s.child_name,
                })
                .collect(),
            errors: outcome
                .failures
                .into_iter()
                .map(|f| BulkItemFailure {
                    child_id: f.child_id,
                    error: f.error,
                })
                .collect(),
            message,
        }
    }
}

/// Body of `POST /api/attendance/events`.
///
/// The three core fields are optional at the serde level so their absence
/// can be reported together, the way the original endpoint did.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventReq {
    pub child_id: Option<String>,
    pub venue_id: Option<String>,
    pub event_type: Option<EventType>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub qr_code: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEventResponse {
    pub id: String,
    pub child_id: String,
    pub venue_id: String,
    pub parent_id: Option<String>,
    pub event_type: EventType,
    pub method: String,
    pub qr_code: Option<String>,
    pub authorized_by: String,
    pub is_authorized: bool,
    pub notes: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: String,
}

impl From<EventModel> for AttendanceEventResponse {
    fn from(m: EventModel) -> Self {
        Self {
            id: m.id,
            child_id: m.child_id,
            venue_id: m.venue_id,
            parent_id: m.parent_id,
            event_type: m.event_type,
            method: m.method,
            qr_code: m.qr_code,
            authorized_by: m.authorized_by,
            is_authorized: m.is_authorized,
            notes: m.notes,
            metadata: m.metadata,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

/// Query of `GET /api/attendance/events`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListEventsQuery {
    pub venue_id: Option<String>,
    pub child_id: Option<String>,
    pub event_type: Option<EventType>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Serialize)]
pub struct Pagination {
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

#[derive(Serialize)]
pub struct ListEventsResponse {
    pub events: Vec<AttendanceEventResponse>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildStatusResponse {
    pub child_id: String,
    pub child_name: String,
    pub status: AttendanceStatus,
    pub current_venue_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusListResponse {
    pub children: Vec<ChildStatusResponse>,
    pub checked_in_count: usize,
}
