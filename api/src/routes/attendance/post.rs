use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, TransactionTrait};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ErrorBody};
use crate::services::bulk_attendance::{self, BatchRequest, Caller};
use util::state::AppState;

use super::common::{
    AttendanceEventResponse, BulkCheckReq, BulkCheckResponse, BulkChildReq, CreateEventReq,
};
use db::models::attendance_event::{EventType, Model as EventModel};
use db::models::child::{self, AttendanceStatus};
use db::models::user::{self, Role};
use db::models::venue;

const EMPTY_CHILDREN_MSG: &str = "Children array is required and must not be empty";

/// POST /api/attendance/bulk
///
/// Processes a batch of check-in/check-out requests for one venue. Items
/// are applied independently: per-item failures are returned in the 200
/// envelope's `errors` array and never abort the rest of the batch. The
/// only request-level rejection is a missing/empty/non-array `children`
/// field, answered with 400 before any item is touched.
pub async fn bulk_check_in_out(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<BulkCheckReq>,
) -> Response {
    let db = state.db();

    let caller = match user::Model::find_by_id(db, &claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Unauthorized")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to resolve caller for bulk attendance");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to perform bulk check-in/out operation")),
            )
                .into_response();
        }
    };

    // The one request-level validation: an empty batch has no well-defined
    // partial result.
    let items: Vec<BulkChildReq> = match body.children {
        Value::Array(ref arr) if !arr.is_empty() => {
            match serde_json::from_value(body.children.clone()) {
                Ok(items) => items,
                Err(_) => {
                    return (StatusCode::BAD_REQUEST, Json(ErrorBody::new(EMPTY_CHILDREN_MSG)))
                        .into_response();
                }
            }
        }
        _ => {
            return (StatusCode::BAD_REQUEST, Json(ErrorBody::new(EMPTY_CHILDREN_MSG)))
                .into_response();
        }
    };

    let Some(venue_id) = body.venue_id else {
        return (StatusCode::BAD_REQUEST, Json(ErrorBody::new("venueId is required")))
            .into_response();
    };

    let batch = BatchRequest {
        venue_id,
        method: body.method,
        group_notes: body.group_notes,
        metadata: body.metadata,
        items: items.into_iter().map(Into::into).collect(),
    };
    let caller = Caller {
        id: caller.id,
        role: caller.role,
    };

    let outcome = bulk_attendance::process_batch(db, &caller, &batch).await;
    (StatusCode::OK, Json(BulkCheckResponse::from(outcome))).into_response()
}

/// POST /api/attendance/events
///
/// Records a single check-in/check-out transition. Guardians may only act
/// on their own children; venue admins only at venues they administer.
/// The event append and the child status projection happen in one
/// transaction.
pub async fn create_event(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(body): Json<CreateEventReq>,
) -> Response {
    let db = state.db();

    let caller = match user::Model::find_by_id(db, &claims.sub).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new("Unauthorized")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to resolve caller for check-in/out event");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to create check-in/out event")),
            )
                .into_response();
        }
    };

    let (Some(child_id), Some(venue_id), Some(event_type)) =
        (body.child_id, body.venue_id, body.event_type)
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new(
                "Missing required fields: childId, venueId, eventType",
            )),
        )
            .into_response();
    };

    let child_row = if caller.role == Role::Guardian {
        match child::Model::find_for_guardian(db, &child_id, &caller.id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                return (
                    StatusCode::FORBIDDEN,
                    Json(ErrorBody::new("Child not found or access denied")),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, "child lookup failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new("Failed to create check-in/out event")),
                )
                    .into_response();
            }
        }
    } else {
        // Venue admins may only record transitions at their own venue.
        if caller.role == Role::VenueAdmin {
            match venue::Model::find_for_admin(db, &venue_id, &caller.id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    return (
                        StatusCode::FORBIDDEN,
                        Json(ErrorBody::new("Venue not found or access denied")),
                    )
                        .into_response();
                }
                Err(e) => {
                    tracing::error!(error = %e, "venue lookup failed");
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorBody::new("Failed to create check-in/out event")),
                    )
                        .into_response();
                }
            }
        }
        match child::Model::find_by_id(db, &child_id).await {
            Ok(Some(c)) => c,
            Ok(None) => {
                return (StatusCode::NOT_FOUND, Json(ErrorBody::new("Child not found")))
                    .into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, "child lookup failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::new("Failed to create check-in/out event")),
                )
                    .into_response();
            }
        }
    };

    let parent_id = if caller.role == Role::Guardian {
        Some(caller.id.clone())
    } else {
        body.parent_id.clone()
    };

    let (status, status_venue) = match event_type {
        EventType::CheckIn => (AttendanceStatus::CheckedIn, Some(venue_id.as_str())),
        EventType::CheckOut => (AttendanceStatus::CheckedOut, None),
    };

    let result: Result<EventModel, DbErr> = async {
        let txn = db.begin().await?;
        let event = EventModel::create(
            &txn,
            &child_id,
            &venue_id,
            parent_id.as_deref(),
            event_type,
            &body.method,
            body.qr_code.as_deref(),
            &caller.id,
            body.notes.as_deref(),
            body.metadata.clone(),
        )
        .await?;
        child_row.set_attendance(&txn, status, status_venue).await?;
        txn.commit().await?;
        Ok(event)
    }
    .await;

    match result {
        Ok(event) => {
            let message = match event_type {
                EventType::CheckIn => "Child checked in successfully",
                EventType::CheckOut => "Child checked out successfully",
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    AttendanceEventResponse::from(event),
                    message,
                )),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to record check-in/out event");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to create check-in/out event")),
            )
                .into_response()
        }
    }
}
