//! Attendance read-only routes: event history and current-status listing.

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::auth::AuthUser;
use crate::response::{ApiResponse, ErrorBody};
use util::state::AppState;

use super::common::{
    AttendanceEventResponse, ChildStatusResponse, ListEventsQuery, ListEventsResponse, Pagination,
    StatusListResponse,
};
use db::models::attendance_event::{Column as EventCol, Entity as EventEntity};
use db::models::child::{self, AttendanceStatus};
use db::models::user::{self, Role};

/// GET /api/attendance/events
///
/// Filtered history of check-in/out events, most recent first.
///
/// **Query**:
/// - `venueId` *(optional)*: scope to one venue (non-guardian callers)
/// - `childId` *(optional)*
/// - `eventType` *(optional)*: `CHECK_IN` | `CHECK_OUT`
/// - `limit` *(default 50, max 200)* / `offset` *(default 0)*
///
/// Guardians are implicitly scoped to events they authorized.
pub async fn list_events(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(q): Query<ListEventsQuery>,
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
            tracing::error!(error = %e, "failed to resolve caller for event listing");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to fetch check-in/out events")),
            )
                .into_response();
        }
    };

    let limit = q.limit.unwrap_or(50).clamp(1, 200);
    let offset = q.offset.unwrap_or(0);

    let mut sel = EventEntity::find();
    if caller.role == Role::Guardian {
        sel = sel.filter(EventCol::ParentId.eq(caller.id.clone()));
    } else if let Some(venue_id) = &q.venue_id {
        sel = sel.filter(EventCol::VenueId.eq(venue_id.clone()));
    }
    if let Some(child_id) = &q.child_id {
        sel = sel.filter(EventCol::ChildId.eq(child_id.clone()));
    }
    if let Some(event_type) = q.event_type {
        sel = sel.filter(EventCol::EventType.eq(event_type));
    }

    let total = match sel.clone().count(db).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(error = %e, "event count failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to fetch check-in/out events")),
            )
                .into_response();
        }
    };

    let rows = match sel
        .order_by_desc(EventCol::CreatedAt)
        .limit(limit)
        .offset(offset)
        .all(db)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(error = %e, "event listing failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to fetch check-in/out events")),
            )
                .into_response();
        }
    };

    let resp = ListEventsResponse {
        events: rows.into_iter().map(AttendanceEventResponse::from).collect(),
        pagination: Pagination {
            limit,
            offset,
            total,
        },
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Check-in/out events retrieved")),
    )
        .into_response()
}

/// GET /api/attendance/status
///
/// Current projected attendance state for every child of the calling
/// guardian.
pub async fn list_child_statuses(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
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
            tracing::error!(error = %e, "failed to resolve caller for status listing");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to fetch attendance status")),
            )
                .into_response();
        }
    };

    if caller.role != Role::Guardian {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorBody::new("Only guardians can list child statuses")),
        )
            .into_response();
    }

    let children = match child::Model::list_for_guardian(db, &caller.id).await {
        Ok(children) => children,
        Err(e) => {
            tracing::error!(error = %e, "child listing failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new("Failed to fetch attendance status")),
            )
                .into_response();
        }
    };

    let checked_in_count = children
        .iter()
        .filter(|c| c.status == AttendanceStatus::CheckedIn)
        .count();
    let resp = StatusListResponse {
        children: children
            .into_iter()
            .map(|c| {
                let child_name = c.full_name();
                ChildStatusResponse {
                    child_id: c.id,
                    child_name,
                    status: c.status,
                    current_venue_id: c.current_venue_id,
                }
            })
            .collect(),
        checked_in_count,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(resp, "Attendance status retrieved")),
    )
        .into_response()
}
