//! Bulk attendance transition processing.
//!
//! Applies a batch of check-in/check-out requests for one venue as a set of
//! independent operations: every item is authorized and persisted on its
//! own, and a failure of one item never aborts the rest. The caller gets a
//! complete accounting of what succeeded and what failed.

use sea_orm::{DatabaseConnection, DbErr, TransactionTrait};
use serde_json::{Map, Value, json};
use thiserror::Error;
use uuid::Uuid;

use db::models::attendance_event::{self, EventType};
use db::models::child::{self, AttendanceStatus};
use db::models::user::Role;

/// The resolved authenticated actor submitting a batch.
pub struct Caller {
    pub id: String,
    pub role: Role,
}

/// One per-child transition request inside a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub child_id: String,
    pub event_type: EventType,
    pub qr_code: Option<String>,
    pub notes: Option<String>,
    /// Declared acting parent, used for staff-initiated transitions.
    pub parent_id: Option<String>,
}

/// A batch of transition requests plus shared defaults. Transient: exists
/// only for the duration of one processing call.
pub struct BatchRequest {
    pub venue_id: String,
    pub method: String,
    pub group_notes: Option<String>,
    pub metadata: Option<Value>,
    pub items: Vec<BatchItem>,
}

#[derive(Debug)]
pub struct ItemSuccess {
    pub child_id: String,
    pub event_id: String,
    pub child_name: String,
}

#[derive(Debug)]
pub struct ItemFailure {
    pub child_id: String,
    pub error: String,
}

/// Per-item accounting for one processed batch.
/// `successes.len() + failures.len()` always equals the input item count.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub successes: Vec<ItemSuccess>,
    pub failures: Vec<ItemFailure>,
}

impl BatchOutcome {
    pub fn summary_message(&self) -> String {
        format!(
            "{} successful, {} failed",
            self.successes.len(),
            self.failures.len()
        )
    }
}

#[derive(Debug, Error)]
enum ItemError {
    #[error("Child not found or access denied")]
    AccessDenied,
    #[error("Child not found")]
    NotFound,
    #[error("{0}")]
    Store(#[from] DbErr),
}

/// Processes every item of `batch` independently, in input order.
///
/// One group id is generated per call and stamped into the metadata of
/// every event the call appends, so the items of a batch can be correlated
/// in the audit trail afterwards. Re-submitting the same batch appends new
/// events under a new group id; there is no deduplication.
pub async fn process_batch(
    db: &DatabaseConnection,
    caller: &Caller,
    batch: &BatchRequest,
) -> BatchOutcome {
    let group_id = Uuid::new_v4().to_string();
    let mut outcome = BatchOutcome::default();

    for item in &batch.items {
        match process_item(db, caller, batch, &group_id, item).await {
            Ok(success) => outcome.successes.push(success),
            Err(err) => {
                tracing::warn!(
                    child_id = %item.child_id,
                    error = %err,
                    "bulk attendance item failed"
                );
                outcome.failures.push(ItemFailure {
                    child_id: item.child_id.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    outcome
}

/// Applies a single transition: authorization, event append and status
/// projection. The append and the projection share one transaction so a
/// failed item leaves no persisted side effects.
async fn process_item(
    db: &DatabaseConnection,
    caller: &Caller,
    batch: &BatchRequest,
    group_id: &str,
    item: &BatchItem,
) -> Result<ItemSuccess, ItemError> {
    // Guardians may only act on their own children. Staff roles act on any
    // child; the lookup still has to resolve for the display name.
    let child = if caller.role == Role::Guardian {
        child::Model::find_for_guardian(db, &item.child_id, &caller.id)
            .await?
            .ok_or(ItemError::AccessDenied)?
    } else {
        child::Model::find_by_id(db, &item.child_id)
            .await?
            .ok_or(ItemError::NotFound)?
    };

    let parent_id = if caller.role == Role::Guardian {
        Some(caller.id.as_str())
    } else {
        item.parent_id.as_deref()
    };
    let notes = item.notes.as_deref().or(batch.group_notes.as_deref());
    let metadata = merge_metadata(batch.metadata.as_ref(), group_id);

    let (status, venue_id) = match item.event_type {
        EventType::CheckIn => (AttendanceStatus::CheckedIn, Some(batch.venue_id.as_str())),
        EventType::CheckOut => (AttendanceStatus::CheckedOut, None),
    };

    let txn = db.begin().await?;
    let event = attendance_event::Model::create(
        &txn,
        &item.child_id,
        &batch.venue_id,
        parent_id,
        item.event_type,
        &batch.method,
        item.qr_code.as_deref(),
        &caller.id,
        notes,
        Some(metadata),
    )
    .await?;
    let child = child.set_attendance(&txn, status, venue_id).await?;
    txn.commit().await?;

    Ok(ItemSuccess {
        child_id: item.child_id.clone(),
        event_id: event.id,
        child_name: child.full_name(),
    })
}

/// Shared batch metadata plus the bulk-processing markers. A non-object
/// metadata value is ignored rather than rejected.
fn merge_metadata(shared: Option<&Value>, group_id: &str) -> Value {
    let mut map = match shared {
        Some(Value::Object(m)) => m.clone(),
        _ => Map::new(),
    };
    map.insert("bulkOperation".into(), json!(true));
    map.insert("groupId".into(), json!(group_id));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::models::attendance_event::{Column as EventCol, Entity as EventEntity};
    use db::models::child::Model as ChildModel;
    use db::models::user::{Model as UserModel, Role};
    use db::models::venue::Model as VenueModel;
    use db::test_utils::setup_test_db;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

    struct Ctx {
        db: DatabaseConnection,
        _tmp: tempfile::TempDir,
        guardian: UserModel,
        staff: UserModel,
        venue: VenueModel,
        own_child: ChildModel,
        other_child: ChildModel,
    }

    async fn setup() -> Ctx {
        let (db, _tmp) = setup_test_db().await;

        let guardian = UserModel::create(&db, "Gail Guardian", "gail@test.com", Role::Guardian)
            .await
            .unwrap();
        let other_guardian =
            UserModel::create(&db, "Olga Other", "olga@test.com", Role::Guardian)
                .await
                .unwrap();
        let staff = UserModel::create(&db, "Sam Staff", "sam@test.com", Role::VenueStaff)
            .await
            .unwrap();
        let admin = UserModel::create(&db, "Ada Admin", "ada@test.com", Role::VenueAdmin)
            .await
            .unwrap();

        let venue = VenueModel::create(&db, "Play Central", "1 Fun Way", &admin.id)
            .await
            .unwrap();

        let own_child = ChildModel::create(&db, "Casey", "Guardian", &guardian.id)
            .await
            .unwrap();
        let other_child = ChildModel::create(&db, "Olive", "Other", &other_guardian.id)
            .await
            .unwrap();

        Ctx {
            db,
            _tmp,
            guardian,
            staff,
            venue,
            own_child,
            other_child,
        }
    }

    fn item(child_id: &str, event_type: EventType) -> BatchItem {
        BatchItem {
            child_id: child_id.to_owned(),
            event_type,
            qr_code: None,
            notes: None,
            parent_id: None,
        }
    }

    fn batch(venue_id: &str, items: Vec<BatchItem>) -> BatchRequest {
        BatchRequest {
            venue_id: venue_id.to_owned(),
            method: "STAFF_MANUAL".to_owned(),
            group_notes: None,
            metadata: None,
            items,
        }
    }

    #[tokio::test]
    async fn every_item_is_accounted_for() {
        let ctx = setup().await;
        let caller = Caller {
            id: ctx.guardian.id.clone(),
            role: Role::Guardian,
        };

        let req = batch(
            &ctx.venue.id,
            vec![
                item(&ctx.own_child.id, EventType::CheckIn),
                item(&ctx.other_child.id, EventType::CheckIn),
            ],
        );
        let outcome = process_batch(&ctx.db, &caller, &req).await;

        assert_eq!(outcome.successes.len() + outcome.failures.len(), 2);
        assert_eq!(outcome.successes.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.summary_message(), "1 successful, 1 failed");
    }

    #[tokio::test]
    async fn guardian_cannot_act_on_foreign_child() {
        let ctx = setup().await;
        let caller = Caller {
            id: ctx.guardian.id.clone(),
            role: Role::Guardian,
        };

        let req = batch(
            &ctx.venue.id,
            vec![item(&ctx.other_child.id, EventType::CheckIn)],
        );
        let outcome = process_batch(&ctx.db, &caller, &req).await;

        assert!(outcome.successes.is_empty());
        assert_eq!(outcome.failures[0].child_id, ctx.other_child.id);
        assert_eq!(outcome.failures[0].error, "Child not found or access denied");

        // The denied item must leave no trace in the event log.
        let events = EventEntity::find()
            .filter(EventCol::ChildId.eq(ctx.other_child.id.clone()))
            .all(&ctx.db)
            .await
            .unwrap();
        assert!(events.is_empty());

        // And the projection is untouched.
        let child = ChildModel::find_by_id(&ctx.db, &ctx.other_child.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(child.status, AttendanceStatus::CheckedOut);
        assert_eq!(child.current_venue_id, None);
    }

    #[tokio::test]
    async fn successful_items_share_one_group_id() {
        let ctx = setup().await;
        let caller = Caller {
            id: ctx.staff.id.clone(),
            role: Role::VenueStaff,
        };

        let req = BatchRequest {
            metadata: Some(json!({"kiosk": "front-desk"})),
            ..batch(
                &ctx.venue.id,
                vec![
                    item(&ctx.own_child.id, EventType::CheckIn),
                    item(&ctx.other_child.id, EventType::CheckIn),
                ],
            )
        };
        let outcome = process_batch(&ctx.db, &caller, &req).await;
        assert_eq!(outcome.successes.len(), 2);

        let mut group_ids = Vec::new();
        for success in &outcome.successes {
            let event = EventEntity::find_by_id(success.event_id.clone())
                .one(&ctx.db)
                .await
                .unwrap()
                .unwrap();
            let meta = event.metadata.expect("metadata stamped");
            assert_eq!(meta["bulkOperation"], json!(true));
            assert_eq!(meta["kiosk"], json!("front-desk"));
            group_ids.push(meta["groupId"].as_str().unwrap().to_owned());
        }
        assert_eq!(group_ids[0], group_ids[1]);

        // A second call gets its own correlation id.
        let outcome2 = process_batch(&ctx.db, &caller, &req).await;
        let event = EventEntity::find_by_id(outcome2.successes[0].event_id.clone())
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        let meta = event.metadata.unwrap();
        assert_ne!(meta["groupId"].as_str().unwrap(), group_ids[0]);
    }

    #[tokio::test]
    async fn projection_follows_event_type() {
        let ctx = setup().await;
        let caller = Caller {
            id: ctx.staff.id.clone(),
            role: Role::VenueStaff,
        };

        let req = batch(&ctx.venue.id, vec![item(&ctx.own_child.id, EventType::CheckIn)]);
        process_batch(&ctx.db, &caller, &req).await;

        let child = ChildModel::find_by_id(&ctx.db, &ctx.own_child.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(child.status, AttendanceStatus::CheckedIn);
        assert_eq!(child.current_venue_id.as_deref(), Some(ctx.venue.id.as_str()));

        let req = batch(
            &ctx.venue.id,
            vec![item(&ctx.own_child.id, EventType::CheckOut)],
        );
        process_batch(&ctx.db, &caller, &req).await;

        let child = ChildModel::find_by_id(&ctx.db, &ctx.own_child.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(child.status, AttendanceStatus::CheckedOut);
        assert_eq!(child.current_venue_id, None);
    }

    #[tokio::test]
    async fn resubmission_appends_new_events() {
        // Documented behavior: no idempotency. The same batch twice yields
        // two events per item, and a double check-in is accepted silently.
        let ctx = setup().await;
        let caller = Caller {
            id: ctx.staff.id.clone(),
            role: Role::VenueStaff,
        };

        let req = batch(&ctx.venue.id, vec![item(&ctx.own_child.id, EventType::CheckIn)]);
        let first = process_batch(&ctx.db, &caller, &req).await;
        let second = process_batch(&ctx.db, &caller, &req).await;
        assert_eq!(first.successes.len(), 1);
        assert_eq!(second.successes.len(), 1);

        let events = EventEntity::find()
            .filter(EventCol::ChildId.eq(ctx.own_child.id.clone()))
            .all(&ctx.db)
            .await
            .unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn notes_resolution_prefers_item_notes() {
        let ctx = setup().await;
        let caller = Caller {
            id: ctx.staff.id.clone(),
            role: Role::VenueStaff,
        };

        let mut with_notes = item(&ctx.own_child.id, EventType::CheckIn);
        with_notes.notes = Some("left jacket at desk".to_owned());
        let req = BatchRequest {
            group_notes: Some("field trip group".to_owned()),
            ..batch(
                &ctx.venue.id,
                vec![with_notes, item(&ctx.other_child.id, EventType::CheckIn)],
            )
        };
        let outcome = process_batch(&ctx.db, &caller, &req).await;

        let first = EventEntity::find_by_id(outcome.successes[0].event_id.clone())
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.notes.as_deref(), Some("left jacket at desk"));

        let second = EventEntity::find_by_id(outcome.successes[1].event_id.clone())
            .one(&ctx.db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.notes.as_deref(), Some("field trip group"));
    }
}
