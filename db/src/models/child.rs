use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// A minor under venue care, owned by a guardian account.
///
/// `status` and `current_venue_id` are a projection of the append-only
/// attendance event log: `current_venue_id` is non-null exactly when the
/// child is `CHECKED_IN`. Rows are mutated only through attendance
/// transitions, never deleted by that flow.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "children")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    /// Guardian-of-record (foreign key to `users`).
    pub parent_id: String,
    pub status: AttendanceStatus,
    pub current_venue_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current attendance state of a child.
#[derive(
    Debug, Clone, Copy, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status_type")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum AttendanceStatus {
    #[sea_orm(string_value = "CHECKED_IN")]
    CheckedIn,

    #[sea_orm(string_value = "CHECKED_OUT")]
    CheckedOut,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ParentId",
        to = "super::user::Column::Id"
    )]
    Parent,
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::CurrentVenueId",
        to = "super::venue::Column::Id"
    )]
    CurrentVenue,
    #[sea_orm(has_many = "super::attendance_event::Entity")]
    Events,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parent.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::attendance_event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Events.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts a new child with a generated id, initially checked out.
    pub async fn create(
        db: &DatabaseConnection,
        first_name: &str,
        last_name: &str,
        parent_id: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let child = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            parent_id: Set(parent_id.to_owned()),
            status: Set(AttendanceStatus::CheckedOut),
            current_venue_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        child.insert(db).await
    }

    /// Looks a child up by primary key.
    pub async fn find_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id.to_owned()).one(db).await
    }

    /// Returns the child only if `guardian_id` is its guardian-of-record.
    ///
    /// A missing row and a row owned by a different guardian are
    /// indistinguishable to the caller.
    pub async fn find_for_guardian(
        db: &DatabaseConnection,
        child_id: &str,
        guardian_id: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Id.eq(child_id))
            .filter(Column::ParentId.eq(guardian_id))
            .one(db)
            .await
    }

    /// Lists all children of a guardian, oldest first.
    pub async fn list_for_guardian(
        db: &DatabaseConnection,
        guardian_id: &str,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ParentId.eq(guardian_id))
            .order_by_asc(Column::CreatedAt)
            .all(db)
            .await
    }

    /// Applies an attendance transition to the projected current state.
    ///
    /// `venue_id` must be `Some` for `CheckedIn` and `None` for
    /// `CheckedOut`. Accepts any connection so it can join the same
    /// transaction as the event append.
    pub async fn set_attendance<C: ConnectionTrait>(
        self,
        conn: &C,
        status: AttendanceStatus,
        venue_id: Option<&str>,
    ) -> Result<Model, DbErr> {
        let mut active = self.into_active_model();
        active.status = Set(status);
        active.current_venue_id = Set(venue_id.map(|v| v.to_owned()));
        active.updated_at = Set(Utc::now());
        active.update(conn).await
    }

    /// Display name used in per-item results.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
