use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// One immutable attendance transition.
///
/// Rows are appended once per transition and never updated or deleted;
/// together they form the audit trail the child projection is derived from.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "attendance_events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub child_id: String,
    pub venue_id: String,
    /// Acting parent; null for staff-initiated transitions with no
    /// declared parent.
    pub parent_id: Option<String>,
    pub event_type: EventType,
    /// How the transition was authorized (e.g. "STAFF_MANUAL", "QR_CODE").
    pub method: String,
    pub qr_code: Option<String>,
    /// Actor that authorized the transition.
    pub authorized_by: String,
    pub is_authorized: bool,
    pub notes: Option<String>,
    /// Arbitrary metadata bag; bulk processing stamps `bulkOperation` and
    /// `groupId` here.
    pub metadata: Option<Json>,
    pub created_at: DateTime<Utc>,
}

/// Direction of an attendance transition.
#[derive(
    Debug, Clone, Copy, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_event_type")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EventType {
    #[sea_orm(string_value = "CHECK_IN")]
    CheckIn,

    #[sea_orm(string_value = "CHECK_OUT")]
    CheckOut,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::child::Entity",
        from = "Column::ChildId",
        to = "super::child::Column::Id"
    )]
    Child,
    #[sea_orm(
        belongs_to = "super::venue::Entity",
        from = "Column::VenueId",
        to = "super::venue::Column::Id"
    )]
    Venue,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ParentId",
        to = "super::user::Column::Id"
    )]
    Parent,
}

impl Related<super::child::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Child.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl Related<super::venue::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Venue.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Appends one transition to the event log.
    ///
    /// Accepts any connection so the append can share a transaction with
    /// the child projection update.
    #[allow(clippy::too_many_arguments)]
    pub async fn create<C: ConnectionTrait>(
        conn: &C,
        child_id: &str,
        venue_id: &str,
        parent_id: Option<&str>,
        event_type: EventType,
        method: &str,
        qr_code: Option<&str>,
        authorized_by: &str,
        notes: Option<&str>,
        metadata: Option<Json>,
    ) -> Result<Model, DbErr> {
        let event = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            child_id: Set(child_id.to_owned()),
            venue_id: Set(venue_id.to_owned()),
            parent_id: Set(parent_id.map(|p| p.to_owned())),
            event_type: Set(event_type),
            method: Set(method.to_owned()),
            qr_code: Set(qr_code.map(|q| q.to_owned())),
            authorized_by: Set(authorized_by.to_owned()),
            is_authorized: Set(true),
            notes: Set(notes.map(|n| n.to_owned())),
            metadata: Set(metadata),
            created_at: Set(Utc::now()),
        };
        event.insert(conn).await
    }
}
