use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Represents an account in the `users` table.
///
/// Credentials and session issuance live with the external identity
/// provider; this table only carries the profile and role needed to
/// authorize attendance operations.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key, a UUID string (wire ids are strings).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Global role of the account.
    pub role: Role,
    /// Timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Global account roles.
///
/// Guardians may only act on children they are the registered parent of;
/// the staff roles may act on any child at a venue they operate.
#[derive(
    Debug, Clone, PartialEq, EnumIter, DeriveActiveEnum, Display, EnumString, Deserialize, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role_type")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "GUARDIAN")]
    Guardian,

    #[sea_orm(string_value = "VENUE_STAFF")]
    VenueStaff,

    #[sea_orm(string_value = "VENUE_ADMIN")]
    VenueAdmin,

    #[sea_orm(string_value = "SUPER_ADMIN")]
    SuperAdmin,
}

impl Role {
    /// Staff-class roles skip the guardian ownership check on attendance
    /// transitions.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::VenueStaff | Role::VenueAdmin | Role::SuperAdmin)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::child::Entity")]
    Children,
}

impl Related<super::child::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Children.def()
    }
    fn via() -> Option<RelationDef> {
        None
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts a new user with a generated id.
    pub async fn create(
        db: &DatabaseConnection,
        name: &str,
        email: &str,
        role: Role,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let user = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        };
        user.insert(db).await
    }

    /// Looks a user up by primary key.
    pub async fn find_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id.to_owned()).one(db).await
    }
}
