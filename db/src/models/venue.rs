use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;

/// A physical venue (play center, gym, activity floor) children check in to.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, serde::Serialize)]
#[sea_orm(table_name = "venues")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub address: String,
    /// Account that administers this venue.
    pub admin_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AdminId",
        to = "super::user::Column::Id"
    )]
    Admin,
    #[sea_orm(has_many = "super::attendance_event::Entity")]
    Events,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
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
    /// Inserts a new venue with a generated id.
    pub async fn create(
        db: &DatabaseConnection,
        name: &str,
        address: &str,
        admin_id: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();
        let venue = ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(name.to_owned()),
            address: Set(address.to_owned()),
            admin_id: Set(admin_id.to_owned()),
            created_at: Set(now),
            updated_at: Set(now),
        };
        venue.insert(db).await
    }

    /// Looks a venue up by primary key.
    pub async fn find_by_id(db: &DatabaseConnection, id: &str) -> Result<Option<Model>, DbErr> {
        Entity::find_by_id(id.to_owned()).one(db).await
    }

    /// Returns the venue only if `admin_id` administers it.
    pub async fn find_for_admin(
        db: &DatabaseConnection,
        venue_id: &str,
        admin_id: &str,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Id.eq(venue_id))
            .filter(Column::AdminId.eq(admin_id))
            .one(db)
            .await
    }
}
