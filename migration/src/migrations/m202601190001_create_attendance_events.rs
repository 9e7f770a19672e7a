use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601190001_create_attendance_events"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("attendance_events"))
                    .if_not_exists()
                    .col(ColumnDef::new(Alias::new("id")).string().not_null().primary_key())
                    .col(ColumnDef::new(Alias::new("child_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("venue_id")).string().not_null())
                    .col(ColumnDef::new(Alias::new("parent_id")).string().null())
                    .col(ColumnDef::new(Alias::new("event_type")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("method"))
                            .string()
                            .not_null()
                            .default("STAFF_MANUAL"),
                    )
                    .col(ColumnDef::new(Alias::new("qr_code")).string().null())
                    .col(ColumnDef::new(Alias::new("authorized_by")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("is_authorized"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alias::new("notes")).string().null())
                    .col(ColumnDef::new(Alias::new("metadata")).json().null())
                    .col(ColumnDef::new(Alias::new("created_at")).timestamp().not_null().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_event_child")
                            .from(Alias::new("attendance_events"), Alias::new("child_id"))
                            .to(Alias::new("children"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_event_venue")
                            .from(Alias::new("attendance_events"), Alias::new("venue_id"))
                            .to(Alias::new("venues"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_att_event_parent")
                            .from(Alias::new("attendance_events"), Alias::new("parent_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // History reads filter by child, venue and recency.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_att_event_child_created")
                    .table(Alias::new("attendance_events"))
                    .col(Alias::new("child_id"))
                    .col(Alias::new("created_at"))
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_att_event_venue_created")
                    .table(Alias::new("attendance_events"))
                    .col(Alias::new("venue_id"))
                    .col(Alias::new("created_at"))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("attendance_events"))
                    .to_owned(),
            )
            .await
    }
}
