#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use db::models::attendance_event::{EventType, Model as EventModel};
    use db::models::child::{AttendanceStatus, Model as ChildModel};
    use db::models::user::{Model as UserModel, Role};
    use db::models::venue::Model as VenueModel;
    use db::test_utils::setup_test_db;
    use serde_json::json;

    #[tokio::test]
    async fn test_child_starts_checked_out() {
        let (db, _tmp) = setup_test_db().await;

        let guardian = UserModel::create(&db, "Gail", "gail@test.com", Role::Guardian)
            .await
            .unwrap();
        let child = ChildModel::create(&db, "Casey", "Guardian", &guardian.id)
            .await
            .unwrap();

        assert_eq!(child.status, AttendanceStatus::CheckedOut);
        assert_eq!(child.current_venue_id, None);
        assert_eq!(child.full_name(), "Casey Guardian");
    }

    #[tokio::test]
    async fn test_find_for_guardian_scopes_by_owner() {
        let (db, _tmp) = setup_test_db().await;

        let guardian = UserModel::create(&db, "Gail", "gail@test.com", Role::Guardian)
            .await
            .unwrap();
        let other = UserModel::create(&db, "Olga", "olga@test.com", Role::Guardian)
            .await
            .unwrap();
        let child = ChildModel::create(&db, "Casey", "Guardian", &guardian.id)
            .await
            .unwrap();

        let found = ChildModel::find_for_guardian(&db, &child.id, &guardian.id)
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some(child.id.clone()));

        // Owned by a different guardian and a missing row look the same.
        let denied = ChildModel::find_for_guardian(&db, &child.id, &other.id)
            .await
            .unwrap();
        assert!(denied.is_none());
        let missing = ChildModel::find_for_guardian(&db, "no-such-child", &guardian.id)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_set_attendance_maintains_venue_invariant() {
        let (db, _tmp) = setup_test_db().await;

        let guardian = UserModel::create(&db, "Gail", "gail@test.com", Role::Guardian)
            .await
            .unwrap();
        let admin = UserModel::create(&db, "Ada", "ada@test.com", Role::VenueAdmin)
            .await
            .unwrap();
        let venue = VenueModel::create(&db, "Play Central", "1 Fun Way", &admin.id)
            .await
            .unwrap();
        let child = ChildModel::create(&db, "Casey", "Guardian", &guardian.id)
            .await
            .unwrap();

        let child = child
            .set_attendance(&db, AttendanceStatus::CheckedIn, Some(&venue.id))
            .await
            .unwrap();
        assert_eq!(child.status, AttendanceStatus::CheckedIn);
        assert_eq!(child.current_venue_id.as_deref(), Some(venue.id.as_str()));

        let child = child
            .set_attendance(&db, AttendanceStatus::CheckedOut, None)
            .await
            .unwrap();
        assert_eq!(child.status, AttendanceStatus::CheckedOut);
        assert_eq!(child.current_venue_id, None);
    }

    #[tokio::test]
    async fn test_event_append_persists_all_fields() {
        let (db, _tmp) = setup_test_db().await;

        let guardian = UserModel::create(&db, "Gail", "gail@test.com", Role::Guardian)
            .await
            .unwrap();
        let admin = UserModel::create(&db, "Ada", "ada@test.com", Role::VenueAdmin)
            .await
            .unwrap();
        let venue = VenueModel::create(&db, "Play Central", "1 Fun Way", &admin.id)
            .await
            .unwrap();
        let child = ChildModel::create(&db, "Casey", "Guardian", &guardian.id)
            .await
            .unwrap();

        let event = EventModel::create(
            &db,
            &child.id,
            &venue.id,
            Some(&guardian.id),
            EventType::CheckIn,
            "QR_CODE",
            Some("qr-123"),
            &admin.id,
            Some("picked up early"),
            Some(json!({ "kiosk": "front-desk" })),
        )
        .await
        .unwrap();

        assert_eq!(event.child_id, child.id);
        assert_eq!(event.venue_id, venue.id);
        assert_eq!(event.parent_id.as_deref(), Some(guardian.id.as_str()));
        assert_eq!(event.event_type, EventType::CheckIn);
        assert_eq!(event.method, "QR_CODE");
        assert_eq!(event.qr_code.as_deref(), Some("qr-123"));
        assert_eq!(event.authorized_by, admin.id);
        assert!(event.is_authorized);
        assert_eq!(event.notes.as_deref(), Some("picked up early"));
        assert_eq!(event.metadata, Some(json!({ "kiosk": "front-desk" })));
    }

    #[test]
    fn test_role_staff_classification() {
        assert!(!Role::Guardian.is_staff());
        assert!(Role::VenueStaff.is_staff());
        assert!(Role::VenueAdmin.is_staff());
        assert!(Role::SuperAdmin.is_staff());
    }
}
