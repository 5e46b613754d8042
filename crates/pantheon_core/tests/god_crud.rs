use pantheon_core::db::open_db_in_memory;
use pantheon_core::{
    EntityKind, ErrorCategory, GodKind, GodPatch, GodService, NewGod, ServiceError,
    SqlitePantheonRepository, ValidationError,
};
use uuid::Uuid;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let created = service
        .create_god(NewGod::new("Zeus", GodKind::God, "King of the gods"))
        .unwrap();
    let loaded = service.get_god(created.id).unwrap().unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.name, "Zeus");
    assert_eq!(loaded.kind, GodKind::God);
    assert_eq!(loaded.description, "King of the gods");
    assert!(loaded.domains.is_empty());
    assert!(loaded.emblem_ids.is_empty());
    assert_eq!(loaded.abode_id, None);
    assert_eq!(loaded.version, 1);
}

#[test]
fn get_unknown_god_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    assert!(service.get_god(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn list_gods_keeps_creation_order() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let names = ["Zeus", "Hera", "Poseidon", "Demeter"];
    for name in names {
        service
            .create_god(NewGod::new(name, GodKind::God, ""))
            .unwrap();
    }

    let listed = service
        .list_gods()
        .unwrap()
        .into_iter()
        .map(|god| god.name)
        .collect::<Vec<_>>();
    assert_eq!(listed, names);
}

#[test]
fn create_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let err = service
        .create_god(NewGod::new("  ", GodKind::Goddess, ""))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::BlankName)
    ));
    assert_eq!(err.category(), ErrorCategory::ValidationFailed);
    assert!(service.list_gods().unwrap().is_empty());
}

#[test]
fn update_changes_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let god = service
        .create_god(NewGod::new("Apollo", GodKind::God, "old"))
        .unwrap();
    service.add_domain(god.id, "sun").unwrap();

    let patch = GodPatch {
        description: Some("X".to_string()),
        ..GodPatch::default()
    };
    let updated = service.update_god(god.id, &patch, None).unwrap();

    assert_eq!(updated.description, "X");
    assert_eq!(updated.name, "Apollo");
    assert_eq!(updated.kind, GodKind::God);
    assert_eq!(updated.domains, vec!["sun".to_string()]);
}

#[test]
fn update_name_and_type_together() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let god = service
        .create_god(NewGod::new("Artemis", GodKind::God, "hunt"))
        .unwrap();
    let patch = GodPatch {
        name: Some(" Diana ".to_string()),
        kind: Some(GodKind::Goddess),
        description: None,
    };
    let updated = service.update_god(god.id, &patch, None).unwrap();

    assert_eq!(updated.name, "Diana");
    assert_eq!(updated.kind, GodKind::Goddess);
    assert_eq!(updated.description, "hunt");
    assert_eq!(updated.version, god.version + 1);
}

#[test]
fn empty_patch_returns_current_record_without_bumping_version() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let god = service
        .create_god(NewGod::new("Hermes", GodKind::God, ""))
        .unwrap();
    let same = service
        .update_god(god.id, &GodPatch::default(), None)
        .unwrap();
    assert_eq!(same, god);
}

#[test]
fn update_unknown_god_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    let patch = GodPatch {
        name: Some("Nobody".to_string()),
        ..GodPatch::default()
    };
    let err = service.update_god(missing, &patch, None).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound { entity: EntityKind::God, id } if id == missing
    ));
}

#[test]
fn stale_expected_version_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let god = service
        .create_god(NewGod::new("Ares", GodKind::God, ""))
        .unwrap();
    let first = GodPatch {
        description: Some("war".to_string()),
        ..GodPatch::default()
    };
    let updated = service
        .update_god(god.id, &first, Some(god.version))
        .unwrap();
    assert_eq!(updated.version, 2);

    let second = GodPatch {
        description: Some("peace".to_string()),
        ..GodPatch::default()
    };
    let err = service
        .update_god(god.id, &second, Some(god.version))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::VersionConflict {
            expected: 1,
            actual: 2,
            ..
        }
    ));
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(
        service.get_god(god.id).unwrap().unwrap().description,
        "war"
    );
}

#[test]
fn every_write_bumps_version() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let god = service
        .create_god(NewGod::new("Hestia", GodKind::Goddess, ""))
        .unwrap();
    let after_domain = service.add_domain(god.id, "hearth").unwrap();
    assert_eq!(after_domain.version, 2);

    let after_noop = service.add_domain(god.id, "hearth").unwrap();
    assert_eq!(after_noop.version, 2);

    let after_remove = service.remove_domain(god.id, "hearth").unwrap();
    assert_eq!(after_remove.version, 3);
}

#[test]
fn delete_returns_record_and_removes_it() {
    let conn = open_db_in_memory().unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let god = service
        .create_god(NewGod::new("Kronos", GodKind::God, ""))
        .unwrap();
    let deleted = service.delete_god(god.id).unwrap();

    assert_eq!(deleted.id, god.id);
    assert!(service.get_god(god.id).unwrap().is_none());

    let err = service.delete_god(god.id).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}
