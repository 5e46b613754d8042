use pantheon_core::db::open_db_in_memory;
use pantheon_core::{
    AbodePatch, AbodeService, EmblemService, EntityKind, ErrorCategory, GodKind, GodService,
    NewGod, ServiceError, SqlitePantheonRepository,
};
use uuid::Uuid;

#[test]
fn abode_crud_flow() {
    let conn = open_db_in_memory().unwrap();
    let abodes = AbodeService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let olympus = abodes.create_abode("Olympus", "0,0").unwrap();
    let sea = abodes.create_abode("Sea", "").unwrap();
    assert_eq!(abodes.get_abode(olympus.id).unwrap(), Some(olympus.clone()));
    assert_eq!(abodes.list_abodes().unwrap(), vec![olympus.clone(), sea]);

    let renamed = abodes
        .update_abode(
            olympus.id,
            &AbodePatch {
                name: Some("Mount Olympus".to_string()),
                coordinates: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Mount Olympus");
    assert_eq!(renamed.coordinates, "0,0");

    let deleted = abodes.delete_abode(olympus.id).unwrap();
    assert_eq!(deleted.name, "Mount Olympus");
    assert!(abodes.get_abode(olympus.id).unwrap().is_none());
}

#[test]
fn abode_errors_are_categorized() {
    let conn = open_db_in_memory().unwrap();
    let abodes = AbodeService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let missing = Uuid::new_v4();

    let err = abodes.create_abode(" ", "0,0").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValidationFailed);

    let err = abodes
        .update_abode(
            missing,
            &AbodePatch {
                name: Some("Nowhere".to_string()),
                coordinates: None,
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound { entity: EntityKind::Abode, id } if id == missing
    ));

    let err = abodes
        .update_abode(missing, &AbodePatch::default())
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);

    let err = abodes.delete_abode(missing).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn deleting_an_abode_clears_residents() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePantheonRepository::try_new(&conn).unwrap();
    let gods = GodService::new(repo);
    let abodes = AbodeService::new(repo);
    let zeus = gods
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();
    let olympus = abodes.create_abode("Olympus", "0,0").unwrap();
    let housed = gods.update_abode(zeus.id, olympus.id).unwrap();

    abodes.delete_abode(olympus.id).unwrap();

    let god = gods.get_god(zeus.id).unwrap().unwrap();
    assert_eq!(god.abode_id, None);
    assert!(god.version > housed.version);
}

#[test]
fn emblem_crud_flow() {
    let conn = open_db_in_memory().unwrap();
    let emblems = EmblemService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let bolt = emblems.create_emblem("Bolt").unwrap();
    let trident = emblems.create_emblem("Trident").unwrap();
    assert_eq!(emblems.list_emblems().unwrap(), vec![bolt.clone(), trident]);

    let renamed = emblems.update_emblem(bolt.id, " Thunderbolt ").unwrap();
    assert_eq!(renamed.name, "Thunderbolt");
    assert_eq!(
        emblems.get_emblem(bolt.id).unwrap().unwrap().name,
        "Thunderbolt"
    );

    let deleted = emblems.delete_emblem(bolt.id).unwrap();
    assert_eq!(deleted.id, bolt.id);
    assert!(emblems.get_emblem(bolt.id).unwrap().is_none());
}

#[test]
fn emblem_errors_are_categorized() {
    let conn = open_db_in_memory().unwrap();
    let emblems = EmblemService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let bolt = emblems.create_emblem("Bolt").unwrap();

    let err = emblems.create_emblem("").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValidationFailed);
    let err = emblems.update_emblem(bolt.id, "  ").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::ValidationFailed);
    let err = emblems.update_emblem(Uuid::new_v4(), "Owl").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
    let err = emblems.delete_emblem(Uuid::new_v4()).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn deleting_an_emblem_unlinks_it_from_gods() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePantheonRepository::try_new(&conn).unwrap();
    let gods = GodService::new(repo);
    let emblems = EmblemService::new(repo);
    let athena = gods
        .create_god(NewGod::new("Athena", GodKind::Goddess, ""))
        .unwrap();
    let owl = emblems.create_emblem("Owl").unwrap();
    let aegis = emblems.create_emblem("Aegis").unwrap();
    gods.add_emblem(athena.id, owl.id).unwrap();
    let linked = gods.add_emblem(athena.id, aegis.id).unwrap();

    emblems.delete_emblem(owl.id).unwrap();

    let god = gods.get_god(athena.id).unwrap().unwrap();
    assert_eq!(god.emblem_ids, vec![aegis.id]);
    assert!(god.version > linked.version);
}
