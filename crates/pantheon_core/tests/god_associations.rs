use pantheon_core::db::open_db_in_memory;
use pantheon_core::{
    AbodeService, EmblemService, EntityKind, ErrorCategory, GodKind, GodService, NewGod,
    ResolveOptions, ServiceError, SqlitePantheonRepository, ValidationError,
};
use uuid::Uuid;

#[test]
fn adding_a_domain_twice_keeps_one_entry() {
    let conn = open_db_in_memory().unwrap();
    let gods = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let apollo = gods
        .create_god(NewGod::new("Apollo", GodKind::God, ""))
        .unwrap();

    gods.add_domain(apollo.id, "sun").unwrap();
    let god = gods.add_domain(apollo.id, "sun").unwrap();

    assert_eq!(god.domains, vec!["sun".to_string()]);
}

#[test]
fn domains_keep_insertion_order_and_trim_input() {
    let conn = open_db_in_memory().unwrap();
    let gods = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let apollo = gods
        .create_god(NewGod::new("Apollo", GodKind::God, ""))
        .unwrap();

    for domain in ["sun", " music ", "prophecy", "music"] {
        gods.add_domain(apollo.id, domain).unwrap();
    }

    let god = gods.get_god(apollo.id).unwrap().unwrap();
    assert_eq!(god.domains, vec!["sun", "music", "prophecy"]);
}

#[test]
fn removing_a_missing_domain_leaves_domains_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let gods = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let zeus = gods
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();
    gods.add_domain(zeus.id, "sun").unwrap();

    let god = gods.remove_domain(zeus.id, "nonexistent").unwrap();
    assert_eq!(god.domains, vec!["sun".to_string()]);

    let god = gods.remove_domain(zeus.id, "sun").unwrap();
    assert!(god.domains.is_empty());
}

#[test]
fn blank_domain_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let gods = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let zeus = gods
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();

    let err = gods.add_domain(zeus.id, "   ").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::BlankDomain)
    ));
}

#[test]
fn domain_on_unknown_god_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let gods = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());

    let err = gods.add_domain(Uuid::new_v4(), "sky").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
}

#[test]
fn emblems_are_linked_once_and_unlinked_safely() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePantheonRepository::try_new(&conn).unwrap();
    let gods = GodService::new(repo);
    let emblems = EmblemService::new(repo);
    let zeus = gods
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();
    let bolt = emblems.create_emblem("Thunderbolt").unwrap();
    let eagle = emblems.create_emblem("Eagle").unwrap();

    gods.add_emblem(zeus.id, bolt.id).unwrap();
    gods.add_emblem(zeus.id, eagle.id).unwrap();
    let god = gods.add_emblem(zeus.id, bolt.id).unwrap();
    assert_eq!(god.emblem_ids, vec![bolt.id, eagle.id]);

    let god = gods.remove_emblem(zeus.id, bolt.id).unwrap();
    assert_eq!(god.emblem_ids, vec![eagle.id]);
    let god = gods.remove_emblem(zeus.id, Uuid::new_v4()).unwrap();
    assert_eq!(god.emblem_ids, vec![eagle.id]);

    let holders = emblems.gods_with_emblem(eagle.id).unwrap();
    assert_eq!(holders.len(), 1);
    assert_eq!(holders[0].id, zeus.id);
}

#[test]
fn linking_an_unknown_emblem_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let gods = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let zeus = gods
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();
    let missing = Uuid::new_v4();

    let err = gods.add_emblem(zeus.id, missing).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound { entity: EntityKind::Emblem, id } if id == missing
    ));
}

#[test]
fn olympus_becomes_the_abode_of_zeus() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePantheonRepository::try_new(&conn).unwrap();
    let gods = GodService::new(repo);
    let abodes = AbodeService::new(repo);
    let zeus = gods
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();
    let olympus = abodes.create_abode("Olympus", "0,0").unwrap();

    let god = gods.update_abode(zeus.id, olympus.id).unwrap();
    assert_eq!(god.abode_id, Some(olympus.id));

    let view = gods
        .resolve_god(zeus.id, ResolveOptions::default())
        .unwrap()
        .unwrap();
    let abode = view.abode.unwrap();
    assert_eq!(abode.name, "Olympus");
    assert_eq!(abode.coordinates, "0,0");
}

#[test]
fn abode_assignment_is_last_write_wins() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePantheonRepository::try_new(&conn).unwrap();
    let gods = GodService::new(repo);
    let abodes = AbodeService::new(repo);
    let hades = gods
        .create_god(NewGod::new("Hades", GodKind::God, ""))
        .unwrap();
    let olympus = abodes.create_abode("Olympus", "0,0").unwrap();
    let underworld = abodes.create_abode("Underworld", "").unwrap();

    gods.update_abode(hades.id, olympus.id).unwrap();
    let god = gods.update_abode(hades.id, underworld.id).unwrap();
    assert_eq!(god.abode_id, Some(underworld.id));
    assert!(abodes.gods_in_abode(olympus.id).unwrap().is_empty());
    assert_eq!(abodes.gods_in_abode(underworld.id).unwrap().len(), 1);

    let god = gods.clear_abode(hades.id).unwrap();
    assert_eq!(god.abode_id, None);
}

#[test]
fn unknown_abode_is_not_found_and_keeps_previous_value() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePantheonRepository::try_new(&conn).unwrap();
    let gods = GodService::new(repo);
    let abodes = AbodeService::new(repo);
    let zeus = gods
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();
    let olympus = abodes.create_abode("Olympus", "0,0").unwrap();
    gods.update_abode(zeus.id, olympus.id).unwrap();

    let err = gods.update_abode(zeus.id, Uuid::new_v4()).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::NotFound {
            entity: EntityKind::Abode,
            ..
        }
    ));
    assert_eq!(
        gods.get_god(zeus.id).unwrap().unwrap().abode_id,
        Some(olympus.id)
    );
}
