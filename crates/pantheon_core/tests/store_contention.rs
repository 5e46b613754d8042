use pantheon_core::db::{open_db, open_db_with_options, DbOptions};
use pantheon_core::{
    ErrorCategory, GodKind, GodPatch, GodService, NewGod, ServiceError, SqlitePantheonRepository,
};
use rusqlite::Connection;
use std::thread;
use std::time::{Duration, Instant};

const WRITERS: usize = 4;
const ROUNDS: usize = 50;

#[test]
fn parallel_writers_on_one_god_wait_instead_of_timing_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pantheon.db");

    let conn = open_db(&path).unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let zeus = service
        .create_god(NewGod::new("Zeus", GodKind::God, ""))
        .unwrap();

    let handles = (0..WRITERS)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
                let mut failures = Vec::new();
                for round in 0..ROUNDS {
                    let patch = GodPatch {
                        description: Some(format!("writer {writer} round {round}")),
                        ..GodPatch::default()
                    };
                    if let Err(err) = service.update_god(zeus.id, &patch, None) {
                        failures.push(err.category());
                    }
                    let domain = format!("domain-{writer}-{round}");
                    if let Err(err) = service.add_domain(zeus.id, &domain) {
                        failures.push(err.category());
                    }
                }
                failures
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        let failures = handle.join().unwrap();
        assert!(failures.is_empty(), "writer failed: {failures:?}");
    }

    let stored = service.get_god(zeus.id).unwrap().unwrap();
    assert_eq!(stored.domains.len(), WRITERS * ROUNDS);
    assert_eq!(stored.version, 1 + (WRITERS * ROUNDS * 2) as i64);
}

#[test]
fn held_write_lock_surfaces_as_timeout_after_busy_wait() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pantheon.db");
    let options = DbOptions {
        busy_timeout: Duration::from_millis(50),
    };

    let conn = open_db_with_options(&path, &options).unwrap();
    let service = GodService::new(SqlitePantheonRepository::try_new(&conn).unwrap());
    let helios = service
        .create_god(NewGod::new("Helios", GodKind::God, ""))
        .unwrap();

    let blocker = Connection::open(&path).unwrap();
    blocker.execute_batch("BEGIN IMMEDIATE;").unwrap();

    let started_at = Instant::now();
    let err = service.add_domain(helios.id, "sun").unwrap_err();
    assert!(matches!(err, ServiceError::Timeout));
    assert_eq!(err.category(), ErrorCategory::Timeout);
    assert!(started_at.elapsed() >= Duration::from_millis(40));

    blocker.execute_batch("ROLLBACK;").unwrap();
    let updated = service.add_domain(helios.id, "sun").unwrap();
    assert_eq!(updated.domains, vec!["sun".to_string()]);
}
