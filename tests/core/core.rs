use plushy::core::assets;
use plushy::core::broker::{BrokerEvent, DbBroker};
use plushy::core::db;
use plushy::core::error::PlushyError;
use plushy::core::pool;
use plushy::core::schemas;
use plushy::core::store::Store;
use rusqlite::params;
use std::fs;
use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};
use tempfile::tempdir;

#[test]
fn assets_stylesheet_and_seed_resolve() {
    assert!(assets::get_asset(assets::SEED_CATALOG_PATH).is_some());
    let css = assets::get_text(assets::STYLESHEET_PATH).expect("stylesheet");
    assert!(css.contains(".sidebar"));
    assert_eq!(
        assets::content_type(assets::STYLESHEET_PATH),
        "text/css; charset=utf-8"
    );
    assert!(assets::get_asset("stylesheets/missing.css").is_none());
}

#[test]
fn schema_initialization_is_idempotent_and_versioned() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::new(tmp.path().join("nested/data"));
    db::initialize_inventory_db(&store).expect("first init");
    db::initialize_inventory_db(&store).expect("second init");
    assert!(store.db_path().exists());

    let conn = db::db_connect(&store.db_path().to_string_lossy()).expect("connect");
    let version: String = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .expect("schema version");
    assert_eq!(version, schemas::INVENTORY_SCHEMA_VERSION.to_string());

    let journal: String = conn
        .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
        .expect("journal mode");
    assert_eq!(journal.to_lowercase(), "wal");

    let fk: i64 = conn
        .query_row("PRAGMA foreign_key_list(bags);", [], |row| row.get(0))
        .unwrap_or(-1);
    assert_eq!(fk, -1, "bag references carry no foreign keys");
}

#[test]
fn broker_writes_are_audited_with_status() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::new(tmp.path());
    db::initialize_inventory_db(&store).expect("init");
    let broker = DbBroker::new(&store);

    broker
        .write("color.create", Some("c1"), |conn| {
            conn.execute(
                "INSERT INTO colors(id, name, image, display_order) VALUES(?1, ?2, ?3, ?4)",
                params!["c1", "Red", "/images/red.jpg", 0],
            )?;
            Ok(())
        })
        .expect("write ok");

    let missing: Result<(), PlushyError> = broker.write("color.update", Some("c2"), |_| {
        Err(PlushyError::NotFound("Color not found".to_string()))
    });
    assert!(missing.unwrap_err().is_not_found());

    let failed: Result<(), PlushyError> = broker.write("color.delete", None, |_| {
        Err(PlushyError::ValidationError("intentional".to_string()))
    });
    assert!(failed.is_err());

    let names: Vec<String> = broker
        .read("color.list", |conn| {
            let mut stmt = conn.prepare("SELECT name FROM colors")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            let mut out = Vec::new();
            for r in rows {
                out.push(r?);
            }
            Ok(out)
        })
        .expect("read");
    assert_eq!(names, vec!["Red".to_string()]);

    let events: Vec<BrokerEvent> = fs::read_to_string(store.events_path())
        .expect("read audit")
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid broker event json"))
        .collect();
    let statuses: Vec<_> = events.iter().map(|ev| ev.status.as_str()).collect();
    assert_eq!(statuses, vec!["success", "not_found", "error"]);
    assert_eq!(events[0].record_id.as_deref(), Some("c1"));
    assert_eq!(events[0].db_id, schemas::INVENTORY_DB_NAME);
    assert!(events[2].record_id.is_none());
    assert!(events.iter().all(|ev| ev.ts.ends_with('Z')));
}

#[test]
fn pool_serializes_writes_per_database_only() {
    let tmp = tempdir().expect("tempdir");
    let db_a = tmp.path().join("a.db");
    let db_b = tmp.path().join("b.db");
    let barrier = Arc::new(Barrier::new(2));

    let start = Instant::now();
    let handles: Vec<_> = [db_a, db_b]
        .into_iter()
        .map(|path| {
            let gate = Arc::clone(&barrier);
            std::thread::spawn(move || {
                pool::global_pool().with_write(&path, |conn| {
                    conn.execute("CREATE TABLE IF NOT EXISTS t (id INTEGER)", [])?;
                    gate.wait();
                    std::thread::sleep(Duration::from_millis(150));
                    Ok(())
                })
            })
        })
        .collect();
    for h in handles {
        h.join().expect("thread").expect("write");
    }
    // Both writers reached the barrier, so they held their locks at once.
    assert!(start.elapsed() < Duration::from_secs(5));
}

#[test]
fn reads_see_committed_writes_without_the_write_lock() {
    let tmp = tempdir().expect("tempdir");
    let store = Store::new(tmp.path());
    db::initialize_inventory_db(&store).expect("init");
    let pool = pool::global_pool();

    pool.with_write(&store.db_path(), |conn| {
        conn.execute(
            "INSERT INTO fabrics(id, name, description, image) VALUES('f1', 'Canvas', 'Tough', '/images/canvas.jpg')",
            [],
        )?;
        let seen: i64 = pool.with_read(&store.db_path(), |read| {
            Ok(read.query_row("SELECT COUNT(*) FROM fabrics", [], |row| row.get(0))?)
        })?;
        assert_eq!(seen, 1);
        Ok(())
    })
    .expect("nested read inside write");
}
