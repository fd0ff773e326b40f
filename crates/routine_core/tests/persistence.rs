use routine_core::codec::{decode_routines, decode_todos};
use routine_core::{
    InMemoryKvRepository, KvRepository, ManualClock, RoutineCategory, SqliteKvRepository, Store,
    StoreConfig, BRAIN_DUMP_KEY, ROUTINES_KEY, SEED_ROUTINES, TODOS_KEY,
};
use std::sync::Arc;
use std::time::Duration;

// 2026-01-15T12:00:00Z
const NOW_MS: i64 = 1_768_478_400_000;

fn config() -> StoreConfig {
    StoreConfig {
        save_debounce: Duration::from_millis(400),
        seed_default_routines: false,
        ..StoreConfig::default()
    }
}

#[test]
fn rapid_mutations_produce_one_write() {
    let repo = InMemoryKvRepository::new();
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let mut store = Store::open(repo.clone(), clock.clone(), config());

    for index in 0..5 {
        store.add_todo(&format!("Task {index}"));
        clock.advance(Duration::from_millis(50));
        assert!(!store.tick());
    }
    assert_eq!(repo.write_count(), 0);

    // Last mutation at +200 ms, clock now at +250 ms: due at +600 ms.
    assert_eq!(store.pending_save_deadline_ms(), Some(NOW_MS + 600));
    clock.advance(Duration::from_millis(349));
    assert!(!store.tick());
    clock.advance(Duration::from_millis(1));
    assert!(store.tick());

    assert_eq!(repo.write_count(), 1);
    assert_eq!(repo.writes_for(TODOS_KEY), 1);
    let saved = decode_todos(&repo.raw(TODOS_KEY).unwrap()).unwrap();
    assert_eq!(saved.records.len(), 5);
    assert!(!store.has_pending_save());
}

#[test]
fn flush_writes_latest_snapshot_of_dirty_keys_only() {
    let repo = InMemoryKvRepository::new();
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let mut store = Store::open(repo.clone(), clock, config());

    let id = store.add_todo("Pay rent").unwrap();
    store.update_todo_title(id, "Pay rent today");

    assert!(store.flush_now());
    assert!(!store.flush_now());
    assert_eq!(repo.writes_for(TODOS_KEY), 1);
    assert_eq!(repo.writes_for(ROUTINES_KEY), 0);
    assert_eq!(repo.writes_for(BRAIN_DUMP_KEY), 0);

    let saved = decode_todos(&repo.raw(TODOS_KEY).unwrap()).unwrap();
    assert_eq!(saved.records[0].title, "Pay rent today");
}

#[test]
fn dropping_the_store_flushes_pending_changes() {
    let repo = InMemoryKvRepository::new();
    let clock = Arc::new(ManualClock::new(NOW_MS));

    {
        let mut store = Store::open(repo.clone(), clock, config());
        store.add_routine("Stretch", RoutineCategory::Morning);
        store.set_brain_dump_text("call the dentist");
        assert_eq!(repo.write_count(), 0);
    }

    assert_eq!(repo.writes_for(ROUTINES_KEY), 1);
    assert_eq!(repo.raw(BRAIN_DUMP_KEY).unwrap(), b"call the dentist");
}

#[test]
fn state_survives_reopen_through_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routine.sqlite3");
    let clock = Arc::new(ManualClock::new(NOW_MS));

    let (routine_id, todo_id) = {
        let mut store = Store::open(
            SqliteKvRepository::open(&path).unwrap(),
            clock.clone(),
            config(),
        );
        let routine_id = store.add_routine("Stretch", RoutineCategory::Morning).unwrap();
        store.toggle_routine_done_today(routine_id, true);
        let todo_id = store.add_todo("Pay rent").unwrap();
        store.soft_delete_todo(todo_id);
        store.set_brain_dump_text("groceries\nlaundry");
        assert!(store.close());
        (routine_id, todo_id)
    };

    let store = Store::open(SqliteKvRepository::open(&path).unwrap(), clock, config());
    let routine = store.routine(routine_id).unwrap();
    assert_eq!(routine.title, "Stretch");
    assert_eq!(routine.last_completed_day, Some(store.today_key()));
    let todo = store.todo(todo_id).unwrap();
    assert_eq!(todo.deleted_at, Some(NOW_MS));
    assert_eq!(store.brain_dump_text(), "groceries\nlaundry");
    assert!(!store.has_pending_save());
}

#[test]
fn seeded_routines_are_persisted_on_first_run() {
    let repo = InMemoryKvRepository::new();
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let seeded = StoreConfig {
        seed_default_routines: true,
        ..config()
    };

    let first_ids: Vec<_> = {
        let store = Store::open(repo.clone(), clock.clone(), seeded.clone());
        store.routines().iter().map(|routine| routine.id).collect()
    };
    assert_eq!(repo.writes_for(ROUTINES_KEY), 1);

    let store = Store::open(repo.clone(), clock, seeded);
    let second_ids: Vec<_> = store.routines().iter().map(|routine| routine.id).collect();
    assert_eq!(first_ids, second_ids);
    assert_eq!(second_ids.len(), SEED_ROUTINES.len());
}

#[test]
fn unreadable_routines_fall_back_to_seed_without_overwriting() {
    let repo = InMemoryKvRepository::new();
    repo.insert_raw(ROUTINES_KEY, b"{not json".to_vec());
    repo.insert_raw(TODOS_KEY, br#"[{"id":"oops"}]"#.to_vec());
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let seeded = StoreConfig {
        seed_default_routines: true,
        ..config()
    };

    let store = Store::open(repo.clone(), clock, seeded);
    assert_eq!(store.routines().len(), SEED_ROUTINES.len());
    assert!(store.todos().is_empty());
    assert!(!store.has_pending_save());
    drop(store);

    assert_eq!(repo.write_count(), 0);
    assert_eq!(repo.raw(ROUTINES_KEY).unwrap(), b"{not json");
}

#[test]
fn saved_blobs_use_the_shared_wire_format() {
    let repo = InMemoryKvRepository::new();
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let mut store = Store::open(repo.clone(), clock, config());
    store.add_routine("Shower", RoutineCategory::Anytime);
    store.add_todo("Buy milk");
    assert!(store.flush_now());

    let routines: serde_json::Value =
        serde_json::from_slice(&repo.get(ROUTINES_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(routines[0]["title"], "Shower");
    assert_eq!(routines[0]["category"], "Anytime");
    let todos: serde_json::Value =
        serde_json::from_slice(&repo.get(TODOS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(todos[0]["isDone"], false);
    assert_eq!(todos[0]["createdAt"], NOW_MS);

    let decoded = decode_routines(&repo.raw(ROUTINES_KEY).unwrap()).unwrap();
    assert_eq!(decoded.skipped, 0);
}
