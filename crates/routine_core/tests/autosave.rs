use routine_core::codec::decode_todos;
use routine_core::{AutosaveHandle, InMemoryKvRepository, Store, StoreConfig, TODOS_KEY};
use std::time::{Duration, Instant};

fn config() -> StoreConfig {
    StoreConfig {
        save_debounce: Duration::from_millis(20),
        seed_default_routines: false,
        autosave_poll_interval: Duration::from_millis(5),
        ..StoreConfig::default()
    }
}

fn wait_for(mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn worker_flushes_after_the_quiet_interval() {
    let repo = InMemoryKvRepository::new();
    let store = Store::open_with_system_clock(repo.clone(), config());
    let handle = AutosaveHandle::spawn(store).unwrap();

    handle.with_store(|store| {
        store.add_todo("Buy milk");
        store.add_todo("Call mom");
    });

    assert!(wait_for(|| repo.writes_for(TODOS_KEY) > 0));
    assert!(!handle.with_store(|store| store.has_pending_save()));
    let saved = decode_todos(&repo.raw(TODOS_KEY).unwrap()).unwrap();
    assert_eq!(saved.records.len(), 2);

    assert!(!handle.shutdown());
    assert_eq!(repo.writes_for(TODOS_KEY), 1);
}

#[test]
fn shutdown_flushes_before_the_deadline() {
    let repo = InMemoryKvRepository::new();
    let slow = StoreConfig {
        save_debounce: Duration::from_secs(60),
        ..config()
    };
    let handle =
        AutosaveHandle::spawn(Store::open_with_system_clock(repo.clone(), slow)).unwrap();

    handle.with_store(|store| store.add_todo("Pay rent"));
    assert_eq!(repo.write_count(), 0);

    assert!(handle.shutdown());
    assert_eq!(repo.writes_for(TODOS_KEY), 1);
}

#[test]
fn dropping_the_handle_flushes() {
    let repo = InMemoryKvRepository::new();
    let slow = StoreConfig {
        save_debounce: Duration::from_secs(60),
        ..config()
    };
    {
        let handle =
            AutosaveHandle::spawn(Store::open_with_system_clock(repo.clone(), slow)).unwrap();
        handle.with_store(|store| store.set_brain_dump_text("notes"));
    }

    assert_eq!(repo.write_count(), 1);
}
