use routine_core::{
    BrainDumpReport, InMemoryKvRepository, ManualClock, RoutineCategory, RoutinePromotion, Store,
    StoreChange, StoreConfig,
};
use std::sync::{Arc, Mutex};

// 2026-01-15T12:00:00Z
const NOW_MS: i64 = 1_768_478_400_000;

fn open_store() -> Store<InMemoryKvRepository> {
    let config = StoreConfig {
        seed_default_routines: false,
        ..StoreConfig::default()
    };
    Store::open(
        InMemoryKvRepository::new(),
        Arc::new(ManualClock::new(NOW_MS)),
        config,
    )
}

fn titles(store: &Store<InMemoryKvRepository>) -> Vec<String> {
    store.todos().iter().map(|todo| todo.title.clone()).collect()
}

#[test]
fn duplicate_lines_keep_first_casing() {
    let mut store = open_store();

    let report = store.promote_brain_dump_lines("Buy milk\nbuy MILK\n\nCall mom\nCall Mom");

    assert_eq!(
        report,
        BrainDumpReport {
            added: 2,
            internal_duplicates_removed: 2,
            already_existing_skipped: 0,
        }
    );
    assert_eq!(titles(&store), vec!["Buy milk", "Call mom"]);
}

#[test]
fn existing_todos_in_any_state_are_skipped() {
    let mut store = open_store();
    let trashed = store.add_todo("Pay rent").unwrap();
    store.soft_delete_todo(trashed);
    store.add_todo("Call mom");

    let report = store.promote_brain_dump_lines("  pay RENT \r\nCALL MOM\r\nWater plants");

    assert_eq!(report.added, 1);
    assert_eq!(report.already_existing_skipped, 2);
    assert_eq!(report.lines_considered(), 3);
    assert_eq!(titles(&store), vec!["Pay rent", "Call mom", "Water plants"]);
}

#[test]
fn promotion_commits_once() {
    let mut store = open_store();
    let changes = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&changes);
    store.subscribe(move |change| seen.lock().unwrap().push(change));

    store.promote_brain_dump_lines("a\nb\nc");
    store.promote_brain_dump_lines("a\nb\nc");

    assert_eq!(*changes.lock().unwrap(), vec![StoreChange::Todos]);
}

#[test]
fn removed_subscriber_is_not_called() {
    let mut store = open_store();
    let kept = Arc::new(Mutex::new(Vec::new()));
    let removed = Arc::new(Mutex::new(Vec::new()));
    let kept_seen = Arc::clone(&kept);
    let removed_seen = Arc::clone(&removed);
    store.subscribe(move |change| kept_seen.lock().unwrap().push(change));
    let id = store.subscribe(move |change| removed_seen.lock().unwrap().push(change));

    store.add_todo("Before");
    assert!(store.unsubscribe(id));
    assert!(!store.unsubscribe(id));
    store.add_todo("After");
    store.set_brain_dump_text("notes");

    assert_eq!(*removed.lock().unwrap(), vec![StoreChange::Todos]);
    assert_eq!(
        *kept.lock().unwrap(),
        vec![StoreChange::Todos, StoreChange::Todos, StoreChange::BrainDump]
    );
}

#[test]
fn todo_promotion_is_one_revision() {
    let mut store = open_store();
    let id = store.add_todo("Stretch").unwrap();
    let changes = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&changes);
    store.subscribe(move |change| seen.lock().unwrap().push(change));
    let revision = store.revision();

    store.promote_todo_to_routine(id, RoutineCategory::Morning);

    assert_eq!(store.revision(), revision + 1);
    assert_eq!(
        *changes.lock().unwrap(),
        vec![StoreChange::Routines, StoreChange::Todos]
    );
    assert!(store.has_pending_save());
}

#[test]
fn send_is_one_revision() {
    let mut store = open_store();
    store.set_brain_dump_text("Buy milk\nCall mom");
    let revision = store.revision();

    store.send_brain_dump_to_todos();

    assert_eq!(store.revision(), revision + 1);
    assert_eq!(store.todos().len(), 2);
}

#[test]
fn send_clears_text_after_promoting() {
    let mut store = open_store();
    store.set_brain_dump_text("Buy milk\nBuy milk\nCall mom");

    let report = store.send_brain_dump_to_todos();

    assert_eq!(report.added, 2);
    assert_eq!(store.brain_dump_text(), "");
    assert_eq!(titles(&store), vec!["Buy milk", "Call mom"]);
}

#[test]
fn send_keeps_blank_text() {
    let mut store = open_store();
    store.set_brain_dump_text("  \n\n ");
    let revision = store.revision();

    let report = store.send_brain_dump_to_todos();

    assert_eq!(report, BrainDumpReport::default());
    assert_eq!(store.brain_dump_text(), "  \n\n ");
    assert_eq!(store.revision(), revision);
}

#[test]
fn todo_promotes_to_routine_once() {
    let mut store = open_store();
    let first = store.add_todo("Stretch").unwrap();
    let second = store.add_todo("stretch").unwrap();

    let promoted = store.promote_todo_to_routine(first, RoutineCategory::Morning);
    let RoutinePromotion::Promoted(routine_id) = promoted else {
        panic!("unexpected promotion result: {promoted:?}");
    };
    let routine = store.routine(routine_id).unwrap();
    assert_eq!(routine.title, "Stretch");
    assert_eq!(routine.category, RoutineCategory::Morning);
    assert!(store.todo(first).is_none());

    assert_eq!(
        store.promote_todo_to_routine(second, RoutineCategory::Evening),
        RoutinePromotion::AlreadyExists
    );
    assert!(store.todo(second).is_some());
    assert_eq!(
        store.promote_todo_to_routine(first, RoutineCategory::Evening),
        RoutinePromotion::TodoNotFound
    );
    assert_eq!(store.routines().len(), 1);
}
