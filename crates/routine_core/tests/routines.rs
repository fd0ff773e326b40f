use routine_core::{
    InMemoryKvRepository, ManualClock, RoutineCategory, RoutineId, Store, StoreConfig,
    SEED_ROUTINES,
};
use std::sync::Arc;
use std::time::Duration;

// 2026-01-15T12:00:00Z
const NOW_MS: i64 = 1_768_478_400_000;

fn open_store(seed: bool) -> (Store<InMemoryKvRepository>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(NOW_MS));
    let config = StoreConfig {
        seed_default_routines: seed,
        ..StoreConfig::default()
    };
    let store = Store::open(InMemoryKvRepository::new(), clock.clone(), config);
    (store, clock)
}

fn ids(store: &Store<InMemoryKvRepository>, category: RoutineCategory) -> Vec<RoutineId> {
    store
        .routines_for(category)
        .iter()
        .map(|routine| routine.id)
        .collect()
}

#[test]
fn first_open_seeds_starter_routines() {
    let (store, _clock) = open_store(true);

    let titles: Vec<_> = store
        .routines()
        .iter()
        .map(|routine| (routine.title.as_str(), routine.category))
        .collect();
    assert_eq!(titles, SEED_ROUTINES.to_vec());
    assert!(store.has_pending_save());
}

#[test]
fn whitespace_titles_are_ignored() {
    let (mut store, _clock) = open_store(false);

    assert!(store.add_routine("   ", RoutineCategory::Morning).is_none());
    assert!(!store.add_routine_if_not_exists("\n", RoutineCategory::Evening));
    assert!(store.routines().is_empty());
    assert_eq!(store.revision(), 0);
}

#[test]
fn add_if_not_exists_suppresses_case_insensitive_duplicates() {
    let (mut store, _clock) = open_store(false);

    assert!(store.add_routine_if_not_exists("Shower", RoutineCategory::Anytime));
    assert!(!store.add_routine_if_not_exists("Shower", RoutineCategory::Anytime));
    assert!(!store.add_routine_if_not_exists(" shower ", RoutineCategory::Evening));

    let showers = store
        .routines()
        .iter()
        .filter(|routine| routine.title == "Shower")
        .count();
    assert_eq!(showers, 1);
}

#[test]
fn toggle_done_today_tracks_the_current_day() {
    let (mut store, clock) = open_store(false);
    let id = store
        .add_routine("Take vitamins (AM)", RoutineCategory::Morning)
        .unwrap();

    assert!(store.toggle_routine_done_today(id, true));
    let today = store.today_key();
    let routine = store.routines_for(RoutineCategory::Morning)[0];
    assert_eq!(routine.last_completed_day, Some(today));
    assert!(store.pending_routines_today(RoutineCategory::Morning).is_empty());

    clock.advance(Duration::from_secs(24 * 60 * 60));
    assert_eq!(store.pending_routines_today(RoutineCategory::Morning).len(), 1);

    assert!(store.toggle_routine_done_today(id, false));
    assert_eq!(store.routine(id).unwrap().last_completed_day, None);
}

#[test]
fn moving_one_category_leaves_others_untouched() {
    let (mut store, _clock) = open_store(false);
    let evening = store.add_routine("Floss", RoutineCategory::Evening).unwrap();
    let m1 = store.add_routine("Stretch", RoutineCategory::Morning).unwrap();
    let anytime = store.add_routine("Walk", RoutineCategory::Anytime).unwrap();
    let m2 = store.add_routine("Journal", RoutineCategory::Morning).unwrap();
    let m3 = store.add_routine("Coffee", RoutineCategory::Morning).unwrap();
    store.toggle_routine_done_today(m1, true);

    let anytime_before = ids(&store, RoutineCategory::Anytime);
    let evening_before = ids(&store, RoutineCategory::Evening);

    store.move_routines(RoutineCategory::Morning, &[0], 2);

    assert_eq!(ids(&store, RoutineCategory::Morning), vec![m2, m1, m3]);
    assert_eq!(ids(&store, RoutineCategory::Anytime), anytime_before);
    assert_eq!(ids(&store, RoutineCategory::Evening), evening_before);
    assert_eq!(anytime_before, vec![anytime]);
    assert_eq!(evening_before, vec![evening]);
    assert_eq!(store.routines().len(), 5);
    assert_eq!(
        store.routine(m1).unwrap().last_completed_day,
        Some(store.today_key())
    );
}

#[test]
fn update_and_delete_ignore_unknown_ids() {
    let (mut store, _clock) = open_store(false);
    let id = store.add_routine("Read", RoutineCategory::Evening).unwrap();

    assert!(store.update_routine(id, "Read 20 pages", RoutineCategory::Anytime));
    let routine = store.routine(id).unwrap();
    assert_eq!(routine.title, "Read 20 pages");
    assert_eq!(routine.category, RoutineCategory::Anytime);

    assert!(store.delete_routine(id));
    assert!(!store.delete_routine(id));
    assert!(!store.update_routine(id, "Gone", RoutineCategory::Morning));
    assert!(!store.toggle_routine_done_today(id, true));
}
