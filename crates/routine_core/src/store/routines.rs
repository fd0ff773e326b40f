//! Routine operations on the store.

use super::reorder::move_offsets;
use super::{Store, StoreChange};
use crate::model::normalize_title;
use crate::model::routine::{RoutineCategory, RoutineId, RoutineRecord};
use crate::promotion::titles_match;
use crate::repo::kv_repo::KvRepository;

impl<R: KvRepository> Store<R> {
    /// Appends a routine; blank titles are ignored.
    pub fn add_routine(&mut self, title: &str, category: RoutineCategory) -> Option<RoutineId> {
        let title = normalize_title(title)?;
        let routine = RoutineRecord::new(title, category);
        let id = routine.id;
        self.routines.push(routine);
        self.commit(StoreChange::Routines);
        Some(id)
    }

    /// Adds a routine unless one with the same title exists in any category.
    pub fn add_routine_if_not_exists(&mut self, title: &str, category: RoutineCategory) -> bool {
        if self.routine_title_exists(title) {
            return false;
        }
        self.add_routine(title, category).is_some()
    }

    /// Case-insensitive trimmed title match across all categories.
    pub fn routine_title_exists(&self, title: &str) -> bool {
        let Some(title) = normalize_title(title) else {
            return false;
        };
        self.routines
            .iter()
            .any(|routine| titles_match(&routine.title, &title))
    }

    pub fn routine(&self, id: RoutineId) -> Option<&RoutineRecord> {
        self.routines.iter().find(|routine| routine.id == id)
    }

    pub fn delete_routine(&mut self, id: RoutineId) -> bool {
        let Some(index) = self.routine_index(id) else {
            return false;
        };
        self.routines.remove(index);
        self.commit(StoreChange::Routines);
        true
    }

    /// Marks a routine done (today's key) or not done (`None`).
    pub fn toggle_routine_done_today(&mut self, id: RoutineId, is_done: bool) -> bool {
        let next = is_done.then(|| self.clock.today_key());
        let Some(index) = self.routine_index(id) else {
            return false;
        };
        if self.routines[index].last_completed_day == next {
            return false;
        }
        self.routines[index].last_completed_day = next;
        self.commit(StoreChange::Routines);
        true
    }

    /// Overwrites title and category in place; position is preserved.
    pub fn update_routine(
        &mut self,
        id: RoutineId,
        title: &str,
        category: RoutineCategory,
    ) -> bool {
        let Some(title) = normalize_title(title) else {
            return false;
        };
        let Some(index) = self.routine_index(id) else {
            return false;
        };
        let routine = &mut self.routines[index];
        if routine.title == title && routine.category == category {
            return false;
        }
        routine.title = title;
        routine.category = category;
        self.commit(StoreChange::Routines);
        true
    }

    /// Reorders routines within one category.
    ///
    /// Offsets index into `routines_for(category)`. The collection is rebuilt
    /// as Morning, Anytime, Evening; other categories keep their order.
    pub fn move_routines(
        &mut self,
        category: RoutineCategory,
        from_offsets: &[usize],
        to_offset: usize,
    ) {
        let mut rebuilt = Vec::with_capacity(self.routines.len());
        for bucket in RoutineCategory::ALL {
            let mut items: Vec<RoutineRecord> = self
                .routines
                .iter()
                .filter(|routine| routine.category == bucket)
                .cloned()
                .collect();
            if bucket == category {
                move_offsets(&mut items, from_offsets, to_offset);
            }
            rebuilt.extend(items);
        }

        if rebuilt != self.routines {
            self.routines = rebuilt;
            self.commit(StoreChange::Routines);
        }
    }

    /// Routines of one category in collection order.
    pub fn routines_for(&self, category: RoutineCategory) -> Vec<&RoutineRecord> {
        self.routines
            .iter()
            .filter(|routine| routine.category == category)
            .collect()
    }

    /// Routines of one category not yet done today.
    pub fn pending_routines_today(&self, category: RoutineCategory) -> Vec<&RoutineRecord> {
        let today = self.clock.today_key();
        self.routines
            .iter()
            .filter(|routine| routine.category == category && !routine.is_done_on(today))
            .collect()
    }

    fn routine_index(&self, id: RoutineId) -> Option<usize> {
        self.routines.iter().position(|routine| routine.id == id)
    }
}
