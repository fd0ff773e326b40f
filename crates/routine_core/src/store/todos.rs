//! To-do operations on the store.

use super::reorder::move_offsets;
use super::{Store, StoreChange};
use crate::clock::MILLIS_PER_DAY;
use crate::model::normalize_title;
use crate::model::todo::{TodoId, TodoRecord, TodoState};
use crate::promotion::titles_match;
use crate::repo::kv_repo::KvRepository;
use log::info;

impl<R: KvRepository> Store<R> {
    /// Appends a pending to-do; blank titles are ignored.
    pub fn add_todo(&mut self, title: &str) -> Option<TodoId> {
        let title = normalize_title(title)?;
        let todo = TodoRecord::new(title, self.clock.now_ms());
        let id = todo.id;
        self.todos.push(todo);
        self.commit(StoreChange::Todos);
        Some(id)
    }

    pub fn todo(&self, id: TodoId) -> Option<&TodoRecord> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    /// Renames a to-do in any state; blank titles are ignored.
    pub fn update_todo_title(&mut self, id: TodoId, title: &str) -> bool {
        let Some(title) = normalize_title(title) else {
            return false;
        };
        let Some(index) = self.todo_index(id) else {
            return false;
        };
        if self.todos[index].title == title {
            return false;
        }
        self.todos[index].title = title;
        self.commit(StoreChange::Todos);
        true
    }

    pub fn toggle_todo_done(&mut self, id: TodoId, is_done: bool) -> bool {
        let Some(index) = self.todo_index(id) else {
            return false;
        };
        if self.todos[index].is_done == is_done {
            return false;
        }
        self.todos[index].is_done = is_done;
        self.commit(StoreChange::Todos);
        true
    }

    /// Reorders the active subsequence.
    ///
    /// Offsets index into `active_todos()`. The collection is rebuilt as
    /// active, then archived, then trashed, each keeping its relative order.
    pub fn move_active_todos(&mut self, from_offsets: &[usize], to_offset: usize) {
        let mut active = self.todos_in(TodoState::Active);
        move_offsets(&mut active, from_offsets, to_offset);

        let mut rebuilt = active;
        rebuilt.extend(self.todos_in(TodoState::Archived));
        rebuilt.extend(self.todos_in(TodoState::Trashed));

        if rebuilt != self.todos {
            self.todos = rebuilt;
            self.commit(StoreChange::Todos);
        }
    }

    /// Moves a to-do to the trash unless it is already there.
    pub fn soft_delete_todo(&mut self, id: TodoId) -> bool {
        let now_ms = self.clock.now_ms();
        let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == id) else {
            return false;
        };
        if todo.is_trashed() {
            return false;
        }
        todo.deleted_at = Some(now_ms);
        self.commit(StoreChange::Todos);
        true
    }

    /// Takes a to-do out of the trash and appends it to the end.
    pub fn restore_from_trash(&mut self, id: TodoId) -> bool {
        let Some(index) = self.todo_index(id) else {
            return false;
        };
        if !self.todos[index].is_trashed() {
            return false;
        }
        let mut todo = self.todos.remove(index);
        todo.deleted_at = None;
        self.todos.push(todo);
        self.commit(StoreChange::Todos);
        true
    }

    /// Removes a to-do permanently, whatever its state.
    pub fn remove_todo_completely(&mut self, id: TodoId) -> bool {
        let Some(index) = self.todo_index(id) else {
            return false;
        };
        self.todos.remove(index);
        self.commit(StoreChange::Todos);
        true
    }

    /// Trash-screen alias of `remove_todo_completely`.
    pub fn delete_from_trash_forever(&mut self, id: TodoId) -> bool {
        self.remove_todo_completely(id)
    }

    /// Empties the trash. Returns the number of removed records.
    pub fn delete_all_trash(&mut self) -> usize {
        let removed = self.retain_todos(|todo| !todo.is_trashed());
        if removed > 0 {
            self.commit(StoreChange::Todos);
        }
        removed
    }

    /// Archives every active to-do that is done.
    pub fn archive_completed_todos(&mut self) -> usize {
        let now_ms = self.clock.now_ms();
        let mut archived = 0;
        for todo in self
            .todos
            .iter_mut()
            .filter(|todo| todo.is_active() && todo.is_done)
        {
            todo.archived_at = Some(now_ms);
            archived += 1;
        }
        if archived > 0 {
            self.commit(StoreChange::Todos);
        }
        archived
    }

    /// Permanently removes to-dos trashed more than `retention_days` before
    /// `now_ms`. Records that do not qualify are left untouched.
    pub fn purge_expired_trash(&mut self, retention_days: u32, now_ms: i64) -> usize {
        let cutoff = now_ms.saturating_sub(i64::from(retention_days) * MILLIS_PER_DAY);
        let removed = self.retain_todos(|todo| match todo.deleted_at {
            Some(deleted_at) => deleted_at >= cutoff,
            None => true,
        });
        if removed > 0 {
            info!(
                "event=trash_purge module=store status=ok removed={} retention_days={}",
                removed, retention_days
            );
            self.commit(StoreChange::Todos);
        }
        removed
    }

    /// Purge using the configured retention and the store clock.
    pub fn purge_expired_trash_now(&mut self) -> usize {
        let retention_days = self.config.trash_retention_days;
        let now_ms = self.clock.now_ms();
        self.purge_expired_trash(retention_days, now_ms)
    }

    /// Case-insensitive trimmed title match across active, archived and
    /// trashed to-dos.
    pub fn todo_title_exists(&self, title: &str) -> bool {
        let Some(title) = normalize_title(title) else {
            return false;
        };
        self.todos.iter().any(|todo| titles_match(&todo.title, &title))
    }

    pub fn active_todos(&self) -> Vec<&TodoRecord> {
        self.todos.iter().filter(|todo| todo.is_active()).collect()
    }

    /// Active to-dos that are not done yet.
    pub fn pending_todos(&self) -> Vec<&TodoRecord> {
        self.todos
            .iter()
            .filter(|todo| todo.is_active() && !todo.is_done)
            .collect()
    }

    pub fn archived_todos(&self) -> Vec<&TodoRecord> {
        self.todos.iter().filter(|todo| todo.is_archived()).collect()
    }

    pub fn trash_todos(&self) -> Vec<&TodoRecord> {
        self.todos.iter().filter(|todo| todo.is_trashed()).collect()
    }

    fn todo_index(&self, id: TodoId) -> Option<usize> {
        self.todos.iter().position(|todo| todo.id == id)
    }

    fn todos_in(&self, state: TodoState) -> Vec<TodoRecord> {
        self.todos
            .iter()
            .filter(|todo| todo.state() == state)
            .cloned()
            .collect()
    }

    fn retain_todos(&mut self, keep: impl Fn(&TodoRecord) -> bool) -> usize {
        let before = self.todos.len();
        self.todos.retain(|todo| keep(todo));
        before - self.todos.len()
    }
}
