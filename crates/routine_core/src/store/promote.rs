//! Promotion pipelines: brain dump → to-dos, to-do → routine.

use super::{Store, StoreChange};
use crate::model::routine::{RoutineCategory, RoutineRecord};
use crate::model::todo::{TodoId, TodoRecord};
use crate::promotion::{dedupe_titles, non_empty_lines, BrainDumpReport, RoutinePromotion};
use crate::repo::kv_repo::KvRepository;
use log::debug;

impl<R: KvRepository> Store<R> {
    /// Replaces the stored brain-dump text.
    pub fn set_brain_dump_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.brain_dump {
            return;
        }
        self.brain_dump = text;
        self.commit(StoreChange::BrainDump);
    }

    /// Turns each unique line of `text` into a to-do.
    ///
    /// Lines whose title already exists among to-dos (active, archived or
    /// trashed) are skipped.
    pub fn promote_brain_dump_lines(&mut self, text: &str) -> BrainDumpReport {
        let report = self.append_brain_dump_lines(text);
        if report.added > 0 {
            self.commit(StoreChange::Todos);
        }
        report
    }

    /// Promotes the stored brain-dump text and clears it.
    ///
    /// The text is left alone when it holds no non-empty line. Otherwise the
    /// new to-dos and the cleared text land in one commit.
    pub fn send_brain_dump_to_todos(&mut self) -> BrainDumpReport {
        let text = std::mem::take(&mut self.brain_dump);
        let report = self.append_brain_dump_lines(&text);
        if report.lines_considered() == 0 {
            self.brain_dump = text;
        } else if report.added > 0 {
            self.commit_all(&[StoreChange::Todos, StoreChange::BrainDump]);
        } else {
            self.commit(StoreChange::BrainDump);
        }
        report
    }

    fn append_brain_dump_lines(&mut self, text: &str) -> BrainDumpReport {
        let (unique, internal_duplicates_removed) = dedupe_titles(non_empty_lines(text));
        let mut report = BrainDumpReport {
            internal_duplicates_removed,
            ..BrainDumpReport::default()
        };

        let now_ms = self.clock.now_ms();
        for line in unique {
            if self.todo_title_exists(&line) {
                report.already_existing_skipped += 1;
                continue;
            }
            self.todos.push(TodoRecord::new(line, now_ms));
            report.added += 1;
        }

        debug!(
            "event=brain_dump_promote module=store status=ok added={} internal_duplicates={} existing_skipped={}",
            report.added, report.internal_duplicates_removed, report.already_existing_skipped
        );
        report
    }

    /// Moves a to-do into the routines list under `category`.
    ///
    /// The to-do is removed only when the routine was created. Subscribers
    /// hear `Routines` then `Todos` for the single revision.
    pub fn promote_todo_to_routine(
        &mut self,
        todo_id: TodoId,
        category: RoutineCategory,
    ) -> RoutinePromotion {
        let Some(index) = self.todos.iter().position(|todo| todo.id == todo_id) else {
            return RoutinePromotion::TodoNotFound;
        };
        if self.routine_title_exists(&self.todos[index].title) {
            return RoutinePromotion::AlreadyExists;
        }

        let todo = self.todos.remove(index);
        let routine = RoutineRecord::new(todo.title, category);
        let routine_id = routine.id;
        self.routines.push(routine);
        self.commit_all(&[StoreChange::Routines, StoreChange::Todos]);
        RoutinePromotion::Promoted(routine_id)
    }
}
