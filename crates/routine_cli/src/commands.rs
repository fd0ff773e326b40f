//! Command handlers. Each handler renders plain text into `out`.

use crate::{Command, DumpCommand, RoutineCommand, TodoCommand, TodoView};
use anyhow::{anyhow, bail, Result};
use log::info;
use routine_core::{
    BrainDumpReport, KvRepository, RoutineCategory, RoutineId, RoutinePromotion, RoutineRecord,
    Store, TodoId, TodoRecord,
};
use std::io::{Read, Write};

pub fn dispatch<R: KvRepository>(
    store: &mut Store<R>,
    command: Command,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Routine(command) => routine(store, command, out),
        Command::Todo(command) => todo(store, command, out),
        Command::Dump(command) => dump(store, command, out),
        Command::Today => today(store, out),
        Command::Version => Ok(()),
    }
}

fn routine<R: KvRepository>(
    store: &mut Store<R>,
    command: RoutineCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        RoutineCommand::Add {
            title,
            category,
            unique,
        } => {
            let category = RoutineCategory::from(category);
            let added = if unique {
                store.add_routine_if_not_exists(&title, category)
            } else {
                store.add_routine(&title, category).is_some()
            };
            if added {
                writeln!(out, "Added routine to {category}.")?;
            } else if unique && store.routine_title_exists(&title) {
                writeln!(out, "A routine with that title already exists.")?;
            } else {
                bail!("routine title cannot be empty");
            }
        }
        RoutineCommand::List { category } => {
            let today = store.today_key();
            let categories = match category {
                Some(category) => vec![RoutineCategory::from(category)],
                None => RoutineCategory::ALL.to_vec(),
            };
            for category in categories {
                let routines = store.routines_for(category);
                if routines.is_empty() {
                    continue;
                }
                writeln!(out, "{category}")?;
                for (offset, routine) in routines.iter().enumerate() {
                    write_routine(out, offset, routine, routine.is_done_on(today))?;
                }
            }
        }
        RoutineCommand::Done(arg) => {
            let id = resolve_routine(store, &arg.id)?;
            store.toggle_routine_done_today(id, true);
            writeln!(out, "Marked done for today.")?;
        }
        RoutineCommand::Undone(arg) => {
            let id = resolve_routine(store, &arg.id)?;
            store.toggle_routine_done_today(id, false);
            writeln!(out, "Marked not done.")?;
        }
        RoutineCommand::Edit {
            id,
            title,
            category,
        } => {
            let id = resolve_routine(store, &id)?;
            let category = match category {
                Some(category) => RoutineCategory::from(category),
                None => store
                    .routine(id)
                    .map(|routine| routine.category)
                    .unwrap_or_default(),
            };
            if title.trim().is_empty() {
                bail!("routine title cannot be empty");
            }
            store.update_routine(id, &title, category);
            writeln!(out, "Routine updated.")?;
        }
        RoutineCommand::Move { category, from, to } => {
            store.move_routines(category.into(), &from, to);
            writeln!(out, "Routines reordered.")?;
        }
        RoutineCommand::Rm(arg) => {
            let id = resolve_routine(store, &arg.id)?;
            store.delete_routine(id);
            writeln!(out, "Routine deleted.")?;
        }
    }
    Ok(())
}

fn todo<R: KvRepository>(
    store: &mut Store<R>,
    command: TodoCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        TodoCommand::Add { title } => {
            if store.add_todo(&title).is_none() {
                bail!("to-do title cannot be empty");
            }
            writeln!(out, "Added to-do.")?;
        }
        TodoCommand::List { view } => {
            let todos = match view {
                TodoView::Active => store.active_todos(),
                TodoView::Archived => store.archived_todos(),
                TodoView::Trash => store.trash_todos(),
                TodoView::All => store.todos().iter().collect(),
            };
            for (offset, todo) in todos.iter().enumerate() {
                write_todo(out, offset, todo)?;
            }
        }
        TodoCommand::Done(arg) => {
            let id = resolve_todo(store, &arg.id)?;
            store.toggle_todo_done(id, true);
            writeln!(out, "Marked done.")?;
        }
        TodoCommand::Undone(arg) => {
            let id = resolve_todo(store, &arg.id)?;
            store.toggle_todo_done(id, false);
            writeln!(out, "Marked not done.")?;
        }
        TodoCommand::Edit { id, title } => {
            let id = resolve_todo(store, &id)?;
            if title.trim().is_empty() {
                bail!("to-do title cannot be empty");
            }
            store.update_todo_title(id, &title);
            writeln!(out, "To-do updated.")?;
        }
        TodoCommand::Move { from, to } => {
            store.move_active_todos(&from, to);
            writeln!(out, "To-dos reordered.")?;
        }
        TodoCommand::Trash(arg) => {
            let id = resolve_todo(store, &arg.id)?;
            store.soft_delete_todo(id);
            writeln!(out, "Moved to trash.")?;
        }
        TodoCommand::Restore(arg) => {
            let id = resolve_todo(store, &arg.id)?;
            if !store.restore_from_trash(id) {
                bail!("that to-do is not in the trash");
            }
            writeln!(out, "Restored.")?;
        }
        TodoCommand::Purge => {
            let removed = store.purge_expired_trash_now();
            writeln!(out, "Purged {removed} expired item(s).")?;
        }
        TodoCommand::EmptyTrash => {
            let removed = store.delete_all_trash();
            writeln!(out, "Deleted {removed} item(s) from trash.")?;
        }
        TodoCommand::Archive => {
            let archived = store.archive_completed_todos();
            writeln!(out, "Archived {archived} completed item(s).")?;
        }
        TodoCommand::Promote { id, category } => {
            let id = resolve_todo(store, &id)?;
            match store.promote_todo_to_routine(id, category.into()) {
                RoutinePromotion::Promoted(_) => writeln!(out, "Moved to routines.")?,
                RoutinePromotion::AlreadyExists => {
                    writeln!(out, "A routine with that title already exists.")?
                }
                RoutinePromotion::TodoNotFound => bail!("no to-do matches `{id}`"),
            }
        }
        TodoCommand::Rm(arg) => {
            let id = resolve_todo(store, &arg.id)?;
            store.remove_todo_completely(id);
            writeln!(out, "To-do deleted.")?;
        }
    }
    Ok(())
}

fn dump<R: KvRepository>(
    store: &mut Store<R>,
    command: DumpCommand,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        DumpCommand::Show => {
            writeln!(out, "{}", store.brain_dump_text())?;
        }
        DumpCommand::Set { text } => {
            let text = if text == "-" {
                let mut buffer = String::new();
                std::io::stdin().read_to_string(&mut buffer)?;
                buffer
            } else {
                text
            };
            store.set_brain_dump_text(text);
            writeln!(out, "Brain dump saved.")?;
        }
        DumpCommand::Send => {
            let report = store.send_brain_dump_to_todos();
            info!(
                "event=cli_dump_send module=cli status=ok added={}",
                report.added
            );
            write_report(out, &report)?;
        }
    }
    Ok(())
}

fn today<R: KvRepository>(store: &mut Store<R>, out: &mut impl Write) -> Result<()> {
    for category in RoutineCategory::ALL {
        let pending = store.pending_routines_today(category);
        if pending.is_empty() {
            continue;
        }
        writeln!(out, "{category} Routines")?;
        for (offset, routine) in pending.iter().enumerate() {
            write_routine(out, offset, routine, false)?;
        }
    }

    let pending = store.pending_todos();
    if !pending.is_empty() {
        writeln!(out, "To-Do")?;
        for (offset, todo) in pending.iter().enumerate() {
            write_todo(out, offset, todo)?;
        }
    }
    Ok(())
}

fn write_routine(
    out: &mut impl Write,
    offset: usize,
    routine: &RoutineRecord,
    done: bool,
) -> Result<()> {
    let mark = if done { "x" } else { " " };
    writeln!(
        out,
        "  {offset:>2}. [{mark}] {} ({})",
        routine.title,
        short_id(&routine.id.to_string())
    )?;
    Ok(())
}

fn write_todo(out: &mut impl Write, offset: usize, todo: &TodoRecord) -> Result<()> {
    let mark = if todo.is_done { "x" } else { " " };
    writeln!(
        out,
        "  {offset:>2}. [{mark}] {} ({})",
        todo.title,
        short_id(&todo.id.to_string())
    )?;
    Ok(())
}

fn write_report(out: &mut impl Write, report: &BrainDumpReport) -> Result<()> {
    writeln!(out, "Added {} item(s).", report.added)?;
    if report.internal_duplicates_removed > 0 {
        writeln!(
            out,
            "Removed {} duplicate line(s).",
            report.internal_duplicates_removed
        )?;
    }
    if report.already_existing_skipped > 0 {
        writeln!(
            out,
            "Skipped {} line(s) already on the to-do list.",
            report.already_existing_skipped
        )?;
    }
    Ok(())
}

fn short_id(id: &str) -> &str {
    &id[..8.min(id.len())]
}

fn resolve_routine<R: KvRepository>(store: &Store<R>, prefix: &str) -> Result<RoutineId> {
    resolve(store.routines().iter().map(|routine| routine.id), prefix)
        .ok_or_else(|| anyhow!("no single routine matches `{prefix}`"))
}

fn resolve_todo<R: KvRepository>(store: &Store<R>, prefix: &str) -> Result<TodoId> {
    resolve(store.todos().iter().map(|todo| todo.id), prefix)
        .ok_or_else(|| anyhow!("no single to-do matches `{prefix}`"))
}

/// Finds the only ID whose text form starts with `prefix`.
fn resolve(ids: impl Iterator<Item = TodoId>, prefix: &str) -> Option<TodoId> {
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        return None;
    }
    let mut matches = ids.filter(|id| id.to_string().starts_with(&prefix));
    let first = matches.next()?;
    matches.next().is_none().then_some(first)
}
