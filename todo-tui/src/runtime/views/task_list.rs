use crate::app::{App, PendingMutation, PickerField, TaskFocus, TextInput};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

fn submit(action_tx: &ActionTx, mutation: Option<PendingMutation>) {
    if let Some(mutation) = mutation {
        enqueue_action(action_tx, Action::Mutate(mutation));
    }
}

/// Shared line-editing keys. Returns false when the key is not an edit key.
fn edit_input(input: &mut TextInput, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => input.clear(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        _ => return false,
    }
    true
}

pub(super) fn handle_task_list_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match app.tasks.focus {
        TaskFocus::List => handle_list_key(key, app, action_tx),
        TaskFocus::AddInput => handle_add_key(key, app, action_tx),
        TaskFocus::Search => handle_search_key(key, app),
        TaskFocus::EditTitle => handle_title_key(key, app, action_tx),
        TaskFocus::EditDescription => handle_description_key(key, app, action_tx),
        TaskFocus::PendingDates => handle_pending_dates_key(key, app),
    }
}

fn handle_list_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    let selected = app.tasks.selected_task_id();
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.quit(),
        KeyCode::Char('j') | KeyCode::Down => app.tasks.move_cursor(true),
        KeyCode::Char('k') | KeyCode::Up => app.tasks.move_cursor(false),
        KeyCode::Char('h') | KeyCode::Left => app.tasks.previous_day(),
        KeyCode::Char('l') | KeyCode::Right => app.tasks.next_day(),
        KeyCode::Char('t') => {
            let today = app.today();
            app.tasks.set_date(today);
        }
        KeyCode::Char('r') => app.tasks.refresh(),
        KeyCode::Char('a') => app.tasks.focus = TaskFocus::AddInput,
        KeyCode::Char('/') => app.tasks.focus = TaskFocus::Search,
        KeyCode::Char('f') => app.tasks.cycle_filter(),
        KeyCode::Char('s') => {
            app.tasks.suggest_task();
            app.tasks.focus = TaskFocus::AddInput;
            app.drain_notices();
        }
        KeyCode::Char('x') => {
            app.export_csv();
        }
        KeyCode::Char('m') => app.toggle_drawer(),
        KeyCode::Char('T') => app.toggle_theme(),
        KeyCode::Tab => app.tasks.focus = TaskFocus::PendingDates,
        KeyCode::Char(' ') => {
            if let Some(id) = selected {
                submit(action_tx, app.tasks.toggle_complete(id));
            }
        }
        KeyCode::Char('e') => {
            if let Some(id) = selected {
                app.tasks.start_title_edit(id);
            }
        }
        KeyCode::Enter => {
            if let Some(id) = selected {
                app.tasks.toggle_expanded(id);
            }
        }
        KeyCode::Char('i') => {
            if let Some(id) = selected {
                if app.tasks.expanded != Some(id) {
                    app.tasks.toggle_expanded(id);
                }
                if app.tasks.description_draft_mut().is_some() {
                    app.tasks.focus = TaskFocus::EditDescription;
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = selected {
                app.tasks.request_delete(id);
            }
        }
        KeyCode::Char('p') => {
            if let Some(id) = selected {
                app.tasks.open_picker(id, PickerField::Priority);
            }
        }
        KeyCode::Char('c') => {
            if let Some(id) = selected {
                app.tasks.open_picker(id, PickerField::Category);
            }
        }
        KeyCode::Esc => {
            app.tasks.expanded = None;
        }
        _ => {}
    }
}

fn handle_add_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Enter => {
            submit(action_tx, app.tasks.submit_new_task());
            app.drain_notices();
        }
        KeyCode::Esc | KeyCode::Tab => app.tasks.focus = TaskFocus::List,
        _ => {
            if !app.tasks.is_busy(crate::app::BusyTarget::Add) {
                edit_input(&mut app.tasks.new_task_input, key);
            }
        }
    }
}

fn handle_search_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Tab => app.tasks.focus = TaskFocus::List,
        _ => {
            if edit_input(&mut app.tasks.search, key) {
                app.tasks.search_changed();
            }
        }
    }
}

fn handle_title_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        // Leaving the field commits, like Enter.
        KeyCode::Enter | KeyCode::Tab => submit(action_tx, app.tasks.commit_title_edit()),
        KeyCode::Esc => app.tasks.cancel_title_edit(),
        _ => {
            if let Some(edit) = app.tasks.title_edit.as_mut() {
                edit_input(&mut edit.input, key);
            }
        }
    }
}

fn handle_description_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Enter => {
            if let Some(id) = app.tasks.expanded {
                submit(action_tx, app.tasks.save_description(id));
                app.drain_notices();
            }
        }
        KeyCode::Esc | KeyCode::Tab => app.tasks.focus = TaskFocus::List,
        _ => {
            if let Some(draft) = app.tasks.description_draft_mut() {
                edit_input(draft, key);
            }
        }
    }
}

fn handle_pending_dates_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.tasks.pending_move(true),
        KeyCode::Char('k') | KeyCode::Up => app.tasks.pending_move(false),
        KeyCode::Enter => app.tasks.select_pending_date(),
        KeyCode::Esc | KeyCode::Tab => app.tasks.focus = TaskFocus::List,
        KeyCode::Char('q') => app.quit(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::action_queue::channel;
    use super::*;
    use crate::app::{Notice, TaskSnapshot};
    use crate::session_store::{Session, SessionStore};
    use crate::types::Task;
    use time::macros::date;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::from(code)
    }

    fn type_str(app: &mut App, tx: &ActionTx, s: &str) {
        for c in s.chars() {
            handle_task_list_key(press(KeyCode::Char(c)), app, tx);
        }
    }

    fn loaded_app(dir: &tempfile::TempDir, titles: &[&str]) -> App {
        let store = SessionStore::at(dir.path().join("session"));
        store.save("t").unwrap();
        let mut app = App::new(
            Session::restore(store).unwrap(),
            date!(2025 - 10 - 27),
            dir.path().to_path_buf(),
        );
        let tasks = titles
            .iter()
            .enumerate()
            .map(|(i, title)| Task {
                id: i as i64 + 1,
                title: title.to_string(),
                completed: false,
                task_date: date!(2025 - 10 - 27),
                description: None,
                priority: None,
                category: None,
            })
            .collect();
        let ticket = app.tasks.next_fetch(0).unwrap();
        app.tasks.apply_fetch(
            ticket,
            Ok(TaskSnapshot {
                tasks,
                ..Default::default()
            }),
        );
        app
    }

    #[test]
    fn typing_in_add_input_then_enter_enqueues_create() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded_app(&dir, &[]);
        let (tx, mut rx) = channel();

        handle_task_list_key(press(KeyCode::Char('a')), &mut app, &tx);
        type_str(&mut app, &tx, "Plan goals");
        handle_task_list_key(press(KeyCode::Enter), &mut app, &tx);

        assert!(matches!(rx.try_recv(), Ok(Action::Mutate(_))));
        assert!(app.tasks.is_busy(crate::app::BusyTarget::Add));
    }

    #[test]
    fn blank_add_shows_title_required() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded_app(&dir, &[]);
        let (tx, mut rx) = channel();

        handle_task_list_key(press(KeyCode::Char('a')), &mut app, &tx);
        type_str(&mut app, &tx, "   ");
        handle_task_list_key(press(KeyCode::Enter), &mut app, &tx);

        assert!(rx.try_recv().is_err());
        assert_eq!(
            app.notifications.latest(),
            Some(&Notice::error("Title required"))
        );
    }

    #[test]
    fn list_keys_do_not_leak_into_search() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded_app(&dir, &["Team sync", "Review PR #123"]);
        let (tx, _rx) = channel();

        handle_task_list_key(press(KeyCode::Char('/')), &mut app, &tx);
        type_str(&mut app, &tx, "pr #123");
        handle_task_list_key(press(KeyCode::Esc), &mut app, &tx);

        assert_eq!(app.tasks.search.value, "pr #123");
        assert_eq!(app.tasks.filtered_tasks().len(), 1);
        assert_eq!(app.tasks.selected_task_id(), Some(2));
    }

    #[test]
    fn escape_abandons_title_edit() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded_app(&dir, &["Gym"]);
        let (tx, mut rx) = channel();

        handle_task_list_key(press(KeyCode::Char('e')), &mut app, &tx);
        type_str(&mut app, &tx, " later");
        handle_task_list_key(press(KeyCode::Esc), &mut app, &tx);

        assert!(app.tasks.title_edit.is_none());
        assert_eq!(app.tasks.tasks[0].title, "Gym");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn delete_key_only_asks_for_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = loaded_app(&dir, &["Gym"]);
        let (tx, mut rx) = channel();

        handle_task_list_key(press(KeyCode::Char('d')), &mut app, &tx);

        assert_eq!(app.tasks.delete_confirm, Some(1));
        assert!(rx.try_recv().is_err());
    }
}
