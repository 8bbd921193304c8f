use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_confirm_delete_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            if let Some(mutation) = app.tasks.confirm_delete() {
                enqueue_action(action_tx, Action::Mutate(mutation));
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.tasks.cancel_delete(),
        _ => {}
    }
}

pub(super) fn handle_picker_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(picker) = app.tasks.picker.as_mut() {
                picker.move_down();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(picker) = app.tasks.picker.as_mut() {
                picker.move_up();
            }
        }
        KeyCode::Enter => {
            if let Some(mutation) = app.tasks.choose_picked() {
                enqueue_action(action_tx, Action::Mutate(mutation));
            }
        }
        KeyCode::Esc | KeyCode::Char('q') => app.tasks.picker = None,
        _ => {}
    }
}

pub(super) fn handle_drawer_key(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.drawer_move(true),
        KeyCode::Char('k') | KeyCode::Up => app.drawer_move(false),
        KeyCode::Enter => app.activate_drawer_item(),
        KeyCode::Esc | KeyCode::Char('m') => app.toggle_drawer(),
        _ => {}
    }
}
