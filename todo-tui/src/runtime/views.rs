use crate::app::{App, Screen};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action_queue::{Action, ActionTx};

mod login;
mod overlays;
mod task_list;

fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}

/// Route a key press to whatever currently owns the keyboard. Overlays win
/// over the list beneath them.
pub(super) fn handle_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.screen() {
        Screen::Login => login::handle_login_key(key, app, action_tx),
        Screen::Tasks => {
            if app.tasks.delete_confirm.is_some() {
                overlays::handle_confirm_delete_key(key, app, action_tx);
            } else if app.tasks.picker.is_some() {
                overlays::handle_picker_key(key, app, action_tx);
            } else if app.drawer.is_some() {
                overlays::handle_drawer_key(key, app);
            } else {
                task_list::handle_task_list_key(key, app, action_tx);
            }
        }
    }
}
