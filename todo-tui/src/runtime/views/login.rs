use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::super::action_queue::{Action, ActionTx};
use super::enqueue_action;

pub(super) fn handle_login_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.login.toggle_mode();
        }
        KeyCode::Tab | KeyCode::Down => app.login.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.login.prev_field(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.login.input_char(c);
        }
        KeyCode::Backspace => app.login.backspace(),
        KeyCode::Enter => enqueue_action(action_tx, Action::SubmitLogin),
        KeyCode::Esc => app.quit(),
        _ => {}
    }
}
