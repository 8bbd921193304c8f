use crate::api::Connector;
use crate::app::App;
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use super::action_queue::channel;
use super::actions::Executor;
use super::views::handle_key;

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    connector: Arc<dyn Connector>,
) -> Result<()> {
    let (action_tx, mut action_rx) = channel();
    let mut executor = Executor::new(connector, action_tx.clone());

    loop {
        executor.start_fetch(app);
        app.tick();

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, app, &action_tx);
                }
            }
        }

        while let Ok(action) = action_rx.try_recv() {
            executor.run_action(action, app);
        }

        if !app.running {
            break;
        }
    }

    executor.shutdown();
    Ok(())
}
