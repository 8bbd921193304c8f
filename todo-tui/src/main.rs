mod api;
mod app;
mod cli;
mod config;
mod export;
mod logging;
mod runtime;
mod session_store;
mod types;
mod ui;

use anyhow::{Context, Result};
use api::{Connector, DevBackend, RemoteConnector};
use app::App;
use clap::Parser;
use cli::{Cli, Commands};
use config::TodoConfig;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use session_store::{Session, SessionStore};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use time::Date;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let cfg = TodoConfig::load()?;
    logging::init_file_logging(&TodoConfig::log_path()?, &cfg.log_level)?;

    match cli.command() {
        Commands::Run => {
            let connector = RemoteConnector::new(&cfg.api_url)?;
            tracing::info!("Starting against {}", cfg.api_url);
            run_tui(Arc::new(connector), SessionStore::default_location()?, &cfg).await?;
        }
        Commands::Dev => {
            println!("Dev mode: using in-memory data (login: admin / pass)");
            let connector = DevBackend::seeded(local_today());
            let store = SessionStore::at(config::root_path()?.join("dev-session"));
            run_tui(Arc::new(connector), store, &cfg).await?;
        }
        Commands::Login => {
            let connector = RemoteConnector::new(&cfg.api_url)?;
            let username = prompt("Username: ")?;
            let password =
                rpassword::prompt_password("Password: ").context("Failed to read password")?;
            let token = connector
                .auth()
                .login(&username, &password)
                .await
                .map_err(|e| anyhow::anyhow!(e.message_or("Invalid credentials")))?;
            let mut session = Session::restore(SessionStore::default_location()?)?;
            session.sign_in(token)?;
            println!("Login successful. Session saved.");
        }
        Commands::Register => {
            let connector = RemoteConnector::new(&cfg.api_url)?;
            let registration = types::Registration {
                name: prompt("Name: ")?,
                email: prompt("Email: ")?,
                username: prompt("Username: ")?,
                password: rpassword::prompt_password("Password: ")
                    .context("Failed to read password")?,
            };
            connector
                .auth()
                .register(&registration)
                .await
                .map_err(|e| anyhow::anyhow!(e.message_or("Failed to create account")))?;
            println!("Account created successfully! Run `todo-tui login` to sign in.");
        }
        Commands::Logout => {
            let mut session = Session::restore(SessionStore::default_location()?)?;
            session.sign_out()?;
            println!("Logged out. Session removed.");
        }
        Commands::ConfigPath => {
            let path = TodoConfig::ensure_exists()?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn local_today() -> Date {
    time::OffsetDateTime::now_utc()
        .to_offset(time::UtcOffset::current_local_offset().unwrap_or(time::UtcOffset::UTC))
        .date()
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line.trim().to_string())
}

async fn run_tui(connector: Arc<dyn Connector>, store: SessionStore, cfg: &TodoConfig) -> Result<()> {
    let session = Session::restore(store)?;
    let mut app = App::new(session, local_today(), cfg.export_dir.clone());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = runtime::run_app(&mut terminal, &mut app, connector).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &res {
        tracing::error!("Application error: {:#}", err);
    }
    res
}
