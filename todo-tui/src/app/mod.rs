use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use time::Date;
use tokio::sync::watch;

use crate::api::{ApiError, Connector, TaskBackend, SESSION_EXPIRED_MESSAGE};
use crate::session_store::Session;

mod edit;
mod login;
mod state;
mod task_list;

pub use edit::PickerField;
pub use login::{LoginField, LoginMode, LoginSubmission};
pub use state::{Notice, NoticeLevel, Screen, TaskFocus, TextInput};
pub use task_list::{
    fetch_snapshot, BusyTarget, ExportHandle, ExportOutcome, FetchTicket, MutationTag,
    PendingMutation, TaskListView, TaskSnapshot,
};

use login::LoginForm;
use state::Notifications;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerItem {
    Tasks,
    PendingDates,
    ExportCsv,
    Refresh,
    ToggleTheme,
    LogOut,
}

impl DrawerItem {
    pub const ALL: [DrawerItem; 6] = [
        DrawerItem::Tasks,
        DrawerItem::PendingDates,
        DrawerItem::ExportCsv,
        DrawerItem::Refresh,
        DrawerItem::ToggleTheme,
        DrawerItem::LogOut,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DrawerItem::Tasks => "Tasks",
            DrawerItem::PendingDates => "Pending dates",
            DrawerItem::ExportCsv => "Export CSV",
            DrawerItem::Refresh => "Refresh",
            DrawerItem::ToggleTheme => "Toggle theme",
            DrawerItem::LogOut => "Log out",
        }
    }
}

pub struct App {
    pub running: bool,
    pub session: Session,
    client: Option<Arc<dyn TaskBackend>>,
    token_rx: watch::Receiver<Option<String>>,

    pub login: LoginForm,
    pub tasks: TaskListView,
    pub notifications: Notifications,

    pub dark_mode: bool,
    pub drawer: Option<usize>,
    pub throbber_state: throbber_widgets_tui::ThrobberState,

    today: Date,
    export_dir: PathBuf,
}

impl App {
    pub fn new(session: Session, today: Date, export_dir: PathBuf) -> Self {
        let mut token_rx = session.subscribe();
        token_rx.mark_changed();
        Self {
            running: true,
            session,
            client: None,
            token_rx,
            login: LoginForm::default(),
            tasks: TaskListView::new(today, export_dir.clone()),
            notifications: Notifications::default(),
            dark_mode: true,
            drawer: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
            today,
            export_dir,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.session.is_authenticated() {
            Screen::Tasks
        } else {
            Screen::Login
        }
    }

    pub fn today(&self) -> Date {
        self.today
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notifications.push(notice);
    }

    /// Move notices raised by the task view into the notification area.
    pub fn drain_notices(&mut self) {
        for notice in self.tasks.take_notices() {
            self.notifications.push(notice);
        }
    }

    pub fn is_busy(&self) -> bool {
        self.tasks.is_loading || self.login.submitting
    }

    /// Per-frame housekeeping: spinner animation and notice expiry.
    pub fn tick(&mut self) {
        if self.is_busy() {
            self.throbber_state.calc_next();
        }
        self.notifications.prune(Instant::now());
    }

    // ── Session-scoped client ──────────────────────────────────────────

    /// Rebuild the task client if the session published a new token since
    /// the last call.
    pub fn sync_client(&mut self, connector: &dyn Connector) {
        if !self.token_rx.has_changed().unwrap_or(false) {
            return;
        }
        let token = self.token_rx.borrow_and_update().clone();
        self.client = match token {
            Some(token) => match connector.connect(&token) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::error!("Failed to create API client: {}", e);
                    self.notify(Notice::error(e.to_string()));
                    None
                }
            },
            None => None,
        };
    }

    pub fn client(&self) -> Option<Arc<dyn TaskBackend>> {
        self.client.clone()
    }

    /// The next fetch cycle to run, if one is due and a client exists.
    pub fn next_fetch(&mut self) -> Option<FetchTicket> {
        self.client.as_ref()?;
        self.tasks.next_fetch(self.session.epoch())
    }

    pub fn apply_fetch(
        &mut self,
        epoch: u64,
        ticket: FetchTicket,
        result: Result<TaskSnapshot, ApiError>,
    ) {
        if epoch != self.session.epoch() {
            tracing::debug!("Dropping fetch result from an old session");
            return;
        }
        if let task_list::FetchOutcome::SessionExpired = self.tasks.apply_fetch(ticket, result) {
            self.expire_session();
        }
    }

    pub fn finish_mutation(&mut self, epoch: u64, tag: MutationTag, result: Result<(), ApiError>) {
        if epoch != self.session.epoch() {
            tracing::debug!("Dropping mutation result from an old session");
            return;
        }
        match result {
            Err(e) if e.is_session_expired() => self.expire_session(),
            result => {
                self.tasks.finish_mutation(tag, result);
                self.drain_notices();
            }
        }
    }

    // ── Session transitions ────────────────────────────────────────────

    pub fn finish_sign_in(&mut self, result: Result<String, ApiError>) {
        let Some(token) = self.login.finish_sign_in(result) else {
            return;
        };
        match self.session.sign_in(token) {
            Ok(()) => {
                self.reload();
                self.notify(Notice::success("Welcome back!"));
            }
            Err(e) => {
                tracing::error!("Failed to persist session: {:#}", e);
                self.login.error = Some(format!("Could not save session: {}", e));
            }
        }
    }

    pub fn finish_register(&mut self, result: Result<(), ApiError>) {
        if self.login.finish_sign_up(result) {
            self.notify(Notice::success(
                "Account created successfully! Please sign in.",
            ));
        }
    }

    pub fn logout(&mut self) {
        if let Err(e) = self.session.sign_out() {
            tracing::warn!("Failed to remove session file: {:#}", e);
        }
        self.reload();
        self.notify(Notice::info("Logged out"));
    }

    /// A 403 from anywhere ends the session and restarts from login.
    pub fn expire_session(&mut self) {
        tracing::warn!("Server rejected the session token");
        if let Err(e) = self.session.sign_out() {
            tracing::warn!("Failed to remove session file: {:#}", e);
        }
        self.reload();
        self.notify(Notice::error(SESSION_EXPIRED_MESSAGE));
    }

    /// Discard every piece of view state and start over from the session.
    pub fn reload(&mut self) {
        self.client = None;
        self.token_rx.mark_changed();
        self.login = LoginForm::default();
        self.tasks = TaskListView::new(self.today, self.export_dir.clone());
        self.drawer = None;
    }

    // ── Shell chrome ───────────────────────────────────────────────────

    pub fn export_handle(&mut self) -> &mut dyn ExportHandle {
        &mut self.tasks
    }

    pub fn export_csv(&mut self) -> ExportOutcome {
        let outcome = self.export_handle().export_to_csv();
        self.drain_notices();
        outcome
    }

    pub fn toggle_theme(&mut self) {
        self.dark_mode = !self.dark_mode;
    }

    pub fn toggle_drawer(&mut self) {
        self.drawer = match self.drawer {
            Some(_) => None,
            None => Some(0),
        };
    }

    pub fn drawer_move(&mut self, down: bool) {
        if let Some(index) = self.drawer.as_mut() {
            let len = DrawerItem::ALL.len();
            *index = if down {
                (*index + 1) % len
            } else {
                (*index + len - 1) % len
            };
        }
    }

    pub fn activate_drawer_item(&mut self) {
        let Some(index) = self.drawer.take() else {
            return;
        };
        match DrawerItem::ALL[index % DrawerItem::ALL.len()] {
            DrawerItem::Tasks => self.tasks.focus = TaskFocus::List,
            DrawerItem::PendingDates => self.tasks.focus = TaskFocus::PendingDates,
            DrawerItem::ExportCsv => {
                self.export_csv();
            }
            DrawerItem::Refresh => self.tasks.refresh(),
            DrawerItem::ToggleTheme => self.toggle_theme(),
            DrawerItem::LogOut => self.logout(),
        }
    }
}
