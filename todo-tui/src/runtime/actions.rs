use crate::api::Connector;
use crate::app::{fetch_snapshot, App, LoginSubmission, PendingMutation};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::action_queue::{Action, ActionTx};

/// Spawns network work off the UI loop and feeds results back through the
/// action channel. Owns the handle of the in-flight fetch cycle.
pub(super) struct Executor {
    connector: Arc<dyn Connector>,
    action_tx: ActionTx,
    in_flight_fetch: Option<JoinHandle<()>>,
}

impl Executor {
    pub(super) fn new(connector: Arc<dyn Connector>, action_tx: ActionTx) -> Self {
        Self {
            connector,
            action_tx,
            in_flight_fetch: None,
        }
    }

    /// Start a fetch cycle if one is due, aborting the one it supersedes.
    pub(super) fn start_fetch(&mut self, app: &mut App) {
        app.sync_client(self.connector.as_ref());
        let Some(client) = app.client() else {
            return;
        };
        let Some(ticket) = app.next_fetch() else {
            return;
        };
        if let Some(handle) = self.in_flight_fetch.take() {
            handle.abort();
        }

        let epoch = app.session.epoch();
        let tx = self.action_tx.clone();
        tracing::debug!("Starting fetch cycle {} for {}", ticket.cycle, ticket.date);
        self.in_flight_fetch = Some(tokio::spawn(async move {
            let result = fetch_snapshot(client.as_ref(), ticket.date).await;
            let _ = tx.send(Action::FetchCompleted {
                epoch,
                ticket,
                result,
            });
        }));
    }

    pub(super) fn shutdown(&mut self) {
        if let Some(handle) = self.in_flight_fetch.take() {
            handle.abort();
        }
    }

    pub(super) fn run_action(&mut self, action: Action, app: &mut App) {
        match action {
            Action::SubmitLogin => self.submit_login(app),
            Action::Mutate(mutation) => self.spawn_mutation(app, mutation),
            Action::FetchCompleted {
                epoch,
                ticket,
                result,
            } => {
                if let Some(handle) = &self.in_flight_fetch {
                    if handle.is_finished() {
                        self.in_flight_fetch = None;
                    }
                }
                app.apply_fetch(epoch, ticket, result);
            }
            Action::MutationCompleted { epoch, tag, result } => {
                app.finish_mutation(epoch, tag, result);
            }
            Action::SignInCompleted(result) => app.finish_sign_in(result),
            Action::RegisterCompleted(result) => app.finish_register(result),
        }
    }

    fn spawn_mutation(&self, app: &mut App, mutation: PendingMutation) {
        let Some(client) = app.client() else {
            tracing::debug!("Dropping mutation without a session");
            app.tasks.abandon_mutation(mutation.tag());
            return;
        };
        let epoch = app.session.epoch();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = mutation.execute(client.as_ref()).await;
            let _ = tx.send(Action::MutationCompleted {
                epoch,
                tag: mutation.tag(),
                result,
            });
        });
    }

    fn submit_login(&self, app: &mut App) {
        let Some(submission) = app.login.submission() else {
            return;
        };
        let auth = self.connector.auth();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match submission {
                LoginSubmission::SignIn { username, password } => {
                    Action::SignInCompleted(auth.login(&username, &password).await)
                }
                LoginSubmission::SignUp(registration) => {
                    Action::RegisterCompleted(auth.register(&registration).await)
                }
            };
            let _ = tx.send(action);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::super::action_queue::{channel, ActionRx};
    use super::*;
    use crate::api::DevBackend;
    use crate::app::{Notice, Screen};
    use crate::session_store::{Session, SessionStore};
    use std::time::Duration;
    use time::macros::date;

    const TODAY: time::Date = date!(2025 - 10 - 27);

    struct Harness {
        app: App,
        executor: Executor,
        rx: ActionRx,
        dev: DevBackend,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new(token: Option<&str>) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = SessionStore::at(dir.path().join("session"));
            if let Some(token) = token {
                store.save(token).unwrap();
            }
            let session = Session::restore(store).unwrap();
            let app = App::new(session, TODAY, dir.path().to_path_buf());
            let dev = DevBackend::seeded(TODAY);
            let (tx, rx) = channel();
            let executor = Executor::new(Arc::new(dev.clone()), tx);
            Self {
                app,
                executor,
                rx,
                dev,
                _dir: dir,
            }
        }

        /// Run actions until nothing more arrives.
        async fn settle(&mut self) {
            loop {
                self.executor.start_fetch(&mut self.app);
                match tokio::time::timeout(Duration::from_millis(200), self.rx.recv()).await {
                    Ok(Some(action)) => self.executor.run_action(action, &mut self.app),
                    _ => break,
                }
            }
        }

        fn send(&mut self, action: Action) {
            self.executor.run_action(action, &mut self.app);
        }
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.login.input_char(c);
        }
    }

    #[tokio::test]
    async fn login_then_first_fetch() {
        let mut h = Harness::new(None);
        type_str(&mut h.app, "admin");
        h.app.login.next_field();
        type_str(&mut h.app, "pass");

        h.send(Action::SubmitLogin);
        h.settle().await;

        assert_eq!(h.app.screen(), Screen::Tasks);
        assert_eq!(h.app.tasks.tasks.len(), 3);
        assert!(!h.app.tasks.is_loading);
        assert!(h
            .app
            .notifications
            .iter()
            .any(|n| *n == Notice::success("Welcome back!")));
    }

    #[tokio::test]
    async fn wrong_password_keeps_login_screen() {
        let mut h = Harness::new(None);
        type_str(&mut h.app, "admin");
        h.app.login.next_field();
        type_str(&mut h.app, "nope");

        h.send(Action::SubmitLogin);
        h.settle().await;

        assert_eq!(h.app.screen(), Screen::Login);
        assert_eq!(h.app.login.error.as_deref(), Some("Invalid credentials"));
        assert_eq!(h.dev.count_requests("GET"), 0);
    }

    #[tokio::test]
    async fn mutation_success_triggers_exactly_one_refetch() {
        let mut h = Harness::new(Some("dev-token"));
        h.settle().await;
        h.dev.clear_requests();

        let id = h.app.tasks.tasks[0].id;
        let mutation = h.app.tasks.toggle_complete(id).unwrap();
        h.send(Action::Mutate(mutation));
        h.settle().await;

        assert_eq!(h.dev.count_requests(&format!("PUT /api/tasks/{}", id)), 1);
        assert_eq!(h.dev.count_requests("GET /api/tasks?date="), 1);
        assert_eq!(
            h.app.tasks.tasks.iter().find(|t| t.id == id).map(|t| t.completed),
            h.dev.task(id).map(|t| t.completed)
        );
    }

    #[tokio::test]
    async fn session_expiry_mid_mutation_returns_to_login() {
        let mut h = Harness::new(Some("dev-token"));
        h.settle().await;

        h.dev.fail_with_status(Some(403));
        let id = h.app.tasks.tasks[0].id;
        h.app.tasks.request_delete(id);
        let mutation = h.app.tasks.confirm_delete().unwrap();
        h.send(Action::Mutate(mutation));
        h.settle().await;

        assert_eq!(h.app.screen(), Screen::Login);
        assert!(h.app.tasks.tasks.is_empty());
        assert!(h
            .app
            .notifications
            .iter()
            .any(|n| n.message == crate::api::SESSION_EXPIRED_MESSAGE));
    }

    #[tokio::test]
    async fn rapid_date_changes_show_only_latest_day() {
        let mut h = Harness::new(Some("dev-token"));
        h.executor.start_fetch(&mut h.app);
        h.app.tasks.next_day();
        h.executor.start_fetch(&mut h.app);
        h.settle().await;

        assert_eq!(h.app.tasks.selected_date, date!(2025 - 10 - 28));
        let titles: Vec<&str> = h.app.tasks.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Gym"]);
    }

    #[tokio::test]
    async fn failed_fetch_shows_error_and_retry_recovers() {
        let mut h = Harness::new(Some("dev-token"));
        h.dev.fail_with_status(Some(500));
        h.settle().await;

        assert_eq!(h.app.tasks.error.as_deref(), Some("Server error (500)"));
        assert!(h.app.tasks.tasks.is_empty());

        h.dev.fail_with_status(None);
        h.app.tasks.refresh();
        h.settle().await;

        assert!(h.app.tasks.error.is_none());
        assert_eq!(h.app.tasks.tasks.len(), 3);
    }

    #[tokio::test]
    async fn create_posts_defaults() {
        let mut h = Harness::new(Some("dev-token"));
        h.settle().await;

        h.app.tasks.new_task_input.set("Plan goals");
        let mutation = h.app.tasks.submit_new_task().unwrap();
        h.send(Action::Mutate(mutation));
        h.settle().await;

        let created = h
            .app
            .tasks
            .tasks
            .iter()
            .find(|t| t.title == "Plan goals")
            .cloned()
            .unwrap();
        assert!(!created.completed);
        assert_eq!(created.category.as_deref(), Some("Other"));
        assert_eq!(created.description.as_deref(), Some(""));
        assert!(h.app.tasks.new_task_input.value.is_empty());
    }
}
