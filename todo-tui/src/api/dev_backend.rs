use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use time::{Date, Duration};

use super::backend::{AuthBackend, Connector, TaskBackend};
use super::error::ApiError;
use crate::types::{format_date, Analytics, NewTask, Priority, Registration, Task, TaskId};

const DEV_USERNAME: &str = "admin";
const DEV_PASSWORD: &str = "pass";
const DEV_TOKEN: &str = "dev-token";

/// In-memory stand-in for the todo API, used by `todo-tui dev` and by tests.
/// Every call is appended to a request log in `METHOD /path` form.
#[derive(Debug, Clone, Default)]
pub struct DevBackend {
    inner: Arc<Mutex<DevState>>,
}

#[derive(Debug, Default)]
struct DevState {
    tasks: Vec<Task>,
    next_id: TaskId,
    requests: Vec<String>,
    forced_status: Option<u16>,
}

impl DevBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handful of tasks spread around `today`.
    pub fn seeded(today: Date) -> Self {
        let backend = Self::new();
        let seed = [
            (0, "Team sync", false, Some(Priority::High), "Work", "Weekly planning"),
            (0, "Review PR #123", false, Some(Priority::Medium), "Work", "Check the CSV export changes"),
            (0, "Buy groceries", true, Some(Priority::Low), "Shopping", ""),
            (1, "Gym", false, None, "Health", ""),
            (-2, "Update docs", false, Some(Priority::Low), "Learning", "Installation section"),
        ];
        {
            let mut state = backend.lock();
            for (offset, title, completed, priority, category, description) in seed {
                state.next_id += 1;
                let id = state.next_id;
                state.tasks.push(Task {
                    id,
                    title: title.to_string(),
                    completed,
                    task_date: today + Duration::days(offset),
                    description: Some(description.to_string()),
                    priority,
                    category: Some(category.to_string()),
                });
            }
        }
        backend
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, DevState> {
        self.inner.lock().expect("dev store lock poisoned")
    }

    /// Record the call and apply any forced failure.
    fn record(&self, request: String) -> Result<std::sync::MutexGuard<'_, DevState>, ApiError> {
        let mut state = self.lock();
        state.requests.push(request);
        if let Some(status) = state.forced_status {
            return Err(ApiError::from_response(status, b""));
        }
        Ok(state)
    }
}

/// Inspection hooks for tests.
#[cfg(test)]
impl DevBackend {
    /// Make every following call fail with `status` until cleared.
    pub fn fail_with_status(&self, status: Option<u16>) {
        self.lock().forced_status = status;
    }

    pub fn requests(&self) -> Vec<String> {
        self.lock().requests.clone()
    }

    pub fn count_requests(&self, prefix: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    pub fn task(&self, id: TaskId) -> Option<Task> {
        self.lock().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn insert(&self, mut task: Task) -> Task {
        let mut state = self.lock();
        state.next_id = state.next_id.max(task.id) + 1;
        if task.id == 0 {
            task.id = state.next_id;
        }
        state.tasks.push(task.clone());
        task
    }
}

#[async_trait]
impl TaskBackend for DevBackend {
    async fn list_tasks(&self, date: Date) -> Result<Vec<Task>, ApiError> {
        let state = self.record(format!("GET /api/tasks?date={}", format_date(date)))?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| t.task_date == date)
            .cloned()
            .collect())
    }

    async fn analytics(&self, date: Date) -> Result<Analytics, ApiError> {
        let state = self.record(format!(
            "GET /api/tasks/analytics?date={}",
            format_date(date)
        ))?;
        let total = state.tasks.iter().filter(|t| t.task_date == date).count() as u64;
        let completed = state
            .tasks
            .iter()
            .filter(|t| t.task_date == date && t.completed)
            .count() as u64;
        Ok(Analytics {
            total,
            completed,
            pending: total - completed,
        })
    }

    async fn pending_dates(&self) -> Result<Vec<Date>, ApiError> {
        let state = self.record("GET /api/tasks/pending-dates".to_string())?;
        Ok(state
            .tasks
            .iter()
            .filter(|t| !t.completed)
            .map(|t| t.task_date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect())
    }

    async fn create_task(&self, task: &NewTask) -> Result<(), ApiError> {
        let mut state = self.record("POST /api/tasks".to_string())?;
        state.next_id += 1;
        let created = Task {
            id: state.next_id,
            title: task.title.clone(),
            completed: task.completed,
            task_date: task.task_date,
            description: Some(task.description.clone()),
            priority: Some(task.priority),
            category: Some(task.category.clone()),
        };
        state.tasks.push(created);
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> Result<(), ApiError> {
        let mut state = self.record(format!("PUT /api/tasks/{}", task.id))?;
        let Some(stored) = state.tasks.iter_mut().find(|t| t.id == task.id) else {
            return Err(ApiError::Server {
                status: 500,
                message: Some("Task not found".to_string()),
            });
        };
        *stored = task.clone();
        stored.title = task.title.trim().to_string();
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let mut state = self.record(format!("DELETE /api/tasks/{}", id))?;
        state.tasks.retain(|t| t.id != id);
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for DevBackend {
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        drop(self.record("POST /api/auth/login".to_string())?);
        if username == DEV_USERNAME && password == DEV_PASSWORD {
            Ok(DEV_TOKEN.to_string())
        } else {
            Err(ApiError::Server {
                status: 401,
                message: None,
            })
        }
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        drop(self.record("POST /api/auth/register".to_string())?);
        let missing = |field: &str| ApiError::Server {
            status: 400,
            message: Some(format!("{} is required", field)),
        };
        if registration.username.trim().is_empty() {
            return Err(missing("Username"));
        }
        if registration.email.trim().is_empty() {
            return Err(missing("Email"));
        }
        Ok(())
    }
}

impl Connector for DevBackend {
    fn auth(&self) -> Arc<dyn AuthBackend> {
        Arc::new(self.clone())
    }

    fn connect(&self, _token: &str) -> Result<Arc<dyn TaskBackend>, ApiError> {
        Ok(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[tokio::test]
    async fn analytics_follow_stored_tasks() {
        let dev = DevBackend::seeded(date!(2025 - 10 - 27));

        let analytics = dev.analytics(date!(2025 - 10 - 27)).await.unwrap();
        assert_eq!(
            analytics,
            Analytics {
                total: 3,
                completed: 1,
                pending: 2
            }
        );

        let pending = dev.pending_dates().await.unwrap();
        assert_eq!(
            pending,
            vec![
                date!(2025 - 10 - 25),
                date!(2025 - 10 - 27),
                date!(2025 - 10 - 28)
            ]
        );
    }

    #[tokio::test]
    async fn forced_status_fails_every_call() {
        let dev = DevBackend::new();
        dev.fail_with_status(Some(403));

        assert!(dev
            .list_tasks(date!(2025 - 10 - 27))
            .await
            .unwrap_err()
            .is_session_expired());
        assert!(dev.delete_task(1).await.unwrap_err().is_session_expired());
        assert_eq!(dev.requests().len(), 2);
    }

    #[tokio::test]
    async fn login_accepts_demo_credentials_only() {
        let dev = DevBackend::new();

        assert_eq!(dev.login("admin", "pass").await.unwrap(), DEV_TOKEN);
        let err = dev.login("admin", "wrong").await.unwrap_err();
        assert_eq!(err.message_or("Invalid credentials"), "Invalid credentials");
    }
}
