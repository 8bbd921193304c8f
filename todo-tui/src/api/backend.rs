//! Ports the UI talks to. The real implementations live in `client.rs`, the
//! in-memory one in `dev_backend.rs`.

use async_trait::async_trait;
use std::sync::Arc;
use time::Date;

use super::error::ApiError;
use crate::types::{Analytics, NewTask, Registration, Task, TaskId};

/// Task endpoints. Every call is made with the bearer token the backend was
/// created for.
#[async_trait]
pub trait TaskBackend: Send + Sync + 'static {
    async fn list_tasks(&self, date: Date) -> Result<Vec<Task>, ApiError>;

    async fn analytics(&self, date: Date) -> Result<Analytics, ApiError>;

    async fn pending_dates(&self) -> Result<Vec<Date>, ApiError>;

    /// Success is the status alone. Callers refetch instead of reading the
    /// created task back.
    async fn create_task(&self, task: &NewTask) -> Result<(), ApiError>;

    /// Sends the full task representation.
    async fn update_task(&self, task: &Task) -> Result<(), ApiError>;

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError>;
}

/// Unauthenticated endpoints.
#[async_trait]
pub trait AuthBackend: Send + Sync + 'static {
    /// Exchange credentials for a token.
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError>;

    async fn register(&self, registration: &Registration) -> Result<(), ApiError>;
}

/// Builds backends. `connect` is called again every time the session token
/// changes, so a client never outlives the token it was built with.
pub trait Connector: Send + Sync + 'static {
    fn auth(&self) -> Arc<dyn AuthBackend>;

    fn connect(&self, token: &str) -> Result<Arc<dyn TaskBackend>, ApiError>;
}
