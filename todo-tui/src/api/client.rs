use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use time::Date;
use url::Url;

use super::backend::{AuthBackend, Connector, TaskBackend};
use super::dto::{parse_pending_dates, parse_task_list, parse_token, LoginRequest};
use super::error::ApiError;
use crate::types::{format_date, Analytics, NewTask, Registration, Task, TaskId};

/// The stored base always ends in `/` so that joined paths extend it instead
/// of replacing a path prefix such as `https://host/todo`.
fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let normalized = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalized).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))
}

fn endpoint(base_url: &Url, path: &str) -> Result<Url, ApiError> {
    base_url
        .join(path.trim_start_matches('/'))
        .map_err(|_| ApiError::InvalidUrl(format!("{}{}", base_url, path)))
}

async fn send(request: RequestBuilder, call_name: &str) -> Result<Response, ApiError> {
    tracing::debug!("{}", call_name);
    let response = request.send().await.map_err(|e| {
        tracing::warn!("Failed to call {}: {}", call_name, e);
        ApiError::Transport(e)
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let err = ApiError::from_response(status.as_u16(), &body);
    tracing::warn!(status = status.as_u16(), "{} returned error: {}", call_name, err);
    Err(err)
}

async fn read_value(response: Response) -> Result<Value, ApiError> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
}

async fn read_json<T: DeserializeOwned>(response: Response, call_name: &str) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode {
        call: call_name.to_string(),
        reason: e.to_string(),
    })
}

/// Bodies of write calls are not used; the view refetches after every success.
async fn drain(response: Response) {
    if let Err(e) = response.bytes().await {
        tracing::debug!("Ignoring unread response body: {}", e);
    }
}

/// Task endpoints, bound to one bearer token.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ApiError::Decode {
                call: "session".to_string(),
                reason: "token contains invalid header characters".to_string(),
            })?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        endpoint(&self.base_url, path)
    }
}

#[async_trait]
impl TaskBackend for ApiClient {
    async fn list_tasks(&self, date: Date) -> Result<Vec<Task>, ApiError> {
        let response = send(
            self.client
                .get(self.endpoint("/api/tasks")?)
                .query(&[("date", format_date(date))]),
            "GET /api/tasks",
        )
        .await?;
        Ok(parse_task_list(read_value(response).await?))
    }

    async fn analytics(&self, date: Date) -> Result<Analytics, ApiError> {
        let response = send(
            self.client
                .get(self.endpoint("/api/tasks/analytics")?)
                .query(&[("date", format_date(date))]),
            "GET /api/tasks/analytics",
        )
        .await?;
        read_json(response, "GET /api/tasks/analytics").await
    }

    async fn pending_dates(&self) -> Result<Vec<Date>, ApiError> {
        let response = send(
            self.client.get(self.endpoint("/api/tasks/pending-dates")?),
            "GET /api/tasks/pending-dates",
        )
        .await?;
        Ok(parse_pending_dates(read_value(response).await?))
    }

    async fn create_task(&self, task: &NewTask) -> Result<(), ApiError> {
        let response = send(
            self.client.post(self.endpoint("/api/tasks")?).json(task),
            "POST /api/tasks",
        )
        .await?;
        drain(response).await;
        Ok(())
    }

    async fn update_task(&self, task: &Task) -> Result<(), ApiError> {
        let response = send(
            self.client
                .put(self.endpoint(&format!("/api/tasks/{}", task.id))?)
                .json(task),
            "PUT /api/tasks/:id",
        )
        .await?;
        drain(response).await;
        Ok(())
    }

    async fn delete_task(&self, id: TaskId) -> Result<(), ApiError> {
        let response = send(
            self.client
                .delete(self.endpoint(&format!("/api/tasks/{}", id))?),
            "DELETE /api/tasks/:id",
        )
        .await?;
        drain(response).await;
        Ok(())
    }
}

/// Login and registration. No token involved.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: Client,
    base_url: Url,
}

impl AuthClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::new(),
            base_url: parse_base_url(base_url)?,
        })
    }
}

#[async_trait]
impl AuthBackend for AuthClient {
    async fn login(&self, username: &str, password: &str) -> Result<String, ApiError> {
        let response = send(
            self.client
                .post(endpoint(&self.base_url, "/api/auth/login")?)
                .json(&LoginRequest { username, password }),
            "POST /api/auth/login",
        )
        .await?;

        let body = response.text().await?;
        parse_token(&body).ok_or_else(|| ApiError::Decode {
            call: "POST /api/auth/login".to_string(),
            reason: "empty token".to_string(),
        })
    }

    async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        let response = send(
            self.client
                .post(endpoint(&self.base_url, "/api/auth/register")?)
                .json(registration),
            "POST /api/auth/register",
        )
        .await?;
        drain(response).await;
        Ok(())
    }
}

/// Connects to a real server.
#[derive(Debug, Clone)]
pub struct RemoteConnector {
    base_url: String,
    auth: Arc<AuthClient>,
}

impl RemoteConnector {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            base_url: base_url.to_string(),
            auth: Arc::new(AuthClient::new(base_url)?),
        })
    }
}

impl Connector for RemoteConnector {
    fn auth(&self) -> Arc<dyn AuthBackend> {
        self.auth.clone()
    }

    fn connect(&self, token: &str) -> Result<Arc<dyn TaskBackend>, ApiError> {
        Ok(Arc::new(ApiClient::new(&self.base_url, token)?))
    }
}
