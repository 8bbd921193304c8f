use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use time::Date;

use crate::types::{parse_date, Task};

#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// The login endpoint answers with the bare token. Some deployments wrap it
/// in a JSON string, so surrounding quotes are dropped.
pub fn parse_token(body: &str) -> Option<String> {
    let trimmed = body.trim();
    let token = match serde_json::from_str::<String>(trimmed) {
        Ok(unquoted) => unquoted,
        Err(_) => trimmed.to_string(),
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Anything other than a JSON array becomes an empty list. Elements that do
/// not look like tasks are skipped.
pub fn parse_task_list(value: Value) -> Vec<Task> {
    let Value::Array(items) = value else {
        tracing::warn!("Task payload is not a list, treating as empty");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Task>(item) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!("Skipping malformed task: {}", e);
                None
            }
        })
        .collect()
}

pub fn parse_pending_dates(value: Value) -> Vec<Date> {
    let Value::Array(items) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(Value::as_str)
        .filter_map(parse_date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
