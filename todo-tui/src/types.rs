use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub type TaskId = i64;

pub const DEFAULT_CATEGORY: &str = "Other";

/// Categories offered by the picker. The server stores free text, so tasks
/// may still carry values outside this list.
pub const CATEGORIES: [&str; 6] = ["Work", "Personal", "Shopping", "Health", "Learning", "Other"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown or empty priority strings are treated as absent.
fn lenient_priority<'de, D>(deserializer: D) -> Result<Option<Priority>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Priority::parse))
}

/// A task as stored by the server.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "iso_date")]
    pub task_date: Date,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Task {
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn priority_or_default(&self) -> Priority {
        self.priority.unwrap_or_default()
    }

    pub fn category_or_default(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }
}

/// Body of `POST /api/tasks`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub completed: bool,
    #[serde(with = "iso_date")]
    pub task_date: Date,
    pub description: String,
    pub priority: Priority,
    pub category: String,
}

impl NewTask {
    pub fn for_date(title: &str, task_date: Date) -> Self {
        Self {
            title: title.trim().to_string(),
            completed: false,
            task_date,
            description: String::new(),
            priority: Priority::Medium,
            category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

/// Per-date counts computed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Analytics {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub pending: u64,
}

/// Body of `POST /api/auth/register`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub username: String,
    pub password: String,
}

pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

pub fn parse_date(s: &str) -> Option<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(s.trim(), &format).ok()
}
