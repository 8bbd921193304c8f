use anyhow::{Context, Result};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use time::Date;

use crate::types::{format_date, Task, TaskId};

/// One CSV line. Field renames are the header row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "ID")]
    pub id: TaskId,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Status")]
    pub status: &'static str,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl From<&Task> for ExportRow {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            status: if task.completed { "Completed" } else { "Pending" },
            priority: task.priority_or_default().to_string(),
            category: task.category_or_default().to_string(),
            date: format_date(task.task_date),
            description: task.description_or_empty().to_string(),
        }
    }
}

pub fn build_rows(tasks: &[Task]) -> Vec<ExportRow> {
    tasks.iter().map(ExportRow::from).collect()
}

pub fn export_filename(date: Date) -> String {
    format!("Tasks_{}.csv", format_date(date))
}

pub fn write_csv<W: io::Write>(rows: &[ExportRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row).context("Failed to write CSV row")?;
    }
    wtr.flush().context("Failed to flush CSV")?;
    Ok(())
}

/// Write `rows` to `<dir>/Tasks_<date>.csv` and return the full path.
pub fn write_csv_file(dir: &Path, date: Date, rows: &[ExportRow]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export dir {}", dir.display()))?;
    let path = dir.join(export_filename(date));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(rows, file)?;
    Ok(path)
}
