use std::collections::HashMap;

use super::state::TextInput;
use crate::types::{Priority, Task, TaskId, CATEGORIES};

/// In-progress values for one task. Nothing here reaches the server until a
/// save succeeds.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub description: TextInput,
    pub priority: Priority,
    pub category: String,
}

impl Draft {
    fn from_task(task: &Task) -> Self {
        Self {
            description: TextInput::from_str(task.description_or_empty()),
            priority: task.priority_or_default(),
            category: task.category_or_default().to_string(),
        }
    }
}

/// Side table of drafts keyed by server id. Re-seeded from every successful
/// fetch so a draft never outlives the data it was derived from.
#[derive(Debug, Clone, Default)]
pub struct EditBuffers {
    drafts: HashMap<TaskId, Draft>,
}

impl EditBuffers {
    pub fn reseed(&mut self, tasks: &[Task]) {
        self.drafts = tasks.iter().map(|t| (t.id, Draft::from_task(t))).collect();
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    pub fn get(&self, id: TaskId) -> Option<&Draft> {
        self.drafts.get(&id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Draft> {
        self.drafts.get_mut(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.drafts.len()
    }
}

/// The single inline title edit.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleEdit {
    pub task_id: TaskId,
    pub input: TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerField {
    Priority,
    Category,
}

/// Overlay for choosing a priority or category. Choosing commits at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Picker {
    pub task_id: TaskId,
    pub field: PickerField,
    pub index: usize,
}

impl Picker {
    pub fn options(&self) -> Vec<&'static str> {
        match self.field {
            PickerField::Priority => Priority::ALL.iter().map(|p| p.as_str()).collect(),
            PickerField::Category => CATEGORIES.to_vec(),
        }
    }

    pub fn move_down(&mut self) {
        let len = self.options().len();
        self.index = (self.index + 1) % len;
    }

    pub fn move_up(&mut self) {
        let len = self.options().len();
        self.index = (self.index + len - 1) % len;
    }

    pub fn selected(&self) -> &'static str {
        let options = self.options();
        options[self.index.min(options.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn task(id: TaskId, description: Option<&str>) -> Task {
        Task {
            id,
            title: format!("task {id}"),
            completed: false,
            task_date: date!(2025 - 10 - 27),
            description: description.map(str::to_string),
            priority: None,
            category: None,
        }
    }

    #[test]
    fn reseed_replaces_stale_drafts() {
        let mut buffers = EditBuffers::default();
        buffers.reseed(&[task(1, Some("old")), task(2, None)]);
        buffers.get_mut(1).unwrap().description.set("typed but unsaved");

        buffers.reseed(&[task(1, Some("server value"))]);

        assert_eq!(buffers.len(), 1);
        assert_eq!(buffers.get(1).unwrap().description.value, "server value");
        assert!(buffers.get(2).is_none());
    }

    #[test]
    fn drafts_start_from_display_defaults() {
        let mut buffers = EditBuffers::default();
        buffers.reseed(&[task(1, None)]);

        let draft = buffers.get(1).unwrap();
        assert_eq!(draft.priority, Priority::Medium);
        assert_eq!(draft.category, "Other");
        assert_eq!(draft.description.value, "");
    }

    #[test]
    fn picker_wraps() {
        let mut picker = Picker {
            task_id: 1,
            field: PickerField::Priority,
            index: 0,
        };
        picker.move_up();
        assert_eq!(picker.selected(), "high");
        picker.move_down();
        assert_eq!(picker.selected(), "low");
    }
}
