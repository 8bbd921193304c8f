use std::collections::HashSet;
use std::path::PathBuf;
use time::{Date, Duration};

use super::edit::{EditBuffers, Picker, PickerField, TitleEdit};
use super::state::{Notice, StatusFilter, TaskFocus, TextInput};
use crate::api::{ApiError, TaskBackend};
use crate::export::{self, ExportRow};
use crate::types::{Analytics, NewTask, Priority, Task, TaskId};

pub const SUGGESTIONS: [&str; 4] = ["Update docs", "Team sync", "Review PR #123", "Plan goals"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusyTarget {
    Add,
    Task(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Add,
    Toggle,
    Rename,
    Description,
    Priority,
    Category,
    Delete,
}

impl MutationKind {
    fn success_notice(self) -> Notice {
        match self {
            MutationKind::Add => Notice::success("Task added"),
            MutationKind::Toggle => Notice::info("Status updated"),
            MutationKind::Rename => Notice::success("Title saved"),
            MutationKind::Description => Notice::success("Description saved"),
            MutationKind::Priority => Notice::success("Priority updated"),
            MutationKind::Category => Notice::success("Category updated"),
            MutationKind::Delete => Notice::warning("Task deleted"),
        }
    }

    fn failure_context(self) -> &'static str {
        match self {
            MutationKind::Add => "Add failed",
            MutationKind::Toggle | MutationKind::Priority | MutationKind::Category => {
                "Update failed"
            }
            MutationKind::Rename | MutationKind::Description => "Save failed",
            MutationKind::Delete => "Delete failed",
        }
    }
}

/// Identifies a mutation once its request has been handed off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationTag {
    pub target: BusyTarget,
    pub kind: MutationKind,
}

#[derive(Debug, Clone, PartialEq)]
enum Request {
    Create(NewTask),
    Update(Task),
    Delete(TaskId),
}

/// A validated server call, only ever built by `TaskListView`. In particular
/// the sole way to obtain a delete is `confirm_delete`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    tag: MutationTag,
    request: Request,
}

impl PendingMutation {
    pub fn tag(&self) -> MutationTag {
        self.tag
    }

    pub async fn execute(&self, backend: &dyn TaskBackend) -> Result<(), ApiError> {
        match &self.request {
            Request::Create(task) => backend.create_task(task).await,
            Request::Update(task) => backend.update_task(task).await,
            Request::Delete(id) => backend.delete_task(*id).await,
        }
    }
}

/// Everything a fetch cycle is keyed on. A new cycle starts whenever this
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FetchKey {
    session_epoch: u64,
    date: Date,
    refresh_generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub cycle: u64,
    pub date: Date,
}

/// The three reads of one cycle, applied together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskSnapshot {
    pub tasks: Vec<Task>,
    pub analytics: Analytics,
    pub pending_dates: Vec<Date>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// Superseded by a newer cycle; nothing changed.
    Stale,
    SessionExpired,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    NothingToExport,
    Written(PathBuf),
    Failed,
}

/// Capability the shell holds to trigger an export without seeing task data.
pub trait ExportHandle {
    fn export_to_csv(&mut self) -> ExportOutcome;
}

/// Fetch the three reads for `date` concurrently. Fails if any one fails.
pub async fn fetch_snapshot(
    backend: &dyn TaskBackend,
    date: Date,
) -> Result<TaskSnapshot, ApiError> {
    let (tasks, analytics, pending_dates) = tokio::try_join!(
        backend.list_tasks(date),
        backend.analytics(date),
        backend.pending_dates()
    )?;
    Ok(TaskSnapshot {
        tasks,
        analytics,
        pending_dates,
    })
}

fn short_date(date: Date) -> String {
    let format = time::macros::format_description!("[month repr:short] [day padding:none]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

pub fn matches_query(task: &Task, query: &str) -> bool {
    let query = query.to_lowercase();
    task.title.to_lowercase().contains(&query)
        || task.description_or_empty().to_lowercase().contains(&query)
}

#[derive(Debug)]
pub struct TaskListView {
    pub selected_date: Date,
    pub tasks: Vec<Task>,
    /// Date the cached `tasks` were fetched for. Lags `selected_date` while
    /// the next cycle is in flight.
    loaded_date: Option<Date>,
    pub analytics: Option<Analytics>,
    pub pending_dates: Vec<Date>,
    pub is_loading: bool,
    pub error: Option<String>,

    pub drafts: EditBuffers,
    pub title_edit: Option<TitleEdit>,
    pub delete_confirm: Option<TaskId>,
    pub expanded: Option<TaskId>,
    pub picker: Option<Picker>,
    busy: HashSet<BusyTarget>,

    pub new_task_input: TextInput,
    pub search: TextInput,
    pub status_filter: StatusFilter,
    pub focus: TaskFocus,
    pub cursor: usize,
    pub pending_cursor: usize,

    pub csv_snapshot: Vec<ExportRow>,
    pub last_export: Option<PathBuf>,
    export_dir: PathBuf,

    notices: Vec<Notice>,
    suggestion_index: usize,
    refresh_generation: u64,
    cycle: u64,
    started: Option<FetchKey>,
}

impl TaskListView {
    pub fn new(selected_date: Date, export_dir: PathBuf) -> Self {
        Self {
            selected_date,
            tasks: Vec::new(),
            loaded_date: None,
            analytics: None,
            pending_dates: Vec::new(),
            is_loading: false,
            error: None,
            drafts: EditBuffers::default(),
            title_edit: None,
            delete_confirm: None,
            expanded: None,
            picker: None,
            busy: HashSet::new(),
            new_task_input: TextInput::new(),
            search: TextInput::new(),
            status_filter: StatusFilter::All,
            focus: TaskFocus::List,
            cursor: 0,
            pending_cursor: 0,
            csv_snapshot: Vec::new(),
            last_export: None,
            export_dir,
            notices: Vec::new(),
            suggestion_index: 0,
            refresh_generation: 0,
            cycle: 0,
            started: None,
        }
    }

    /// Notices produced since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    pub fn refresh_generation(&self) -> u64 {
        self.refresh_generation
    }

    // ── Fetch lifecycle ────────────────────────────────────────────────

    /// Re-enter loading for the current date.
    pub fn refresh(&mut self) {
        self.refresh_generation += 1;
    }

    /// Start a new cycle if the (session, date, refresh) key moved since the
    /// last one started. The returned ticket must accompany the result.
    pub fn next_fetch(&mut self, session_epoch: u64) -> Option<FetchTicket> {
        let key = FetchKey {
            session_epoch,
            date: self.selected_date,
            refresh_generation: self.refresh_generation,
        };
        if self.started == Some(key) {
            return None;
        }
        self.started = Some(key);
        self.cycle += 1;
        self.is_loading = true;
        self.error = None;
        Some(FetchTicket {
            cycle: self.cycle,
            date: self.selected_date,
        })
    }

    pub fn apply_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<TaskSnapshot, ApiError>,
    ) -> FetchOutcome {
        if ticket.cycle != self.cycle {
            tracing::debug!("Discarding result of superseded fetch cycle {}", ticket.cycle);
            return FetchOutcome::Stale;
        }
        self.is_loading = false;

        match result {
            Ok(snapshot) => {
                self.drafts.reseed(&snapshot.tasks);
                self.tasks = snapshot.tasks;
                self.loaded_date = Some(ticket.date);
                self.analytics = Some(snapshot.analytics);
                self.pending_dates = snapshot.pending_dates;
                self.error = None;
                self.clamp_cursors();
                FetchOutcome::Applied
            }
            Err(e) if e.is_session_expired() => FetchOutcome::SessionExpired,
            Err(e) => {
                tracing::warn!("Fetch failed for {}: {}", short_date(ticket.date), e);
                self.error = Some(e.to_string());
                self.tasks.clear();
                self.loaded_date = None;
                self.drafts.clear();
                self.analytics = None;
                self.pending_dates.clear();
                self.clamp_cursors();
                FetchOutcome::Failed
            }
        }
    }

    // ── Date navigation ────────────────────────────────────────────────

    pub fn set_date(&mut self, date: Date) {
        if date == self.selected_date {
            return;
        }
        self.selected_date = date;
        self.expanded = None;
        self.title_edit = None;
        self.picker = None;
        self.cursor = 0;
        if matches!(
            self.focus,
            TaskFocus::EditTitle | TaskFocus::EditDescription
        ) {
            self.focus = TaskFocus::List;
        }
    }

    pub fn previous_day(&mut self) {
        if let Some(date) = self.selected_date.checked_sub(Duration::days(1)) {
            self.set_date(date);
        }
    }

    pub fn next_day(&mut self) {
        if let Some(date) = self.selected_date.checked_add(Duration::days(1)) {
            self.set_date(date);
        }
    }

    pub fn select_pending_date(&mut self) {
        if let Some(date) = self.pending_dates.get(self.pending_cursor).copied() {
            self.set_date(date);
            self.focus = TaskFocus::List;
        }
    }

    pub fn pending_move(&mut self, down: bool) {
        if self.pending_dates.is_empty() {
            return;
        }
        let last = self.pending_dates.len() - 1;
        self.pending_cursor = if down {
            (self.pending_cursor + 1).min(last)
        } else {
            self.pending_cursor.saturating_sub(1)
        };
    }

    // ── Filtering ──────────────────────────────────────────────────────

    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| matches_query(t, &self.search.value) && self.status_filter.accepts(t.completed))
            .collect()
    }

    pub fn has_active_filter(&self) -> bool {
        !self.search.value.is_empty() || self.status_filter != StatusFilter::All
    }

    pub fn cycle_filter(&mut self) {
        self.status_filter = self.status_filter.next();
        self.clamp_cursors();
    }

    pub fn search_changed(&mut self) {
        self.clamp_cursors();
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.filtered_tasks().get(self.cursor).copied()
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.selected_task().map(|t| t.id)
    }

    pub fn move_cursor(&mut self, down: bool) {
        let len = self.filtered_tasks().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = if down {
            (self.cursor + 1).min(len - 1)
        } else {
            self.cursor.saturating_sub(1)
        };
    }

    fn clamp_cursors(&mut self) {
        let len = self.filtered_tasks().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.pending_cursor = self
            .pending_cursor
            .min(self.pending_dates.len().saturating_sub(1));
    }

    fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    // ── Busy tracking ──────────────────────────────────────────────────

    pub fn is_busy(&self, target: BusyTarget) -> bool {
        self.busy.contains(&target)
    }

    pub fn is_row_busy(&self, id: TaskId) -> bool {
        self.is_busy(BusyTarget::Task(id))
    }

    fn start(&mut self, kind: MutationKind, target: BusyTarget, request: Request) -> PendingMutation {
        self.busy.insert(target);
        PendingMutation {
            tag: MutationTag { target, kind },
            request,
        }
    }

    /// Apply the result of a mutation. Success always goes back to the server
    /// for fresh data; failure leaves the cached view as it was.
    pub fn finish_mutation(&mut self, tag: MutationTag, result: Result<(), ApiError>) {
        self.busy.remove(&tag.target);
        match result {
            Ok(()) => {
                match tag.kind {
                    MutationKind::Add => self.new_task_input.clear(),
                    MutationKind::Rename => {
                        if self.title_edit.as_ref().map(|e| BusyTarget::Task(e.task_id))
                            == Some(tag.target)
                        {
                            self.title_edit = None;
                            if self.focus == TaskFocus::EditTitle {
                                self.focus = TaskFocus::List;
                            }
                        }
                    }
                    MutationKind::Description => {
                        if self.expanded.map(BusyTarget::Task) == Some(tag.target) {
                            self.expanded = None;
                            if self.focus == TaskFocus::EditDescription {
                                self.focus = TaskFocus::List;
                            }
                        }
                    }
                    _ => {}
                }
                self.notify(tag.kind.success_notice());
                self.refresh();
            }
            Err(e) => {
                tracing::warn!("{}: {}", tag.kind.failure_context(), e);
                self.notify(Notice::error(e.to_string()));
            }
        }
    }

    /// Drop a mutation that was never sent.
    pub fn abandon_mutation(&mut self, tag: MutationTag) {
        self.busy.remove(&tag.target);
    }

    // ── Add ────────────────────────────────────────────────────────────

    pub fn submit_new_task(&mut self) -> Option<PendingMutation> {
        if self.is_busy(BusyTarget::Add) {
            return None;
        }
        let title = self.new_task_input.value.trim().to_string();
        if title.is_empty() {
            self.notify(Notice::error("Title required"));
            return None;
        }
        let task = NewTask::for_date(&title, self.selected_date);
        Some(self.start(MutationKind::Add, BusyTarget::Add, Request::Create(task)))
    }

    pub fn suggest_task(&mut self) {
        if self.is_busy(BusyTarget::Add) {
            return;
        }
        let suggestion = SUGGESTIONS[self.suggestion_index % SUGGESTIONS.len()];
        self.suggestion_index += 1;
        self.new_task_input.set(suggestion);
        self.notify(Notice::info("Suggestion added"));
    }

    // ── Toggle ─────────────────────────────────────────────────────────

    pub fn toggle_complete(&mut self, id: TaskId) -> Option<PendingMutation> {
        if self.is_row_busy(id) || self.title_edit.as_ref().is_some_and(|e| e.task_id == id) {
            return None;
        }
        let mut task = self.task(id)?.clone();
        task.completed = !task.completed;
        Some(self.start(MutationKind::Toggle, BusyTarget::Task(id), Request::Update(task)))
    }

    // ── Inline title edit ──────────────────────────────────────────────

    /// Begin editing `id`. Any other uncommitted title edit is dropped.
    pub fn start_title_edit(&mut self, id: TaskId) {
        if self.is_row_busy(id) {
            return;
        }
        let Some(task) = self.task(id) else {
            return;
        };
        self.title_edit = Some(TitleEdit {
            task_id: id,
            input: TextInput::from_str(&task.title),
        });
        self.focus = TaskFocus::EditTitle;
    }

    pub fn cancel_title_edit(&mut self) {
        self.title_edit = None;
        if self.focus == TaskFocus::EditTitle {
            self.focus = TaskFocus::List;
        }
    }

    /// Commit on Enter or blur. Empty or unchanged titles just leave edit mode.
    pub fn commit_title_edit(&mut self) -> Option<PendingMutation> {
        let edit = self.title_edit.clone()?;
        if self.is_row_busy(edit.task_id) {
            return None;
        }
        let new_title = edit.input.value.trim().to_string();
        let unchanged = match self.task(edit.task_id) {
            Some(task) => new_title.is_empty() || task.title == new_title,
            None => true,
        };
        if unchanged {
            self.cancel_title_edit();
            return None;
        }
        let mut task = self.task(edit.task_id)?.clone();
        task.title = new_title;
        Some(self.start(
            MutationKind::Rename,
            BusyTarget::Task(edit.task_id),
            Request::Update(task),
        ))
    }

    // ── Description / priority / category ──────────────────────────────

    pub fn toggle_expanded(&mut self, id: TaskId) {
        self.expanded = if self.expanded == Some(id) { None } else { Some(id) };
    }

    pub fn description_draft_mut(&mut self) -> Option<&mut TextInput> {
        let id = self.expanded?;
        if self.is_row_busy(id) {
            return None;
        }
        self.drafts.get_mut(id).map(|d| &mut d.description)
    }

    pub fn save_description(&mut self, id: TaskId) -> Option<PendingMutation> {
        if self.is_row_busy(id) {
            return None;
        }
        let task = self.task(id)?;
        let new_description = self
            .drafts
            .get(id)
            .map(|d| d.description.value.trim().to_string())
            .unwrap_or_default();
        if task.description_or_empty() == new_description {
            self.notify(Notice::info("No changes"));
            return None;
        }
        let mut task = task.clone();
        task.description = Some(new_description);
        Some(self.start(
            MutationKind::Description,
            BusyTarget::Task(id),
            Request::Update(task),
        ))
    }

    pub fn select_priority(&mut self, id: TaskId, priority: Priority) -> Option<PendingMutation> {
        if self.is_row_busy(id) {
            return None;
        }
        let task = self.task(id)?;
        if task.priority == Some(priority) {
            return None;
        }
        let mut task = task.clone();
        task.priority = Some(priority);
        if let Some(draft) = self.drafts.get_mut(id) {
            draft.priority = priority;
        }
        Some(self.start(
            MutationKind::Priority,
            BusyTarget::Task(id),
            Request::Update(task),
        ))
    }

    pub fn select_category(&mut self, id: TaskId, category: &str) -> Option<PendingMutation> {
        if self.is_row_busy(id) {
            return None;
        }
        let task = self.task(id)?;
        if task.category.as_deref() == Some(category) {
            return None;
        }
        let mut task = task.clone();
        task.category = Some(category.to_string());
        if let Some(draft) = self.drafts.get_mut(id) {
            draft.category = category.to_string();
        }
        Some(self.start(
            MutationKind::Category,
            BusyTarget::Task(id),
            Request::Update(task),
        ))
    }

    pub fn open_picker(&mut self, id: TaskId, field: PickerField) {
        if self.is_row_busy(id) {
            return;
        }
        let Some(draft) = self.drafts.get(id) else {
            return;
        };
        let mut picker = Picker {
            task_id: id,
            field,
            index: 0,
        };
        let current = match field {
            PickerField::Priority => draft.priority.as_str().to_string(),
            PickerField::Category => draft.category.clone(),
        };
        picker.index = picker
            .options()
            .iter()
            .position(|o| *o == current)
            .unwrap_or(0);
        self.picker = Some(picker);
    }

    /// Commit the picker's current choice and close it.
    pub fn choose_picked(&mut self) -> Option<PendingMutation> {
        let picker = self.picker.take()?;
        let choice = picker.selected();
        match picker.field {
            PickerField::Priority => {
                let priority = Priority::parse(choice)?;
                self.select_priority(picker.task_id, priority)
            }
            PickerField::Category => self.select_category(picker.task_id, choice),
        }
    }

    // ── Delete ─────────────────────────────────────────────────────────

    pub fn request_delete(&mut self, id: TaskId) {
        if self.is_row_busy(id) || self.task(id).is_none() {
            return;
        }
        self.delete_confirm = Some(id);
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirm = None;
    }

    pub fn confirm_delete(&mut self) -> Option<PendingMutation> {
        let id = self.delete_confirm.take()?;
        if self.is_row_busy(id) {
            return None;
        }
        Some(self.start(MutationKind::Delete, BusyTarget::Task(id), Request::Delete(id)))
    }

    pub fn delete_candidate(&self) -> Option<&Task> {
        self.delete_confirm.and_then(|id| self.task(id))
    }
}

impl ExportHandle for TaskListView {
    fn export_to_csv(&mut self) -> ExportOutcome {
        if self.tasks.is_empty() {
            self.notify(Notice::info("No tasks to export"));
            return ExportOutcome::NothingToExport;
        }

        // The snapshot is committed first; the file is written from it.
        self.csv_snapshot = export::build_rows(&self.tasks);
        let file_date = self.loaded_date.unwrap_or(self.selected_date);

        match export::write_csv_file(&self.export_dir, file_date, &self.csv_snapshot) {
            Ok(path) => {
                tracing::info!("Exported {} tasks to {}", self.csv_snapshot.len(), path.display());
                self.notify(Notice::success(format!("CSV ready: {}", path.display())));
                self.last_export = Some(path.clone());
                ExportOutcome::Written(path)
            }
            Err(e) => {
                tracing::warn!("CSV export failed: {:#}", e);
                self.notify(Notice::error(format!("Export failed: {}", e)));
                ExportOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DevBackend;
    use time::macros::date;

    const DAY: Date = date!(2025 - 10 - 27);

    fn task(id: TaskId, title: &str, completed: bool) -> Task {
        Task {
            id,
            title: title.to_string(),
            completed,
            task_date: DAY,
            description: None,
            priority: None,
            category: None,
        }
    }

    fn loaded_view(tasks: Vec<Task>) -> TaskListView {
        let mut view = TaskListView::new(DAY, PathBuf::from("."));
        let ticket = view.next_fetch(1).unwrap();
        let outcome = view.apply_fetch(
            ticket,
            Ok(TaskSnapshot {
                tasks,
                analytics: Analytics::default(),
                pending_dates: vec![DAY],
            }),
        );
        assert_eq!(outcome, FetchOutcome::Applied);
        view
    }

    #[test]
    fn fetch_is_due_only_when_key_changes() {
        let mut view = TaskListView::new(DAY, PathBuf::from("."));

        assert!(view.next_fetch(1).is_some());
        assert!(view.next_fetch(1).is_none());

        view.refresh();
        assert!(view.next_fetch(1).is_some());

        view.next_day();
        assert_eq!(view.next_fetch(1).unwrap().date, date!(2025 - 10 - 28));

        assert!(view.next_fetch(2).is_some(), "token change refetches");
    }

    #[test]
    fn superseded_cycle_never_applies_in_either_order() {
        let mut view = TaskListView::new(DAY, PathBuf::from("."));
        let first = view.next_fetch(1).unwrap();
        view.set_date(date!(2025 - 10 - 28));
        let second = view.next_fetch(1).unwrap();

        let old = TaskSnapshot {
            tasks: vec![task(1, "from first", false)],
            ..Default::default()
        };
        let new = TaskSnapshot {
            tasks: vec![task(2, "from second", false)],
            ..Default::default()
        };

        // Late arrival of the first cycle.
        assert_eq!(view.apply_fetch(second, Ok(new.clone())), FetchOutcome::Applied);
        assert_eq!(view.apply_fetch(first, Ok(old.clone())), FetchOutcome::Stale);
        assert_eq!(view.tasks[0].title, "from second");

        // First cycle arriving before the second one completes.
        let mut view = TaskListView::new(DAY, PathBuf::from("."));
        let first = view.next_fetch(1).unwrap();
        view.refresh();
        let second = view.next_fetch(1).unwrap();
        assert_eq!(view.apply_fetch(first, Ok(old)), FetchOutcome::Stale);
        assert!(view.tasks.is_empty());
        assert!(view.is_loading);
        assert_eq!(view.apply_fetch(second, Ok(new)), FetchOutcome::Applied);
        assert!(!view.is_loading);
    }

    #[test]
    fn failed_fetch_resets_view_and_keeps_message() {
        let mut view = loaded_view(vec![task(1, "a", false)]);
        view.refresh();
        let ticket = view.next_fetch(1).unwrap();

        let err = ApiError::Server {
            status: 502,
            message: None,
        };
        assert_eq!(view.apply_fetch(ticket, Err(err)), FetchOutcome::Failed);

        assert_eq!(view.error.as_deref(), Some("Server error (502)"));
        assert!(view.tasks.is_empty());
        assert!(view.analytics.is_none());
        assert!(view.pending_dates.is_empty());
    }

    #[test]
    fn forbidden_fetch_is_reported_as_session_expired() {
        let mut view = TaskListView::new(DAY, PathBuf::from("."));
        let ticket = view.next_fetch(1).unwrap();

        assert_eq!(
            view.apply_fetch(ticket, Err(ApiError::SessionExpired)),
            FetchOutcome::SessionExpired
        );
    }

    #[test]
    fn whitespace_title_is_rejected_without_request() {
        let mut view = loaded_view(vec![]);
        view.new_task_input.set("  ");

        assert!(view.submit_new_task().is_none());
        assert_eq!(view.take_notices(), vec![Notice::error("Title required")]);
        assert!(!view.is_busy(BusyTarget::Add));
    }

    #[test]
    fn add_success_clears_input_and_refreshes() {
        let mut view = loaded_view(vec![]);
        view.new_task_input.set("  Plan goals ");
        let generation = view.refresh_generation();

        let mutation = view.submit_new_task().unwrap();
        assert!(view.is_busy(BusyTarget::Add));
        assert_eq!(
            mutation.request,
            Request::Create(NewTask::for_date("Plan goals", DAY))
        );

        view.finish_mutation(mutation.tag(), Ok(()));
        assert!(view.new_task_input.value.is_empty());
        assert!(!view.is_busy(BusyTarget::Add));
        assert_eq!(view.refresh_generation(), generation + 1);
        assert!(view.tasks.is_empty(), "no local insertion");
    }

    #[test]
    fn failed_mutation_keeps_cached_view() {
        let mut view = loaded_view(vec![task(1, "a", false)]);
        let generation = view.refresh_generation();

        let mutation = view.toggle_complete(1).unwrap();
        view.finish_mutation(
            mutation.tag(),
            Err(ApiError::Server {
                status: 500,
                message: Some("boom".into()),
            }),
        );

        assert!(!view.tasks[0].completed);
        assert_eq!(view.refresh_generation(), generation);
        assert_eq!(view.take_notices(), vec![Notice::error("boom")]);
        assert!(!view.is_row_busy(1));
    }

    #[test]
    fn busy_row_rejects_interaction() {
        let mut view = loaded_view(vec![task(1, "a", false), task(2, "b", false)]);

        let _pending = view.toggle_complete(1).unwrap();
        assert!(view.toggle_complete(1).is_none());
        view.request_delete(1);
        assert!(view.delete_confirm.is_none());
        assert!(view.toggle_complete(2).is_some(), "other rows stay usable");
    }

    #[test]
    fn renaming_to_same_trimmed_title_exits_without_request() {
        let mut view = loaded_view(vec![task(1, "Team sync", false)]);

        view.start_title_edit(1);
        view.title_edit.as_mut().unwrap().input.set("  Team sync  ");

        assert!(view.commit_title_edit().is_none());
        assert!(view.title_edit.is_none());
        assert_eq!(view.focus, TaskFocus::List);

        view.start_title_edit(1);
        view.title_edit.as_mut().unwrap().input.set("   ");
        assert!(view.commit_title_edit().is_none());
        assert!(view.title_edit.is_none());
    }

    #[test]
    fn rename_sends_trimmed_title_and_closes_on_success() {
        let mut view = loaded_view(vec![task(1, "Team sync", false)]);
        view.start_title_edit(1);
        view.title_edit.as_mut().unwrap().input.set(" Team standup ");

        let mutation = view.commit_title_edit().unwrap();
        let Request::Update(sent) = &mutation.request else {
            panic!("expected update");
        };
        assert_eq!(sent.title, "Team standup");
        assert!(view.title_edit.is_some(), "edit stays open until the save lands");

        view.finish_mutation(mutation.tag(), Ok(()));
        assert!(view.title_edit.is_none());
    }

    #[test]
    fn starting_new_title_edit_abandons_previous() {
        let mut view = loaded_view(vec![task(1, "a", false), task(2, "b", false)]);
        view.start_title_edit(1);
        view.title_edit.as_mut().unwrap().input.set("changed");

        view.start_title_edit(2);

        let edit = view.title_edit.as_ref().unwrap();
        assert_eq!(edit.task_id, 2);
        assert_eq!(edit.input.value, "b");
        assert_eq!(view.tasks[0].title, "a");
    }

    #[test]
    fn unchanged_description_reports_no_changes() {
        let mut view = loaded_view(vec![task(1, "a", false)]);
        view.toggle_expanded(1);

        assert!(view.save_description(1).is_none());
        assert_eq!(view.take_notices(), vec![Notice::info("No changes")]);

        view.description_draft_mut().unwrap().set("  notes ");
        let mutation = view.save_description(1).unwrap();
        let Request::Update(sent) = &mutation.request else {
            panic!("expected update");
        };
        assert_eq!(sent.description.as_deref(), Some("notes"));

        view.finish_mutation(mutation.tag(), Ok(()));
        assert!(view.expanded.is_none());
    }

    #[test]
    fn refresh_discards_unsaved_drafts() {
        let mut view = loaded_view(vec![task(1, "a", false)]);
        view.toggle_expanded(1);
        view.description_draft_mut().unwrap().set("unsaved");

        view.refresh();
        let ticket = view.next_fetch(1).unwrap();
        view.apply_fetch(
            ticket,
            Ok(TaskSnapshot {
                tasks: vec![task(1, "a", false)],
                ..Default::default()
            }),
        );

        assert_eq!(view.drafts.get(1).unwrap().description.value, "");
    }

    #[test]
    fn priority_selection_commits_immediately_unless_unchanged() {
        let mut t = task(1, "a", false);
        t.priority = Some(Priority::High);
        let mut view = loaded_view(vec![t]);

        assert!(view.select_priority(1, Priority::High).is_none());
        let mutation = view.select_priority(1, Priority::Low).unwrap();
        assert_eq!(mutation.tag().kind, MutationKind::Priority);
        assert_eq!(view.drafts.get(1).unwrap().priority, Priority::Low);
    }

    #[test]
    fn picker_commits_category() {
        let mut view = loaded_view(vec![task(1, "a", false)]);
        view.open_picker(1, PickerField::Category);
        assert_eq!(view.picker.as_ref().unwrap().selected(), "Other");
        view.picker.as_mut().unwrap().index = 0;

        let mutation = view.choose_picked().unwrap();
        let Request::Update(sent) = &mutation.request else {
            panic!("expected update");
        };
        assert_eq!(sent.category.as_deref(), Some("Work"));
        assert!(view.picker.is_none());
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut view = loaded_view(vec![task(7, "a", false)]);

        assert!(view.confirm_delete().is_none(), "nothing requested yet");

        view.request_delete(7);
        assert_eq!(view.delete_candidate().map(|t| t.id), Some(7));
        view.cancel_delete();
        assert!(view.confirm_delete().is_none());

        view.request_delete(7);
        let mutation = view.confirm_delete().unwrap();
        assert_eq!(mutation.request, Request::Delete(7));
        assert!(view.delete_confirm.is_none());
        assert!(view.is_row_busy(7));
    }

    #[test]
    fn search_matches_description_case_insensitively() {
        let mut review = task(1, "Code review", false);
        review.description = Some("Review PR #123".to_string());
        let mut view = loaded_view(vec![review, task(2, "Gym", true)]);

        view.search.set("pr #123");
        let ids: Vec<TaskId> = view.filtered_tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1]);

        view.search.set("PR #123");
        assert_eq!(view.filtered_tasks().len(), 1);

        view.search.clear();
        view.cycle_filter();
        let pending: Vec<TaskId> = view.filtered_tasks().iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![1]);
        view.cycle_filter();
        let done: Vec<TaskId> = view.filtered_tasks().iter().map(|t| t.id).collect();
        assert_eq!(done, vec![2]);
        assert_eq!(view.tasks.len(), 2, "filtering never touches the cache");
    }

    #[test]
    fn date_change_abandons_edits() {
        let mut view = loaded_view(vec![task(1, "a", false)]);
        view.start_title_edit(1);
        view.toggle_expanded(1);

        view.previous_day();

        assert_eq!(view.selected_date, date!(2025 - 10 - 26));
        assert!(view.title_edit.is_none());
        assert!(view.expanded.is_none());
        assert_eq!(view.focus, TaskFocus::List);
    }

    #[test]
    fn export_with_no_tasks_only_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = TaskListView::new(DAY, dir.path().to_path_buf());

        assert_eq!(view.export_to_csv(), ExportOutcome::NothingToExport);
        assert_eq!(view.take_notices(), vec![Notice::info("No tasks to export")]);
        assert!(view.csv_snapshot.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn export_commits_snapshot_and_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = loaded_view(vec![task(1, "a", true), task(2, "b", false)]);
        view.export_dir = dir.path().to_path_buf();

        let ExportOutcome::Written(path) = view.export_to_csv() else {
            panic!("expected a written file");
        };

        assert_eq!(view.csv_snapshot.len(), 2);
        assert_eq!(path, dir.path().join("Tasks_2025-10-27.csv"));
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn export_during_date_change_names_file_after_loaded_day() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = loaded_view(vec![task(1, "a", false)]);
        view.export_dir = dir.path().to_path_buf();

        view.next_day();
        assert!(view.next_fetch(1).is_some());

        let ExportOutcome::Written(path) = view.export_to_csv() else {
            panic!("expected a written file");
        };
        assert_eq!(path, dir.path().join("Tasks_2025-10-27.csv"));
        assert!(!dir.path().join("Tasks_2025-10-28.csv").exists());
    }

    #[test]
    fn suggestions_rotate() {
        let mut view = loaded_view(vec![]);
        view.suggest_task();
        assert_eq!(view.new_task_input.value, "Update docs");
        view.suggest_task();
        assert_eq!(view.new_task_input.value, "Team sync");
    }

    #[tokio::test]
    async fn empty_day_yields_zero_analytics() {
        let backend = DevBackend::new();

        let snapshot = fetch_snapshot(&backend, DAY).await.unwrap();

        assert!(snapshot.tasks.is_empty());
        assert!(snapshot.pending_dates.is_empty());
        assert_eq!(
            snapshot.analytics,
            Analytics {
                total: 0,
                completed: 0,
                pending: 0
            }
        );
        assert_eq!(backend.requests().len(), 3);
    }

    #[tokio::test]
    async fn toggling_twice_restores_completion() {
        let backend = DevBackend::new();
        backend.insert(task(5, "Gym", false));
        let mut view = TaskListView::new(DAY, PathBuf::from("."));

        for _ in 0..2 {
            let ticket = view.next_fetch(1).unwrap();
            view.apply_fetch(ticket, fetch_snapshot(&backend, DAY).await);
            let mutation = view.toggle_complete(5).unwrap();
            let result = mutation.execute(&backend).await;
            view.finish_mutation(mutation.tag(), result);
        }
        let ticket = view.next_fetch(1).unwrap();
        view.apply_fetch(ticket, fetch_snapshot(&backend, DAY).await);

        assert!(!view.tasks[0].completed);
        assert_eq!(backend.count_requests("PUT /api/tasks/5"), 2);
    }
}
