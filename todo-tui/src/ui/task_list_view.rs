use super::utils::truncate;
use super::*;
use crate::app::{BusyTarget, TaskFocus, TaskListView};
use crate::types::Task;

pub fn render_task_list_view(frame: &mut Frame, app: &App, body: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(34)])
        .split(body);

    let view = &app.tasks;
    let t = theme::theme(app.dark_mode);

    let detail_height = if view.expanded.is_some() { 7 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(detail_height),
            Constraint::Length(1),
        ])
        .split(columns[0]);

    render_add_input(frame, view, &t, rows[0]);
    render_search_bar(frame, view, &t, rows[1]);
    render_tasks(frame, view, &t, rows[2]);
    if let Some(id) = view.expanded {
        render_detail(frame, view, &t, id, rows[3]);
    }
    render_summary(frame, view, &t, rows[4]);

    analytics_panel::render_side_panel(frame, view, &t, columns[1]);
}

fn focus_border(focused: bool, t: &Theme) -> Style {
    if focused {
        Style::default().fg(t.accent)
    } else {
        Style::default().fg(t.border)
    }
}

fn render_add_input(frame: &mut Frame, view: &TaskListView, t: &Theme, area: Rect) {
    let focused = view.focus == TaskFocus::AddInput;
    let busy = view.is_busy(BusyTarget::Add);
    let input = &view.new_task_input;

    let line = if busy {
        Line::from(Span::styled("Adding…", Style::default().fg(t.muted)))
    } else if input.value.is_empty() && !focused {
        Line::from(Span::styled(
            "Press a to add a task, s for a suggestion",
            Style::default().fg(t.muted),
        ))
    } else {
        input_line(input, focused, t)
    };

    frame.render_widget(
        Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(focused, t))
                .title(" New task ")
                .padding(Padding::horizontal(1)),
        ),
        area,
    );
}

fn render_search_bar(frame: &mut Frame, view: &TaskListView, t: &Theme, area: Rect) {
    let focused = view.focus == TaskFocus::Search;
    let mut spans = vec![Span::styled("Search: ", Style::default().fg(t.muted))];
    spans.extend(input_line(&view.search, focused, t).spans);
    spans.push(Span::raw("   "));
    spans.push(Span::styled("Status: ", Style::default().fg(t.muted)));
    spans.push(Span::styled(
        view.status_filter.label(),
        Style::default().fg(t.accent),
    ));
    if view.has_active_filter() {
        spans.push(Span::styled("  (f: next filter)", Style::default().fg(t.muted)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(focused, t))
                .padding(Padding::horizontal(1)),
        ),
        area,
    );
}

fn task_row<'a>(view: &'a TaskListView, task: &'a Task, width: usize, t: &Theme) -> ListItem<'a> {
    let busy = view.is_row_busy(task.id);
    let check = if task.completed { "[x] " } else { "[ ] " };
    let priority = task.priority_or_default();

    let title_style = if busy {
        Style::default().fg(t.muted).add_modifier(Modifier::ITALIC)
    } else if task.completed {
        Style::default()
            .fg(t.done)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(t.text)
    };

    let mut spans = vec![Span::styled(check, Style::default().fg(t.done))];

    match &view.title_edit {
        Some(edit) if edit.task_id == task.id => {
            spans.extend(input_line(&edit.input, true, t).spans);
        }
        _ => {
            let max = width.saturating_sub(28);
            spans.push(Span::styled(truncate(&task.title, max), title_style));
        }
    }

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("{:<6}", priority.as_str()),
        Style::default().fg(theme::priority_color(priority)),
    ));
    spans.push(Span::styled(
        format!(" {}", task.category_or_default()),
        Style::default().fg(t.muted),
    ));
    if busy {
        spans.push(Span::styled(" …", Style::default().fg(t.accent)));
    }

    ListItem::new(Line::from(spans))
}

fn render_tasks(frame: &mut Frame, view: &TaskListView, t: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_border(
            matches!(view.focus, TaskFocus::List | TaskFocus::EditTitle),
            t,
        ))
        .title(" Tasks ")
        .padding(Padding::horizontal(1));

    if view.is_loading && view.tasks.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Loading…", Style::default().fg(t.muted))).block(block),
            area,
        );
        return;
    }

    if let Some(err) = &view.error {
        let lines = vec![
            Line::from(Span::styled(
                err.as_str(),
                Style::default().fg(ratatui::style::Color::Red),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("r", Style::default().fg(t.accent)),
                Span::styled(": Retry", Style::default().fg(t.muted)),
            ]),
        ];
        frame.render_widget(Paragraph::new(lines).block(block), area);
        return;
    }

    let visible = view.filtered_tasks();
    if visible.is_empty() {
        let message = if view.tasks.is_empty() {
            "No tasks scheduled."
        } else {
            "No tasks match your filters."
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(t.muted)))
                .alignment(Alignment::Center)
                .block(block),
            area,
        );
        return;
    }

    let width = area.width as usize;
    let items: Vec<ListItem> = visible
        .iter()
        .map(|task| task_row(view, task, width, t))
        .collect();

    let mut state = ListState::default();
    if view.focus == TaskFocus::List || view.focus == TaskFocus::EditTitle {
        state.select(Some(view.cursor));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(t.highlight_bg))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_detail(frame: &mut Frame, view: &TaskListView, t: &Theme, id: i64, area: Rect) {
    let Some(draft) = view.drafts.get(id) else {
        return;
    };
    let focused = view.focus == TaskFocus::EditDescription;
    let busy = view.is_row_busy(id);

    let description = if draft.description.value.is_empty() && !focused {
        Line::from(Span::styled(
            "No description. Press i to write one.",
            Style::default().fg(t.muted),
        ))
    } else {
        input_line(&draft.description, focused, t)
    };

    let lines = vec![
        description,
        Line::from(""),
        Line::from(vec![
            Span::styled("Priority: ", Style::default().fg(t.muted)),
            Span::styled(
                draft.priority.as_str(),
                Style::default().fg(theme::priority_color(draft.priority)),
            ),
            Span::styled("   Category: ", Style::default().fg(t.muted)),
            Span::styled(draft.category.as_str(), Style::default().fg(t.text)),
        ]),
        Line::from(if busy {
            Span::styled("Saving…", Style::default().fg(t.accent))
        } else {
            Span::styled(
                "Enter: save description   p: priority   c: category",
                Style::default().fg(t.muted),
            )
        }),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(focused, t))
                .title(" Details ")
                .padding(Padding::horizontal(1)),
        ),
        area,
    );
}

pub fn summary_text(view: &TaskListView) -> String {
    let total = view.tasks.len();
    let shown = view.filtered_tasks().len();
    if shown == total {
        format!("Showing all {} tasks", total)
    } else {
        format!("Showing {} of {} tasks", shown, total)
    }
}

fn render_summary(frame: &mut Frame, view: &TaskListView, t: &Theme, area: Rect) {
    let mut spans = vec![Span::styled(summary_text(view), Style::default().fg(t.muted))];
    if let Some(path) = &view.last_export {
        spans.push(Span::styled(
            format!("   Last export: {}", path.display()),
            Style::default().fg(t.muted),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
