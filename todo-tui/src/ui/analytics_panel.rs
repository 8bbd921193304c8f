use super::utils::short_date;
use super::*;
use crate::app::{TaskFocus, TaskListView};
use crate::types::Analytics;
use ratatui::style::Color;
use time::Date;

pub fn render_side_panel(frame: &mut Frame, view: &TaskListView, t: &Theme, area: Rect) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(14), Constraint::Min(3)])
        .split(area);

    render_analytics(frame, view.analytics, &analytics_title(view.selected_date), t, split[0]);
    render_pending_dates(frame, view, t, split[1]);
}

pub fn analytics_title(date: Date) -> String {
    format!(" {} ", short_date(date))
}

/// Percentage of completed tasks, 0 when there are none.
pub fn completion_percent(analytics: Analytics) -> f64 {
    if analytics.total == 0 {
        0.0
    } else {
        analytics.completed as f64 / analytics.total as f64 * 100.0
    }
}

fn render_analytics(
    frame: &mut Frame,
    analytics: Option<Analytics>,
    title: &str,
    t: &Theme,
    area: Rect,
) {
    use tui_piechart::{PieChart, PieSlice};

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(t.border))
        .title(title.to_string());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Render zeros until the first fetch lands
    let a = analytics.unwrap_or_default();

    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(4)])
        .split(inner);

    if a.total > 0 {
        let done_pct = completion_percent(a);
        let slices = vec![
            PieSlice::new("Completed", done_pct, t.done),
            PieSlice::new("Pending", 100.0 - done_pct, Color::Yellow),
        ];
        let pie = PieChart::new(slices)
            .show_legend(false)
            .show_percentages(false);
        frame.render_widget(pie, split[0]);
    } else {
        frame.render_widget(
            Paragraph::new("No data")
                .alignment(Alignment::Center)
                .style(Style::default().fg(t.muted)),
            split[0],
        );
    }

    let lines = vec![
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(t.done)),
            Span::styled(
                format!("Completed  {}", a.completed),
                Style::default().fg(t.text),
            ),
        ]),
        Line::from(vec![
            Span::styled("■ ", Style::default().fg(Color::Yellow)),
            Span::styled(format!("Pending    {}", a.pending), Style::default().fg(t.text)),
        ]),
        Line::from(Span::styled(
            format!("Total {}  ({:.0}% done)", a.total, completion_percent(a)),
            Style::default().fg(t.muted),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1))),
        split[1],
    );
}

fn render_pending_dates(frame: &mut Frame, view: &TaskListView, t: &Theme, area: Rect) {
    let focused = view.focus == TaskFocus::PendingDates;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(t.accent)
        } else {
            Style::default().fg(t.border)
        })
        .title(" Pending dates ");

    if view.pending_dates.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled("Nothing pending", Style::default().fg(t.muted)))
                .block(block.padding(Padding::horizontal(1))),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = view
        .pending_dates
        .iter()
        .map(|d| {
            let style = if *d == view.selected_date {
                Style::default().fg(t.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(t.text)
            };
            ListItem::new(Span::styled(short_date(*d), style))
        })
        .collect();

    let mut state = ListState::default();
    if focused {
        state.select(Some(view.pending_cursor));
    }
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(t.highlight_bg))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut state);
}
