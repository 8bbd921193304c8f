use super::utils::{centered_rect, truncate};
use super::*;
use crate::app::{DrawerItem, PickerField};
use ratatui::style::Color;

pub fn render_delete_confirm_dialog(frame: &mut Frame, app: &App) {
    let t = theme::theme(app.dark_mode);
    let Some(task) = app.tasks.delete_candidate() else {
        return;
    };

    let area = centered_rect(52, 9, frame.area());
    frame.render_widget(Clear, area);

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            truncate(&task.title, 44),
            Style::default().fg(t.text),
        )),
        Line::from(Span::styled(
            "This cannot be undone.",
            Style::default().fg(t.muted),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[y] Delete", Style::default().fg(Color::Red)),
            Span::raw("    "),
            Span::styled("[n] Cancel", Style::default().fg(t.text)),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(" Delete task? ")
                .padding(Padding::horizontal(1)),
        )
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

pub fn render_picker(frame: &mut Frame, app: &App) {
    let t = theme::theme(app.dark_mode);
    let Some(picker) = &app.tasks.picker else {
        return;
    };
    let options = picker.options();
    let title = match picker.field {
        PickerField::Priority => " Priority ",
        PickerField::Category => " Category ",
    };

    let area = centered_rect(30, options.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = options
        .iter()
        .map(|o| {
            let style = match picker.field {
                PickerField::Priority => crate::types::Priority::parse(o)
                    .map(|p| Style::default().fg(theme::priority_color(p)))
                    .unwrap_or_default(),
                PickerField::Category => Style::default().fg(t.text),
            };
            ListItem::new(Span::styled(*o, style))
        })
        .collect();

    let mut state = ListState::default();
    state.select(Some(picker.index));
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent))
                .title(title),
        )
        .highlight_style(Style::default().bg(t.highlight_bg))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut state);
}

pub fn render_drawer(frame: &mut Frame, app: &App) {
    let t = theme::theme(app.dark_mode);
    let Some(index) = app.drawer else {
        return;
    };

    let full = frame.area();
    let width = full.width.min(26);
    let area = Rect {
        x: full.x,
        y: full.y,
        width,
        height: full.height,
    };
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = DrawerItem::ALL
        .iter()
        .map(|item| ListItem::new(Span::styled(item.label(), Style::default().fg(t.text))))
        .collect();

    let mut state = ListState::default();
    state.select(Some(index));
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent))
                .title(" Menu ")
                .padding(Padding::vertical(1)),
        )
        .highlight_style(Style::default().bg(t.highlight_bg))
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(list, area, &mut state);
}
