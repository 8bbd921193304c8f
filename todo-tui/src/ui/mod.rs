use crate::app::{App, Screen, TextInput};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

mod analytics_panel;
mod dialogs;
mod login_view;
mod task_list_view;
pub(super) mod theme;
pub(super) mod utils;

use theme::Theme;

pub fn render(frame: &mut Frame, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);

    match app.screen() {
        Screen::Login => login_view::render_login_view(frame, app, root[1]),
        Screen::Tasks => task_list_view::render_task_list_view(frame, app, root[1]),
    }

    render_notifications(frame, root[2], app);
    render_help(frame, root[3], app);

    if app.screen() == Screen::Tasks {
        if app.tasks.delete_confirm.is_some() {
            dialogs::render_delete_confirm_dialog(frame, app);
        } else if app.tasks.picker.is_some() {
            dialogs::render_picker(frame, app);
        }
        if app.drawer.is_some() {
            dialogs::render_drawer(frame, app);
        }
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &mut App) {
    let t = theme::theme(app.dark_mode);
    const LABEL: &str = " Daily Tasks";

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(LABEL.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(area);

    let throbber = throbber_widgets_tui::Throbber::default()
        .style(Style::default().fg(t.accent))
        .throbber_style(Style::default().fg(t.accent))
        .throbber_set(throbber_widgets_tui::BRAILLE_SIX)
        .use_type(if app.is_busy() {
            throbber_widgets_tui::WhichUse::Spin
        } else {
            throbber_widgets_tui::WhichUse::Full
        });
    frame.render_stateful_widget(throbber, cols[0], &mut app.throbber_state);
    frame.render_widget(
        Paragraph::new(Span::styled(
            LABEL,
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD),
        )),
        cols[1],
    );

    let right = match app.screen() {
        Screen::Login => String::new(),
        Screen::Tasks => {
            let date = utils::long_date(app.tasks.selected_date);
            if app.tasks.selected_date == app.today() {
                format!("{}  (today) ", date)
            } else {
                format!("{} ", date)
            }
        }
    };
    frame.render_widget(
        Paragraph::new(Span::styled(right, Style::default().fg(t.text)))
            .alignment(Alignment::Right)
            .block(
                Block::default()
                    .borders(Borders::BOTTOM)
                    .border_style(Style::default().fg(t.muted)),
            ),
        cols[2],
    );
}

fn render_notifications(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    for notice in app.notifications.iter() {
        if !spans.is_empty() {
            spans.push(Span::raw("  ·  "));
        }
        spans.push(Span::styled(
            notice.message.clone(),
            Style::default().fg(theme::notice_color(notice.level)),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

fn key_hint<'a>(t: &Theme, key: &'a str, label: &'a str) -> [Span<'a>; 2] {
    [
        Span::styled(key, Style::default().fg(t.accent)),
        Span::styled(label, Style::default().fg(t.muted)),
    ]
}

fn render_help(frame: &mut Frame, area: Rect, app: &App) {
    use crate::app::TaskFocus;

    let t = theme::theme(app.dark_mode);
    let hints: Vec<(&str, &str)> = match app.screen() {
        Screen::Login => vec![
            ("Tab", ": Next field  "),
            ("Enter", ": Submit  "),
            ("Ctrl+N", ": Sign in/up  "),
            ("Esc", ": Quit"),
        ],
        Screen::Tasks => match app.tasks.focus {
            TaskFocus::List => vec![
                ("a", ": Add  "),
                ("Space", ": Done  "),
                ("e", ": Rename  "),
                ("Enter", ": Expand  "),
                ("i", ": Describe  "),
                ("p/c", ": Priority/Category  "),
                ("d", ": Delete  "),
                ("h/l", ": Day  "),
                ("/", ": Search  "),
                ("f", ": Filter  "),
                ("x", ": CSV  "),
                ("m", ": Menu  "),
                ("q", ": Quit"),
            ],
            TaskFocus::PendingDates => vec![
                ("j/k", ": Move  "),
                ("Enter", ": Go to date  "),
                ("Esc", ": Back"),
            ],
            TaskFocus::AddInput | TaskFocus::EditTitle | TaskFocus::EditDescription => vec![
                ("Enter", ": Save  "),
                ("Ctrl+X", ": Clear  "),
                ("Esc", ": Cancel"),
            ],
            TaskFocus::Search => vec![("Enter/Esc", ": Done  "), ("Ctrl+X", ": Clear")],
        },
    };

    let spans: Vec<Span> = hints
        .into_iter()
        .flat_map(|(key, label)| key_hint(&t, key, label))
        .collect();
    frame.render_widget(
        Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
        area,
    );
}

/// Render a text input with a block cursor when focused.
fn input_line<'a>(input: &'a TextInput, focused: bool, t: &Theme) -> Line<'a> {
    let text_style = Style::default().fg(t.text);
    if !focused {
        return Line::from(Span::styled(input.value.as_str(), text_style));
    }
    let (before, after) = input.split_at_cursor();
    Line::from(vec![
        Span::styled(before, text_style),
        Span::styled("█", Style::default().fg(t.accent)),
        Span::styled(after, text_style),
    ])
}
