use super::utils::centered_rect;
use super::*;
use crate::app::{LoginField, LoginMode};

fn field_label(field: LoginField) -> &'static str {
    match field {
        LoginField::Name => "Name:     ",
        LoginField::Email => "Email:    ",
        LoginField::Username => "Username: ",
        LoginField::Password => "Password: ",
    }
}

pub fn render_login_view(frame: &mut Frame, app: &App, body: Rect) {
    let t = theme::theme(app.dark_mode);
    let form = &app.login;
    let fields = form.fields();

    let height = fields.len() as u16 + 9;
    let area = centered_rect(56, height, body);
    frame.render_widget(Clear, area);

    let (title, subtitle) = match form.mode {
        LoginMode::SignIn => (" Sign in ", "Welcome back. Sign in to see today's tasks."),
        LoginMode::SignUp => (" Create account ", "All fields are required."),
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(subtitle, Style::default().fg(t.muted))),
        Line::from(""),
    ];

    for &field in fields {
        let focused = form.focused_field() == field && !form.submitting;
        let label_style = if focused {
            Style::default().fg(t.accent)
        } else {
            Style::default().fg(t.muted)
        };
        let input = match field {
            LoginField::Name => &form.name,
            LoginField::Email => &form.email,
            LoginField::Username => &form.username,
            LoginField::Password => &form.password,
        };

        let mut spans = vec![Span::styled(field_label(field), label_style)];
        if field == LoginField::Password {
            // Password is masked
            let masked = "•".repeat(input.value.chars().count());
            spans.push(Span::styled(masked, Style::default().fg(t.text)));
            if focused {
                spans.push(Span::styled("█", Style::default().fg(t.accent)));
            }
        } else {
            spans.extend(input_line(input, focused, &t).spans);
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    if form.submitting {
        let label = match form.mode {
            LoginMode::SignIn => "Signing in…",
            LoginMode::SignUp => "Creating account…",
        };
        lines.push(Line::from(Span::styled(label, Style::default().fg(t.accent))));
    } else if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(ratatui::style::Color::Red),
        )));
    } else {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(""));

    let switch_hint = match form.mode {
        LoginMode::SignIn => ": No account? Sign up",
        LoginMode::SignUp => ": Have an account? Sign in",
    };
    lines.push(Line::from(vec![
        Span::styled("Ctrl+N", Style::default().fg(t.accent)),
        Span::styled(switch_hint, Style::default().fg(t.muted)),
    ]));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(t.accent))
            .title(Span::styled(title, Style::default().fg(t.accent)))
            .padding(Padding::horizontal(2)),
    );

    frame.render_widget(paragraph, area);
}
