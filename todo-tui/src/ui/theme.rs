use crate::app::NoticeLevel;
use crate::types::Priority;
use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub border: Color,
    pub highlight_bg: Color,
    pub done: Color,
}

pub const DARK: Theme = Theme {
    text: Color::White,
    muted: Color::DarkGray,
    accent: Color::Yellow,
    border: Color::Gray,
    highlight_bg: Color::Rgb(40, 40, 60),
    done: Color::Green,
};

pub const LIGHT: Theme = Theme {
    text: Color::Black,
    muted: Color::Gray,
    accent: Color::Blue,
    border: Color::DarkGray,
    highlight_bg: Color::Rgb(220, 225, 240),
    done: Color::Rgb(0, 120, 0),
};

pub fn theme(dark_mode: bool) -> Theme {
    if dark_mode {
        DARK
    } else {
        LIGHT
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

pub fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}
