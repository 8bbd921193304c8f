use ratatui::layout::{Constraint, Direction, Layout, Rect};
use time::Date;

/// Helper function to create a centered rectangle
pub fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((r.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((r.height.saturating_sub(height)) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((r.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((r.width.saturating_sub(width)) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// "Monday, Oct 27 2025"
pub fn long_date(date: Date) -> String {
    let format = time::macros::format_description!(
        "[weekday], [month repr:short] [day padding:none] [year]"
    );
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

/// "Oct 27"
pub fn short_date(date: Date) -> String {
    let format = time::macros::format_description!("[month repr:short] [day padding:none]");
    date.format(&format).unwrap_or_else(|_| date.to_string())
}

/// Cut `s` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn dates_render_in_short_and_long_form() {
        assert_eq!(short_date(date!(2025 - 10 - 07)), "Oct 7");
        assert_eq!(long_date(date!(2025 - 10 - 27)), "Monday, Oct 27 2025");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("añbc", 3), "añ…");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn centered_rect_fits_inside() {
        let r = centered_rect(20, 10, Rect::new(0, 0, 100, 50));
        assert_eq!(r, Rect::new(40, 20, 20, 10));
    }
}
