use std::cmp::min;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::model::TaskStatus;

pub const BG_BASE: Color = Color::Rgb(14, 17, 23);
pub const BG_PANEL: Color = Color::Rgb(22, 26, 34);
pub const BG_ACCENT: Color = Color::Rgb(32, 37, 47);
pub const FG_ACCENT: Color = Color::Rgb(120, 161, 255);

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = min(width, area.width);
    let h = min(height, area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}

pub fn inset_rect(area: Rect, padding: u16) -> Rect {
    if area.width == 0 || area.height == 0 {
        return area;
    }
    let px = padding.min(area.width / 2);
    let py = padding.min(area.height / 2);
    Rect {
        x: area.x + px,
        y: area.y + py,
        width: area.width.saturating_sub(px * 2),
        height: area.height.saturating_sub(py * 2),
    }
}

/// Cuts `text` to `max` characters, ending with an ellipsis when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(max - 1).collect();
    out.push('…');
    out
}

pub fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Backlog => Color::Gray,
        TaskStatus::ToDo => Color::Cyan,
        TaskStatus::InProgress => Color::Yellow,
        TaskStatus::Done => Color::Green,
    }
}

pub fn checkbox(checked: bool) -> char {
    if checked {
        '✓'
    } else {
        ' '
    }
}

pub fn build_help_lines() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Tab", "Switch between board and list"),
        ("h / l or ← / →", "Move between columns"),
        ("j / k or ↓ / ↑", "Move between cards or rows"),
        ("H / L", "Drag the selected card one column left or right"),
        ("f", "Open filter picker (status, priority, POS)"),
        ("/", "Search as you type"),
        ("t", "Show tasks due today"),
        ("c", "Clear all filters"),
        ("[ / ]", "Previous or next page"),
        ("o", "Open the task form (s saves, n creates a new task)"),
        ("r", "Refresh the current page"),
        ("?", "Toggle this help overlay"),
        ("q", "Quit"),
        ("Esc", "Cancel or close overlays"),
    ]
}

pub fn accent_title(text: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text.to_owned(),
        Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
    )])
}
