use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;

use crate::platform::NoticeDuration;
use crate::viewmodel::CameraState;

/// Create a progress bar string with filled and empty blocks
pub fn bar(percent: f64, width: usize) -> String {
    let p = percent.clamp(0.0, 100.0);
    let filled = ((p / 100.0) * width as f64).round() as usize;
    "█".repeat(filled) + &"░".repeat(width.saturating_sub(filled))
}

/// Calculate percentage of a value relative to a total
pub fn percent(value: u64, total: u64) -> f64 {
    if total > 0 {
        value as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

pub fn camera_label(state: CameraState) -> &'static str {
    match state {
        CameraState::Off => "OFF",
        CameraState::Running => "LIVE",
        CameraState::PermissionNeeded => "NO PERMISSION",
        CameraState::Failed => "FAILED",
        CameraState::Ended => "ENDED",
    }
}

pub fn camera_color(state: CameraState) -> Color {
    match state {
        CameraState::Running => Color::Green,
        CameraState::Off | CameraState::Ended => Color::DarkGray,
        CameraState::PermissionNeeded => Color::Yellow,
        CameraState::Failed => Color::Red,
    }
}

pub fn notice_color(duration: NoticeDuration) -> Color {
    match duration {
        NoticeDuration::Short => Color::Cyan,
        NoticeDuration::Long => Color::Yellow,
        NoticeDuration::Persistent => Color::Red,
    }
}

/// Rectangle of `percent_x` by `height` rows centered in `area`
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height.min(area.height)),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x.min(100)) / 2),
            Constraint::Percentage(percent_x.min(100)),
            Constraint::Percentage((100 - percent_x.min(100)) / 2),
        ])
        .split(vertical[1])[1]
}
