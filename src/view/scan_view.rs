use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::util::format_timestamp;
use crate::viewmodel::{CameraState, ScanSnapshot};

use super::ui_fmt::{bar, camera_color, camera_label, centered_rect, notice_color, percent};

pub fn render(frame: &mut Frame, snapshot: &ScanSnapshot, area: Rect) {
    let notice_rows = snapshot.notices.len() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                // Header
            Constraint::Min(0),                   // Status
            Constraint::Length(notice_rows + 2),  // Notices
            Constraint::Length(3),                // Footer
        ])
        .split(area);

    render_header(frame, snapshot, chunks[0]);
    render_status(frame, snapshot, chunks[1]);
    render_notices(frame, snapshot, chunks[2]);
    render_footer(frame, snapshot, chunks[3]);

    if snapshot.result.is_some() {
        render_result(frame, snapshot, area);
    }
}

fn render_header(frame: &mut Frame, snapshot: &ScanSnapshot, area: Rect) {
    let camera = snapshot.camera;
    let activity = if snapshot.decoding { "decoding" } else { "waiting for frame" };

    let header = Paragraph::new(Line::from(vec![
        Span::styled("QR SCANNER", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(" | camera "),
        Span::styled(camera_label(camera), Style::default().fg(camera_color(camera)).add_modifier(Modifier::BOLD)),
        Span::raw(" | "),
        Span::raw(activity),
    ]))
    .block(Block::default().borders(Borders::ALL).title("qrpocket"));
    frame.render_widget(header, area);
}

fn render_status(frame: &mut Frame, snapshot: &ScanSnapshot, area: Rect) {
    let stats = &snapshot.stats;
    let captured = stats.frames_offered + snapshot.superseded;
    let decoded_share = percent(stats.frames_admitted, captured);

    let hint = match snapshot.camera {
        CameraState::Running => "Hold a QR code in front of the camera.",
        CameraState::PermissionNeeded => "Camera access is needed before scanning can start.",
        CameraState::Failed => "The camera could not be started.",
        CameraState::Ended => "The camera stopped delivering frames.",
        CameraState::Off => "Camera is off.",
    };

    let label = Style::default().fg(Color::DarkGray);
    let lines = vec![
        Line::from(hint),
        Line::from(""),
        Line::from(vec![
            Span::styled("frames captured  ", label),
            Span::raw(format!("{:>8}", captured)),
        ]),
        Line::from(vec![
            Span::styled("frames decoded   ", label),
            Span::raw(format!("{:>8} ", stats.frames_admitted)),
            Span::styled(format!("[{}]", bar(decoded_share, 20)), Style::default().fg(Color::Blue)),
            Span::raw(format!(" {:.0}%", decoded_share)),
        ]),
        Line::from(vec![
            Span::styled("frames skipped   ", label),
            Span::raw(format!("{:>8}", snapshot.superseded + stats.frames_dropped)),
        ]),
        Line::from(vec![
            Span::styled("results          ", label),
            Span::styled(format!("{:>8}", stats.new_results), Style::default().fg(Color::Green)),
            Span::raw(format!("  ({} repeats)", stats.duplicates)),
        ]),
        Line::from(vec![
            Span::styled("no symbol        ", label),
            Span::raw(format!("{:>8}", stats.no_symbol + stats.decode_errors)),
        ]),
    ];

    let status = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Scan"));
    frame.render_widget(status, area);
}

fn render_notices(frame: &mut Frame, snapshot: &ScanSnapshot, area: Rect) {
    let lines: Vec<Line> = snapshot
        .notices
        .iter()
        .map(|notice| Line::styled(notice.message.clone(), Style::default().fg(notice_color(notice.duration))))
        .collect();

    let notices = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Notices"));
    frame.render_widget(notices, area);
}

fn render_footer(frame: &mut Frame, snapshot: &ScanSnapshot, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let mut spans = Vec::new();

    if snapshot.result.is_some() {
        spans.extend([Span::styled("c/Enter", key), Span::raw(" copy  ")]);
        if snapshot.can_open_link {
            spans.extend([Span::styled("o", key), Span::raw(" open link  ")]);
        }
        spans.extend([Span::styled("x/Esc", key), Span::raw(" dismiss  ")]);
    } else {
        match snapshot.camera {
            CameraState::PermissionNeeded => spans.extend([Span::styled("g", key), Span::raw(" grant camera access  ")]),
            CameraState::Failed | CameraState::Ended => spans.extend([Span::styled("r", key), Span::raw(" restart camera  ")]),
            CameraState::Running | CameraState::Off => {}
        }
    }
    spans.extend([Span::styled("q", key), Span::raw(" quit")]);

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn render_result(frame: &mut Frame, snapshot: &ScanSnapshot, area: Rect) {
    let Some(result) = &snapshot.result else {
        return;
    };

    let popup = centered_rect(70, 12, area);
    let kind = if snapshot.can_open_link { "Link" } else { "Text" };
    let detected = format_timestamp(result.detected_at.unix_timestamp());

    let mut lines = vec![
        Line::from(vec![
            Span::styled(kind, Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  detected {}", detected), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
    ];
    lines.extend(result.payload.lines().map(|line| Line::from(line.to_string())));

    let sheet = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Scanned QR code"));

    frame.render_widget(Clear, popup);
    frame.render_widget(sheet, popup);
}
