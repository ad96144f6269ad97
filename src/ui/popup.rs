use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::notify::{Notification, Severity};

/// Render a centered confirmation popup: [y]es / [n]o
pub fn render_confirm(frame: &mut Frame, title: &str, message: &str, busy: bool) {
    let area = centered_rect(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let answer = if busy {
        Line::from(Span::styled("Deleting...", Style::default().fg(Color::Yellow)))
    } else {
        Line::from(vec![
            Span::styled("[y]", Style::default().fg(Color::Green)),
            Span::raw("es  "),
            Span::styled("[n]", Style::default().fg(Color::Red)),
            Span::raw("o"),
        ])
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::raw(message)),
        Line::from(""),
        answer,
    ];

    let popup = Paragraph::new(lines)
        .block(
            Block::default().borders(Borders::ALL).title(Span::styled(
                format!(" {} ", title),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        )
        .alignment(ratatui::layout::Alignment::Center);

    frame.render_widget(popup, area);
}

/// Render the visible notification in the top-right corner
pub fn render_notification(frame: &mut Frame, notification: &Notification) {
    let color = match notification.severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Error => Color::Red,
    };
    let lines: Vec<Line> = notification
        .lines()
        .map(|l| Line::from(Span::raw(l.to_string())))
        .collect();

    let outer = frame.area();
    let width = 50.min(outer.width);
    let height = (lines.len() as u16 + 2).min(outer.height.saturating_sub(2));
    let area = Rect {
        x: outer.width.saturating_sub(width + 1),
        y: 1.min(outer.height),
        width,
        height,
    };
    frame.render_widget(Clear, area);

    let popup = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(Span::styled(
                format!(" {} ", notification.severity),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::from(" Esc ").right_aligned()),
    );
    frame.render_widget(popup, area);
}

/// Create a centered rect using percentage of the outer rect
fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let r = centered_rect(50, 7, outer);
        assert_eq!((r.x, r.y, r.width, r.height), (25, 16, 50, 7));

        let small = Rect::new(0, 0, 30, 5);
        let r = centered_rect(50, 7, small);
        assert_eq!((r.width, r.height), (30, 5));
    }
}
