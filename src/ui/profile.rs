use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Profile ");

    let Some(user) = &app.session else {
        let loading = Paragraph::new("Loading...")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(loading, area);
        return;
    };

    let label =
        |s: &'static str| Span::styled(format!("{:<10}", s), Style::default().fg(Color::Gray));
    let value = |s: Option<&str>| {
        Span::raw(s.filter(|v| !v.is_empty()).unwrap_or("-").to_string())
    };

    let lines = vec![
        Line::from(Span::styled(
            user.full_name(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![label("Username"), value(Some(user.username.as_str()))]),
        Line::from(vec![
            label("Role"),
            Span::raw(user.role.map(|r| r.to_string()).unwrap_or_else(|| "-".into())),
        ]),
        Line::from(vec![label("Email"), value(user.email.as_deref())]),
        Line::from(vec![label("Phone"), value(user.phone.as_deref())]),
        Line::from(vec![label("Address"), value(user.address.as_deref())]),
        Line::from(""),
        Line::from(Span::styled(
            "Press p to change your password. You will be signed out afterwards.",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
