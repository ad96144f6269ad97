use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::form::{FieldKind, Form};

pub fn render(frame: &mut Frame, form: &Form, area: Rect) {
    let title = if form.submitting {
        format!(" {} (saving...) ", form.title())
    } else {
        format!(" {} ", form.title())
    };
    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    if !form.errors.message.is_empty() {
        let message = Paragraph::new(Span::styled(
            form.errors.message.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(message, chunks[0]);
    }

    let label_width = form
        .fields
        .iter()
        .map(|f| f.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let mut spans = vec![
            Span::styled(if focused { "> " } else { "  " }, label_style),
            Span::styled(format!("{:<label_width$}  ", field.label), label_style),
        ];
        match &field.kind {
            FieldKind::Choice(_) => {
                spans.push(Span::raw(format!("◀ {} ▶", field.display_value())));
            }
            _ => {
                spans.push(Span::raw(field.display_value()));
                if focused && !form.submitting {
                    spans.push(Span::styled("█", Style::default().fg(Color::Yellow)));
                }
            }
        }
        lines.push(Line::from(spans));

        if let Some(msg) = form.error_for(field.key) {
            lines.push(Line::from(Span::styled(
                format!("    {:<label_width$}{}", "", msg),
                Style::default().fg(Color::Red),
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), chunks[1]);
}
