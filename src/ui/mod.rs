mod form;
mod popup;
mod profile;
mod table;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::{App, InputMode, Screen};
use crate::format;
use crate::types::Resource;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::List(resource) => render_list(frame, app, resource, chunks[1]),
        Screen::Form => {
            if let Some(f) = &app.form {
                form::render(frame, f, chunks[1]);
            }
        }
        Screen::Profile => profile::render(frame, app, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);

    if let Some(list) = app.active_list() {
        let gate = list.delete_gate();
        if let Some(label) = gate.label() {
            popup::render_confirm(
                frame,
                "Delete",
                &format!("Delete \"{}\"?", format::truncate(label, 36)),
                gate.is_deleting(),
            );
        }
    }

    if let Some(notification) = app.notifications.current() {
        popup::render_notification(frame, notification);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        format!("cine-admin - {}", app.breadcrumb()),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if let Some(user) = &app.session {
        let role = user.role.map(|r| r.to_string()).unwrap_or_default();
        spans.push(Span::styled(
            format!("   {} ({})", user.username, role),
            Style::default().fg(Color::Gray),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_list(frame: &mut Frame, app: &App, resource: Resource, area: Rect) {
    let ctx = app.grid_context();
    let searching = app.mode == InputMode::Search;
    match resource {
        Resource::Movies => table::render(frame, &app.movies, &ctx, searching, area),
        Resource::Rooms => table::render(frame, &app.rooms, &ctx, searching, area),
        Resource::Showtimes => table::render(frame, &app.showtimes, &ctx, searching, area),
        Resource::Invoices => {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(4), Constraint::Min(0)])
                .split(area);
            render_showtime_header(frame, app, chunks[0]);
            table::render(frame, &app.invoices, &ctx, searching, chunks[1]);
        }
        Resource::Reports => table::render(frame, &app.reports, &ctx, searching, area),
        Resource::Users => table::render(frame, &app.users, &ctx, searching, area),
    }
}

fn render_showtime_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Showtime ");
    let Some(showtime) = &app.showtime_header else {
        let empty = Paragraph::new("-")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let local = |dt: &chrono::DateTime<chrono::Utc>| dt.with_timezone(&chrono::Local);
    let or_dash = |s: Option<&str>| s.unwrap_or("-").to_string();
    let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::Gray));

    let lines = vec![
        Line::from(vec![
            label("Movie: "),
            Span::styled(
                or_dash(showtime.movie.name.as_deref()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            label("  Code: "),
            Span::raw(or_dash(showtime.movie.code.as_deref())),
            label("  Room: "),
            Span::raw(or_dash(showtime.room.name.as_deref())),
        ]),
        Line::from(vec![
            label("Date: "),
            Span::raw(
                showtime
                    .starts_at
                    .map(|dt| format::date(&local(&dt)))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            label("  Time: "),
            Span::raw(
                showtime
                    .starts_at
                    .map(|dt| format::time(&local(&dt)))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            label("  Price per seat [Bs.]: "),
            Span::raw(format::currency(showtime.price)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn help_text(app: &App) -> &'static str {
    if app.mode == InputMode::Search {
        return "type to search | Backspace: delete | Ctrl+u: clear | Enter/Esc: done";
    }
    match app.screen {
        Screen::List(Resource::Movies) => {
            "j/k: nav | h/l: page | s: size | /: search | Enter: showtimes | n/e/d: new/edit/delete | o/y: trailer | 1-4/P: screens | q: quit"
        }
        Screen::List(Resource::Rooms) | Screen::List(Resource::Users) => {
            "j/k: nav | h/l: page | s: size | /: search | c: clear | n/e/d: new/edit/delete | r: refresh | 1-4/P: screens | q: quit"
        }
        Screen::List(Resource::Showtimes) => {
            "j/k: nav | h/l: page | s: size | /: search | Enter: invoices | r: refresh | q: back"
        }
        Screen::List(Resource::Invoices) => {
            "j/k: nav | h/l: page | s: size | /: search | r: refresh | q: back"
        }
        Screen::List(Resource::Reports) => {
            "j/k: nav | h/l: page | s: size | /: search | r: refresh | 1-4/P: screens | q: quit"
        }
        Screen::Form => {
            "Tab/Shift+Tab: field | Left/Right: choose | Ctrl+s: save | Esc: cancel"
        }
        Screen::Profile => "p: change password | 1-4: screens | q: back",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let loading = app.active_list().is_some_and(|l| l.is_loading());
    let status = if loading {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        Line::from(vec![Span::styled(
            help_text(app),
            Style::default().fg(Color::Gray),
        )])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
