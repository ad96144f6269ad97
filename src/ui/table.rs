use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row as TableRow, Table, TableState};
use ratatui::Frame;

use crate::grid::{self, GridContext, GridRow};
use crate::list_view::{ListControl, ListView};
use crate::types::Row;

/// Search box, the current page as a table, and the pagination footer.
pub fn render<R: Row + GridRow>(
    frame: &mut Frame,
    view: &ListView<R>,
    ctx: &GridContext,
    searching: bool,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_search(frame, view, searching, chunks[0]);
    render_grid(frame, view, ctx, chunks[1]);
    render_footer(frame, view, chunks[2]);
}

fn render_search<R: Row>(frame: &mut Frame, view: &ListView<R>, searching: bool, area: Rect) {
    let border = if searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let text = view.search_text();
    let line = if text.is_empty() && !searching {
        Line::from(Span::styled(
            "Press / to search",
            Style::default().fg(Color::DarkGray),
        ))
    } else if searching {
        Line::from(vec![Span::raw(text), Span::styled("█", border)])
    } else {
        Line::from(Span::raw(text))
    };
    let title = if view.search_pending() {
        " Search … "
    } else {
        " Search "
    };

    let search = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    );
    frame.render_widget(search, area);
}

fn render_grid<R: Row + GridRow>(
    frame: &mut Frame,
    view: &ListView<R>,
    ctx: &GridContext,
    area: Rect,
) {
    let state = view.state();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ({}) ", view.resource(), state.total_count));

    if state.items.is_empty() {
        let text = if state.loading {
            "Loading..."
        } else {
            "No records found"
        };
        let empty = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let columns = R::columns();
    let header = TableRow::new(columns.iter().map(|c| c.header)).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    let widths: Vec<Constraint> = columns
        .iter()
        .map(|c| Constraint::Percentage(c.width))
        .collect();
    let rows: Vec<TableRow> = grid::rows(&state.items, ctx)
        .into_iter()
        .map(TableRow::new)
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        );

    let mut table_state = TableState::default();
    table_state.select(Some(view.selected()));
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn render_footer<R: Row>(frame: &mut Frame, view: &ListView<R>, area: Rect) {
    let state = view.state();
    let sizes = view
        .page_sizes()
        .as_slice()
        .iter()
        .map(|s| {
            if *s == state.page_size {
                format!("[{}]", s)
            } else {
                s.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let arrow = |enabled: bool, s: &'static str| {
        let style = if enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(s, style)
    };

    let shown = if state.items.is_empty() {
        format!("0 of {}", state.total_count)
    } else {
        format!(
            "{}-{} of {}",
            state.offset() + 1,
            state.offset() + state.items.len() as u64,
            state.total_count
        )
    };

    let mut spans = vec![
        Span::styled(format!("{}   ", shown), Style::default().fg(Color::Gray)),
        arrow(state.has_prev(), "◀ "),
        Span::raw(format!("Page {}/{}", state.page, state.page_count().max(1))),
        arrow(state.has_next(), " ▶"),
        Span::styled(
            format!("   rows per page: {}", sizes),
            Style::default().fg(Color::Gray),
        ),
    ];
    if state.loading {
        spans.push(Span::styled(
            "   Loading...",
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
