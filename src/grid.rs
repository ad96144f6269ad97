use chrono::Local;

use crate::format;
use crate::types::{Invoice, Movie, ReportLine, Room, Showtime, User};

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub header: &'static str,
    /// Share of the table width, in percent.
    pub width: u16,
}

const fn col(header: &'static str, width: u16) -> Column {
    Column { header, width }
}

/// Values the cell formatters need besides the row itself.
#[derive(Debug, Clone)]
pub struct GridContext {
    pub base_url: String,
}

/// Maps a row to display cells, one per column.
pub trait GridRow {
    fn columns() -> &'static [Column];
    fn cells(&self, ctx: &GridContext) -> Vec<String>;
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

impl GridRow for Movie {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            col("Name", 20),
            col("Synopsis", 30),
            col("Code", 8),
            col("Duration", 8),
            col("Trailer", 17),
            col("Image", 17),
        ];
        COLUMNS
    }

    fn cells(&self, ctx: &GridContext) -> Vec<String> {
        vec![
            self.name.clone(),
            or_dash(self.synopsis.as_deref()),
            or_dash(self.code.as_deref()),
            format::duration(self.hours, self.minutes),
            self.trailer
                .as_deref()
                .filter(|t| !t.is_empty())
                .map(format::trailer_url)
                .unwrap_or_else(|| "-".to_string()),
            format::image_url(&ctx.base_url, &self.id),
        ]
    }
}

impl GridRow for Room {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[col("Name", 70), col("Rows", 15), col("Columns", 15)];
        COLUMNS
    }

    fn cells(&self, _ctx: &GridContext) -> Vec<String> {
        vec![
            self.name.clone(),
            self.rows.to_string(),
            self.columns.to_string(),
        ]
    }
}

impl GridRow for Showtime {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            col("Date", 20),
            col("Start", 15),
            col("End", 15),
            col("Room", 35),
            col("Price [Bs.]", 15),
        ];
        COLUMNS
    }

    fn cells(&self, _ctx: &GridContext) -> Vec<String> {
        let local = |dt: &chrono::DateTime<chrono::Utc>| dt.with_timezone(&Local);
        vec![
            self.starts_at
                .map(|dt| format::date(&local(&dt)))
                .unwrap_or_else(|| "-".to_string()),
            self.starts_at
                .map(|dt| format::time(&local(&dt)))
                .unwrap_or_else(|| "-".to_string()),
            self.ends_at
                .map(|dt| format::time(&local(&dt)))
                .unwrap_or_else(|| "-".to_string()),
            or_dash(self.room.name.as_deref()),
            format::currency(self.price),
        ]
    }
}

impl GridRow for Invoice {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            col("Date", 15),
            col("Name", 27),
            col("NIT/CI", 15),
            col("Email", 20),
            col("Total [Bs.]", 12),
            col("Seats", 11),
        ];
        COLUMNS
    }

    fn cells(&self, _ctx: &GridContext) -> Vec<String> {
        vec![
            self.created_at
                .map(|dt| format::date_time(&dt.with_timezone(&Local)))
                .unwrap_or_else(|| "-".to_string()),
            self.name.clone(),
            or_dash(self.nit.as_deref()),
            or_dash(self.email.as_deref()),
            format::currency(self.total),
            self.seats.len().to_string(),
        ]
    }
}

impl GridRow for ReportLine {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            col("Movie", 30),
            col("Upcoming", 12),
            col("Past", 12),
            col("Seats sold", 16),
            col("Expected [Bs.]", 15),
            col("Collected", 15),
        ];
        COLUMNS
    }

    fn cells(&self, _ctx: &GridContext) -> Vec<String> {
        vec![
            self.name.clone(),
            self.upcoming_showtimes.to_string(),
            self.past_showtimes.to_string(),
            format::ratio(self.seats_sold, self.total_seats),
            format::currency(self.expected_total),
            format::collected_percentage(self.collected_total, self.expected_total),
        ]
    }
}

impl GridRow for User {
    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            col("Username", 18),
            col("Name", 27),
            col("Email", 25),
            col("Phone", 15),
            col("Role", 15),
        ];
        COLUMNS
    }

    fn cells(&self, _ctx: &GridContext) -> Vec<String> {
        vec![
            self.username.clone(),
            self.full_name(),
            or_dash(self.email.as_deref()),
            or_dash(self.phone.as_deref()),
            self.role
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

/// Cells of every row on the current page.
pub fn rows<R: GridRow>(items: &[R], ctx: &GridContext) -> Vec<Vec<String>> {
    items.iter().map(|item| item.cells(ctx)).collect()
}
