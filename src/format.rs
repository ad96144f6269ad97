use chrono::{DateTime, TimeZone};
use std::fmt::Display;

const TRAILER_BASE: &str = "https://www.youtube.com/embed/";

/// Two-decimal amount, rounded half away from zero at the cent.
pub fn currency(amount: f64) -> String {
    format!("{:.2}", (amount * 100.0).round() / 100.0)
}

/// Share of `expected` already collected, as a percentage with two decimals.
pub fn collected_percentage(collected: f64, expected: f64) -> String {
    let pct = if expected > 0.0 {
        (collected * 10000.0 / expected).round() / 100.0
    } else {
        0.0
    };
    format!("{:.2}%", pct)
}

pub fn duration(hours: u32, minutes: u32) -> String {
    format!("{}:{:02}", hours, minutes)
}

pub fn ratio(part: u64, whole: u64) -> String {
    format!("{}/{}", part, whole)
}

pub fn date_time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%d/%m/%y %H:%M").to_string()
}

pub fn date<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%d/%m/%y").to_string()
}

pub fn time<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    dt.format("%H:%M").to_string()
}

pub fn trailer_url(video_id: &str) -> String {
    format!("{}{}", TRAILER_BASE, video_id)
}

/// Poster endpoint of a movie, relative to the API base URL.
pub fn image_url(base_url: &str, movie_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    format!(
        "{}/peliculas/{}/imagen",
        base,
        urlencoding::encode(movie_id)
    )
}

/// Shorten to at most `max` characters, ending in "..." when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    if max <= 3 {
        return s.chars().take(max).collect();
    }
    let head: String = s.chars().take(max - 3).collect();
    format!("{}...", head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn currency_rounds_to_cents() {
        assert_eq!(currency(12.5), "12.50");
        assert_eq!(currency(10.0 / 3.0), "3.33");
        assert_eq!(currency(2.499), "2.50");
        assert_eq!(currency(0.0), "0.00");
    }

    #[test]
    fn percentage_handles_zero_expected() {
        assert_eq!(collected_percentage(50.0, 200.0), "25.00%");
        assert_eq!(collected_percentage(1.0, 3.0), "33.33%");
        assert_eq!(collected_percentage(10.0, 0.0), "0.00%");
    }

    #[test]
    fn duration_pads_minutes() {
        assert_eq!(duration(2, 5), "2:05");
        assert_eq!(duration(1, 45), "1:45");
        assert_eq!(duration(0, 0), "0:00");
    }

    #[test]
    fn dates_use_day_month_year() {
        let dt = Utc.with_ymd_and_hms(2022, 11, 5, 19, 30, 0).unwrap();
        assert_eq!(date_time(&dt), "05/11/22 19:30");
        assert_eq!(date(&dt), "05/11/22");
        assert_eq!(time(&dt), "19:30");
    }

    #[test]
    fn media_urls() {
        assert_eq!(
            trailer_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        assert_eq!(
            image_url("http://localhost:4000/api/", "abc"),
            "http://localhost:4000/api/peliculas/abc/imagen"
        );
        assert_eq!(
            image_url("http://localhost:4000/api", "abc"),
            "http://localhost:4000/api/peliculas/abc/imagen"
        );
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Películas", 20), "Películas");
        assert_eq!(truncate("Películas de acción", 10), "Películ...");
        assert_eq!(truncate("abcdef", 3), "abc");
    }
}
