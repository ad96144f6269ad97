use std::time::{Duration, Instant};

use crate::debounce::Debouncer;

/// Free-text filter of a list view.
///
/// Edits update the visible text immediately and (re)arm the debouncer with
/// the new text; only the value present when the debouncer fires is released.
#[derive(Debug, Clone)]
pub struct SearchInput {
    text: String,
    debouncer: Debouncer<String>,
}

impl SearchInput {
    pub fn new(window: Duration) -> Self {
        Self {
            text: String::new(),
            debouncer: Debouncer::new(window),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn insert(&mut self, c: char, now: Instant) {
        self.text.push(c);
        self.debouncer.schedule(self.text.clone(), now);
    }

    pub fn backspace(&mut self, now: Instant) {
        if self.text.pop().is_some() {
            self.debouncer.schedule(self.text.clone(), now);
        }
    }

    /// Empty the field and drop any scheduled search.
    pub fn clear(&mut self) {
        self.text.clear();
        self.debouncer.cancel();
    }

    /// Forget a scheduled search without touching the text.
    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }

    /// Release the settled search text, if its quiet window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        self.debouncer.fire(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(600);

    fn type_str(input: &mut SearchInput, s: &str, start: Instant, gap: Duration) -> Instant {
        let mut now = start;
        for c in s.chars() {
            input.insert(c, now);
            now += gap;
        }
        now - gap
    }

    #[test]
    fn text_updates_immediately() {
        let mut input = SearchInput::new(WINDOW);
        let t0 = Instant::now();
        input.insert('a', t0);
        assert_eq!(input.text(), "a");
        assert_eq!(input.poll(t0), None);
    }

    #[test]
    fn burst_releases_final_value_once() {
        let mut input = SearchInput::new(WINDOW);
        let t0 = Instant::now();
        let last = type_str(&mut input, "matrix", t0, Duration::from_millis(120));

        let mut released = Vec::new();
        let mut now = t0;
        while now <= last + Duration::from_secs(2) {
            if let Some(v) = input.poll(now) {
                released.push(v);
            }
            now += Duration::from_millis(50);
        }
        assert_eq!(released, vec!["matrix".to_string()]);
    }

    #[test]
    fn backspace_reschedules() {
        let mut input = SearchInput::new(WINDOW);
        let t0 = Instant::now();
        input.insert('a', t0);
        input.insert('b', t0);
        input.backspace(t0 + Duration::from_millis(500));
        assert_eq!(input.poll(t0 + Duration::from_millis(700)), None);
        assert_eq!(
            input.poll(t0 + Duration::from_millis(1100)),
            Some("a".to_string())
        );
    }

    #[test]
    fn backspace_on_empty_schedules_nothing() {
        let mut input = SearchInput::new(WINDOW);
        input.backspace(Instant::now());
        assert!(!input.is_pending());
    }

    #[test]
    fn clear_cancels_pending() {
        let mut input = SearchInput::new(WINDOW);
        let t0 = Instant::now();
        input.insert('x', t0);
        input.clear();
        assert!(input.text().is_empty());
        assert_eq!(input.poll(t0 + Duration::from_secs(1)), None);
    }
}
