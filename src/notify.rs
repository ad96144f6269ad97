use std::fmt;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "ℹ"),
            Severity::Success => write!(f, "✓"),
            Severity::Error => write!(f, "✗"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
}

impl Notification {
    /// One visual line per `\n`-separated part of the message.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Cloneable handle for posting notifications from anywhere in the session.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    pub fn show(&self, text: impl Into<String>, severity: Severity) {
        let notification = Notification {
            text: text.into(),
            severity,
        };
        if self.tx.send(notification).is_err() {
            tracing::debug!("notification dropped, center is gone");
        }
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(text, Severity::Info);
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(text, Severity::Success);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(text, Severity::Error);
    }
}

/// Receiving side: holds the single visible notification.
#[derive(Debug)]
pub struct NotificationCenter {
    rx: mpsc::UnboundedReceiver<Notification>,
    current: Option<(Notification, Instant)>,
    duration: Duration,
}

impl NotificationCenter {
    pub fn new(duration: Duration) -> (Self, Notifier) {
        let (tx, rx) = mpsc::unbounded_channel();
        let center = Self {
            rx,
            current: None,
            duration,
        };
        (center, Notifier { tx })
    }

    /// Drain posted notifications, keeping only the newest, then expire.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(notification) = self.rx.try_recv() {
            self.current = Some((notification, now));
        }
        if let Some((_, shown_at)) = &self.current {
            if now.duration_since(*shown_at) >= self.duration {
                self.current = None;
            }
        }
    }

    pub fn acknowledge(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(n, _)| n)
    }

    pub fn is_visible(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIX_SECONDS: Duration = Duration::from_secs(6);

    #[test]
    fn newest_message_replaces_current() {
        let (mut center, notifier) = NotificationCenter::new(SIX_SECONDS);
        let t0 = Instant::now();
        notifier.info("first");
        center.tick(t0);
        notifier.error("second");
        center.tick(t0 + Duration::from_secs(1));

        let current = center.current().unwrap();
        assert_eq!(current.text, "second");
        assert_eq!(current.severity, Severity::Error);
    }

    #[test]
    fn auto_dismisses_after_duration() {
        let (mut center, notifier) = NotificationCenter::new(SIX_SECONDS);
        let t0 = Instant::now();
        notifier.success("saved");
        center.tick(t0);
        center.tick(t0 + Duration::from_millis(5999));
        assert!(center.is_visible());
        center.tick(t0 + SIX_SECONDS);
        assert!(!center.is_visible());
    }

    #[test]
    fn replacement_restarts_the_clock() {
        let (mut center, notifier) = NotificationCenter::new(SIX_SECONDS);
        let t0 = Instant::now();
        notifier.info("a");
        center.tick(t0);
        notifier.info("b");
        center.tick(t0 + Duration::from_secs(5));
        center.tick(t0 + Duration::from_secs(8));
        assert_eq!(center.current().unwrap().text, "b");
    }

    #[test]
    fn acknowledge_hides_immediately() {
        let (mut center, notifier) = NotificationCenter::new(SIX_SECONDS);
        notifier.info("hello");
        center.tick(Instant::now());
        center.acknowledge();
        assert!(center.current().is_none());
    }

    #[test]
    fn multi_line_messages_split() {
        let n = Notification {
            text: "Nombre requerido\nCódigo requerido".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            n.lines().collect::<Vec<_>>(),
            vec!["Nombre requerido", "Código requerido"]
        );
    }
}
