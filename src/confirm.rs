/// Modal gate in front of a delete request.
///
/// `Idle -> ConfirmPending -> {Idle, Deleting} -> Idle`. Only one target is
/// tracked; a new intent while pending replaces it, and intents are refused
/// while a delete is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteGate {
    #[default]
    Idle,
    ConfirmPending {
        id: String,
        label: String,
    },
    Deleting {
        id: String,
        label: String,
    },
}

impl DeleteGate {
    /// Ask for confirmation to delete `id`. Returns false while a delete is in flight.
    pub fn open(&mut self, id: impl Into<String>, label: impl Into<String>) -> bool {
        if matches!(self, DeleteGate::Deleting { .. }) {
            return false;
        }
        *self = DeleteGate::ConfirmPending {
            id: id.into(),
            label: label.into(),
        };
        true
    }

    pub fn cancel(&mut self) {
        if matches!(self, DeleteGate::ConfirmPending { .. }) {
            *self = DeleteGate::Idle;
        }
    }

    /// Move to `Deleting` and hand back the id the request must target.
    pub fn confirm(&mut self) -> Option<String> {
        match std::mem::take(self) {
            DeleteGate::ConfirmPending { id, label } => {
                *self = DeleteGate::Deleting {
                    id: id.clone(),
                    label,
                };
                Some(id)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// The delete request finished, whatever its outcome.
    pub fn finish(&mut self) {
        *self = DeleteGate::Idle;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, DeleteGate::Idle)
    }

    pub fn is_deleting(&self) -> bool {
        matches!(self, DeleteGate::Deleting { .. })
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            DeleteGate::Idle => None,
            DeleteGate::ConfirmPending { label, .. } | DeleteGate::Deleting { label, .. } => {
                Some(label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_yields_target_and_enters_deleting() {
        let mut gate = DeleteGate::default();
        assert!(gate.open("a", "Foo"));
        assert_eq!(gate.confirm(), Some("a".to_string()));
        assert!(gate.is_deleting());
        gate.finish();
        assert_eq!(gate, DeleteGate::Idle);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let mut gate = DeleteGate::default();
        gate.open("a", "Foo");
        gate.cancel();
        assert_eq!(gate, DeleteGate::Idle);
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn new_intent_replaces_pending_target() {
        let mut gate = DeleteGate::default();
        gate.open("a", "Foo");
        gate.open("b", "Bar");
        assert_eq!(gate.label(), Some("Bar"));
        assert_eq!(gate.confirm(), Some("b".to_string()));
    }

    #[test]
    fn intents_refused_while_deleting() {
        let mut gate = DeleteGate::default();
        gate.open("a", "Foo");
        gate.confirm();
        assert!(!gate.open("b", "Bar"));
        gate.cancel();
        assert!(gate.is_deleting());
        assert_eq!(gate.confirm(), None);
    }

    #[test]
    fn confirm_without_intent_is_noop() {
        let mut gate = DeleteGate::default();
        assert_eq!(gate.confirm(), None);
        assert!(!gate.is_open());
    }
}
