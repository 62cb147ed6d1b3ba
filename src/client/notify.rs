use std::cell::Cell;

use serde::Serialize;

use super::store::Atom;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient message shown to the user until dismissed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

/// Queue of toasts. The UI layer subscribes to `toasts()` and dismisses
/// each one after its display timeout.
pub struct Notifications {
    toasts: Atom<Vec<Toast>>,
    next_id: Cell<u64>,
}

impl Notifications {
    pub fn new() -> Self {
        Self {
            toasts: Atom::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    pub fn toasts(&self) -> &Atom<Vec<Toast>> {
        &self.toasts
    }

    pub fn push(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let toast = Toast {
            id,
            message: message.into(),
            kind,
        };
        self.toasts.update(|toasts| toasts.push(toast));
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(message, ToastKind::Error)
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let present = self.toasts.with(|toasts| toasts.iter().any(|t| t.id == id));
        if present {
            self.toasts.update(|toasts| toasts.retain(|t| t.id != id));
        }
        present
    }

    /// The most recent toast, if any.
    pub fn latest(&self) -> Option<Toast> {
        self.toasts.with(|toasts| toasts.last().cloned())
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}
