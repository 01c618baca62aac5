use std::sync::Mutex;

/// Two-step guard for destructive actions.
///
/// `arm` records what the operator asked for, `confirm` hands it back exactly
/// once, `cancel` drops it. Nothing reaches the backend until `confirm`.
#[derive(Debug)]
pub struct ConfirmGate<T> {
    pending: Mutex<Option<PendingAction<T>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingAction<T> {
    pub target: T,
    pub prompt: String,
}

impl<T> Default for ConfirmGate<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(None),
        }
    }
}

impl<T: Clone> ConfirmGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the gate, replacing any earlier pending action.
    pub fn arm(&self, target: T, prompt: impl Into<String>) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *pending = Some(PendingAction {
            target,
            prompt: prompt.into(),
        });
    }

    pub fn confirm(&self) -> Option<T> {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.take().map(|action| action.target)
    }

    pub fn cancel(&self) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        pending.take().is_some()
    }

    pub fn pending(&self) -> Option<PendingAction<T>> {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_armed(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}
