//! Nullable audit trail: records events in memory.

use arso_types::{AuditAction, AuditError, AuditEvent, AuditTrail};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Collects every audit event it receives.
///
/// Can be switched into a failing mode to check that audit delivery
/// failures do not affect the primary operation.
#[derive(Default)]
pub struct NullAuditTrail {
    events: Mutex<Vec<AuditEvent>>,
    failing: AtomicBool,
}

impl NullAuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every subsequent event.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, action: AuditAction) -> Vec<AuditEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditTrail for NullAuditTrail {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AuditError("null audit trail set to fail".into()));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}
