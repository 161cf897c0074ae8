//! Audit sink that writes each event to the log as one JSON document.

use arso_types::{AuditError, AuditEvent, AuditTrail};
use tracing::info;

/// Emits audit events under the `arso::audit` target, so they can be
/// routed to a dedicated sink with a filter directive.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditTrail;

impl TracingAuditTrail {
    pub fn new() -> Self {
        Self
    }

    pub fn render(event: &AuditEvent) -> Result<String, AuditError> {
        serde_json::to_string(event).map_err(|e| AuditError(e.to_string()))
    }
}

impl AuditTrail for TracingAuditTrail {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError> {
        let json = Self::render(event)?;
        info!(
            target: "arso::audit",
            action = %event.action,
            success = event.outcome.is_success(),
            event = %json,
            "audit"
        );
        Ok(())
    }
}
