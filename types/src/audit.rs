//! Audit events and the audit-trail collaborator boundary.
//!
//! The balloting core reports every mutating operation, successful or not,
//! to an [`AuditTrail`]. Delivery is fire-and-forget: a failed `record`
//! never rolls back the operation that produced the event.

use crate::id::MemberId;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditAction {
    CreateBalloting,
    UpdateBalloting,
    OpenBalloting,
    CloseBalloting,
    CancelBalloting,
    DeleteBalloting,
    CastVote,
    UpdateVote,
    DeleteVote,
    RecordNsbResponse,
    CalculateAcceptanceStats,
    SetAcceptanceApproval,
    RecommendFdars,
    VerifyFdars,
    RecordAttendance,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateBalloting => "balloting.create",
            Self::UpdateBalloting => "balloting.update",
            Self::OpenBalloting => "balloting.open",
            Self::CloseBalloting => "balloting.close",
            Self::CancelBalloting => "balloting.cancel",
            Self::DeleteBalloting => "balloting.delete",
            Self::CastVote => "vote.cast",
            Self::UpdateVote => "vote.update",
            Self::DeleteVote => "vote.delete",
            Self::RecordNsbResponse => "nsb_response.record",
            Self::CalculateAcceptanceStats => "acceptance.calculate",
            Self::SetAcceptanceApproval => "acceptance.approve",
            Self::RecommendFdars => "fdars.recommend",
            Self::VerifyFdars => "fdars.verify",
            Self::RecordAttendance => "meeting.attendance",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Balloting,
    Vote,
    NsbResponse,
    Acceptance,
    FdarsRecommendation,
    Meeting,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditOutcome {
    Success,
    /// The operation failed; carries the error category and message.
    Failure { kind: String, reason: String },
}

impl AuditOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor: MemberId,
    pub action: AuditAction,
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub outcome: AuditOutcome,
    pub timestamp: Timestamp,
}

#[derive(Debug, Error)]
#[error("audit trail unavailable: {0}")]
pub struct AuditError(pub String);

/// Receiver of audit events.
pub trait AuditTrail: Send + Sync {
    fn record(&self, event: &AuditEvent) -> Result<(), AuditError>;
}
