//! Acceptance snapshots and their decisions.

use crate::id::{AcceptanceId, MemberId, ProjectId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcceptanceDecision {
    Pending,
    Accepted,
    Rejected,
}

impl AcceptanceDecision {
    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for AcceptanceDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        })
    }
}

/// Counts the acceptance criteria are evaluated against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaSnapshot {
    pub approvals: u32,
    pub disapprovals: u32,
    pub total_responses: u32,
    pub total_eligible: u32,
}

impl CriteriaSnapshot {
    /// approvals / total responses, or 0.0 when nothing has been received.
    pub fn approval_rate(&self) -> f64 {
        if self.total_responses == 0 {
            0.0
        } else {
            f64::from(self.approvals) / f64::from(self.total_responses)
        }
    }
}

/// One version of a project's acceptance record.
///
/// Decided versions are immutable history; a later decision supersedes them
/// with a new version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Acceptance {
    pub id: AcceptanceId,
    pub project_id: ProjectId,
    /// 1-based, unique per project.
    pub version: u32,
    pub snapshot: CriteriaSnapshot,
    pub decision: AcceptanceDecision,
    pub tc_secretary_id: Option<MemberId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub decided_at: Option<Timestamp>,
}

/// A request to finalize the acceptance decision for a project.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptanceApproval {
    pub project_id: ProjectId,
    pub tc_secretary_id: Option<MemberId>,
}
