//! Balloting rounds and their lifecycle states.

use crate::error::TypesError;
use crate::id::{BallotingId, MemberId, ProjectId};
use crate::quorum::QuorumReport;
use crate::time::Timestamp;
use crate::vote::VoteTally;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a balloting round.
///
/// ```text
/// Draft ──► Open ──► Closed
///   │        │
///   └────────┴──► Cancelled
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallotingStatus {
    Draft,
    Open,
    Closed,
    Cancelled,
}

impl BallotingStatus {
    /// Closed and Cancelled admit no further transitions or edits.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Whether votes may be cast, revised or withdrawn.
    pub fn accepts_votes(&self) -> bool {
        matches!(self, Self::Open)
    }

    pub fn can_transition_to(&self, next: BallotingStatus) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Open)
                | (Self::Open, Self::Closed)
                | (Self::Draft, Self::Cancelled)
                | (Self::Open, Self::Cancelled)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for BallotingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BallotingStatus {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(TypesError::InvalidStatus(s.to_string())),
        }
    }
}

/// The voting window of a balloting round: `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotingPeriod {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl BallotingPeriod {
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        Self { start, end }
    }

    /// A period is well-formed only when it ends strictly after it starts.
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Whether `[self.start, self.end)` intersects `[from, to)`.
    pub fn intersects(&self, from: Timestamp, to: Timestamp) -> bool {
        self.start < to && from < self.end
    }
}

/// Final disposition of a closed balloting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    /// Quorum met and acceptance criteria satisfied.
    Accept,
    /// Quorum met but acceptance criteria not satisfied.
    Reject,
    /// Quorum not met; referred back to the committee.
    Refer,
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Refer => "refer",
        })
    }
}

/// Snapshot taken atomically with the Open → Closed transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotingOutcome {
    pub tally: VoteTally,
    pub quorum: QuorumReport,
    pub disposition: Disposition,
    pub closed_by: MemberId,
    pub closed_at: Timestamp,
}

/// A timed voting round on a standards project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balloting {
    pub id: BallotingId,
    pub project_id: ProjectId,
    pub period: BallotingPeriod,
    pub status: BallotingStatus,
    pub created_by: MemberId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    /// Set exactly once, when the balloting closes.
    pub outcome: Option<BallotingOutcome>,
}

/// Caller-supplied fields for creating or editing a balloting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BallotingDraft {
    pub project_id: ProjectId,
    pub period: BallotingPeriod,
}
