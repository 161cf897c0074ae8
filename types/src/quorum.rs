//! Quorum subjects, rosters and reports.

use crate::id::{BallotingId, MeetingId, ProjectId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a quorum is checked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuorumSubject {
    /// Participants are the distinct voters on the balloting.
    Balloting(BallotingId),
    /// Participants are the recorded attendees of the meeting.
    Meeting(MeetingId),
}

impl fmt::Display for QuorumSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Balloting(id) => write!(f, "{id}"),
            Self::Meeting(id) => write!(f, "{id}"),
        }
    }
}

/// Key of an eligibility roster held by the membership collaborator.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RosterKey {
    /// Member bodies entitled to vote and respond on a project.
    Project(ProjectId),
    /// Members entitled to attend a meeting.
    Meeting(MeetingId),
}

/// Outcome of a quorum evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumReport {
    pub eligible: u32,
    pub participating: u32,
    pub required: u32,
    pub met: bool,
}
