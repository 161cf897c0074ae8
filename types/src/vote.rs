//! Votes cast by member bodies and their tally.

use crate::error::TypesError;
use crate::id::{BallotingId, MemberId, ProjectId, VoteId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A member body's choice on a balloting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoteChoice {
    Approve,
    Disapprove,
    Abstain,
}

impl VoteChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Disapprove => "disapprove",
            Self::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteChoice {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" | "yes" => Ok(Self::Approve),
            "disapprove" | "no" => Ok(Self::Disapprove),
            "abstain" => Ok(Self::Abstain),
            _ => Err(TypesError::InvalidChoice(s.to_string())),
        }
    }
}

/// A single vote.
///
/// `balloting_id`, `project_id`, `member_id` and `cast_at` never change after
/// creation; only `choice` and `comment` may be revised while the balloting
/// is open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub balloting_id: BallotingId,
    pub project_id: ProjectId,
    pub member_id: MemberId,
    pub choice: VoteChoice,
    pub comment: String,
    pub cast_at: Timestamp,
    pub revised_at: Option<Timestamp>,
}

/// Aggregated counts of votes on one balloting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub approve: u32,
    pub disapprove: u32,
    pub abstain: u32,
    pub total: u32,
}

impl VoteTally {
    pub fn add(&mut self, choice: VoteChoice) {
        match choice {
            VoteChoice::Approve => self.approve += 1,
            VoteChoice::Disapprove => self.disapprove += 1,
            VoteChoice::Abstain => self.abstain += 1,
        }
        self.total += 1;
    }

    pub fn from_choices(choices: impl IntoIterator<Item = VoteChoice>) -> Self {
        let mut tally = Self::default();
        for choice in choices {
            tally.add(choice);
        }
        tally
    }

    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>) -> Self {
        Self::from_choices(votes.into_iter().map(|v| v.choice))
    }
}
