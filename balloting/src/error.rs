use arso_store::StoreError;
use arso_types::{BallotingId, BallotingStatus, MemberId, ProjectId, Timestamp, TypesError, VoteId};
use std::fmt;
use thiserror::Error;

/// Category of a [`BallotingError`], for callers that map failures to
/// user-facing responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input: date ordering, missing required fields.
    Validation,
    /// Uniqueness violated: duplicate vote or response, already verified.
    Conflict,
    /// Operation not allowed in the current lifecycle state.
    State,
    NotFound,
    /// Governance policy prevents evaluation: no eligible members, rule not configured.
    Policy,
    /// Persistence failure, surfaced as-is.
    Storage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::Conflict => "conflict",
            Self::State => "state",
            Self::NotFound => "not_found",
            Self::Policy => "policy",
            Self::Storage => "storage",
        })
    }
}

#[derive(Debug, Error)]
pub enum BallotingError {
    #[error("invalid period: end {end} is not after start {start}")]
    InvalidPeriod { start: Timestamp, end: Timestamp },

    #[error("invalid vote choice: {0:?}")]
    InvalidChoice(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("acceptance approval requires a TC secretary")]
    MissingApprover,

    #[error("balloting {balloting} belongs to project {expected}, not {got}")]
    ProjectMismatch {
        balloting: BallotingId,
        expected: ProjectId,
        got: ProjectId,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("member {member} has already voted on balloting {balloting}")]
    DuplicateVote {
        balloting: BallotingId,
        member: MemberId,
    },

    #[error("{responder} has already responded on project {project}")]
    DuplicateResponse {
        project: ProjectId,
        responder: MemberId,
    },

    #[error("FDARS recommendation for project {0} is already verified")]
    AlreadyVerified(ProjectId),

    #[error("FDARS recommendation for project {project} is at version {current}, not {expected}")]
    StaleRecommendation {
        project: ProjectId,
        expected: u64,
        current: u64,
    },

    #[error("balloting {id} is {status}; votes are only accepted while open")]
    BallotingClosed {
        id: BallotingId,
        status: BallotingStatus,
    },

    #[error("balloting {id} is {status} and cannot be modified")]
    TerminalState {
        id: BallotingId,
        status: BallotingStatus,
    },

    #[error("balloting {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: BallotingId,
        from: BallotingStatus,
        to: BallotingStatus,
    },

    #[error("balloting {0} not found")]
    BallotingNotFound(BallotingId),

    #[error("vote {0} not found")]
    VoteNotFound(VoteId),

    #[error("no acceptance snapshot for project {0}")]
    AcceptanceNotFound(ProjectId),

    #[error("no FDARS recommendation for project {0}")]
    NoRecommendation(ProjectId),

    #[error("no eligible members for {0}")]
    NoEligibleMembers(String),

    #[error("{0} threshold is not configured")]
    ThresholdNotConfigured(&'static str),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl BallotingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPeriod { .. }
            | Self::InvalidChoice(_)
            | Self::MissingField(_)
            | Self::MissingApprover
            | Self::ProjectMismatch { .. }
            | Self::InvalidInput(_) => ErrorKind::Validation,
            Self::DuplicateVote { .. }
            | Self::DuplicateResponse { .. }
            | Self::AlreadyVerified(_)
            | Self::StaleRecommendation { .. } => ErrorKind::Conflict,
            Self::BallotingClosed { .. }
            | Self::TerminalState { .. }
            | Self::InvalidTransition { .. } => ErrorKind::State,
            Self::BallotingNotFound(_)
            | Self::VoteNotFound(_)
            | Self::AcceptanceNotFound(_)
            | Self::NoRecommendation(_) => ErrorKind::NotFound,
            Self::NoEligibleMembers(_) | Self::ThresholdNotConfigured(_) => ErrorKind::Policy,
            Self::Store(_) => ErrorKind::Storage,
        }
    }
}

impl From<TypesError> for BallotingError {
    fn from(e: TypesError) -> Self {
        match e {
            TypesError::InvalidChoice(raw) => Self::InvalidChoice(raw),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}
