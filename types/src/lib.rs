//! Fundamental types for standards-development balloting.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identifiers, timestamps and the clock, ballotings, votes, NSB responses,
//! acceptance snapshots, FDARS recommendations, audit events and the governance
//! rules that quorum and acceptance are evaluated against.

pub mod acceptance;
pub mod audit;
pub mod balloting;
pub mod error;
pub mod fdars;
pub mod id;
pub mod nsb;
pub mod params;
pub mod quorum;
pub mod time;
pub mod vote;

pub use acceptance::{Acceptance, AcceptanceApproval, AcceptanceDecision, CriteriaSnapshot};
pub use audit::{AuditAction, AuditError, AuditEvent, AuditOutcome, AuditTrail, ResourceType};
pub use balloting::{
    Balloting, BallotingDraft, BallotingOutcome, BallotingPeriod, BallotingStatus, Disposition,
};
pub use error::TypesError;
pub use fdars::FdarsRecommendation;
pub use id::{AcceptanceId, BallotingId, MeetingId, MemberId, NsbResponseId, ProjectId, VoteId};
pub use nsb::{NewNsbResponse, NsbResponse, NsbResponseType};
pub use params::{AcceptanceCriteria, GovernanceRules, QuorumRule, BPS_DENOMINATOR};
pub use quorum::{QuorumReport, QuorumSubject, RosterKey};
pub use time::{Clock, SystemClock, Timestamp, SECS_PER_DAY};
pub use vote::{Vote, VoteChoice, VoteTally};
