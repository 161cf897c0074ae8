//! Balloting core for standards development.
//!
//! Member bodies cast votes on timed ballotings; national standards bodies
//! (NSBs) respond to projects; the TC secretary decides acceptance against
//! configured criteria; quorum is checked for ballotings and meetings; and
//! projects move through a two-step FDARS recommend/verify workflow.
//!
//! Every mutating operation runs in one storage write transaction, takes the
//! acting member explicitly and reports its outcome to the audit trail.

pub mod acceptance;
pub mod context;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod quorum;
pub mod session;
pub mod spans;

pub use acceptance::{AcceptanceEvaluator, AcceptanceStats};
pub use context::Context;
pub use engine::GovernanceEngine;
pub use error::{BallotingError, ErrorKind};
pub use ledger::{parse_choice, CastVote, VoteLedger};
pub use quorum::QuorumChecker;
pub use session::{BallotingSession, ClosedBalloting};
