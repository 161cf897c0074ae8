//! Pre-built [`tracing::Span`] constructors for balloting operations.
//!
//! Consistent span names and fields make it easy to filter and correlate
//! one logical operation across the ledger, session, acceptance and quorum
//! components.

use arso_types::{BallotingId, MeetingId, ProjectId, QuorumSubject};
use tracing::{info_span, Span};

/// Span covering a lifecycle operation on a balloting.
pub fn balloting_span(op: &'static str, balloting: BallotingId) -> Span {
    info_span!("balloting", op, balloting = %balloting)
}

/// Span covering a vote operation on a balloting.
pub fn vote_span(op: &'static str, balloting: BallotingId) -> Span {
    info_span!("vote", op, balloting = %balloting)
}

/// Span covering NSB response and acceptance work on a project.
pub fn acceptance_span(op: &'static str, project: &ProjectId) -> Span {
    info_span!("acceptance", op, project = %project)
}

/// Span covering the FDARS recommend/verify workflow.
pub fn fdars_span(op: &'static str, project: &ProjectId) -> Span {
    info_span!("fdars", op, project = %project)
}

/// Span covering a quorum evaluation.
pub fn quorum_span(subject: QuorumSubject) -> Span {
    info_span!("quorum", subject = %subject)
}

/// Span covering attendance recording for a meeting.
pub fn meeting_span(meeting: MeetingId) -> Span {
    info_span!("meeting", meeting = %meeting)
}
