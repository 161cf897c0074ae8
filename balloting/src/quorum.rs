//! Quorum checking for ballotings and meetings.
//!
//! Quorum holds when the number of distinct participating eligible members
//! reaches `ceil(required fraction × eligible)`. Participants who are not on
//! the roster do not count. An empty roster is a policy failure, never a
//! vacuous pass.

use crate::context::Context;
use crate::error::BallotingError;
use crate::spans;
use arso_store::{
    BallotingStore, Environment, ReadTxn, RosterStore, RosterStoreMut, VoteStore, WriteTxn,
};
use arso_types::{
    AuditAction, MeetingId, MemberId, QuorumReport, QuorumRule, QuorumSubject, ResourceType,
    RosterKey,
};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Eligible and participating members of a quorum subject.
pub(crate) fn participation<T: ReadTxn + ?Sized>(
    txn: &T,
    subject: QuorumSubject,
) -> Result<(BTreeSet<MemberId>, BTreeSet<MemberId>), BallotingError> {
    match subject {
        QuorumSubject::Balloting(id) => {
            let balloting = txn
                .get_balloting(id)?
                .ok_or(BallotingError::BallotingNotFound(id))?;
            let eligible = txn.eligible_members(&RosterKey::Project(balloting.project_id))?;
            let voters = txn
                .votes_for_balloting(id)?
                .into_iter()
                .map(|v| v.member_id)
                .collect();
            Ok((eligible, voters))
        }
        QuorumSubject::Meeting(id) => {
            let eligible = txn.eligible_members(&RosterKey::Meeting(id))?;
            let attendees = txn.meeting_attendees(id)?;
            Ok((eligible, attendees))
        }
    }
}

/// Evaluate `rule` for `subject` within an open transaction.
pub(crate) fn evaluate<T: ReadTxn + ?Sized>(
    txn: &T,
    subject: QuorumSubject,
    rule: &QuorumRule,
) -> Result<QuorumReport, BallotingError> {
    let (eligible, participants) = participation(txn, subject)?;
    if eligible.is_empty() {
        return Err(BallotingError::NoEligibleMembers(subject.to_string()));
    }
    let participating = participants.intersection(&eligible).count() as u32;
    let report = rule.evaluate(eligible.len() as u32, participating);
    debug!(
        subject = %subject,
        eligible = report.eligible,
        participating = report.participating,
        required = report.required,
        met = report.met,
        "quorum evaluated"
    );
    Ok(report)
}

pub struct QuorumChecker<E> {
    ctx: Context<E>,
}

impl<E: Environment> QuorumChecker<E> {
    pub fn new(ctx: Context<E>) -> Self {
        Self { ctx }
    }

    /// Whether `subject` has quorum under the configured rule.
    pub fn check_quorum(&self, subject: QuorumSubject) -> Result<bool, BallotingError> {
        Ok(self.quorum_report(subject)?.met)
    }

    /// Full quorum evaluation: eligible, participating, required, met.
    pub fn quorum_report(&self, subject: QuorumSubject) -> Result<QuorumReport, BallotingError> {
        let _span = spans::quorum_span(subject).entered();
        let rule = self.ctx.quorum_rule()?;
        let txn = self.ctx.env.read_txn()?;
        evaluate(&txn, subject, &rule)
    }

    /// Record that `member` attended `meeting`.
    pub fn record_attendance(
        &self,
        actor: &MemberId,
        meeting: MeetingId,
        member: &MemberId,
    ) -> Result<(), BallotingError> {
        let _span = spans::meeting_span(meeting).entered();
        let result = self.try_record_attendance(meeting, member);
        self.ctx.record(
            actor,
            AuditAction::RecordAttendance,
            ResourceType::Meeting,
            meeting,
            &result,
        );
        result
    }

    fn try_record_attendance(
        &self,
        meeting: MeetingId,
        member: &MemberId,
    ) -> Result<(), BallotingError> {
        if !member.is_valid() {
            return Err(BallotingError::MissingField("member_id"));
        }
        let mut txn = self.ctx.env.write_txn()?;
        txn.record_attendance(meeting, member)?;
        txn.commit()?;
        info!(meeting = %meeting, member = %member, "attendance recorded");
        Ok(())
    }
}
