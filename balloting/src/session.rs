//! Balloting sessions: lifecycle of a balloting round and the FDARS
//! recommendation workflow.
//!
//! ```text
//! Draft ──open──► Open ──close──► Closed
//!   │               │
//!   └────cancel─────┴──cancel──► Cancelled
//! ```
//!
//! Closing re-reads the status, tallies the votes, evaluates quorum and the
//! acceptance criteria and flips the status, all in one write transaction.

use crate::context::Context;
use crate::error::BallotingError;
use crate::quorum;
use crate::spans;
use arso_store::{
    BallotingStore, BallotingStoreMut, Environment, FdarsStore, FdarsStoreMut, RosterStore,
    VoteStore, WriteTxn,
};
use arso_types::{
    AcceptanceDecision, AuditAction, Balloting, BallotingDraft, BallotingId, BallotingOutcome,
    BallotingPeriod, BallotingStatus, CriteriaSnapshot, Disposition, FdarsRecommendation,
    MemberId, ProjectId, QuorumSubject, ResourceType, RosterKey, Timestamp, VoteTally,
};
use tracing::{info, warn};

/// Result of closing a balloting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClosedBalloting {
    pub balloting: Balloting,
    pub outcome: BallotingOutcome,
    /// The project's FDARS recommendation at the time of closing, if any.
    pub fdars: Option<FdarsRecommendation>,
}

pub struct BallotingSession<E> {
    ctx: Context<E>,
}

fn validate_period(period: &BallotingPeriod) -> Result<(), BallotingError> {
    if period.is_valid() {
        Ok(())
    } else {
        Err(BallotingError::InvalidPeriod {
            start: period.start,
            end: period.end,
        })
    }
}

impl<E: Environment> BallotingSession<E> {
    pub fn new(ctx: Context<E>) -> Self {
        Self { ctx }
    }

    /// Create a balloting in `Draft`.
    pub fn create(
        &self,
        actor: &MemberId,
        draft: BallotingDraft,
    ) -> Result<Balloting, BallotingError> {
        let result = self.try_create(actor, &draft);
        let resource = match &result {
            Ok(b) => b.id.to_string(),
            Err(_) => draft.project_id.to_string(),
        };
        self.ctx.record(
            actor,
            AuditAction::CreateBalloting,
            ResourceType::Balloting,
            resource,
            &result,
        );
        result
    }

    fn try_create(
        &self,
        actor: &MemberId,
        draft: &BallotingDraft,
    ) -> Result<Balloting, BallotingError> {
        if !draft.project_id.is_valid() {
            return Err(BallotingError::MissingField("project_id"));
        }
        validate_period(&draft.period)?;

        let mut txn = self.ctx.env.write_txn()?;
        let now = self.ctx.now();
        let balloting = Balloting {
            id: BallotingId::new(txn.next_id()?),
            project_id: draft.project_id.clone(),
            period: draft.period,
            status: BallotingStatus::Draft,
            created_by: actor.clone(),
            created_at: now,
            updated_at: now,
            outcome: None,
        };
        txn.insert_balloting(&balloting)?;
        txn.commit()?;

        info!(
            balloting = %balloting.id,
            project = %balloting.project_id,
            start = %balloting.period.start,
            end = %balloting.period.end,
            "balloting created"
        );
        Ok(balloting)
    }

    /// Edit the project and period of a balloting that is not yet terminal.
    ///
    /// The project of an open balloting is fixed, since votes reference it.
    pub fn update(
        &self,
        actor: &MemberId,
        id: BallotingId,
        draft: BallotingDraft,
    ) -> Result<Balloting, BallotingError> {
        let _span = spans::balloting_span("update", id).entered();
        let result = self.try_update(id, &draft);
        self.ctx.record(
            actor,
            AuditAction::UpdateBalloting,
            ResourceType::Balloting,
            id,
            &result,
        );
        result
    }

    fn try_update(
        &self,
        id: BallotingId,
        draft: &BallotingDraft,
    ) -> Result<Balloting, BallotingError> {
        let mut txn = self.ctx.env.write_txn()?;
        let mut balloting = txn
            .get_balloting(id)?
            .ok_or(BallotingError::BallotingNotFound(id))?;
        if balloting.status.is_terminal() {
            return Err(BallotingError::TerminalState {
                id,
                status: balloting.status,
            });
        }
        validate_period(&draft.period)?;
        if draft.project_id != balloting.project_id {
            if balloting.status != BallotingStatus::Draft {
                return Err(BallotingError::InvalidInput(format!(
                    "project of {} balloting {} cannot change",
                    balloting.status, id
                )));
            }
            if !draft.project_id.is_valid() {
                return Err(BallotingError::MissingField("project_id"));
            }
            balloting.project_id = draft.project_id.clone();
        }
        balloting.period = draft.period;
        balloting.updated_at = self.ctx.now();
        txn.put_balloting(&balloting)?;
        txn.commit()?;

        info!(balloting = %id, "balloting updated");
        Ok(balloting)
    }

    /// Draft → Open.
    pub fn open(&self, actor: &MemberId, id: BallotingId) -> Result<Balloting, BallotingError> {
        self.transition(actor, id, BallotingStatus::Open, AuditAction::OpenBalloting)
    }

    /// Draft/Open → Cancelled.
    pub fn cancel(&self, actor: &MemberId, id: BallotingId) -> Result<Balloting, BallotingError> {
        self.transition(
            actor,
            id,
            BallotingStatus::Cancelled,
            AuditAction::CancelBalloting,
        )
    }

    fn transition(
        &self,
        actor: &MemberId,
        id: BallotingId,
        to: BallotingStatus,
        action: AuditAction,
    ) -> Result<Balloting, BallotingError> {
        let _span = spans::balloting_span(action.as_str(), id).entered();
        let result = self.try_transition(id, to);
        self.ctx
            .record(actor, action, ResourceType::Balloting, id, &result);
        result
    }

    fn try_transition(
        &self,
        id: BallotingId,
        to: BallotingStatus,
    ) -> Result<Balloting, BallotingError> {
        let mut txn = self.ctx.env.write_txn()?;
        let mut balloting = txn
            .get_balloting(id)?
            .ok_or(BallotingError::BallotingNotFound(id))?;
        let from = balloting.status;
        if !from.can_transition_to(to) {
            return Err(BallotingError::InvalidTransition { id, from, to });
        }
        balloting.status = to;
        balloting.updated_at = self.ctx.now();
        txn.put_balloting(&balloting)?;
        txn.commit()?;

        info!(balloting = %id, from = %from, to = %to, "balloting status changed");
        Ok(balloting)
    }

    /// Open → Closed, recording the tally, quorum and disposition.
    ///
    /// Votes committed before this transaction are counted; votes arriving
    /// after it are rejected because they observe the `Closed` status.
    pub fn close(
        &self,
        actor: &MemberId,
        id: BallotingId,
    ) -> Result<ClosedBalloting, BallotingError> {
        let _span = spans::balloting_span("close", id).entered();
        let result = self.try_close(actor, id);
        self.ctx.record(
            actor,
            AuditAction::CloseBalloting,
            ResourceType::Balloting,
            id,
            &result,
        );
        result
    }

    fn try_close(
        &self,
        actor: &MemberId,
        id: BallotingId,
    ) -> Result<ClosedBalloting, BallotingError> {
        let quorum_rule = self.ctx.quorum_rule()?;
        let criteria = self.ctx.acceptance_criteria()?;

        let mut txn = self.ctx.env.write_txn()?;
        let mut balloting = txn
            .get_balloting(id)?
            .ok_or(BallotingError::BallotingNotFound(id))?;
        if !balloting.status.can_transition_to(BallotingStatus::Closed) {
            return Err(BallotingError::InvalidTransition {
                id,
                from: balloting.status,
                to: BallotingStatus::Closed,
            });
        }

        let votes = txn.votes_for_balloting(id)?;
        let tally = VoteTally::from_votes(&votes);
        let quorum = quorum::evaluate(&txn, QuorumSubject::Balloting(id), &quorum_rule)?;
        let disposition = if !quorum.met {
            Disposition::Refer
        } else {
            // Only roster members decide; the full tally is kept for reporting.
            let eligible = txn.eligible_members(&RosterKey::Project(balloting.project_id.clone()))?;
            let counted =
                VoteTally::from_votes(votes.iter().filter(|v| eligible.contains(&v.member_id)));
            let snapshot = CriteriaSnapshot {
                approvals: counted.approve,
                disapprovals: counted.disapprove,
                total_responses: counted.total,
                total_eligible: quorum.eligible,
            };
            match criteria.evaluate(&snapshot) {
                AcceptanceDecision::Accepted => Disposition::Accept,
                _ => Disposition::Reject,
            }
        };

        let now = self.ctx.now();
        let outcome = BallotingOutcome {
            tally,
            quorum,
            disposition,
            closed_by: actor.clone(),
            closed_at: now,
        };
        balloting.status = BallotingStatus::Closed;
        balloting.updated_at = now;
        balloting.outcome = Some(outcome.clone());
        txn.put_balloting(&balloting)?;
        let fdars = txn.get_fdars(&balloting.project_id)?;
        txn.commit()?;

        info!(
            balloting = %id,
            disposition = %disposition,
            approve = tally.approve,
            disapprove = tally.disapprove,
            abstain = tally.abstain,
            quorum_met = quorum.met,
            "balloting closed"
        );
        Ok(ClosedBalloting {
            balloting,
            outcome,
            fdars,
        })
    }

    /// Delete a balloting. Only drafts can be deleted.
    pub fn delete(&self, actor: &MemberId, id: BallotingId) -> Result<(), BallotingError> {
        let _span = spans::balloting_span("delete", id).entered();
        let result = self.try_delete(id);
        self.ctx.record(
            actor,
            AuditAction::DeleteBalloting,
            ResourceType::Balloting,
            id,
            &result,
        );
        result
    }

    fn try_delete(&self, id: BallotingId) -> Result<(), BallotingError> {
        let mut txn = self.ctx.env.write_txn()?;
        let balloting = txn
            .get_balloting(id)?
            .ok_or(BallotingError::BallotingNotFound(id))?;
        if balloting.status != BallotingStatus::Draft {
            return Err(BallotingError::TerminalState {
                id,
                status: balloting.status,
            });
        }
        txn.delete_balloting(id)?;
        txn.commit()?;
        info!(balloting = %id, "balloting deleted");
        Ok(())
    }

    pub fn get(&self, id: BallotingId) -> Result<Balloting, BallotingError> {
        self.ctx
            .env
            .read_txn()?
            .get_balloting(id)?
            .ok_or(BallotingError::BallotingNotFound(id))
    }

    pub fn find_by_project(&self, project: &ProjectId) -> Result<Vec<Balloting>, BallotingError> {
        Ok(self.ctx.env.read_txn()?.ballotings_for_project(project)?)
    }

    /// Ballotings whose period intersects `[start, end + 24h)`.
    ///
    /// `end` is a date, so the whole of that day is included.
    pub fn find_by_period(
        &self,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<Balloting>, BallotingError> {
        if end < start {
            return Err(BallotingError::InvalidPeriod { start, end });
        }
        let until = end.end_of_day();
        Ok(self
            .ctx
            .env
            .read_txn()?
            .iter_ballotings()?
            .into_iter()
            .filter(|b| b.period.intersects(start, until))
            .collect())
    }

    /// Recommend (or withdraw the recommendation of) a project for FDARS.
    ///
    /// Any previous verification is invalidated and must be repeated.
    pub fn recommend_fdars(
        &self,
        actor: &MemberId,
        project: &ProjectId,
        recommended: bool,
    ) -> Result<FdarsRecommendation, BallotingError> {
        let _span = spans::fdars_span("recommend", project).entered();
        let result = self.try_recommend_fdars(actor, project, recommended);
        self.ctx.record(
            actor,
            AuditAction::RecommendFdars,
            ResourceType::FdarsRecommendation,
            project,
            &result,
        );
        result
    }

    fn try_recommend_fdars(
        &self,
        actor: &MemberId,
        project: &ProjectId,
        recommended: bool,
    ) -> Result<FdarsRecommendation, BallotingError> {
        if !project.is_valid() {
            return Err(BallotingError::MissingField("project_id"));
        }
        let mut txn = self.ctx.env.write_txn()?;
        let previous = txn.get_fdars(project)?;
        let recommendation = FdarsRecommendation::recommend(
            previous.as_ref(),
            project.clone(),
            recommended,
            actor.clone(),
            self.ctx.now(),
        );
        txn.put_fdars(&recommendation)?;
        txn.commit()?;

        info!(
            project = %project,
            recommended,
            version = recommendation.version,
            "FDARS recommendation recorded"
        );
        Ok(recommendation)
    }

    /// Verify the current FDARS recommendation of a project.
    pub fn verify_fdars_recommendation(
        &self,
        actor: &MemberId,
        project: &ProjectId,
    ) -> Result<FdarsRecommendation, BallotingError> {
        self.verify(actor, project, None)
    }

    /// Verify the recommendation only if it is still at `version`.
    ///
    /// Use when the verifier reviewed a specific version, so a concurrent
    /// re-recommendation is not verified unseen.
    pub fn verify_fdars_recommendation_at(
        &self,
        actor: &MemberId,
        project: &ProjectId,
        version: u64,
    ) -> Result<FdarsRecommendation, BallotingError> {
        self.verify(actor, project, Some(version))
    }

    fn verify(
        &self,
        actor: &MemberId,
        project: &ProjectId,
        expected_version: Option<u64>,
    ) -> Result<FdarsRecommendation, BallotingError> {
        let _span = spans::fdars_span("verify", project).entered();
        let result = self.try_verify(actor, project, expected_version);
        self.ctx.record(
            actor,
            AuditAction::VerifyFdars,
            ResourceType::FdarsRecommendation,
            project,
            &result,
        );
        result
    }

    fn try_verify(
        &self,
        actor: &MemberId,
        project: &ProjectId,
        expected_version: Option<u64>,
    ) -> Result<FdarsRecommendation, BallotingError> {
        let mut txn = self.ctx.env.write_txn()?;
        let mut recommendation = txn
            .get_fdars(project)?
            .ok_or_else(|| BallotingError::NoRecommendation(project.clone()))?;
        if let Some(expected) = expected_version {
            if expected != recommendation.version {
                return Err(BallotingError::StaleRecommendation {
                    project: project.clone(),
                    expected,
                    current: recommendation.version,
                });
            }
        }
        if recommendation.verified {
            return Err(BallotingError::AlreadyVerified(project.clone()));
        }
        // Self-verification is not prohibited by any governance rule yet.
        if &recommendation.recommended_by == actor {
            warn!(
                project = %project,
                actor = %actor,
                "FDARS recommendation verified by its recommender"
            );
        }

        recommendation.verified = true;
        recommendation.verified_by = Some(actor.clone());
        recommendation.verified_at = Some(self.ctx.now());
        txn.put_fdars(&recommendation)?;
        txn.commit()?;

        info!(
            project = %project,
            version = recommendation.version,
            "FDARS recommendation verified"
        );
        Ok(recommendation)
    }

    pub fn fdars_recommendation(
        &self,
        project: &ProjectId,
    ) -> Result<Option<FdarsRecommendation>, BallotingError> {
        Ok(self.ctx.env.read_txn()?.get_fdars(project)?)
    }
}
