//! Vote ledger: records votes cast by member bodies on a balloting.
//!
//! Every write reads the balloting status inside the same write transaction
//! that stores the vote, so a vote racing a close is either committed before
//! the status flip (and counted in the close tally) or rejected.
//!
//! One vote per (balloting, member) is enforced by the store's unique index
//! at insert time; the ledger never checks for an existing vote first.

use crate::context::Context;
use crate::error::BallotingError;
use crate::spans;
use arso_store::{BallotingStore, Environment, StoreError, VoteStore, VoteStoreMut, WriteTxn};
use arso_types::{
    AuditAction, Balloting, BallotingId, MemberId, ProjectId, ResourceType, Vote, VoteChoice,
    VoteId, VoteTally,
};
use tracing::{debug, info};

/// A member's vote as submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastVote {
    pub balloting_id: BallotingId,
    pub project_id: ProjectId,
    pub member_id: MemberId,
    pub choice: VoteChoice,
    pub comment: String,
}

/// Parse a transport-supplied choice into a [`VoteChoice`].
pub fn parse_choice(raw: &str) -> Result<VoteChoice, BallotingError> {
    raw.parse::<VoteChoice>().map_err(BallotingError::from)
}

pub struct VoteLedger<E> {
    ctx: Context<E>,
}

fn ensure_accepts_votes(balloting: &Balloting) -> Result<(), BallotingError> {
    if balloting.status.accepts_votes() {
        Ok(())
    } else {
        Err(BallotingError::BallotingClosed {
            id: balloting.id,
            status: balloting.status,
        })
    }
}

impl<E: Environment> VoteLedger<E> {
    pub fn new(ctx: Context<E>) -> Self {
        Self { ctx }
    }

    /// Cast a vote. Fails if the balloting is not open or the member has
    /// already voted on it.
    pub fn cast_vote(&self, actor: &MemberId, request: CastVote) -> Result<Vote, BallotingError> {
        let _span = spans::vote_span("cast", request.balloting_id).entered();
        let result = self.try_cast_vote(&request);
        let resource = match &result {
            Ok(vote) => vote.id.to_string(),
            Err(_) => request.balloting_id.to_string(),
        };
        self.ctx
            .record(actor, AuditAction::CastVote, ResourceType::Vote, resource, &result);
        result
    }

    fn try_cast_vote(&self, request: &CastVote) -> Result<Vote, BallotingError> {
        if !request.member_id.is_valid() {
            return Err(BallotingError::MissingField("member_id"));
        }
        let mut txn = self.ctx.env.write_txn()?;
        let balloting = txn
            .get_balloting(request.balloting_id)?
            .ok_or(BallotingError::BallotingNotFound(request.balloting_id))?;
        if balloting.project_id != request.project_id {
            return Err(BallotingError::ProjectMismatch {
                balloting: balloting.id,
                expected: balloting.project_id,
                got: request.project_id.clone(),
            });
        }
        ensure_accepts_votes(&balloting)?;

        let vote = Vote {
            id: VoteId::new(txn.next_id()?),
            balloting_id: request.balloting_id,
            project_id: request.project_id.clone(),
            member_id: request.member_id.clone(),
            choice: request.choice,
            comment: request.comment.clone(),
            cast_at: self.ctx.now(),
            revised_at: None,
        };
        txn.insert_vote(&vote).map_err(|e| match e {
            StoreError::Duplicate(_) => BallotingError::DuplicateVote {
                balloting: request.balloting_id,
                member: request.member_id.clone(),
            },
            other => other.into(),
        })?;
        txn.commit()?;

        info!(
            vote = %vote.id,
            member = %vote.member_id,
            choice = %vote.choice,
            "vote cast"
        );
        Ok(vote)
    }

    /// Revise the choice and comment of a vote while its balloting is open.
    pub fn update_vote(
        &self,
        actor: &MemberId,
        vote_id: VoteId,
        choice: VoteChoice,
        comment: String,
    ) -> Result<Vote, BallotingError> {
        let result = self.try_update_vote(vote_id, choice, comment);
        self.ctx.record(
            actor,
            AuditAction::UpdateVote,
            ResourceType::Vote,
            vote_id,
            &result,
        );
        result
    }

    fn try_update_vote(
        &self,
        vote_id: VoteId,
        choice: VoteChoice,
        comment: String,
    ) -> Result<Vote, BallotingError> {
        let mut txn = self.ctx.env.write_txn()?;
        let mut vote = txn
            .get_vote(vote_id)?
            .ok_or(BallotingError::VoteNotFound(vote_id))?;
        let _span = spans::vote_span("update", vote.balloting_id).entered();
        let balloting = txn
            .get_balloting(vote.balloting_id)?
            .ok_or(BallotingError::BallotingNotFound(vote.balloting_id))?;
        ensure_accepts_votes(&balloting)?;

        vote.choice = choice;
        vote.comment = comment;
        vote.revised_at = Some(self.ctx.now());
        txn.put_vote(&vote)?;
        txn.commit()?;

        info!(vote = %vote.id, choice = %vote.choice, "vote revised");
        Ok(vote)
    }

    /// Withdraw a vote. Votes become immutable history once the round ends.
    pub fn delete_vote(&self, actor: &MemberId, vote_id: VoteId) -> Result<(), BallotingError> {
        let result = self.try_delete_vote(vote_id);
        self.ctx.record(
            actor,
            AuditAction::DeleteVote,
            ResourceType::Vote,
            vote_id,
            &result,
        );
        result
    }

    fn try_delete_vote(&self, vote_id: VoteId) -> Result<(), BallotingError> {
        let mut txn = self.ctx.env.write_txn()?;
        let vote = txn
            .get_vote(vote_id)?
            .ok_or(BallotingError::VoteNotFound(vote_id))?;
        let _span = spans::vote_span("delete", vote.balloting_id).entered();
        let balloting = txn
            .get_balloting(vote.balloting_id)?
            .ok_or(BallotingError::BallotingNotFound(vote.balloting_id))?;
        ensure_accepts_votes(&balloting)?;

        txn.delete_vote(vote_id)?;
        txn.commit()?;
        info!(vote = %vote_id, member = %vote.member_id, "vote withdrawn");
        Ok(())
    }

    /// Aggregate the votes on a balloting. An empty balloting tallies to zero.
    pub fn tally_votes(&self, balloting: BallotingId) -> Result<VoteTally, BallotingError> {
        let txn = self.ctx.env.read_txn()?;
        let tally = VoteTally::from_votes(&txn.votes_for_balloting(balloting)?);
        debug!(
            balloting = %balloting,
            approve = tally.approve,
            disapprove = tally.disapprove,
            abstain = tally.abstain,
            total = tally.total,
            "votes tallied"
        );
        Ok(tally)
    }

    pub fn count_votes_by_balloting(&self, balloting: BallotingId) -> Result<u64, BallotingError> {
        Ok(self.ctx.env.read_txn()?.count_votes(balloting)?)
    }

    pub fn find_votes_by_member(&self, member: &MemberId) -> Result<Vec<Vote>, BallotingError> {
        Ok(self.ctx.env.read_txn()?.votes_by_member(member)?)
    }

    pub fn find_by_project(&self, project: &ProjectId) -> Result<Vec<Vote>, BallotingError> {
        Ok(self.ctx.env.read_txn()?.votes_for_project(project)?)
    }

    pub fn get_vote(&self, vote_id: VoteId) -> Result<Vote, BallotingError> {
        self.ctx
            .env
            .read_txn()?
            .get_vote(vote_id)?
            .ok_or(BallotingError::VoteNotFound(vote_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use crate::ErrorKind;
    use arso_types::AuditOutcome;

    #[test]
    fn cast_vote_stamps_cast_at() {
        let fx = Fixture::new();
        let balloting = fx.open_balloting();
        let vote = fx.vote(balloting, "nsb-ke", VoteChoice::Approve);
        assert_eq!(vote.cast_at, fx.clock.now());
        assert_eq!(vote.member_id, MemberId::new("nsb-ke"));
        assert!(vote.revised_at.is_none());
    }

    #[test]
    fn second_vote_by_same_member_conflicts() {
        let fx = Fixture::new();
        let balloting = fx.open_balloting();
        fx.vote(balloting, "nsb-ke", VoteChoice::Approve);
        let err = fx
            .engine
            .ledger
            .cast_vote(
                &MemberId::new("nsb-ke"),
                fx.cast(balloting, "nsb-ke", VoteChoice::Disapprove),
            )
            .unwrap_err();
        assert!(matches!(err, BallotingError::DuplicateVote { .. }));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(fx.engine.ledger.count_votes_by_balloting(balloting).unwrap(), 1);
    }

    #[test]
    fn voting_on_draft_balloting_is_a_state_error() {
        let fx = Fixture::new();
        let balloting = fx.draft_balloting();
        let err = fx
            .engine
            .ledger
            .cast_vote(
                &MemberId::new("nsb-ke"),
                fx.cast(balloting, "nsb-ke", VoteChoice::Approve),
            )
            .unwrap_err();
        assert!(matches!(err, BallotingError::BallotingClosed { .. }));
        assert_eq!(err.kind(), ErrorKind::State);
    }

    #[test]
    fn voting_with_wrong_project_is_rejected() {
        let fx = Fixture::new();
        let balloting = fx.open_balloting();
        let mut request = fx.cast(balloting, "nsb-ke", VoteChoice::Approve);
        request.project_id = ProjectId::new("other");
        let err = fx
            .engine
            .ledger
            .cast_vote(&MemberId::new("nsb-ke"), request)
            .unwrap_err();
        assert!(matches!(err, BallotingError::ProjectMismatch { .. }));
    }

    #[test]
    fn unknown_balloting_is_not_found() {
        let fx = Fixture::new();
        let err = fx
            .engine
            .ledger
            .cast_vote(
                &MemberId::new("nsb-ke"),
                fx.cast(BallotingId::new(999), "nsb-ke", VoteChoice::Approve),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn parse_choice_reports_invalid_choice() {
        assert_eq!(parse_choice("approve").unwrap(), VoteChoice::Approve);
        let err = parse_choice("veto").unwrap_err();
        assert!(matches!(err, BallotingError::InvalidChoice(ref raw) if raw == "veto"));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn update_preserves_identity_fields() {
        let fx = Fixture::new();
        let balloting = fx.open_balloting();
        let original = fx.vote(balloting, "nsb-ke", VoteChoice::Approve);
        fx.clock.advance(60);

        let revised = fx
            .engine
            .ledger
            .update_vote(
                &MemberId::new("nsb-ke"),
                original.id,
                VoteChoice::Disapprove,
                "technical objection".into(),
            )
            .unwrap();
        assert_eq!(revised.choice, VoteChoice::Disapprove);
        assert_eq!(revised.comment, "technical objection");
        assert_eq!(revised.member_id, original.member_id);
        assert_eq!(revised.balloting_id, original.balloting_id);
        assert_eq!(revised.project_id, original.project_id);
        assert_eq!(revised.cast_at, original.cast_at);
        assert_eq!(revised.revised_at, Some(fx.clock.now()));
        assert_eq!(fx.engine.ledger.get_vote(original.id).unwrap(), revised);
    }

    #[test]
    fn update_and_delete_of_unknown_vote_are_not_found() {
        let fx = Fixture::new();
        let actor = MemberId::new("nsb-ke");
        let err = fx
            .engine
            .ledger
            .update_vote(&actor, VoteId::new(77), VoteChoice::Abstain, String::new())
            .unwrap_err();
        assert!(matches!(err, BallotingError::VoteNotFound(_)));
        let err = fx.engine.ledger.delete_vote(&actor, VoteId::new(77)).unwrap_err();
        assert!(matches!(err, BallotingError::VoteNotFound(_)));
    }

    #[test]
    fn votes_are_frozen_after_close() {
        let fx = Fixture::new();
        fx.seed_project_roster(3);
        let balloting = fx.open_balloting();
        let vote = fx.vote(balloting, "nsb-0", VoteChoice::Approve);
        fx.engine.sessions.close(&fx.secretary, balloting).unwrap();

        let actor = MemberId::new("nsb-0");
        let err = fx
            .engine
            .ledger
            .update_vote(&actor, vote.id, VoteChoice::Disapprove, String::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        let err = fx.engine.ledger.delete_vote(&actor, vote.id).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        let err = fx
            .engine
            .ledger
            .cast_vote(
                &MemberId::new("nsb-1"),
                fx.cast(balloting, "nsb-1", VoteChoice::Approve),
            )
            .unwrap_err();
        assert!(matches!(err, BallotingError::BallotingClosed { .. }));
    }

    #[test]
    fn withdrawn_vote_can_be_recast() {
        let fx = Fixture::new();
        let balloting = fx.open_balloting();
        let vote = fx.vote(balloting, "nsb-ke", VoteChoice::Approve);
        fx.engine
            .ledger
            .delete_vote(&MemberId::new("nsb-ke"), vote.id)
            .unwrap();
        assert_eq!(fx.engine.ledger.count_votes_by_balloting(balloting).unwrap(), 0);
        fx.vote(balloting, "nsb-ke", VoteChoice::Abstain);
        assert_eq!(fx.engine.ledger.tally_votes(balloting).unwrap().abstain, 1);
    }

    #[test]
    fn tally_and_projections() {
        let fx = Fixture::new();
        let first = fx.open_balloting();
        let second = fx.open_balloting();
        fx.vote(first, "nsb-ke", VoteChoice::Approve);
        fx.vote(first, "nsb-ng", VoteChoice::Approve);
        fx.vote(first, "nsb-eg", VoteChoice::Disapprove);
        fx.vote(second, "nsb-ke", VoteChoice::Abstain);

        let tally = fx.engine.ledger.tally_votes(first).unwrap();
        assert_eq!(
            tally,
            VoteTally {
                approve: 2,
                disapprove: 1,
                abstain: 0,
                total: 3
            }
        );
        assert_eq!(
            fx.engine
                .ledger
                .find_votes_by_member(&MemberId::new("nsb-ke"))
                .unwrap()
                .len(),
            2
        );
        assert_eq!(fx.engine.ledger.find_by_project(&fx.project).unwrap().len(), 4);
        assert_eq!(
            fx.engine.ledger.tally_votes(BallotingId::new(12345)).unwrap(),
            VoteTally::default()
        );
    }

    #[test]
    fn failed_cast_is_audited_as_failure() {
        let fx = Fixture::new();
        let balloting = fx.draft_balloting();
        let _ = fx.engine.ledger.cast_vote(
            &MemberId::new("nsb-ke"),
            fx.cast(balloting, "nsb-ke", VoteChoice::Approve),
        );
        let events = fx.audit.events_for(AuditAction::CastVote);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0].outcome,
            AuditOutcome::Failure { kind, .. } if kind == "state"
        ));
        assert_eq!(events[0].resource_id, balloting.to_string());
    }

    #[test]
    fn audit_failure_does_not_roll_back_the_vote() {
        let fx = Fixture::new();
        let balloting = fx.open_balloting();
        fx.audit.set_failing(true);
        let vote = fx.vote(balloting, "nsb-ke", VoteChoice::Approve);
        assert_eq!(fx.engine.ledger.get_vote(vote.id).unwrap(), vote);
    }

    #[test]
    fn commit_failure_is_surfaced_as_storage_error() {
        let fx = Fixture::new();
        let balloting = fx.open_balloting();
        fx.env.fail_next_commit();
        let err = fx
            .engine
            .ledger
            .cast_vote(
                &MemberId::new("nsb-ke"),
                fx.cast(balloting, "nsb-ke", VoteChoice::Approve),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(fx.engine.ledger.count_votes_by_balloting(balloting).unwrap(), 0);
    }
}
