//! NSB acceptance: national standards body responses and the versioned
//! acceptance decision computed from them.

use crate::context::Context;
use crate::error::BallotingError;
use crate::spans;
use arso_store::{
    AcceptanceStore, AcceptanceStoreMut, Environment, NsbResponseStore, NsbResponseStoreMut,
    ReadTxn, RosterStore, StoreError, WriteTxn,
};
use arso_types::nsb::count_by_type;
use arso_types::{
    Acceptance, AcceptanceApproval, AcceptanceDecision, AcceptanceId, AuditAction,
    CriteriaSnapshot, MemberId, NewNsbResponse, NsbResponse, NsbResponseId, NsbResponseType,
    ProjectId, ResourceType, RosterKey,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Aggregated response statistics for a project, with the acceptance
/// version they were stored in.
#[derive(Clone, Debug, PartialEq)]
pub struct AcceptanceStats {
    pub snapshot: CriteriaSnapshot,
    /// Approvals over total responses; 0.0 when nobody has responded.
    pub approval_rate: f64,
    pub acceptance: Acceptance,
}

/// Count the current responses of `project` from members on its roster.
///
/// Responses from NSBs outside the roster stay recorded but never count
/// towards the decision.
fn snapshot_for<T: ReadTxn + ?Sized>(
    txn: &T,
    project: &ProjectId,
) -> Result<CriteriaSnapshot, BallotingError> {
    let eligible = txn.eligible_members(&RosterKey::Project(project.clone()))?;
    let counted: Vec<NsbResponse> = txn
        .responses_for_project(project)?
        .into_iter()
        .filter(|r| eligible.contains(&r.responder_id))
        .collect();
    let approvals = counted
        .iter()
        .filter(|r| r.response_type.is_approval())
        .count() as u32;
    let disapprovals = counted
        .iter()
        .filter(|r| r.response_type == NsbResponseType::Disapprove)
        .count() as u32;
    Ok(CriteriaSnapshot {
        approvals,
        disapprovals,
        total_responses: counted.len() as u32,
        total_eligible: eligible.len() as u32,
    })
}

pub struct AcceptanceEvaluator<E> {
    ctx: Context<E>,
}

impl<E: Environment> AcceptanceEvaluator<E> {
    pub fn new(ctx: Context<E>) -> Self {
        Self { ctx }
    }

    /// Record an NSB's response to a project. Each NSB responds once.
    pub fn record_nsb_response(
        &self,
        actor: &MemberId,
        response: NewNsbResponse,
    ) -> Result<NsbResponse, BallotingError> {
        let _span = spans::acceptance_span("respond", &response.project_id).entered();
        let project = response.project_id.to_string();
        let result = self.try_record_response(response);
        let resource = match &result {
            Ok(r) => r.id.to_string(),
            Err(_) => project,
        };
        self.ctx.record(
            actor,
            AuditAction::RecordNsbResponse,
            ResourceType::NsbResponse,
            resource,
            &result,
        );
        result
    }

    fn try_record_response(&self, response: NewNsbResponse) -> Result<NsbResponse, BallotingError> {
        if !response.project_id.is_valid() {
            return Err(BallotingError::MissingField("project_id"));
        }
        if !response.responder_id.is_valid() {
            return Err(BallotingError::MissingField("responder_id"));
        }
        if response.response_type.requires_comment() && response.comments.trim().is_empty() {
            return Err(BallotingError::MissingField("comments"));
        }

        let mut txn = self.ctx.env.write_txn()?;
        let record = NsbResponse {
            id: NsbResponseId::new(txn.next_id()?),
            project_id: response.project_id,
            responder_id: response.responder_id,
            response_type: response.response_type,
            comments: response.comments,
            submitted_at: self.ctx.now(),
        };
        match txn.insert_response(&record) {
            Ok(()) => {}
            Err(StoreError::Duplicate(_)) => {
                return Err(BallotingError::DuplicateResponse {
                    project: record.project_id,
                    responder: record.responder_id,
                })
            }
            Err(e) => return Err(e.into()),
        }
        txn.commit()?;

        info!(
            response = %record.id,
            responder = %record.responder_id,
            response_type = %record.response_type,
            "NSB response recorded"
        );
        Ok(record)
    }

    /// Responses per type. Every type is present, zero when absent.
    pub fn count_responses_by_type(
        &self,
        project: &ProjectId,
    ) -> Result<BTreeMap<NsbResponseType, u64>, BallotingError> {
        let responses = self.ctx.env.read_txn()?.responses_for_project(project)?;
        Ok(count_by_type(&responses))
    }

    pub fn responses(&self, project: &ProjectId) -> Result<Vec<NsbResponse>, BallotingError> {
        Ok(self.ctx.env.read_txn()?.responses_for_project(project)?)
    }

    /// Recompute the response statistics and store them as the project's
    /// pending acceptance snapshot.
    ///
    /// A pending latest version is refreshed in place. A decided one is left
    /// untouched and a new pending version is added after it.
    pub fn calculate_stats(
        &self,
        actor: &MemberId,
        project: &ProjectId,
    ) -> Result<AcceptanceStats, BallotingError> {
        let _span = spans::acceptance_span("stats", project).entered();
        let result = self.try_calculate_stats(project);
        self.ctx.record(
            actor,
            AuditAction::CalculateAcceptanceStats,
            ResourceType::Acceptance,
            project,
            &result,
        );
        result
    }

    fn try_calculate_stats(&self, project: &ProjectId) -> Result<AcceptanceStats, BallotingError> {
        let mut txn = self.ctx.env.write_txn()?;
        let snapshot = snapshot_for(&txn, project)?;
        let now = self.ctx.now();

        let acceptance = match txn.latest_acceptance(project)? {
            Some(mut pending) if !pending.decision.is_decided() => {
                pending.snapshot = snapshot;
                pending.updated_at = now;
                txn.put_acceptance(&pending)?;
                pending
            }
            latest => {
                let acceptance = Acceptance {
                    id: AcceptanceId::new(txn.next_id()?),
                    project_id: project.clone(),
                    version: latest.map_or(1, |a| a.version + 1),
                    snapshot,
                    decision: AcceptanceDecision::Pending,
                    tc_secretary_id: None,
                    created_at: now,
                    updated_at: now,
                    decided_at: None,
                };
                txn.insert_acceptance(&acceptance)?;
                acceptance
            }
        };
        txn.commit()?;

        debug!(
            version = acceptance.version,
            approvals = snapshot.approvals,
            disapprovals = snapshot.disapprovals,
            responses = snapshot.total_responses,
            eligible = snapshot.total_eligible,
            "acceptance stats calculated"
        );
        Ok(AcceptanceStats {
            snapshot,
            approval_rate: snapshot.approval_rate(),
            acceptance,
        })
    }

    /// Decide acceptance for a project against the configured criteria.
    ///
    /// Requires a prior [`calculate_stats`](Self::calculate_stats). A
    /// pending snapshot is decided as stored; if the latest version is
    /// already decided, a new version is computed from the current
    /// responses and decided instead.
    pub fn set_acceptance_approval(
        &self,
        actor: &MemberId,
        approval: AcceptanceApproval,
    ) -> Result<Acceptance, BallotingError> {
        let _span = spans::acceptance_span("approve", &approval.project_id).entered();
        let result = self.try_set_approval(&approval);
        self.ctx.record(
            actor,
            AuditAction::SetAcceptanceApproval,
            ResourceType::Acceptance,
            &approval.project_id,
            &result,
        );
        result
    }

    fn try_set_approval(
        &self,
        approval: &AcceptanceApproval,
    ) -> Result<Acceptance, BallotingError> {
        let approver = approval
            .tc_secretary_id
            .clone()
            .filter(MemberId::is_valid)
            .ok_or(BallotingError::MissingApprover)?;
        let criteria = self.ctx.acceptance_criteria()?;
        let project = &approval.project_id;

        let mut txn = self.ctx.env.write_txn()?;
        let latest = txn
            .latest_acceptance(project)?
            .ok_or_else(|| BallotingError::AcceptanceNotFound(project.clone()))?;
        let now = self.ctx.now();

        let (mut acceptance, superseding) = if latest.decision.is_decided() {
            let acceptance = Acceptance {
                id: AcceptanceId::new(txn.next_id()?),
                project_id: project.clone(),
                version: latest.version + 1,
                snapshot: snapshot_for(&txn, project)?,
                decision: AcceptanceDecision::Pending,
                tc_secretary_id: None,
                created_at: now,
                updated_at: now,
                decided_at: None,
            };
            (acceptance, true)
        } else {
            (latest, false)
        };

        if acceptance.snapshot.total_eligible == 0 {
            return Err(BallotingError::NoEligibleMembers(project.to_string()));
        }

        acceptance.decision = criteria.evaluate(&acceptance.snapshot);
        acceptance.tc_secretary_id = Some(approver);
        acceptance.decided_at = Some(now);
        acceptance.updated_at = now;
        if superseding {
            txn.insert_acceptance(&acceptance)?;
        } else {
            txn.put_acceptance(&acceptance)?;
        }
        txn.commit()?;

        info!(
            project = %project,
            version = acceptance.version,
            decision = %acceptance.decision,
            required = criteria.required_approvals(acceptance.snapshot.total_eligible),
            approvals = acceptance.snapshot.approvals,
            "acceptance decided"
        );
        Ok(acceptance)
    }

    /// Every acceptance version of a project, oldest first.
    pub fn acceptance_history(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Acceptance>, BallotingError> {
        Ok(self.ctx.env.read_txn()?.acceptance_history(project)?)
    }

    pub fn latest_acceptance(
        &self,
        project: &ProjectId,
    ) -> Result<Option<Acceptance>, BallotingError> {
        Ok(self.ctx.env.read_txn()?.latest_acceptance(project)?)
    }
}
