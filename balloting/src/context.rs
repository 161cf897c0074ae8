//! Shared collaborators of the balloting components.

use crate::error::BallotingError;
use arso_store::Environment;
use arso_types::{
    AcceptanceCriteria, AuditAction, AuditEvent, AuditOutcome, AuditTrail, Clock,
    GovernanceRules, MemberId, QuorumRule, ResourceType, Timestamp,
};
use std::sync::Arc;

/// Storage, clock, audit trail and governance rules, shared by every component.
pub struct Context<E> {
    pub(crate) env: Arc<E>,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditTrail>,
    rules: GovernanceRules,
}

impl<E> Clone for Context<E> {
    fn clone(&self) -> Self {
        Self {
            env: Arc::clone(&self.env),
            clock: Arc::clone(&self.clock),
            audit: Arc::clone(&self.audit),
            rules: self.rules,
        }
    }
}

impl<E: Environment> Context<E> {
    /// Fails with `InvalidInput` if a configured rule is out of range.
    pub fn new(
        env: Arc<E>,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn AuditTrail>,
        rules: GovernanceRules,
    ) -> Result<Self, BallotingError> {
        rules.validate()?;
        Ok(Self {
            env,
            clock,
            audit,
            rules,
        })
    }

    pub fn rules(&self) -> &GovernanceRules {
        &self.rules
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub(crate) fn acceptance_criteria(&self) -> Result<AcceptanceCriteria, BallotingError> {
        self.rules
            .acceptance
            .ok_or(BallotingError::ThresholdNotConfigured("acceptance"))
    }

    pub(crate) fn quorum_rule(&self) -> Result<QuorumRule, BallotingError> {
        self.rules
            .quorum
            .ok_or(BallotingError::ThresholdNotConfigured("quorum"))
    }

    /// Report the result of a mutating operation to the audit trail.
    ///
    /// Delivery failures are logged and otherwise ignored.
    pub(crate) fn record<T>(
        &self,
        actor: &MemberId,
        action: AuditAction,
        resource_type: ResourceType,
        resource_id: impl ToString,
        result: &Result<T, BallotingError>,
    ) {
        let outcome = match result {
            Ok(_) => AuditOutcome::Success,
            Err(e) => AuditOutcome::Failure {
                kind: e.kind().to_string(),
                reason: e.to_string(),
            },
        };
        let event = AuditEvent {
            actor: actor.clone(),
            action,
            resource_type,
            resource_id: resource_id.to_string(),
            outcome,
            timestamp: self.now(),
        };
        if let Err(e) = self.audit.record(&event) {
            tracing::warn!(action = %action, actor = %actor, error = %e, "audit event dropped");
        }
    }
}
