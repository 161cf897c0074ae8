//! The governance engine: one handle over every balloting component.

use crate::acceptance::AcceptanceEvaluator;
use crate::context::Context;
use crate::error::BallotingError;
use crate::ledger::VoteLedger;
use crate::quorum::QuorumChecker;
use crate::session::BallotingSession;
use arso_store::Environment;
use arso_types::{AuditTrail, Clock, GovernanceRules};
use std::sync::Arc;

/// Vote ledger, balloting sessions, NSB acceptance and quorum checking
/// sharing one storage environment, clock, audit trail and rule set.
pub struct GovernanceEngine<E> {
    pub ledger: VoteLedger<E>,
    pub sessions: BallotingSession<E>,
    pub acceptance: AcceptanceEvaluator<E>,
    pub quorum: QuorumChecker<E>,
    rules: GovernanceRules,
}

impl<E: Environment> GovernanceEngine<E> {
    /// Fails if a configured rule is out of range. Absent rules are
    /// reported only when an operation needs them.
    pub fn new(
        env: Arc<E>,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn AuditTrail>,
        rules: GovernanceRules,
    ) -> Result<Self, BallotingError> {
        let ctx = Context::new(env, clock, audit, rules)?;
        Ok(Self {
            ledger: VoteLedger::new(ctx.clone()),
            sessions: BallotingSession::new(ctx.clone()),
            acceptance: AcceptanceEvaluator::new(ctx.clone()),
            quorum: QuorumChecker::new(ctx),
            rules,
        })
    }

    pub fn rules(&self) -> &GovernanceRules {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arso_nullables::{NullAuditTrail, NullClock, NullEnvironment};
    use arso_types::{AcceptanceCriteria, QuorumRule};

    #[test]
    fn out_of_range_rules_are_rejected() {
        let rules = GovernanceRules {
            acceptance: Some(AcceptanceCriteria {
                approval_threshold_bps: 10_001,
                max_disapprovals: 0,
            }),
            quorum: Some(QuorumRule { required_bps: 5_000 }),
        };
        let result = GovernanceEngine::new(
            Arc::new(NullEnvironment::new()),
            Arc::new(NullClock::new(0)),
            Arc::new(NullAuditTrail::new()),
            rules,
        );
        assert!(matches!(result, Err(BallotingError::InvalidInput(_))));
    }

    #[test]
    fn absent_rules_are_accepted_at_construction() {
        let engine = GovernanceEngine::new(
            Arc::new(NullEnvironment::new()),
            Arc::new(NullClock::new(0)),
            Arc::new(NullAuditTrail::new()),
            GovernanceRules::default(),
        )
        .unwrap();
        assert!(engine.rules().acceptance.is_none());
    }
}
