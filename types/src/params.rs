//! Governance rules: acceptance criteria and quorum requirements.
//!
//! Fractions are expressed in basis points (10000 = 100%) so that the
//! "at least ceil(fraction × eligible)" comparisons are exact integer maths.
//! None of these values has a built-in default; they are supplied by
//! configuration for each governance regime.

use crate::acceptance::{AcceptanceDecision, CriteriaSnapshot};
use crate::error::TypesError;
use crate::quorum::QuorumReport;
use serde::{Deserialize, Serialize};

/// 100% in basis points.
pub const BPS_DENOMINATOR: u32 = 10_000;

/// Smallest count `n` such that `n / eligible >= bps / 10000`.
pub fn required_count(bps: u32, eligible: u32) -> u32 {
    let numerator = u64::from(bps) * u64::from(eligible);
    let denominator = u64::from(BPS_DENOMINATOR);
    numerator.div_ceil(denominator) as u32
}

fn check_bps(name: &'static str, bps: u32) -> Result<(), TypesError> {
    if bps == 0 || bps > BPS_DENOMINATOR {
        return Err(TypesError::InvalidThreshold { name, bps });
    }
    Ok(())
}

/// Criteria a project must satisfy to be accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptanceCriteria {
    /// Minimum share of eligible respondents that must approve.
    pub approval_threshold_bps: u32,
    /// Maximum number of disapprovals tolerated.
    pub max_disapprovals: u32,
}

impl AcceptanceCriteria {
    pub fn validate(&self) -> Result<(), TypesError> {
        check_bps("approval_threshold_bps", self.approval_threshold_bps)
    }

    /// Approvals needed out of `total_eligible`.
    pub fn required_approvals(&self, total_eligible: u32) -> u32 {
        required_count(self.approval_threshold_bps, total_eligible)
    }

    /// Decide a snapshot. The caller must reject `total_eligible == 0` first.
    pub fn evaluate(&self, snapshot: &CriteriaSnapshot) -> AcceptanceDecision {
        let enough_approvals =
            snapshot.approvals >= self.required_approvals(snapshot.total_eligible);
        let few_disapprovals = snapshot.disapprovals <= self.max_disapprovals;
        if enough_approvals && few_disapprovals {
            AcceptanceDecision::Accepted
        } else {
            AcceptanceDecision::Rejected
        }
    }
}

/// Minimum participation for a meeting or balloting to be valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumRule {
    /// Required share of eligible members, e.g. 5000 for a simple majority.
    pub required_bps: u32,
}

impl QuorumRule {
    pub fn validate(&self) -> Result<(), TypesError> {
        check_bps("required_bps", self.required_bps)
    }

    /// Evaluate participation. The caller must reject `eligible == 0` first.
    pub fn evaluate(&self, eligible: u32, participating: u32) -> QuorumReport {
        let required = required_count(self.required_bps, eligible);
        QuorumReport {
            eligible,
            participating,
            required,
            met: participating >= required,
        }
    }
}

/// The governance regime in force.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceRules {
    #[serde(default)]
    pub acceptance: Option<AcceptanceCriteria>,
    #[serde(default)]
    pub quorum: Option<QuorumRule>,
}

impl GovernanceRules {
    /// Validate whichever rules are configured.
    pub fn validate(&self) -> Result<(), TypesError> {
        if let Some(acceptance) = &self.acceptance {
            acceptance.validate()?;
        }
        if let Some(quorum) = &self.quorum {
            quorum.validate()?;
        }
        Ok(())
    }
}
