//! FDARS (Final Draft African Regional Standard) recommendations.

use crate::id::{MemberId, ProjectId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Two-step recommendation: one member recommends, another verifies.
///
/// Keyed by project. Every re-recommendation bumps `version` and clears the
/// verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FdarsRecommendation {
    pub project_id: ProjectId,
    pub recommended: bool,
    pub recommended_by: MemberId,
    pub recommended_at: Timestamp,
    pub verified: bool,
    pub verified_by: Option<MemberId>,
    pub verified_at: Option<Timestamp>,
    pub version: u64,
}

impl FdarsRecommendation {
    /// Apply a (re-)recommendation on top of `previous`.
    pub fn recommend(
        previous: Option<&FdarsRecommendation>,
        project_id: ProjectId,
        recommended: bool,
        by: MemberId,
        at: Timestamp,
    ) -> Self {
        Self {
            project_id,
            recommended,
            recommended_by: by,
            recommended_at: at,
            verified: false,
            verified_by: None,
            verified_at: None,
            version: previous.map_or(1, |p| p.version + 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_recommendation_clears_verification() {
        let project = ProjectId::new("prj-1");
        let mut first = FdarsRecommendation::recommend(
            None,
            project.clone(),
            true,
            MemberId::new("alice"),
            Timestamp::new(10),
        );
        assert_eq!(first.version, 1);
        first.verified = true;
        first.verified_by = Some(MemberId::new("bob"));

        let second = FdarsRecommendation::recommend(
            Some(&first),
            project,
            false,
            MemberId::new("carol"),
            Timestamp::new(20),
        );
        assert_eq!(second.version, 2);
        assert!(!second.verified);
        assert!(second.verified_by.is_none());
        assert_eq!(second.recommended_by, MemberId::new("carol"));
    }
}
