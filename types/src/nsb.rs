//! National Standards Body responses on a project.

use crate::error::TypesError;
use crate::id::{MemberId, NsbResponseId, ProjectId};
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NsbResponseType {
    ApproveNoComment,
    ApproveWithComment,
    Disapprove,
}

impl NsbResponseType {
    pub const ALL: [NsbResponseType; 3] = [
        Self::ApproveNoComment,
        Self::ApproveWithComment,
        Self::Disapprove,
    ];

    /// Both approval variants count towards acceptance.
    pub fn is_approval(&self) -> bool {
        matches!(self, Self::ApproveNoComment | Self::ApproveWithComment)
    }

    /// Response types that must carry a non-empty comment.
    pub fn requires_comment(&self) -> bool {
        matches!(self, Self::ApproveWithComment | Self::Disapprove)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApproveNoComment => "approve-no-comment",
            Self::ApproveWithComment => "approve-with-comment",
            Self::Disapprove => "disapprove",
        }
    }
}

impl fmt::Display for NsbResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NsbResponseType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "approve-no-comment" | "approve-without-comment" => Ok(Self::ApproveNoComment),
            "approve-with-comment" | "approve-with-comments" => Ok(Self::ApproveWithComment),
            "disapprove" => Ok(Self::Disapprove),
            _ => Err(TypesError::InvalidResponseType(s.to_string())),
        }
    }
}

/// One NSB's response on a project. Unique per (project, responder).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NsbResponse {
    pub id: NsbResponseId,
    pub project_id: ProjectId,
    pub responder_id: MemberId,
    pub response_type: NsbResponseType,
    pub comments: String,
    pub submitted_at: Timestamp,
}

/// Caller-supplied fields of a new response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewNsbResponse {
    pub project_id: ProjectId,
    pub responder_id: MemberId,
    pub response_type: NsbResponseType,
    pub comments: String,
}

/// Count responses by type. Every type is present in the result, zero if unseen.
pub fn count_by_type<'a>(
    responses: impl IntoIterator<Item = &'a NsbResponse>,
) -> BTreeMap<NsbResponseType, u64> {
    let mut counts: BTreeMap<_, _> = NsbResponseType::ALL.iter().map(|t| (*t, 0)).collect();
    for response in responses {
        *counts.entry(response.response_type).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_spellings() {
        assert_eq!(
            "Approve_With_Comment".parse::<NsbResponseType>(),
            Ok(NsbResponseType::ApproveWithComment)
        );
        assert_eq!(
            "approve no comment".parse::<NsbResponseType>(),
            Ok(NsbResponseType::ApproveNoComment)
        );
        assert!("reject".parse::<NsbResponseType>().is_err());
    }

    #[test]
    fn approvals_and_comment_rules() {
        assert!(NsbResponseType::ApproveNoComment.is_approval());
        assert!(NsbResponseType::ApproveWithComment.is_approval());
        assert!(!NsbResponseType::Disapprove.is_approval());

        assert!(!NsbResponseType::ApproveNoComment.requires_comment());
        assert!(NsbResponseType::Disapprove.requires_comment());
    }

    #[test]
    fn count_by_type_fills_missing_types() {
        let counts = count_by_type([]);
        assert_eq!(counts.len(), 3);
        assert!(counts.values().all(|c| *c == 0));
    }
}
