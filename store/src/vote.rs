//! Vote storage trait.

use crate::StoreError;
use arso_types::{BallotingId, MemberId, ProjectId, Vote, VoteId};

/// Read access to votes.
pub trait VoteStore {
    fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError>;

    fn votes_for_balloting(&self, balloting: BallotingId) -> Result<Vec<Vote>, StoreError>;

    fn votes_by_member(&self, member: &MemberId) -> Result<Vec<Vote>, StoreError>;

    fn votes_for_project(&self, project: &ProjectId) -> Result<Vec<Vote>, StoreError>;

    fn count_votes(&self, balloting: BallotingId) -> Result<u64, StoreError>;
}

/// Write access to votes.
///
/// Implementations enforce a unique index on `(balloting_id, member_id)`:
/// the second insert for the same pair fails with [`StoreError::Duplicate`]
/// at write time, even under concurrent writers.
pub trait VoteStoreMut: VoteStore {
    fn insert_vote(&mut self, vote: &Vote) -> Result<(), StoreError>;

    /// Overwrite an existing vote. The unique key must not change.
    fn put_vote(&mut self, vote: &Vote) -> Result<(), StoreError>;

    fn delete_vote(&mut self, id: VoteId) -> Result<(), StoreError>;
}
