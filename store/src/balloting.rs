//! Balloting storage trait.

use crate::StoreError;
use arso_types::{Balloting, BallotingId, ProjectId};

/// Read access to balloting rounds.
pub trait BallotingStore {
    fn get_balloting(&self, id: BallotingId) -> Result<Option<Balloting>, StoreError>;

    /// All ballotings of a project, in id order.
    fn ballotings_for_project(&self, project: &ProjectId) -> Result<Vec<Balloting>, StoreError>;

    /// Every stored balloting, in id order.
    fn iter_ballotings(&self) -> Result<Vec<Balloting>, StoreError>;
}

/// Write access to balloting rounds.
pub trait BallotingStoreMut: BallotingStore {
    /// Insert a new balloting. Fails with `Duplicate` if the id is taken.
    fn insert_balloting(&mut self, balloting: &Balloting) -> Result<(), StoreError>;

    /// Overwrite an existing balloting. Fails with `NotFound` if absent.
    fn put_balloting(&mut self, balloting: &Balloting) -> Result<(), StoreError>;

    fn delete_balloting(&mut self, id: BallotingId) -> Result<(), StoreError>;
}
