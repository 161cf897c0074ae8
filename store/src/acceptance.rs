//! Acceptance snapshot storage trait.

use crate::StoreError;
use arso_types::{Acceptance, ProjectId};

pub trait AcceptanceStore {
    /// The highest version for a project.
    fn latest_acceptance(&self, project: &ProjectId) -> Result<Option<Acceptance>, StoreError>;

    /// Every version for a project, oldest first.
    fn acceptance_history(&self, project: &ProjectId) -> Result<Vec<Acceptance>, StoreError>;
}

/// Implementations enforce a unique index on `(project_id, version)`.
pub trait AcceptanceStoreMut: AcceptanceStore {
    fn insert_acceptance(&mut self, acceptance: &Acceptance) -> Result<(), StoreError>;

    /// Overwrite an existing version. Fails with `NotFound` if absent.
    fn put_acceptance(&mut self, acceptance: &Acceptance) -> Result<(), StoreError>;
}
