//! NSB response storage trait.

use crate::StoreError;
use arso_types::{NsbResponse, ProjectId};

pub trait NsbResponseStore {
    fn responses_for_project(&self, project: &ProjectId) -> Result<Vec<NsbResponse>, StoreError>;
}

/// Implementations enforce a unique index on `(project_id, responder_id)`.
pub trait NsbResponseStoreMut: NsbResponseStore {
    fn insert_response(&mut self, response: &NsbResponse) -> Result<(), StoreError>;
}
