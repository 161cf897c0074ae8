//! FDARS recommendation storage trait.

use crate::StoreError;
use arso_types::{FdarsRecommendation, ProjectId};

pub trait FdarsStore {
    fn get_fdars(&self, project: &ProjectId) -> Result<Option<FdarsRecommendation>, StoreError>;
}

pub trait FdarsStoreMut: FdarsStore {
    /// Insert or replace the recommendation for its project.
    fn put_fdars(&mut self, recommendation: &FdarsRecommendation) -> Result<(), StoreError>;
}
