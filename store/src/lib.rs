//! Abstract storage traits for standards balloting.
//!
//! Every storage backend (relational database, in-memory for testing)
//! implements these traits. The rest of the codebase depends only on the
//! traits.
//!
//! All access goes through a transaction obtained from an [`Environment`].
//! Write transactions must be serializable with respect to each other, and
//! a write transaction dropped without [`WriteTxn::commit`] is rolled back.

pub mod acceptance;
pub mod balloting;
pub mod error;
pub mod fdars;
pub mod nsb_response;
pub mod roster;
pub mod vote;

pub use acceptance::{AcceptanceStore, AcceptanceStoreMut};
pub use balloting::{BallotingStore, BallotingStoreMut};
pub use error::StoreError;
pub use fdars::{FdarsStore, FdarsStoreMut};
pub use nsb_response::{NsbResponseStore, NsbResponseStoreMut};
pub use roster::{RosterStore, RosterStoreMut};
pub use vote::{VoteStore, VoteStoreMut};

/// Read-only view over every record store.
pub trait ReadTxn:
    BallotingStore + VoteStore + NsbResponseStore + AcceptanceStore + FdarsStore + RosterStore
{
}

/// Writable transaction handle (extends ReadTxn).
pub trait WriteTxn:
    ReadTxn
    + BallotingStoreMut
    + VoteStoreMut
    + NsbResponseStoreMut
    + AcceptanceStoreMut
    + FdarsStoreMut
    + RosterStoreMut
{
    /// Allocate the next record id. Ids are never reused, even if the
    /// transaction that allocated them rolls back.
    fn next_id(&mut self) -> Result<u64, StoreError>;

    /// Make every write in this transaction durable and visible.
    fn commit(self) -> Result<(), StoreError>
    where
        Self: Sized;
}

/// A storage environment that hands out transactions.
pub trait Environment: Send + Sync {
    type Read<'a>: ReadTxn
    where
        Self: 'a;
    type Write<'a>: WriteTxn
    where
        Self: 'a;

    fn read_txn(&self) -> Result<Self::Read<'_>, StoreError>;

    fn write_txn(&self) -> Result<Self::Write<'_>, StoreError>;
}
