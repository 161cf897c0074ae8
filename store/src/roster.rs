//! Eligibility rosters and meeting attendance.
//!
//! Rosters are owned by the membership registry; the balloting core only
//! reads them, apart from recording who attended a meeting.

use crate::StoreError;
use arso_types::{MeetingId, MemberId, RosterKey};
use std::collections::BTreeSet;

pub trait RosterStore {
    /// Members eligible under `key`. Empty if no roster is known.
    fn eligible_members(&self, key: &RosterKey) -> Result<BTreeSet<MemberId>, StoreError>;

    fn meeting_attendees(&self, meeting: MeetingId) -> Result<BTreeSet<MemberId>, StoreError>;
}

pub trait RosterStoreMut: RosterStore {
    /// Record attendance. Recording the same member twice is a no-op.
    fn record_attendance(&mut self, meeting: MeetingId, member: &MemberId)
        -> Result<(), StoreError>;
}
