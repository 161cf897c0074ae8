//! Identifiers.
//!
//! Record ids (ballotings, votes, responses, acceptances, meetings) are
//! numeric and allocated by the store. Member and project ids are opaque
//! strings owned by the external membership and project registries.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

record_id!(
    /// Identifies a balloting round.
    BallotingId,
    "bal"
);
record_id!(
    /// Identifies a single vote.
    VoteId,
    "vote"
);
record_id!(
    /// Identifies an NSB response.
    NsbResponseId,
    "nsb"
);
record_id!(
    /// Identifies one version of an acceptance snapshot.
    AcceptanceId,
    "acc"
);
record_id!(
    /// Identifies a committee meeting.
    MeetingId,
    "mtg"
);

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the id is non-blank.
            pub fn is_valid(&self) -> bool {
                !self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

opaque_id!(
    /// A user or member body: voters, NSB responders, TC secretaries and
    /// anyone acting on the system.
    MemberId
);
opaque_id!(
    /// A standards-development project.
    ProjectId
);
