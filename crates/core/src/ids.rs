//! Backend Identifiers
//!
//! Records owned by the backend (accounts, groups, members, payments) are
//! addressed by numeric ids. Each gets its own newtype so a payment id can
//! never be handed to an endpoint expecting a member id.

use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! backend_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw backend identifier.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the raw backend identifier.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                value.trim().parse().map(Self)
            }
        }
    };
}

backend_id!(
    /// Donation account (catalog entry) identifier.
    AccountId
);

backend_id!(
    /// Donation account group identifier.
    GroupId
);

backend_id!(
    /// Member record identifier.
    MemberId
);

backend_id!(
    /// Recorded payment identifier.
    PaymentId
);
