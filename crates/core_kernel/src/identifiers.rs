//! Strongly-typed identifiers for domain entities
//!
//! Three families of identifiers exist in the warranty system:
//!
//! - UUID-backed identifiers for records the workflow creates itself
//!   (appointments, reports, comments, finalize attempts)
//! - Numeric identifiers issued by collaborating systems (service centers,
//!   warehouses, campaigns, staff, catalog parts)
//! - Code identifiers that are natural keys (part numbers, VINs)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

macro_rules! define_numeric_id {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name($inner);

        impl $name {
            /// Wraps a raw numeric identifier
            pub const fn new(value: $inner) -> Self {
                Self(value)
            }

            /// Returns the raw numeric value
            pub const fn get(&self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

macro_rules! define_code {
    ($name:ident, $normalize:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates the code, trimming surrounding whitespace
            pub fn new(value: impl AsRef<str>) -> Self {
                let normalize: fn(&str) -> String = $normalize;
                Self(normalize(value.as_ref().trim()))
            }

            /// Returns the code as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns true if the code is empty after trimming
            pub fn is_blank(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

// Workflow-issued identifiers
define_id!(AppointmentId, "APT");
define_id!(ReportId, "RPT");
define_id!(CommentId, "CMT");
define_id!(FinalizeAttemptId, "FIN");

// Identifiers issued by collaborating systems
define_numeric_id!(CenterId, u32);
define_numeric_id!(WarehouseId, u32);
define_numeric_id!(CampaignId, u64);
define_numeric_id!(StaffId, u64);
define_numeric_id!(PartId, u64);

// Natural keys
define_code!(PartNumber, |s| s.to_string());
define_code!(Vin, |s| s.to_ascii_uppercase());

impl WarehouseId {
    /// Returns true if this warehouse is the stock room of the given service center
    pub fn belongs_to(&self, center: CenterId) -> bool {
        self.0 == center.get()
    }
}

impl From<CenterId> for WarehouseId {
    fn from(center: CenterId) -> Self {
        WarehouseId(center.get())
    }
}
