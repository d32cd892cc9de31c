//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table, and its wire name
//! matches the `name` column.

use crate::types::StatusId;

/// Declare a status enum backed by a lookup table.
///
/// Generates `id()`, `from_id()`, `as_str()`, `parse()` and serde impls that
/// use the wire name.
macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:literal => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Every variant in lookup-table order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Map a database status ID back to the enum.
            pub fn from_id(id: StatusId) -> Option<Self> {
                match id {
                    $( $val => Some(Self::$variant), )+
                    _ => None,
                }
            }

            /// Stable wire name, e.g. `"PENDING"`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $wire, )+
                }
            }

            /// Parse a wire name (case-insensitive).
            pub fn parse(s: &str) -> Option<Self> {
                $(
                    if s.eq_ignore_ascii_case($wire) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} '{raw}'",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

define_status_enum! {
    /// Lifecycle of a single scan execution.
    ScanStatus {
        Pending = 1 => "PENDING",
        Running = 2 => "RUNNING",
        Completed = 3 => "COMPLETED",
        Failed = 4 => "FAILED",
        Cancelled = 5 => "CANCELLED",
    }
}

define_status_enum! {
    /// Review state of a flagged candidate.
    ReviewStatus {
        Pending = 1 => "PENDING",
        Approved = 2 => "APPROVED",
        Rejected = 3 => "REJECTED",
        Deleted = 4 => "DELETED",
    }
}
