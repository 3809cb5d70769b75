use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Creates an identifier from a stored numeric key.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying numeric key.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a user record.
    UserId
);
entity_id!(
    /// Unique identifier for a role record.
    RoleId
);
entity_id!(
    /// Unique identifier for a permission record.
    PermissionId
);
entity_id!(
    /// Unique identifier for a document record.
    DocumentId
);

#[cfg(test)]
mod tests {
    use super::{RoleId, UserId};

    #[test]
    fn ids_display_as_plain_numbers() {
        assert_eq!(UserId::new(42).to_string(), "42");
    }

    #[test]
    fn ids_order_by_numeric_value() {
        assert!(RoleId::new(2) < RoleId::new(10));
    }
}
