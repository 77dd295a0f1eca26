//! Typed identifiers for everything the company core references
//!
//! Every external record (members, properties, accounts, settlements, ...) is
//! referenced by an opaque UUID. Wrapping each in its own type keeps a
//! `PropertyId` from ever being passed where a `MemberId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Parse an identifier from a string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Get the underlying UUID
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }

            /// First eight hex digits, used where a compact label is needed
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_identifier!(
    /// A company (the aggregate root)
    CompanyId
);
uuid_identifier!(
    /// A member of the world: a citizen, or a company's legal identity
    MemberId
);
uuid_identifier!(
    /// A property record (deed)
    PropertyId
);
uuid_identifier!(
    /// A financial account
    AccountId
);
uuid_identifier!(
    /// A settlement with its own citizenship roster
    SettlementId
);
uuid_identifier!(
    /// A unit of value issued by someone
    CurrencyId
);
uuid_identifier!(
    /// A shared storage container
    StorageId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_identifiers_are_unique() {
        assert_ne!(MemberId::new(), MemberId::new());
        assert_ne!(CompanyId::new(), CompanyId::new());
    }

    #[test]
    fn identifier_roundtrips_through_string() {
        let original = PropertyId::new();
        let parsed = PropertyId::parse(&original.to_string()).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn parse_invalid_returns_error() {
        assert!(AccountId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn from_uuid_trait() {
        let uuid = Uuid::new_v4();
        let id: SettlementId = uuid.into();
        assert_eq!(id.as_uuid(), uuid);
    }

    #[test]
    fn short_is_prefix_of_simple_form() {
        let uuid = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let id = PropertyId::from_uuid(uuid);
        assert_eq!(id.short(), "550e8400");
    }

    #[test]
    fn identifiers_order_by_uuid() {
        let low = MemberId::from_uuid(Uuid::from_u128(1));
        let high = MemberId::from_uuid(Uuid::from_u128(2));
        assert!(low < high);
    }

    #[test]
    fn serialization() {
        let id = CurrencyId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: CurrencyId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
