//! Result of a side-effect-free eligibility check

use serde::{Deserialize, Serialize};

/// Whether an external policy allows something, with its reason when it doesn't
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Eligibility {
    Allowed,
    Denied(String),
}

impl Eligibility {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied(reason.into())
    }

    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The denial reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denied_carries_reason() {
        let e = Eligibility::denied("roster full");
        assert!(!e.is_allowed());
        assert_eq!(e.reason(), Some("roster full"));
        assert!(Eligibility::Allowed.is_allowed());
        assert_eq!(Eligibility::Allowed.reason(), None);
    }
}
