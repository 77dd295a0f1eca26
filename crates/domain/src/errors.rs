//! Domain-level errors

use thiserror::Error;

/// Broad classification of a failure, used by callers to decide how to report it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller lacks the role the operation requires
    Authorization,
    /// The roster or ownership state does not allow the transition
    StateConflict,
    /// An external validator refused the transition
    ExternalRejection,
    /// Recorded state disagreed with its source of truth
    IntegrityDesync,
    /// An expected external record or hook could not be resolved
    InternalLookup,
    /// Anything else
    Other,
}

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::InternalLookup,
            Self::NotPermitted(_) => ErrorKind::Authorization,
            Self::ValidationError(_) => ErrorKind::Other,
        }
    }
}

/// Membership transition failures
///
/// Every variant carries the display names needed to render the message the
/// invoking player sees, so callers never have to reformat them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompanyError {
    /// Invoker is not the company's leader
    #[error("Couldn't {action} as you are not the CEO of {company}")]
    NotAuthorized { action: String, company: String },

    /// Target already holds an invitation
    #[error("Couldn't invite {target} to {company} as they are already invited")]
    AlreadyInvited { target: String, company: String },

    /// Target is already the leader or a member
    #[error("Couldn't invite {target} to {company} as they are already an employee")]
    AlreadyEmployed { target: String, company: String },

    /// Target holds no invitation
    #[error("Couldn't {action} as {target} has not been invited to {company}")]
    NotInvited {
        action: String,
        target: String,
        company: String,
    },

    /// Target is not an employee
    #[error("Couldn't {action} as {target} is not an employee of {company}")]
    NotEmployed {
        action: String,
        target: String,
        company: String,
    },

    /// Target is the leader, who can neither resign nor be fired
    #[error("Couldn't {action} as {target} is the CEO of {company}")]
    IsLeader {
        action: String,
        target: String,
        company: String,
    },

    /// Target already works for another company
    #[error(
        "Couldn't join {company} as you are already employed by {employer}. You must leave {employer} before joining {company}."
    )]
    AlreadyEmployedElsewhere { company: String, employer: String },

    /// Target holds a personal homestead while property limits are enforced
    #[error(
        "Couldn't join {company} as you have a homestead deed. You must remove {homestead} before joining {company}."
    )]
    PropertyConflict { company: String, homestead: String },
}

impl CompanyError {
    /// Stable short code for this failure
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotAuthorized { .. } => "NotAuthorized",
            Self::AlreadyInvited { .. } => "AlreadyInvited",
            Self::AlreadyEmployed { .. } => "AlreadyEmployed",
            Self::NotInvited { .. } => "NotInvited",
            Self::NotEmployed { .. } => "NotEmployed",
            Self::IsLeader { .. } => "IsLeader",
            Self::AlreadyEmployedElsewhere { .. } => "AlreadyEmployedElsewhere",
            Self::PropertyConflict { .. } => "PropertyConflict",
        }
    }

    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAuthorized { .. } => ErrorKind::Authorization,
            _ => ErrorKind::StateConflict,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("Company", "123");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Company");
                assert_eq!(id, "123");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("Property", "abc");
        assert_eq!(err.to_string(), "Property not found: abc");
        assert_eq!(err.kind(), ErrorKind::InternalLookup);
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("name is empty".to_string());
        assert_eq!(err.to_string(), "Validation failed: name is empty");
    }

    #[test]
    fn not_authorized_is_authorization_kind() {
        let err = CompanyError::NotAuthorized {
            action: "invite Bob to Acme".to_string(),
            company: "Acme".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert_eq!(err.code(), "NotAuthorized");
        assert_eq!(
            err.to_string(),
            "Couldn't invite Bob to Acme as you are not the CEO of Acme"
        );
    }

    #[test]
    fn roster_conflicts_are_state_conflicts() {
        let errors = [
            CompanyError::AlreadyInvited {
                target: "Bob".into(),
                company: "Acme".into(),
            },
            CompanyError::IsLeader {
                action: "resign from Acme".into(),
                target: "Alice".into(),
                company: "Acme".into(),
            },
            CompanyError::PropertyConflict {
                company: "Acme".into(),
                homestead: "Bob's Home".into(),
            },
        ];
        for err in errors {
            assert_eq!(err.kind(), ErrorKind::StateConflict);
        }
    }

    #[test]
    fn already_invited_code() {
        let err = CompanyError::AlreadyInvited {
            target: "Bob".into(),
            company: "Acme".into(),
        };
        assert_eq!(err.code(), "AlreadyInvited");
        assert_eq!(
            err.to_string(),
            "Couldn't invite Bob to Acme as they are already invited"
        );
    }
}
