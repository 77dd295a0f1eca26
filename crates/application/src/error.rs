//! Application-level errors

use domain::{CompanyError, DomainError, ErrorKind};
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A membership transition was refused by the company's own rules
    #[error(transparent)]
    Company(#[from] CompanyError),

    /// The action pipeline or a settlement policy refused the transition
    #[error("{0}")]
    Rejected(String),

    /// An expected external record or hook could not be resolved
    #[error("Internal lookup failed: {0}")]
    InternalLookup(String),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(e) => e.kind(),
            Self::Company(e) => e.kind(),
            Self::Rejected(_) => ErrorKind::ExternalRejection,
            Self::InternalLookup(_) | Self::NotFound(_) => ErrorKind::InternalLookup,
            Self::ExternalService(_) | Self::Configuration(_) | Self::Internal(_) => {
                ErrorKind::Other
            },
        }
    }

    /// Message safe to show to the player who invoked the operation
    ///
    /// Lookup failures are reported generically; their details only go to the logs.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::InternalLookup | ErrorKind::Other => {
                "The operation failed due to an internal error".to_string()
            },
            _ => self.to_string(),
        }
    }

    pub fn not_found(entity_type: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{entity_type} {id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn company_errors_keep_their_kind() {
        let err: ApplicationError = CompanyError::AlreadyInvited {
            target: "Bob".into(),
            company: "Acme".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::StateConflict);
        assert_eq!(
            err.user_message(),
            "Couldn't invite Bob to Acme as they are already invited"
        );
    }

    #[test]
    fn rejection_message_is_verbatim() {
        let err = ApplicationError::Rejected("Roster is full".into());
        assert_eq!(err.kind(), ErrorKind::ExternalRejection);
        assert_eq!(err.to_string(), "Roster is full");
    }

    #[test]
    fn lookup_failures_are_masked_for_users() {
        let err = ApplicationError::InternalLookup("plot hook missing".into());
        assert_eq!(
            err.user_message(),
            "The operation failed due to an internal error"
        );
        assert!(err.to_string().contains("plot hook missing"));
    }

    #[test]
    fn domain_not_found_is_lookup() {
        let err: ApplicationError = DomainError::not_found("Property", "x").into();
        assert_eq!(err.kind(), ErrorKind::InternalLookup);
    }
}
