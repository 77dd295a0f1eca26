//! Domain layer for the company core
//!
//! Contains the company aggregate, the world records it references, the
//! actions it submits, and the pure entitlement and reputation arithmetic.
//! This layer has no I/O and defines the ubiquitous language.

pub mod actions;
pub mod entities;
pub mod entitlement;
pub mod errors;
pub mod reputation;
pub mod value_objects;

pub use actions::{ActionPack, ActionVerdict, GameAction, MoneyTransfer, OwnerChangeKind};
pub use entities::*;
pub use entitlement::headquarters_entitlement;
pub use errors::{CompanyError, DomainError, ErrorKind};
pub use reputation::{
    AggregatedReputation, Polarity, ReputationSample, ReputationSource, aggregate_reputation,
};
pub use value_objects::*;
