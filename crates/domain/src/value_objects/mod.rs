//! Value Objects - Immutable, identity-less domain primitives

mod eligibility;
mod identifiers;
mod notice;
mod world_position;

pub use eligibility::Eligibility;
pub use identifiers::{
    AccountId, CompanyId, CurrencyId, MemberId, PropertyId, SettlementId, StorageId,
};
pub use notice::{Notice, NoticeCategory, NoticeStyle};
pub use world_position::WorldPosition;
