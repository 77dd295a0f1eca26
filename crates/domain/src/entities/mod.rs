//! Domain entities - Objects with identity and lifecycle

mod account;
mod company;
mod member;
mod property;
mod settlement;
mod storage;

pub use account::{Account, AccountKind};
pub use company::{
    Company, CompanyAssets, MembershipStatus, ShareholderHolding, headquarters_name,
    legal_identity_name, share_currency_name, treasury_account_name,
};
pub use member::{ActiveSpan, Member, SECONDS_PER_DAY};
pub use property::{PlotSizing, Property, PropertyKind, vehicle_transfer_name};
pub use settlement::Settlement;
pub use storage::SharedStorage;
