//! Application services - Use case implementations

mod company_service;

pub use company_service::{CompanyOverview, CompanyService, DesyncReport, Outcome, RelayKind};
