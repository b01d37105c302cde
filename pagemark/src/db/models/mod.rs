//! Database record structures matching table schemas, grouped per entity.
//!
//! These are the request/response types at the repository boundary. API-layer
//! models convert from these; nothing above the repositories touches raw rows.

pub mod campaigns;
pub mod faqs;
pub mod pricing;
pub mod settings;
pub mod social_accounts;
pub mod sponsors;
pub mod subscriptions;
pub mod tickets;
pub mod users;
