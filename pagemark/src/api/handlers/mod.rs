//! API request handlers.
//!
//! Authorization is the gate's job; handlers assume the caller has already
//! been admitted and only enforce resource ownership and business rules.

pub mod auth;
pub mod campaigns;
pub mod faqs;
pub mod oauth;
pub mod pricing;
pub mod settings;
pub mod social_accounts;
pub mod sponsors;
pub mod subscriptions;
pub mod tickets;
