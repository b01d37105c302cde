//! Repository implementations, one per table.

pub mod campaigns;
pub mod faqs;
pub mod pricing;
pub mod repository;
pub mod settings;
pub mod social_accounts;
pub mod sponsors;
pub mod subscriptions;
pub mod tickets;
pub mod users;

pub use campaigns::Campaigns;
pub use faqs::Faqs;
pub use pricing::PricingTiers;
pub use repository::Repository;
pub use settings::Settings;
pub use social_accounts::SocialAccounts;
pub use sponsors::Sponsors;
pub use subscriptions::Subscriptions;
pub use tickets::Tickets;
pub use users::Users;
