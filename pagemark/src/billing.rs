//! Billing provider seam.
//!
//! Checkout is delegated to an external billing provider behind this trait.
//! The in-tree implementation settles the checkout immediately so the
//! subscription flow works end to end without a payment processor; a real
//! provider integration plugs in here without touching the handlers.

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    api::models::users::CurrentUser,
    db::models::pricing::PricingTierDBResponse,
    errors::{Error, Result},
};

/// Outcome of starting a checkout with the provider.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    /// URL the browser should be sent to.
    pub url: String,
    /// True when the provider completed payment synchronously, in which case
    /// the caller activates the subscription right away instead of waiting
    /// for a provider callback.
    pub settled: bool,
}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn create_checkout(&self, user: &CurrentUser, tier: &PricingTierDBResponse) -> Result<CheckoutSession>;
}

/// Stand-in provider used until a real payment processor is wired up.
/// Every checkout settles immediately.
#[derive(Debug, Clone)]
pub struct DummyBillingProvider {
    checkout_base: String,
}

impl DummyBillingProvider {
    pub fn new(site_url: &str) -> Self {
        Self {
            checkout_base: format!("{}/checkout", site_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl BillingProvider for DummyBillingProvider {
    #[instrument(skip(self, user, tier), fields(tier = %tier.name))]
    async fn create_checkout(&self, user: &CurrentUser, tier: &PricingTierDBResponse) -> Result<CheckoutSession> {
        if !tier.active {
            return Err(Error::BadRequest {
                message: "This pricing tier is not available".to_string(),
            });
        }
        Ok(CheckoutSession {
            url: format!("{}/{}?user={}", self.checkout_base, tier.id, user.id),
            settled: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn tier(active: bool) -> PricingTierDBResponse {
        PricingTierDBResponse {
            id: Uuid::new_v4(),
            name: "Reader Plus".to_string(),
            description: None,
            price_cents: 4900,
            currency: "KRW".to_string(),
            interval: "month".to_string(),
            features: vec![],
            position: 0,
            active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_string(),
            username: "reader".to_string(),
            role: Role::Member,
            display_name: None,
        }
    }

    #[tokio::test]
    async fn checkout_url_embeds_tier_and_user() {
        let provider = DummyBillingProvider::new("https://pagemark.example.com/");
        let tier = tier(true);
        let user = user();

        let session = provider.create_checkout(&user, &tier).await.unwrap();
        assert!(session.url.starts_with("https://pagemark.example.com/checkout/"));
        assert!(session.url.contains(&tier.id.to_string()));
        assert!(session.url.contains(&user.id.to_string()));
    }

    #[tokio::test]
    async fn dummy_checkout_settles_immediately() {
        let provider = DummyBillingProvider::new("https://pagemark.example.com");
        let session = provider.create_checkout(&user(), &tier(true)).await.unwrap();
        assert!(session.settled);
    }

    #[tokio::test]
    async fn inactive_tier_is_rejected() {
        let provider = DummyBillingProvider::new("https://pagemark.example.com");
        let result = provider.create_checkout(&user(), &tier(false)).await;
        assert!(matches!(result.unwrap_err(), Error::BadRequest { .. }));
    }
}
