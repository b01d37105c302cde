//! OpenAPI document assembled from the handler path annotations.

use utoipa::OpenApi;

use crate::api::{handlers, models};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pagemark API",
        description = "Reading platform backend: auth, campaigns, billing, support."
    ),
    servers((url = "/api")),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::refresh,
        handlers::auth::me,
        handlers::oauth::google_url,
        handlers::oauth::kakao_url,
        handlers::campaigns::list_campaigns,
        handlers::campaigns::get_campaign,
        handlers::campaigns::join_campaign,
        handlers::campaigns::get_participation,
        handlers::campaigns::update_progress,
        handlers::campaigns::create_campaign,
        handlers::campaigns::update_campaign,
        handlers::campaigns::delete_campaign,
        handlers::faqs::list_faqs,
        handlers::faqs::list_all_faqs,
        handlers::faqs::create_faq,
        handlers::faqs::update_faq,
        handlers::faqs::delete_faq,
        handlers::pricing::list_pricing,
        handlers::pricing::create_tier,
        handlers::pricing::update_tier,
        handlers::pricing::delete_tier,
        handlers::settings::get_stats,
        handlers::settings::list_settings,
        handlers::settings::upsert_setting,
        handlers::settings::delete_setting,
        handlers::sponsors::list_sponsors,
        handlers::sponsors::create_sponsor,
        handlers::sponsors::delete_sponsor,
        handlers::social_accounts::list_social_accounts,
        handlers::social_accounts::delete_social_account,
        handlers::tickets::create_ticket,
        handlers::tickets::list_own_tickets,
        handlers::tickets::list_all_tickets,
        handlers::tickets::update_ticket_status,
        handlers::subscriptions::get_subscription,
        handlers::subscriptions::checkout,
        handlers::subscriptions::cancel_subscription,
    ),
    components(schemas(
        models::users::CurrentUser,
        models::users::UserResponse,
        models::auth::RegisterRequest,
        models::auth::LoginRequest,
        models::auth::OauthUrlRequest,
        models::auth::OauthUrlResponse,
        models::campaigns::CampaignResponse,
        models::campaigns::CampaignCreateRequest,
        models::campaigns::CampaignUpdateRequest,
        models::campaigns::ParticipationResponse,
        models::campaigns::ProgressUpdateRequest,
        models::faqs::FaqResponse,
        models::faqs::FaqCreateRequest,
        models::faqs::FaqUpdateRequest,
        models::pricing::PricingTierResponse,
        models::pricing::PricingTierCreateRequest,
        models::pricing::PricingTierUpdateRequest,
        models::settings::SettingResponse,
        models::settings::SettingUpsertRequest,
        models::settings::StatsResponse,
        models::sponsors::SponsorResponse,
        models::sponsors::SponsorCreateRequest,
        models::social_accounts::SocialAccountResponse,
        models::tickets::TicketResponse,
        models::tickets::TicketCreateRequest,
        models::tickets::TicketStatus,
        models::tickets::TicketStatusUpdateRequest,
        models::subscriptions::SubscriptionResponse,
        models::subscriptions::SubscriptionStatus,
        models::subscriptions::CheckoutRequest,
        models::subscriptions::CheckoutResponse,
        crate::types::Role,
    )),
    tags(
        (name = "auth", description = "Sessions, registration, OAuth initiation"),
        (name = "campaigns", description = "Reading campaigns and participation"),
        (name = "faqs", description = "Frequently asked questions"),
        (name = "pricing", description = "Pricing tiers"),
        (name = "settings", description = "Site settings and public stats"),
        (name = "sponsors", description = "Sponsors"),
        (name = "account", description = "The signed-in user's account"),
        (name = "tickets", description = "Support tickets"),
        (name = "subscriptions", description = "Subscriptions and checkout"),
        (name = "admin", description = "Admin-only management endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_lists_core_paths() {
        let doc = ApiDoc::openapi();
        let json = doc.to_json().expect("document should serialize");
        for path in ["/auth/login", "/campaigns", "/admin/settings/{key}", "/auth/google/url"] {
            assert!(json.contains(path), "missing path {path}");
        }
    }
}
