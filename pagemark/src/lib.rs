//! Pagemark: backend for a reading platform.
//!
//! The server renders a small public site and dashboard shell from embedded
//! assets and exposes a JSON API under `/api`. Every request — pages and API
//! alike — passes through the access control gate before routing: the gate
//! resolves the session cookie, matches the path against the declared route
//! tables, and either admits the request, redirects the browser, or answers
//! with a JSON error.
//!
//! # Architecture
//!
//! ```text
//! request ──▶ access gate ──▶ router ──▶ handler ──▶ repository ──▶ PostgreSQL
//!                │
//!                └─ deny: 303 redirect (pages) / 401·403 JSON (API)
//! ```
//!
//! State is explicit: [`AppState`] is constructed once at startup and handed
//! to every handler; there is no global client. [`Application`] owns the
//! lifecycle — pool construction, migrations, the initial admin account,
//! serving, and graceful shutdown.

pub mod api;
pub mod auth;
pub mod billing;
pub mod config;
pub mod db;
pub mod errors;
pub mod openapi;
pub mod pages;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Json,
    Router,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    api::handlers,
    auth::gate::{RouteTable, access_gate_middleware},
    billing::{BillingProvider, DummyBillingProvider},
    config::Config,
    db::{
        handlers::{Repository, Users},
        models::users::UserCreateDBRequest,
    },
    types::{Role, UserId},
};

/// Shared application state, constructed once and injected everywhere.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub routes: Arc<RouteTable>,
    pub billing: Arc<dyn BillingProvider>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> anyhow::Result<Self> {
        let routes = RouteTable::from_config(&config.access).map_err(|e| anyhow::anyhow!("invalid access configuration: {e}"))?;
        let billing: Arc<dyn BillingProvider> = Arc::new(DummyBillingProvider::new(&config.site_url));

        Ok(Self {
            db,
            routes: Arc::new(routes),
            billing,
            config,
        })
    }
}

/// Get the pagemark database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: an existing account with the configured email is left alone
/// apart from a password update when one is configured.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(
    email: &str,
    password: Option<&str>,
    password_config: &config::PasswordConfig,
    db: &PgPool,
) -> anyhow::Result<UserId> {
    let password_hash = password
        .map(|p| auth::password::hash_password(p, password_config))
        .transpose()
        .map_err(|e| anyhow::anyhow!("hash admin password: {e}"))?;

    let mut tx = db.begin().await?;
    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_by_email(email).await? {
        if let Some(hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE email = $2")
                .bind(hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing.id);
    }

    if password_hash.is_none() {
        warn!("admin account created without a password; set admin_password to enable login");
    }

    let admin = users
        .create(&UserCreateDBRequest {
            email: email.to_string(),
            username: email.to_string(),
            display_name: None,
            password_hash,
            role: Role::Admin,
        })
        .await?;

    tx.commit().await?;
    Ok(admin.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        origins.push(origin.parse::<HeaderValue>()?);
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .expose_headers(vec![axum::http::header::LOCATION]))
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the application router: API under `/api`, embedded pages elsewhere.
///
/// The access gate is NOT part of this router — it is layered around it ahead
/// of path matching (see [`Application::serve`]) so the gate also covers
/// fallback routes.
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api = Router::new()
        // Sessions and accounts
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/google/url", post(handlers::oauth::google_url))
        .route("/auth/kakao/url", post(handlers::oauth::kakao_url))
        // Public site data
        .route("/campaigns", get(handlers::campaigns::list_campaigns))
        .route("/campaigns/{id}", get(handlers::campaigns::get_campaign))
        .route("/campaigns/{id}/join", post(handlers::campaigns::join_campaign))
        .route("/campaigns/{id}/participation", get(handlers::campaigns::get_participation))
        .route("/campaigns/{id}/progress", post(handlers::campaigns::update_progress))
        .route("/faqs", get(handlers::faqs::list_faqs))
        .route("/pricing", get(handlers::pricing::list_pricing))
        .route("/sponsors", get(handlers::sponsors::list_sponsors))
        .route("/stats", get(handlers::settings::get_stats))
        // The signed-in user's resources
        .route("/me/social-accounts", get(handlers::social_accounts::list_social_accounts))
        .route("/me/social-accounts/{id}", delete(handlers::social_accounts::delete_social_account))
        .route("/me/subscription", get(handlers::subscriptions::get_subscription))
        .route("/subscriptions/checkout", post(handlers::subscriptions::checkout))
        .route("/subscriptions/cancel", post(handlers::subscriptions::cancel_subscription))
        .route(
            "/tickets",
            post(handlers::tickets::create_ticket).get(handlers::tickets::list_own_tickets),
        )
        // Admin management
        .route("/admin/campaigns", post(handlers::campaigns::create_campaign))
        .route(
            "/admin/campaigns/{id}",
            put(handlers::campaigns::update_campaign).delete(handlers::campaigns::delete_campaign),
        )
        .route(
            "/admin/faqs",
            get(handlers::faqs::list_all_faqs).post(handlers::faqs::create_faq),
        )
        .route("/admin/faqs/{id}", put(handlers::faqs::update_faq).delete(handlers::faqs::delete_faq))
        .route("/admin/pricing", post(handlers::pricing::create_tier))
        .route(
            "/admin/pricing/{id}",
            put(handlers::pricing::update_tier).delete(handlers::pricing::delete_tier),
        )
        .route("/admin/settings", get(handlers::settings::list_settings))
        .route(
            "/admin/settings/{key}",
            put(handlers::settings::upsert_setting).delete(handlers::settings::delete_setting),
        )
        .route("/admin/sponsors", post(handlers::sponsors::create_sponsor))
        .route("/admin/sponsors/{id}", delete(handlers::sponsors::delete_sponsor))
        .route("/admin/tickets", get(handlers::tickets::list_all_tickets))
        .route("/admin/tickets/{id}/status", put(handlers::tickets::update_ticket_status));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .merge(Scalar::with_url("/api/docs", openapi::ApiDoc::openapi()))
        .route("/", get(pages::index))
        .route("/signin", get(pages::signin))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/admin", get(pages::dashboard))
        .route("/401", get(pages::unauthorized))
        .route("/403", get(pages::forbidden))
        .route("/500", get(pages::server_error))
        .fallback(pages::not_found)
        .layer(create_cors_layer(&state.config)?)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    Ok(router)
}

/// The running application: state, router, and lifecycle.
pub struct Application {
    router: Router,
    state: AppState,
    config: Config,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = db::pools::create_pool(&config.database)?;

        migrator().run(&pool).await?;
        create_initial_admin_user(
            &config.admin_email,
            config.admin_password.as_deref(),
            &config.auth.password,
            &pool,
        )
        .await?;

        let state = AppState::new(pool, config.clone())?;
        let router = build_router(state.clone())?;

        Ok(Self { router, state, config })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("pagemark listening on http://{bind_addr}");

        // The gate wraps the router so it runs ahead of path matching
        let gate = from_fn_with_state(self.state.clone(), access_gate_middleware);
        let service = gate.layer(self.router);

        axum::serve(listener, axum::ServiceExt::into_make_service(service))
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("closing database connections");
        self.state.db.close().await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::models::users::CurrentUser,
        auth::session::{self, TokenKind},
    };
    use axum_test::TestServer;
    use uuid::Uuid;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.secret_key = Some("router-test-secret".to_string());
        config.auth.session.cookie_secure = false;
        config
    }

    /// Router with the gate layered the same way `serve` does it. The pool is
    /// lazy, so any route that avoids the database works without a server.
    fn test_server(config: Config) -> TestServer {
        let pool = db::pools::create_pool(&config.database).expect("lazy pool");
        let state = AppState::new(pool, config).expect("state");
        let router = build_router(state.clone()).expect("router");

        let gate = from_fn_with_state(state, access_gate_middleware);
        let service = gate.layer(router);
        TestServer::new(axum::ServiceExt::into_make_service(service)).expect("test server")
    }

    fn session_cookie_for(role: Role, config: &Config) -> String {
        let user = CurrentUser {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_string(),
            username: "reader".to_string(),
            role,
            display_name: None,
        };
        let token = session::create_session_token(&user, TokenKind::Access, config).expect("token");
        format!("{}={token}", config.auth.session.cookie_name)
    }

    #[test_log::test(tokio::test)]
    async fn health_endpoint_is_open() {
        let server = test_server(test_config());
        let response = server.get("/healthz").await;
        response.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn public_pages_pass_through_the_gate() {
        let server = test_server(test_config());
        let response = server.get("/").await;
        response.assert_status_ok();
        assert!(response.text().contains("Pagemark"));
    }

    #[test_log::test(tokio::test)]
    async fn protected_page_redirects_anonymous_to_signin_with_return_target() {
        let server = test_server(test_config());
        let response = server.get("/dashboard").await;

        response.assert_status_see_other();
        let location = response.header("location");
        assert_eq!(location.to_str().unwrap(), "/signin?next=%2Fdashboard");
    }

    #[test_log::test(tokio::test)]
    async fn protected_page_redirects_underprivileged_to_forbidden_page() {
        let config = test_config();
        let cookie = session_cookie_for(Role::Member, &config);
        let server = test_server(config);

        let response = server.get("/dashboard/admin").add_header("cookie", cookie).await;

        // Pages never get a raw 403 body, always the redirect
        response.assert_status_see_other();
        assert_eq!(response.header("location").to_str().unwrap(), "/403");
    }

    #[test_log::test(tokio::test)]
    async fn admin_page_admits_admins() {
        let config = test_config();
        let cookie = session_cookie_for(Role::Admin, &config);
        let server = test_server(config);

        let response = server.get("/dashboard/admin").add_header("cookie", cookie).await;
        response.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn protected_api_route_answers_401_json_for_anonymous() {
        let server = test_server(test_config());
        let response = server.get("/api/admin/tickets").await;

        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[test_log::test(tokio::test)]
    async fn protected_api_route_answers_403_json_for_underprivileged() {
        let config = test_config();
        let cookie = session_cookie_for(Role::Member, &config);
        let server = test_server(config);

        let response = server.get("/api/admin/tickets").add_header("cookie", cookie).await;

        response.assert_status_forbidden();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[test_log::test(tokio::test)]
    async fn garbage_session_cookie_is_treated_as_anonymous() {
        let config = test_config();
        let cookie = format!("{}=not.a.real.token", config.auth.session.cookie_name);
        let server = test_server(config);

        let response = server.get("/api/admin/tickets").add_header("cookie", cookie).await;
        response.assert_status_unauthorized();
    }

    #[test_log::test(tokio::test)]
    async fn unmatched_page_renders_the_404_page() {
        let server = test_server(test_config());
        let response = server.get("/no/such/page").await;

        response.assert_status_not_found();
        assert!(response.text().contains("404"));
    }

    #[test_log::test(tokio::test)]
    async fn unmatched_api_route_answers_json_404() {
        let server = test_server(test_config());
        let response = server.get("/api/no/such/endpoint").await;

        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], false);
    }

    #[test_log::test(tokio::test)]
    async fn oauth_initiation_with_credentials_returns_url() {
        let mut config = test_config();
        config.auth.oauth.google.client_id = Some("google-client-id".to_string());
        let server = test_server(config);

        let response = server
            .post("/api/auth/google/url")
            .json(&serde_json::json!({ "redirect": "/dashboard" }))
            .await;

        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        let url = body["url"].as_str().unwrap();
        assert!(url.starts_with("https://accounts.google.com/"));
        assert!(url.contains("state="));
    }

    #[test_log::test(tokio::test)]
    async fn oauth_initiation_without_credentials_is_a_500_error_payload() {
        let server = test_server(test_config());

        let response = server.post("/api/auth/kakao/url").json(&serde_json::json!({})).await;

        response.assert_status_internal_server_error();
        let body: serde_json::Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("kakao"));
    }

    #[test_log::test(tokio::test)]
    async fn logout_clears_both_session_cookies() {
        let server = test_server(test_config());
        let response = server.post("/api/auth/logout").await;

        response.assert_status_ok();
        let cleared: Vec<_> = response
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cleared.len(), 2);
        assert!(cleared.iter().all(|c| c.contains("Max-Age=0")));
    }
}
