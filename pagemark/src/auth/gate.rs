//! The access control gate.
//!
//! Every request is intercepted before routing and checked against two
//! statically declared route tables: one for browser-navigable pages and one
//! for API endpoints. The gate resolves the session cookie, finds the most
//! specific matching declaration (longest-prefix-match wins), and either
//! passes the request through, redirects the browser (pages), or
//! short-circuits with a JSON error body (API routes).
//!
//! Failure semantics are fail-closed: a malformed or expired session is
//! treated exactly like a missing one, and no declaration is ever resolved to
//! `Allow` because of an internal error. Routes with no declaration pass
//! through unconditionally.

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use tracing::{debug, trace};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session::{self, TokenKind},
    config::{AccessConfig, Config},
    types::Requirement,
};

/// A single compiled route declaration.
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub prefix: String,
    pub requirement: Requirement,
}

/// How a request path is classified before table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Page,
    Api,
}

/// Outcome of an access check. Never persisted; computed per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Unauthenticated,
    Forbidden,
}

/// The two immutable route tables plus the redirect targets the gate needs.
///
/// Built once at startup from configuration; unknown role strings and
/// duplicate prefixes are rejected there rather than at request time.
#[derive(Debug, Clone)]
pub struct RouteTable {
    pages: Vec<RouteRule>,
    api: Vec<RouteRule>,
    api_prefix: String,
    signin_path: String,
    forbidden_path: String,
}

impl RouteTable {
    /// Compile the configured route declarations into typed rules.
    pub fn from_config(access: &AccessConfig) -> Result<Self, String> {
        Ok(Self {
            pages: Self::compile(&access.pages, "pages")?,
            api: Self::compile(&access.api, "api")?,
            api_prefix: access.api_prefix.clone(),
            signin_path: access.signin_path.clone(),
            forbidden_path: access.forbidden_path.clone(),
        })
    }

    fn compile(declared: &[crate::config::RouteRuleConfig], table: &str) -> Result<Vec<RouteRule>, String> {
        let mut rules = Vec::with_capacity(declared.len());
        for decl in declared {
            if !decl.prefix.starts_with('/') {
                return Err(format!("{table} rule '{}': prefix must start with '/'", decl.prefix));
            }
            if rules.iter().any(|r: &RouteRule| r.prefix == decl.prefix) {
                return Err(format!("{table} rule '{}': duplicate prefix", decl.prefix));
            }
            let requirement = Requirement::parse(&decl.require).map_err(|e| format!("{table} rule '{}': {e}", decl.prefix))?;
            rules.push(RouteRule {
                prefix: decl.prefix.clone(),
                requirement,
            });
        }
        Ok(rules)
    }

    /// Classify a request path: API routes live under the API prefix,
    /// everything else is a page.
    pub fn classify(&self, path: &str) -> RouteClass {
        if prefix_matches(&self.api_prefix, path) {
            RouteClass::Api
        } else {
            RouteClass::Page
        }
    }

    /// Find the most specific declaration for a path in the table matching
    /// its class. Longest-prefix-match wins among overlapping declarations.
    pub fn match_rule(&self, path: &str) -> Option<&RouteRule> {
        let rules = match self.classify(path) {
            RouteClass::Api => &self.api,
            RouteClass::Page => &self.pages,
        };
        rules
            .iter()
            .filter(|rule| prefix_matches(&rule.prefix, path))
            .max_by_key(|rule| rule.prefix.len())
    }

    /// Compute the access decision for a path given the resolved session.
    /// Undeclared routes are allowed unconditionally.
    pub fn decide(&self, path: &str, session: Option<&CurrentUser>) -> AccessDecision {
        let Some(rule) = self.match_rule(path) else {
            return AccessDecision::Allow;
        };

        let role = session.map(|user| user.role);
        if rule.requirement.satisfied_by(role) {
            AccessDecision::Allow
        } else if role.is_none() {
            AccessDecision::Unauthenticated
        } else {
            AccessDecision::Forbidden
        }
    }

    pub fn signin_path(&self) -> &str {
        &self.signin_path
    }

    pub fn forbidden_path(&self) -> &str {
        &self.forbidden_path
    }
}

/// Whether `prefix` matches `path` on a path-segment boundary.
/// "/dashboard" matches "/dashboard" and "/dashboard/books" but not "/dashboards".
fn prefix_matches(prefix: &str, path: &str) -> bool {
    if let Some(rest) = path.strip_prefix(prefix) {
        rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/')
    } else {
        false
    }
}

/// Resolve the session from the access-token cookie.
///
/// Absent, malformed, and expired tokens all resolve to anonymous; no error
/// ever escapes here, so the gate can never fail open on a decode error.
pub fn resolve_session(headers: &HeaderMap, config: &Config) -> Option<CurrentUser> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    let token = session::cookie_value(cookie_header, &config.auth.session.cookie_name)?;

    match session::verify_session_token(token, TokenKind::Access, config) {
        Ok(user) => Some(user),
        Err(e) => {
            trace!("session cookie rejected, treating caller as anonymous: {e}");
            None
        }
    }
}

/// Gate middleware: intercept, decide, and either pass through or short-circuit.
pub async fn access_gate_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let session = resolve_session(request.headers(), &state.config);
    let decision = state.routes.decide(&path, session.as_ref());

    match decision {
        AccessDecision::Allow => next.run(request).await,
        AccessDecision::Unauthenticated | AccessDecision::Forbidden => {
            debug!(%path, ?decision, "access gate denied request");
            deny(&state.routes, &path, decision)
        }
    }
}

/// Render a denial: redirects for pages, JSON errors for API routes.
fn deny(routes: &RouteTable, path: &str, decision: AccessDecision) -> Response {
    match routes.classify(path) {
        RouteClass::Api => {
            let (status, message) = match decision {
                AccessDecision::Unauthenticated => (StatusCode::UNAUTHORIZED, "Authentication required"),
                _ => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            };
            (status, Json(json!({ "success": false, "message": message }))).into_response()
        }
        RouteClass::Page => {
            let target = match decision {
                AccessDecision::Unauthenticated => {
                    // Preserve the original path so sign-in can return the user
                    let next: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
                    format!("{}?next={}", routes.signin_path(), next)
                }
                _ => routes.forbidden_path().to_string(),
            };
            Redirect::to(&target).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteRuleConfig;
    use crate::types::Role;
    use uuid::Uuid;

    fn table(pages: Vec<RouteRuleConfig>, api: Vec<RouteRuleConfig>) -> RouteTable {
        let access = AccessConfig {
            pages,
            api,
            ..AccessConfig::default()
        };
        RouteTable::from_config(&access).expect("table should compile")
    }

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_string(),
            username: "reader".to_string(),
            role,
            display_name: None,
        }
    }

    #[test]
    fn undeclared_routes_are_allowed() {
        let table = table(vec![], vec![]);
        assert_eq!(table.decide("/about", None), AccessDecision::Allow);
        assert_eq!(table.decide("/api/faqs", None), AccessDecision::Allow);
    }

    #[test]
    fn restricted_page_without_session_is_unauthenticated() {
        let table = table(vec![RouteRuleConfig::new("/dashboard", "authenticated")], vec![]);
        assert_eq!(table.decide("/dashboard", None), AccessDecision::Unauthenticated);
        assert_eq!(table.decide("/dashboard/library", None), AccessDecision::Unauthenticated);
        assert_eq!(table.decide("/dashboard", Some(&user(Role::Member))), AccessDecision::Allow);
    }

    #[test]
    fn role_rule_forbids_lesser_roles() {
        let table = table(vec![], vec![RouteRuleConfig::new("/api/admin", "admin")]);
        assert_eq!(table.decide("/api/admin/users", Some(&user(Role::Member))), AccessDecision::Forbidden);
        assert_eq!(table.decide("/api/admin/users", Some(&user(Role::Admin))), AccessDecision::Allow);
        assert_eq!(table.decide("/api/admin/users", None), AccessDecision::Unauthenticated);
    }

    #[test]
    fn longest_prefix_match_wins() {
        let table = table(
            vec![
                RouteRuleConfig::new("/dashboard", "authenticated"),
                RouteRuleConfig::new("/dashboard/admin", "admin"),
            ],
            vec![],
        );

        // Generic rule applies outside the more specific subtree
        assert_eq!(table.decide("/dashboard/books", Some(&user(Role::Member))), AccessDecision::Allow);
        // The longer declaration overrides the shorter one
        assert_eq!(table.decide("/dashboard/admin", Some(&user(Role::Member))), AccessDecision::Forbidden);
        assert_eq!(
            table.decide("/dashboard/admin/settings", Some(&user(Role::Member))),
            AccessDecision::Forbidden
        );
        assert_eq!(table.decide("/dashboard/admin", Some(&user(Role::Admin))), AccessDecision::Allow);
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let forward = table(
            vec![
                RouteRuleConfig::new("/dashboard", "admin"),
                RouteRuleConfig::new("/dashboard/reading", "authenticated"),
            ],
            vec![],
        );
        let reversed = table(
            vec![
                RouteRuleConfig::new("/dashboard/reading", "authenticated"),
                RouteRuleConfig::new("/dashboard", "admin"),
            ],
            vec![],
        );

        for t in [&forward, &reversed] {
            assert_eq!(t.decide("/dashboard/reading/log", Some(&user(Role::Member))), AccessDecision::Allow);
            assert_eq!(t.decide("/dashboard/settings", Some(&user(Role::Member))), AccessDecision::Forbidden);
        }
    }

    #[test]
    fn prefix_matching_respects_segment_boundaries() {
        assert!(prefix_matches("/dashboard", "/dashboard"));
        assert!(prefix_matches("/dashboard", "/dashboard/books"));
        assert!(!prefix_matches("/dashboard", "/dashboards"));
        assert!(prefix_matches("/", "/anything"));
    }

    #[test]
    fn public_rule_overrides_broader_restriction() {
        let table = table(
            vec![],
            vec![
                RouteRuleConfig::new("/api/admin", "admin"),
                RouteRuleConfig::new("/api/admin/health", "public"),
            ],
        );
        assert_eq!(table.decide("/api/admin/health", None), AccessDecision::Allow);
        assert_eq!(table.decide("/api/admin/users", None), AccessDecision::Unauthenticated);
    }

    #[test]
    fn duplicate_and_unknown_declarations_rejected_at_startup() {
        let access = AccessConfig {
            pages: vec![
                RouteRuleConfig::new("/dashboard", "authenticated"),
                RouteRuleConfig::new("/dashboard", "admin"),
            ],
            ..AccessConfig::default()
        };
        assert!(RouteTable::from_config(&access).is_err());

        let access = AccessConfig {
            api: vec![RouteRuleConfig::new("/api/admin", "superuser")],
            ..AccessConfig::default()
        };
        assert!(RouteTable::from_config(&access).is_err());
    }

    #[test]
    fn api_routes_are_classified_by_prefix() {
        let table = table(vec![], vec![]);
        assert_eq!(table.classify("/api/campaigns"), RouteClass::Api);
        assert_eq!(table.classify("/apiary"), RouteClass::Page);
        assert_eq!(table.classify("/dashboard"), RouteClass::Page);
    }
}
