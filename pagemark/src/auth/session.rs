//! JWT session token creation and verification.
//!
//! Sessions are a token pair: a short-lived access token and a long-lived
//! refresh token, distinguished by the `typ` claim so one can never be
//! replayed as the other.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    api::models::users::CurrentUser,
    config::Config,
    errors::Error,
    types::{Role, UserId},
};

/// Which half of the session token pair a JWT represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,    // Subject (user ID)
    pub email: String,  // User email
    pub role: Role,     // User role
    pub typ: TokenKind, // Access or refresh token
    pub exp: i64,       // Expiration time
    pub iat: i64,       // Issued at
}

impl SessionClaims {
    /// Create new session claims for a user
    pub fn new(user: &CurrentUser, kind: TokenKind, config: &Config) -> Self {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => config.auth.session.access_ttl,
            TokenKind::Refresh => config.auth.session.refresh_ttl,
        };
        let exp = now + ttl;

        Self {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            typ: kind,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
            username: String::new(), // Not stored in the token
            display_name: None,      // Not stored in the token
        }
    }
}

/// Create a JWT session token of the given kind for a user
pub fn create_session_token(user: &CurrentUser, kind: TokenKind, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(user, kind, config);
    let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Misconfigured {
        setting: "secret_key".to_string(),
    })?;

    let key = EncodingKey::from_secret(secret_key.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create session token: {e}"),
    })
}

/// Verify and decode a JWT session token, requiring the expected token kind.
///
/// A refresh token presented where an access token is expected (or vice versa)
/// is rejected as unauthenticated.
pub fn verify_session_token(token: &str, expected: TokenKind, config: &Config) -> Result<CurrentUser, Error> {
    let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Misconfigured {
        setting: "secret_key".to_string(),
    })?;

    let key = DecodingKey::from_secret(secret_key.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500) - key issues, internal failures
        _ => Error::Internal {
            operation: format!("session token verification: {e}"),
        },
    })?;

    if token_data.claims.typ != expected {
        return Err(Error::Unauthenticated { message: None });
    }

    Ok(CurrentUser::from(token_data.claims))
}

/// Find a named cookie's value in a Cookie header string
pub fn cookie_value<'a>(cookie_header: &'a str, name: &str) -> Option<&'a str> {
    for cookie in cookie_header.split(';') {
        let cookie = cookie.trim();
        if let Some((cookie_name, value)) = cookie.split_once('=')
            && cookie_name == name
        {
            return Some(value);
        }
    }
    None
}

/// Build a Set-Cookie value for a session token
pub fn session_cookie(name: &str, token: &str, max_age_secs: u64, secure: bool) -> String {
    let secure_attr = if secure { " Secure;" } else { "" };
    format!("{name}={token}; Path=/; HttpOnly;{secure_attr} SameSite=Lax; Max-Age={max_age_secs}")
}

/// Build a Set-Cookie value that clears a session cookie
pub fn clear_cookie(name: &str, secure: bool) -> String {
    let secure_attr = if secure { " Secure;" } else { "" };
    format!("{name}=; Path=/; HttpOnly;{secure_attr} SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    fn create_test_config() -> Config {
        let mut config = Config::default();
        config.secret_key = Some("test-secret-key-for-sessions".to_string());
        config.auth.session.access_ttl = Duration::from_secs(900);
        config.auth.session.refresh_ttl = Duration::from_secs(3600);
        config
    }

    fn create_test_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "reader@example.com".to_string(),
            username: "reader".to_string(),
            role: Role::Member,
            display_name: Some("A Reader".to_string()),
        }
    }

    #[test]
    fn test_create_and_verify_access_token() {
        let config = create_test_config();
        let user = create_test_user();

        let token = create_session_token(&user, TokenKind::Access, &config).unwrap();
        assert!(!token.is_empty());

        let verified = verify_session_token(&token, TokenKind::Access, &config).unwrap();
        assert_eq!(verified.id, user.id);
        assert_eq!(verified.email, user.email);
        assert_eq!(verified.role, user.role);
    }

    #[test]
    fn test_refresh_token_rejected_as_access_token() {
        let config = create_test_config();
        let user = create_test_user();

        let refresh = create_session_token(&user, TokenKind::Refresh, &config).unwrap();
        let result = verify_session_token(&refresh, TokenKind::Access, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));

        // The other direction must also fail
        let access = create_session_token(&user, TokenKind::Access, &config).unwrap();
        let result = verify_session_token(&access, TokenKind::Refresh, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let mut config = create_test_config();
        let user = create_test_user();

        let token = create_session_token(&user, TokenKind::Access, &config).unwrap();

        config.secret_key = Some("different-secret".to_string());
        let result = verify_session_token(&token, TokenKind::Access, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_expired_token() {
        let config = create_test_config();
        let user = create_test_user();

        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            typ: TokenKind::Access,
            exp: (now - chrono::Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
        };

        let key = EncodingKey::from_secret(config.secret_key.as_ref().unwrap().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let result = verify_session_token(&token, TokenKind::Access, &config);
        assert!(matches!(result.unwrap_err(), Error::Unauthenticated { .. }));
    }

    #[test]
    fn test_verify_malformed_tokens() {
        let config = create_test_config();

        for token in ["not.a.token", "invalid", "", "too.many.parts.in.this.token"] {
            let result = verify_session_token(token, TokenKind::Access, &config);
            assert!(
                matches!(result.unwrap_err(), Error::Unauthenticated { .. }),
                "Expected Unauthenticated error for token: {token}"
            );
        }
    }

    #[test]
    fn test_cookie_value_parsing() {
        let header = "pm_session=abc.def.ghi; other=1; pm_refresh=xyz";
        assert_eq!(cookie_value(header, "pm_session"), Some("abc.def.ghi"));
        assert_eq!(cookie_value(header, "pm_refresh"), Some("xyz"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("pm_session", "tok", 900, true);
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Max-Age=900"));

        let insecure = session_cookie("pm_session", "tok", 900, false);
        assert!(!insecure.contains("Secure"));

        let cleared = clear_cookie("pm_session", true);
        assert!(cleared.contains("Max-Age=0"));
    }
}
