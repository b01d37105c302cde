//! OAuth sign-in initiation.
//!
//! Only the first leg of the flow lives here: building the provider
//! authorization URL and minting the signed `state` parameter that rides along
//! with it. The state token is an HMAC-SHA256-signed payload carrying a random
//! nonce, the issue time, the post-login redirect target, and whether this is
//! an account-connect flow (adding a provider to an existing account) rather
//! than a sign-in.
//!
//! State tokens are time-boxed: verification rejects anything older than the
//! configured maximum age, so a leaked state value cannot be replayed later.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use url::Url;

use crate::{
    config::{Config, OauthProviderConfig},
    errors::Error,
};

type HmacSha256 = Hmac<Sha256>;

/// Supported OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Google,
    Kakao,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Kakao => "kakao",
        }
    }

    fn config<'a>(&self, config: &'a Config) -> &'a OauthProviderConfig {
        match self {
            Provider::Google => &config.auth.oauth.google,
            Provider::Kakao => &config.auth.oauth.kakao,
        }
    }
}

/// Payload signed into the OAuth `state` parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateClaims {
    /// Random nonce tying the state to one initiation
    pub nonce: String,
    /// Unix timestamp of issuance, for the max-age check
    pub issued_at: i64,
    /// Where to send the browser after a successful login
    pub redirect: String,
    /// True when attaching a provider to an already signed-in account
    pub connect: bool,
}

impl StateClaims {
    pub fn new(redirect: String, connect: bool) -> Self {
        let mut nonce_bytes = [0u8; 16];
        rand::rng().fill(&mut nonce_bytes);

        Self {
            nonce: URL_SAFE_NO_PAD.encode(nonce_bytes),
            issued_at: Utc::now().timestamp(),
            redirect,
            connect,
        }
    }
}

fn mac(secret: &str) -> Result<HmacSha256, Error> {
    HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| Error::Internal {
        operation: format!("initialize state hmac: {e}"),
    })
}

fn secret_key(config: &Config) -> Result<&str, Error> {
    config
        .secret_key
        .as_deref()
        .ok_or_else(|| Error::Misconfigured {
            setting: "secret_key".to_string(),
        })
}

/// Sign state claims into the wire format `base64url(payload).base64url(sig)`.
pub fn sign_state(claims: &StateClaims, config: &Config) -> Result<String, Error> {
    let payload = serde_json::to_vec(claims).map_err(|e| Error::Internal {
        operation: format!("serialize oauth state: {e}"),
    })?;

    let mut mac = mac(secret_key(config)?)?;
    mac.update(&payload);
    let signature = mac.finalize().into_bytes();

    Ok(format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), URL_SAFE_NO_PAD.encode(signature)))
}

/// Verify a state token: signature first, then the max-age window.
///
/// Any structural defect (bad base64, missing separator, JSON mismatch) is
/// reported the same way as a bad signature so callers cannot distinguish
/// tampering modes.
pub fn verify_state(state: &str, config: &Config) -> Result<StateClaims, Error> {
    let invalid = || Error::Unauthenticated {
        message: Some("Invalid OAuth state".to_string()),
    };

    let (payload_b64, sig_b64) = state.split_once('.').ok_or_else(invalid)?;
    let payload = URL_SAFE_NO_PAD.decode(payload_b64).map_err(|_| invalid())?;
    let signature = URL_SAFE_NO_PAD.decode(sig_b64).map_err(|_| invalid())?;

    let mut mac = mac(secret_key(config)?)?;
    mac.update(&payload);
    mac.verify_slice(&signature).map_err(|_| invalid())?;

    let claims: StateClaims = serde_json::from_slice(&payload).map_err(|_| invalid())?;

    let age = Utc::now().timestamp() - claims.issued_at;
    let max_age = config.auth.oauth.state_max_age.as_secs() as i64;
    if age < 0 || age > max_age {
        return Err(Error::Unauthenticated {
            message: Some("OAuth state expired".to_string()),
        });
    }

    Ok(claims)
}

/// Build the provider authorization URL for an initiation request.
///
/// Returns [`Error::Misconfigured`] when the provider has no client ID.
pub fn authorization_url(provider: Provider, claims: &StateClaims, config: &Config) -> Result<Url, Error> {
    let provider_config = provider.config(config);
    let client_id = provider_config.client_id.as_deref().ok_or_else(|| Error::Misconfigured {
        setting: format!("auth.oauth.{}.client_id", provider.as_str()),
    })?;

    let state = sign_state(claims, config)?;
    let redirect_uri = format!("{}/api/auth/{}/callback", config.site_url.trim_end_matches('/'), provider.as_str());

    let mut url = provider_config.authorization_endpoint.clone();
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", &redirect_uri)
        .append_pair("response_type", "code")
        .append_pair("scope", &provider_config.scope)
        .append_pair("state", &state);

    Ok(url)
}
