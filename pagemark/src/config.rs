//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `PAGEMARK_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `config.yaml`)
//! 2. **Environment variables** - Variables prefixed with `PAGEMARK_` override YAML values
//! 3. **DATABASE_URL** - Special case: overrides `database.url` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `PAGEMARK_AUTH__REGISTRATION_ENABLED=false` sets `auth.registration_enabled`.
//!
//! ## Access tables
//!
//! The `[access]` section declares the page-route and API-route tables consumed by the
//! access control gate. Role names are validated when the configuration is loaded;
//! an unknown role string aborts startup.

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "PAGEMARK_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    /// Useful for CI/CD pipelines to catch config errors before deployment.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
///
/// Loaded from YAML and environment variables; all fields have defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Base URL where the site is accessible (e.g., "https://pagemark.example.com").
    /// Used to build OAuth redirect URIs.
    pub site_url: String,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Email address for the initial admin user (created on first startup)
    pub admin_email: String,
    /// Password for the initial admin user (optional, can be set via environment)
    pub admin_password: Option<String>,
    /// Secret key for session token signing and OAuth state signing (required for production)
    pub secret_key: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// Access control gate route declarations
    pub access: AccessConfig,
    /// CORS settings
    pub cors: CorsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3100,
            site_url: "http://localhost:3100".to_string(),
            database: DatabaseConfig::default(),
            admin_email: "admin@localhost".to_string(),
            admin_password: None,
            secret_key: None,
            auth: AuthConfig::default(),
            access: AccessConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment with proper precedence
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut figment = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("PAGEMARK_").split("__"));

        // DATABASE_URL is the conventional override for the connection string
        if let Ok(url) = std::env::var("DATABASE_URL") {
            figment = figment.merge(("database.url", url));
        }

        let config: Config = figment.extract()?;

        // Fail at startup on bad route declarations, not at request time
        crate::auth::gate::RouteTable::from_config(&config.access)
            .map_err(|e| anyhow::anyhow!("invalid access configuration: {e}"))?;

        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database connection settings with a bounded pool.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// PostgreSQL connection string
    pub url: String,
    /// Connection pool settings
    pub pool: PoolSettings,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/pagemark".to_string(),
            pool: PoolSettings::default(),
        }
    }
}

/// Individual pool configuration with all SQLx parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection (seconds)
    pub acquire_timeout_secs: u64,
    /// Time before idle connections are closed (seconds, 0 = never)
    pub idle_timeout_secs: u64,
    /// Maximum lifetime of a connection (seconds, 0 = never)
    pub max_lifetime_secs: u64,
}

impl Default for PoolSettings {
    /// Production defaults: balanced for reliability and resource usage
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

/// Authentication configuration covering passwords, sessions, and OAuth providers.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether new accounts can be self-registered with email + password
    pub registration_enabled: bool,
    pub password: PasswordConfig,
    pub session: SessionConfig,
    pub oauth: OauthConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            registration_enabled: true,
            password: PasswordConfig::default(),
            session: SessionConfig::default(),
            oauth: OauthConfig::default(),
        }
    }
}

/// Password validation rules and hashing cost.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB (default: 19456 KiB = 19 MB, secure for production)
    pub argon2_memory_kib: u32,
    /// Argon2 iterations (default: 2, secure for production)
    pub argon2_iterations: u32,
    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 128,
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

/// Session token pair settings. The access token is short-lived and checked on
/// every request; the refresh token is long-lived and only accepted by the
/// refresh endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub refresh_cookie_name: String,
    #[serde(with = "humantime_serde")]
    pub access_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub refresh_ttl: Duration,
    /// Set the Secure attribute on session cookies (disable for local HTTP development)
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "pm_session".to_string(),
            refresh_cookie_name: "pm_refresh".to_string(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(14 * 24 * 3600),
            cookie_secure: true,
        }
    }
}

/// OAuth initiation settings. Providers without credentials are treated as
/// unconfigured and their initiation endpoints return a 500 error payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OauthConfig {
    /// Maximum accepted age of a returned state token
    #[serde(with = "humantime_serde")]
    pub state_max_age: Duration,
    pub google: OauthProviderConfig,
    pub kakao: OauthProviderConfig,
}

impl Default for OauthConfig {
    fn default() -> Self {
        Self {
            state_max_age: Duration::from_secs(600),
            google: OauthProviderConfig {
                client_id: None,
                authorization_endpoint: Url::parse("https://accounts.google.com/o/oauth2/v2/auth").expect("static URL"),
                scope: "openid email profile".to_string(),
            },
            kakao: OauthProviderConfig {
                client_id: None,
                authorization_endpoint: Url::parse("https://kauth.kakao.com/oauth/authorize").expect("static URL"),
                scope: "account_email profile_nickname".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OauthProviderConfig {
    /// OAuth client ID. When absent the provider is unconfigured.
    pub client_id: Option<String>,
    /// Provider authorization endpoint
    pub authorization_endpoint: Url,
    /// Space-separated scopes requested at initiation
    pub scope: String,
}

/// Access control gate configuration: redirect targets plus the two route tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessConfig {
    /// Where unauthenticated page requests are redirected
    pub signin_path: String,
    /// Where forbidden page requests are redirected
    pub forbidden_path: String,
    /// Paths under this prefix are classified as API routes (JSON errors, no redirects)
    pub api_prefix: String,
    /// Page route declarations
    pub pages: Vec<RouteRuleConfig>,
    /// API route declarations
    pub api: Vec<RouteRuleConfig>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            signin_path: "/signin".to_string(),
            forbidden_path: "/403".to_string(),
            api_prefix: "/api".to_string(),
            pages: vec![
                RouteRuleConfig::new("/dashboard", "authenticated"),
                RouteRuleConfig::new("/dashboard/admin", "admin"),
            ],
            api: vec![
                RouteRuleConfig::new("/api/admin", "admin"),
                RouteRuleConfig::new("/api/me", "authenticated"),
                RouteRuleConfig::new("/api/auth/me", "authenticated"),
                RouteRuleConfig::new("/api/tickets", "authenticated"),
                RouteRuleConfig::new("/api/subscriptions", "authenticated"),
            ],
        }
    }
}

/// A single route declaration as authored in configuration. The `require`
/// string is parsed into a typed requirement at startup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRuleConfig {
    pub prefix: String,
    pub require: String,
}

impl RouteRuleConfig {
    pub fn new(prefix: &str, require: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            require: require.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allow_credentials: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_declare_admin_api_rule() {
        let config = Config::default();
        assert!(config.access.api.iter().any(|r| r.prefix == "/api/admin" && r.require == "admin"));
    }

    #[test]
    fn load_rejects_unknown_role_in_access_table() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
access:
  pages:
    - prefix: /dashboard
      require: superuser
"#,
            )?;
            let args = Args {
                config: "config.yaml".to_string(),
                validate: true,
            };
            let result = Config::load(&args);
            assert!(result.is_err());
            assert!(result.unwrap_err().to_string().contains("superuser"));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "port: 4000\n")?;
            jail.set_env("PAGEMARK_PORT", "5000");
            let args = Args {
                config: "config.yaml".to_string(),
                validate: true,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.port, 5000);
            Ok(())
        });
    }

    #[test]
    fn database_url_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_file("config.yaml", "")?;
            jail.set_env("DATABASE_URL", "postgresql://db.internal/pagemark");
            let args = Args {
                config: "config.yaml".to_string(),
                validate: true,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.database.url, "postgresql://db.internal/pagemark");
            Ok(())
        });
    }
}
