//! Connection pool construction from configuration.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use crate::config::DatabaseConfig;

/// Build a lazily-connecting pool with the configured bounds.
///
/// Lazy connection keeps startup independent of database availability; the
/// first query pays the connection cost instead.
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = &config.pool;

    let mut options = PgPoolOptions::new()
        .max_connections(pool.max_connections)
        .min_connections(pool.min_connections)
        .acquire_timeout(Duration::from_secs(pool.acquire_timeout_secs));

    // Zero means "never recycle"
    options = match pool.idle_timeout_secs {
        0 => options.idle_timeout(None),
        secs => options.idle_timeout(Duration::from_secs(secs)),
    };
    options = match pool.max_lifetime_secs {
        0 => options.max_lifetime(None),
        secs => options.max_lifetime(Duration::from_secs(secs)),
    };

    options.connect_lazy(&config.url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lazy_pool_builds_without_a_server() {
        let config = DatabaseConfig::default();
        let pool = create_pool(&config).expect("lazy pool should build");
        assert!(!pool.is_closed());
    }
}
