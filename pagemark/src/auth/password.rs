//! Password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::PasswordConfig;
use crate::errors::Error;

fn hasher(config: &PasswordConfig) -> Result<Argon2<'static>, Error> {
    let params = Params::new(
        config.argon2_memory_kib,
        config.argon2_iterations,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| Error::Internal {
        operation: format!("create argon2 params: {e}"),
    })?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &PasswordConfig) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = hasher(config)?;

    let hash = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| Error::Internal {
        operation: format!("hash password: {e}"),
    })?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
///
/// Note: verification uses the parameters embedded in the hash itself, so
/// hashes created under older cost settings keep verifying after a config
/// change.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::Internal {
        operation: format!("parse password hash: {e}"),
    })?;

    let argon2 = Argon2::default();
    Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let config = PasswordConfig::default();
        let hash = hash_password("correct horse battery", &config).unwrap();
        assert!(!hash.is_empty());
        assert!(verify_password("correct horse battery", &hash).unwrap());
        assert!(!verify_password("wrong password", &hash).unwrap());
    }

    #[test]
    fn test_same_input_different_hashes() {
        let config = PasswordConfig::default();
        let hash1 = hash_password("same_password", &config).unwrap();
        let hash2 = hash_password("same_password", &config).unwrap();

        // Salted, so equal inputs produce distinct hashes
        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[test]
    fn test_configured_cost_parameters_are_used() {
        let config = PasswordConfig {
            argon2_memory_kib: 8192,
            argon2_iterations: 1,
            argon2_parallelism: 2,
            ..PasswordConfig::default()
        };

        // The PHC string embeds the cost parameters the hash was created with
        let hash = hash_password("tuned", &config).unwrap();
        assert!(hash.contains("m=8192,t=1,p=2"), "unexpected hash parameters: {hash}");
        assert!(verify_password("tuned", &hash).unwrap());
    }

    #[test]
    fn test_invalid_cost_parameters_rejected() {
        let config = PasswordConfig {
            argon2_memory_kib: 0,
            ..PasswordConfig::default()
        };
        assert!(hash_password("anything", &config).is_err());
    }
}
