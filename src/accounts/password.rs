use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tracing::{error, warn};

use crate::accounts::errors::AccountError;

/// Prefix marking a stored credential that can never verify.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';
const UNUSABLE_SUFFIX_LEN: usize = 40;

pub fn hash_password(plain: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            AccountError::Hashing(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Marker stored when an account is created without a password.
pub fn make_unusable_password() -> String {
    let suffix: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(UNUSABLE_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{UNUSABLE_PASSWORD_PREFIX}{suffix}")
}

pub fn is_password_usable(stored: &str) -> bool {
    !stored.is_empty() && !stored.starts_with(UNUSABLE_PASSWORD_PREFIX)
}

/// Checks `plain` against a stored credential. Unusable markers and
/// credentials that are not PHC strings never match.
pub fn verify_password(plain: &str, stored: &str) -> Result<bool, AccountError> {
    if !is_password_usable(stored) {
        return Ok(false);
    }
    let parsed = match PasswordHash::new(stored) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored credential is not a PHC hash");
            return Ok(false);
        }
    };
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should succeed");
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let password = "correct-horse-battery-staple";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(!verify_password("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn verify_rejects_unrecognized_hash_format() {
        assert!(!verify_password("anything", "not-a-valid-hash").unwrap());
        assert!(!verify_password("pw", "md5$legacy$abc").unwrap());
    }

    #[test]
    fn unusable_marker_never_verifies() {
        let marker = make_unusable_password();
        assert_eq!(marker.len(), 1 + UNUSABLE_SUFFIX_LEN);
        assert!(!is_password_usable(&marker));
        assert!(!verify_password("", &marker).unwrap());
        assert!(!verify_password(&marker, &marker).unwrap());
    }

    #[test]
    fn unusable_markers_are_random() {
        assert_ne!(make_unusable_password(), make_unusable_password());
    }
}
