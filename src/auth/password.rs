use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("{0}")]
    TooWeak(&'static str),
    #[error("password hashing failed: {0}")]
    Hash(String),
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn validate_strength(password: &str) -> Result<(), PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PasswordError::TooWeak("Password must be at least 8 characters"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordError::TooWeak("Password must contain a digit"));
    }
    if !password.chars().any(|c| c.is_alphabetic()) {
        return Err(PasswordError::TooWeak("Password must contain a letter"));
    }
    Ok(())
}

/// Hash with Argon2id, returning a PHC string (`$argon2id$...`)
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    validate_strength(password)?;
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hash(e.to_string()))
}

/// Malformed stored hashes verify as false
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            tracing::warn!("Stored password hash could not be parsed: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_verify() {
        let hash = hash_password("lesson-plan-42").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("lesson-plan-42", &hash));
        assert!(!verify_password("lesson-plan-43", &hash));
    }

    #[test]
    fn weak_passwords_are_rejected() {
        assert!(matches!(hash_password("short1"), Err(PasswordError::TooWeak(_))));
        assert!(matches!(hash_password("nodigitshere"), Err(PasswordError::TooWeak(_))));
        assert!(matches!(hash_password("1234567890"), Err(PasswordError::TooWeak(_))));
    }

    #[test]
    fn garbage_hash_does_not_verify() {
        assert!(!verify_password("anything1", "not-a-phc-string"));
    }
}
