use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::ServiceError;

pub const MIN_PASSWORD_LEN: usize = 8;
const ITERATIONS: u32 = 10_000;
const SALT_BYTES: usize = 16;
const SCHEME: &str = "sha256";

/// Hashes a password as `sha256$<iterations>$<salt-hex>$<digest-hex>`.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = stretch(password.as_bytes(), &salt, ITERATIONS);
    Ok(format!(
        "{SCHEME}${ITERATIONS}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    ))
}

/// Checks a password against an encoded hash. Malformed hashes never verify.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };

    let actual = stretch(password.as_bytes(), &salt, iterations);
    constant_time_eq(&actual, &expected)
}

fn stretch(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password);
    let mut digest: [u8; 32] = hasher.finalize().into();

    for _ in 1..iterations.max(1) {
        let mut hasher = Sha256::new();
        hasher.update(digest);
        hasher.update(salt);
        digest = hasher.finalize().into();
    }
    digest
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter()
        .zip(right)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_original_password() {
        let encoded = hash_password("warehouse-42").expect("hashes");
        assert!(encoded.starts_with("sha256$10000$"));
        assert!(verify_password("warehouse-42", &encoded));
        assert!(!verify_password("warehouse-43", &encoded));
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password("warehouse-42").expect("hashes");
        let second = hash_password("warehouse-42").expect("hashes");
        assert_ne!(first, second);
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(matches!(
            hash_password("short"),
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_password("anything", ""));
        assert!(!verify_password("anything", "md5$1$00$00"));
        assert!(!verify_password("anything", "sha256$x$00$00"));
        assert!(!verify_password("anything", "sha256$1$zz$00"));
    }
}
