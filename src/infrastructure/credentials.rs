//! Secrets: password hashing, session tokens, OTP and invite codes.

use rand::Rng;
use rand::distributions::{Alphanumeric, Uniform};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_BYTES: usize = 16;
const TOKEN_BYTES: usize = 32;
pub const OTP_DIGITS: usize = 6;
pub const INVITE_CODE_LEN: usize = 8;

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill(bytes.as_mut_slice());
    hex::encode(bytes)
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hashes `password` with a fresh salt, encoded as `salt$digest`.
pub fn hash_password(password: &str) -> String {
    let salt = random_hex(SALT_BYTES);
    let hash = digest(&salt, password);
    format!("{salt}${hash}")
}

pub fn verify_password(password: &str, encoded: &str) -> bool {
    match encoded.split_once('$') {
        Some((salt, expected)) => {
            let actual = digest(salt, password);
            actual.as_bytes().ct_eq(expected.as_bytes()).into()
        }
        None => false,
    }
}

pub fn generate_session_token() -> String {
    random_hex(TOKEN_BYTES)
}

pub fn generate_otp() -> String {
    let digits = Uniform::from(0..10u8);
    rand::thread_rng()
        .sample_iter(digits)
        .take(OTP_DIGITS)
        .map(|d| char::from(b'0' + d))
        .collect()
}

pub fn generate_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let encoded = hash_password("hunter22");
        assert!(verify_password("hunter22", &encoded));
        assert!(!verify_password("hunter23", &encoded));
        assert!(!verify_password("hunter22", "garbage"));
    }

    #[test]
    fn test_digest_mismatch_in_length_or_content() {
        let encoded = hash_password("hunter22");
        let (salt, digest_hex) = encoded.split_once('$').unwrap();
        assert!(!verify_password("hunter22", &format!("{salt}${}", &digest_hex[1..])));
        assert!(!verify_password("hunter22", &format!("{salt}${digest_hex}00")));
        assert!(!verify_password("hunter22", &format!("{salt}$")));
    }

    #[test]
    fn test_same_password_different_salt() {
        assert_ne!(hash_password("secret"), hash_password("secret"));
    }

    #[test]
    fn test_generated_codes_shape() {
        let otp = generate_otp();
        assert_eq!(otp.len(), OTP_DIGITS);
        assert!(otp.chars().all(|c| c.is_ascii_digit()));

        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

        assert_eq!(generate_session_token().len(), TOKEN_BYTES * 2);
    }
}
