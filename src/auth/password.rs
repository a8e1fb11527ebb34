//! PBKDF2-HMAC-SHA256 password encoding.
//!
//! Encoded form is `pbkdf2_sha256$<rounds>$<salt-hex>$<digest-hex>`, with a
//! deterministic-salt entry point kept for compatibility tooling and tests.

use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::auth::AuthError;

/// PBKDF2 iteration count for newly hashed passwords.
pub const PBKDF2_ITERATIONS: u32 = 390_000;

const SCHEME: &str = "pbkdf2_sha256";
const SALT_BYTES: usize = 16;
const DIGEST_BYTES: usize = 32;
const MIN_PASSWORD_CHARS: usize = 8;

fn derive(password: &str, salt: &[u8], rounds: u32) -> [u8; DIGEST_BYTES] {
    let mut digest = [0u8; DIGEST_BYTES];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, rounds, &mut digest);
    digest
}

fn encode(salt: &[u8], digest: &[u8], rounds: u32) -> String {
    format!(
        "{SCHEME}${rounds}${}${}",
        hex::encode(salt),
        hex::encode(digest)
    )
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::PasswordTooShort);
    }
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    Ok(encode(&salt, &derive(password, &salt, PBKDF2_ITERATIONS), PBKDF2_ITERATIONS))
}

/// Hash a password with a caller-supplied salt. Compatibility entry point for
/// tooling that needs reproducible hashes.
pub fn hash_password_with_salt(password: &str, salt: &[u8]) -> Result<String, AuthError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AuthError::PasswordTooShort);
    }
    Ok(encode(salt, &derive(password, salt, PBKDF2_ITERATIONS), PBKDF2_ITERATIONS))
}

/// Verify a password against an encoded hash; malformed hashes verify false.
pub fn verify_password(password: &str, encoded_hash: &str) -> bool {
    let mut parts = encoded_hash.splitn(4, '$');
    let (Some(scheme), Some(rounds_raw), Some(salt_hex), Some(digest_hex)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME {
        return false;
    }
    let Ok(rounds) = rounds_raw.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(expected) = hex::decode(digest_hex) else {
        return false;
    };
    let computed = derive(password, &salt, rounds);
    computed.as_slice().ct_eq(expected.as_slice()).into()
}
