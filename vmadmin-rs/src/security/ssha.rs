//! SSHA password hashing
//!
//! The stored form is `base64(sha1(plaintext ++ salt) ++ salt)`: the salted
//! SHA-1 scheme common mail authentication backends call SSHA. Verification
//! recomputes the digest with the stored salt and compares it against the
//! digest portion of the stored value.
//!
//! Passwords are never trimmed or case-folded; normalization applies to
//! identifiers only, never to secrets.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use sha1::{Digest, Sha1};

/// Number of random salt bytes appended to the digest.
pub const SALT_LEN: usize = 16;

/// SHA-1 digest length in bytes.
const DIGEST_LEN: usize = 20;

/// Hash `plaintext` with a freshly generated random salt.
///
/// Returns the base64-encoded `digest ++ salt` string and the raw salt.
/// Every call draws a new salt from the OS random source, so hashing the
/// same password twice yields different results.
pub fn hash_password(plaintext: &str) -> (String, Vec<u8>) {
    let mut salt = vec![0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);

    (encode(plaintext, &salt), salt)
}

fn encode(plaintext: &str, salt: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(plaintext.as_bytes());
    hasher.update(salt);
    let digest = hasher.finalize();

    let mut buf = Vec::with_capacity(DIGEST_LEN + salt.len());
    buf.extend_from_slice(&digest);
    buf.extend_from_slice(salt);

    BASE64.encode(buf)
}

/// Check `candidate` against a stored digest and its salt.
///
/// Returns false for anything that does not match exactly, including an
/// empty stored digest (a mailbox created without a password).
pub fn verify_password(candidate: &str, salt: &[u8], stored: &str) -> bool {
    let Ok(decoded) = BASE64.decode(stored) else {
        return false;
    };

    if decoded.len() < DIGEST_LEN {
        return false;
    }

    let mut hasher = Sha1::new();
    hasher.update(candidate.as_bytes());
    hasher.update(salt);
    let digest = hasher.finalize();

    digest.as_slice() == &decoded[..DIGEST_LEN]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let (stored, salt) = hash_password("johnpassword");

        assert!(verify_password("johnpassword", &salt, &stored));
        assert!(!verify_password("johnpassword ", &salt, &stored));
        assert!(!verify_password("", &salt, &stored));
        assert!(!verify_password("other", &salt, &stored));
    }

    #[test]
    fn test_salt_length() {
        let (_, salt) = hash_password("secret");
        assert_eq!(salt.len(), SALT_LEN);
    }

    #[test]
    fn test_fresh_salt_each_call() {
        let (first, salt_a) = hash_password("secret");
        let (second, salt_b) = hash_password("secret");

        assert_ne!(salt_a, salt_b);
        assert_ne!(first, second);
    }

    #[test]
    fn test_stored_format_is_digest_then_salt() {
        let (stored, salt) = hash_password("secret");
        let decoded = BASE64.decode(&stored).unwrap();

        assert_eq!(decoded.len(), DIGEST_LEN + SALT_LEN);
        assert_eq!(&decoded[DIGEST_LEN..], salt.as_slice());
    }

    #[test]
    fn test_empty_stored_digest_never_verifies() {
        assert!(!verify_password("", &[], ""));
        assert!(!verify_password("anything", &[], ""));
    }
}
