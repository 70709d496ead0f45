use std::fmt;

use crate::security::ssha;

/// A mailbox: the local part of an address plus its owning domain.
///
/// The credential is an SSHA digest (see [`crate::security::ssha`]); the
/// raw salt is retained alongside the encoded digest so verification does
/// not need to re-decode it.
#[derive(Debug, Clone)]
pub struct MailUser {
    pub id: i64,
    pub username: String,
    pub domain_id: i64,
    pub domain_fqdn: String,
    pub salt: Vec<u8>,
    pub shadigest: String,
    pub created_at: String,
}

impl MailUser {
    /// Normalize a raw username for storage and lookup.
    pub fn normalize_username(username: &str) -> String {
        username.to_lowercase()
    }

    /// Replace the credential with a fresh SSHA digest of `plaintext`.
    ///
    /// A new random salt is drawn on every call, so the previous password
    /// stops validating immediately. Call [`crate::store::VmailStore::save_password`]
    /// to persist the change.
    pub fn set_password(&mut self, plaintext: &str) {
        let (shadigest, salt) = ssha::hash_password(plaintext);
        self.shadigest = shadigest;
        self.salt = salt;
    }

    /// Check `candidate` against the stored credential.
    ///
    /// The candidate is hashed exactly as given; a mailbox created without
    /// a password rejects every candidate.
    pub fn check_password(&self, candidate: &str) -> bool {
        ssha::verify_password(candidate, &self.salt, &self.shadigest)
    }
}

impl fmt::Display for MailUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.domain_fqdn)
    }
}
