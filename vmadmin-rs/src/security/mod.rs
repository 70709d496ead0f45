//! Credential handling
//!
//! Provides password hashing for mail authentication backends:
//! - [`ssha`]: salted SHA-1 ("SSHA") digests as consumed by Dovecot-style
//!   password databases

pub mod ssha;

pub use ssha::{hash_password, verify_password, SALT_LEN};
