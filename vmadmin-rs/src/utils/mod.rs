//! Utility modules
//!
//! - [`email`]: operator-facing email address and domain validation

pub mod email;

pub use email::{split_address, validate_email, validate_fqdn};
