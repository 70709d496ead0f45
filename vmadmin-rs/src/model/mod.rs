//! Entity model
//!
//! The three entities of the virtual mail layout:
//! - [`domain`]: a hosted mail domain
//! - [`user`]: a mailbox belonging to a domain
//! - [`alias`]: a forwarding rule belonging to a domain
//!
//! All identifiers (domain names, usernames, alias addresses) are
//! case-folded to lowercase before storage or comparison. Secrets are
//! never normalized.

pub mod alias;
pub mod domain;
pub mod user;

pub use alias::Alias;
pub use domain::Domain;
pub use user::MailUser;
