//! vmadmin-rs: administration layer for virtual mail hosting
//!
//! Manages mail domains, mailboxes and forwarding aliases backed by a
//! relational database, and produces SSHA password hashes compatible with
//! Dovecot-style authentication backends.
//!
//! # Invariants
//!
//! - Identifiers (domain names, usernames, alias addresses) are lowercased
//!   before storage, lookup or comparison; uniqueness is case-insensitive
//!   and enforced both application-side and by the schema.
//! - Passwords are never normalized; credentials are salted SHA-1 digests
//!   stored as `base64(digest ++ salt)`.
//!
//! # Example
//!
//! ```no_run
//! use vmadmin_rs::commands;
//! use vmadmin_rs::store::VmailStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = VmailStore::connect("sqlite://vmail.db").await?;
//!
//!     commands::add_mailbox(&store, "john@example.org", Some("secret"), true).await?;
//!     commands::add_alias(&store, "example.org", "@example.org", "john@example.org").await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`model`]: domain, mailbox and alias entities and their normalization
//! - [`security`]: SSHA password hashing
//! - [`store`]: SQLite persistence and uniqueness enforcement
//! - [`commands`]: provisioning operations
//! - [`cli`]: operator command table
//! - [`config`]: configuration management
//! - [`error`]: error types and handling

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod model;
pub mod security;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{Result, VmadminError};
