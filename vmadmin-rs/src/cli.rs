//! Operator command table
//!
//! # Usage
//!
//! ```bash
//! # Add a domain
//! vmadmin adddomain example.org --db sqlite://vmail.db
//!
//! # Add a mailbox, creating the domain if needed
//! vmadmin addmbox john@example.org --password secret --create-domain
//!
//! # Add a forwarding alias (the domain may carry a leading '@')
//! vmadmin addalias example.org bob@example.org robert@example.org
//!
//! # Change a password, verifying the current one
//! vmadmin chpasswd john@example.org oldpw newpw
//! ```
//!
//! Positional argument arity is fixed per command and enforced by clap;
//! too few or too many arguments is a fatal usage error before any
//! validation runs.

use std::io::Write;

use clap::{Parser, Subcommand};

use crate::commands;
use crate::error::{Result, VmadminError};
use crate::store::VmailStore;

#[derive(Parser)]
#[command(name = "vmadmin")]
#[command(about = "Manage virtual mail domains, mailboxes and aliases", long_about = None)]
pub struct Cli {
    /// Database URL (e.g., sqlite://vmail.db); overrides the config file
    #[arg(short, long)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a mail domain
    Adddomain {
        /// Fully-qualified domain name
        fqdn: String,
    },
    /// Delete a mail domain and all its mailboxes and aliases
    Deldomain {
        /// Fully-qualified domain name
        fqdn: String,
        /// Confirm the cascading delete
        #[arg(long)]
        yes: bool,
    },
    /// Add a mailbox
    Addmbox {
        /// Mailbox address (local@fqdn)
        email: String,
        /// Initial password
        #[arg(long)]
        password: Option<String>,
        /// Create the domain if it does not exist
        #[arg(long)]
        create_domain: bool,
    },
    /// Add a forwarding alias
    Addalias {
        /// Domain, with or without a leading '@'
        domain: String,
        /// Source address; an empty local part makes it a catch-all
        source: String,
        /// Destination address (must be a valid email)
        destination: String,
    },
    /// Change a mailbox password, verifying the current one
    Chpasswd {
        /// Mailbox address (local@fqdn)
        email: String,
        /// Current password
        old_password: String,
        /// New password
        new_password: String,
    },
    /// Set a mailbox password without verifying the current one
    Setpasswd {
        /// Mailbox address (local@fqdn)
        email: String,
        /// New password
        new_password: String,
    },
    /// List domains with their mailboxes and aliases
    List,
}

/// Execute a parsed command against the store, writing output to `out`.
///
/// Output goes to an injected sink rather than straight to stdout so tests
/// can capture it without touching process streams.
pub async fn run<W: Write>(command: Command, store: &VmailStore, out: &mut W) -> Result<()> {
    match command {
        Command::Adddomain { fqdn } => {
            let domain = commands::add_domain(store, &fqdn).await?;
            writeln!(out, "Domain {} added", domain)?;
        }
        Command::Deldomain { fqdn, yes } => {
            if !yes {
                return Err(VmadminError::Validation(
                    "deleting a domain removes all its mailboxes and aliases; pass --yes to confirm"
                        .to_string(),
                ));
            }
            commands::delete_domain(store, &fqdn).await?;
            writeln!(out, "Domain {} deleted", fqdn.to_lowercase())?;
        }
        Command::Addmbox {
            email,
            password,
            create_domain,
        } => {
            let user =
                commands::add_mailbox(store, &email, password.as_deref(), create_domain).await?;
            writeln!(out, "Mailbox {} added", user)?;
        }
        Command::Addalias {
            domain,
            source,
            destination,
        } => {
            let alias = commands::add_alias(store, &domain, &source, &destination).await?;
            writeln!(out, "Alias {} added", alias)?;
        }
        Command::Chpasswd {
            email,
            old_password,
            new_password,
        } => {
            commands::change_password(store, &email, &old_password, &new_password).await?;
            writeln!(out, "Password changed for {}", email)?;
        }
        Command::Setpasswd {
            email,
            new_password,
        } => {
            commands::set_password(store, &email, &new_password).await?;
            writeln!(out, "Password set for {}", email)?;
        }
        Command::List => {
            let domains = store.list_domains().await?;

            if domains.is_empty() {
                writeln!(out, "No domains found.")?;
            }

            for domain in &domains {
                writeln!(out, "{} (created {})", domain, domain.created_at)?;

                for user in store.list_users(domain).await? {
                    writeln!(out, "  mailbox {}", user)?;
                }

                for alias in store.list_aliases(domain).await? {
                    let marker = if alias.active { "" } else { " (inactive)" };
                    writeln!(out, "  alias   {}{}", alias, marker)?;
                }
            }
        }
    }

    Ok(())
}
