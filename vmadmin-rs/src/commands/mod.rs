//! Provisioning operations
//!
//! The operations the operator command table dispatches to. Every operation
//! validates its input before touching the store, so a validation failure
//! never leaves partial state behind.

use tracing::info;

use crate::error::{Result, VmadminError};
use crate::model::{Alias, Domain, MailUser};
use crate::store::VmailStore;
use crate::utils::email::{split_address, validate_email, validate_fqdn};

/// Change a mailbox password after verifying the current one.
///
/// Fails with [`VmadminError::AuthenticationFailed`] on a wrong current
/// password, leaving the stored credential untouched.
pub async fn change_password(
    store: &VmailStore,
    email: &str,
    old_password: &str,
    new_password: &str,
) -> Result<()> {
    let (username, fqdn) = split_address(email)?;

    let domain = store
        .find_domain(fqdn)
        .await?
        .ok_or_else(|| VmadminError::DomainNotFound(fqdn.to_string()))?;

    let mut user = store
        .find_user(username, &domain)
        .await?
        .ok_or_else(|| VmadminError::UserNotFound(email.to_string()))?;

    if !user.check_password(old_password) {
        return Err(VmadminError::AuthenticationFailed);
    }

    user.set_password(new_password);
    store.save_password(&user).await?;

    info!("Password changed for {}", user);
    Ok(())
}

/// Set a mailbox password without verifying the current one. This is the
/// privileged path; access control is the operator's problem.
pub async fn set_password(store: &VmailStore, email: &str, new_password: &str) -> Result<()> {
    let (username, fqdn) = split_address(email)?;

    let domain = store
        .find_domain(fqdn)
        .await?
        .ok_or_else(|| VmadminError::DomainNotFound(fqdn.to_string()))?;

    let mut user = store
        .find_user(username, &domain)
        .await?
        .ok_or_else(|| VmadminError::UserNotFound(email.to_string()))?;

    user.set_password(new_password);
    store.save_password(&user).await?;

    info!("Password set for {}", user);
    Ok(())
}

/// Create a mailbox from a full address, optionally creating its domain
/// and setting an initial password.
pub async fn add_mailbox(
    store: &VmailStore,
    email: &str,
    password: Option<&str>,
    create_domain: bool,
) -> Result<MailUser> {
    let (username, fqdn) = split_address(email)?;
    store.create_mailbox(username, fqdn, password, create_domain).await
}

/// Create a forwarding alias.
///
/// The domain argument may carry a leading `@`. Only the destination must
/// be a valid email address; the source may be a catch-all (`@domain` or an
/// empty local part) or a bare local part.
pub async fn add_alias(
    store: &VmailStore,
    domain: &str,
    source: &str,
    destination: &str,
) -> Result<Alias> {
    let fqdn = domain.strip_prefix('@').unwrap_or(domain);
    validate_fqdn(fqdn)?;
    validate_email(destination)?;

    let domain = store
        .find_domain(fqdn)
        .await?
        .ok_or_else(|| VmadminError::DomainNotFound(fqdn.to_string()))?;

    store.create_alias(&domain, source, destination, true).await
}

/// Create a mail domain.
pub async fn add_domain(store: &VmailStore, fqdn: &str) -> Result<Domain> {
    validate_fqdn(fqdn)?;
    store.create_domain(fqdn).await
}

/// Delete a mail domain along with all its mailboxes and aliases.
pub async fn delete_domain(store: &VmailStore, fqdn: &str) -> Result<()> {
    validate_fqdn(fqdn)?;
    store.delete_domain(fqdn).await
}
