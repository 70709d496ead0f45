use crate::error::{Result, VmadminError};

/// Validate an operator-supplied email address of the form `local@fqdn`.
///
/// Deliberately strict: surrounding whitespace is rejected rather than
/// trimmed, the local part must be non-empty, and the domain must look like
/// a fully-qualified name with a TLD of at least two characters. The local
/// part itself may contain any printable character a mailbox name can carry.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() {
        return Err(VmadminError::Validation("email is empty".to_string()));
    }

    if email.chars().any(char::is_whitespace) {
        return Err(VmadminError::Validation(format!(
            "email contains whitespace: '{}'",
            email
        )));
    }

    let Some((local, fqdn)) = email.rsplit_once('@') else {
        return Err(VmadminError::Validation(format!(
            "email must contain '@': '{}'",
            email
        )));
    };

    if local.is_empty() {
        return Err(VmadminError::Validation(format!(
            "email local part is empty: '{}'",
            email
        )));
    }

    validate_fqdn(fqdn)
}

/// Validate a fully-qualified domain name (the part after `@`).
pub fn validate_fqdn(fqdn: &str) -> Result<()> {
    if fqdn.is_empty() {
        return Err(VmadminError::Validation("domain is empty".to_string()));
    }

    if fqdn.chars().any(char::is_whitespace) {
        return Err(VmadminError::Validation(format!(
            "domain contains whitespace: '{}'",
            fqdn
        )));
    }

    if !fqdn.contains('.') {
        return Err(VmadminError::Validation(format!(
            "domain must contain a dot: '{}'",
            fqdn
        )));
    }

    if fqdn.split('.').any(str::is_empty) {
        return Err(VmadminError::Validation(format!(
            "domain has an empty label: '{}'",
            fqdn
        )));
    }

    // TLD shorter than two characters is not routable mail
    let tld = fqdn.rsplit('.').next().unwrap_or("");
    if tld.len() < 2 {
        return Err(VmadminError::Validation(format!(
            "domain has an invalid top-level label: '{}'",
            fqdn
        )));
    }

    Ok(())
}

/// Split a validated address into `(local, fqdn)`.
pub fn split_address(email: &str) -> Result<(&str, &str)> {
    validate_email(email)?;

    email.rsplit_once('@').ok_or_else(|| {
        VmadminError::Validation(format!("email must contain '@': '{}'", email))
    })
}
