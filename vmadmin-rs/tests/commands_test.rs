//! Integration tests for the provisioning commands

use vmadmin_rs::cli::{self, Command};
use vmadmin_rs::commands;
use vmadmin_rs::error::VmadminError;
use vmadmin_rs::store::VmailStore;

async fn store() -> VmailStore {
    VmailStore::connect("sqlite::memory:").await.unwrap()
}

/// Create a domain and a mailbox with the given password.
async fn make_user(store: &VmailStore, email: &str, password: &str) {
    commands::add_mailbox(store, email, Some(password), true)
        .await
        .unwrap();
}

// ---- chpasswd ----

#[tokio::test]
async fn test_change_password() {
    let store = store().await;

    // Valid usernames, and yes, the last one really is valid.
    for username in ["john", "john.smith", "~`!#$%^&*-_+={}./?|"] {
        let email = format!("{}@example.org", username);
        make_user(&store, &email, "password").await;

        commands::change_password(&store, &email, "password", "new_password")
            .await
            .unwrap();

        let domain = store.find_domain("example.org").await.unwrap().unwrap();
        let user = store.find_user(username, &domain).await.unwrap().unwrap();
        assert!(user.check_password("new_password"));
        assert!(!user.check_password("password"));
    }
}

#[tokio::test]
async fn test_change_password_bad_old_password() {
    let store = store().await;
    make_user(&store, "john@example.org", "password").await;

    let domain = store.find_domain("example.org").await.unwrap().unwrap();
    let before = store.find_user("john", &domain).await.unwrap().unwrap();

    let err = commands::change_password(&store, "john@example.org", "old pw", "new pw")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::AuthenticationFailed));

    // Stored hash untouched; the real password still validates
    let after = store.find_user("john", &domain).await.unwrap().unwrap();
    assert_eq!(after.shadigest, before.shadigest);
    assert_eq!(after.salt, before.salt);
    assert!(after.check_password("password"));
}

#[tokio::test]
async fn test_change_password_bad_email() {
    let store = store().await;

    for email in ["", "@", "a@b.c", " a@b.c "] {
        let err = commands::change_password(&store, email, "old", "new")
            .await
            .unwrap_err();
        assert!(matches!(err, VmadminError::Validation(_)), "email: '{}'", email);
    }
}

#[tokio::test]
async fn test_change_password_bad_domain() {
    let store = store().await;
    make_user(&store, "john@example.org", "password").await;

    let err = commands::change_password(&store, "john@bad.domain.com", "old", "new")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::DomainNotFound(_)));
}

#[tokio::test]
async fn test_change_password_bad_mailuser() {
    let store = store().await;
    store.create_domain("example.org").await.unwrap();

    let err = commands::change_password(&store, "bad_mailuser@example.org", "old", "new")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::UserNotFound(_)));
}

// ---- setpasswd ----

#[tokio::test]
async fn test_set_password() {
    let store = store().await;

    for username in ["john", "john.smith", "~`!#$%^&*-_+={}./?|"] {
        let email = format!("{}@example.org", username);
        make_user(&store, &email, "password").await;

        commands::set_password(&store, &email, "new_password")
            .await
            .unwrap();

        let domain = store.find_domain("example.org").await.unwrap().unwrap();
        let user = store.find_user(username, &domain).await.unwrap().unwrap();
        assert!(user.check_password("new_password"));
    }
}

#[tokio::test]
async fn test_set_password_bad_email() {
    let store = store().await;

    for email in ["", "@", "a@b.c", " a@b.c "] {
        let err = commands::set_password(&store, email, "new").await.unwrap_err();
        assert!(matches!(err, VmadminError::Validation(_)), "email: '{}'", email);
    }
}

#[tokio::test]
async fn test_set_password_bad_domain() {
    let store = store().await;

    let err = commands::set_password(&store, "john@bad.domain.com", "new")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::DomainNotFound(_)));
}

#[tokio::test]
async fn test_set_password_bad_mailuser() {
    let store = store().await;
    store.create_domain("example.org").await.unwrap();

    let err = commands::set_password(&store, "bad_mailuser@example.org", "new")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::UserNotFound(_)));
}

// ---- addmbox ----

#[tokio::test]
async fn test_add_mailbox_bad_email() {
    let store = store().await;

    for email in ["", "@", "a@b.c", " a@b.c "] {
        let err = commands::add_mailbox(&store, email, None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, VmadminError::Validation(_)), "email: '{}'", email);
    }
}

#[tokio::test]
async fn test_add_mailbox_user_already_exists() {
    let store = store().await;
    make_user(&store, "john@example.org", "password").await;

    let err = commands::add_mailbox(&store, "john@example.org", None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::AlreadyExists(_)));
}

#[tokio::test]
async fn test_add_mailbox() {
    let store = store().await;
    store.create_domain("example.org").await.unwrap();

    let user = commands::add_mailbox(&store, "me@example.org", None, false)
        .await
        .unwrap();
    assert_eq!(user.username, "me");
    assert_eq!(user.domain_fqdn, "example.org");
}

#[tokio::test]
async fn test_add_mailbox_domain_not_exists() {
    let store = store().await;

    let err = commands::add_mailbox(&store, "me@unknown-unique.com", None, false)
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::DomainNotFound(_)));

    // With --create-domain both the domain and the mailbox are created
    let user = commands::add_mailbox(&store, "me@unknown-unique.com", None, true)
        .await
        .unwrap();
    assert_eq!(user.username, "me");
    assert_eq!(user.domain_fqdn, "unknown-unique.com");
    assert!(store
        .find_domain("unknown-unique.com")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn test_add_mailbox_with_password() {
    let store = store().await;
    store.create_domain("example.org").await.unwrap();

    let user = commands::add_mailbox(&store, "me@example.org", Some("my_new_password"), false)
        .await
        .unwrap();
    assert!(user.check_password("my_new_password"));
}

#[tokio::test]
async fn test_add_mailbox_without_password_rejects_all() {
    let store = store().await;
    store.create_domain("example.org").await.unwrap();

    let user = commands::add_mailbox(&store, "me@example.org", None, false)
        .await
        .unwrap();
    assert!(!user.check_password(""));
    assert!(!user.check_password("anything"));
}

// ---- addalias ----

#[tokio::test]
async fn test_add_alias() {
    let store = store().await;
    store.create_domain("example.net").await.unwrap();

    let alias = commands::add_alias(&store, "example.net", "alice@example.com", "alice@example.org")
        .await
        .unwrap();
    assert!(alias.active);
    assert_eq!(alias.source, "alice@example.com");
    assert_eq!(alias.destination, "alice@example.org");
}

#[tokio::test]
async fn test_add_catchall() {
    let store = store().await;
    store.create_domain("example.net").await.unwrap();

    let alias = commands::add_alias(&store, "example.net", "@example.com", "alice@example.org")
        .await
        .unwrap();
    assert!(alias.active);
    assert_eq!(alias.source, "@example.com");
}

#[tokio::test]
async fn test_add_alias_domain_has_at_symbol() {
    let store = store().await;
    store.create_domain("example.net").await.unwrap();

    let alias = commands::add_alias(&store, "@example.net", "alice@example.com", "alice@example.org")
        .await
        .unwrap();
    assert_eq!(alias.domain_fqdn, "example.net");

    // Same alias without the prefix is the same row, so a duplicate
    let err = commands::add_alias(&store, "example.net", "alice@example.com", "alice@example.org")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::UniquenessViolation(_)));
}

#[tokio::test]
async fn test_add_alias_bad_destination_email() {
    let store = store().await;
    store.create_domain("example.net").await.unwrap();

    for destination in ["", "@", "a@b.c", " a@b.c "] {
        let err = commands::add_alias(&store, "example.net", "alice@example.com", destination)
            .await
            .unwrap_err();
        assert!(
            matches!(err, VmadminError::Validation(_)),
            "destination: '{}'",
            destination
        );
    }
}

#[tokio::test]
async fn test_add_alias_unknown_domain() {
    let store = store().await;

    let err = commands::add_alias(&store, "unknown.net", "alice@example.com", "alice@example.org")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::DomainNotFound(_)));
}

#[tokio::test]
async fn test_add_alias_exists() {
    let store = store().await;
    store.create_domain("example.net").await.unwrap();

    commands::add_alias(&store, "example.net", "alice@example.com", "alice@example.org")
        .await
        .unwrap();
    let err = commands::add_alias(&store, "example.net", "alice@example.com", "alice@example.org")
        .await
        .unwrap_err();
    assert!(matches!(err, VmadminError::UniquenessViolation(_)));
}

// ---- adddomain / deldomain ----

#[tokio::test]
async fn test_add_domain() {
    let store = store().await;

    let domain = commands::add_domain(&store, "Example.ORG").await.unwrap();
    assert_eq!(domain.fqdn, "example.org");

    let err = commands::add_domain(&store, "example.org").await.unwrap_err();
    assert!(matches!(err, VmadminError::UniquenessViolation(_)));
}

#[tokio::test]
async fn test_add_domain_bad_fqdn() {
    let store = store().await;

    for fqdn in ["", "example", "example.o", " example.org "] {
        let err = commands::add_domain(&store, fqdn).await.unwrap_err();
        assert!(matches!(err, VmadminError::Validation(_)), "fqdn: '{}'", fqdn);
    }
}

#[tokio::test]
async fn test_delete_domain() {
    let store = store().await;
    make_user(&store, "john@example.org", "password").await;

    commands::delete_domain(&store, "example.org").await.unwrap();
    assert!(store.find_domain("example.org").await.unwrap().is_none());
}

// ---- command dispatch ----

#[tokio::test]
async fn test_run_writes_to_sink() {
    let store = store().await;
    let mut out = Vec::new();

    cli::run(
        Command::Adddomain {
            fqdn: "example.org".to_string(),
        },
        &store,
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), "Domain example.org added\n");
}

#[tokio::test]
async fn test_run_deldomain_requires_confirmation() {
    let store = store().await;
    store.create_domain("example.org").await.unwrap();
    let mut out = Vec::new();

    let err = cli::run(
        Command::Deldomain {
            fqdn: "example.org".to_string(),
            yes: false,
        },
        &store,
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, VmadminError::Validation(_)));
    assert!(store.find_domain("example.org").await.unwrap().is_some());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_run_list() {
    let store = store().await;
    make_user(&store, "john@example.org", "password").await;
    commands::add_alias(&store, "example.org", "bob@example.org", "robert@example.org")
        .await
        .unwrap();

    let mut out = Vec::new();
    cli::run(Command::List, &store, &mut out).await.unwrap();

    let output = String::from_utf8(out).unwrap();
    assert!(output.contains("example.org"));
    assert!(output.contains("mailbox john@example.org"));
    assert!(output.contains("alias   example.org: bob@example.org > robert@example.org"));
}
