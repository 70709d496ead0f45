//! SQLite-backed persistence for domains, mailboxes and aliases
//!
//! Uniqueness is enforced twice: an application-level pre-check here for a
//! clear error message, and a `COLLATE NOCASE` unique constraint in the
//! schema as the final authority against concurrent creators. Constraint
//! violations surfaced by SQLite are translated into the crate error
//! taxonomy rather than leaked as raw database errors.
//!
//! Foreign keys are enabled on every connection, so deleting a domain
//! cascades to its mailboxes and aliases.

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::{Result, VmadminError};
use crate::model::{Alias, Domain, MailUser};
use crate::security::ssha;

/// Persistence handle for the virtual mail tables.
#[derive(Clone)]
pub struct VmailStore {
    pub db: Arc<SqlitePool>,
}

impl VmailStore {
    /// Open the database (creating the file if necessary) and ensure the
    /// schema exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let db = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS domains (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                fqdn TEXT NOT NULL COLLATE NOCASE UNIQUE,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mail_users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL COLLATE NOCASE,
                domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
                salt BLOB NOT NULL,
                shadigest TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (username, domain_id)
            )
            "#,
        )
        .execute(&db)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS aliases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                domain_id INTEGER NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
                source TEXT NOT NULL COLLATE NOCASE,
                destination TEXT NOT NULL COLLATE NOCASE,
                active INTEGER NOT NULL DEFAULT 1,
                UNIQUE (domain_id, source, destination)
            )
            "#,
        )
        .execute(&db)
        .await?;

        Ok(Self { db: Arc::new(db) })
    }

    // ---- domains ----

    /// Create a domain. The name is lowercased before storage; a name that
    /// normalizes to an existing one fails with a uniqueness violation.
    pub async fn create_domain(&self, fqdn: &str) -> Result<Domain> {
        let fqdn = Domain::normalize(fqdn);
        info!("Creating domain: {}", fqdn);

        if self.find_domain(&fqdn).await?.is_some() {
            return Err(VmadminError::UniquenessViolation(format!(
                "domain '{}' already exists",
                fqdn
            )));
        }

        let id = sqlx::query(
            r#"
            INSERT INTO domains (fqdn, created_at)
            VALUES (?, datetime('now'))
            "#,
        )
        .bind(&fqdn)
        .execute(&*self.db)
        .await
        .map_err(|e| unique_violation(e, format!("domain '{}' already exists", fqdn)))?
        .last_insert_rowid();

        self.domain_by_id(id).await
    }

    /// Look up a domain by name. The query input is normalized the same way
    /// stored names are, so lookups are case-insensitive.
    pub async fn find_domain(&self, fqdn: &str) -> Result<Option<Domain>> {
        let fqdn = Domain::normalize(fqdn);

        let row = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT id, fqdn, created_at FROM domains WHERE fqdn = ?
            "#,
        )
        .bind(&fqdn)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(|(id, fqdn, created_at)| Domain { id, fqdn, created_at }))
    }

    /// Delete a domain. Cascades to its mailboxes and aliases.
    pub async fn delete_domain(&self, fqdn: &str) -> Result<()> {
        let domain = self
            .find_domain(fqdn)
            .await?
            .ok_or_else(|| VmadminError::DomainNotFound(Domain::normalize(fqdn)))?;

        info!("Deleting domain: {} (cascades to mailboxes and aliases)", domain);

        sqlx::query("DELETE FROM domains WHERE id = ?")
            .bind(domain.id)
            .execute(&*self.db)
            .await?;

        Ok(())
    }

    /// List all domains, sorted by name.
    pub async fn list_domains(&self) -> Result<Vec<Domain>> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT id, fqdn, created_at FROM domains ORDER BY fqdn
            "#,
        )
        .fetch_all(&*self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, fqdn, created_at)| Domain { id, fqdn, created_at })
            .collect())
    }

    async fn domain_by_id(&self, id: i64) -> Result<Domain> {
        let (id, fqdn, created_at) = sqlx::query_as::<_, (i64, String, String)>(
            r#"
            SELECT id, fqdn, created_at FROM domains WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&*self.db)
        .await?;

        Ok(Domain { id, fqdn, created_at })
    }

    // ---- mail users ----

    /// Create a mailbox under an existing domain.
    ///
    /// The username is lowercased before storage. Without a password the
    /// mailbox gets an empty credential that rejects every candidate until
    /// a password is set.
    pub async fn create_user(
        &self,
        username: &str,
        domain: &Domain,
        password: Option<&str>,
    ) -> Result<MailUser> {
        let username = MailUser::normalize_username(username);
        info!("Creating mailbox: {}@{}", username, domain.fqdn);

        if self.find_user(&username, domain).await?.is_some() {
            return Err(VmadminError::UniquenessViolation(format!(
                "mailbox '{}@{}' already exists",
                username, domain.fqdn
            )));
        }

        let (shadigest, salt) = match password {
            Some(plaintext) => ssha::hash_password(plaintext),
            None => (String::new(), Vec::new()),
        };

        let id = sqlx::query(
            r#"
            INSERT INTO mail_users (username, domain_id, salt, shadigest, created_at)
            VALUES (?, ?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&username)
        .bind(domain.id)
        .bind(&salt)
        .bind(&shadigest)
        .execute(&*self.db)
        .await
        .map_err(|e| {
            unique_violation(
                e,
                format!("mailbox '{}@{}' already exists", username, domain.fqdn),
            )
        })?
        .last_insert_rowid();

        self.user_by_id(id).await
    }

    /// Create a mailbox, optionally creating its domain first. Both writes
    /// happen in one transaction so a failure leaves no partial state.
    ///
    /// An unknown domain is an error unless `create_domain` is set; an
    /// existing mailbox is reported as [`VmadminError::AlreadyExists`].
    pub async fn create_mailbox(
        &self,
        username: &str,
        fqdn: &str,
        password: Option<&str>,
        create_domain: bool,
    ) -> Result<MailUser> {
        let username = MailUser::normalize_username(username);
        let fqdn = Domain::normalize(fqdn);

        let mut tx = self.db.begin().await?;

        let domain_row = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT id, fqdn FROM domains WHERE fqdn = ?
            "#,
        )
        .bind(&fqdn)
        .fetch_optional(&mut *tx)
        .await?;

        let (domain_id, domain_fqdn) = match domain_row {
            Some((id, fqdn)) => (id, fqdn),
            None if create_domain => {
                info!("Creating domain: {}", fqdn);
                let id = sqlx::query(
                    r#"
                    INSERT INTO domains (fqdn, created_at)
                    VALUES (?, datetime('now'))
                    "#,
                )
                .bind(&fqdn)
                .execute(&mut *tx)
                .await
                .map_err(|e| unique_violation(e, format!("domain '{}' already exists", fqdn)))?
                .last_insert_rowid();
                (id, fqdn.clone())
            }
            None => return Err(VmadminError::DomainNotFound(fqdn)),
        };

        let existing: Option<(i64,)> = sqlx::query_as(
            r#"
            SELECT id FROM mail_users WHERE username = ? AND domain_id = ?
            "#,
        )
        .bind(&username)
        .bind(domain_id)
        .fetch_optional(&mut *tx)
        .await?;

        if existing.is_some() {
            return Err(VmadminError::AlreadyExists(format!(
                "mailbox '{}@{}'",
                username, domain_fqdn
            )));
        }

        let (shadigest, salt) = match password {
            Some(plaintext) => ssha::hash_password(plaintext),
            None => (String::new(), Vec::new()),
        };

        let id = sqlx::query(
            r#"
            INSERT INTO mail_users (username, domain_id, salt, shadigest, created_at)
            VALUES (?, ?, ?, ?, datetime('now'))
            "#,
        )
        .bind(&username)
        .bind(domain_id)
        .bind(&salt)
        .bind(&shadigest)
        .execute(&mut *tx)
        .await
        .map_err(|e| already_exists(e, format!("mailbox '{}@{}'", username, domain_fqdn)))?
        .last_insert_rowid();

        tx.commit().await?;

        info!("Mailbox created: {}@{}", username, domain_fqdn);
        self.user_by_id(id).await
    }

    /// Look up a mailbox by username within a domain, case-insensitively.
    pub async fn find_user(&self, username: &str, domain: &Domain) -> Result<Option<MailUser>> {
        let username = MailUser::normalize_username(username);

        let row = sqlx::query_as::<_, (i64, String, i64, Vec<u8>, String, String)>(
            r#"
            SELECT id, username, domain_id, salt, shadigest, created_at
            FROM mail_users
            WHERE username = ? AND domain_id = ?
            "#,
        )
        .bind(&username)
        .bind(domain.id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(|(id, username, domain_id, salt, shadigest, created_at)| MailUser {
            id,
            username,
            domain_id,
            domain_fqdn: domain.fqdn.clone(),
            salt,
            shadigest,
            created_at,
        }))
    }

    /// Persist a changed credential. A single UPDATE, so the mutation is
    /// atomic.
    pub async fn save_password(&self, user: &MailUser) -> Result<()> {
        debug!("Updating credential for {}", user);

        sqlx::query(
            r#"
            UPDATE mail_users SET salt = ?, shadigest = ? WHERE id = ?
            "#,
        )
        .bind(&user.salt)
        .bind(&user.shadigest)
        .bind(user.id)
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// List the mailboxes of a domain.
    pub async fn list_users(&self, domain: &Domain) -> Result<Vec<MailUser>> {
        let rows = sqlx::query_as::<_, (i64, String, i64, Vec<u8>, String, String)>(
            r#"
            SELECT id, username, domain_id, salt, shadigest, created_at
            FROM mail_users
            WHERE domain_id = ?
            ORDER BY username
            "#,
        )
        .bind(domain.id)
        .fetch_all(&*self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, username, domain_id, salt, shadigest, created_at)| MailUser {
                id,
                username,
                domain_id,
                domain_fqdn: domain.fqdn.clone(),
                salt,
                shadigest,
                created_at,
            })
            .collect())
    }

    async fn user_by_id(&self, id: i64) -> Result<MailUser> {
        let (id, username, domain_id, domain_fqdn, salt, shadigest, created_at) =
            sqlx::query_as::<_, (i64, String, i64, String, Vec<u8>, String, String)>(
                r#"
                SELECT u.id, u.username, u.domain_id, d.fqdn, u.salt, u.shadigest, u.created_at
                FROM mail_users u
                JOIN domains d ON d.id = u.domain_id
                WHERE u.id = ?
                "#,
            )
            .bind(id)
            .fetch_one(&*self.db)
            .await?;

        Ok(MailUser {
            id,
            username,
            domain_id,
            domain_fqdn,
            salt,
            shadigest,
            created_at,
        })
    }

    // ---- aliases ----

    /// Create a forwarding alias. Source and destination are lowercased
    /// before storage; the (domain, source, destination) triple must be
    /// unique case-insensitively.
    pub async fn create_alias(
        &self,
        domain: &Domain,
        source: &str,
        destination: &str,
        active: bool,
    ) -> Result<Alias> {
        let source = Alias::normalize_address(source);
        let destination = Alias::normalize_address(destination);
        info!("Creating alias: {}: {} > {}", domain.fqdn, source, destination);

        if self.find_alias(domain, &source, &destination).await?.is_some() {
            return Err(VmadminError::UniquenessViolation(format!(
                "alias '{}: {} > {}' already exists",
                domain.fqdn, source, destination
            )));
        }

        let id = sqlx::query(
            r#"
            INSERT INTO aliases (domain_id, source, destination, active)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(domain.id)
        .bind(&source)
        .bind(&destination)
        .bind(active)
        .execute(&*self.db)
        .await
        .map_err(|e| {
            unique_violation(
                e,
                format!(
                    "alias '{}: {} > {}' already exists",
                    domain.fqdn, source, destination
                ),
            )
        })?
        .last_insert_rowid();

        self.alias_by_id(id).await
    }

    /// Look up an alias by its (source, destination) pair within a domain.
    pub async fn find_alias(
        &self,
        domain: &Domain,
        source: &str,
        destination: &str,
    ) -> Result<Option<Alias>> {
        let source = Alias::normalize_address(source);
        let destination = Alias::normalize_address(destination);

        let row = sqlx::query_as::<_, (i64, i64, String, String, bool)>(
            r#"
            SELECT id, domain_id, source, destination, active
            FROM aliases
            WHERE domain_id = ? AND source = ? AND destination = ?
            "#,
        )
        .bind(domain.id)
        .bind(&source)
        .bind(&destination)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(|(id, domain_id, source, destination, active)| Alias {
            id,
            domain_id,
            domain_fqdn: domain.fqdn.clone(),
            source,
            destination,
            active,
        }))
    }

    /// List the aliases of a domain.
    pub async fn list_aliases(&self, domain: &Domain) -> Result<Vec<Alias>> {
        let rows = sqlx::query_as::<_, (i64, i64, String, String, bool)>(
            r#"
            SELECT id, domain_id, source, destination, active
            FROM aliases
            WHERE domain_id = ?
            ORDER BY source, destination
            "#,
        )
        .bind(domain.id)
        .fetch_all(&*self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, domain_id, source, destination, active)| Alias {
                id,
                domain_id,
                domain_fqdn: domain.fqdn.clone(),
                source,
                destination,
                active,
            })
            .collect())
    }

    async fn alias_by_id(&self, id: i64) -> Result<Alias> {
        let (id, domain_id, domain_fqdn, source, destination, active) =
            sqlx::query_as::<_, (i64, i64, String, String, String, bool)>(
                r#"
                SELECT a.id, a.domain_id, d.fqdn, a.source, a.destination, a.active
                FROM aliases a
                JOIN domains d ON d.id = a.domain_id
                WHERE a.id = ?
                "#,
            )
            .bind(id)
            .fetch_one(&*self.db)
            .await?;

        Ok(Alias {
            id,
            domain_id,
            domain_fqdn,
            source,
            destination,
            active,
        })
    }
}

/// Translate a storage-level unique constraint violation into the crate
/// taxonomy; anything else stays a database error.
fn unique_violation(err: sqlx::Error, message: String) -> VmadminError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            VmadminError::UniquenessViolation(message)
        }
        _ => VmadminError::Database(err),
    }
}

/// Like [`unique_violation`], but for provisioning targets where the
/// contract names the condition `AlreadyExists`.
fn already_exists(err: sqlx::Error, message: String) -> VmadminError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            VmadminError::AlreadyExists(message)
        }
        _ => VmadminError::Database(err),
    }
}
