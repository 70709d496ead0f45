use thiserror::Error;

#[derive(Error, Debug)]
pub enum VmadminError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Uniqueness violation: {0}")]
    UniquenessViolation(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(String),

    #[error("Mail user not found: {0}")]
    UserNotFound(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, VmadminError>;
