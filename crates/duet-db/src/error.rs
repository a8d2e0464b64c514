//! Error type for `duet-db`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    LockPoisoned,

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("invitation not found: {0}")]
    InvitationNotFound(String),

    /// Accept or decline attempted after the invitation left `PENDING`.
    #[error("invitation {0} is already resolved")]
    AlreadyResolved(String),

    /// Caller matches neither the invitee account nor the invited email.
    #[error("caller is not the invitee of invitation {0}")]
    NotInvitee(String),

    /// One of the parties already has a pending or active relationship.
    #[error("{0} already has a pending or active relationship")]
    AlreadyLinked(String),

    #[error("corrupt {column} value '{value}' on relationship {id}")]
    CorruptRow {
        id: String,
        column: &'static str,
        value: String,
    },
}

pub type Result<T, E = DbError> = std::result::Result<T, E>;
