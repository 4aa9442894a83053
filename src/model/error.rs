use thiserror::Error;

pub type DatabaseResult<T> = std::result::Result<T, DatabaseError>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("sqlx migrate error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),
    #[error("sqlx error: {0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("access to this resource is forbidden")]
    Forbidden,
}

impl DatabaseError {
    /// True when a unique constraint rejected the statement (duplicate email, double enrollment...).
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::SqlxError(sqlx::Error::Database(e)) => e.is_unique_violation(),
            _ => false,
        }
    }
}
