/*
 * Responsibility
 * - What the repos report upward, beyond "the database failed"
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error")]
    Db(#[from] sqlx::Error),
    #[error("conflict")]
    Conflict,
    #[error("foreign key violation")]
    ForeignKey,
    #[error("check constraint violation")]
    Check,
}

pub type RepoResult<T> = Result<T, RepoError>;

impl RepoError {
    /// Map constraint violations to their meaning; everything else stays a db error.
    pub fn from_sqlx(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(dbe) = &e {
            match dbe.code().as_deref() {
                Some("23505") => return RepoError::Conflict,
                Some("23503") => return RepoError::ForeignKey,
                Some("23514") => return RepoError::Check,
                _ => {}
            }
        }
        RepoError::Db(e)
    }
}
