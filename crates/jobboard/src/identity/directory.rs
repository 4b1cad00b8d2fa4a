use super::domain::{NewUser, User, UserId};
use crate::repository::RepositoryError;

/// Storage abstraction for user records.
///
/// `insert` must reject a second user with the same (normalized) email with
/// [`RepositoryError::Conflict`], mirroring a unique index on the column.
pub trait UserDirectory: Send + Sync {
    fn insert(&self, user: NewUser) -> Result<User, RepositoryError>;
    fn update(&self, user: User) -> Result<(), RepositoryError>;
    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
}
