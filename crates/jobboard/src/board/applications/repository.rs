use super::domain::{Application, ApplicationId, NewApplication};
use crate::board::jobs::JobId;
use crate::identity::UserId;
use crate::repository::RepositoryError;

/// Storage abstraction for applications.
///
/// Implementations must treat (applicant, job) as a unique key: `insert`
/// returns [`RepositoryError::Conflict`] when the pair already exists, and the
/// check-and-insert must be atomic so concurrent writers cannot both succeed.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: NewApplication) -> Result<Application, RepositoryError>;
    /// Replace the stored row. A [`super::ResumeColumn::Deferred`] resume
    /// leaves the stored payload untouched.
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    /// Single-record read with the resume payload loaded.
    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn find_by_pair(
        &self,
        applicant: UserId,
        job: JobId,
    ) -> Result<Option<ApplicationId>, RepositoryError>;
    /// Bulk read, newest first, with every resume payload deferred.
    fn list(&self) -> Result<Vec<Application>, RepositoryError>;
    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError>;
    /// Remove every application filed against `job`, returning how many went.
    fn delete_for_job(&self, job: JobId) -> Result<usize, RepositoryError>;
}
