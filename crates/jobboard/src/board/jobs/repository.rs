use super::domain::{Job, JobId, NewJob};
use crate::repository::RepositoryError;

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: NewJob) -> Result<Job, RepositoryError>;
    fn update(&self, job: Job) -> Result<(), RepositoryError>;
    fn fetch(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;
    /// All postings, newest first.
    fn list(&self) -> Result<Vec<Job>, RepositoryError>;
    fn delete(&self, id: JobId) -> Result<(), RepositoryError>;
}
