use std::sync::Arc;

use tracing::info;

use super::domain::{Job, JobDraft, JobId, JobPatch, JobQuery, NewJob};
use super::repository::JobRepository;
use crate::board::applications::ApplicationRepository;
use crate::board::error::BoardError;
use crate::board::policy::{decide, Action, Target};
use crate::clock::{Clock, SystemClock};
use crate::identity::Actor;
use crate::repository::RepositoryError;

const MAX_TEXT_FIELD: usize = 255;

/// Service owning job postings and their lifecycle.
pub struct JobService<J, A> {
    jobs: Arc<J>,
    applications: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<J, A> JobService<J, A>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(jobs: Arc<J>, applications: Arc<A>) -> Self {
        Self::with_clock(jobs, applications, Arc::new(SystemClock))
    }

    pub fn with_clock(jobs: Arc<J>, applications: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            jobs,
            applications,
            clock,
        }
    }

    /// Public listing; no authentication involved.
    pub fn list(&self, query: &JobQuery) -> Result<Vec<Job>, BoardError> {
        let jobs = self.jobs.list()?;
        Ok(jobs.into_iter().filter(|job| query.matches(job)).collect())
    }

    pub fn get(&self, id: JobId) -> Result<Job, BoardError> {
        self.jobs
            .fetch(id)?
            .ok_or(BoardError::NotFound { resource: "job" })
    }

    pub fn create(&self, actor: &Actor, draft: JobDraft) -> Result<Job, BoardError> {
        let employer = actor.id().ok_or(BoardError::Unauthenticated)?;
        if !decide(actor, Action::Create, Target::Jobs).is_allowed() {
            return Err(BoardError::PermissionDenied(
                "only employers may post jobs",
            ));
        }

        let title = required_text("title", &draft.title)?;
        let location = required_text("location", &draft.location)?;

        let job = self.jobs.insert(NewJob {
            employer,
            title,
            description: draft.description.trim().to_string(),
            location,
            salary: draft.salary,
            posted_at: self.clock.now(),
        })?;

        info!(job_id = %job.id, employer = %job.employer, "job posted");
        Ok(job)
    }

    pub fn update(&self, actor: &Actor, id: JobId, patch: JobPatch) -> Result<Job, BoardError> {
        if !actor.is_authenticated() {
            return Err(BoardError::Unauthenticated);
        }

        let mut job = self.get(id)?;
        if !decide(actor, Action::Update, Target::Job(&job)).is_allowed() {
            return Err(BoardError::PermissionDenied(
                "only the posting employer may edit this job",
            ));
        }

        if let Some(title) = patch.title {
            job.title = required_text("title", &title)?;
        }
        if let Some(location) = patch.location {
            job.location = required_text("location", &location)?;
        }
        if let Some(description) = patch.description {
            job.description = description.trim().to_string();
        }
        if let Some(salary) = patch.salary {
            job.salary = salary;
        }
        job.updated_at = self.clock.now();

        self.jobs.update(job.clone()).map_err(|err| match err {
            RepositoryError::NotFound => BoardError::NotFound { resource: "job" },
            other => BoardError::Repository(other),
        })?;

        info!(job_id = %job.id, "job updated");
        Ok(job)
    }

    /// Delete a posting together with every application filed against it.
    pub fn delete(&self, actor: &Actor, id: JobId) -> Result<(), BoardError> {
        if !actor.is_authenticated() {
            return Err(BoardError::Unauthenticated);
        }

        let job = self.get(id)?;
        if !decide(actor, Action::Delete, Target::Job(&job)).is_allowed() {
            return Err(BoardError::PermissionDenied(
                "only the posting employer may delete this job",
            ));
        }

        self.jobs.delete(job.id)?;
        let removed = self.applications.delete_for_job(job.id)?;

        info!(job_id = %job.id, applications_removed = removed, "job deleted");
        Ok(())
    }
}

fn required_text(field: &'static str, raw: &str) -> Result<String, BoardError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(BoardError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_TEXT_FIELD {
        return Err(BoardError::Validation(format!(
            "{field} must be at most {MAX_TEXT_FIELD} characters"
        )));
    }
    Ok(value.to_string())
}
