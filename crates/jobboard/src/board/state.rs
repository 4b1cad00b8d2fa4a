use std::sync::Arc;

use super::applications::{ApplicationRepository, ApplicationService};
use super::jobs::{JobRepository, JobService};
use crate::clock::{Clock, SystemClock};
use crate::config::UploadConfig;
use crate::identity::{Argon2Hasher, IdentityService, PasswordHasher, UserDirectory};

/// Services shared by the job and application routes.
pub struct BoardState<U, J, A> {
    pub identity: Arc<IdentityService<U>>,
    pub jobs: Arc<JobService<J, A>>,
    pub applications: Arc<ApplicationService<U, J, A>>,
}

impl<U, J, A> Clone for BoardState<U, J, A> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            jobs: self.jobs.clone(),
            applications: self.applications.clone(),
        }
    }
}

impl<U, J, A> BoardState<U, J, A>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(users: Arc<U>, jobs: Arc<J>, applications: Arc<A>, uploads: UploadConfig) -> Self {
        Self::with_clock(users, jobs, applications, uploads, Arc::new(SystemClock))
    }

    pub fn with_clock(
        users: Arc<U>,
        jobs: Arc<J>,
        applications: Arc<A>,
        uploads: UploadConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_parts(
            users,
            jobs,
            applications,
            uploads,
            Arc::new(Argon2Hasher::default()),
            clock,
        )
    }

    /// Wire every service against the same stores, hasher and time source.
    pub fn with_parts(
        users: Arc<U>,
        jobs: Arc<J>,
        applications: Arc<A>,
        uploads: UploadConfig,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let identity = IdentityService::with_parts(users.clone(), hasher, clock.clone());
        let job_service = JobService::with_clock(jobs.clone(), applications.clone(), clock.clone());
        let application_service =
            ApplicationService::with_clock(users, jobs, applications, uploads, clock);

        Self {
            identity: Arc::new(identity),
            jobs: Arc::new(job_service),
            applications: Arc::new(application_service),
        }
    }
}
