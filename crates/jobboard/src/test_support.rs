//! In-memory stores and fixtures shared by the unit tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::http::HeaderValue;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::board::applications::{
    Application, ApplicationId, ApplicationRepository, NewApplication, ResumeColumn,
};
use crate::board::jobs::{Job, JobId, JobRepository, NewJob};
use crate::board::BoardState;
use crate::clock::Clock;
use crate::config::UploadConfig;
use crate::identity::password::fast_hasher;
use crate::identity::{Actor, NewUser, Registration, User, UserDirectory, UserId};
use crate::repository::RepositoryError;

pub(crate) const PASSWORD: &str = "correct horse battery";

/// Clock that moves forward one second on every read.
pub(crate) struct ManualClock {
    ticks: AtomicU64,
    origin: DateTime<Utc>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            origin: Utc
                .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
                .single()
                .expect("valid origin"),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.origin + Duration::seconds(tick as i64)
    }
}

#[derive(Default)]
pub(crate) struct MemoryDirectory {
    users: Mutex<BTreeMap<UserId, User>>,
    next: AtomicU64,
}

impl UserDirectory for MemoryDirectory {
    fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut guard = self.users.lock().expect("directory mutex");
        if guard.values().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::Conflict);
        }
        let id = UserId(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        let user = user.with_id(id);
        guard.insert(id, user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = self.users.lock().expect("directory mutex");
        match guard.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.lock().expect("directory mutex").get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let guard = self.users.lock().expect("directory mutex");
        Ok(guard.values().find(|user| user.email == email).cloned())
    }
}

#[derive(Default)]
pub(crate) struct MemoryJobs {
    jobs: Mutex<BTreeMap<JobId, Job>>,
    next: AtomicU64,
}

impl JobRepository for MemoryJobs {
    fn insert(&self, job: NewJob) -> Result<Job, RepositoryError> {
        let id = JobId(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        let job = job.with_id(id);
        self.jobs.lock().expect("jobs mutex").insert(id, job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = self.jobs.lock().expect("jobs mutex");
        match guard.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(self.jobs.lock().expect("jobs mutex").get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        let mut jobs: Vec<Job> = self.jobs.lock().expect("jobs mutex").values().cloned().collect();
        jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then(b.id.0.cmp(&a.id.0)));
        Ok(jobs)
    }

    fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        self.jobs
            .lock()
            .expect("jobs mutex")
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub(crate) struct MemoryApplications {
    rows: Mutex<BTreeMap<ApplicationId, Application>>,
    next: AtomicU64,
}

impl MemoryApplications {
    /// Raw stored row, bypassing the list/detail loading rules.
    pub(crate) fn stored(&self, id: ApplicationId) -> Option<Application> {
        self.rows.lock().expect("applications mutex").get(&id).cloned()
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.lock().expect("applications mutex").len()
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: NewApplication) -> Result<Application, RepositoryError> {
        let mut guard = self.rows.lock().expect("applications mutex");
        if guard
            .values()
            .any(|row| row.applicant == application.applicant && row.job == application.job)
        {
            return Err(RepositoryError::Conflict);
        }
        let id = ApplicationId(self.next.fetch_add(1, Ordering::SeqCst) + 1);
        let row = application.with_id(id);
        guard.insert(id, row.clone());
        Ok(row)
    }

    fn update(&self, mut application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.rows.lock().expect("applications mutex");
        let Some(slot) = guard.get_mut(&application.id) else {
            return Err(RepositoryError::NotFound);
        };
        if let ResumeColumn::Deferred(_) = application.resume {
            application.resume = slot.resume.clone();
        }
        *slot = application;
        Ok(())
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.stored(id))
    }

    fn find_by_pair(
        &self,
        applicant: UserId,
        job: JobId,
    ) -> Result<Option<ApplicationId>, RepositoryError> {
        let guard = self.rows.lock().expect("applications mutex");
        Ok(guard
            .values()
            .find(|row| row.applicant == applicant && row.job == job)
            .map(|row| row.id))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.rows.lock().expect("applications mutex");
        let mut rows: Vec<Application> = guard
            .values()
            .map(|row| Application {
                resume: row.resume.deferred(),
                ..row.clone()
            })
            .collect();
        rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.0.cmp(&a.id.0)));
        Ok(rows)
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.rows
            .lock()
            .expect("applications mutex")
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn delete_for_job(&self, job: JobId) -> Result<usize, RepositoryError> {
        let mut guard = self.rows.lock().expect("applications mutex");
        let before = guard.len();
        guard.retain(|_, row| row.job != job);
        Ok(before - guard.len())
    }
}

/// Store whose pre-check never sees the competing row, so only the unique
/// constraint on insert catches the duplicate.
#[derive(Default)]
pub(crate) struct RacingApplications {
    inner: MemoryApplications,
}

impl ApplicationRepository for RacingApplications {
    fn insert(&self, _application: NewApplication) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        self.inner.update(application)
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_pair(
        &self,
        _applicant: UserId,
        _job: JobId,
    ) -> Result<Option<ApplicationId>, RepositoryError> {
        Ok(None)
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        self.inner.list()
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn delete_for_job(&self, job: JobId) -> Result<usize, RepositoryError> {
        self.inner.delete_for_job(job)
    }
}

/// Store that lets a pending job deletion finish just before the next insert
/// lands, as when a job is deleted while an application is being filed.
#[derive(Default)]
pub(crate) struct JobDeletedDuringInsert {
    inner: MemoryApplications,
    jobs: Mutex<Option<Arc<MemoryJobs>>>,
}

impl JobDeletedDuringInsert {
    pub(crate) fn arm(&self, jobs: Arc<MemoryJobs>) {
        *self.jobs.lock().expect("armed jobs mutex") = Some(jobs);
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }
}

impl ApplicationRepository for JobDeletedDuringInsert {
    fn insert(&self, application: NewApplication) -> Result<Application, RepositoryError> {
        if let Some(jobs) = self.jobs.lock().expect("armed jobs mutex").take() {
            jobs.delete(application.job)?;
            self.inner.delete_for_job(application.job)?;
        }
        self.inner.insert(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        self.inner.update(application)
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn find_by_pair(
        &self,
        applicant: UserId,
        job: JobId,
    ) -> Result<Option<ApplicationId>, RepositoryError> {
        self.inner.find_by_pair(applicant, job)
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        self.inner.list()
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        self.inner.delete(id)
    }

    fn delete_for_job(&self, job: JobId) -> Result<usize, RepositoryError> {
        self.inner.delete_for_job(job)
    }
}

pub(crate) struct Board<A = MemoryApplications> {
    pub(crate) state: BoardState<MemoryDirectory, MemoryJobs, A>,
    pub(crate) users: Arc<MemoryDirectory>,
    pub(crate) jobs: Arc<MemoryJobs>,
    pub(crate) applications: Arc<A>,
}

pub(crate) fn board() -> Board {
    board_with(MemoryApplications::default(), UploadConfig::default())
}

pub(crate) fn board_with<A>(applications: A, uploads: UploadConfig) -> Board<A>
where
    A: ApplicationRepository + 'static,
{
    let users = Arc::new(MemoryDirectory::default());
    let jobs = Arc::new(MemoryJobs::default());
    let applications = Arc::new(applications);
    let state = BoardState::with_parts(
        users.clone(),
        jobs.clone(),
        applications.clone(),
        uploads,
        Arc::new(fast_hasher()),
        Arc::new(ManualClock::default()),
    );
    Board {
        state,
        users,
        jobs,
        applications,
    }
}

impl<A> Board<A>
where
    A: ApplicationRepository + 'static,
{
    /// Register a user with the given role flags and return it as an actor.
    pub(crate) fn member(&self, email: &str, employer: bool, applicant: bool) -> Actor {
        let user = self
            .state
            .identity
            .register(
                &Actor::Anonymous,
                Registration {
                    email: email.to_string(),
                    password: PASSWORD.to_string(),
                    full_name: Some(format!("Member {email}")),
                    is_employer: employer,
                    is_applicant: applicant,
                    is_superuser: false,
                },
            )
            .expect("registration succeeds");
        Actor::User(user)
    }

    pub(crate) fn superuser(&self, email: &str) -> Actor {
        let user = self
            .state
            .identity
            .ensure_superuser(email, PASSWORD)
            .expect("superuser provisioned");
        Actor::User(user)
    }

    pub(crate) fn post_job(&self, employer: &Actor, title: &str) -> Job {
        self.state
            .jobs
            .create(
                employer,
                crate::board::jobs::JobDraft {
                    title: title.to_string(),
                    description: "Build and run services".to_string(),
                    location: "Remote".to_string(),
                    salary: 95_000,
                },
            )
            .expect("job posted")
    }
}

pub(crate) fn basic_auth(email: &str, password: &str) -> HeaderValue {
    let token = STANDARD.encode(format!("{email}:{password}"));
    HeaderValue::from_str(&format!("Basic {token}")).expect("valid header")
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
