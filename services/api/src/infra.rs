use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

use jobboard::board::applications::{
    Application, ApplicationId, ApplicationRepository, NewApplication, ResumeColumn,
};
use jobboard::board::jobs::{Job, JobId, JobRepository, NewJob};
use jobboard::identity::{NewUser, User, UserDirectory, UserId};
use jobboard::repository::RepositoryError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{store} store lock poisoned")))
}

struct Table<K, V> {
    next_id: u64,
    rows: BTreeMap<K, V>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            next_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<K, V> Table<K, V> {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryUserDirectory {
    users: Arc<Mutex<Table<UserId, User>>>,
}

impl UserDirectory for InMemoryUserDirectory {
    fn insert(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut guard = lock(&self.users, "user")?;
        if guard.rows.values().any(|existing| existing.email == user.email) {
            return Err(RepositoryError::Conflict);
        }
        let id = UserId(guard.allocate());
        let user = user.with_id(id);
        guard.rows.insert(id, user.clone());
        Ok(user)
    }

    fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.users, "user")?;
        match guard.rows.get_mut(&user.id) {
            Some(slot) => {
                *slot = user;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(lock(&self.users, "user")?.rows.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let guard = lock(&self.users, "user")?;
        Ok(guard.rows.values().find(|user| user.email == email).cloned())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryJobRepository {
    jobs: Arc<Mutex<Table<JobId, Job>>>,
}

impl JobRepository for InMemoryJobRepository {
    fn insert(&self, job: NewJob) -> Result<Job, RepositoryError> {
        let mut guard = lock(&self.jobs, "job")?;
        let id = JobId(guard.allocate());
        let job = job.with_id(id);
        guard.rows.insert(id, job.clone());
        Ok(job)
    }

    fn update(&self, job: Job) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.jobs, "job")?;
        match guard.rows.get_mut(&job.id) {
            Some(slot) => {
                *slot = job;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        Ok(lock(&self.jobs, "job")?.rows.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Job>, RepositoryError> {
        let guard = lock(&self.jobs, "job")?;
        let mut jobs: Vec<Job> = guard.rows.values().cloned().collect();
        jobs.sort_by(|a, b| b.posted_at.cmp(&a.posted_at).then(b.id.cmp(&a.id)));
        Ok(jobs)
    }

    fn delete(&self, id: JobId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.jobs, "job")?;
        guard
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
struct ApplicationTable {
    table: Table<ApplicationId, Application>,
    by_pair: HashMap<(UserId, JobId), ApplicationId>,
}

/// Application store with a unique (applicant, job) index. The index check
/// and the insert happen under one lock.
#[derive(Default, Clone)]
pub(crate) struct InMemoryApplicationRepository {
    state: Arc<Mutex<ApplicationTable>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: NewApplication) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.state, "application")?;
        let key = (application.applicant, application.job);
        if guard.by_pair.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        let id = ApplicationId(guard.table.allocate());
        let row = application.with_id(id);
        guard.table.rows.insert(id, row.clone());
        guard.by_pair.insert(key, id);
        Ok(row)
    }

    fn update(&self, mut application: Application) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.state, "application")?;
        let Some(slot) = guard.table.rows.get_mut(&application.id) else {
            return Err(RepositoryError::NotFound);
        };
        if let ResumeColumn::Deferred(_) = application.resume {
            application.resume = std::mem::take(&mut slot.resume);
        }
        *slot = application;
        Ok(())
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(lock(&self.state, "application")?.table.rows.get(&id).cloned())
    }

    fn find_by_pair(
        &self,
        applicant: UserId,
        job: JobId,
    ) -> Result<Option<ApplicationId>, RepositoryError> {
        let guard = lock(&self.state, "application")?;
        Ok(guard.by_pair.get(&(applicant, job)).copied())
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.state, "application")?;
        let mut rows: Vec<Application> = guard
            .table
            .rows
            .values()
            .map(|row| Application {
                id: row.id,
                applicant: row.applicant,
                job: row.job,
                status: row.status,
                cover_letter: row.cover_letter.clone(),
                resume: row.resume.deferred(),
                applied_at: row.applied_at,
                updated_at: row.updated_at,
            })
            .collect();
        rows.sort_by(|a, b| b.applied_at.cmp(&a.applied_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.state, "application")?;
        let row = guard
            .table
            .rows
            .remove(&id)
            .ok_or(RepositoryError::NotFound)?;
        guard.by_pair.remove(&(row.applicant, row.job));
        Ok(())
    }

    fn delete_for_job(&self, job: JobId) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.state, "application")?;
        let before = guard.table.rows.len();
        guard.table.rows.retain(|_, row| row.job != job);
        guard.by_pair.retain(|(_, pair_job), _| *pair_job != job);
        Ok(before - guard.table.rows.len())
    }
}
