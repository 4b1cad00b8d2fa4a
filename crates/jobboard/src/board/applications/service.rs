use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::domain::{
    Application, ApplicationDraft, ApplicationId, ApplicationPatch, ApplicationStatus,
    NewApplication, ResumeColumn, ResumePayload,
};
use super::projection::{project, ApplicationView, LoadContext};
use super::repository::ApplicationRepository;
use crate::board::error::BoardError;
use crate::board::jobs::{Job, JobId, JobRepository};
use crate::board::policy::{decide, Action, Decision, Target};
use crate::clock::{Clock, SystemClock};
use crate::config::UploadConfig;
use crate::identity::{Actor, User, UserDirectory, UserId};
use crate::repository::RepositoryError;

const MAX_FILENAME_LEN: usize = 255;
const MAX_CONTENT_TYPE_LEN: usize = 100;

/// Service composing the policy, the stores and the projection layer.
pub struct ApplicationService<U, J, A> {
    users: Arc<U>,
    jobs: Arc<J>,
    applications: Arc<A>,
    uploads: UploadConfig,
    clock: Arc<dyn Clock>,
}

impl<U, J, A> ApplicationService<U, J, A>
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
        Self {
            users,
            jobs,
            applications,
            uploads,
            clock,
        }
    }

    pub fn uploads(&self) -> UploadConfig {
        self.uploads
    }

    /// File an application for `job_id` on behalf of the actor.
    pub fn create(
        &self,
        actor: &Actor,
        job_id: JobId,
        draft: ApplicationDraft,
    ) -> Result<ApplicationView, BoardError> {
        let applicant = actor.id().ok_or(BoardError::Unauthenticated)?;
        if !decide(actor, Action::Create, Target::Applications).is_allowed() {
            return Err(BoardError::PermissionDenied(
                "only applicants may apply to jobs",
            ));
        }

        let job = self.jobs.fetch(job_id)?.ok_or_else(|| {
            BoardError::Validation(format!("job {job_id} does not exist"))
        })?;

        if let Some(resume) = &draft.resume {
            self.validate_resume(resume)?;
        }

        if let Some(existing) = self.applications.find_by_pair(applicant, job.id)? {
            debug!(application_id = %existing, "duplicate application rejected by pre-check");
            return Err(BoardError::DuplicateApplication);
        }

        let application = self
            .applications
            .insert(NewApplication {
                applicant,
                job: job.id,
                status: ApplicationStatus::Pending,
                cover_letter: normalize_cover_letter(draft.cover_letter),
                resume: draft.resume,
                applied_at: self.clock.now(),
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => BoardError::DuplicateApplication,
                other => BoardError::Repository(other),
            })?;

        if self.jobs.fetch(job.id)?.is_none() {
            warn!(
                application_id = %application.id,
                job_id = %job.id,
                "job deleted while application was filed"
            );
            match self.applications.delete(application.id) {
                Ok(()) | Err(RepositoryError::NotFound) => {}
                Err(other) => return Err(other.into()),
            }
            return Err(BoardError::Validation(format!("job {job_id} does not exist")));
        }

        info!(
            application_id = %application.id,
            job_id = %job.id,
            applicant = %applicant,
            resume_bytes = application.resume.size(),
            "application submitted"
        );

        self.present(&application, Some(&job), LoadContext::Detail)
    }

    /// Applications visible to the actor, newest first, without resume payloads.
    pub fn list(&self, actor: &Actor) -> Result<Vec<ApplicationView>, BoardError> {
        if !actor.is_authenticated() {
            return Err(BoardError::Unauthenticated);
        }
        if !decide(actor, Action::List, Target::Applications).is_allowed() {
            return Err(BoardError::PermissionDenied("listing applications is not allowed"));
        }

        let mut jobs: HashMap<JobId, Option<Job>> = HashMap::new();
        let mut users: HashMap<UserId, Option<User>> = HashMap::new();
        let mut views = Vec::new();

        for application in self.applications.list()? {
            let job = match jobs.get(&application.job) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.jobs.fetch(application.job)?;
                    jobs.insert(application.job, fetched.clone());
                    fetched
                }
            };
            let Some(job) = job else {
                warn!(
                    application_id = %application.id,
                    job_id = %application.job,
                    "skipping application whose job no longer exists"
                );
                continue;
            };

            let target = Target::Application {
                application: &application,
                job: &job,
            };
            if !decide(actor, Action::Retrieve, target).is_allowed() {
                continue;
            }

            let applicant = match users.get(&application.applicant) {
                Some(cached) => cached.clone(),
                None => {
                    let fetched = self.users.fetch(application.applicant)?;
                    users.insert(application.applicant, fetched.clone());
                    fetched
                }
            };

            views.push(project(
                &application,
                Some(&job),
                applicant.as_ref(),
                LoadContext::List,
            ));
        }

        Ok(views)
    }

    pub fn get(&self, actor: &Actor, id: ApplicationId) -> Result<ApplicationView, BoardError> {
        let (application, job) = self.load_visible(actor, id)?;
        self.present(&application, Some(&job), LoadContext::Detail)
    }

    /// Apply a patch, honouring only the fields the actor owns.
    pub fn update(
        &self,
        actor: &Actor,
        id: ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<ApplicationView, BoardError> {
        let (mut application, job) = self.load_visible(actor, id)?;
        let target = Target::Application {
            application: &application,
            job: &job,
        };

        match decide(actor, Action::Update, target) {
            Decision::Deny => {
                return Err(BoardError::PermissionDenied(
                    "you may not modify this application",
                ))
            }
            Decision::StatusOnly => {
                let status = patch
                    .status
                    .ok_or(BoardError::MissingRequiredField("status"))?;
                if patch.touches_applicant_fields() {
                    debug!(application_id = %application.id, "ignoring applicant fields in employer update");
                }
                application.status = status;
            }
            Decision::ApplicantFields => {
                if patch.status.is_some() {
                    return Err(BoardError::PermissionDenied(
                        "status is managed by the employer",
                    ));
                }
                self.apply_applicant_fields(&mut application, patch)?;
            }
            Decision::Allow => {
                if let Some(status) = patch.status {
                    application.status = status;
                }
                self.apply_applicant_fields(&mut application, patch)?;
            }
        }

        application.updated_at = self.clock.now();
        self.applications
            .update(application.clone())
            .map_err(|err| match err {
                RepositoryError::NotFound => BoardError::NotFound {
                    resource: "application",
                },
                other => BoardError::Repository(other),
            })?;

        info!(
            application_id = %application.id,
            status = %application.status,
            "application updated"
        );

        self.present(&application, Some(&job), LoadContext::Detail)
    }

    pub fn delete(&self, actor: &Actor, id: ApplicationId) -> Result<(), BoardError> {
        let (application, job) = self.load_visible(actor, id)?;
        let target = Target::Application {
            application: &application,
            job: &job,
        };
        if !decide(actor, Action::Delete, target).is_allowed() {
            return Err(BoardError::PermissionDenied(
                "only the applicant may withdraw an application",
            ));
        }

        self.applications.delete(application.id)?;
        info!(application_id = %application.id, job_id = %job.id, "application withdrawn");
        Ok(())
    }

    /// Fetch an application the actor may see. Records that are missing and
    /// records hidden from the actor are reported the same way.
    fn load_visible(
        &self,
        actor: &Actor,
        id: ApplicationId,
    ) -> Result<(Application, Job), BoardError> {
        if !actor.is_authenticated() {
            return Err(BoardError::Unauthenticated);
        }

        let not_found = || BoardError::NotFound {
            resource: "application",
        };
        let application = self.applications.fetch(id)?.ok_or_else(not_found)?;
        let job = self.jobs.fetch(application.job)?.ok_or_else(not_found)?;

        let target = Target::Application {
            application: &application,
            job: &job,
        };
        if !decide(actor, Action::Retrieve, target).is_allowed() {
            debug!(application_id = %id, "application hidden from actor");
            return Err(not_found());
        }

        Ok((application, job))
    }

    fn apply_applicant_fields(
        &self,
        application: &mut Application,
        patch: ApplicationPatch,
    ) -> Result<(), BoardError> {
        if let Some(cover_letter) = patch.cover_letter {
            application.cover_letter = normalize_cover_letter(Some(cover_letter));
        }
        if let Some(resume) = patch.resume {
            self.validate_resume(&resume)?;
            application.resume = ResumeColumn::Loaded(resume);
        }
        Ok(())
    }

    fn validate_resume(&self, resume: &ResumePayload) -> Result<(), BoardError> {
        if resume.size() > self.uploads.max_resume_bytes {
            return Err(BoardError::Validation(format!(
                "resume exceeds the {} byte limit",
                self.uploads.max_resume_bytes
            )));
        }
        if resume
            .filename
            .as_ref()
            .is_some_and(|name| name.chars().count() > MAX_FILENAME_LEN)
        {
            return Err(BoardError::Validation(format!(
                "resume filename must be at most {MAX_FILENAME_LEN} characters"
            )));
        }
        if resume
            .content_type
            .as_ref()
            .is_some_and(|value| value.chars().count() > MAX_CONTENT_TYPE_LEN)
        {
            return Err(BoardError::Validation(format!(
                "resume content type must be at most {MAX_CONTENT_TYPE_LEN} characters"
            )));
        }
        Ok(())
    }

    fn present(
        &self,
        application: &Application,
        job: Option<&Job>,
        context: LoadContext,
    ) -> Result<ApplicationView, BoardError> {
        let applicant = self.users.fetch(application.applicant)?;
        Ok(project(application, job, applicant.as_ref(), context))
    }
}

fn normalize_cover_letter(raw: Option<String>) -> Option<String> {
    raw.filter(|text| !text.trim().is_empty())
}
