use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{Application, ApplicationId, ApplicationStatus, ResumeColumn};
use super::resume::encode_data_url;
use crate::board::jobs::{Job, JobId};
use crate::identity::{User, UserId};

/// Whether a read is a bulk listing or a single-resource fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadContext {
    List,
    Detail,
}

/// Outbound application record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub applicant: UserId,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume_filename: Option<String>,
    pub resume_content_type: Option<String>,
    pub resume_size: usize,
    pub has_resume: bool,
    pub job: Option<JobSummary>,
    pub applicant_detail: Option<ApplicantSummary>,
    pub resume_url: Option<String>,
}

/// Reduced job projection embedded in application records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub title: String,
    pub location: String,
    pub salary: u64,
    pub posted_at: DateTime<Utc>,
    pub employer: UserId,
}

impl From<&Job> for JobSummary {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id,
            title: job.title.clone(),
            location: job.location.clone(),
            salary: job.salary,
            posted_at: job.posted_at,
            employer: job.employer,
        }
    }
}

/// Reduced applicant projection embedded in application records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicantSummary {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
}

impl From<&User> for ApplicantSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone().unwrap_or_default(),
        }
    }
}

/// Shape an application for output.
///
/// The resume payload is only consulted in [`LoadContext::Detail`]; list
/// output never carries a `resume_url`, whatever the row happens to hold.
pub fn project(
    application: &Application,
    job: Option<&Job>,
    applicant: Option<&User>,
    context: LoadContext,
) -> ApplicationView {
    let metadata = application.resume.metadata();
    let resume_url = match context {
        LoadContext::List => None,
        LoadContext::Detail => resume_url(application),
    };

    ApplicationView {
        id: application.id,
        applicant: application.applicant,
        applied_at: application.applied_at,
        updated_at: application.updated_at,
        status: application.status,
        cover_letter: application.cover_letter.clone(),
        resume_filename: metadata.as_ref().and_then(|meta| meta.filename.clone()),
        resume_content_type: metadata.as_ref().and_then(|meta| meta.content_type.clone()),
        resume_size: application.resume.size(),
        has_resume: application.resume.is_present(),
        job: job.map(JobSummary::from),
        applicant_detail: applicant.map(ApplicantSummary::from),
        resume_url,
    }
}

fn resume_url(application: &Application) -> Option<String> {
    let payload = match &application.resume {
        ResumeColumn::Empty => return None,
        ResumeColumn::Deferred(_) => {
            warn!(application_id = %application.id, "resume payload not loaded for detail read");
            return None;
        }
        ResumeColumn::Loaded(payload) => payload,
    };

    match encode_data_url(&payload.bytes, payload.content_type.as_deref()) {
        Ok(url) => Some(url),
        Err(err) => {
            debug!(application_id = %application.id, error = %err, "resume url unavailable");
            None
        }
    }
}
