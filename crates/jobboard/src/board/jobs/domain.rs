use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A posting owned by exactly one employer. Ownership never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub employer: UserId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: u64,
    pub posted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Posting awaiting an identifier from the repository.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub employer: UserId,
    pub title: String,
    pub description: String,
    pub location: String,
    pub salary: u64,
    pub posted_at: DateTime<Utc>,
}

impl NewJob {
    pub fn with_id(self, id: JobId) -> Job {
        Job {
            id,
            employer: self.employer,
            title: self.title,
            description: self.description,
            location: self.location,
            salary: self.salary,
            posted_at: self.posted_at,
            updated_at: self.posted_at,
        }
    }
}

/// Inbound payload for a new posting.
#[derive(Debug, Clone, Deserialize)]
pub struct JobDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub salary: u64,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary: Option<u64>,
}

/// Public listing filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub salary_min: Option<u64>,
}

impl JobQuery {
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(term) = non_blank(&self.search) {
            let term = term.to_lowercase();
            if !job.title.to_lowercase().contains(&term)
                && !job.description.to_lowercase().contains(&term)
            {
                return false;
            }
        }

        if let Some(location) = non_blank(&self.location) {
            if !job
                .location
                .to_lowercase()
                .contains(&location.to_lowercase())
            {
                return false;
            }
        }

        self.salary_min.map_or(true, |min| job.salary >= min)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|trimmed| !trimmed.is_empty())
}
