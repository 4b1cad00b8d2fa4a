use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::jobs::JobId;
use crate::identity::UserId;

/// Identifier wrapper for submitted applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub u64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Review status. Any status may move to any other; there is no terminal state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewing,
    Shortlisted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.label() == normalized)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

/// Uploaded resume exactly as received. Bytes are stored verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct ResumePayload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl ResumePayload {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn metadata(&self) -> ResumeMetadata {
        ResumeMetadata {
            filename: self.filename.clone(),
            content_type: self.content_type.clone(),
            size: self.size(),
        }
    }
}

impl fmt::Debug for ResumePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumePayload")
            .field("bytes", &format_args!("<{} bytes>", self.bytes.len()))
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Resume columns other than the binary payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumeMetadata {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// The resume column as read from storage. Bulk reads leave the payload
/// deferred; single-record reads load it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResumeColumn {
    #[default]
    Empty,
    Deferred(ResumeMetadata),
    Loaded(ResumePayload),
}

impl ResumeColumn {
    pub fn metadata(&self) -> Option<ResumeMetadata> {
        match self {
            ResumeColumn::Empty => None,
            ResumeColumn::Deferred(metadata) => Some(metadata.clone()),
            ResumeColumn::Loaded(payload) => Some(payload.metadata()),
        }
    }

    pub fn payload(&self) -> Option<&ResumePayload> {
        match self {
            ResumeColumn::Loaded(payload) => Some(payload),
            ResumeColumn::Empty | ResumeColumn::Deferred(_) => None,
        }
    }

    /// Byte length of the stored payload, or 0 when no resume is attached.
    pub fn size(&self) -> usize {
        match self {
            ResumeColumn::Empty => 0,
            ResumeColumn::Deferred(metadata) => metadata.size,
            ResumeColumn::Loaded(payload) => payload.size(),
        }
    }

    pub fn is_present(&self) -> bool {
        !matches!(self, ResumeColumn::Empty)
    }

    /// Drop the payload while keeping its metadata.
    pub fn deferred(&self) -> ResumeColumn {
        match self {
            ResumeColumn::Loaded(payload) => ResumeColumn::Deferred(payload.metadata()),
            other => other.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant: UserId,
    pub job: JobId,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume: ResumeColumn,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application awaiting an identifier from the repository.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub applicant: UserId,
    pub job: JobId,
    pub status: ApplicationStatus,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumePayload>,
    pub applied_at: DateTime<Utc>,
}

impl NewApplication {
    pub fn with_id(self, id: ApplicationId) -> Application {
        Application {
            id,
            applicant: self.applicant,
            job: self.job,
            status: self.status,
            cover_letter: self.cover_letter,
            resume: self
                .resume
                .map_or(ResumeColumn::Empty, ResumeColumn::Loaded),
            applied_at: self.applied_at,
            updated_at: self.applied_at,
        }
    }
}

/// Fields an applicant supplies when applying.
#[derive(Debug, Clone, Default)]
pub struct ApplicationDraft {
    pub cover_letter: Option<String>,
    pub resume: Option<ResumePayload>,
}

/// Requested changes to an existing application. Which fields are honoured
/// depends on the actor's relation to the application.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub status: Option<ApplicationStatus>,
    pub cover_letter: Option<String>,
    pub resume: Option<ResumePayload>,
}

impl ApplicationPatch {
    pub fn touches_applicant_fields(&self) -> bool {
        self.cover_letter.is_some() || self.resume.is_some()
    }
}
