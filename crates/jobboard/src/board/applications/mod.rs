//! Job applications: intake, review, withdrawal and resume handling.

pub mod domain;
pub(crate) mod form;
pub mod projection;
pub mod repository;
pub mod resume;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationDraft, ApplicationId, ApplicationPatch, ApplicationStatus,
    NewApplication, ResumeColumn, ResumeMetadata, ResumePayload, UnknownStatus,
};
pub use projection::{project, ApplicantSummary, ApplicationView, JobSummary, LoadContext};
pub use repository::ApplicationRepository;
pub use resume::{encode_data_url, ResumeCodecError, DEFAULT_CONTENT_TYPE};
pub use router::application_router;
pub use service::ApplicationService;
