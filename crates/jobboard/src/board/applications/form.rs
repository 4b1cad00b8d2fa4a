use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use super::domain::{ApplicationDraft, ApplicationPatch, ApplicationStatus, ResumePayload};
use crate::board::error::BoardError;
use crate::board::jobs::JobId;

/// Fields accepted on the application endpoints, from either encoding.
#[derive(Debug, Default)]
pub(crate) struct ApplicationForm {
    pub(crate) job: Option<JobId>,
    pub(crate) cover_letter: Option<String>,
    pub(crate) status: Option<ApplicationStatus>,
    pub(crate) resume: Option<ResumePayload>,
    pub(crate) applicant: bool,
}

#[derive(Debug, Deserialize)]
struct ApplicationJson {
    #[serde(default)]
    job: Option<u64>,
    #[serde(default)]
    cover_letter: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    applicant: Option<serde_json::Value>,
}

impl ApplicationForm {
    /// Decode a `multipart/form-data` body, or JSON for anything else.
    pub(crate) async fn from_request(request: Request) -> Result<Self, BoardError> {
        let is_multipart = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .is_some_and(|parsed| {
                parsed.type_() == mime::MULTIPART && parsed.subtype() == mime::FORM_DATA
            });

        if is_multipart {
            let multipart = Multipart::from_request(request, &())
                .await
                .map_err(|rejection| BoardError::Validation(rejection.body_text()))?;
            Self::from_multipart(multipart).await
        } else {
            let Json(body) = Json::<ApplicationJson>::from_request(request, &())
                .await
                .map_err(|rejection| BoardError::Validation(rejection.body_text()))?;
            Self::from_json(body)
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, BoardError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| BoardError::Validation(err.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "resume" => {
                    let filename = field.file_name().map(str::to_string);
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|err| BoardError::Validation(err.body_text()))?;
                    if filename.is_none() && bytes.is_empty() {
                        continue;
                    }
                    form.resume = Some(ResumePayload {
                        bytes: bytes.to_vec(),
                        filename,
                        content_type,
                    });
                }
                "job" | "cover_letter" | "status" | "applicant" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|err| BoardError::Validation(err.body_text()))?;
                    form.set_text(&name, text)?;
                }
                other => debug!(field = other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    fn from_json(body: ApplicationJson) -> Result<Self, BoardError> {
        let status = body.status.as_deref().map(parse_status).transpose()?;
        Ok(Self {
            job: body.job.map(JobId),
            cover_letter: body.cover_letter,
            status,
            resume: None,
            applicant: body.applicant.is_some(),
        })
    }

    fn set_text(&mut self, name: &str, text: String) -> Result<(), BoardError> {
        match name {
            "job" => {
                let id = text
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| BoardError::Validation(format!("invalid job id '{text}'")))?;
                self.job = Some(JobId(id));
            }
            "cover_letter" => self.cover_letter = Some(text),
            "status" => self.status = Some(parse_status(&text)?),
            "applicant" => self.applicant = true,
            _ => {}
        }
        Ok(())
    }

    /// Create payload: the target job is required and the applicant is
    /// always the caller.
    pub(crate) fn into_draft(self) -> Result<(JobId, ApplicationDraft), BoardError> {
        if self.applicant {
            return Err(BoardError::Validation(
                "applicant is assigned from the authenticated user".to_string(),
            ));
        }
        let job = self
            .job
            .ok_or_else(|| BoardError::Validation("job is required".to_string()))?;
        Ok((
            job,
            ApplicationDraft {
                cover_letter: self.cover_letter,
                resume: self.resume,
            },
        ))
    }

    /// Update payload: the job and applicant links are immutable.
    pub(crate) fn into_patch(self) -> Result<ApplicationPatch, BoardError> {
        if self.job.is_some() || self.applicant {
            return Err(BoardError::Validation(
                "job and applicant cannot be changed".to_string(),
            ));
        }
        Ok(ApplicationPatch {
            status: self.status,
            cover_letter: self.cover_letter,
            resume: self.resume,
        })
    }
}

fn parse_status(raw: &str) -> Result<ApplicationStatus, BoardError> {
    raw.parse::<ApplicationStatus>()
        .map_err(|err| BoardError::Validation(err.to_string()))
}
