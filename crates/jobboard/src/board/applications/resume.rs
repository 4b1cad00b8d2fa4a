//! Data-URL presentation of stored resumes.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Content type assumed when the upload did not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResumeCodecError {
    #[error("resume payload is empty")]
    EmptyPayload,
}

/// Encode `bytes` as `data:{content_type};base64,{payload}`.
///
/// A missing or blank content type falls back to [`DEFAULT_CONTENT_TYPE`];
/// any other stored value is embedded verbatim.
pub fn encode_data_url(
    bytes: &[u8],
    content_type: Option<&str>,
) -> Result<String, ResumeCodecError> {
    if bytes.is_empty() {
        return Err(ResumeCodecError::EmptyPayload);
    }

    let content_type = content_type
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    Ok(format!("data:{content_type};base64,{}", STANDARD.encode(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_pdf_payloads() {
        let bytes = b"%PDF-1.4 minimal";
        let url = encode_data_url(bytes, Some("application/pdf")).expect("encodes");

        let payload = url
            .strip_prefix("data:application/pdf;base64,")
            .expect("data url prefix");
        assert_eq!(STANDARD.decode(payload).expect("valid base64"), bytes);
    }

    #[test]
    fn defaults_missing_content_type_to_pdf() {
        let url = encode_data_url(b"resume", None).expect("encodes");
        assert!(url.starts_with("data:application/pdf;base64,"));

        let blank = encode_data_url(b"resume", Some("  ")).expect("encodes");
        assert!(blank.starts_with("data:application/pdf;base64,"));
    }

    #[test]
    fn keeps_declared_content_type() {
        let url = encode_data_url(
            b"PK\x03\x04",
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        )
        .expect("encodes");
        assert!(url.starts_with(
            "data:application/vnd.openxmlformats-officedocument.wordprocessingml.document;base64,"
        ));
    }

    #[test]
    fn rejects_empty_payloads() {
        assert_eq!(
            encode_data_url(&[], Some("application/pdf")),
            Err(ResumeCodecError::EmptyPayload)
        );
    }

    #[test]
    fn non_mime_content_types_are_embedded_verbatim() {
        let url = encode_data_url(b"resume", Some("pdf")).expect("encodes");
        assert_eq!(url, format!("data:pdf;base64,{}", STANDARD.encode(b"resume")));
    }
}
