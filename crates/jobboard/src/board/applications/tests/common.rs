use crate::board::applications::{ApplicationDraft, ApplicationRepository, ResumePayload};
use crate::board::jobs::Job;
use crate::identity::Actor;
use crate::test_support::{board, Board, MemoryApplications};

pub(super) const EMPLOYER: &str = "hiring@acme.test";
pub(super) const APPLICANT: &str = "dana@example.com";
pub(super) const OTHER_APPLICANT: &str = "lee@example.com";
pub(super) const OTHER_EMPLOYER: &str = "talent@globex.test";

pub(super) const PDF_BYTES: &[u8] = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n1 0 obj\n";

pub(super) struct Scenario<A = MemoryApplications> {
    pub(super) board: Board<A>,
    pub(super) employer: Actor,
    pub(super) applicant: Actor,
    pub(super) job: Job,
}

pub(super) fn scenario() -> Scenario {
    populate(board())
}

pub(super) fn populate<A>(board: Board<A>) -> Scenario<A>
where
    A: ApplicationRepository + 'static,
{
    let employer = board.member(EMPLOYER, true, false);
    let applicant = board.member(APPLICANT, false, true);
    let job = board.post_job(&employer, "Backend Engineer");
    Scenario {
        board,
        employer,
        applicant,
        job,
    }
}

pub(super) fn pdf_resume() -> ResumePayload {
    ResumePayload {
        bytes: PDF_BYTES.to_vec(),
        filename: Some("dana-cv.pdf".to_string()),
        content_type: Some("application/pdf".to_string()),
    }
}

pub(super) fn draft_with_resume() -> ApplicationDraft {
    ApplicationDraft {
        cover_letter: Some("I would love to join the platform team.".to_string()),
        resume: Some(pdf_resume()),
    }
}
