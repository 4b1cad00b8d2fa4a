use super::common::*;

use crate::board::applications::{
    ApplicationDraft, ApplicationId, ApplicationPatch, ApplicationStatus, ResumeColumn,
    ResumePayload,
};
use crate::board::error::BoardError;
use crate::board::jobs::JobId;
use crate::config::UploadConfig;
use crate::identity::Actor;
use crate::board::jobs::JobRepository;
use crate::test_support::{
    board_with, JobDeletedDuringInsert, MemoryApplications, RacingApplications,
};

#[test]
fn apply_creates_pending_application_with_inline_resume() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = scenario();

    let view = board
        .state
        .applications
        .create(&applicant, job.id, draft_with_resume())
        .expect("application accepted");

    assert_eq!(view.status, ApplicationStatus::Pending);
    assert_eq!(view.applicant, applicant.id().expect("authenticated"));
    assert_eq!(view.applied_at, view.updated_at);
    assert_eq!(view.resume_filename.as_deref(), Some("dana-cv.pdf"));
    assert_eq!(view.resume_size, PDF_BYTES.len());
    assert!(view.has_resume);
    let url = view.resume_url.expect("detail view carries the resume");
    assert!(url.starts_with("data:application/pdf;base64,"));
    assert_eq!(view.job.expect("job summary").title, "Backend Engineer");
    assert_eq!(
        view.applicant_detail.expect("applicant summary").email,
        APPLICANT
    );
}

#[test]
fn applying_twice_to_the_same_job_is_a_conflict() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = scenario();
    let service = &board.state.applications;

    service
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect("first application");
    let err = service
        .create(&applicant, job.id, draft_with_resume())
        .expect_err("second application rejected");

    assert!(matches!(err, BoardError::DuplicateApplication));
    assert_eq!(board.applications.len(), 1);
}

#[test]
fn storage_conflict_from_a_concurrent_insert_is_a_duplicate() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = populate(board_with(
        RacingApplications::default(),
        UploadConfig::default(),
    ));

    let err = board
        .state
        .applications
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect_err("constraint violation surfaces");

    assert!(matches!(err, BoardError::DuplicateApplication));
}

#[test]
fn only_applicants_may_apply() {
    let Scenario {
        board,
        employer,
        job,
        ..
    } = scenario();
    let service = &board.state.applications;

    assert!(matches!(
        service.create(&employer, job.id, ApplicationDraft::default()),
        Err(BoardError::PermissionDenied(_))
    ));
    assert!(matches!(
        service.create(&Actor::Anonymous, job.id, ApplicationDraft::default()),
        Err(BoardError::Unauthenticated)
    ));
}

#[test]
fn applying_to_a_missing_job_is_a_validation_error() {
    let Scenario {
        board, applicant, ..
    } = scenario();

    let err = board
        .state
        .applications
        .create(&applicant, JobId(404), ApplicationDraft::default())
        .expect_err("missing job rejected");
    assert!(matches!(err, BoardError::Validation(_)));
}

#[test]
fn oversized_resumes_are_rejected() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = populate(board_with(
        MemoryApplications::default(),
        UploadConfig {
            max_resume_bytes: 8,
        },
    ));

    let err = board
        .state
        .applications
        .create(&applicant, job.id, draft_with_resume())
        .expect_err("resume too large");
    assert!(matches!(err, BoardError::Validation(message) if message.contains("8 byte")));
    assert_eq!(board.applications.len(), 0);
}

#[test]
fn employer_moves_status_and_timestamp_advances() {
    let Scenario {
        board,
        employer,
        applicant,
        job,
    } = scenario();
    let service = &board.state.applications;
    let created = service
        .create(&applicant, job.id, draft_with_resume())
        .expect("application");

    let updated = service
        .update(
            &employer,
            created.id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Shortlisted),
                ..ApplicationPatch::default()
            },
        )
        .expect("employer may set status");

    assert_eq!(updated.status, ApplicationStatus::Shortlisted);
    assert_eq!(updated.applied_at, created.applied_at);
    assert!(updated.updated_at > created.updated_at);
}

#[test]
fn employer_update_without_status_is_rejected() {
    let Scenario {
        board,
        employer,
        applicant,
        job,
    } = scenario();
    let service = &board.state.applications;
    let created = service
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect("application");

    let err = service
        .update(
            &employer,
            created.id,
            ApplicationPatch {
                cover_letter: Some("Rewritten by the employer".to_string()),
                ..ApplicationPatch::default()
            },
        )
        .expect_err("status required");

    assert!(matches!(err, BoardError::MissingRequiredField("status")));
}

#[test]
fn employer_cannot_touch_applicant_fields() {
    let Scenario {
        board,
        employer,
        applicant,
        job,
    } = scenario();
    let service = &board.state.applications;
    let created = service
        .create(&applicant, job.id, draft_with_resume())
        .expect("application");

    let updated = service
        .update(
            &employer,
            created.id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Reviewing),
                cover_letter: Some("Rewritten by the employer".to_string()),
                resume: Some(ResumePayload {
                    bytes: b"forged".to_vec(),
                    filename: Some("forged.pdf".to_string()),
                    content_type: None,
                }),
            },
        )
        .expect("status applied");

    assert_eq!(updated.status, ApplicationStatus::Reviewing);
    assert_eq!(updated.cover_letter, created.cover_letter);
    assert_eq!(updated.resume_filename.as_deref(), Some("dana-cv.pdf"));
}

#[test]
fn applicant_edits_own_fields_but_not_status() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = scenario();
    let service = &board.state.applications;
    let created = service
        .create(&applicant, job.id, draft_with_resume())
        .expect("application");

    let err = service
        .update(
            &applicant,
            created.id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Accepted),
                ..ApplicationPatch::default()
            },
        )
        .expect_err("applicants cannot set status");
    assert!(matches!(err, BoardError::PermissionDenied(_)));

    let updated = service
        .update(
            &applicant,
            created.id,
            ApplicationPatch {
                cover_letter: Some("Updated letter".to_string()),
                ..ApplicationPatch::default()
            },
        )
        .expect("applicant may edit the letter");
    assert_eq!(updated.cover_letter.as_deref(), Some("Updated letter"));
    assert_eq!(updated.status, ApplicationStatus::Pending);

    let stored = board.applications.stored(created.id).expect("row kept");
    assert!(matches!(stored.resume, ResumeColumn::Loaded(ref payload) if payload.bytes == PDF_BYTES));
}

#[test]
fn strangers_cannot_see_or_modify_applications() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = scenario();
    let service = &board.state.applications;
    let created = service
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect("application");

    let other_employer = board.member(OTHER_EMPLOYER, true, false);
    let other_applicant = board.member(OTHER_APPLICANT, false, true);

    for stranger in [&other_employer, &other_applicant] {
        assert!(matches!(
            service.get(stranger, created.id),
            Err(BoardError::NotFound { .. })
        ));
        assert!(matches!(
            service.update(
                stranger,
                created.id,
                ApplicationPatch {
                    status: Some(ApplicationStatus::Rejected),
                    ..ApplicationPatch::default()
                }
            ),
            Err(BoardError::NotFound { .. })
        ));
        assert!(matches!(
            service.delete(stranger, created.id),
            Err(BoardError::NotFound { .. })
        ));
    }

    assert!(matches!(
        service.get(&Actor::Anonymous, created.id),
        Err(BoardError::Unauthenticated)
    ));
    assert!(matches!(
        service.get(&applicant, ApplicationId(999)),
        Err(BoardError::NotFound { .. })
    ));
}

#[test]
fn listing_is_scoped_to_the_actor_and_never_carries_resumes() {
    let Scenario {
        board,
        employer,
        applicant,
        job,
    } = scenario();
    let service = &board.state.applications;
    let other_applicant = board.member(OTHER_APPLICANT, false, true);
    let other_employer = board.member(OTHER_EMPLOYER, true, false);
    let other_job = board.post_job(&other_employer, "Data Analyst");

    let first = service
        .create(&applicant, job.id, draft_with_resume())
        .expect("first");
    let second = service
        .create(&other_applicant, job.id, ApplicationDraft::default())
        .expect("second");
    let third = service
        .create(&applicant, other_job.id, ApplicationDraft::default())
        .expect("third");

    let own: Vec<_> = service
        .list(&applicant)
        .expect("applicant list")
        .into_iter()
        .map(|view| view.id)
        .collect();
    assert_eq!(own, vec![third.id, first.id]);

    let employer_view = service.list(&employer).expect("employer list");
    let ids: Vec<_> = employer_view.iter().map(|view| view.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    let with_resume = employer_view
        .iter()
        .find(|view| view.id == first.id)
        .expect("first listed");
    assert!(with_resume.has_resume);
    assert_eq!(with_resume.resume_size, PDF_BYTES.len());
    assert!(employer_view.iter().all(|view| view.resume_url.is_none()));

    let admin = board.superuser("root@jobboard.test");
    assert_eq!(service.list(&admin).expect("admin list").len(), 3);

    assert!(matches!(
        service.list(&Actor::Anonymous),
        Err(BoardError::Unauthenticated)
    ));
}

#[test]
fn only_the_applicant_withdraws() {
    let Scenario {
        board,
        employer,
        applicant,
        job,
    } = scenario();
    let service = &board.state.applications;
    let created = service
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect("application");

    assert!(matches!(
        service.delete(&employer, created.id),
        Err(BoardError::PermissionDenied(_))
    ));

    service
        .delete(&applicant, created.id)
        .expect("applicant withdraws");
    assert!(matches!(
        service.get(&applicant, created.id),
        Err(BoardError::NotFound { .. })
    ));

    service
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect("may reapply after withdrawing");
}

#[test]
fn superuser_may_edit_every_field() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = scenario();
    let service = &board.state.applications;
    let created = service
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect("application");
    let admin = board.superuser("root@jobboard.test");

    let updated = service
        .update(
            &admin,
            created.id,
            ApplicationPatch {
                status: Some(ApplicationStatus::Rejected),
                cover_letter: Some("Annotated by support".to_string()),
                resume: None,
            },
        )
        .expect("superuser edit");

    assert_eq!(updated.status, ApplicationStatus::Rejected);
    assert_eq!(updated.cover_letter.as_deref(), Some("Annotated by support"));
}

#[test]
fn deleting_a_job_removes_its_applications() {
    let Scenario {
        board,
        employer,
        applicant,
        job,
    } = scenario();
    board
        .state
        .applications
        .create(&applicant, job.id, draft_with_resume())
        .expect("application");

    board
        .state
        .jobs
        .delete(&employer, job.id)
        .expect("owner deletes job");

    assert_eq!(board.applications.len(), 0);
    assert!(board
        .state
        .applications
        .list(&applicant)
        .expect("list")
        .is_empty());
}

#[test]
fn application_filed_while_its_job_is_deleted_is_not_kept() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = populate(board_with(
        JobDeletedDuringInsert::default(),
        UploadConfig::default(),
    ));
    board.applications.arm(board.jobs.clone());

    let err = board
        .state
        .applications
        .create(&applicant, job.id, draft_with_resume())
        .expect_err("job vanished mid-request");

    assert!(matches!(err, BoardError::Validation(_)));
    assert_eq!(board.applications.len(), 0);
}

#[test]
fn list_skips_applications_whose_job_is_gone() {
    let Scenario {
        board,
        applicant,
        job,
        ..
    } = scenario();
    board
        .state
        .applications
        .create(&applicant, job.id, ApplicationDraft::default())
        .expect("application");

    board.jobs.delete(job.id).expect("raw job delete");

    assert!(board
        .state
        .applications
        .list(&applicant)
        .expect("list")
        .is_empty());
    assert_eq!(board.applications.len(), 1);
}
