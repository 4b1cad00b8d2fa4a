use crate::infra::{InMemoryApplicationRepository, InMemoryJobRepository, InMemoryUserDirectory};
use clap::Args;
use jobboard::board::applications::{
    ApplicationDraft, ApplicationPatch, ApplicationStatus, ApplicationView, ResumePayload,
};
use jobboard::board::jobs::JobDraft;
use jobboard::board::{BoardError, BoardState};
use jobboard::config::UploadConfig;
use jobboard::error::AppError;
use jobboard::identity::{Actor, Registration};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DEMO_PASSWORD: &str = "demo-password";
const SAMPLE_RESUME: &[u8] = b"%PDF-1.4\n% sample resume generated for the demo\n";
const URL_PREVIEW: usize = 48;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Attach this file as the resume instead of the bundled sample.
    #[arg(long)]
    pub(crate) resume: Option<PathBuf>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let board = BoardState::new(
        Arc::new(InMemoryUserDirectory::default()),
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(InMemoryApplicationRepository::default()),
        UploadConfig::default(),
    );

    println!("Job board demo");

    let employer = register(&board, "hiring@demo.test", "Acme Hiring", true, false)?;
    let applicant = register(&board, "dana@demo.test", "Dana Reyes", false, true)?;

    let job = board.jobs.create(
        &employer,
        JobDraft {
            title: "Backend Engineer".to_string(),
            description: "Own the services behind our hiring platform.".to_string(),
            location: "Remote".to_string(),
            salary: 95_000,
        },
    )?;
    println!(
        "\nPosted job #{} \"{}\" ({}, salary {})",
        job.id, job.title, job.location, job.salary
    );

    let resume = match args.resume.as_deref() {
        Some(path) => load_resume(path)?,
        None => ResumePayload {
            bytes: SAMPLE_RESUME.to_vec(),
            filename: Some("sample-resume.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
        },
    };

    let submitted = board.applications.create(
        &applicant,
        job.id,
        ApplicationDraft {
            cover_letter: Some("I have run hiring systems at scale.".to_string()),
            resume: Some(resume),
        },
    )?;
    println!("\nApplication submitted");
    render_view(&submitted);

    match board
        .applications
        .create(&applicant, job.id, ApplicationDraft::default())
    {
        Err(BoardError::DuplicateApplication) => {
            println!("\nSecond application to the same job rejected: already applied")
        }
        Err(err) => return Err(err.into()),
        Ok(view) => println!("\nUnexpectedly accepted duplicate application #{}", view.id),
    }

    let reviewed = board.applications.update(
        &employer,
        submitted.id,
        ApplicationPatch {
            status: Some(ApplicationStatus::Shortlisted),
            ..ApplicationPatch::default()
        },
    )?;
    println!(
        "\nEmployer moved application #{} to {}",
        reviewed.id, reviewed.status
    );

    match board.applications.update(
        &employer,
        submitted.id,
        ApplicationPatch {
            cover_letter: Some("Edited by the employer".to_string()),
            ..ApplicationPatch::default()
        },
    ) {
        Err(err @ BoardError::MissingRequiredField(_)) => {
            println!("Employer edit without a status rejected: {err}")
        }
        Err(err) => return Err(err.into()),
        Ok(view) => println!("Unexpectedly accepted employer edit of #{}", view.id),
    }

    println!("\nEmployer inbox (list view, resumes not loaded)");
    for view in board.applications.list(&employer)? {
        render_view(&view);
    }

    println!("\nApplicant detail view");
    render_view(&board.applications.get(&applicant, submitted.id)?);

    Ok(())
}

fn register(
    board: &BoardState<InMemoryUserDirectory, InMemoryJobRepository, InMemoryApplicationRepository>,
    email: &str,
    full_name: &str,
    is_employer: bool,
    is_applicant: bool,
) -> Result<Actor, AppError> {
    let user = board.identity.register(
        &Actor::Anonymous,
        Registration {
            email: email.to_string(),
            password: DEMO_PASSWORD.to_string(),
            full_name: Some(full_name.to_string()),
            is_employer,
            is_applicant,
            is_superuser: false,
        },
    )?;
    println!(
        "- registered {} (employer: {}, applicant: {})",
        user.email,
        user.is_employer(),
        user.is_applicant()
    );
    Ok(Actor::User(user))
}

fn load_resume(path: &Path) -> Result<ResumePayload, AppError> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string());

    Ok(ResumePayload {
        bytes,
        filename,
        content_type,
    })
}

fn render_view(view: &ApplicationView) {
    let job_title = view
        .job
        .as_ref()
        .map(|job| job.title.as_str())
        .unwrap_or("unknown job");
    let applicant = view
        .applicant_detail
        .as_ref()
        .map(|detail| detail.email.as_str())
        .unwrap_or("unknown applicant");

    println!(
        "  #{} {} -> {} | status {} | applied {}",
        view.id,
        applicant,
        job_title,
        view.status,
        view.applied_at.format("%Y-%m-%d %H:%M:%S")
    );

    if view.has_resume {
        println!(
            "    resume {} ({}, {} bytes)",
            view.resume_filename.as_deref().unwrap_or("unnamed"),
            view.resume_content_type.as_deref().unwrap_or("unknown type"),
            view.resume_size
        );
    }

    match &view.resume_url {
        Some(url) => {
            let preview: String = url.chars().take(URL_PREVIEW).collect();
            println!("    resume_url {preview}...");
        }
        None => println!("    resume_url null"),
    }
}
