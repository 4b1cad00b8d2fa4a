//! Object-level authorization for jobs and applications.
//!
//! Every decision is a pure function of the actor's roles, the ownership
//! relation to the target and the action. Superusers short-circuit to
//! [`Decision::Allow`]; anything not matched below is denied.

use crate::board::applications::Application;
use crate::board::jobs::Job;
use crate::identity::{Actor, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

/// What the action is aimed at. Collection targets are used for `list` and
/// `create`, where no single record exists yet.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Jobs,
    Job(&'a Job),
    Applications,
    Application {
        application: &'a Application,
        job: &'a Job,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Update permitted, restricted to the `status` field.
    StatusOnly,
    /// Update permitted for the applicant-owned fields; `status` excluded.
    ApplicantFields,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Decision::Deny)
    }
}

pub fn decide(actor: &Actor, action: Action, target: Target<'_>) -> Decision {
    if actor.is_superuser() {
        return Decision::Allow;
    }

    match target {
        Target::Jobs | Target::Job(_) => decide_job(actor, action, target),
        Target::Applications | Target::Application { .. } => {
            decide_application(actor, action, target)
        }
    }
}

fn decide_job(actor: &Actor, action: Action, target: Target<'_>) -> Decision {
    if matches!(action, Action::List | Action::Retrieve) {
        return Decision::Allow;
    }

    let Some(user) = actor.user() else {
        return Decision::Deny;
    };

    match (action, target) {
        (Action::Create, Target::Jobs) => allow_if(user.is_employer()),
        (Action::Update | Action::Delete, Target::Job(job)) => allow_if(job.employer == user.id),
        _ => Decision::Deny,
    }
}

fn decide_application(actor: &Actor, action: Action, target: Target<'_>) -> Decision {
    let Some(user) = actor.user() else {
        return Decision::Deny;
    };

    match (action, target) {
        (Action::List, Target::Applications) => Decision::Allow,
        (Action::Create, Target::Applications) => allow_if(user.is_applicant()),
        (Action::Retrieve, Target::Application { application, job }) => {
            allow_if(can_view(user, application, job))
        }
        (Action::Update, Target::Application { application, job }) => {
            if owns_job(user, job) {
                Decision::StatusOnly
            } else if owns_application(user, application) {
                Decision::ApplicantFields
            } else {
                Decision::Deny
            }
        }
        (Action::Delete, Target::Application { application, .. }) => {
            allow_if(owns_application(user, application))
        }
        _ => Decision::Deny,
    }
}

/// Visibility predicate shared by retrieve and list filtering.
fn can_view(user: &User, application: &Application, job: &Job) -> bool {
    application.applicant == user.id || owns_job(user, job)
}

fn owns_job(user: &User, job: &Job) -> bool {
    user.is_employer() && job.employer == user.id
}

fn owns_application(user: &User, application: &Application) -> bool {
    user.is_applicant() && application.applicant == user.id
}

fn allow_if(condition: bool) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny
    }
}
