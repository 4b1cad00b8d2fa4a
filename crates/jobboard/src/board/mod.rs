//! Job postings and the applications filed against them.

pub mod applications;
pub mod error;
pub mod jobs;
pub mod policy;
pub mod state;

use axum::Router;

pub use error::BoardError;
pub use state::BoardState;

use crate::identity::{identity_router, UserDirectory};
use applications::{application_router, ApplicationRepository};
use jobs::{job_router, JobRepository};

/// Every public API route: accounts, jobs and applications.
pub fn board_router<U, J, A>(state: BoardState<U, J, A>) -> Router
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    identity_router(state.identity.clone())
        .merge(job_router(state.clone()))
        .merge(application_router(state))
}
