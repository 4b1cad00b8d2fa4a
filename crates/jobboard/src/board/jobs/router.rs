use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;

use super::domain::{Job, JobDraft, JobId, JobPatch, JobQuery};
use super::repository::JobRepository;
use crate::board::applications::ApplicationRepository;
use crate::board::error::BoardError;
use crate::board::state::BoardState;
use crate::identity::UserDirectory;

/// Router builder exposing the public job listing and employer mutations.
pub fn job_router<U, J, A>(state: BoardState<U, J, A>) -> Router
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_handler::<U, J, A>).post(create_handler::<U, J, A>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(get_handler::<U, J, A>)
                .put(update_handler::<U, J, A>)
                .patch(update_handler::<U, J, A>)
                .delete(delete_handler::<U, J, A>),
        )
        .with_state(state)
}

pub(crate) async fn list_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    WithRejection(Query(query), _): WithRejection<Query<JobQuery>, BoardError>,
) -> Result<Json<Vec<Job>>, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Ok(Json(state.jobs.list(&query)?))
}

pub(crate) async fn create_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    headers: HeaderMap,
    WithRejection(Json(draft), _): WithRejection<Json<JobDraft>, BoardError>,
) -> Result<Response, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    let job = state.jobs.create(&actor, draft)?;
    Ok((StatusCode::CREATED, Json(job)).into_response())
}

pub(crate) async fn get_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    WithRejection(Path(job_id), _): WithRejection<Path<u64>, BoardError>,
) -> Result<Json<Job>, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Ok(Json(state.jobs.get(JobId(job_id))?))
}

pub(crate) async fn update_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    WithRejection(Path(job_id), _): WithRejection<Path<u64>, BoardError>,
    headers: HeaderMap,
    WithRejection(Json(patch), _): WithRejection<Json<JobPatch>, BoardError>,
) -> Result<Json<Job>, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    Ok(Json(state.jobs.update(&actor, JobId(job_id), patch)?))
}

pub(crate) async fn delete_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    WithRejection(Path(job_id), _): WithRejection<Path<u64>, BoardError>,
    headers: HeaderMap,
) -> Result<StatusCode, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    state.jobs.delete(&actor, JobId(job_id))?;
    Ok(StatusCode::NO_CONTENT)
}
