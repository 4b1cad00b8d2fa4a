use axum::{
    extract::{DefaultBodyLimit, Path, Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::WithRejection;

use super::domain::ApplicationId;
use super::form::ApplicationForm;
use super::projection::ApplicationView;
use super::repository::ApplicationRepository;
use crate::board::error::BoardError;
use crate::board::jobs::JobRepository;
use crate::board::state::BoardState;
use crate::identity::UserDirectory;

/// Router builder exposing application intake, review and withdrawal.
pub fn application_router<U, J, A>(state: BoardState<U, J, A>) -> Router
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let body_limit = state.applications.uploads().body_limit();

    Router::new()
        .route(
            "/api/v1/applications",
            get(list_handler::<U, J, A>).post(create_handler::<U, J, A>),
        )
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<U, J, A>)
                .put(update_handler::<U, J, A>)
                .patch(update_handler::<U, J, A>)
                .delete(delete_handler::<U, J, A>),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub(crate) async fn list_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    headers: HeaderMap,
) -> Result<Json<Vec<ApplicationView>>, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    Ok(Json(state.applications.list(&actor)?))
}

pub(crate) async fn create_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    if !actor.is_authenticated() {
        return Err(BoardError::Unauthenticated);
    }

    let (job, draft) = ApplicationForm::from_request(request).await?.into_draft()?;
    let view = state.applications.create(&actor, job, draft)?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

pub(crate) async fn get_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    WithRejection(Path(application_id), _): WithRejection<Path<u64>, BoardError>,
    headers: HeaderMap,
) -> Result<Json<ApplicationView>, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    Ok(Json(
        state
            .applications
            .get(&actor, ApplicationId(application_id))?,
    ))
}

pub(crate) async fn update_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    WithRejection(Path(application_id), _): WithRejection<Path<u64>, BoardError>,
    headers: HeaderMap,
    request: Request,
) -> Result<Json<ApplicationView>, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    if !actor.is_authenticated() {
        return Err(BoardError::Unauthenticated);
    }

    let patch = ApplicationForm::from_request(request).await?.into_patch()?;
    Ok(Json(state.applications.update(
        &actor,
        ApplicationId(application_id),
        patch,
    )?))
}

pub(crate) async fn delete_handler<U, J, A>(
    State(state): State<BoardState<U, J, A>>,
    WithRejection(Path(application_id), _): WithRejection<Path<u64>, BoardError>,
    headers: HeaderMap,
) -> Result<StatusCode, BoardError>
where
    U: UserDirectory + 'static,
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let actor = state.identity.authenticate(&headers)?;
    state
        .applications
        .delete(&actor, ApplicationId(application_id))?;
    Ok(StatusCode::NO_CONTENT)
}
