use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde_json::json;

use super::directory::UserDirectory;
use super::domain::{Credentials, Registration, RoleUpdate, UserId};
use super::service::{IdentityError, IdentityService};

/// Router builder exposing registration, login and role administration.
pub fn identity_router<U>(service: Arc<IdentityService<U>>) -> Router
where
    U: UserDirectory + 'static,
{
    Router::new()
        .route("/api/v1/users/register", post(register_handler::<U>))
        .route("/api/v1/users/login", post(login_handler::<U>))
        .route("/api/v1/users/me", get(me_handler::<U>))
        .route("/api/v1/users/:user_id/roles", patch(roles_handler::<U>))
        .with_state(service)
}

pub(crate) async fn register_handler<U>(
    State(service): State<Arc<IdentityService<U>>>,
    headers: HeaderMap,
    WithRejection(Json(registration), _): WithRejection<Json<Registration>, IdentityError>,
) -> Result<Response, IdentityError>
where
    U: UserDirectory + 'static,
{
    let actor = service.authenticate(&headers)?;
    let user = service.register(&actor, registration)?;
    Ok((StatusCode::CREATED, Json(user.profile())).into_response())
}

pub(crate) async fn login_handler<U>(
    State(service): State<Arc<IdentityService<U>>>,
    WithRejection(Json(credentials), _): WithRejection<Json<Credentials>, IdentityError>,
) -> Result<Response, IdentityError>
where
    U: UserDirectory + 'static,
{
    let user = service.login(&credentials)?;
    let payload = json!({
        "message": "login successful",
        "user": user.profile(),
    });
    Ok((StatusCode::OK, Json(payload)).into_response())
}

pub(crate) async fn me_handler<U>(
    State(service): State<Arc<IdentityService<U>>>,
    headers: HeaderMap,
) -> Result<Response, IdentityError>
where
    U: UserDirectory + 'static,
{
    let actor = service.authenticate(&headers)?;
    let user = actor.user().ok_or(IdentityError::InvalidCredentials)?;
    Ok((StatusCode::OK, Json(user.profile())).into_response())
}

pub(crate) async fn roles_handler<U>(
    State(service): State<Arc<IdentityService<U>>>,
    WithRejection(Path(user_id), _): WithRejection<Path<u64>, IdentityError>,
    headers: HeaderMap,
    WithRejection(Json(update), _): WithRejection<Json<RoleUpdate>, IdentityError>,
) -> Result<Response, IdentityError>
where
    U: UserDirectory + 'static,
{
    let actor = service.authenticate(&headers)?;
    let user = service.update_roles(&actor, UserId(user_id), &update)?;
    Ok((StatusCode::OK, Json(user.profile())).into_response())
}
