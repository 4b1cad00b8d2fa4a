use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::json;
use tracing::{debug, info, warn};

use super::directory::UserDirectory;
use super::domain::{
    Actor, Credentials, NewUser, Registration, Role, RoleUpdate, Roles, User, UserId,
};
use super::password::{Argon2Hasher, PasswordError, PasswordHasher};
use crate::clock::{Clock, SystemClock};
use crate::repository::RepositoryError;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_EMAIL_LEN: usize = 254;

/// Registration, credential checks and role administration.
pub struct IdentityService<U> {
    directory: Arc<U>,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
}

impl<U> IdentityService<U>
where
    U: UserDirectory + 'static,
{
    pub fn new(directory: Arc<U>) -> Self {
        Self::with_parts(directory, Arc::new(Argon2Hasher::default()), Arc::new(SystemClock))
    }

    pub fn with_parts(
        directory: Arc<U>,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            hasher,
            clock,
        }
    }

    /// Create an account. Only a superuser may hand out the superuser role.
    pub fn register(&self, actor: &Actor, registration: Registration) -> Result<User, IdentityError> {
        if registration.is_superuser && !actor.is_superuser() {
            return Err(IdentityError::PermissionDenied(
                "only a superuser may grant the superuser role",
            ));
        }

        let roles = Roles::from_flags(
            registration.is_employer,
            registration.is_applicant,
            registration.is_superuser,
        );
        self.create(
            &registration.email,
            &registration.password,
            registration.full_name,
            roles,
        )
    }

    pub fn login(&self, credentials: &Credentials) -> Result<User, IdentityError> {
        self.verify(&credentials.email, &credentials.password)
    }

    /// Resolve the actor behind a request. A request without credentials is
    /// anonymous; a request with bad credentials is rejected outright.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Actor, IdentityError> {
        let Some(value) = headers.get(AUTHORIZATION) else {
            return Ok(Actor::Anonymous);
        };

        let (email, password) = parse_basic(value.to_str().ok())?;
        let user = self.verify(&email, &password)?;
        Ok(Actor::User(user))
    }

    pub fn update_roles(
        &self,
        actor: &Actor,
        user_id: UserId,
        update: &RoleUpdate,
    ) -> Result<User, IdentityError> {
        if !actor.is_authenticated() {
            return Err(IdentityError::InvalidCredentials);
        }
        if !actor.is_superuser() {
            return Err(IdentityError::PermissionDenied(
                "only a superuser may change roles",
            ));
        }

        let mut user = self
            .directory
            .fetch(user_id)?
            .ok_or(IdentityError::NotFound)?;
        update.apply(&mut user.roles);
        self.directory.update(user.clone())?;

        info!(user_id = %user.id, roles = ?user.roles, "roles updated");
        Ok(user)
    }

    /// Idempotently provision a superuser at startup.
    ///
    /// An existing account with the seed email is promoted, provided the seed
    /// password matches it.
    pub fn ensure_superuser(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let normalized = normalize_email(email)?;
        if let Some(mut existing) = self.directory.find_by_email(&normalized)? {
            if !self.hasher.verify(password, &existing.password_hash) {
                warn!(user_id = %existing.id, "bootstrap password does not match existing account");
                return Err(IdentityError::InvalidCredentials);
            }
            if existing.is_superuser() {
                debug!(user_id = %existing.id, "bootstrap superuser already present");
                return Ok(existing);
            }

            existing.roles.set(Role::Superuser, true);
            self.directory.update(existing.clone())?;
            info!(user_id = %existing.id, "existing account promoted to superuser");
            return Ok(existing);
        }

        self.create(
            &normalized,
            password,
            None,
            Roles::from_flags(true, true, true),
        )
    }

    pub fn user(&self, id: UserId) -> Result<Option<User>, IdentityError> {
        Ok(self.directory.fetch(id)?)
    }

    fn create(
        &self,
        email: &str,
        password: &str,
        full_name: Option<String>,
        roles: Roles,
    ) -> Result<User, IdentityError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(IdentityError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.directory.find_by_email(&email)?.is_some() {
            return Err(IdentityError::EmailTaken);
        }

        let full_name = full_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        let user = self
            .directory
            .insert(NewUser {
                email,
                full_name,
                roles,
                password_hash: self.hasher.hash(password)?,
                date_joined: self.clock.now(),
            })
            .map_err(|err| match err {
                RepositoryError::Conflict => IdentityError::EmailTaken,
                other => IdentityError::Directory(other),
            })?;

        info!(
            user_id = %user.id,
            employer = user.is_employer(),
            applicant = user.is_applicant(),
            superuser = user.is_superuser(),
            "user registered"
        );
        Ok(user)
    }

    fn verify(&self, email: &str, password: &str) -> Result<User, IdentityError> {
        let email = normalize_email(email).map_err(|_| IdentityError::InvalidCredentials)?;
        let user = self
            .directory
            .find_by_email(&email)?
            .ok_or(IdentityError::InvalidCredentials)?;

        if self.hasher.verify(password, &user.password_hash) {
            Ok(user)
        } else {
            debug!(user_id = %user.id, "password mismatch");
            Err(IdentityError::InvalidCredentials)
        }
    }
}

/// Trim the address and lowercase its domain part.
pub fn normalize_email(raw: &str) -> Result<String, IdentityError> {
    let trimmed = raw.trim();
    let Some((local, domain)) = trimmed.rsplit_once('@') else {
        return Err(IdentityError::Validation("email must contain '@'".to_string()));
    };
    if local.is_empty() || domain.is_empty() || trimmed.len() > MAX_EMAIL_LEN {
        return Err(IdentityError::Validation("email is not a valid address".to_string()));
    }
    Ok(format!("{local}@{}", domain.to_ascii_lowercase()))
}

fn parse_basic(header: Option<&str>) -> Result<(String, String), IdentityError> {
    let header = header.ok_or(IdentityError::MalformedAuthorization)?;
    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or(IdentityError::MalformedAuthorization)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(IdentityError::MalformedAuthorization);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| IdentityError::MalformedAuthorization)?;
    let decoded = String::from_utf8(decoded).map_err(|_| IdentityError::MalformedAuthorization)?;
    let (email, password) = decoded
        .split_once(':')
        .ok_or(IdentityError::MalformedAuthorization)?;

    Ok((email.to_string(), password.to_string()))
}

/// Error raised by identity operations.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("authorization header must use the Basic scheme")]
    MalformedAuthorization,
    #[error("user already exists")]
    EmailTaken,
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),
    #[error("user not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Directory(#[from] RepositoryError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl IdentityError {
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::InvalidCredentials => "invalid_credentials",
            IdentityError::MalformedAuthorization => "malformed_authorization",
            IdentityError::EmailTaken => "email_taken",
            IdentityError::PermissionDenied(_) => "permission_denied",
            IdentityError::NotFound => "not_found",
            IdentityError::Validation(_) => "validation_error",
            IdentityError::Directory(_) => "storage_error",
            IdentityError::Password(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            IdentityError::InvalidCredentials | IdentityError::MalformedAuthorization => {
                StatusCode::UNAUTHORIZED
            }
            IdentityError::EmailTaken => StatusCode::CONFLICT,
            IdentityError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            IdentityError::NotFound => StatusCode::NOT_FOUND,
            IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
            IdentityError::Directory(_) | IdentityError::Password(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<JsonRejection> for IdentityError {
    fn from(rejection: JsonRejection) -> Self {
        IdentityError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for IdentityError {
    fn from(rejection: PathRejection) -> Self {
        IdentityError::Validation(rejection.body_text())
    }
}

impl IntoResponse for IdentityError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = axum::Json(json!({ "error": self.to_string(), "code": self.code() }));
        if status == StatusCode::UNAUTHORIZED {
            (status, [(WWW_AUTHENTICATE, "Basic realm=\"jobboard\"")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
