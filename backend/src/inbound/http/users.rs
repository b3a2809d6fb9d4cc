//! Session and profile handlers.
//!
//! ```text
//! POST  /api/v1/login {"email":"ada@example.test","password":"..."}
//! POST  /api/v1/logout
//! GET   /api/v1/users/me
//! PATCH /api/v1/users/{id}/profile
//! PUT   /api/v1/users/{id}/password
//! ```

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, LoginCredentials, LoginValidationError, ProfileUpdate, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, UserView};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, empty_password_error, invalid_email_error, missing_field_error, parse_id,
};

const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");
const USER_ID: FieldName = FieldName::new("userId");

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::InvalidEmail(inner) => invalid_email_error(EMAIL, inner),
        LoginValidationError::EmptyPassword => empty_password_error(PASSWORD),
    }
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserView,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserView>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let actor = state.login.authenticate(&credentials).await?;
    session.persist_actor(&actor)?;
    let user = state.profile_query.current_user(&actor).await?;
    Ok(web::Json(UserView::from(user)))
}

/// Drop the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// Fetch the signed-in user, including their stored alerts.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Current user", body = UserView),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "User no longer exists", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserView>> {
    let actor = session.require_actor()?;
    let user = state.profile_query.current_user(&actor).await?;
    Ok(web::Json(UserView::from(user)))
}

/// Profile fields to change. Omitted fields stay as they are.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub image: Option<String>,
}

impl From<ProfileRequest> for ProfileUpdate {
    fn from(value: ProfileRequest) -> Self {
        Self {
            name: value.name,
            age: value.age,
            gender: value.gender,
            image: value.image,
        }
    }
}

/// Update a user's personal profile.
#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}/profile",
    params(("id" = String, Path, description = "User id")),
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserView),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Concurrent update", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateProfile"
)]
#[patch("/users/{id}/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserView>> {
    let actor = session.require_actor()?;
    let target: UserId = parse_id(&path.into_inner(), USER_ID)?;
    let user = state
        .profile
        .update_profile(&actor, &target, payload.into_inner().into())
        .await?;
    Ok(web::Json(UserView::from(user)))
}

/// New password for `PUT /users/{id}/password`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub password: Option<String>,
}

/// Replace a user's password.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/password",
    params(("id" = String, Path, description = "User id")),
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "changePassword"
)]
#[put("/users/{id}/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_actor()?;
    let target: UserId = parse_id(&path.into_inner(), USER_ID)?;
    let password = payload
        .into_inner()
        .password
        .ok_or_else(|| missing_field_error(PASSWORD))?;
    state
        .profile
        .change_password(&actor, &target, password)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register this module's routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(login)
        .service(logout)
        .service(current_user)
        .service(update_profile)
        .service(change_password);
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
