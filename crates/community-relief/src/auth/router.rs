use std::sync::Arc;

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use super::domain::{
    ChangePasswordRequest, LoginRequest, RegistrationRequest, UserRole, UserStore,
};
use super::extract::{AuthGate, CurrentUser};
use super::service::AuthService;
use crate::envelope::{self, success};

pub struct AuthState<U> {
    pub service: Arc<AuthService<U>>,
    pub gate: AuthGate,
}

impl<U> Clone for AuthState<U> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            gate: self.gate.clone(),
        }
    }
}

impl<U> FromRef<AuthState<U>> for AuthGate {
    fn from_ref(state: &AuthState<U>) -> Self {
        state.gate.clone()
    }
}

/// Login, registration and profile endpoints under `/api/auth`.
pub fn auth_router<U>(service: Arc<AuthService<U>>) -> Router
where
    U: UserStore + 'static,
{
    let gate = AuthGate::new(service.clone());
    Router::new()
        .route("/api/auth/login", post(login::<U>))
        .route("/api/auth/register", post(register::<U>))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/profile", get(profile::<U>))
        .route("/api/auth/change-password", put(change_password::<U>))
        .with_state(AuthState { service, gate })
}

pub(crate) async fn login<U>(
    State(state): State<AuthState<U>>,
    Json(request): Json<LoginRequest>,
) -> Response
where
    U: UserStore + 'static,
{
    match state.service.login(request) {
        Ok(session) => match envelope::to_value(&session) {
            Ok(data) => success(
                StatusCode::OK,
                json!({ "message": "Login successful", "data": data }),
            ),
            Err(response) => response,
        },
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn register<U>(
    operator: CurrentUser,
    State(state): State<AuthState<U>>,
    Json(request): Json<RegistrationRequest>,
) -> Response
where
    U: UserStore + 'static,
{
    if let Err(error) = operator.require_role(UserRole::Admin) {
        return error.into_response();
    }

    match state.service.register(request) {
        Ok(user) => match envelope::to_value(&user) {
            Ok(data) => success(
                StatusCode::CREATED,
                json!({ "message": "User registered successfully", "data": data }),
            ),
            Err(response) => response,
        },
        Err(error) => error.into_response(),
    }
}

/// Tokens are stateless; clients discard them.
pub(crate) async fn logout() -> Response {
    success(StatusCode::OK, json!({ "message": "Logout successful" }))
}

pub(crate) async fn profile<U>(
    CurrentUser(user): CurrentUser,
    State(state): State<AuthState<U>>,
) -> Response
where
    U: UserStore + 'static,
{
    match state.service.profile(&user.id) {
        Ok(view) => match envelope::to_value(&view) {
            Ok(data) => success(StatusCode::OK, json!({ "data": data })),
            Err(response) => response,
        },
        Err(error) => error.into_response(),
    }
}

pub(crate) async fn change_password<U>(
    CurrentUser(user): CurrentUser,
    State(state): State<AuthState<U>>,
    Json(request): Json<ChangePasswordRequest>,
) -> Response
where
    U: UserStore + 'static,
{
    match state.service.change_password(&user.id, request) {
        Ok(()) => success(
            StatusCode::OK,
            json!({ "message": "Password changed successfully" }),
        ),
        Err(error) => error.into_response(),
    }
}
