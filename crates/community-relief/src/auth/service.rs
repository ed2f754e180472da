use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::domain::{
    AdminSeed, AuthenticatedUser, ChangePasswordRequest, LoginRequest, LoginSession,
    RegistrationRequest, User, UserId, UserRole, UserStatus, UserStore, UserView,
};
use super::jwt::{JwtService, TokenRejection};
use super::password::{hash_password, verify_password, BcryptError};
use crate::coordination::repository::StoreError;

const LOGIN_PASSWORD_MIN: usize = 6;
const PASSWORD_MIN: usize = 8;
const NAME_MIN: usize = 2;

/// A single rejected field in a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldIssue {
    fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// Account lifecycle and token verification for dashboard operators.
pub struct AuthService<U> {
    store: Arc<U>,
    jwt: JwtService,
}

impl<U> AuthService<U>
where
    U: UserStore,
{
    pub fn new(store: Arc<U>, jwt: JwtService) -> Self {
        Self { store, jwt }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Create the configured administrator unless an account with that email exists.
    pub fn ensure_default_admin(&self, seed: &AdminSeed) -> Result<bool, AuthError> {
        let email = normalize_email(&seed.email);
        if self.store.user_by_email(&email)?.is_some() {
            return Ok(false);
        }

        let now = Utc::now();
        self.store.insert_user(User {
            id: UserId::generate(),
            email: email.clone(),
            password_hash: hash_password(&seed.password)?,
            name: seed.name.clone(),
            role: UserRole::Admin,
            status: UserStatus::Active,
            last_login: None,
            created_at: now,
            updated_at: now,
        })?;
        info!(%email, "default administrator created");
        Ok(true)
    }

    pub fn login(&self, request: LoginRequest) -> Result<LoginSession, AuthError> {
        let mut issues = Vec::new();
        let email = request.email.as_deref().map(normalize_email);
        if !email.as_deref().is_some_and(is_plausible_email) {
            issues.push(FieldIssue::new("email", "Valid email is required"));
        }
        let password = request.password.unwrap_or_default();
        if password.chars().count() < LOGIN_PASSWORD_MIN {
            issues.push(FieldIssue::new(
                "password",
                "Password must be at least 6 characters",
            ));
        }
        let email = match email {
            Some(email) if issues.is_empty() => email,
            _ => return Err(AuthError::Validation(issues)),
        };

        let mut user = match self.store.user_by_email(&email)? {
            Some(user) if user.is_active() => user,
            _ => {
                warn!(%email, "login refused for unknown or inactive account");
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !verify_password(&password, &user.password_hash) {
            warn!(user_id = %user.id, "login refused for wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        user.last_login = Some(now);
        user.updated_at = now;
        self.store.update_user(&user)?;

        let token = self.jwt.create_token(&user)?;
        info!(user_id = %user.id, role = user.role.label(), "operator logged in");

        Ok(LoginSession {
            user: user.view(),
            token,
            expires_in: self.jwt.expires_in(),
        })
    }

    pub fn register(&self, request: RegistrationRequest) -> Result<UserView, AuthError> {
        let mut issues = Vec::new();
        let email = request.email.as_deref().map(normalize_email);
        if !email.as_deref().is_some_and(is_plausible_email) {
            issues.push(FieldIssue::new("email", "Valid email is required"));
        }
        let password = request.password.unwrap_or_default();
        if password.chars().count() < PASSWORD_MIN {
            issues.push(FieldIssue::new(
                "password",
                "Password must be at least 8 characters",
            ));
        }
        let name = request.name.unwrap_or_default().trim().to_string();
        if name.chars().count() < NAME_MIN {
            issues.push(FieldIssue::new("name", "Name must be at least 2 characters"));
        }
        let role = request
            .role
            .as_deref()
            .and_then(|role| role.parse::<UserRole>().ok());
        if role.is_none() {
            issues.push(FieldIssue::new("role", "Role must be admin or supervisor"));
        }
        let (Some(email), Some(role)) = (email, role) else {
            return Err(AuthError::Validation(issues));
        };
        if !issues.is_empty() {
            return Err(AuthError::Validation(issues));
        }

        if self.store.user_by_email(&email)?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = self
            .store
            .insert_user(User {
                id: UserId::generate(),
                email,
                password_hash: hash_password(&password)?,
                name,
                role,
                status: UserStatus::Active,
                last_login: None,
                created_at: now,
                updated_at: now,
            })
            .map_err(|error| match error {
                StoreError::Conflict => AuthError::DuplicateEmail,
                other => AuthError::Store(other),
            })?;

        info!(user_id = %user.id, role = role.label(), "operator registered");
        Ok(user.view())
    }

    pub fn profile(&self, id: &UserId) -> Result<UserView, AuthError> {
        self.store
            .user(id)?
            .map(|user| user.view())
            .ok_or(AuthError::UserNotFound)
    }

    pub fn change_password(
        &self,
        id: &UserId,
        request: ChangePasswordRequest,
    ) -> Result<(), AuthError> {
        let mut issues = Vec::new();
        let current = request.current_password.unwrap_or_default();
        if current.is_empty() {
            issues.push(FieldIssue::new(
                "currentPassword",
                "Current password is required",
            ));
        }
        let replacement = request.new_password.unwrap_or_default();
        if replacement.chars().count() < PASSWORD_MIN {
            issues.push(FieldIssue::new(
                "newPassword",
                "New password must be at least 8 characters",
            ));
        }
        if !issues.is_empty() {
            return Err(AuthError::Validation(issues));
        }

        let mut user = self.store.user(id)?.ok_or(AuthError::UserNotFound)?;
        if !verify_password(&current, &user.password_hash) {
            return Err(AuthError::IncorrectPassword);
        }

        user.password_hash = hash_password(&replacement)?;
        user.updated_at = Utc::now();
        self.store.update_user(&user)?;
        info!(user_id = %user.id, "operator password changed");
        Ok(())
    }

    /// Resolve a bearer token to an active account.
    pub fn authenticate_token(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let claims = self
            .jwt
            .verify_token(token)
            .map_err(|error| match TokenRejection::from(&error) {
                TokenRejection::Expired => AuthError::TokenExpired,
                TokenRejection::Invalid => AuthError::InvalidToken,
            })?;

        let user = self
            .store
            .user(&UserId(claims.sub))?
            .filter(User::is_active)
            .ok_or(AuthError::UnknownUser)?;

        Ok(AuthenticatedUser {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        })
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.contains(char::is_whitespace)
}

/// Error enumeration for authentication failures.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access token required")]
    MissingToken,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token or user not found")]
    UnknownUser,
    #[error("Insufficient permissions")]
    Forbidden,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Validation failed")]
    Validation(Vec<FieldIssue>),
    #[error("User with this email already exists")]
    DuplicateEmail,
    #[error("Current password is incorrect")]
    IncorrectPassword,
    #[error("User not found")]
    UserNotFound,
    #[error("user store failure: {0}")]
    Store(#[from] StoreError),
    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("password hashing failed: {0}")]
    Hashing(#[from] BcryptError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingToken
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::UnknownUser
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Validation(_) | AuthError::IncorrectPassword => StatusCode::BAD_REQUEST,
            AuthError::DuplicateEmail => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Store(_) | AuthError::Signing(_) | AuthError::Hashing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
