use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use super::domain::{AuthenticatedUser, UserRole, UserStore};
use super::service::{AuthError, AuthService};
use crate::envelope;

/// Resolves bearer tokens into operator identities.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, AuthError>;
}

impl<U> Authenticator for AuthService<U>
where
    U: UserStore,
{
    fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        let token = token.ok_or(AuthError::MissingToken)?;
        self.authenticate_token(token)
    }
}

/// Shared handle routers keep in their state so [`CurrentUser`] can verify requests.
#[derive(Clone)]
pub struct AuthGate(Arc<dyn Authenticator>);

impl AuthGate {
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self(authenticator)
    }

    pub fn authenticate(&self, token: Option<&str>) -> Result<AuthenticatedUser, AuthError> {
        self.0.authenticate(token)
    }
}

/// Extractor for routes that require a logged-in operator.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthenticatedUser);

impl CurrentUser {
    pub fn require_role(&self, role: UserRole) -> Result<(), AuthError> {
        if self.0.role == role {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = AuthGate::from_ref(state);
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token);

        gate.authenticate(token).map(CurrentUser)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            AuthError::Validation(details) => envelope::with_status(
                status,
                json!({
                    "success": false,
                    "error": "Validation failed",
                    "details": details,
                }),
            ),
            AuthError::Store(ref error) => {
                tracing::error!(%error, "user store failure");
                envelope::failure(status, "Authentication failed")
            }
            AuthError::Signing(ref error) => {
                tracing::error!(%error, "token signing failure");
                envelope::failure(status, "Login failed")
            }
            AuthError::Hashing(ref error) => {
                tracing::error!(%error, "password hashing failure");
                envelope::failure(status, "Password could not be stored")
            }
            other => envelope::failure(status, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer   "), None);
    }
}
