//! Admin authentication: password hashing, HS256 bearer tokens, and the user store seam.

mod domain;
pub mod extract;
pub mod jwt;
pub mod password;
pub mod router;
pub mod service;

pub use domain::{
    AdminSeed, AuthenticatedUser, ChangePasswordRequest, LoginRequest, LoginSession,
    RegistrationRequest, User, UserId, UserRole, UserStatus, UserStore, UserView,
};
pub use extract::{AuthGate, Authenticator, CurrentUser};
pub use jwt::{Claims, JwtService};
pub use router::{auth_router, AuthState};
pub use service::{AuthError, AuthService, FieldIssue};
