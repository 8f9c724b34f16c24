//! Authentication for the user records service
//!
//! Provides the configured admin principal, RS256 access tokens, the
//! `/auth/login` route issuing them and the bearer-token middleware that
//! guards every other route.

pub mod credentials;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod routes;

pub use credentials::{AdminConfig, AdminCredentials, CredentialVerifier, Principal};
pub use error::AuthError;
pub use jwt::{Claims, JwtConfig, JwtService};
pub use middleware::{AuthUser, require_bearer};
pub use routes::{AuthState, create_router};
