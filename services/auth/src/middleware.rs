//! Authentication middleware for JWT token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;

use crate::{error::AuthError, jwt::JwtService};

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: String,
}

/// Reject the request unless it carries a valid bearer token
///
/// On success the [`AuthUser`] is inserted into the request extensions.
pub async fn require_bearer(
    State(jwt_service): State<JwtService>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::Unauthorized)?;

    let claims = jwt_service.validate_token(bearer.token()).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        AuthError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser {
        username: claims.sub,
        role: claims.role,
    });

    Ok(next.run(req).await)
}
