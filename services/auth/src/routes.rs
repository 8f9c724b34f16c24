//! Authentication routes

use std::sync::Arc;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{credentials::CredentialVerifier, error::AuthError, jwt::JwtService};

/// State for the authentication routes
#[derive(Clone)]
pub struct AuthState {
    pub jwt_service: JwtService,
    pub verifier: Arc<dyn CredentialVerifier>,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response for token generation
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Create the router for the `/auth` endpoints
pub fn create_router(state: AuthState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .with_state(state)
}

/// Exchange admin credentials for an access token
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let principal = state
        .verifier
        .verify(&payload.username, &payload.password)
        .ok_or_else(|| {
            warn!("Failed login attempt for user: {}", payload.username);
            AuthError::Unauthorized
        })?;

    let access_token = state
        .jwt_service
        .generate_access_token(&principal.username, &principal.role)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    info!("User {} logged in", principal.username);

    Ok(Json(TokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}
