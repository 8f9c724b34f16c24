//! Application state shared across handlers

use auth::AuthState;

use crate::service::UserService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub auth: AuthState,
    /// Largest accepted request body on the user routes, in bytes
    pub upload_limit: usize,
}
