//! User records service
//!
//! CRUD over user rows plus profile photo management, served over a
//! bearer-token protected REST API.

pub mod config;
pub mod error;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod service;
pub mod state;

pub use routes::create_router;
pub use service::{UserError, UserService};
pub use state::AppState;
