//! Users service routes

use auth::{AuthUser, require_bearer};
use axum::{
    Extension, Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    error::{ApiError, ApiResult},
    models::{PhotoUpload, User},
    state::AppState,
};

/// Multipart field carrying the photo
const PHOTO_FIELD: &str = "file";

/// Create the router for the users service
///
/// `/health` and `/auth/**` are public; every `/users` route requires a
/// bearer token.
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/users", get(get_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/contact", get(get_contact_info))
        .route(
            "/users/:id/photo",
            get(get_photo).post(upload_photo).delete(delete_photo),
        )
        .layer(DefaultBodyLimit::max(state.upload_limit))
        .route_layer(middleware::from_fn_with_state(
            state.auth.jwt_service.clone(),
            require_bearer,
        ))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .merge(auth::create_router(state.auth))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "users-service"
    }))
}

/// Get all users
pub async fn get_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// Get a user by ID
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(user))
}

/// Get the contact details of a user
pub async fn get_contact_info(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let contact = state.user_service.get_contact_info(id).await?;
    Ok(Json(contact))
}

/// Create a new user
pub async fn create_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    payload: Result<Json<User>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let user = state.user_service.create_user(payload).await?;
    info!("User {:?} created by {} ({})", user.id, actor.username, actor.role);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Replace all fields of a user
pub async fn update_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
    payload: Result<Json<User>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let user = state.user_service.update_user(id, payload).await?;
    info!("User {} updated by {} ({})", id, actor.username, actor.role);

    Ok(Json(user))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.user_service.delete_user(id).await?;
    info!("User {} deleted by {} ({})", id, actor.username, actor.role);

    Ok(StatusCode::NO_CONTENT)
}

/// Upload a photo from the multipart field `file`
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(PHOTO_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_owned);
        let bytes = field.bytes().await?;

        upload = Some(PhotoUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let upload = upload.ok_or_else(|| {
        ApiError::BadRequest(format!("Required part '{}' is not present", PHOTO_FIELD))
    })?;

    let user = state.user_service.upload_photo(id, upload).await?;
    info!("Photo of user {} replaced by {} ({})", id, actor.username, actor.role);

    Ok(Json(user))
}

/// Get the stored photo path as plain text
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    let photo_path = state.user_service.get_photo_path(id).await?;
    Ok(photo_path.unwrap_or_default())
}

/// Delete the photo of a user
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<impl IntoResponse> {
    state.user_service.delete_photo(id).await?;
    info!("Photo of user {} deleted by {} ({})", id, actor.username, actor.role);

    Ok(StatusCode::NO_CONTENT)
}
