//! User handlers for the REST API.

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use pinbridge_types::identity::{UserId, UserView};

use crate::http::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: UserId,
}

/// POST /user - Returns a fresh placeholder id.
///
/// Users are created by the chat registration flow, so nothing is stored.
pub async fn create_user() -> Json<CreatedUser> {
    Json(CreatedUser { id: UserId::new() })
}

/// GET /user/{id} - Look up a registered user.
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>, AppError> {
    let user = state.user_query.resolve(&id).await?;
    Ok(Json(user))
}
