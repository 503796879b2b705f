use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::{error::ApiError, state::AppState};
use crate::domain::{Fields, Model, User};

pub async fn create_user(
    State(state): State<AppState>,
    Json(data): Json<Fields>,
) -> Result<(StatusCode, Json<Fields>), ApiError> {
    let mut user = User::new(&state.index).with_data(data);
    let status = if user.id().is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };

    state.persistence.save(&mut user).await?;
    Ok((status, Json(user.into_data())))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Fields>, ApiError> {
    let mut user = User::new(&state.index).with_id(id);

    state.persistence.read(&mut user).await?;
    Ok(Json(user.into_data()))
}

/// The path identifier wins over any `id` in the payload.
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(data): Json<Fields>,
) -> Result<Json<Fields>, ApiError> {
    let mut user = User::new(&state.index).with_data(data).with_id(id);

    state.persistence.save(&mut user).await?;
    Ok(Json(user.into_data()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user = User::new(&state.index).with_id(id);

    state.persistence.delete(&user).await?;
    Ok(StatusCode::NO_CONTENT)
}
