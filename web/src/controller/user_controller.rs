use crate::controller::ApiResponse;
use crate::{AppState, Error};
use axum::extract::rejection::JsonRejection;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use domain::{user as UserApi, users};

use log::*;

/// GET all Users
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Successfully retrieved all Users", body = [users::Model]),
        (status = 500, description = "Internal Server Error", body = crate::response::ErrorResponse)
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all Users");

    let users = UserApi::find_all(app_state.db_conn_ref()).await?;

    debug!("Found {} Users", users.len());

    Ok(Json(ApiResponse::new(StatusCode::OK.into(), users)))
}

/// CREATE a new User
#[utoipa::path(
    post,
    path = "/users",
    request_body = users::Model,
    responses(
        (status = 201, description = "Successfully created a new User", body = users::Model),
        (status = 400, description = "Missing or malformed name or email", body = crate::response::ErrorResponse),
        (status = 409, description = "A User with this email already exists", body = crate::response::ErrorResponse)
    )
)]
pub async fn create(
    State(app_state): State<AppState>,
    payload: Result<Json<users::Model>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(user_model) = payload.map_err(Error::from_rejection)?;
    debug!("CREATE new User from: {:?}", user_model);

    let user: users::Model = UserApi::create(app_state.db_conn_ref(), user_model).await?;

    debug!("Newly created User {:?}", &user);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StatusCode::CREATED.into(), user)),
    ))
}
