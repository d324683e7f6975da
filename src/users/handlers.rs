use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{bad_request, conflict, internal, unauthorized, ApiError},
    state::AppState,
};

use super::dto::{LoginRequest, RegisterRequest};
use super::password::{hash_password, verify_password};
use super::repo::{CreateUserError, User};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let first_name = payload.first_name.trim();
    let last_name = payload.last_name.trim();
    let email = payload.email.trim().to_lowercase();
    let password = payload.password.trim();

    if first_name.is_empty() || last_name.is_empty() || email.is_empty() || password.is_empty() {
        warn!("registration rejected: missing fields");
        return Err(bad_request("All fields are required"));
    }

    // Friendly answer for the common case; the UNIQUE constraint has the
    // final say under concurrent registrations.
    if User::find_by_email(&state.db, &email)
        .await
        .map_err(internal)?
        .is_some()
    {
        warn!(email = %email, "registration rejected: email taken");
        return Err(conflict("Email already registered"));
    }

    let password_hash = hash_password(password).map_err(internal)?;

    let user = match User::create(&state.db, first_name, last_name, &email, &password_hash).await {
        Ok(u) => u,
        Err(CreateUserError::EmailTaken) => {
            warn!(email = %email, "registration lost duplicate-email race");
            return Err(conflict("Email already registered"));
        }
        Err(CreateUserError::Db(e)) => return Err(internal(e)),
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<User>, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let email = payload.email.trim().to_lowercase();
    let password = payload.password.trim();

    if email.is_empty() || password.is_empty() {
        warn!("login rejected: missing credentials");
        return Err(bad_request("Email and password are required"));
    }

    let user = match User::find_by_email(&state.db, &email)
        .await
        .map_err(internal)?
    {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(unauthorized("Invalid credentials"));
        }
    };

    if !verify_password(password, &user.password_hash).map_err(internal)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(unauthorized("Invalid credentials"));
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(user))
}
