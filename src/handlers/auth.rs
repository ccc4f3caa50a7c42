//! Authentication handlers

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::models::{CredentialsRequest, MessageResponse, User};
use crate::{AppError, AppResult, AppState};

/// Register a new account. No auto-login: the client must call /login.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(req) = payload?;

    // Check if username already exists
    if User::find_by_username(&state.pool, &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::AlreadyExists(
            "Username already registered".to_string(),
        ));
    }

    // Hash password
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .to_string();

    // The check above races with concurrent registrations of the same
    // username; the UNIQUE constraint is the authority, so map its
    // violation to a conflict as well.
    let user = match User::create(&state.pool, &req.username, &password_hash).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::AlreadyExists(
                "Username already registered".to_string(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("New account registered: {} (id {})", user.username, user.id);

    Ok(Json(MessageResponse {
        message: "User registered successfully",
    }))
}

/// Login endpoint. Stateless: no session or token is issued.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let Json(req) = payload?;

    // Find user by username
    let user = User::find_by_username(&state.pool, &req.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|_| AppError::InternalError("Invalid password hash".to_string()))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)?;

    Ok(Json(MessageResponse {
        message: "Login successful",
    }))
}
