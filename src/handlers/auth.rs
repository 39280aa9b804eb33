// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{
        AuthResponse, LoginRequest, MeResponse, NewUser, ROLE_ADMIN, ROLE_USER, RegisterRequest,
        UpdateRoleRequest, User,
    },
    store::DynStore,
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

fn issue(user: User, config: &Config) -> Result<AuthResponse, AppError> {
    let token = sign_jwt(user.id, &user.role, &config.jwt_secret, config.jwt_expiration)?;
    Ok(AuthResponse { user, token })
}

/// Loads the user behind a token; a token for a vanished user is no longer valid.
async fn current_user(store: &DynStore, claims: &Claims) -> Result<User, AppError> {
    store
        .find_user(claims.user_id()?)
        .await?
        .ok_or(AppError::AuthError("User not found".to_string()))
}

/// Registers a new user with the 'user' role.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with the user object and a token.
pub async fn register(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = store
        .create_user(NewUser {
            name: payload.name.trim().to_string(),
            email: payload.email.trim().to_lowercase(),
            password: hashed_password,
            role: ROLE_USER.to_string(),
        })
        .await?;

    tracing::info!(user_id = user.id, "user registered");

    Ok((StatusCode::CREATED, Json(issue(user, &config)?)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let user = store
        .find_user_by_email(&payload.email.trim().to_lowercase())
        .await?
        .ok_or(AppError::AuthError("Invalid credentials".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid credentials".to_string()));
    }

    Ok(Json(issue(user, &config)?))
}

/// Issues a fresh token carrying the user's current role.
pub async fn refresh(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&store, &claims).await?;
    Ok(Json(issue(user, &config)?))
}

/// Switches the caller between the 'admin' and 'user' roles.
/// The old token still carries the old role, so a new one is returned.
pub async fn update_role(
    State(store): State<DynStore>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.role != ROLE_ADMIN && payload.role != ROLE_USER {
        return Err(AppError::BadRequest("Invalid role".to_string()));
    }

    let user = store
        .update_user_role(claims.user_id()?, &payload.role)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = user.id, role = %user.role, "user role updated");

    Ok(Json(issue(user, &config)?))
}

/// Returns the authenticated user.
pub async fn me(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = current_user(&store, &claims).await?;
    Ok(Json(MeResponse { user }))
}
