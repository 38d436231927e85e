//! User handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::UserId;
use domain_access::{AccessLevel, ResourceType, Role, User};

use crate::auth::{authorize, Claims};
use crate::dto::users::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a user, optionally assigning built-in roles
pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(&claims, ResourceType::User, AccessLevel::Admin)?;
    request.validate()?;

    let mut user = User::new(request.username, request.email, request.full_name)?;
    for role_name in &request.roles {
        let role = Role::builtin(role_name)
            .ok_or_else(|| ApiError::BadRequest(format!("unknown role '{}'", role_name)))?;
        user.assign_role(role.clone())?;
    }

    state.users.insert(&user).await?;
    Ok(Json((&user).into()))
}

/// Lists users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    authorize(&claims, ResourceType::User, AccessLevel::Read)?;

    let users = state.users.list().await?;
    Ok(Json(users.iter().map(Into::into).collect()))
}

/// Gets a user with their roles
pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(&claims, ResourceType::User, AccessLevel::Read)?;

    let user = state.users.fetch(UserId::from(id)).await?;
    Ok(Json((&user).into()))
}

/// Assigns a built-in role to a user
pub async fn assign_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(&claims, ResourceType::User, AccessLevel::Admin)?;
    request.validate()?;

    let role = Role::builtin(&request.role)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown role '{}'", request.role)))?;

    let mut user = state.users.fetch(UserId::from(id)).await?;
    user.assign_role(role.clone())?;
    state.users.update(&mut user).await?;
    Ok(Json((&user).into()))
}
