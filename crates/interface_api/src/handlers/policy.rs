//! Policy handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use domain_access::{AccessLevel, ResourceType};

use crate::auth::{authorize, Claims};
use crate::dto::policy::*;
use crate::error::ApiError;
use crate::AppState;

/// Creates a new policy in Draft status
pub async fn create_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<CreatePolicyRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Write)?;
    request.validate()?;

    let policy = state.policy_service.create(request).await?;
    Ok(Json(PolicyResponse::from_policy(&policy)?))
}

/// Lists policies
pub async fn list_policies(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PolicyListQuery>,
) -> Result<Json<Vec<PolicyResponse>>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Read)?;

    let policies = state
        .policy_service
        .list(query.status, query.owner_id)
        .await?;
    let responses = policies
        .iter()
        .map(PolicyResponse::from_policy)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(responses))
}

/// Gets a policy by ID
pub async fn get_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<PolicyResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Read)?;

    let policy = state.policy_service.get(id).await?;
    Ok(Json(PolicyResponse::from_policy(&policy)?))
}

/// Updates a policy's mutable fields
pub async fn update_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePolicyRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Write)?;

    let policy = state.policy_service.update(id, request).await?;
    Ok(Json(PolicyResponse::from_policy(&policy)?))
}

/// Activates a draft policy
pub async fn activate_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<PolicyResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Approve)?;

    let policy = state.policy_service.activate(id).await?;
    Ok(Json(PolicyResponse::from_policy(&policy)?))
}

/// Terminates an active policy mid-term
pub async fn terminate_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<TerminatePolicyRequest>,
) -> Result<Json<PolicyResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Approve)?;

    let policy = state
        .policy_service
        .terminate(id, request.termination_date)
        .await?;
    Ok(Json(PolicyResponse::from_policy(&policy)?))
}

/// Exports an active policy to PolicySTAR
pub async fn export_policy(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExportResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Approve)?;

    let receipt = state.policy_service.export(id).await?;
    Ok(Json(receipt.into()))
}

/// Attaches a draft endorsement
pub async fn create_endorsement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<CreateEndorsementRequest>,
) -> Result<Json<EndorsementResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Write)?;
    request.validate()?;

    let (policy, endorsement_id) = state
        .policy_service
        .add_endorsement(id, request, &claims.sub)
        .await?;
    let endorsement = policy
        .endorsements()
        .iter()
        .find(|e| e.id == endorsement_id)
        .ok_or_else(|| ApiError::Internal("endorsement missing after save".to_string()))?;
    Ok(Json(endorsement.into()))
}

/// Approves an attached endorsement
pub async fn approve_endorsement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, endorsement_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PolicyResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Approve)?;

    let policy = state
        .policy_service
        .approve_endorsement(id, endorsement_id, &claims.sub)
        .await?;
    Ok(Json(PolicyResponse::from_policy(&policy)?))
}

/// Verifies a vehicle registration with the RMV
pub async fn verify_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<VehicleVerificationRequest>,
) -> Result<Json<VehicleVerificationResponse>, ApiError> {
    authorize(&claims, ResourceType::Policy, AccessLevel::Write)?;
    request.validate()?;

    let record = state.policy_service.verify_vehicle(id, request).await?;
    Ok(Json(record.into()))
}
