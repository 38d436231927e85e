//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use domain_access::{AccessLevel, ResourceType};
use domain_claims::ClaimStatus;

use crate::auth::{authorize, Claims};
use crate::dto::claims::*;
use crate::error::ApiError;
use crate::AppState;

/// Opens a new claim
pub async fn open_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<OpenClaimRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    authorize(&claims, ResourceType::Claim, AccessLevel::Write)?;

    let claim = state.claim_service.open(request).await?;
    Ok(Json((&claim).into()))
}

/// Lists claims
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ClaimListQuery>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    authorize(&claims, ResourceType::Claim, AccessLevel::Read)?;

    let results = state
        .claim_service
        .list(query.status, query.policy_id)
        .await?;
    Ok(Json(results.iter().map(Into::into).collect()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClaimResponse>, ApiError> {
    authorize(&claims, ResourceType::Claim, AccessLevel::Read)?;

    let claim = state.claim_service.get(id).await?;
    Ok(Json((&claim).into()))
}

/// Updates claim status along the forward-only table
///
/// Adjusters may work a claim; approving or rejecting it takes the higher
/// approve capability.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClaimStatusRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let target: ClaimStatus = request.status.parse().map_err(ApiError::BadRequest)?;
    let required = match target {
        ClaimStatus::Approved | ClaimStatus::Rejected => AccessLevel::Approve,
        _ => AccessLevel::Write,
    };
    authorize(&claims, ResourceType::Claim, required)?;

    let claim = state.claim_service.update_status(id, &request.status).await?;
    Ok(Json((&claim).into()))
}

/// Uploads a claim document (metadata; bytes land in object storage)
pub async fn upload_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UploadDocumentRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
    authorize(&claims, ResourceType::Document, AccessLevel::Write)?;
    request.validate()?;

    let document = state.claim_service.upload_document(id, request).await?;
    Ok(Json((&document).into()))
}

/// Processes a payment through SpeedPay
pub async fn process_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<ProcessPaymentRequest>,
) -> Result<Json<PaymentResponse>, ApiError> {
    authorize(&claims, ResourceType::Payment, AccessLevel::Write)?;

    let payment = state.claim_service.process_payment(id, request).await?;
    Ok(Json((&payment).into()))
}

/// Orders a CLUE loss history report for the claim's property
pub async fn order_loss_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<LossHistoryRequestDto>,
) -> Result<Json<LossHistoryResponse>, ApiError> {
    authorize(&claims, ResourceType::Claim, AccessLevel::Write)?;
    request.validate()?;

    let report = state.claim_service.order_loss_history(id, request).await?;
    Ok(Json(report.into()))
}
