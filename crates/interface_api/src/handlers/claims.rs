//! Claims handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use domain_warranty::{
    Claim, ClaimComment, ClaimCreated, ClaimIdentity, FinalizeOutcome, LedgerView, PartCheck,
};

use crate::dto::claims::*;
use crate::middleware::RequestMetadata;
use crate::{error::ApiError, AppState};

fn claim_id(raw: &str) -> Result<ClaimIdentity, ApiError> {
    Ok(raw.parse::<ClaimIdentity>()?)
}

/// Opens a claim, optionally confirming the vehicle's campaign
pub async fn create_claim(
    State(state): State<AppState>,
    metadata: RequestMetadata,
    Json(body): Json<CreateClaimBody>,
) -> Result<(StatusCode, Json<ClaimCreated>), ApiError> {
    body.validate()?;
    let created = state
        .workflow
        .create_claim(body.into(), metadata.into_inner())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Lists claims
pub async fn list_claims(
    State(state): State<AppState>,
    Query(params): Query<ClaimListParams>,
) -> Result<Json<Vec<Claim>>, ApiError> {
    let claims = state.workflow.list_claims(params.into_query()?).await?;
    Ok(Json(claims))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Claim>, ApiError> {
    Ok(Json(state.workflow.get_claim(claim_id(&id)?).await?))
}

/// Records the technician's part checks and moves the claim to REPAIR
pub async fn record_check(
    State(state): State<AppState>,
    Path(id): Path<String>,
    metadata: RequestMetadata,
    Json(body): Json<PartChecksBody>,
) -> Result<Json<Claim>, ApiError> {
    let claim = state
        .workflow
        .record_technician_check(claim_id(&id)?, body.parts, metadata.into_inner())
        .await?;
    Ok(Json(claim))
}

pub async fn list_part_checks(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<PartCheck>>, ApiError> {
    Ok(Json(state.workflow.part_checks(claim_id(&id)?).await?))
}

/// Records part checks without changing the claim's status
pub async fn record_part_checks(
    State(state): State<AppState>,
    Path(id): Path<String>,
    metadata: RequestMetadata,
    Json(body): Json<PartChecksBody>,
) -> Result<(StatusCode, Json<Vec<PartCheck>>), ApiError> {
    let checks = state
        .workflow
        .record_part_checks(claim_id(&id)?, body.parts, metadata.into_inner())
        .await?;
    Ok((StatusCode::CREATED, Json(checks)))
}

pub async fn start_repair(
    State(state): State<AppState>,
    Path(id): Path<String>,
    metadata: RequestMetadata,
) -> Result<Json<Claim>, ApiError> {
    let claim = state
        .workflow
        .start_repair(claim_id(&id)?, metadata.into_inner())
        .await?;
    Ok(Json(claim))
}

pub async fn request_decision(
    State(state): State<AppState>,
    Path(id): Path<String>,
    metadata: RequestMetadata,
) -> Result<Json<Claim>, ApiError> {
    let claim = state
        .workflow
        .request_decision(claim_id(&id)?, metadata.into_inner())
        .await?;
    Ok(Json(claim))
}

/// The ledger as stored
pub async fn get_ledger(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LedgerView>, ApiError> {
    Ok(Json(state.workflow.ledger(claim_id(&id)?, &[]).await?))
}

/// The ledger after the reviewer's commands; nothing is written
pub async fn preview_ledger(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<LedgerPreviewBody>,
) -> Result<Json<LedgerView>, ApiError> {
    Ok(Json(state.workflow.ledger(claim_id(&id)?, &body.commands).await?))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ClaimComment>>, ApiError> {
    Ok(Json(state.workflow.claim_comments(claim_id(&id)?).await?))
}

/// Applies the reviewer's decisions and closes the claim
pub async fn finalize(
    State(state): State<AppState>,
    Path(id): Path<String>,
    metadata: RequestMetadata,
    Json(body): Json<FinalizeBody>,
) -> Result<Json<FinalizeOutcome>, ApiError> {
    body.validate()?;
    let outcome = state
        .workflow
        .finalize(claim_id(&id)?, body.into(), metadata.into_inner())
        .await?;
    Ok(Json(outcome))
}
