//! Campaign and campaign report handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use core_kernel::CampaignId;
use domain_warranty::{Campaign, CampaignDraft, CampaignReport, CampaignSummary};

use crate::dto::campaigns::{DraftReviewResponse, ReportBody};
use crate::middleware::RequestMetadata;
use crate::{error::ApiError, AppState};

/// Lists campaigns with their status as of today
pub async fn list_campaigns(
    State(state): State<AppState>,
) -> Result<Json<Vec<CampaignSummary>>, ApiError> {
    Ok(Json(state.workflow.list_campaigns().await?))
}

/// Validates a draft without saving it
pub async fn validate_campaign(
    State(state): State<AppState>,
    Json(draft): Json<CampaignDraft>,
) -> Json<DraftReviewResponse> {
    let (draft, errors) = state.workflow.review_campaign_draft(draft);
    Json(DraftReviewResponse::new(draft, errors))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    metadata: RequestMetadata,
    Json(draft): Json<CampaignDraft>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    let campaign = state
        .workflow
        .create_campaign(draft, metadata.into_inner())
        .await?;
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    metadata: RequestMetadata,
    Json(draft): Json<CampaignDraft>,
) -> Result<Json<Campaign>, ApiError> {
    let campaign = state
        .workflow
        .update_campaign(CampaignId::new(id), draft, metadata.into_inner())
        .await?;
    Ok(Json(campaign))
}

/// Files a service center's report for a completed campaign
pub async fn submit_report(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    metadata: RequestMetadata,
    Json(body): Json<ReportBody>,
) -> Result<(StatusCode, Json<CampaignReport>), ApiError> {
    body.validate()?;
    let report = state
        .workflow
        .submit_report(body.into_submission(CampaignId::new(id)), metadata.into_inner())
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}
