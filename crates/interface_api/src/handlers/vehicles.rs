//! Vehicle handlers

use axum::{
    extract::{Path, State},
    Json,
};

use core_kernel::Vin;
use domain_warranty::Vehicle;

use crate::dto::claims::VehicleCampaignsResponse;
use crate::{error::ApiError, AppState};

pub async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(state.workflow.list_vehicles().await?))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<Vehicle>, ApiError> {
    Ok(Json(state.workflow.get_vehicle(&Vin::new(vin)).await?))
}

/// Campaigns listing the vehicle's model, each with its status today
pub async fn vehicle_campaigns(
    State(state): State<AppState>,
    Path(vin): Path<String>,
) -> Result<Json<VehicleCampaignsResponse>, ApiError> {
    let vin = Vin::new(vin);
    let campaign_match = state.workflow.campaign_match_for_vehicle(&vin).await?;
    Ok(Json(VehicleCampaignsResponse::new(
        vin,
        campaign_match,
        state.workflow.today(),
    )))
}
