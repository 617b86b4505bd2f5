//! Appointment handlers

use axum::{
    extract::{Query, State},
    Json,
};

use domain_warranty::Appointment;

use crate::dto::campaigns::AppointmentParams;
use crate::{error::ApiError, AppState};

/// Appointments in the current week (`window=7d`) or month (`window=30d`)
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(params): Query<AppointmentParams>,
) -> Result<Json<Vec<Appointment>>, ApiError> {
    let window = params.window()?;
    Ok(Json(state.workflow.list_appointments(window).await?))
}
