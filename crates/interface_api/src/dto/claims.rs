//! Claims DTOs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CampaignId, CenterId, StaffId, Vin};
use domain_warranty::{
    CampaignMatch, CampaignStatus, ClaimQuery, ClaimStatus, CreateClaimRequest, FinalizeRequest,
    LedgerCommand, NewPartCheck,
};

use crate::error::ApiError;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimBody {
    #[validate(range(min = 1, message = "Service center is required"))]
    pub center_id: u32,
    #[validate(length(equal = 17, message = "VIN must be 17 characters"))]
    pub vin: String,
    #[validate(range(min = 1, message = "Creator is required"))]
    pub created_by: u64,
    pub assigned_technician: Option<u64>,
    #[serde(default)]
    #[validate(length(max = 2000, message = "Description is too long"))]
    pub description: String,
    #[serde(default)]
    pub confirm_campaign: bool,
    pub campaign_id: Option<u64>,
}

impl From<CreateClaimBody> for CreateClaimRequest {
    fn from(body: CreateClaimBody) -> Self {
        CreateClaimRequest {
            center_id: CenterId::new(body.center_id),
            vin: Vin::new(body.vin),
            created_by: StaffId::new(body.created_by),
            assigned_technician: body.assigned_technician.map(StaffId::new),
            description: body.description,
            confirm_campaign: body.confirm_campaign,
            campaign_id: body.campaign_id.map(CampaignId::new),
        }
    }
}

/// Query string for claim listings
#[derive(Debug, Default, Deserialize)]
pub struct ClaimListParams {
    pub center_id: Option<u32>,
    pub status: Option<String>,
    pub vin: Option<String>,
}

impl ClaimListParams {
    pub fn into_query(self) -> Result<ClaimQuery, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(str::parse::<ClaimStatus>)
            .transpose()?;
        Ok(ClaimQuery {
            center_id: self.center_id.map(CenterId::new),
            status,
            vin: self.vin.map(Vin::new),
        })
    }
}

/// Technician part checks
#[derive(Debug, Deserialize)]
pub struct PartChecksBody {
    pub parts: Vec<NewPartCheck>,
}

/// Reviewer commands applied to a fresh ledger
#[derive(Debug, Default, Deserialize)]
pub struct LedgerPreviewBody {
    #[serde(default)]
    pub commands: Vec<LedgerCommand>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FinalizeBody {
    pub evm_id: Option<u64>,
    #[serde(default)]
    #[validate(length(max = 4000, message = "Description is too long"))]
    pub description: String,
    #[serde(default)]
    pub commands: Vec<LedgerCommand>,
}

impl From<FinalizeBody> for FinalizeRequest {
    fn from(body: FinalizeBody) -> Self {
        FinalizeRequest {
            evm_id: body.evm_id.map(StaffId::new),
            description: body.description,
            commands: body.commands,
        }
    }
}

/// Campaigns affecting a vehicle, with the one a form would pre-select
///
/// `statuses` carries each candidate's status on `today` for display.
#[derive(Debug, Serialize)]
pub struct VehicleCampaignsResponse {
    pub vin: Vin,
    pub campaign_match: CampaignMatch,
    pub preselected: Option<CampaignId>,
    pub statuses: BTreeMap<CampaignId, CampaignStatus>,
}

impl VehicleCampaignsResponse {
    pub fn new(vin: Vin, campaign_match: CampaignMatch, today: NaiveDate) -> Self {
        let preselected = campaign_match.preselected().map(|c| c.id);
        let statuses = campaign_match
            .candidates()
            .iter()
            .map(|c| (c.id, c.status_on(today)))
            .collect();
        Self {
            vin,
            campaign_match,
            preselected,
            statuses,
        }
    }
}
