//! Campaign, report, and appointment DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{CampaignId, CenterId, StaffId};
use domain_warranty::{AppointmentWindow, CampaignDraft, FieldErrors, ReportSubmission};

use crate::error::ApiError;

/// A draft as validation left it
#[derive(Debug, Serialize)]
pub struct DraftReviewResponse {
    pub draft: CampaignDraft,
    pub valid: bool,
    pub errors: FieldErrors,
}

impl DraftReviewResponse {
    pub fn new(draft: CampaignDraft, errors: FieldErrors) -> Self {
        Self {
            draft,
            valid: errors.is_empty(),
            errors,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReportBody {
    #[validate(range(min = 1, message = "Service center is required"))]
    pub center_id: u32,
    #[validate(length(min = 1, message = "At least one submitter is required"))]
    pub submitted_by: Vec<u64>,
    #[validate(length(min = 1, message = "File name is required"))]
    pub original_file_name: String,
    #[validate(length(min = 1, message = "Attachment is required"))]
    pub file_ref: String,
}

impl ReportBody {
    pub fn into_submission(self, campaign_id: CampaignId) -> ReportSubmission {
        ReportSubmission {
            campaign_id,
            center_id: CenterId::new(self.center_id),
            submitted_by: self.submitted_by.into_iter().map(StaffId::new).collect(),
            original_file_name: self.original_file_name,
            file_ref: self.file_ref,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentParams {
    pub window: Option<String>,
}

impl AppointmentParams {
    /// Defaults to the current week
    pub fn window(&self) -> Result<AppointmentWindow, ApiError> {
        match self.window.as_deref() {
            None => Ok(AppointmentWindow::SevenDays),
            Some(raw) => Ok(raw.parse()?),
        }
    }
}
