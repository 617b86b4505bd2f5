//! Campaign report submission
//!
//! Each service center files at most one report per campaign, and only after
//! the campaign has completed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CampaignId, CenterId, ReportId, StaffId};

use crate::campaign::{Campaign, CampaignStatus};
use crate::error::{FieldErrors, WarrantyError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReport {
    pub id: ReportId,
    pub campaign_id: CampaignId,
    pub center_id: CenterId,
    pub submitted_by: Vec<StaffId>,
    pub original_file_name: String,
    /// Opaque reference to the uploaded attachment
    pub file_ref: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub campaign_id: CampaignId,
    pub center_id: CenterId,
    pub submitted_by: Vec<StaffId>,
    pub original_file_name: String,
    pub file_ref: String,
}

impl ReportSubmission {
    pub fn validate(&self) -> Result<(), WarrantyError> {
        let mut errors = FieldErrors::new();
        if self.submitted_by.is_empty() {
            errors.add("submitted_by", "At least one submitter is required");
        }
        if self.original_file_name.trim().is_empty() {
            errors.add("original_file_name", "File name is required");
        }
        if self.file_ref.trim().is_empty() {
            errors.add("file_ref", "Attachment is required");
        }
        errors.into_result()
    }

    pub fn into_report(self, submitted_at: DateTime<Utc>) -> CampaignReport {
        CampaignReport {
            id: ReportId::new_v7(),
            campaign_id: self.campaign_id,
            center_id: self.center_id,
            submitted_by: self.submitted_by,
            original_file_name: self.original_file_name,
            file_ref: self.file_ref,
            submitted_at,
        }
    }
}

/// Gate for report submission
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportSubmissionTracker;

impl ReportSubmissionTracker {
    /// Checks that `campaign` has completed and that no report exists yet
    pub fn check(
        campaign: &Campaign,
        existing: Option<&CampaignReport>,
        today: NaiveDate,
    ) -> Result<(), WarrantyError> {
        let status = campaign.status_on(today);
        if status != CampaignStatus::Completed {
            return Err(WarrantyError::precondition(format!(
                "Campaign {} is {}; reports open once it is completed",
                campaign.id, status
            )));
        }
        if let Some(report) = existing {
            return Err(WarrantyError::precondition(format!(
                "Report already submitted for campaign {} by center {}",
                report.campaign_id, report.center_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn campaign() -> Campaign {
        Campaign {
            id: CampaignId::new(4),
            name: "Brake check".to_string(),
            models: ["VF8".to_string()].into_iter().collect(),
            description: None,
            start_date: date(2025, 9, 1),
            end_date: date(2025, 9, 10),
        }
    }

    fn submission() -> ReportSubmission {
        ReportSubmission {
            campaign_id: CampaignId::new(4),
            center_id: CenterId::new(5),
            submitted_by: vec![StaffId::new(1)],
            original_file_name: "report.pdf".to_string(),
            file_ref: "s3://reports/abc".to_string(),
        }
    }

    #[test]
    fn test_completed_campaign_accepts_first_report() {
        assert!(ReportSubmissionTracker::check(&campaign(), None, date(2025, 9, 11)).is_ok());
    }

    #[test]
    fn test_ongoing_campaign_rejected() {
        let err = ReportSubmissionTracker::check(&campaign(), None, date(2025, 9, 10)).unwrap_err();
        assert!(matches!(err, WarrantyError::PreconditionFailed(ref m) if m.contains("on going")));
    }

    #[test]
    fn test_second_report_rejected() {
        let existing =
            submission().into_report(Utc.with_ymd_and_hms(2025, 9, 12, 0, 0, 0).unwrap());
        let err = ReportSubmissionTracker::check(&campaign(), Some(&existing), date(2025, 9, 13))
            .unwrap_err();
        assert!(matches!(
            err,
            WarrantyError::PreconditionFailed(ref m) if m.contains("already submitted")
        ));
    }

    #[test]
    fn test_submission_requires_attachment() {
        let mut s = submission();
        s.file_ref = " ".to_string();
        assert!(
            matches!(s.validate(), Err(WarrantyError::Validation(ref f)) if f.contains("file_ref"))
        );
    }
}
