//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use core_kernel::{CampaignId, CenterId, PartId, PartNumber, StaffId, Vin};
use domain_warranty::{CampaignDraft, Claim, ClaimIdentity, ClaimStatus, NewClaim, PartCheck};

use crate::fixtures::{TemporalFixtures, VehicleFixtures, CENTER, CREATOR, TECHNICIAN};

/// Builder for claims already walked to a given status
///
/// Each transition is stamped one hour after the previous one, so the
/// timeline is always consistent.
pub struct ClaimBuilder {
    center_id: CenterId,
    date: NaiveDate,
    seq: u32,
    vin: Vin,
    description: String,
    opened_at: DateTime<Utc>,
    status: ClaimStatus,
    campaigns: Vec<CampaignId>,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            center_id: CENTER,
            date: TemporalFixtures::today(),
            seq: 1,
            vin: VehicleFixtures::vf5(),
            description: "Brake noise at low speed".to_string(),
            opened_at: TemporalFixtures::now(),
            status: ClaimStatus::Check,
            campaigns: Vec::new(),
        }
    }

    pub fn center(mut self, center_id: u32) -> Self {
        self.center_id = CenterId::new(center_id);
        self
    }

    pub fn seq(mut self, seq: u32) -> Self {
        self.seq = seq;
        self
    }

    pub fn vin(mut self, vin: Vin) -> Self {
        self.vin = vin;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Walks the claim along the only path that reaches `status`
    pub fn status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    pub fn campaign(mut self, id: u64) -> Self {
        self.campaigns.push(CampaignId::new(id));
        self
    }

    pub fn id(&self) -> ClaimIdentity {
        ClaimIdentity::new(self.center_id, self.date, self.seq).unwrap()
    }

    pub fn build(self) -> Claim {
        let id = self.id();
        let mut claim = Claim::open(
            id,
            NewClaim {
                vin: self.vin,
                created_by: CREATOR,
                assigned_technician: Some(TECHNICIAN),
                description: self.description,
            },
            self.opened_at,
        );
        claim.campaign_ids.extend(self.campaigns);

        let path: &[ClaimStatus] = match self.status {
            ClaimStatus::Check => &[],
            ClaimStatus::Repair => &[ClaimStatus::Repair],
            ClaimStatus::Decide => &[ClaimStatus::Repair, ClaimStatus::Decide],
            ClaimStatus::Handover => {
                &[ClaimStatus::Repair, ClaimStatus::Decide, ClaimStatus::Handover]
            }
            ClaimStatus::Done => &[ClaimStatus::Repair, ClaimStatus::Decide, ClaimStatus::Done],
        };
        let mut at = self.opened_at;
        for status in path {
            at += Duration::hours(1);
            claim.transition(*status, at).unwrap();
        }
        claim
    }
}

/// Builder for stored part checks
pub struct PartCheckBuilder {
    claim_id: ClaimIdentity,
    part_number: PartNumber,
    part_id: PartId,
    quantity: u32,
    is_repair: bool,
    approved: bool,
    rejected: bool,
}

impl PartCheckBuilder {
    pub fn new(claim_id: ClaimIdentity, part_number: &str) -> Self {
        Self {
            claim_id,
            part_number: PartNumber::new(part_number),
            part_id: PartId::new(1),
            quantity: 1,
            is_repair: true,
            approved: false,
            rejected: false,
        }
    }

    pub fn part_id(mut self, id: u64) -> Self {
        self.part_id = PartId::new(id);
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn not_repair(mut self) -> Self {
        self.is_repair = false;
        self
    }

    pub fn approved(mut self) -> Self {
        self.approved = true;
        self.rejected = false;
        self
    }

    pub fn rejected(mut self) -> Self {
        self.rejected = true;
        self.approved = false;
        self
    }

    pub fn build(self) -> PartCheck {
        PartCheck {
            claim_id: self.claim_id,
            part_number: self.part_number,
            part_id: self.part_id,
            quantity: self.quantity,
            is_repair: self.is_repair,
            approved: self.approved,
            rejected: self.rejected,
        }
    }
}

/// Builder for campaign drafts; defaults to a valid draft starting tomorrow
pub struct CampaignDraftBuilder {
    draft: CampaignDraft,
}

impl Default for CampaignDraftBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CampaignDraftBuilder {
    pub fn new() -> Self {
        let start = TemporalFixtures::today() + Duration::days(1);
        Self {
            draft: CampaignDraft {
                name: "Battery inspection".to_string(),
                models: vec!["VF8".to_string()],
                description: Some("Inspect battery coolant lines".to_string()),
                start_date: Some(start),
                end_date: Some(start + Duration::days(30)),
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.draft.name = name.into();
        self
    }

    pub fn models(mut self, models: &[&str]) -> Self {
        self.draft.models = models.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn window(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.draft.start_date = Some(start);
        self.draft.end_date = Some(end);
        self
    }

    /// Ends `days` after the start date
    pub fn lasting(mut self, days: i64) -> Self {
        self.draft.end_date = self.draft.start_date.map(|start| start + Duration::days(days));
        self
    }

    pub fn build(self) -> CampaignDraft {
        self.draft
    }
}

/// Staff ids in the order given
pub fn staff(ids: &[u64]) -> Vec<StaffId> {
    ids.iter().copied().map(StaffId::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_builder_walks_timeline() {
        let claim = ClaimBuilder::new().seq(3).status(ClaimStatus::Done).build();

        assert_eq!(claim.id.to_string(), "WC-5-2025-10-10-003");
        assert_eq!(claim.status, ClaimStatus::Done);
        assert_eq!(claim.timeline.len(), 4);
        assert!(claim.is_timeline_consistent());
    }

    #[test]
    fn test_part_check_flags_are_exclusive() {
        let id = ClaimBuilder::new().id();
        let check = PartCheckBuilder::new(id, "A").approved().rejected().build();
        assert!(check.rejected);
        assert!(!check.approved);
    }

    #[test]
    fn test_default_draft_is_valid() {
        let mut draft = CampaignDraftBuilder::new().build();
        assert!(draft.validate(TemporalFixtures::today()).is_ok());
    }

    #[test]
    fn test_short_draft_is_invalid() {
        let mut draft = CampaignDraftBuilder::new().lasting(4).build();
        assert!(draft.validate(TemporalFixtures::today()).is_err());
    }
}
