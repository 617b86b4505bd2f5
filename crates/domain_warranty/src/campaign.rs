//! Recall and service campaigns
//!
//! Dates are compared at day granularity. A campaign window is inclusive on
//! both ends and must span at least five days.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use core_kernel::CampaignId;

use crate::error::{FieldErrors, WarrantyError};

/// Minimum number of days between a campaign's start and due dates
pub const MIN_CAMPAIGN_DAYS: u64 = 5;

pub const START_IN_PAST: &str = "Start date cannot be in the past";
pub const DUE_TOO_SOON: &str = "Due date must be at least five days after Start date";

/// Campaign status relative to a given day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CampaignStatus {
    #[serde(rename = "not yet")]
    NotYet,
    #[serde(rename = "on going")]
    OnGoing,
    #[serde(rename = "completed")]
    Completed,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::NotYet => "not yet",
            CampaignStatus::OnGoing => "on going",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub models: BTreeSet<String>,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Campaign {
    pub fn status_on(&self, today: NaiveDate) -> CampaignStatus {
        if today < self.start_date {
            CampaignStatus::NotYet
        } else if today > self.end_date {
            CampaignStatus::Completed
        } else {
            CampaignStatus::OnGoing
        }
    }

    /// A vehicle is affected when its model is listed by the campaign
    pub fn affects(&self, model: &str) -> bool {
        self.models.contains(model)
    }
}

/// Campaign create/edit form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub name: String,
    pub models: Vec<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl CampaignDraft {
    /// Validates against `today`
    ///
    /// A due date that is too close to the start date is cleared from the
    /// draft, never moved.
    pub fn validate(&mut self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        if self.models.iter().all(|m| m.trim().is_empty()) {
            errors.add("models", "At least one vehicle model is required");
        }

        match self.start_date {
            None => errors.add("start_date", "Start date is required"),
            Some(start) if start < today => errors.add("start_date", START_IN_PAST),
            Some(_) => {}
        }

        match (self.start_date, self.end_date) {
            (_, None) => errors.add("end_date", "Due date is required"),
            (Some(start), Some(end)) => {
                let earliest = start.checked_add_days(Days::new(MIN_CAMPAIGN_DAYS));
                if earliest.map_or(true, |earliest| end < earliest) {
                    errors.add("end_date", DUE_TOO_SOON);
                    self.end_date = None;
                }
            }
            (None, Some(_)) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validates and builds the campaign under `id`
    pub fn into_campaign(
        mut self,
        id: CampaignId,
        today: NaiveDate,
    ) -> Result<Campaign, WarrantyError> {
        self.validate(today).map_err(WarrantyError::Validation)?;
        let (Some(start_date), Some(end_date)) = (self.start_date, self.end_date) else {
            return Err(WarrantyError::validation("start_date", "Start date is required"));
        };
        Ok(Campaign {
            id,
            name: self.name.trim().to_string(),
            models: self
                .models
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            description: self.description.filter(|d| !d.trim().is_empty()),
            start_date,
            end_date,
        })
    }
}

/// Campaigns affecting a vehicle model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "campaigns", rename_all = "snake_case")]
pub enum CampaignMatch {
    None,
    Single(Campaign),
    /// Ordered by ascending campaign id
    Multiple(Vec<Campaign>),
}

impl CampaignMatch {
    /// The campaign pre-selected for confirmation: the lowest id
    pub fn preselected(&self) -> Option<&Campaign> {
        match self {
            CampaignMatch::None => None,
            CampaignMatch::Single(campaign) => Some(campaign),
            CampaignMatch::Multiple(campaigns) => campaigns.first(),
        }
    }

    pub fn candidates(&self) -> &[Campaign] {
        match self {
            CampaignMatch::None => &[],
            CampaignMatch::Single(campaign) => std::slice::from_ref(campaign),
            CampaignMatch::Multiple(campaigns) => campaigns,
        }
    }

    /// Resolves the campaign a caller confirmed
    ///
    /// A single match may be confirmed without naming it. With several
    /// matches the caller must name one of them.
    pub fn resolve(&self, choice: Option<CampaignId>) -> Result<&Campaign, WarrantyError> {
        match (self, choice) {
            (CampaignMatch::None, _) => Err(WarrantyError::validation(
                "campaign_id",
                "No campaign affects this vehicle",
            )),
            (CampaignMatch::Single(campaign), None) => Ok(campaign),
            (CampaignMatch::Multiple(_), None) => Err(WarrantyError::validation(
                "campaign_id",
                "Several campaigns affect this vehicle; choose one",
            )),
            (_, Some(id)) => self
                .candidates()
                .iter()
                .find(|c| c.id == id)
                .ok_or_else(|| {
                    WarrantyError::validation(
                        "campaign_id",
                        format!("Campaign {} does not affect this vehicle", id),
                    )
                }),
        }
    }
}

/// Matches a vehicle model against every campaign listing it
///
/// Campaign dates play no part; callers that care show `status_on` per candidate.
pub fn match_campaigns(model: &str, campaigns: &[Campaign]) -> CampaignMatch {
    let mut matching: Vec<Campaign> = campaigns
        .iter()
        .filter(|c| c.affects(model))
        .cloned()
        .collect();
    matching.sort_by_key(|c| c.id);

    match matching.len() {
        0 => CampaignMatch::None,
        1 => matching
            .pop()
            .map_or(CampaignMatch::None, CampaignMatch::Single),
        _ => CampaignMatch::Multiple(matching),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(start: NaiveDate, end: NaiveDate) -> CampaignDraft {
        CampaignDraft {
            name: "Battery recall".to_string(),
            models: vec!["VF8".to_string()],
            description: None,
            start_date: Some(start),
            end_date: Some(end),
        }
    }

    fn campaign(id: u64, models: &[&str], start: NaiveDate, end: NaiveDate) -> Campaign {
        Campaign {
            id: CampaignId::new(id),
            name: format!("Campaign {}", id),
            models: models.iter().map(|m| m.to_string()).collect(),
            description: None,
            start_date: start,
            end_date: end,
        }
    }

    #[test]
    fn test_due_date_too_soon_is_cleared() {
        let mut d = draft(date(2025, 10, 1), date(2025, 10, 3));
        let errors = d.validate(date(2025, 10, 1)).unwrap_err();
        assert_eq!(errors.get("end_date"), Some(&[DUE_TOO_SOON.to_string()][..]));
        assert_eq!(d.end_date, None);
    }

    #[test]
    fn test_exactly_five_days_is_valid() {
        let mut d = draft(date(2025, 10, 1), date(2025, 10, 6));
        assert!(d.validate(date(2025, 10, 1)).is_ok());
        assert_eq!(d.end_date, Some(date(2025, 10, 6)));
    }

    #[test]
    fn test_start_in_past_rejected() {
        let mut d = draft(date(2025, 9, 30), date(2025, 10, 10));
        let errors = d.validate(date(2025, 10, 1)).unwrap_err();
        assert_eq!(errors.get("start_date"), Some(&[START_IN_PAST.to_string()][..]));
        assert_eq!(d.end_date, Some(date(2025, 10, 10)));
    }

    #[test]
    fn test_all_missing_fields_reported_together() {
        let mut d = CampaignDraft::default();
        let errors = d.validate(date(2025, 10, 1)).unwrap_err();
        for field in ["name", "models", "start_date", "end_date"] {
            assert!(errors.contains(field), "missing {}", field);
        }
    }

    #[test]
    fn test_status_strings() {
        let c = campaign(1, &["VF8"], date(2025, 10, 1), date(2025, 10, 6));
        assert_eq!(c.status_on(date(2025, 9, 30)).as_str(), "not yet");
        assert_eq!(c.status_on(date(2025, 10, 6)).as_str(), "on going");
        assert_eq!(c.status_on(date(2025, 10, 7)).as_str(), "completed");
        assert_eq!(serde_json::to_string(&CampaignStatus::OnGoing).unwrap(), "\"on going\"");
    }

    #[test]
    fn test_single_match_is_preselected() {
        let campaigns = vec![
            campaign(1, &["VF8"], date(2025, 10, 1), date(2025, 10, 20)),
            campaign(2, &["VF9"], date(2025, 10, 1), date(2025, 10, 20)),
        ];
        let found = match_campaigns("VF8", &campaigns);
        assert_eq!(found.preselected().map(|c| c.id), Some(CampaignId::new(1)));
        assert!(found.resolve(None).is_ok());
    }

    #[test]
    fn test_multiple_matches_sorted_and_require_choice() {
        let campaigns = vec![
            campaign(9, &["VF8"], date(2025, 10, 1), date(2025, 10, 20)),
            campaign(3, &["VF8", "VF9"], date(2025, 10, 1), date(2025, 10, 20)),
        ];
        let found = match_campaigns("VF8", &campaigns);
        let ids: Vec<_> = found.candidates().iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![3, 9]);
        assert_eq!(found.preselected().map(|c| c.id.get()), Some(3));
        assert!(found.resolve(None).is_err());
        assert_eq!(found.resolve(Some(CampaignId::new(9))).unwrap().id.get(), 9);
        assert!(found.resolve(Some(CampaignId::new(4))).is_err());
    }

    #[test]
    fn test_future_campaign_still_matches_by_model() {
        let future = campaign(4, &["VF8"], date(2025, 11, 1), date(2025, 11, 30));
        let found = match_campaigns("VF8", std::slice::from_ref(&future));

        assert_eq!(found, CampaignMatch::Single(future.clone()));
        assert_eq!(future.status_on(date(2025, 10, 10)), CampaignStatus::NotYet);
    }

    #[test]
    fn test_other_models_do_not_match() {
        let campaigns = vec![
            campaign(1, &["VF9"], date(2025, 10, 1), date(2025, 10, 20)),
            campaign(2, &["VF5"], date(2025, 9, 1), date(2025, 9, 6)),
        ];
        assert_eq!(match_campaigns("VF8", &campaigns), CampaignMatch::None);
    }

    #[test]
    fn test_into_campaign_trims_models() {
        let mut d = draft(date(2025, 10, 1), date(2025, 10, 6));
        d.models = vec![" VF8 ".to_string(), "".to_string()];
        let c = d.into_campaign(CampaignId::new(1), date(2025, 10, 1)).unwrap();
        assert!(c.affects("VF8"));
        assert_eq!(c.models.len(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn due_date_rule_holds(offset_start in 0i64..30, span in -3i64..15) {
            let today = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
            let start = today + chrono::Duration::days(offset_start);
            let end = start + chrono::Duration::days(span);
            let mut d = CampaignDraft {
                name: "n".into(),
                models: vec!["m".into()],
                description: None,
                start_date: Some(start),
                end_date: Some(end),
            };
            let result = d.validate(today);
            prop_assert_eq!(result.is_ok(), span >= 5);
            prop_assert_eq!(d.end_date.is_none(), span < 5);
        }
    }
}
