//! Campaign appointments and windowed listings

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{AppointmentId, CampaignId, DateWindow, Timezone, Vin};

use crate::error::WarrantyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub vin: Vin,
    pub campaign_id: CampaignId,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// The appointment created alongside a claim when its campaign is confirmed
    pub fn companion(vin: Vin, campaign_id: CampaignId, now: DateTime<Utc>) -> Self {
        Self {
            id: AppointmentId::new_v7(),
            vin,
            campaign_id,
            date: now,
            description: None,
            status: AppointmentStatus::Scheduled,
        }
    }
}

/// Display buckets for appointment listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentWindow {
    /// The ISO week containing today, Monday first
    #[serde(rename = "7d")]
    SevenDays,
    /// The calendar month containing today
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl AppointmentWindow {
    pub fn range(&self, today: NaiveDate) -> DateWindow {
        match self {
            AppointmentWindow::SevenDays => DateWindow::iso_week_of(today),
            AppointmentWindow::ThirtyDays => DateWindow::month_of(today),
        }
    }

    pub fn contains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.range(today).contains(date)
    }

    /// Keeps the appointments whose local date falls in the window
    pub fn filter<'a>(
        &self,
        appointments: impl IntoIterator<Item = &'a Appointment>,
        today: NaiveDate,
        timezone: Timezone,
    ) -> Vec<&'a Appointment> {
        let range = self.range(today);
        appointments
            .into_iter()
            .filter(|a| range.contains(timezone.local_date(a.date)))
            .collect()
    }
}

impl fmt::Display for AppointmentWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentWindow::SevenDays => f.write_str("7d"),
            AppointmentWindow::ThirtyDays => f.write_str("30d"),
        }
    }
}

impl FromStr for AppointmentWindow {
    type Err = WarrantyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "7d" | "7" => Ok(AppointmentWindow::SevenDays),
            "30d" | "30" => Ok(AppointmentWindow::ThirtyDays),
            other => Err(WarrantyError::validation(
                "window",
                format!("Unknown window {:?}; expected 7d or 30d", other),
            )),
        }
    }
}
