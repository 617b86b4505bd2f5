//! Claim aggregate and its status machine

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CampaignId, CenterId, CommentId, StaffId, Vin};

use crate::error::WarrantyError;
use crate::identity::ClaimIdentity;

/// Claim status
///
/// ```text
/// CHECK -> REPAIR -> DECIDE -> HANDOVER
///                          \-> DONE
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClaimStatus {
    /// Technician inspection
    Check,
    /// Parts flagged for repair
    Repair,
    /// Awaiting per-part approve/reject decisions
    Decide,
    /// Decided with nothing approved; handed over outside this workflow
    Handover,
    /// Closed
    Done,
}

impl ClaimStatus {
    pub const ALL: [ClaimStatus; 5] = [
        ClaimStatus::Check,
        ClaimStatus::Repair,
        ClaimStatus::Decide,
        ClaimStatus::Handover,
        ClaimStatus::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Check => "CHECK",
            ClaimStatus::Repair => "REPAIR",
            ClaimStatus::Decide => "DECIDE",
            ClaimStatus::Handover => "HANDOVER",
            ClaimStatus::Done => "DONE",
        }
    }

    /// Checks if `target` is a valid next status
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (*self, target),
            (Check, Repair) | (Repair, Decide) | (Decide, Handover) | (Decide, Done)
        )
    }

    /// True once the decision pass has run
    pub fn is_finalized(&self) -> bool {
        matches!(self, ClaimStatus::Handover | ClaimStatus::Done)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = WarrantyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                WarrantyError::validation("status", format!("Unknown claim status: {}", s))
            })
    }
}

/// One stamped status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub status: ClaimStatus,
    pub at: DateTime<Utc>,
}

/// Input for opening a claim
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub vin: Vin,
    pub created_by: StaffId,
    pub assigned_technician: Option<StaffId>,
    pub description: String,
}

/// A warranty claim against a vehicle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimIdentity,
    pub vin: Vin,
    pub created_by: StaffId,
    pub assigned_technician: Option<StaffId>,
    pub status: ClaimStatus,
    pub claim_date: NaiveDate,
    pub description: String,
    pub campaign_ids: BTreeSet<CampaignId>,
    pub timeline: Vec<TimelineEntry>,
}

impl Claim {
    /// Opens a claim in CHECK; the claim date is the date carried by the id
    pub fn open(id: ClaimIdentity, request: NewClaim, now: DateTime<Utc>) -> Self {
        Self {
            id,
            vin: request.vin,
            created_by: request.created_by,
            assigned_technician: request.assigned_technician,
            status: ClaimStatus::Check,
            claim_date: id.date(),
            description: request.description,
            campaign_ids: BTreeSet::new(),
            timeline: vec![TimelineEntry {
                status: ClaimStatus::Check,
                at: now,
            }],
        }
    }

    pub fn center_id(&self) -> CenterId {
        self.id.center_id()
    }

    /// Computes the entry a transition to `to` would append, without applying it
    ///
    /// The stamp never precedes the last entry, even if the clock moved back.
    pub fn next_entry(
        &self,
        to: ClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<TimelineEntry, WarrantyError> {
        if !self.status.can_transition_to(to) {
            return Err(WarrantyError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        let at = match self.timeline.last() {
            Some(last) if last.at > now => last.at,
            _ => now,
        };
        Ok(TimelineEntry { status: to, at })
    }

    /// Appends an entry produced by [`Claim::next_entry`]
    pub fn apply_entry(&mut self, entry: TimelineEntry) -> Result<(), WarrantyError> {
        if !self.status.can_transition_to(entry.status) {
            return Err(WarrantyError::InvalidTransition {
                from: self.status,
                to: entry.status,
            });
        }
        self.status = entry.status;
        self.timeline.push(entry);
        Ok(())
    }

    /// Transitions to `to`, stamping the timeline
    pub fn transition(
        &mut self,
        to: ClaimStatus,
        now: DateTime<Utc>,
    ) -> Result<TimelineEntry, WarrantyError> {
        let entry = self.next_entry(to, now)?;
        self.apply_entry(entry)?;
        Ok(entry)
    }

    /// Status equals the last entry, stamps never decrease, and every step is a valid edge
    pub fn is_timeline_consistent(&self) -> bool {
        let Some(first) = self.timeline.first() else {
            return false;
        };
        first.status == ClaimStatus::Check
            && self.timeline.last().map(|e| e.status) == Some(self.status)
            && self.timeline.windows(2).all(|pair| {
                pair[0].at <= pair[1].at && pair[0].status.can_transition_to(pair[1].status)
            })
    }
}

/// Free-text note attached to a claim; append-only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimComment {
    pub id: CommentId,
    pub claim_id: ClaimIdentity,
    pub author_id: StaffId,
    pub body: String,
    pub posted_at: DateTime<Utc>,
}

impl ClaimComment {
    pub fn new(
        claim_id: ClaimIdentity,
        author_id: StaffId,
        body: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: CommentId::new_v7(),
            claim_id,
            author_id,
            body: body.into(),
            posted_at: now,
        }
    }
}

/// Filters for listing claims
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimQuery {
    pub center_id: Option<CenterId>,
    pub status: Option<ClaimStatus>,
    pub vin: Option<Vin>,
}

impl ClaimQuery {
    pub fn by_center(center_id: CenterId) -> Self {
        Self {
            center_id: Some(center_id),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, claim: &Claim) -> bool {
        self.center_id.map_or(true, |c| claim.center_id() == c)
            && self.status.map_or(true, |s| claim.status == s)
            && self.vin.as_ref().map_or(true, |v| &claim.vin == v)
    }
}
