//! Warranty workflow service
//!
//! [`WarrantyWorkflow`] is the single entry point for every claim action. It
//! owns no state of its own beyond a per-claim lock table: all records live
//! behind the ports in [`crate::ports`].
//!
//! Mutating claim operations take the claim's lock for their whole duration,
//! and every status change is a compare-and-set against the status the
//! operation read. Collaborator calls run under the configured step timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, info, instrument, warn};

use core_kernel::{
    CampaignId, CenterId, Clock, Currency, HealthCheckResult, Money, OperationMetadata, PartNumber,
    PortError, StaffId, Timezone, Vin,
};

use crate::appointment::{Appointment, AppointmentWindow};
use crate::campaign::{match_campaigns, Campaign, CampaignDraft, CampaignMatch, CampaignStatus};
use crate::claim::{Claim, ClaimComment, ClaimQuery, ClaimStatus, NewClaim};
use crate::error::{FieldErrors, WarrantyError};
use crate::identity::ClaimIdentity;
use crate::inventory::{InventoryReconciler, PartsCatalog, ReconciliationPlan};
use crate::ledger::{LedgerCommand, PartApprovalLedger};
use crate::part_check::{validate_checks, NewPartCheck, PartCheck, PartCheckUpdate};
use crate::ports::WarrantyPorts;
use crate::report::{CampaignReport, ReportSubmission, ReportSubmissionTracker};
use crate::saga::{bounded, FinalizeSaga};
use crate::vehicle::Vehicle;

/// Workflow settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowConfig {
    /// Deadline for each collaborator call
    pub step_timeout: Duration,
    /// Currency of catalog prices
    pub currency: Currency,
    /// Timezone that decides what "today" is
    pub timezone: Timezone,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(5),
            currency: Currency::VND,
            timezone: Timezone::default(),
        }
    }
}

/// Per-claim mutual exclusion
#[derive(Debug, Default)]
pub struct ClaimLocks {
    inner: Mutex<HashMap<ClaimIdentity, Arc<Mutex<()>>>>,
}

impl ClaimLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for the claim's lock; released when the guard drops
    pub async fn acquire(&self, id: ClaimIdentity) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.inner.lock().await;
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(id).or_default().clone()
        };
        lock.lock_owned().await
    }
}

/// Input for opening a claim
#[derive(Debug, Clone)]
pub struct CreateClaimRequest {
    pub center_id: CenterId,
    pub vin: Vin,
    pub created_by: StaffId,
    pub assigned_technician: Option<StaffId>,
    pub description: String,
    /// Link the matched campaign and book a companion appointment
    pub confirm_campaign: bool,
    /// Required when several campaigns match
    pub campaign_id: Option<CampaignId>,
}

impl CreateClaimRequest {
    fn validate(&self) -> Result<(), WarrantyError> {
        let mut errors = FieldErrors::new();
        if self.vin.is_blank() {
            errors.add("vin", "VIN is required");
        }
        if self.center_id.get() == 0 {
            errors.add("center_id", "Service center is required");
        }
        if !self.confirm_campaign && self.campaign_id.is_some() {
            errors.add("campaign_id", "A campaign can only be chosen when confirming it");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimCreated {
    pub claim: Claim,
    pub campaign_match: CampaignMatch,
    pub appointment: Option<Appointment>,
}

/// The ledger as a reviewer sees it
#[derive(Debug, Clone, Serialize)]
pub struct LedgerView {
    pub ledger: PartApprovalLedger,
    pub total_approved_cost: Money,
    pub fully_reviewed: bool,
    pub unreviewed: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct FinalizeRequest {
    /// Manufacturer staff member closing the decision
    pub evm_id: Option<StaffId>,
    pub description: String,
    pub commands: Vec<LedgerCommand>,
}

/// Which branch the decision pass took
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "snake_case")]
pub enum FinalizePath {
    /// At least one part approved; stock debited per the plan
    Reconciled { plan: ReconciliationPlan },
    /// Nothing approved; no stock touched
    DecisionHandover,
}

#[derive(Debug, Clone, Serialize)]
pub struct FinalizeReport {
    pub claim: Claim,
    #[serde(flatten)]
    pub path: FinalizePath,
    pub total_approved_cost: Money,
    pub released: Vec<PartNumber>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FinalizeOutcome {
    /// The claim had already left DECIDE; nothing was done
    AlreadyFinalized { claim: Claim },
    Completed(FinalizeReport),
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub status: CampaignStatus,
}

/// Orchestrates the claim lifecycle over the warranty ports
pub struct WarrantyWorkflow {
    ports: WarrantyPorts,
    clock: Arc<dyn Clock>,
    config: WorkflowConfig,
    locks: ClaimLocks,
}

impl WarrantyWorkflow {
    pub fn new(ports: WarrantyPorts, clock: Arc<dyn Clock>, config: WorkflowConfig) -> Self {
        Self {
            ports,
            clock,
            config,
            locks: ClaimLocks::new(),
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// The service's current day in its configured timezone
    pub fn today(&self) -> NaiveDate {
        self.config.timezone.local_date(self.clock.now())
    }

    async fn step<T, F>(&self, operation: &'static str, future: F) -> Result<T, WarrantyError>
    where
        F: std::future::Future<Output = Result<T, PortError>>,
    {
        Ok(bounded(operation, self.config.step_timeout, future).await?)
    }

    /// Compare-and-set transition from the status `claim` was read in
    async fn advance(
        &self,
        claim: &Claim,
        to: ClaimStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, WarrantyError> {
        let entry = claim.next_entry(to, self.clock.now())?;
        let result = bounded(
            "transition_claim",
            self.config.step_timeout,
            self.ports.claims.transition_claim(claim.id, claim.status, entry, metadata),
        )
        .await;

        match result {
            Ok(updated) => {
                info!(claim_id = %claim.id, from = %claim.status, to = %to, "Claim transitioned");
                Ok(updated)
            }
            Err(PortError::Conflict { message }) => Err(WarrantyError::precondition(message)),
            Err(other) => Err(other.into()),
        }
    }

    // ------------------------------------------------------------------
    // Claim creation
    // ------------------------------------------------------------------

    /// Opens a claim in CHECK
    ///
    /// When the caller confirms a matched campaign, the claim is linked to it
    /// and a companion appointment dated now is booked. The campaign choice is
    /// resolved before anything is written.
    #[instrument(
        skip(self, request, metadata),
        fields(center_id = %request.center_id, vin = %request.vin)
    )]
    pub async fn create_claim(
        &self,
        request: CreateClaimRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<ClaimCreated, WarrantyError> {
        request.validate()?;

        let vehicle = self
            .step("get_vehicle", self.ports.vehicles.get_vehicle(&request.vin))
            .await?;
        let campaigns = self.step("list_campaigns", self.ports.campaigns.list_campaigns()).await?;
        let today = self.today();
        let campaign_match = match_campaigns(&vehicle.model, &campaigns);

        let confirmed = if request.confirm_campaign {
            Some(campaign_match.resolve(request.campaign_id)?.id)
        } else {
            None
        };

        let id = self.allocate_claim_id(request.center_id, today).await;
        let now = self.clock.now();
        let claim = Claim::open(
            id,
            NewClaim {
                vin: request.vin.clone(),
                created_by: request.created_by,
                assigned_technician: request.assigned_technician,
                description: request.description,
            },
            now,
        );

        match bounded(
            "create_claim",
            self.config.step_timeout,
            self.ports.claims.create_claim(&claim, metadata.clone()),
        )
        .await
        {
            Ok(()) => {}
            Err(PortError::Conflict { message }) => {
                return Err(WarrantyError::precondition(format!(
                    "Claim id {} is already taken; retry the request ({})",
                    id, message
                )))
            }
            Err(other) => return Err(other.into()),
        }
        info!(claim_id = %id, "Claim created");

        let mut claim = claim;
        let appointment = match confirmed {
            None => None,
            Some(campaign_id) => {
                self.step(
                    "add_campaign",
                    self.ports.claims.add_campaign(id, campaign_id, metadata.clone()),
                )
                .await?;
                claim.campaign_ids.insert(campaign_id);

                let appointment = Appointment::companion(request.vin, campaign_id, now);
                if let Err(e) = self
                    .step(
                        "create_appointment",
                        self.ports.appointments.create_appointment(&appointment, metadata),
                    )
                    .await
                {
                    error!(
                        claim_id = %id,
                        campaign_id = %campaign_id,
                        error = %e,
                        "Companion appointment failed"
                    );
                    return Err(e);
                }
                info!(
                    claim_id = %id,
                    campaign_id = %campaign_id,
                    appointment_id = %appointment.id,
                    "Companion appointment booked"
                );
                Some(appointment)
            }
        };

        Ok(ClaimCreated {
            claim,
            campaign_match,
            appointment,
        })
    }

    /// Next id for a (center, day); falls back to sequence 001 if the counter is unreachable
    async fn allocate_claim_id(&self, center_id: CenterId, date: NaiveDate) -> ClaimIdentity {
        let allocated = self
            .step(
                "next_claim_sequence",
                self.ports.claims.next_claim_sequence(center_id, date),
            )
            .await
            .and_then(|seq| ClaimIdentity::new(center_id, date, seq));

        match allocated {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    center_id = %center_id,
                    %date,
                    error = %e,
                    "Claim sequence unavailable; falling back to 001"
                );
                ClaimIdentity::first_of_day(center_id, date)
            }
        }
    }

    /// Campaigns affecting a vehicle's model
    #[instrument(skip(self), fields(vin = %vin))]
    pub async fn campaign_match_for_vehicle(
        &self,
        vin: &Vin,
    ) -> Result<CampaignMatch, WarrantyError> {
        let (vehicle, campaigns) = tokio::try_join!(
            bounded("get_vehicle", self.config.step_timeout, self.ports.vehicles.get_vehicle(vin)),
            bounded(
                "list_campaigns",
                self.config.step_timeout,
                self.ports.campaigns.list_campaigns()
            ),
        )?;
        Ok(match_campaigns(&vehicle.model, &campaigns))
    }

    // ------------------------------------------------------------------
    // Inspection and repair
    // ------------------------------------------------------------------

    /// Records the technician's part checks on a claim still in CHECK
    #[instrument(skip(self, checks, metadata), fields(claim_id = %id, count = checks.len()))]
    pub async fn record_part_checks(
        &self,
        id: ClaimIdentity,
        checks: Vec<NewPartCheck>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<PartCheck>, WarrantyError> {
        let _guard = self.locks.acquire(id).await;
        self.record_checks_locked(id, checks, metadata).await
    }

    async fn record_checks_locked(
        &self,
        id: ClaimIdentity,
        checks: Vec<NewPartCheck>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Vec<PartCheck>, WarrantyError> {
        let claim = self.step("get_claim", self.ports.claims.get_claim(id)).await?;
        if claim.status != ClaimStatus::Check {
            return Err(WarrantyError::precondition(format!(
                "Part checks can only be recorded while the claim is in CHECK (claim {} is in {})",
                id, claim.status
            )));
        }
        validate_checks(&checks).into_result()?;

        let records: Vec<PartCheck> = checks.into_iter().map(|c| c.into_check(id)).collect();
        match bounded(
            "record_part_checks",
            self.config.step_timeout,
            self.ports.part_checks.record_part_checks(&records, metadata),
        )
        .await
        {
            Ok(()) => Ok(records),
            Err(PortError::Conflict { message }) => Err(WarrantyError::precondition(message)),
            Err(other) => Err(other.into()),
        }
    }

    /// Moves a claim from CHECK to REPAIR
    ///
    /// At least one recorded part check must be flagged for repair.
    #[instrument(skip(self, metadata), fields(claim_id = %id))]
    pub async fn start_repair(
        &self,
        id: ClaimIdentity,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, WarrantyError> {
        let _guard = self.locks.acquire(id).await;
        self.start_repair_locked(id, metadata).await
    }

    async fn start_repair_locked(
        &self,
        id: ClaimIdentity,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, WarrantyError> {
        let (claim, checks) = tokio::try_join!(
            bounded("get_claim", self.config.step_timeout, self.ports.claims.get_claim(id)),
            bounded(
                "search_by_claim",
                self.config.step_timeout,
                self.ports.part_checks.search_by_claim(id)
            ),
        )?;
        if claim.status != ClaimStatus::Check {
            return Err(WarrantyError::InvalidTransition {
                from: claim.status,
                to: ClaimStatus::Repair,
            });
        }
        if !checks.iter().any(|c| c.is_repair) {
            return Err(WarrantyError::precondition(format!(
                "Claim {} has no part flagged for repair",
                id
            )));
        }
        self.advance(&claim, ClaimStatus::Repair, metadata).await
    }

    /// Records part checks and, if any part needs repair, moves the claim to REPAIR
    #[instrument(skip(self, checks, metadata), fields(claim_id = %id))]
    pub async fn record_technician_check(
        &self,
        id: ClaimIdentity,
        checks: Vec<NewPartCheck>,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, WarrantyError> {
        let _guard = self.locks.acquire(id).await;
        self.record_checks_locked(id, checks, metadata.clone()).await?;
        self.start_repair_locked(id, metadata).await
    }

    /// Moves a claim from REPAIR to DECIDE
    #[instrument(skip(self, metadata), fields(claim_id = %id))]
    pub async fn request_decision(
        &self,
        id: ClaimIdentity,
        metadata: Option<OperationMetadata>,
    ) -> Result<Claim, WarrantyError> {
        let _guard = self.locks.acquire(id).await;
        let claim = self.step("get_claim", self.ports.claims.get_claim(id)).await?;
        self.advance(&claim, ClaimStatus::Decide, metadata).await
    }

    // ------------------------------------------------------------------
    // Decision
    // ------------------------------------------------------------------

    /// Builds the claim's ledger, applies `commands` to a copy, and prices it
    ///
    /// Nothing is written; reviewers use this to preview a decision.
    #[instrument(skip(self, commands), fields(claim_id = %id))]
    pub async fn ledger(
        &self,
        id: ClaimIdentity,
        commands: &[LedgerCommand],
    ) -> Result<LedgerView, WarrantyError> {
        let (checks, parts) = tokio::try_join!(
            bounded(
                "search_by_claim",
                self.config.step_timeout,
                self.ports.part_checks.search_by_claim(id)
            ),
            bounded("list_parts", self.config.step_timeout, self.ports.catalog.list_parts()),
        )?;
        let mut ledger = PartApprovalLedger::from_part_checks(id, &checks);
        ledger.apply_all(commands)?;
        let catalog = PartsCatalog::from_entries(parts, self.config.currency);

        Ok(LedgerView {
            total_approved_cost: ledger.total_approved_cost(&catalog)?,
            fully_reviewed: ledger.is_fully_reviewed(),
            unreviewed: ledger.unreviewed(),
            ledger,
        })
    }

    /// Runs the decision pass
    ///
    /// Releases rejected parts, then either debits approved parts (claim goes
    /// to DONE) or hands the decision over when nothing was approved (claim
    /// goes to HANDOVER). The closing comment is posted on both paths. Any
    /// failure undoes the completed steps before returning.
    ///
    /// Calling this on a claim that already left DECIDE is a no-op.
    #[instrument(skip(self, request, metadata), fields(claim_id = %id))]
    pub async fn finalize(
        &self,
        id: ClaimIdentity,
        request: FinalizeRequest,
        metadata: Option<OperationMetadata>,
    ) -> Result<FinalizeOutcome, WarrantyError> {
        let evm_id = request.evm_id.ok_or_else(|| {
            WarrantyError::precondition("An EVM staff id is required to finalize a claim")
        })?;

        let _guard = self.locks.acquire(id).await;

        let (claim, checks, parts) = tokio::try_join!(
            bounded("get_claim", self.config.step_timeout, self.ports.claims.get_claim(id)),
            bounded(
                "search_by_claim",
                self.config.step_timeout,
                self.ports.part_checks.search_by_claim(id)
            ),
            bounded("list_parts", self.config.step_timeout, self.ports.catalog.list_parts()),
        )?;

        if claim.status.is_finalized() {
            info!(claim_id = %id, status = %claim.status, "Claim already finalized");
            return Ok(FinalizeOutcome::AlreadyFinalized { claim });
        }
        if claim.status != ClaimStatus::Decide {
            return Err(WarrantyError::InvalidTransition {
                from: claim.status,
                to: ClaimStatus::Done,
            });
        }

        let mut ledger = PartApprovalLedger::from_part_checks(id, &checks);
        if ledger.is_empty() {
            return Err(WarrantyError::precondition(format!(
                "Claim {} has no part flagged for repair",
                id
            )));
        }
        ledger.apply_all(&request.commands)?;
        if !ledger.is_fully_reviewed() {
            let pending: Vec<String> = ledger.unreviewed().iter().map(usize::to_string).collect();
            return Err(WarrantyError::validation(
                "ledger",
                format!("Every part must be approved or rejected; pending: {}", pending.join(", ")),
            ));
        }

        let catalog = PartsCatalog::from_entries(parts, self.config.currency);
        let total_approved_cost = ledger.total_approved_cost(&catalog)?;

        let releases: Vec<PartCheckUpdate> = ledger
            .rejected_parts()
            .map(|entry| {
                PartCheckUpdate::release(
                    id,
                    &claim.vin,
                    &entry.part_number,
                    entry.part_id,
                    entry.quantity,
                )
            })
            .collect();
        let released: Vec<PartNumber> = releases.iter().map(|r| r.part_number.clone()).collect();
        let comment = ClaimComment::new(id, evm_id, request.description, self.clock.now());

        let mut saga = FinalizeSaga::new(&self.ports, id, self.config.step_timeout, metadata);
        let result = self
            .run_decision(&mut saga, &claim, &ledger, &catalog, releases, &comment)
            .await;

        match result {
            Ok((claim, path)) => Ok(FinalizeOutcome::Completed(FinalizeReport {
                claim,
                path,
                total_approved_cost,
                released,
            })),
            Err(cause) => Err(saga.rollback(cause).await),
        }
    }

    async fn run_decision(
        &self,
        saga: &mut FinalizeSaga<'_>,
        claim: &Claim,
        ledger: &PartApprovalLedger,
        catalog: &PartsCatalog,
        releases: Vec<PartCheckUpdate>,
        comment: &ClaimComment,
    ) -> Result<(Claim, FinalizePath), WarrantyError> {
        saga.release_rejected(releases).await?;

        let approved = ledger.approved_quantities();
        let (path, target) = if approved.is_empty() {
            info!(claim_id = %claim.id, "No parts approved; handing the decision over");
            (FinalizePath::DecisionHandover, ClaimStatus::Handover)
        } else {
            let plan = InventoryReconciler::plan(claim.id, &approved, catalog);
            saga.apply_debits(&plan).await?;
            info!(
                claim_id = %claim.id,
                debits = plan.debits.len(),
                skipped = plan.skipped.len(),
                "Approved parts reconciled"
            );
            (FinalizePath::Reconciled { plan }, ClaimStatus::Done)
        };

        saga.post_comment(comment).await?;

        let entry = claim.next_entry(target, self.clock.now())?;
        let updated = saga.transition(entry).await?;
        info!(claim_id = %claim.id, to = %target, "Claim finalized");
        Ok((updated, path))
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn get_claim(&self, id: ClaimIdentity) -> Result<Claim, WarrantyError> {
        self.step("get_claim", self.ports.claims.get_claim(id)).await
    }

    pub async fn list_claims(&self, query: ClaimQuery) -> Result<Vec<Claim>, WarrantyError> {
        self.step("list_claims", self.ports.claims.list_claims(query)).await
    }

    pub async fn part_checks(&self, id: ClaimIdentity) -> Result<Vec<PartCheck>, WarrantyError> {
        self.step("search_by_claim", self.ports.part_checks.search_by_claim(id)).await
    }

    pub async fn claim_comments(
        &self,
        id: ClaimIdentity,
    ) -> Result<Vec<ClaimComment>, WarrantyError> {
        self.step("list_comments", self.ports.claims.list_comments(id)).await
    }

    pub async fn get_vehicle(&self, vin: &Vin) -> Result<Vehicle, WarrantyError> {
        self.step("get_vehicle", self.ports.vehicles.get_vehicle(vin)).await
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, WarrantyError> {
        self.step("list_vehicles", self.ports.vehicles.list_vehicles()).await
    }

    pub async fn health(&self) -> HealthCheckResult {
        self.ports.health.health_check().await
    }

    // ------------------------------------------------------------------
    // Campaigns, appointments, reports
    // ------------------------------------------------------------------

    /// All campaigns with their status as of today, ordered by id
    pub async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>, WarrantyError> {
        let mut campaigns = self
            .step("list_campaigns", self.ports.campaigns.list_campaigns())
            .await?;
        campaigns.sort_by_key(|c| c.id);
        let today = self.today();
        Ok(campaigns
            .into_iter()
            .map(|campaign| CampaignSummary {
                status: campaign.status_on(today),
                campaign,
            })
            .collect())
    }

    /// Validates a draft without saving it; returns the draft as validation left it
    pub fn review_campaign_draft(&self, mut draft: CampaignDraft) -> (CampaignDraft, FieldErrors) {
        let errors = draft.validate(self.today()).err().unwrap_or_default();
        (draft, errors)
    }

    #[instrument(skip(self, draft, metadata), fields(name = %draft.name))]
    pub async fn create_campaign(
        &self,
        mut draft: CampaignDraft,
        metadata: Option<OperationMetadata>,
    ) -> Result<Campaign, WarrantyError> {
        let today = self.today();
        draft.validate(today).map_err(WarrantyError::Validation)?;

        let id = self.step("next_campaign_id", self.ports.campaigns.next_campaign_id()).await?;
        let campaign = draft.into_campaign(id, today)?;
        self.step(
            "save_campaign",
            self.ports.campaigns.save_campaign(&campaign, metadata),
        )
        .await?;
        info!(campaign_id = %id, "Campaign created");
        Ok(campaign)
    }

    #[instrument(skip(self, draft, metadata), fields(campaign_id = %id))]
    pub async fn update_campaign(
        &self,
        id: CampaignId,
        draft: CampaignDraft,
        metadata: Option<OperationMetadata>,
    ) -> Result<Campaign, WarrantyError> {
        self.step("get_campaign", self.ports.campaigns.get_campaign(id)).await?;
        let campaign = draft.into_campaign(id, self.today())?;
        self.step(
            "save_campaign",
            self.ports.campaigns.save_campaign(&campaign, metadata),
        )
        .await?;
        info!(campaign_id = %id, "Campaign updated");
        Ok(campaign)
    }

    /// Appointments dated inside the window around today
    pub async fn list_appointments(
        &self,
        window: AppointmentWindow,
    ) -> Result<Vec<Appointment>, WarrantyError> {
        let appointments = self
            .step("list_appointments", self.ports.appointments.list_appointments())
            .await?;
        let mut selected: Vec<Appointment> = window
            .filter(&appointments, self.today(), self.config.timezone)
            .into_iter()
            .cloned()
            .collect();
        selected.sort_by_key(|a| a.date);
        Ok(selected)
    }

    /// Files a center's report for a completed campaign
    #[instrument(
        skip(self, submission, metadata),
        fields(campaign_id = %submission.campaign_id, center_id = %submission.center_id)
    )]
    pub async fn submit_report(
        &self,
        submission: ReportSubmission,
        metadata: Option<OperationMetadata>,
    ) -> Result<CampaignReport, WarrantyError> {
        submission.validate()?;

        let (campaign, existing) = tokio::try_join!(
            bounded(
                "get_campaign",
                self.config.step_timeout,
                self.ports.campaigns.get_campaign(submission.campaign_id)
            ),
            bounded(
                "find_report",
                self.config.step_timeout,
                self.ports.reports.find_report(submission.campaign_id, submission.center_id)
            ),
        )?;
        ReportSubmissionTracker::check(&campaign, existing.as_ref(), self.today())?;

        let report = submission.into_report(self.clock.now());
        match bounded(
            "create_report",
            self.config.step_timeout,
            self.ports.reports.create_report(&report, metadata),
        )
        .await
        {
            Ok(()) => {
                info!(report_id = %report.id, "Campaign report submitted");
                Ok(report)
            }
            Err(PortError::Conflict { .. }) => Err(WarrantyError::precondition(format!(
                "Report already submitted for campaign {} by center {}",
                report.campaign_id, report.center_id
            ))),
            Err(other) => Err(other.into()),
        }
    }
}
