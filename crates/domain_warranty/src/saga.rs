//! Finalize saga
//!
//! The decision pass touches three collaborators: part checks, warehouse
//! stock, and claim storage. Each step that changes state pushes the action
//! that undoes it. When a later step fails, the recorded compensations run in
//! reverse order and the caller receives [`WarrantyError::RolledBack`].
//!
//! The closing comment is append-only and has no compensation; a rollback
//! reports its id so the note can be reconciled by hand.
//!
//! A step that times out or loses its connection may still have committed.
//! Debits carry a reference unique to the attempt, so an uncertain debit is
//! credited back only if the store recorded it. Part releases are undone
//! unconditionally since re-flagging is idempotent. A transition with an
//! uncertain outcome is re-read before anything is compensated.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, error, warn};

use core_kernel::{CommentId, FinalizeAttemptId, OperationMetadata, PartNumber, PortError};

use crate::claim::{Claim, ClaimComment, ClaimStatus, TimelineEntry};
use crate::error::WarrantyError;
use crate::identity::ClaimIdentity;
use crate::inventory::{InventoryReconciler, ReconciliationPlan, StockDelta};
use crate::part_check::PartCheckUpdate;
use crate::ports::WarrantyPorts;

/// Runs `future` with a deadline, mapping an elapsed deadline to `PortError::Timeout`
pub async fn bounded<T, F>(
    operation: &'static str,
    limit: Duration,
    future: F,
) -> Result<T, PortError>
where
    F: Future<Output = Result<T, PortError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(PortError::timeout(
            operation,
            u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}

/// An action that undoes one completed saga step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Put a released part back on the repair path
    ReflagPart {
        claim_id: ClaimIdentity,
        part_number: PartNumber,
        body: PartCheckUpdate,
    },
    /// Credit back a stock debit
    CreditStock(StockDelta),
    /// Credit back a debit whose outcome is unknown, if the store recorded it
    CreditIfRecorded(StockDelta),
}

/// One finalize pass over a claim
pub struct FinalizeSaga<'a> {
    ports: &'a WarrantyPorts,
    claim_id: ClaimIdentity,
    attempt: FinalizeAttemptId,
    step_timeout: Duration,
    metadata: Option<OperationMetadata>,
    compensations: Vec<Compensation>,
    retained_comment: Option<CommentId>,
}

impl<'a> FinalizeSaga<'a> {
    pub fn new(
        ports: &'a WarrantyPorts,
        claim_id: ClaimIdentity,
        step_timeout: Duration,
        metadata: Option<OperationMetadata>,
    ) -> Self {
        Self {
            ports,
            claim_id,
            attempt: FinalizeAttemptId::new(),
            step_timeout,
            metadata,
            compensations: Vec::new(),
            retained_comment: None,
        }
    }

    pub fn attempt(&self) -> FinalizeAttemptId {
        self.attempt
    }

    /// Compensations recorded so far, oldest first
    pub fn compensations(&self) -> &[Compensation] {
        &self.compensations
    }

    /// Marks each rejected part as no longer under repair
    pub async fn release_rejected(
        &mut self,
        releases: Vec<PartCheckUpdate>,
    ) -> Result<(), WarrantyError> {
        for body in releases {
            let result = bounded(
                "update_part_check",
                self.step_timeout,
                self.ports.part_checks.update_part_check(
                    self.claim_id,
                    &body.part_number,
                    &body,
                    self.metadata.clone(),
                ),
            )
            .await;

            let landed = match &result {
                Ok(_) => true,
                Err(e) => e.is_transient(),
            };
            if landed {
                self.compensations.push(Compensation::ReflagPart {
                    claim_id: self.claim_id,
                    part_number: body.part_number.clone(),
                    body: body.reflag(),
                });
            }
            result?;
            debug!(
                claim_id = %self.claim_id,
                part_number = %body.part_number,
                "Rejected part released"
            );
        }
        Ok(())
    }

    /// Applies the reconciliation plan's debits under this attempt's references
    pub async fn apply_debits(&mut self, plan: &ReconciliationPlan) -> Result<(), WarrantyError> {
        let outcome = InventoryReconciler::apply(
            &plan.tagged(self.attempt),
            self.ports.inventory.as_ref(),
            self.step_timeout,
            self.metadata.clone(),
        )
        .await;

        let (applied, pending, failure) = match outcome {
            Ok(applied) => (applied, None, None),
            Err(partial) => (partial.applied, partial.pending, Some(partial.error)),
        };
        self.compensations
            .extend(applied.iter().map(|delta| Compensation::CreditStock(delta.inverse())));
        if let Some(delta) = pending {
            self.compensations.push(Compensation::CreditIfRecorded(delta));
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Posts the closing comment
    pub async fn post_comment(&mut self, comment: &ClaimComment) -> Result<(), WarrantyError> {
        bounded(
            "post_comment",
            self.step_timeout,
            self.ports.claims.post_comment(comment, self.metadata.clone()),
        )
        .await?;
        self.retained_comment = Some(comment.id);
        debug!(claim_id = %self.claim_id, comment_id = %comment.id, "Closing comment posted");
        Ok(())
    }

    /// Moves the claim out of DECIDE; a concurrent change is a precondition failure
    pub async fn transition(&mut self, entry: TimelineEntry) -> Result<Claim, WarrantyError> {
        let result = bounded(
            "transition_claim",
            self.step_timeout,
            self.ports.claims.transition_claim(
                self.claim_id,
                ClaimStatus::Decide,
                entry,
                self.metadata.clone(),
            ),
        )
        .await;

        match result {
            Ok(claim) => Ok(claim),
            Err(PortError::Conflict { message }) => Err(WarrantyError::precondition(message)),
            Err(other) => match self.committed_as(entry.status).await {
                Some(claim) => {
                    warn!(
                        claim_id = %self.claim_id,
                        error = %other,
                        status = %entry.status,
                        "Transition reported a failure but the claim already moved"
                    );
                    Ok(claim)
                }
                None => Err(other.into()),
            },
        }
    }

    /// Re-reads the claim; returns it if it already reached `status`
    async fn committed_as(&self, status: ClaimStatus) -> Option<Claim> {
        let claim = bounded(
            "get_claim",
            self.step_timeout,
            self.ports.claims.get_claim(self.claim_id),
        )
        .await
        .ok()?;
        (claim.status == status).then_some(claim)
    }

    /// Undoes every completed step, newest first, and wraps `cause`
    pub async fn rollback(self, cause: WarrantyError) -> WarrantyError {
        error!(claim_id = %self.claim_id, error = %cause, "Finalize failed; compensating");

        let mut failures = Vec::new();
        for compensation in self.compensations.iter().rev() {
            warn!(claim_id = %self.claim_id, ?compensation, "Running compensation");
            if let Err(e) = self.compensate(compensation).await {
                error!(claim_id = %self.claim_id, ?compensation, error = %e, "Compensation failed");
                failures.push(format!("{:?}: {}", compensation, e));
            }
        }

        WarrantyError::RolledBack {
            cause: Box::new(cause),
            compensation_failures: failures,
            retained_comment: self.retained_comment,
        }
    }

    async fn compensate(&self, compensation: &Compensation) -> Result<(), PortError> {
        match compensation {
            Compensation::ReflagPart {
                claim_id,
                part_number,
                body,
            } => bounded(
                "update_part_check",
                self.step_timeout,
                self.ports
                    .part_checks
                    .update_part_check(*claim_id, part_number, body, self.metadata.clone()),
            )
            .await
            .map(|_| ()),
            Compensation::CreditStock(delta) => bounded(
                "adjust_stock",
                self.step_timeout,
                self.ports.inventory.adjust_stock(delta, self.metadata.clone()),
            )
            .await
            .map(|_| ()),
            Compensation::CreditIfRecorded(debit) => {
                let Some(reference) = debit.reference.as_deref() else {
                    return Ok(());
                };
                let landed = bounded(
                    "movement_recorded",
                    self.step_timeout,
                    self.ports.inventory.movement_recorded(reference),
                )
                .await?;
                if !landed {
                    debug!(claim_id = %self.claim_id, reference, "Uncertain debit never landed");
                    return Ok(());
                }
                bounded(
                    "adjust_stock",
                    self.step_timeout,
                    self.ports.inventory.adjust_stock(&debit.inverse(), self.metadata.clone()),
                )
                .await
                .map(|_| ())
            }
        }
    }
}
