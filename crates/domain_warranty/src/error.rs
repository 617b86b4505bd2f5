//! Warranty domain errors

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use core_kernel::{CommentId, MoneyError, PortError};

use crate::claim::ClaimStatus;

/// Field-level validation messages, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a single failing field
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Merges another set of errors into this one
    pub fn extend(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// Ok when no field failed, otherwise a validation error
    pub fn into_result(self) -> Result<(), WarrantyError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(WarrantyError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Coarse classification used by callers to decide whether to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Bad input; fix the request
    Validation,
    /// The request is well-formed but the current state forbids it
    Precondition,
    /// A collaborator failed in a way that may succeed on retry
    Transient,
    /// Anything else
    Fatal,
}

/// Errors that can occur in the warranty domain
#[derive(Debug, Error)]
pub enum WarrantyError {
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: ClaimStatus, to: ClaimStatus },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Invalid claim id: {0}")]
    InvalidClaimId(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Collaborator failure: {0}")]
    Collaborator(PortError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Finalize rolled back: {cause}")]
    RolledBack {
        cause: Box<WarrantyError>,
        compensation_failures: Vec<String>,
        retained_comment: Option<CommentId>,
    },
}

impl WarrantyError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WarrantyError::Validation(FieldErrors::single(field, message))
    }

    pub fn precondition(message: impl Into<String>) -> Self {
        WarrantyError::PreconditionFailed(message.into())
    }

    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        WarrantyError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// True when retrying the same request may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            WarrantyError::Collaborator(e) => e.is_transient(),
            WarrantyError::RolledBack { cause, .. } => cause.is_transient(),
            _ => false,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            WarrantyError::Validation(_) | WarrantyError::InvalidClaimId(_) => {
                ErrorKind::Validation
            }
            WarrantyError::InvalidTransition { .. }
            | WarrantyError::PreconditionFailed(_)
            | WarrantyError::NotFound { .. } => ErrorKind::Precondition,
            WarrantyError::RolledBack { cause, .. } => match cause.kind() {
                ErrorKind::Transient => ErrorKind::Transient,
                _ => ErrorKind::Fatal,
            },
            other if other.is_transient() => ErrorKind::Transient,
            _ => ErrorKind::Fatal,
        }
    }
}

impl From<PortError> for WarrantyError {
    fn from(error: PortError) -> Self {
        match error {
            PortError::NotFound { entity_type, id } => WarrantyError::NotFound {
                entity: entity_type,
                id,
            },
            PortError::Validation { message, field } => {
                WarrantyError::validation(field.unwrap_or_else(|| "request".to_string()), message)
            }
            other => WarrantyError::Collaborator(other),
        }
    }
}
