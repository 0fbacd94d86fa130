//! Terminal results of a provisioning run

use crate::form::{FieldError, ValidationError};
use crate::job::{JobId, JobValidationError};
use crate::services::{FormId, ServiceError};
use serde::Serialize;
use thiserror::Error;

/// Why a run did not produce a job with its form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("invalid job posting: {0}")]
    InvalidJob(#[from] JobValidationError),

    #[error("invalid form field: {0}")]
    InvalidField(#[from] FieldError),

    #[error("form failed pre-validation at {0}")]
    Schema(#[from] ValidationError),

    #[error("could not create job: {0}")]
    JobStore(#[source] ServiceError),

    #[error("could not create application form: {0}")]
    FormService(#[source] ServiceError),

    #[error("provisioning task stopped unexpectedly: {0}")]
    Interrupted(String),
}

impl ProvisionError {
    /// Caused by the request itself; resubmitting unchanged will fail again
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ProvisionError::InvalidJob(_)
                | ProvisionError::InvalidField(_)
                | ProvisionError::Schema(_)
        )
    }
}

/// What the caller should tell the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Remediation {
    None,
    FixInput,
    Retry,
    ContactSupport,
}

/// Result of [`ProvisioningSaga::provision`](super::ProvisioningSaga::provision)
#[must_use = "a CriticalInconsistency outcome needs operator attention"]
#[derive(Debug, Clone, PartialEq)]
pub enum ProvisioningOutcome {
    /// Job exists, and so does its form when one was requested
    Created {
        job_id: JobId,
        form_id: Option<FormId>,
    },
    /// Nothing was written
    AbortedBeforeCreation { reason: ProvisionError },
    /// The form failed and the job was deleted again
    RolledBack { job_id: JobId, reason: ProvisionError },
    /// The form failed and the job could not be deleted. Manual cleanup needed.
    CriticalInconsistency {
        job_id: JobId,
        reason: ProvisionError,
        cleanup_error: Option<ServiceError>,
    },
}

/// Flat view of an outcome for logs and CLI output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeReport {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_error: Option<String>,
    pub remediation: Remediation,
}

#[allow(dead_code)]
impl ProvisioningOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, ProvisioningOutcome::Created { .. })
    }

    /// Job the outcome refers to, if one was ever created
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            ProvisioningOutcome::Created { job_id, .. }
            | ProvisioningOutcome::RolledBack { job_id, .. }
            | ProvisioningOutcome::CriticalInconsistency { job_id, .. } => Some(job_id),
            ProvisioningOutcome::AbortedBeforeCreation { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&ProvisionError> {
        match self {
            ProvisioningOutcome::Created { .. } => None,
            ProvisioningOutcome::AbortedBeforeCreation { reason }
            | ProvisioningOutcome::RolledBack { reason, .. }
            | ProvisioningOutcome::CriticalInconsistency { reason, .. } => Some(reason),
        }
    }

    pub fn remediation(&self) -> Remediation {
        match self {
            ProvisioningOutcome::Created { .. } => Remediation::None,
            ProvisioningOutcome::AbortedBeforeCreation { reason } if reason.is_input_error() => {
                Remediation::FixInput
            }
            ProvisioningOutcome::AbortedBeforeCreation { .. }
            | ProvisioningOutcome::RolledBack { .. } => Remediation::Retry,
            ProvisioningOutcome::CriticalInconsistency { .. } => Remediation::ContactSupport,
        }
    }

    fn status(&self) -> &'static str {
        match self {
            ProvisioningOutcome::Created { .. } => "created",
            ProvisioningOutcome::AbortedBeforeCreation { .. } => "aborted_before_creation",
            ProvisioningOutcome::RolledBack { .. } => "rolled_back",
            ProvisioningOutcome::CriticalInconsistency { .. } => "critical_inconsistency",
        }
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisioningOutcome::Created { .. } => 0,
            ProvisioningOutcome::AbortedBeforeCreation { .. } => 2,
            ProvisioningOutcome::RolledBack { .. } => 3,
            ProvisioningOutcome::CriticalInconsistency { .. } => 4,
        }
    }

    pub fn report(&self) -> OutcomeReport {
        let form_id = match self {
            ProvisioningOutcome::Created { form_id, .. } => form_id.as_ref().map(|id| id.0.clone()),
            _ => None,
        };
        let cleanup_error = match self {
            ProvisioningOutcome::CriticalInconsistency { cleanup_error, .. } => {
                cleanup_error.as_ref().map(ToString::to_string)
            }
            _ => None,
        };
        OutcomeReport {
            status: self.status(),
            job_id: self.job_id().map(|id| id.0.clone()),
            form_id,
            reason: self.reason().map(ToString::to_string),
            cleanup_error,
            remediation: self.remediation(),
        }
    }
}
