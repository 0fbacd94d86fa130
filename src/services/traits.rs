//! Trait abstraction for the saga's collaborators to enable mocking in tests

use super::error::ServiceError;
use crate::form::FormSubmission;
use crate::job::{Job, JobId, JobRequest};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the form service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FormId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Job persistence. Each call is atomic on the store's side.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a job posting
    async fn create(&self, job: &JobRequest) -> Result<Job, ServiceError>;

    /// Delete a job posting
    async fn delete(&self, job_id: &JobId) -> Result<(), ServiceError>;
}

/// External form builder
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormService: Send + Sync {
    /// Create the application form for `job_id`
    async fn create_form(
        &self,
        job_id: &JobId,
        submission: &FormSubmission,
    ) -> Result<FormId, ServiceError>;
}
