//! Job posting model shared with the job store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier assigned by the job store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleType {
    Internship,
    Graduate,
    Junior,
}

/// Job posting as submitted from the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub title: String,
    pub specialisation: String,
    pub description: String,
    pub role_type: RoleType,
    pub application_deadline: DateTime<Utc>,
    /// Outbound link; not needed when applications go through an embedded form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_link: Option<String>,
}

/// Job record returned by the job store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    #[serde(flatten)]
    pub details: JobRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobValidationError {
    #[error("{0} is required")]
    Blank(&'static str),

    #[error("an application link is required when no application form is attached")]
    MissingApplicationLink,
}

impl JobRequest {
    /// Copy with surrounding whitespace removed from every text field
    pub fn trimmed(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            specialisation: self.specialisation.trim().to_string(),
            description: self.description.trim().to_string(),
            role_type: self.role_type,
            application_deadline: self.application_deadline,
            application_link: self
                .application_link
                .as_deref()
                .map(str::trim)
                .filter(|link| !link.is_empty())
                .map(str::to_string),
        }
    }

    /// Check the posting is complete. `has_form` relaxes the link requirement.
    pub fn validate(&self, has_form: bool) -> Result<(), JobValidationError> {
        let required = [
            ("title", &self.title),
            ("specialisation", &self.specialisation),
            ("description", &self.description),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(JobValidationError::Blank(*name));
        }

        let has_link = self
            .application_link
            .as_deref()
            .is_some_and(|link| !link.trim().is_empty());
        if !has_form && !has_link {
            return Err(JobValidationError::MissingApplicationLink);
        }

        Ok(())
    }
}
