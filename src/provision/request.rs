//! Provisioning input as submitted by the job editor

use crate::form::{FormField, FormStatus};
use crate::job::JobRequest;
use serde::Deserialize;

/// Embedded application form requested alongside a job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRequest {
    pub title: String,
    #[serde(default)]
    pub fields: Vec<FormField>,
    /// Overrides the configured status for this form only
    #[serde(default)]
    pub status: Option<FormStatus>,
}

#[allow(dead_code)]
impl FormRequest {
    pub fn new(title: &str, fields: Vec<FormField>) -> Self {
        Self {
            title: title.to_string(),
            fields,
            status: None,
        }
    }
}

/// A complete provisioning request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProvisionRequest {
    pub job: JobRequest,
    #[serde(default)]
    pub form: Option<FormRequest>,
}
