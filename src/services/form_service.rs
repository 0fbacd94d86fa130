//! HTTP client for the Tally form API

use super::error::{check_status, ServiceError, FORM_SERVICE};
use super::traits::{FormId, FormService};
use crate::form::FormSubmission;
use crate::job::JobId;
use async_trait::async_trait;
use serde::Deserialize;

/// Default Tally API address
pub const DEFAULT_ADDRESS: &str = "https://api.tally.so";

#[derive(Debug, Deserialize)]
struct CreatedForm {
    id: String,
}

/// Client for creating forms through the Tally API
#[derive(Debug, Clone)]
pub struct TallyClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TallyClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn forms_url(&self) -> String {
        format!("{}/forms", self.base_url)
    }
}

#[async_trait]
impl FormService for TallyClient {
    async fn create_form(
        &self,
        job_id: &JobId,
        submission: &FormSubmission,
    ) -> Result<FormId, ServiceError> {
        tracing::debug!(
            job_id = %job_id,
            blocks = submission.blocks.len(),
            "Creating application form"
        );

        let response = self
            .client
            .post(self.forms_url())
            .bearer_auth(&self.api_key)
            .json(submission)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(FORM_SERVICE, e))?;

        let response = check_status(FORM_SERVICE, response).await?;
        let created = response
            .json::<CreatedForm>()
            .await
            .map_err(|e| ServiceError::Decode {
                service: FORM_SERVICE,
                message: e.to_string(),
            })?;

        Ok(FormId(created.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forms_url() {
        let client = TallyClient::new(reqwest::Client::new(), DEFAULT_ADDRESS, "key");
        assert_eq!(client.forms_url(), "https://api.tally.so/forms");
    }

    #[test]
    fn test_created_form_ignores_extra_fields() {
        let created: CreatedForm =
            serde_json::from_str(r#"{"id": "wA1bC2", "name": "Apply", "status": "PUBLISHED"}"#)
                .unwrap();
        assert_eq!(created.id, "wA1bC2");
    }
}
