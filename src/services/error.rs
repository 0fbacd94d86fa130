//! Failures talking to the job store or the form service

use thiserror::Error;

/// Services the saga talks to, used to label errors
pub const JOB_STORE: &str = "job store";
pub const FORM_SERVICE: &str = "form service";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("failed to reach {service}: {message}")]
    Transport {
        service: &'static str,
        message: String,
    },

    #[error("{service} timed out")]
    Timeout { service: &'static str },

    #[error("{service} rejected the request with status {status}: {body}")]
    Rejected {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unreadable response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
}

#[allow(dead_code)]
impl ServiceError {
    /// Classify a transport-level failure
    pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout { service }
        } else if err.is_decode() {
            ServiceError::Decode {
                service,
                message: err.to_string(),
            }
        } else {
            ServiceError::Transport {
                service,
                message: err.to_string(),
            }
        }
    }

    /// Name of the service that failed
    pub fn service(&self) -> &'static str {
        match self {
            ServiceError::Transport { service, .. }
            | ServiceError::Timeout { service }
            | ServiceError::Rejected { service, .. }
            | ServiceError::Decode { service, .. } => *service,
        }
    }
}

/// Turn a non-success response into [`ServiceError::Rejected`]
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ServiceError::Rejected {
        service,
        status: status.as_u16(),
        body,
    })
}
