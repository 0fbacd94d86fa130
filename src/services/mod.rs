//! Clients for the services the provisioning saga depends on

mod error;
mod form_service;
mod job_store;
mod traits;

pub use error::ServiceError;
pub use form_service::{TallyClient, DEFAULT_ADDRESS as DEFAULT_FORM_SERVICE_ADDRESS};
pub use job_store::HttpJobStore;
pub use traits::{FormId, FormService, JobStore};

#[cfg(test)]
pub use error::{FORM_SERVICE, JOB_STORE};
#[cfg(test)]
pub use traits::{MockFormService, MockJobStore};
