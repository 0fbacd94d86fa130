//! Job + application form provisioning with compensation on failure

mod outcome;
mod request;
mod saga;

pub use outcome::{OutcomeReport, ProvisionError, ProvisioningOutcome, Remediation};
pub use request::{FormRequest, ProvisionRequest};
pub use saga::ProvisioningSaga;
