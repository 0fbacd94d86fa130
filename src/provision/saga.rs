//! Job + application form provisioning saga
//!
//! ```text
//! Start ──invalid──────────────────────────────▶ AbortedBeforeCreation
//!   │
//! Prepared ──job store fails───────────────────▶ AbortedBeforeCreation
//!   │  └──no form──────────────────────────────▶ Created
//! JobCreated ──form created────────────────────▶ Created
//!   │
//! Compensating ──job deleted───────────────────▶ RolledBack
//!                └──delete fails───────────────▶ CriticalInconsistency
//! ```
//!
//! Everything after `JobCreated` runs on its own task so a caller that goes
//! away cannot leave a job behind without at least attempting cleanup.

use super::outcome::{ProvisionError, ProvisioningOutcome};
use super::request::FormRequest;
use crate::form::{self, FormStatus, FormSubmission};
use crate::job::{JobId, JobRequest};
use crate::services::{FormService, JobStore};
use std::sync::Arc;
use tracing::{error, info, warn};

enum SagaState {
    Start {
        job: JobRequest,
        form: Option<FormRequest>,
    },
    Prepared {
        job: JobRequest,
        submission: Option<FormSubmission>,
    },
    JobCreated {
        job_id: JobId,
        submission: FormSubmission,
    },
    Compensating {
        job_id: JobId,
        cause: ProvisionError,
    },
    Done(ProvisioningOutcome),
}

/// Creates a job and, optionally, its application form as one unit
pub struct ProvisioningSaga<J, F> {
    job_store: Arc<J>,
    form_service: Arc<F>,
    form_status: FormStatus,
}

impl<J, F> Clone for ProvisioningSaga<J, F> {
    fn clone(&self) -> Self {
        Self {
            job_store: Arc::clone(&self.job_store),
            form_service: Arc::clone(&self.form_service),
            form_status: self.form_status,
        }
    }
}

impl<J, F> ProvisioningSaga<J, F>
where
    J: JobStore + 'static,
    F: FormService + 'static,
{
    pub fn new(job_store: J, form_service: F) -> Self {
        Self {
            job_store: Arc::new(job_store),
            form_service: Arc::new(form_service),
            form_status: FormStatus::default(),
        }
    }

    /// Status given to forms whose request does not pick one
    pub fn with_form_status(mut self, status: FormStatus) -> Self {
        self.form_status = status;
        self
    }

    /// Run the saga to a terminal outcome. Never retries a failed call.
    pub async fn provision(
        &self,
        job: JobRequest,
        form: Option<FormRequest>,
    ) -> ProvisioningOutcome {
        let mut state = SagaState::Start { job, form };
        loop {
            state = match state {
                SagaState::Done(outcome) => return outcome,
                SagaState::JobCreated { job_id, submission } => {
                    return self.finish_detached(job_id, submission).await
                }
                other => self.advance(other).await,
            };
        }
    }

    async fn finish_detached(
        &self,
        job_id: JobId,
        submission: FormSubmission,
    ) -> ProvisioningOutcome {
        let saga = self.clone();
        let task_job_id = job_id.clone();
        let task = tokio::spawn(async move {
            let mut state = SagaState::JobCreated {
                job_id: task_job_id,
                submission,
            };
            loop {
                state = match state {
                    SagaState::Done(outcome) => return outcome,
                    other => saga.advance(other).await,
                };
            }
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(
                    job_id = %job_id,
                    "Provisioning task died after the job was created, it may have no form: {err}"
                );
                ProvisioningOutcome::CriticalInconsistency {
                    job_id,
                    reason: ProvisionError::Interrupted(err.to_string()),
                    cleanup_error: None,
                }
            }
        }
    }

    async fn advance(&self, state: SagaState) -> SagaState {
        match state {
            SagaState::Start { job, form } => self.prepare(job, form),
            SagaState::Prepared { job, submission } => self.create_job(job, submission).await,
            SagaState::JobCreated { job_id, submission } => {
                self.submit_form(job_id, submission).await
            }
            SagaState::Compensating { job_id, cause } => self.compensate(job_id, cause).await,
            done @ SagaState::Done(_) => done,
        }
    }

    /// Local checks only; nothing has been written yet
    fn prepare(&self, job: JobRequest, form: Option<FormRequest>) -> SagaState {
        let job = job.trimmed();
        let prepared = job
            .validate(form.is_some())
            .map_err(ProvisionError::from)
            .and_then(|()| form.map(|form| self.build_submission(form)).transpose());

        match prepared {
            Ok(submission) => SagaState::Prepared { job, submission },
            Err(reason) => {
                warn!("Rejected job {:?} before any write: {reason}", job.title);
                SagaState::Done(ProvisioningOutcome::AbortedBeforeCreation { reason })
            }
        }
    }

    fn build_submission(&self, form: FormRequest) -> Result<FormSubmission, ProvisionError> {
        let blocks = form::compile(&form.title, &form.fields)?;
        let status = form.status.unwrap_or(self.form_status);
        let submission = FormSubmission::new(&form.title, status, blocks);
        form::validate_submission(&submission)?;
        Ok(submission)
    }

    async fn create_job(&self, job: JobRequest, submission: Option<FormSubmission>) -> SagaState {
        let created = match self.job_store.create(&job).await {
            Ok(created) => created,
            Err(err) => {
                warn!("Job creation failed, nothing to roll back: {err}");
                return SagaState::Done(ProvisioningOutcome::AbortedBeforeCreation {
                    reason: ProvisionError::JobStore(err),
                });
            }
        };
        info!(job_id = %created.id, "Created job {:?}", created.details.title);

        match submission {
            None => SagaState::Done(ProvisioningOutcome::Created {
                job_id: created.id,
                form_id: None,
            }),
            Some(submission) => SagaState::JobCreated {
                job_id: created.id,
                submission,
            },
        }
    }

    async fn submit_form(&self, job_id: JobId, submission: FormSubmission) -> SagaState {
        match self.form_service.create_form(&job_id, &submission).await {
            Ok(form_id) => {
                info!(job_id = %job_id, form_id = %form_id, "Attached application form");
                SagaState::Done(ProvisioningOutcome::Created {
                    job_id,
                    form_id: Some(form_id),
                })
            }
            Err(err) => {
                warn!(job_id = %job_id, "Form creation failed, deleting job: {err}");
                SagaState::Compensating {
                    job_id,
                    cause: ProvisionError::FormService(err),
                }
            }
        }
    }

    /// The single compensating action: delete the job we created
    async fn compensate(&self, job_id: JobId, cause: ProvisionError) -> SagaState {
        match self.job_store.delete(&job_id).await {
            Ok(()) => {
                info!(job_id = %job_id, "Rolled back job after form failure");
                SagaState::Done(ProvisioningOutcome::RolledBack {
                    job_id,
                    reason: cause,
                })
            }
            Err(cleanup) => {
                error!(
                    job_id = %job_id,
                    "Job exists without an application form and needs manual cleanup. \
                     form error: {cause}; delete error: {cleanup}"
                );
                SagaState::Done(ProvisioningOutcome::CriticalInconsistency {
                    job_id,
                    reason: cause,
                    cleanup_error: Some(cleanup),
                })
            }
        }
    }
}
