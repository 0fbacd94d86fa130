//! Application form pipeline
//!
//! Editor fields are compiled into Tally blocks and pre-validated locally
//! before anything is sent to the form service.

mod block;
mod compiler;
mod field;
mod mime;
mod schema;

pub use block::{Block, BlockKind, FormStatus, FormSubmission, GroupKind};
pub use compiler::compile;
pub use field::{
    CheckboxGroupConfig, ChoiceGroupConfig, FieldError, FieldKind, FileUploadConfig, FormField,
    StaticKind,
};
pub use mime::{classify, AllowedFiles};
pub use schema::{validate, validate_request, validate_submission, ValidationError};
