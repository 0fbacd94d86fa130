//! Form field value objects
//!
//! A [`FormField`] is one question as authored in the job editor. The
//! variant-specific configuration lives in [`FieldKind`], so the compiler can
//! match on it exhaustively.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display style for content that collects no input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticKind {
    #[default]
    Text,
    Label,
    #[serde(rename = "heading_1")]
    Heading1,
    #[serde(rename = "heading_2")]
    Heading2,
    #[serde(rename = "heading_3")]
    Heading3,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadConfig {
    #[serde(default)]
    pub allow_multiple: bool,
    /// Only honoured when `allow_multiple` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<u32>,
    #[serde(default)]
    pub allowed_extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxGroupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_choices: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_choices: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceGroupConfig {
    pub options: Vec<String>,
    #[serde(default)]
    pub allow_multiple: bool,
    /// Only honoured when `allow_multiple` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_choices: Option<u32>,
    /// Only honoured when `allow_multiple` is set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_choices: Option<u32>,
}

/// Variant-specific part of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    ShortText,
    LongText,
    Email,
    Phone,
    FileUpload(FileUploadConfig),
    SingleCheckbox,
    CheckboxGroup(CheckboxGroupConfig),
    ChoiceGroup(ChoiceGroupConfig),
    StaticText {
        #[serde(default)]
        display: StaticKind,
    },
}

/// A single question in an application form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// Field configuration the compiler refuses to emit
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("field {index} has an empty label")]
    BlankLabel { index: usize },

    #[error("field {index} ({label:?}) needs at least one option")]
    EmptyOptions { index: usize, label: String },

    #[error("field {index} has a blank option at position {option}")]
    BlankOption { index: usize, option: usize },

    #[error("field {index} sets {name} to zero")]
    ZeroLimit { index: usize, name: &'static str },

    #[error("field {index} has minChoices {min} greater than maxChoices {max}")]
    InvertedChoiceBounds { index: usize, min: u32, max: u32 },

    #[error("field {index} requires {min} choices but only offers {available} options")]
    UnreachableMinChoices {
        index: usize,
        min: u32,
        available: usize,
    },
}

#[allow(dead_code)]
impl FormField {
    fn new(label: &str, kind: FieldKind) -> Self {
        Self {
            label: label.to_string(),
            required: false,
            placeholder: None,
            kind,
        }
    }

    /// Create a single-line text question
    pub fn short_text(label: &str) -> Self {
        Self::new(label, FieldKind::ShortText)
    }

    /// Create a multi-line text question
    pub fn long_text(label: &str) -> Self {
        Self::new(label, FieldKind::LongText)
    }

    pub fn email(label: &str) -> Self {
        Self::new(label, FieldKind::Email)
    }

    pub fn phone(label: &str) -> Self {
        Self::new(label, FieldKind::Phone)
    }

    /// Create a file upload question
    pub fn file_upload(label: &str, config: FileUploadConfig) -> Self {
        Self::new(label, FieldKind::FileUpload(config))
    }

    /// Create a standalone checkbox whose label is its own caption
    pub fn checkbox(label: &str) -> Self {
        Self::new(label, FieldKind::SingleCheckbox)
    }

    /// Create a list of checkboxes with an optional question caption
    pub fn checkbox_group(question: Option<&str>, options: &[&str]) -> Self {
        Self::new(
            question.unwrap_or_default(),
            FieldKind::CheckboxGroup(CheckboxGroupConfig {
                question_text: question.map(str::to_string),
                options: options.iter().map(|o| o.to_string()).collect(),
                ..Default::default()
            }),
        )
    }

    /// Create a multiple choice question
    pub fn choice_group(label: &str, options: &[&str]) -> Self {
        Self::new(
            label,
            FieldKind::ChoiceGroup(ChoiceGroupConfig {
                options: options.iter().map(|o| o.to_string()).collect(),
                ..Default::default()
            }),
        )
    }

    /// Create instructional content with no input
    pub fn static_text(label: &str, display: StaticKind) -> Self {
        Self::new(label, FieldKind::StaticText { display })
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    /// Placeholder text as sent on the wire (empty when unset)
    pub fn placeholder_text(&self) -> &str {
        self.placeholder.as_deref().unwrap_or("")
    }

    /// Number of blocks this field compiles to
    pub fn block_count(&self) -> usize {
        match &self.kind {
            FieldKind::ShortText
            | FieldKind::LongText
            | FieldKind::Email
            | FieldKind::Phone
            | FieldKind::FileUpload(_) => 2,
            FieldKind::SingleCheckbox | FieldKind::StaticText { .. } => 1,
            FieldKind::CheckboxGroup(group) => {
                usize::from(group.caption().is_some()) + group.options.len()
            }
            FieldKind::ChoiceGroup(group) => 1 + group.options.len(),
        }
    }

    /// Check the configuration of the field at position `index`
    pub fn validate(&self, index: usize) -> Result<(), FieldError> {
        let needs_label = !matches!(self.kind, FieldKind::CheckboxGroup(_));
        if needs_label && self.label.trim().is_empty() {
            return Err(FieldError::BlankLabel { index });
        }

        match &self.kind {
            FieldKind::FileUpload(upload) => {
                if upload.allow_multiple && upload.max_files == Some(0) {
                    return Err(FieldError::ZeroLimit {
                        index,
                        name: "maxFiles",
                    });
                }
                Ok(())
            }
            FieldKind::CheckboxGroup(group) => {
                self.validate_options(index, &group.options)?;
                validate_choice_limits(index, group.min_choices, group.max_choices, &group.options)
            }
            FieldKind::ChoiceGroup(group) => {
                self.validate_options(index, &group.options)?;
                if group.allow_multiple {
                    validate_choice_limits(
                        index,
                        group.min_choices,
                        group.max_choices,
                        &group.options,
                    )?;
                }
                Ok(())
            }
            FieldKind::ShortText
            | FieldKind::LongText
            | FieldKind::Email
            | FieldKind::Phone
            | FieldKind::SingleCheckbox
            | FieldKind::StaticText { .. } => Ok(()),
        }
    }

    fn validate_options(&self, index: usize, options: &[String]) -> Result<(), FieldError> {
        if options.is_empty() {
            return Err(FieldError::EmptyOptions {
                index,
                label: self.label.clone(),
            });
        }
        if let Some(option) = options.iter().position(|o| o.trim().is_empty()) {
            return Err(FieldError::BlankOption { index, option });
        }
        Ok(())
    }
}

impl CheckboxGroupConfig {
    /// Question caption, if one was supplied and is not blank
    pub fn caption(&self) -> Option<&str> {
        self.question_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

fn validate_choice_limits(
    index: usize,
    min: Option<u32>,
    max: Option<u32>,
    options: &[String],
) -> Result<(), FieldError> {
    if min == Some(0) {
        return Err(FieldError::ZeroLimit {
            index,
            name: "minChoices",
        });
    }
    if max == Some(0) {
        return Err(FieldError::ZeroLimit {
            index,
            name: "maxChoices",
        });
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(FieldError::InvertedChoiceBounds { index, min, max });
        }
    }
    if let Some(min) = min {
        if min as usize > options.len() {
            return Err(FieldError::UnreachableMinChoices {
                index,
                min,
                available: options.len(),
            });
        }
    }
    Ok(())
}

/// Validate every field, stopping at the first bad one
pub fn validate_fields(fields: &[FormField]) -> Result<(), FieldError> {
    fields
        .iter()
        .enumerate()
        .try_for_each(|(index, field)| field.validate(index))
}
