//! Wire blocks understood by the Tally form service

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Kind-specific block payload
pub type Payload = Map<String, Value>;

/// The `type` of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockKind {
    FormTitle,
    Title,
    InputText,
    Textarea,
    InputEmail,
    InputPhoneNumber,
    FileUpload,
    Checkbox,
    MultipleChoiceOption,
    Text,
    Label,
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[serde(rename = "HEADING_3")]
    Heading3,
}

/// The `groupType` of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GroupKind {
    FormTitle,
    Question,
    InputText,
    Textarea,
    InputEmail,
    InputPhoneNumber,
    FileUpload,
    Checkboxes,
    MultipleChoiceOption,
    Text,
    Label,
    #[serde(rename = "HEADING_1")]
    Heading1,
    #[serde(rename = "HEADING_2")]
    Heading2,
    #[serde(rename = "HEADING_3")]
    Heading3,
}

#[allow(dead_code)]
impl BlockKind {
    pub const ALL: [BlockKind; 14] = [
        BlockKind::FormTitle,
        BlockKind::Title,
        BlockKind::InputText,
        BlockKind::Textarea,
        BlockKind::InputEmail,
        BlockKind::InputPhoneNumber,
        BlockKind::FileUpload,
        BlockKind::Checkbox,
        BlockKind::MultipleChoiceOption,
        BlockKind::Text,
        BlockKind::Label,
        BlockKind::Heading1,
        BlockKind::Heading2,
        BlockKind::Heading3,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::FormTitle => "FORM_TITLE",
            BlockKind::Title => "TITLE",
            BlockKind::InputText => "INPUT_TEXT",
            BlockKind::Textarea => "TEXTAREA",
            BlockKind::InputEmail => "INPUT_EMAIL",
            BlockKind::InputPhoneNumber => "INPUT_PHONE_NUMBER",
            BlockKind::FileUpload => "FILE_UPLOAD",
            BlockKind::Checkbox => "CHECKBOX",
            BlockKind::MultipleChoiceOption => "MULTIPLE_CHOICE_OPTION",
            BlockKind::Text => "TEXT",
            BlockKind::Label => "LABEL",
            BlockKind::Heading1 => "HEADING_1",
            BlockKind::Heading2 => "HEADING_2",
            BlockKind::Heading3 => "HEADING_3",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// The only `groupType` the service accepts for this block type
    pub fn group_kind(self) -> GroupKind {
        match self {
            BlockKind::FormTitle => GroupKind::FormTitle,
            BlockKind::Title => GroupKind::Question,
            BlockKind::InputText => GroupKind::InputText,
            BlockKind::Textarea => GroupKind::Textarea,
            BlockKind::InputEmail => GroupKind::InputEmail,
            BlockKind::InputPhoneNumber => GroupKind::InputPhoneNumber,
            BlockKind::FileUpload => GroupKind::FileUpload,
            BlockKind::Checkbox => GroupKind::Checkboxes,
            BlockKind::MultipleChoiceOption => GroupKind::MultipleChoiceOption,
            BlockKind::Text => GroupKind::Text,
            BlockKind::Label => GroupKind::Label,
            BlockKind::Heading1 => GroupKind::Heading1,
            BlockKind::Heading2 => GroupKind::Heading2,
            BlockKind::Heading3 => GroupKind::Heading3,
        }
    }

    /// Blocks of this type are emitted once per option and share a group
    pub fn is_option(self) -> bool {
        matches!(self, BlockKind::Checkbox | BlockKind::MultipleChoiceOption)
    }
}

impl GroupKind {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupKind::FormTitle => "FORM_TITLE",
            GroupKind::Question => "QUESTION",
            GroupKind::InputText => "INPUT_TEXT",
            GroupKind::Textarea => "TEXTAREA",
            GroupKind::InputEmail => "INPUT_EMAIL",
            GroupKind::InputPhoneNumber => "INPUT_PHONE_NUMBER",
            GroupKind::FileUpload => "FILE_UPLOAD",
            GroupKind::Checkboxes => "CHECKBOXES",
            GroupKind::MultipleChoiceOption => "MULTIPLE_CHOICE_OPTION",
            GroupKind::Text => "TEXT",
            GroupKind::Label => "LABEL",
            GroupKind::Heading1 => "HEADING_1",
            GroupKind::Heading2 => "HEADING_2",
            GroupKind::Heading3 => "HEADING_3",
        }
    }
}

/// One element of a form as the service renders it.
///
/// Blocks are only built by the compiler and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    uuid: Uuid,
    #[serde(rename = "type")]
    kind: BlockKind,
    group_uuid: Uuid,
    group_type: GroupKind,
    payload: Payload,
}

#[allow(dead_code)]
impl Block {
    pub(crate) fn new(kind: BlockKind, group_uuid: Uuid, payload: Payload) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            kind,
            group_uuid,
            group_type: kind.group_kind(),
            payload,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn group_uuid(&self) -> Uuid {
        self.group_uuid
    }

    pub fn group_kind(&self) -> GroupKind {
        self.group_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Convenience lookup into the payload
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key)
    }
}

/// Publication state of a new form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormStatus {
    #[default]
    Published,
    Draft,
}

/// Body of a create-form call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSubmission {
    pub name: String,
    pub status: FormStatus,
    pub blocks: Vec<Block>,
}

impl FormSubmission {
    pub fn new(name: &str, status: FormStatus, blocks: Vec<Block>) -> Self {
        Self {
            name: name.to_string(),
            status,
            blocks,
        }
    }
}
