//! Compiles editor fields into Tally blocks
//!
//! Every captioned question becomes a `TITLE` block in a `QUESTION` group
//! followed by its input block(s) in a second group. Option questions emit
//! one block per option, all sharing the option group.

use super::block::{Block, BlockKind, Payload};
use super::field::{
    validate_fields, CheckboxGroupConfig, ChoiceGroupConfig, FieldError, FieldKind,
    FileUploadConfig, FormField, StaticKind,
};
use super::mime;
use serde_json::Value;
use uuid::Uuid;

/// Phone inputs always offer the country dropdown
const PHONE_INTERNATIONAL_FORMAT: bool = true;
/// Country pre-selected in phone inputs
pub const DEFAULT_COUNTRY_CODE: &str = "NZ";

fn payload<const N: usize>(entries: [(&str, Value); N]) -> Payload {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn html(text: &str) -> Payload {
    payload([("html", Value::from(text))])
}

/// Compile a form title and its fields into the block sequence the form
/// service renders, in order.
pub fn compile(form_title: &str, fields: &[FormField]) -> Result<Vec<Block>, FieldError> {
    validate_fields(fields)?;

    let total = 1 + fields.iter().map(FormField::block_count).sum::<usize>();
    let mut blocks = Vec::with_capacity(total);

    blocks.push(Block::new(
        BlockKind::FormTitle,
        Uuid::new_v4(),
        html(form_title),
    ));

    for field in fields {
        emit_field(&mut blocks, field);
    }

    tracing::debug!(
        fields = fields.len(),
        blocks = blocks.len(),
        "Compiled form {form_title:?}"
    );

    Ok(blocks)
}

fn emit_field(blocks: &mut Vec<Block>, field: &FormField) {
    match &field.kind {
        FieldKind::ShortText => emit_input(blocks, field, BlockKind::InputText, Payload::new()),
        FieldKind::LongText => emit_input(blocks, field, BlockKind::Textarea, Payload::new()),
        FieldKind::Email => emit_input(blocks, field, BlockKind::InputEmail, Payload::new()),
        FieldKind::Phone => emit_input(
            blocks,
            field,
            BlockKind::InputPhoneNumber,
            payload([
                ("internationalFormat", Value::from(PHONE_INTERNATIONAL_FORMAT)),
                ("defaultCountryCode", Value::from(DEFAULT_COUNTRY_CODE)),
            ]),
        ),
        FieldKind::FileUpload(upload) => emit_file_upload(blocks, field, upload),
        FieldKind::SingleCheckbox => {
            let group = Uuid::new_v4();
            blocks.push(Block::new(
                BlockKind::Checkbox,
                group,
                payload([
                    ("text", Value::from(field.label.as_str())),
                    ("index", Value::from(0)),
                    ("isFirst", Value::from(true)),
                    ("isLast", Value::from(true)),
                    ("isRequired", Value::from(field.required)),
                ]),
            ));
        }
        FieldKind::CheckboxGroup(group) => emit_checkbox_group(blocks, field, group),
        FieldKind::ChoiceGroup(group) => emit_choice_group(blocks, field, group),
        FieldKind::StaticText { display } => {
            blocks.push(Block::new(
                static_block_kind(*display),
                Uuid::new_v4(),
                html(&field.label),
            ));
        }
    }
}

fn static_block_kind(display: StaticKind) -> BlockKind {
    match display {
        StaticKind::Text => BlockKind::Text,
        StaticKind::Label => BlockKind::Label,
        StaticKind::Heading1 => BlockKind::Heading1,
        StaticKind::Heading2 => BlockKind::Heading2,
        StaticKind::Heading3 => BlockKind::Heading3,
    }
}

fn emit_caption(blocks: &mut Vec<Block>, text: &str) {
    blocks.push(Block::new(BlockKind::Title, Uuid::new_v4(), html(text)));
}

fn emit_input(blocks: &mut Vec<Block>, field: &FormField, kind: BlockKind, extra: Payload) {
    emit_caption(blocks, &field.label);

    let mut content = payload([
        ("isRequired", Value::from(field.required)),
        ("placeholder", Value::from(field.placeholder_text())),
    ]);
    content.extend(extra);
    blocks.push(Block::new(kind, Uuid::new_v4(), content));
}

fn emit_file_upload(blocks: &mut Vec<Block>, field: &FormField, upload: &FileUploadConfig) {
    emit_caption(blocks, &field.label);

    let mut content = payload([("isRequired", Value::from(field.required))]);

    if upload.allow_multiple {
        content.insert("hasMultipleFiles".to_string(), Value::from(true));
        match upload.max_files {
            Some(max) => {
                content.insert("hasMaxFiles".to_string(), Value::from(true));
                content.insert("maxFiles".to_string(), Value::from(max));
            }
            None => {
                content.insert("hasMaxFiles".to_string(), Value::from(false));
            }
        }
    }

    if !upload.allowed_extensions.is_empty() {
        let allowed = mime::classify(&upload.allowed_extensions);
        let dropped = mime::unknown_extensions(&upload.allowed_extensions);
        if !dropped.is_empty() {
            tracing::warn!(
                "Ignoring unsupported file types {dropped:?} on upload field {:?}",
                field.label
            );
        }
        let allowed = allowed
            .into_iter()
            .map(|(category, extensions)| (category, Value::from(extensions)))
            .collect();
        content.insert("allowedFiles".to_string(), Value::Object(allowed));
    }

    blocks.push(Block::new(BlockKind::FileUpload, Uuid::new_v4(), content));
}

fn choice_limits(min: Option<u32>, max: Option<u32>) -> Payload {
    let mut limits = Payload::new();
    if let Some(min) = min {
        limits.insert("hasMinChoices".to_string(), Value::from(true));
        limits.insert("minChoices".to_string(), Value::from(min));
    }
    if let Some(max) = max {
        limits.insert("hasMaxChoices".to_string(), Value::from(true));
        limits.insert("maxChoices".to_string(), Value::from(max));
    }
    limits
}

fn emit_checkbox_group(blocks: &mut Vec<Block>, field: &FormField, group: &CheckboxGroupConfig) {
    if let Some(caption) = group.caption() {
        emit_caption(blocks, caption);
    }

    let mut shared = payload([("isRequired", Value::from(field.required))]);
    shared.extend(choice_limits(group.min_choices, group.max_choices));
    emit_options(blocks, BlockKind::Checkbox, &group.options, &shared);
}

fn emit_choice_group(blocks: &mut Vec<Block>, field: &FormField, group: &ChoiceGroupConfig) {
    emit_caption(blocks, &field.label);

    let mut shared = payload([("isRequired", Value::from(field.required))]);
    if group.allow_multiple {
        shared.insert("allowMultiple".to_string(), Value::from(true));
        shared.extend(choice_limits(group.min_choices, group.max_choices));
    }
    emit_options(blocks, BlockKind::MultipleChoiceOption, &group.options, &shared);
}

/// One block per option, in a single group
fn emit_options(blocks: &mut Vec<Block>, kind: BlockKind, options: &[String], shared: &Payload) {
    let group = Uuid::new_v4();
    let last = options.len().saturating_sub(1);

    for (index, text) in options.iter().enumerate() {
        let mut content = payload([
            ("text", Value::from(text.as_str())),
            ("index", Value::from(index)),
            ("isFirst", Value::from(index == 0)),
            ("isLast", Value::from(index == last)),
        ]);
        content.extend(shared.clone());
        blocks.push(Block::new(kind, group, content));
    }
}
