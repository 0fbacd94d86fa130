//! Pre-flight validation of form submissions
//!
//! Mirrors the acceptance rules the Tally API applies to a create-form
//! request so that a bad block sequence is caught locally, before a job has
//! been created. Validation stops at the first violation and reports it as a
//! JSON path plus message.

use super::block::{Block, BlockKind, FormStatus, FormSubmission};
use super::mime;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

/// First rule a submission broke
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

type Check = Result<(), ValidationError>;

#[derive(Debug, Clone, Copy)]
enum Shape {
    Bool,
    /// Non-negative integer
    Count,
    Number,
    Text,
    /// Upload category -> list of extensions
    FileMap,
}

struct KeyRule {
    key: &'static str,
    shape: Shape,
    required: bool,
}

const fn required(key: &'static str, shape: Shape) -> KeyRule {
    KeyRule {
        key,
        shape,
        required: true,
    }
}

const fn optional(key: &'static str, shape: Shape) -> KeyRule {
    KeyRule {
        key,
        shape,
        required: false,
    }
}

const TOP_LEVEL_KEYS: &[&str] = &["name", "status", "blocks"];
const BLOCK_KEYS: &[&str] = &["uuid", "type", "groupUuid", "groupType", "payload"];

const HTML_RULES: &[KeyRule] = &[required("html", Shape::Text)];

const INPUT_RULES: &[KeyRule] = &[
    optional("isHidden", Shape::Bool),
    optional("isRequired", Shape::Bool),
    optional("placeholder", Shape::Text),
];

const PHONE_RULES: &[KeyRule] = &[
    optional("isHidden", Shape::Bool),
    optional("isRequired", Shape::Bool),
    optional("placeholder", Shape::Text),
    optional("internationalFormat", Shape::Bool),
    optional("defaultCountryCode", Shape::Text),
];

// FILE_UPLOAD takes no placeholder
const FILE_UPLOAD_RULES: &[KeyRule] = &[
    optional("isHidden", Shape::Bool),
    optional("isRequired", Shape::Bool),
    optional("hasMultipleFiles", Shape::Bool),
    optional("hasMaxFiles", Shape::Bool),
    optional("maxFiles", Shape::Count),
    optional("hasMinFiles", Shape::Bool),
    optional("minFiles", Shape::Count),
    optional("hasMaxFileSize", Shape::Bool),
    optional("maxFileSize", Shape::Number),
    optional("allowedFiles", Shape::FileMap),
    optional("columnListUuid", Shape::Text),
    optional("columnUuid", Shape::Text),
    optional("columnRatio", Shape::Number),
    optional("name", Shape::Text),
];

const CHECKBOX_RULES: &[KeyRule] = &[
    required("text", Shape::Text),
    required("index", Shape::Count),
    required("isFirst", Shape::Bool),
    required("isLast", Shape::Bool),
    optional("isHidden", Shape::Bool),
    optional("isRequired", Shape::Bool),
    optional("hasMinChoices", Shape::Bool),
    optional("minChoices", Shape::Count),
    optional("hasMaxChoices", Shape::Bool),
    optional("maxChoices", Shape::Count),
];

const CHOICE_RULES: &[KeyRule] = &[
    required("text", Shape::Text),
    required("index", Shape::Count),
    required("isFirst", Shape::Bool),
    required("isLast", Shape::Bool),
    optional("isHidden", Shape::Bool),
    optional("isRequired", Shape::Bool),
    optional("allowMultiple", Shape::Bool),
    optional("hasMinChoices", Shape::Bool),
    optional("minChoices", Shape::Count),
    optional("hasMaxChoices", Shape::Bool),
    optional("maxChoices", Shape::Count),
];

/// (value key, feature flag that must be true alongside it)
const FLAG_PAIRS: &[(&str, &str)] = &[
    ("maxFiles", "hasMaxFiles"),
    ("minFiles", "hasMinFiles"),
    ("maxFileSize", "hasMaxFileSize"),
    ("minChoices", "hasMinChoices"),
    ("maxChoices", "hasMaxChoices"),
];

fn rules_for(kind: BlockKind) -> &'static [KeyRule] {
    match kind {
        BlockKind::FormTitle
        | BlockKind::Title
        | BlockKind::Text
        | BlockKind::Label
        | BlockKind::Heading1
        | BlockKind::Heading2
        | BlockKind::Heading3 => HTML_RULES,
        BlockKind::InputText | BlockKind::Textarea | BlockKind::InputEmail => INPUT_RULES,
        BlockKind::InputPhoneNumber => PHONE_RULES,
        BlockKind::FileUpload => FILE_UPLOAD_RULES,
        BlockKind::Checkbox => CHECKBOX_RULES,
        BlockKind::MultipleChoiceOption => CHOICE_RULES,
    }
}

/// Block fields the cross-block checks need
struct BlockView<'a> {
    kind: BlockKind,
    group: Uuid,
    payload: &'a Map<String, Value>,
}

/// Validate a compiled block sequence as a published form named `title`
#[allow(dead_code)]
pub fn validate(title: &str, blocks: &[Block]) -> Check {
    validate_submission(&FormSubmission::new(
        title,
        FormStatus::Published,
        blocks.to_vec(),
    ))
}

/// Validate the exact body that would be sent to the form service
pub fn validate_submission(submission: &FormSubmission) -> Check {
    let body = serde_json::to_value(submission)
        .map_err(|e| ValidationError::new("$", format!("request is not serializable: {e}")))?;
    validate_request(&body)
}

/// Validate a raw create-form request body
pub fn validate_request(body: &Value) -> Check {
    let request = body
        .as_object()
        .ok_or_else(|| ValidationError::new("$", "request must be an object"))?;

    if let Some(key) = request
        .keys()
        .find(|key| !TOP_LEVEL_KEYS.contains(&key.as_str()))
    {
        return Err(ValidationError::new(key.as_str(), "unknown request key"));
    }

    match request.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => {}
        _ => return Err(ValidationError::new("name", "must be a non-empty string")),
    }

    match request.get("status").and_then(Value::as_str) {
        Some("PUBLISHED") | Some("DRAFT") => {}
        _ => return Err(ValidationError::new("status", "must be PUBLISHED or DRAFT")),
    }

    let blocks = request
        .get("blocks")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::new("blocks", "must be an array"))?;
    if blocks.is_empty() {
        return Err(ValidationError::new(
            "blocks",
            "must contain at least the form title",
        ));
    }

    let mut seen = HashSet::new();
    let views = blocks
        .iter()
        .enumerate()
        .map(|(index, block)| check_block(index, block, &mut seen))
        .collect::<Result<Vec<_>, _>>()?;

    check_groups(&views)
}

fn check_block<'a>(
    index: usize,
    value: &'a Value,
    seen: &mut HashSet<Uuid>,
) -> Result<BlockView<'a>, ValidationError> {
    let path = format!("blocks[{index}]");
    let block = value
        .as_object()
        .ok_or_else(|| ValidationError::new(&path, "block must be an object"))?;

    if let Some(key) = block
        .keys()
        .find(|key| !BLOCK_KEYS.contains(&key.as_str()))
    {
        return Err(ValidationError::new(
            format!("{path}.{key}"),
            "unknown block key",
        ));
    }

    let uuid = uuid_field(block, &path, "uuid")?;
    if !seen.insert(uuid) {
        return Err(ValidationError::new(
            format!("{path}.uuid"),
            "duplicate block uuid",
        ));
    }

    let type_name = block
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ValidationError::new(format!("{path}.type"), "must be a string"))?;
    let kind = BlockKind::parse(type_name).ok_or_else(|| {
        ValidationError::new(
            format!("{path}.type"),
            format!("unsupported block type {type_name:?}"),
        )
    })?;

    match (index, kind) {
        (0, BlockKind::FormTitle) => {}
        (0, _) => {
            return Err(ValidationError::new(
                format!("{path}.type"),
                "first block must be FORM_TITLE",
            ))
        }
        (_, BlockKind::FormTitle) => {
            return Err(ValidationError::new(
                format!("{path}.type"),
                "only the first block may be FORM_TITLE",
            ))
        }
        _ => {}
    }

    let group = uuid_field(block, &path, "groupUuid")?;

    let expected_group = kind.group_kind().as_str();
    match block.get("groupType").and_then(Value::as_str) {
        Some(group_type) if group_type == expected_group => {}
        _ => {
            return Err(ValidationError::new(
                format!("{path}.groupType"),
                format!("{} blocks must use groupType {expected_group}", kind.as_str()),
            ))
        }
    }

    let payload = block
        .get("payload")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::new(format!("{path}.payload"), "must be an object"))?;
    check_payload(&format!("{path}.payload"), kind, payload)?;

    Ok(BlockView {
        kind,
        group,
        payload,
    })
}

fn uuid_field(block: &Map<String, Value>, path: &str, key: &str) -> Result<Uuid, ValidationError> {
    block
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| ValidationError::new(format!("{path}.{key}"), "must be a UUID string"))
}

fn check_payload(path: &str, kind: BlockKind, payload: &Map<String, Value>) -> Check {
    let rules = rules_for(kind);

    for (key, value) in payload {
        let key_path = format!("{path}.{key}");
        let rule = rules.iter().find(|rule| rule.key == key.as_str()).ok_or_else(|| {
            ValidationError::new(&key_path, format!("not accepted on {} blocks", kind.as_str()))
        })?;
        check_shape(&key_path, rule.shape, value)?;
    }

    if let Some(rule) = rules
        .iter()
        .find(|rule| rule.required && !payload.contains_key(rule.key))
    {
        return Err(ValidationError::new(
            format!("{path}.{}", rule.key),
            "required",
        ));
    }

    let flag = |key: &str| payload.get(key).and_then(Value::as_bool).unwrap_or(false);

    for (value_key, flag_key) in FLAG_PAIRS {
        let has_value = payload.contains_key(*value_key);
        if has_value && !flag(*flag_key) {
            return Err(ValidationError::new(
                format!("{path}.{value_key}"),
                format!("{value_key} requires {flag_key} to be true"),
            ));
        }
        if flag(*flag_key) && !has_value {
            return Err(ValidationError::new(
                format!("{path}.{flag_key}"),
                format!("{flag_key} is set but {value_key} is missing"),
            ));
        }
    }

    if kind == BlockKind::FileUpload && flag("hasMaxFiles") && !flag("hasMultipleFiles") {
        return Err(ValidationError::new(
            format!("{path}.hasMaxFiles"),
            "a file cap requires hasMultipleFiles to be true",
        ));
    }

    if kind == BlockKind::MultipleChoiceOption && !flag("allowMultiple") {
        if let Some(key) = ["minChoices", "maxChoices"]
            .into_iter()
            .find(|key| payload.contains_key(*key))
        {
            return Err(ValidationError::new(
                format!("{path}.{key}"),
                "choice limits require allowMultiple to be true",
            ));
        }
    }

    Ok(())
}

fn check_shape(path: &str, shape: Shape, value: &Value) -> Check {
    let ok = match shape {
        Shape::Bool => value.is_boolean(),
        Shape::Count => value.as_u64().is_some(),
        Shape::Number => value.is_number(),
        Shape::Text => value.is_string(),
        Shape::FileMap => return check_file_map(path, value),
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(path, format!("expected {shape:?}")))
    }
}

fn check_file_map(path: &str, value: &Value) -> Check {
    let categories = value
        .as_object()
        .ok_or_else(|| ValidationError::new(path, "must map upload categories to extensions"))?;

    for (category, extensions) in categories {
        let category_path = format!("{path}.{category}");
        if !mime::CATEGORIES.contains(&category.as_str()) {
            return Err(ValidationError::new(
                &category_path,
                "unsupported upload category",
            ));
        }
        let extensions = extensions
            .as_array()
            .filter(|list| !list.is_empty())
            .ok_or_else(|| {
                ValidationError::new(&category_path, "must be a non-empty list of extensions")
            })?;
        for (i, extension) in extensions.iter().enumerate() {
            match extension.as_str() {
                Some(ext) if ext.starts_with('.') && ext.len() > 1 => {}
                _ => {
                    return Err(ValidationError::new(
                        format!("{category_path}[{i}]"),
                        "extensions must look like \".pdf\"",
                    ))
                }
            }
        }
    }
    Ok(())
}

/// Group linkage rules.
///
/// Non-option groups hold exactly one block, so a `TITLE` never shares its
/// group with the input it captions. Option groups are contiguous runs of a
/// single option type.
fn check_groups(blocks: &[BlockView<'_>]) -> Check {
    let mut first_seen: HashMap<Uuid, usize> = HashMap::new();
    let mut previous: Option<Uuid> = None;

    for (index, block) in blocks.iter().enumerate() {
        if let Some(&first) = first_seen.get(&block.group) {
            let path = format!("blocks[{index}].groupUuid");
            if !block.kind.is_option() || blocks[first].kind != block.kind {
                return Err(ValidationError::new(
                    path,
                    format!("group is already used by blocks[{first}]"),
                ));
            }
            if previous != Some(block.group) {
                return Err(ValidationError::new(
                    path,
                    "option group is split by other blocks",
                ));
            }
        } else {
            first_seen.insert(block.group, index);
        }
        previous = Some(block.group);
    }

    let mut start = 0;
    while start < blocks.len() {
        let mut end = start + 1;
        while end < blocks.len() && blocks[end].group == blocks[start].group {
            end += 1;
        }
        if blocks[start].kind.is_option() {
            check_option_run(start, &blocks[start..end])?;
        }
        start = end;
    }

    Ok(())
}

fn check_option_run(start: usize, run: &[BlockView<'_>]) -> Check {
    let last = run.len() - 1;
    for (position, block) in run.iter().enumerate() {
        let path = format!("blocks[{}].payload", start + position);
        let flag = |key: &str| block.payload.get(key).and_then(Value::as_bool);

        if block.payload.get("index").and_then(Value::as_u64) != Some(position as u64) {
            return Err(ValidationError::new(
                format!("{path}.index"),
                format!("expected option index {position}"),
            ));
        }
        if flag("isFirst") != Some(position == 0) {
            return Err(ValidationError::new(
                format!("{path}.isFirst"),
                "only the first option of a group may be flagged isFirst",
            ));
        }
        if flag("isLast") != Some(position == last) {
            return Err(ValidationError::new(
                format!("{path}.isLast"),
                "only the last option of a group may be flagged isLast",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::compiler::compile;
    use crate::form::field::{FieldKind, FileUploadConfig, FormField};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn body(fields: &[FormField]) -> Value {
        let blocks = compile("Apply to Acme", fields).unwrap();
        serde_json::to_value(FormSubmission::new(
            "Apply to Acme",
            FormStatus::Published,
            blocks,
        ))
        .unwrap()
    }

    fn upload_body() -> Value {
        body(&[FormField::file_upload(
            "CV",
            FileUploadConfig {
                allow_multiple: true,
                max_files: Some(2),
                allowed_extensions: vec![".pdf".into()],
            },
        )])
    }

    fn error_path(body: &Value) -> String {
        assert_err!(validate_request(body)).path
    }

    #[test]
    fn test_compiled_body_is_accepted() {
        assert_ok!(validate_request(&upload_body()));
        assert_ok!(validate_request(&body(&[])));
    }

    #[test]
    fn test_draft_status_is_accepted() {
        let blocks = compile("Apply", &[FormField::email("Email")]).unwrap();
        let submission = FormSubmission::new("Apply", FormStatus::Draft, blocks);
        assert_ok!(validate_submission(&submission));
    }

    #[test]
    fn test_request_must_be_object() {
        assert_eq!(error_path(&json!([])), "$");
    }

    #[test]
    fn test_blank_name() {
        let mut request = body(&[]);
        request["name"] = json!("  ");
        assert_eq!(error_path(&request), "name");
    }

    #[test]
    fn test_unknown_status() {
        let mut request = body(&[]);
        request["status"] = json!("ARCHIVED");
        assert_eq!(error_path(&request), "status");
    }

    #[test]
    fn test_unknown_top_level_key() {
        let mut request = body(&[]);
        request["workspace"] = json!("abc");
        assert_eq!(error_path(&request), "workspace");
    }

    #[test]
    fn test_empty_blocks() {
        let mut request = body(&[]);
        request["blocks"] = json!([]);
        let err = assert_err!(validate_request(&request));
        assert_eq!(err.path, "blocks");
        assert_eq!(err.to_string(), "blocks: must contain at least the form title");
    }

    #[test]
    fn test_first_block_must_be_form_title() {
        let mut request = body(&[FormField::short_text("Name")]);
        request["blocks"].as_array_mut().unwrap().remove(0);
        assert_eq!(error_path(&request), "blocks[0].type");
    }

    #[test]
    fn test_second_form_title_rejected() {
        let mut request = body(&[FormField::short_text("Name")]);
        let mut copy = request["blocks"][0].clone();
        copy["uuid"] = json!(Uuid::new_v4().to_string());
        copy["groupUuid"] = json!(Uuid::new_v4().to_string());
        request["blocks"].as_array_mut().unwrap().push(copy);
        assert_eq!(error_path(&request), "blocks[3].type");
    }

    #[test]
    fn test_unsupported_block_type() {
        let mut request = body(&[FormField::short_text("Name")]);
        request["blocks"][2]["type"] = json!("SIGNATURE");
        let err = assert_err!(validate_request(&request));
        assert_eq!(err.path, "blocks[2].type");
        assert!(err.message.contains("SIGNATURE"));
    }

    #[test]
    fn test_group_type_must_match_type() {
        let mut request = body(&[FormField::long_text("Why?")]);
        request["blocks"][2]["groupType"] = json!("QUESTION");
        assert_eq!(error_path(&request), "blocks[2].groupType");
    }

    #[test]
    fn test_duplicate_block_uuid() {
        let mut request = body(&[FormField::short_text("Name")]);
        request["blocks"][2]["uuid"] = request["blocks"][1]["uuid"].clone();
        assert_eq!(error_path(&request), "blocks[2].uuid");
    }

    #[test]
    fn test_malformed_uuid() {
        let mut request = body(&[]);
        request["blocks"][0]["groupUuid"] = json!("not-a-uuid");
        assert_eq!(error_path(&request), "blocks[0].groupUuid");
    }

    #[test]
    fn test_placeholder_not_accepted_on_file_upload() {
        let mut request = upload_body();
        request["blocks"][2]["payload"]["placeholder"] = json!("Upload here");
        assert_eq!(error_path(&request), "blocks[2].payload.placeholder");
    }

    #[test]
    fn test_max_files_requires_flag() {
        let mut request = upload_body();
        request["blocks"][2]["payload"]["hasMaxFiles"] = json!(false);
        let err = assert_err!(validate_request(&request));
        assert_eq!(err.path, "blocks[2].payload.maxFiles");
        assert_eq!(err.message, "maxFiles requires hasMaxFiles to be true");
    }

    #[test]
    fn test_flag_without_value() {
        let mut request = upload_body();
        request["blocks"][2]["payload"]
            .as_object_mut()
            .unwrap()
            .remove("maxFiles");
        assert_eq!(error_path(&request), "blocks[2].payload.hasMaxFiles");
    }

    #[test]
    fn test_file_cap_requires_multiple_files() {
        let mut request = upload_body();
        request["blocks"][2]["payload"]["hasMultipleFiles"] = json!(false);
        assert_eq!(error_path(&request), "blocks[2].payload.hasMaxFiles");
    }

    #[test]
    fn test_unknown_upload_category() {
        let mut request = upload_body();
        request["blocks"][2]["payload"]["allowedFiles"] = json!({ "video/*": [".mp4"] });
        assert_eq!(
            error_path(&request),
            "blocks[2].payload.allowedFiles.video/*"
        );
    }

    #[test]
    fn test_bad_extension_token() {
        let mut request = upload_body();
        request["blocks"][2]["payload"]["allowedFiles"] = json!({ "image/*": ["png"] });
        assert_eq!(
            error_path(&request),
            "blocks[2].payload.allowedFiles.image/*[0]"
        );
    }

    #[test]
    fn test_wrong_value_shape() {
        let mut request = body(&[FormField::short_text("Name")]);
        request["blocks"][2]["payload"]["isRequired"] = json!("yes");
        assert_eq!(error_path(&request), "blocks[2].payload.isRequired");
    }

    #[test]
    fn test_missing_html() {
        let mut request = body(&[]);
        request["blocks"][0]["payload"] = json!({});
        assert_eq!(error_path(&request), "blocks[0].payload.html");
    }

    #[test]
    fn test_title_group_shared_with_input() {
        let mut request = body(&[FormField::short_text("Name")]);
        request["blocks"][2]["groupUuid"] = request["blocks"][1]["groupUuid"].clone();
        let err = assert_err!(validate_request(&request));
        assert_eq!(err.path, "blocks[2].groupUuid");
        assert!(err.message.contains("blocks[1]"));
    }

    #[test]
    fn test_option_index_gap() {
        let mut request = body(&[FormField::checkbox_group(None, &["a", "b", "c"])]);
        request["blocks"][3]["payload"]["index"] = json!(5);
        assert_eq!(error_path(&request), "blocks[3].payload.index");
    }

    #[test]
    fn test_option_with_two_firsts() {
        let mut request = body(&[FormField::choice_group("Year", &["1", "2"])]);
        request["blocks"][3]["payload"]["isFirst"] = json!(true);
        assert_eq!(error_path(&request), "blocks[3].payload.isFirst");
    }

    #[test]
    fn test_option_group_split() {
        let mut request = body(&[
            FormField::checkbox_group(None, &["a", "b"]),
            FormField::short_text("Name"),
        ]);
        let group = request["blocks"][1]["groupUuid"].clone();
        let blocks = request["blocks"].as_array_mut().unwrap();
        let moved = blocks.remove(2);
        blocks.push(moved);
        assert_eq!(blocks[4]["groupUuid"], group);
        assert_eq!(error_path(&request), "blocks[4].groupUuid");
    }

    #[test]
    fn test_choice_limits_require_allow_multiple() {
        let mut field = FormField::choice_group("Year", &["1", "2"]);
        if let FieldKind::ChoiceGroup(ref mut group) = field.kind {
            group.allow_multiple = true;
            group.min_choices = Some(1);
        }
        let mut request = body(&[field]);
        request["blocks"][2]["payload"]
            .as_object_mut()
            .unwrap()
            .remove("allowMultiple");
        assert_eq!(error_path(&request), "blocks[2].payload.minChoices");
    }

    #[test]
    fn test_validate_matches_validate_request() {
        let blocks = compile("Apply", &[FormField::checkbox("I agree")]).unwrap();
        assert_ok!(validate("Apply", &blocks));
        let err = assert_err!(validate("", &blocks));
        assert_eq!(err.path, "name");
    }
}
