//! File extension to upload category mapping for `FILE_UPLOAD` blocks

use std::collections::BTreeMap;

/// Upload category -> extensions accepted under it
pub type AllowedFiles = BTreeMap<String, Vec<String>>;

pub const APPLICATION: &str = "application/*";
pub const IMAGE: &str = "image/*";
pub const TEXT: &str = "text/*";

/// Categories the form service understands
pub const CATEGORIES: [&str; 3] = [APPLICATION, IMAGE, TEXT];

const CSV: &str = ".csv";

const EXTENSION_CATEGORIES: &[(&str, &str)] = &[
    (".pdf", APPLICATION),
    (".doc", APPLICATION),
    (".docx", APPLICATION),
    (".xlsx", APPLICATION),
    (".zip", APPLICATION),
    (".jpg", IMAGE),
    (".jpeg", IMAGE),
    (".png", IMAGE),
    (".txt", TEXT),
    (CSV, TEXT),
];

fn normalize(extension: &str) -> String {
    extension.trim().to_ascii_lowercase()
}

/// Primary category for a single extension
pub fn category_of(extension: &str) -> Option<&'static str> {
    let extension = normalize(extension);
    EXTENSION_CATEGORIES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, category)| *category)
}

/// Group extensions by upload category.
///
/// Unknown extensions are dropped without error. CSV is listed under
/// `application/*` as well as its primary `text/*`, matching what the form
/// service reports for forms built in its own editor.
pub fn classify<I, S>(extensions: I) -> AllowedFiles
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut allowed = AllowedFiles::new();
    let mut saw_csv = false;

    for extension in extensions {
        let extension = normalize(extension.as_ref());
        let Some(category) = category_of(&extension) else {
            continue;
        };
        saw_csv |= extension == CSV;
        push_unique(&mut allowed, category, extension);
    }

    if saw_csv {
        push_unique(&mut allowed, APPLICATION, CSV.to_string());
    }

    allowed
}

/// Extensions `classify` would silently drop
pub fn unknown_extensions<I, S>(extensions: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .filter(|ext| category_of(ext.as_ref()).is_none())
        .map(|ext| ext.as_ref().to_string())
        .collect()
}

fn push_unique(allowed: &mut AllowedFiles, category: &str, extension: String) {
    let entry = allowed.entry(category.to_string()).or_default();
    if !entry.contains(&extension) {
        entry.push(extension);
    }
}
