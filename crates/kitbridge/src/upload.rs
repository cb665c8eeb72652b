//! Upload descriptor classification.
//!
//! Browser requests carry uploads either as native [`UploadedFile`]s or as
//! raw metadata maps keyed `tmp_name`, `name`, `type`, `size` and `error`.
//! Each entry is classified once into an [`UploadClass`]; only invalid
//! entries are lost in conversion.

use indexmap::IndexMap;
use kitbridge_browser::FileEntry;
use kitbridge_http::{FileFields, UploadedFile};
use serde_json::Value;
use std::path::PathBuf;
use tracing::warn;

/// Raw upload metadata extracted from a field map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawUploadMetadata {
    /// Temporary storage path (`tmp_name`).
    pub temp_path: PathBuf,
    /// Original client filename (`name`).
    pub name: String,
    /// Declared media type (`type`), absent when `null`.
    pub mime_type: Option<String>,
    /// Size in bytes (`size`).
    pub size: u64,
    /// Upload status code (`error`).
    pub error_code: i64,
}

impl RawUploadMetadata {
    /// Builds the native upload.
    #[must_use]
    pub fn into_uploaded_file(self) -> UploadedFile {
        UploadedFile::new(
            self.temp_path,
            Some(&self.name),
            self.mime_type.as_deref(),
            Some(self.size),
            self.error_code,
        )
    }
}

/// The three shapes an upload entry can take.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadClass {
    /// Already native, or inline content without path/name keys.
    Wrapped(UploadedFile),
    /// Complete raw metadata.
    Raw(RawUploadMetadata),
    /// Neither; the entry is dropped.
    Invalid(String),
}

/// Classifies one upload entry.
///
/// # Example
///
/// ```
/// use kitbridge::{classify_upload, UploadClass};
/// use kitbridge_browser::FileEntry;
/// use kitbridge_http::FileFields;
/// use serde_json::json;
///
/// let mut fields = FileFields::new();
/// fields.insert("tmp_name".into(), json!("/tmp/x"));
/// fields.insert("name".into(), json!("f.txt"));
/// fields.insert("type".into(), json!("text/plain"));
/// fields.insert("size".into(), json!(3));
/// fields.insert("error".into(), json!(0));
///
/// assert!(matches!(classify_upload(&FileEntry::Fields(fields)), UploadClass::Raw(_)));
/// ```
pub fn classify_upload(entry: &FileEntry) -> UploadClass {
    match entry {
        FileEntry::Upload(file) => UploadClass::Wrapped(file.clone()),
        FileEntry::Fields(fields) => classify_fields(fields),
    }
}

fn classify_fields(fields: &FileFields) -> UploadClass {
    if !fields.contains_key("tmp_name") && !fields.contains_key("name") {
        return UploadClass::Wrapped(UploadedFile::from_fields(fields.clone()));
    }

    match raw_metadata(fields) {
        Ok(raw) => UploadClass::Raw(raw),
        Err(reason) => UploadClass::Invalid(reason),
    }
}

fn raw_metadata(fields: &FileFields) -> Result<RawUploadMetadata, String> {
    let temp_path = string_field(fields, "tmp_name")?;
    let name = string_field(fields, "name")?;
    let mime_type = match fields.get("type") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) => None,
        Some(_) => return Err("`type` must be a string or null".to_string()),
        None => return Err("missing `type`".to_string()),
    };
    let size = fields
        .get("size")
        .ok_or_else(|| "missing `size`".to_string())?
        .as_u64()
        .ok_or_else(|| "`size` must be a non-negative integer".to_string())?;
    let error_code = fields
        .get("error")
        .ok_or_else(|| "missing `error`".to_string())?
        .as_i64()
        .ok_or_else(|| "`error` must be an integer".to_string())?;

    Ok(RawUploadMetadata {
        temp_path: PathBuf::from(temp_path),
        name,
        mime_type,
        size,
        error_code,
    })
}

fn string_field(fields: &FileFields, key: &str) -> Result<String, String> {
    match fields.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(format!("`{key}` must be a string")),
        None => Err(format!("missing `{key}`")),
    }
}

/// Converts every upload entry, keyed by form field, dropping invalid ones.
pub fn convert_files(
    files: &IndexMap<String, FileEntry>,
    warn_on_dropped: bool,
) -> IndexMap<String, UploadedFile> {
    let mut converted = IndexMap::with_capacity(files.len());
    for (field, entry) in files {
        match classify_upload(entry) {
            UploadClass::Wrapped(file) => {
                converted.insert(field.clone(), file);
            }
            UploadClass::Raw(raw) => {
                converted.insert(field.clone(), raw.into_uploaded_file());
            }
            UploadClass::Invalid(reason) => {
                if warn_on_dropped {
                    warn!(upload.field = %field, reason = %reason, "Dropping malformed upload");
                }
            }
        }
    }
    converted
}
