//! Native representation of uploaded files.

use indexmap::IndexMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Raw `$_FILES`-style metadata of one upload field.
pub type FileFields = IndexMap<String, serde_json::Value>;

/// Upload status codes, numbered like the classic CGI upload errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadError {
    /// The upload succeeded.
    Ok,
    /// The file exceeds the server-wide size limit.
    IniSize,
    /// The file exceeds the form's size limit.
    FormSize,
    /// The file was only partially uploaded.
    Partial,
    /// No file was uploaded.
    NoFile,
    /// The temporary directory is missing.
    NoTmpDir,
    /// The file could not be written to disk.
    CantWrite,
    /// An extension stopped the upload.
    Extension,
    /// A code outside the known range.
    Other(i64),
}

impl UploadError {
    /// Decode a numeric status code.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::IniSize,
            2 => Self::FormSize,
            3 => Self::Partial,
            4 => Self::NoFile,
            6 => Self::NoTmpDir,
            7 => Self::CantWrite,
            8 => Self::Extension,
            other => Self::Other(other),
        }
    }

    /// The numeric status code.
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            Self::Ok => 0,
            Self::IniSize => 1,
            Self::FormSize => 2,
            Self::Partial => 3,
            Self::NoFile => 4,
            Self::NoTmpDir => 6,
            Self::CantWrite => 7,
            Self::Extension => 8,
            Self::Other(code) => code,
        }
    }

    /// Whether this code reports a successful upload.
    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::IniSize => write!(f, "file exceeds the server size limit"),
            Self::FormSize => write!(f, "file exceeds the form size limit"),
            Self::Partial => write!(f, "file was only partially uploaded"),
            Self::NoFile => write!(f, "no file was uploaded"),
            Self::NoTmpDir => write!(f, "missing temporary directory"),
            Self::CantWrite => write!(f, "failed to write file to disk"),
            Self::Extension => write!(f, "upload stopped by an extension"),
            Self::Other(code) => write!(f, "unknown upload error {code}"),
        }
    }
}

/// An uploaded file as seen by the application.
///
/// Either built from the five classic upload fields with
/// [`UploadedFile::new`], or wrapping a metadata map untouched with
/// [`UploadedFile::from_fields`].
///
/// # Example
///
/// ```
/// use kitbridge_http::{UploadError, UploadedFile};
///
/// let file = UploadedFile::new("/tmp/php123", Some("f.txt"), Some("text/plain"), Some(3), 0);
/// assert_eq!(file.client_filename(), Some("f.txt"));
/// assert_eq!(file.error(), UploadError::Ok);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    file: Option<PathBuf>,
    client_filename: Option<String>,
    client_media_type: Option<String>,
    size: Option<u64>,
    error: UploadError,
    fields: Option<FileFields>,
}

impl UploadedFile {
    /// Create an upload stored at `file`.
    pub fn new(
        file: impl Into<PathBuf>,
        client_filename: Option<&str>,
        client_media_type: Option<&str>,
        size: Option<u64>,
        error: i64,
    ) -> Self {
        Self {
            file: Some(file.into()),
            client_filename: client_filename.map(str::to_string),
            client_media_type: client_media_type.map(str::to_string),
            size,
            error: UploadError::from_code(error),
            fields: None,
        }
    }

    /// Wrap inline upload content without interpreting its keys.
    #[must_use]
    pub fn from_fields(fields: FileFields) -> Self {
        Self {
            file: None,
            client_filename: None,
            client_media_type: None,
            size: None,
            error: UploadError::Ok,
            fields: Some(fields),
        }
    }

    /// Temporary storage path.
    #[must_use]
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// File name sent by the client.
    #[must_use]
    pub fn client_filename(&self) -> Option<&str> {
        self.client_filename.as_deref()
    }

    /// Media type sent by the client.
    #[must_use]
    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    /// Size in bytes, if known.
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Upload status.
    #[must_use]
    pub fn error(&self) -> UploadError {
        self.error
    }

    /// The wrapped metadata of an inline upload.
    #[must_use]
    pub fn fields(&self) -> Option<&FileFields> {
        self.fields.as_ref()
    }

    /// Read the uploaded bytes from temporary storage.
    ///
    /// # Errors
    ///
    /// Fails if the upload reported an error, has no storage path, or the
    /// file cannot be read.
    pub fn contents(&self) -> io::Result<Vec<u8>> {
        if !self.error.is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                self.error.to_string(),
            ));
        }
        let path = self.file.as_deref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "upload has no storage path")
        })?;
        std::fs::read(path)
    }
}
