//! Importing requirements from a local text file

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::utils::error::InputError;

pub const PLAIN_TEXT: &str = "text/plain";

/// A picked file: its name, the media type it declares and where it lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub name: String,
    pub media_type: Option<String>,
    path: PathBuf,
}

impl FileHandle {
    /// Declared media type is derived from the extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let media_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(media_type_for_extension)
            .map(str::to_string);
        Self {
            name: file_name(&path),
            media_type,
            path,
        }
    }

    pub fn with_media_type<P: AsRef<Path>>(path: P, media_type: Option<&str>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: file_name(&path),
            media_type: media_type.map(str::to_string),
            path,
        }
    }

    /// Accepted when declared `text/plain` or named `*.txt`
    pub fn is_plain_text(&self) -> bool {
        self.media_type.as_deref() == Some(PLAIN_TEXT) || self.name.ends_with(".txt")
    }

    /// Reject before any read is attempted
    pub fn check_supported(&self) -> Result<(), InputError> {
        if self.is_plain_text() {
            Ok(())
        } else {
            Err(InputError::UnsupportedFileType {
                name: self.name.clone(),
                media_type: self.media_type.clone(),
            })
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn media_type_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_lowercase().as_str() {
        "txt" | "text" | "log" => Some(PLAIN_TEXT),
        "md" | "markdown" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        "html" | "htm" => Some("text/html"),
        "json" => Some("application/json"),
        "yaml" | "yml" => Some("application/yaml"),
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        _ => None,
    }
}

/// Read the whole file as text. Invalid UTF-8 is replaced, not rejected.
pub async fn read_text(file: &FileHandle) -> Result<String, InputError> {
    file.check_supported()?;

    debug!(name = %file.name, "reading requirements file");
    let bytes = tokio::fs::read(&file.path)
        .await
        .map_err(|e| InputError::FileRead {
            name: file.name.clone(),
            reason: e.to_string(),
        })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
