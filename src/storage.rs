//! Upload directory: accepted file types, safe filenames, reports and charts.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Spreadsheet extensions accepted for upload.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["xls", "xlsx", "csv"];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File type not allowed: {0}")]
    NotAllowed(String),

    #[error("Invalid filename: {0:?}")]
    UnsafeName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether `filename` has an accepted spreadsheet extension.
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

/// Reduce a client-supplied filename to a safe, flat ASCII name.
///
/// Path separators become word breaks, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9_.-]` is dropped, and leading or trailing `.` and `_`
/// are trimmed. The result may be empty.
///
/// ```
/// use tree_carbon::storage::secure_filename;
/// assert_eq!(secure_filename("My trees 2024.xlsx"), "My_trees_2024.xlsx");
/// assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
/// ```
pub fn secure_filename(filename: &str) -> String {
    let spaced: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-'))
        .collect::<String>()
        .trim_matches(|c: char| c == '.' || c == '_')
        .to_string()
}

/// Name of the CSV report generated for an uploaded file.
pub fn report_filename(upload: &str) -> String {
    format!("carbon_sequestration_results_{}.csv", upload)
}

/// Name of the chart generated for an uploaded file.
pub fn chart_filename(upload: &str) -> String {
    let stem = Path::new(upload)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(upload);
    format!("carbon_graph_{}.svg", stem)
}

/// MIME type served for a stored file.
pub fn content_type(filename: &str) -> &'static str {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" => "text/csv; charset=utf-8",
        "svg" => "image/svg+xml",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

/// A flat directory holding uploads and generated files.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.root)?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a name that is already safe. Names that would change under
    /// [`secure_filename`] are rejected rather than rewritten.
    pub fn path_of(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let safe = secure_filename(filename);
        if safe.is_empty() || safe != filename {
            return Err(StorageError::UnsafeName(filename.to_string()));
        }
        Ok(self.root.join(safe))
    }

    /// Store an uploaded spreadsheet under its sanitized name.
    ///
    /// Returns the name the file was stored under.
    pub fn save_upload(&self, filename: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if !allowed_file(filename) {
            return Err(StorageError::NotAllowed(filename.to_string()));
        }
        let safe = secure_filename(filename);
        if safe.is_empty() || !allowed_file(&safe) {
            return Err(StorageError::UnsafeName(filename.to_string()));
        }
        self.write(&safe, bytes)?;
        tracing::debug!(file = %safe, bytes = bytes.len(), "upload saved");
        Ok(safe)
    }

    /// Write a generated file.
    pub fn write(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, StorageError> {
        self.ensure()?;
        let path = self.path_of(filename)?;
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Read a stored file for download.
    pub fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError> {
        let path = self
            .path_of(filename)
            .map_err(|_| StorageError::NotFound(filename.to_string()))?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
