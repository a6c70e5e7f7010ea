use std::path::Path;

use anyhow::{anyhow, Context, Result};
use shared::domain::{ContractFields, ContractId};

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A local document chosen for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceFile")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first_raw()
            .unwrap_or(FALLBACK_MIME_TYPE)
            .to_string();
        Self {
            filename,
            mime_type,
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("'{}' does not name a file", path.display()))?
            .to_string();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Ok(Self::new(filename, bytes))
    }
}

/// Result of a successful upload-and-extract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedContract {
    pub id: ContractId,
    pub fields: ContractFields,
    pub message: Option<String>,
}
