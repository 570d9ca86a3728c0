//! On-disk storage for request attachments.
//!
//! Files live under `<root>/<company_id>/<uuid>`; the original file name is only
//! kept in the database. Stored names are generated here and never derived from
//! user input.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};

const MAX_FILE_NAME_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub stored_name: String,
    pub sha256: String,
    pub size_bytes: usize,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, company_id: i64, stored_name: &str) -> AppResult<PathBuf> {
        if Uuid::parse_str(stored_name).is_err() {
            return Err(AppError::Internal(format!("malformed stored name `{stored_name}`")));
        }
        Ok(self.root.join(company_id.to_string()).join(stored_name))
    }

    pub async fn save(&self, company_id: i64, bytes: &[u8]) -> AppResult<StoredFile> {
        let stored_name = Uuid::new_v4().to_string();
        let path = self.path_for(company_id, &stored_name)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        write_or_discard(&path, bytes).await?;
        debug!(path = %path.display(), size = bytes.len(), "attachment written");

        Ok(StoredFile {
            stored_name,
            sha256: hex::encode(Sha256::digest(bytes)),
            size_bytes: bytes.len(),
        })
    }

    pub async fn read(&self, company_id: i64, stored_name: &str) -> AppResult<Vec<u8>> {
        let path = self.path_for(company_id, stored_name)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "attachment row exists but file is missing");
                Err(AppError::NotFound("attachment file"))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Removes a stored file; a file that is already gone is not an error.
    pub async fn remove(&self, company_id: i64, stored_name: &str) -> AppResult<()> {
        let path = self.path_for(company_id, stored_name)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Removes a stored file whose database row is already gone. Failures are logged,
    /// not returned.
    pub async fn discard(&self, company_id: i64, stored_name: &str) {
        if let Err(err) = self.remove(company_id, stored_name).await {
            warn!(company_id, stored_name, error = %err, "orphaned attachment file left on disk");
        }
    }
}

/// Writes `bytes` to `path`, deleting whatever was written when the write fails.
async fn write_or_discard(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let Err(err) = fs::write(path, bytes).await else {
        return Ok(());
    };
    match fs::remove_file(path).await {
        Ok(()) => {}
        Err(cleanup) if cleanup.kind() == std::io::ErrorKind::NotFound => {}
        Err(cleanup) => warn!(path = %path.display(), error = %cleanup, "partial attachment left on disk"),
    }
    Err(err)
}

/// Reduces a client-supplied file name to its final path component with control
/// characters and quotes removed. Returns `None` when nothing usable is left.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control() && !matches!(c, '"' | '<' | '>' | ':' | '|' | '?' | '*'))
        .take(MAX_FILE_NAME_CHARS)
        .collect();
    let cleaned = cleaned.trim().trim_start_matches('.').trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
