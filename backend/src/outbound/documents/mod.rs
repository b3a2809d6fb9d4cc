//! Capability-sandboxed document storage.
//!
//! Documents are written below a single root directory opened once through
//! `cap_std`; stored paths are relative to that root and can never escape it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use uuid::Uuid;

use crate::domain::ports::{DocumentStore, DocumentStoreError};
use crate::domain::{EntryId, UserId};

const MAX_FILE_NAME_LEN: usize = 128;

/// Reject names that are empty, hidden, or carry anything but a plain file
/// name made of ASCII alphanumerics, `.`, `-`, and `_`.
fn validate_file_name(raw: &str) -> Result<&str, DocumentStoreError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DocumentStoreError::invalid_name("file name must not be empty"));
    }
    if name.len() > MAX_FILE_NAME_LEN {
        return Err(DocumentStoreError::invalid_name(format!(
            "file name must be at most {MAX_FILE_NAME_LEN} bytes"
        )));
    }
    if name.starts_with('.') {
        return Err(DocumentStoreError::invalid_name(
            "file name must not start with '.'",
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(DocumentStoreError::invalid_name(
            "file name may only contain letters, digits, '.', '-', and '_'",
        ));
    }
    Ok(name)
}

/// [`DocumentStore`] writing below a `cap_std` directory handle.
#[derive(Clone)]
pub struct CapStdDocumentStore {
    root: Arc<Dir>,
}

impl CapStdDocumentStore {
    /// Open (creating if needed) the storage root.
    ///
    /// # Errors
    /// Returns an I/O error when the directory cannot be created or opened.
    pub fn open(root: &Path) -> std::io::Result<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            root: Arc::new(dir),
        })
    }
}

#[async_trait]
impl DocumentStore for CapStdDocumentStore {
    async fn store(
        &self,
        patient_id: &UserId,
        entry_id: &EntryId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, DocumentStoreError> {
        let name = validate_file_name(file_name)?;
        let directory = PathBuf::from(patient_id.to_string()).join(entry_id.to_string());
        let relative = directory.join(format!("{}-{name}", Uuid::new_v4().simple()));
        let root = Arc::clone(&self.root);
        let target = relative.clone();

        tokio::task::spawn_blocking(move || {
            root.create_dir_all(&directory)?;
            root.write(&target, &bytes)
        })
        .await
        .map_err(|err| DocumentStoreError::io(format!("storage task failed: {err}")))?
        .map_err(|err| DocumentStoreError::io(err.to_string()))?;

        Ok(relative.to_string_lossy().replace('\\', "/"))
    }

    async fn discard(&self, path: &str) -> Result<(), DocumentStoreError> {
        let root = Arc::clone(&self.root);
        let target = PathBuf::from(path);

        tokio::task::spawn_blocking(move || match root.remove_file(&target) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        })
        .await
        .map_err(|err| DocumentStoreError::io(format!("storage task failed: {err}")))?
        .map_err(|err| DocumentStoreError::io(err.to_string()))
    }
}
