//! Account provisioning from a JSON seed file at startup.
//!
//! The file holds an array of accounts:
//!
//! ```json
//! [{ "email": "root@example.test", "password": "change me now", "name": "Root", "role": "admin" }]
//! ```
//!
//! Accounts whose email is already registered are skipped, so restarting
//! against a persistent store is harmless.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::ports::{CredentialVerifier, UserRepository};
use crate::domain::{AccountService, ErrorCode, NewUser};

/// Errors returned while loading or applying a seed file.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read seed file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not a JSON array of accounts.
    #[error("seed file at {path} is malformed: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// An account was rejected for a reason other than already existing.
    #[error("failed to provision {email}: {source}")]
    Provision {
        email: String,
        #[source]
        source: crate::domain::Error,
    },
}

/// Read the accounts listed in the seed file at `path`.
pub fn load_seed_file(path: &Path) -> Result<Vec<NewUser>, SeedError> {
    let read_error = |source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "seed path must name a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    let payload = dir.read(Path::new(file_name)).map_err(read_error)?;
    serde_json::from_slice(&payload).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Register every account in `accounts`, skipping emails already present.
///
/// Returns the number of accounts created.
pub async fn seed_accounts<R, C>(
    service: &AccountService<R, C>,
    accounts: Vec<NewUser>,
) -> Result<usize, SeedError>
where
    R: UserRepository,
    C: CredentialVerifier,
{
    let mut created = 0;
    for account in accounts {
        let email = account.email.clone();
        match service.register(account).await {
            Ok(user) => {
                info!(user_id = %user.id(), role = %user.role(), "seed account created");
                created += 1;
            }
            Err(err) if err.code() == ErrorCode::Conflict => {
                warn!(email = %email, "seed account already exists; skipping");
            }
            Err(source) => return Err(SeedError::Provision { email, source }),
        }
    }
    Ok(created)
}
