//! Transient on-disk storage of the remote login password
//!
//! `sshpass -f` reads the password from a file, so the secret has to touch the disk for the
//! duration of the run. [`CredentialFile`] keeps that window as small as possible: the file is
//! created with owner-only permissions right before it is needed and removed when the guard is
//! dropped, regardless of how the enclosing scope is left.

use anyhow::Context;
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Well-known location read by the login command
pub const DEFAULT_CREDENTIAL_PATH: &str = "/tmp/temp.pass";

/// Guard owning the credential file; the file is removed on drop
#[derive(Debug)]
pub struct CredentialFile {
    path: std::path::PathBuf,
}

impl CredentialFile {
    /// Write `secret` to `path` with mode 0600, replacing any previous content
    pub fn create(path: &std::path::Path, secret: &str) -> anyhow::Result<Self> {
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .with_context(|| format!("failed creating credential file {:?}", path))?;
        // arm the guard before anything else can fail so the file never outlives this call
        let guard = Self {
            path: path.to_path_buf(),
        };
        // mode() only applies to newly created files
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("failed restricting permissions of {:?}", path))?;
        file.write_all(secret.as_bytes())
            .with_context(|| format!("failed writing credential file {:?}", path))?;
        tracing::debug!("stored login credential in {:?}", path);
        Ok(guard)
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Drop for CredentialFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!("removed credential file {:?}", &self.path),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                tracing::error!(
                    "failed removing credential file {:?}: {}",
                    &self.path,
                    error
                );
            }
        }
    }
}
