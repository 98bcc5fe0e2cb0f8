//! Download, verification and deletion of a single secure file.
//!
//! A download mirrors the file's logical name under a working directory,
//! streams the body straight to disk, applies the permission class and then
//! checks the SHA-256 of what landed on disk against the recorded checksum.

use crate::api_client::{SecureFilesClient, ensure_success};
use crate::error::{SecureFilesError, SecureFilesResult};
use crate::types::{DownloadOutcome, FileMode, PermissionClass, SecureFileRecord};
use reqwest::Method;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// One remote secure file, bound to the client that listed it.
pub struct SecureFile<'a> {
    client: &'a SecureFilesClient,
    file: SecureFileRecord,
}

impl<'a> SecureFile<'a> {
    pub fn new(file: SecureFileRecord, client: &'a SecureFilesClient) -> Self {
        Self { client, file }
    }

    pub fn file(&self) -> &SecureFileRecord {
        &self.file
    }

    pub fn client(&self) -> &'a SecureFilesClient {
        self.client
    }

    pub fn file_url(&self) -> String {
        format!("{}/{}", self.client.base_url(), self.file.id)
    }

    /// Directory part of the logical name, relative and with its trailing
    /// slash: `/a/b/file` gives `a/b/`, `file` gives an empty string.
    pub fn destination_file_path(&self) -> &str {
        let name = self.file.name.as_str();
        let directory = match name.rfind('/') {
            Some(idx) => &name[..=idx],
            None => "",
        };
        directory.trim_start_matches('/')
    }

    /// Full local path of the file under `working_directory`.
    pub fn destination(&self, working_directory: &Path) -> SecureFilesResult<PathBuf> {
        let relative = self.file.name.trim_start_matches('/');
        let filename = relative.rsplit('/').next().unwrap_or_default();

        if filename.is_empty() || relative.split('/').any(|segment| segment == "..") {
            return Err(SecureFilesError::InvalidName(self.file.name.clone()));
        }

        Ok(working_directory.join(relative))
    }

    /// Creates `working_directory/destination_file_path()` and any missing
    /// parents. Succeeds if the directory already exists.
    pub async fn create_subfolders(&self, working_directory: &Path) -> SecureFilesResult<PathBuf> {
        self.destination(working_directory)?;

        let directory = working_directory.join(self.destination_file_path());
        tokio::fs::create_dir_all(&directory).await?;
        Ok(directory)
    }

    /// True iff the SHA-256 of the file at `path` equals the recorded checksum
    /// exactly (case-sensitive).
    pub async fn valid_checksum(&self, path: &Path) -> SecureFilesResult<bool> {
        Ok(self.checksum_status(path).await?.0)
    }

    /// Whether the file at `path` matches the recorded checksum, along with
    /// the checksum actually computed.
    async fn checksum_status(&self, path: &Path) -> SecureFilesResult<(bool, String)> {
        let actual = compute_checksum(path).await?;
        Ok((actual == self.file.checksum, actual))
    }

    pub fn file_mode(&self) -> FileMode {
        self.file.permissions.file_mode()
    }

    pub async fn set_file_permissions(
        &self,
        path: &Path,
        permissions: PermissionClass,
    ) -> SecureFilesResult<()> {
        let mode = permissions.file_mode();
        let mut perms = tokio::fs::metadata(path).await?.permissions();

        #[cfg(unix)]
        perms.set_mode(mode.apply(perms.mode()));
        #[cfg(not(unix))]
        perms.set_readonly(!mode.owner_writable());

        tokio::fs::set_permissions(path, perms).await?;
        debug!("set mode {mode} on {}", path.display());
        Ok(())
    }

    /// Downloads the file into `working_directory` and verifies it.
    ///
    /// A failed request is logged and returned as [`DownloadOutcome::Failed`]
    /// without touching the checksum. A checksum mismatch returns
    /// [`SecureFilesError::IntegrityFailure`] and leaves the file in place.
    pub async fn download(
        &self,
        working_directory: impl AsRef<Path>,
    ) -> SecureFilesResult<DownloadOutcome> {
        let working_directory = working_directory.as_ref();
        let destination = self.destination(working_directory)?;

        self.create_subfolders(working_directory).await?;
        restore_owner_write(&destination).await?;

        let mut saved_file = File::create(&destination).await?;
        let url = format!("{}/download", self.file_url());

        let written = match self.stream_to(&url, &mut saved_file).await {
            Ok(written) => written,
            Err(e @ (SecureFilesError::Http(_) | SecureFilesError::Api { .. })) => {
                error!("unable to download {}: {e}", self.file.name);
                return Ok(DownloadOutcome::Failed {
                    name: self.file.name.clone(),
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };
        drop(saved_file);

        self.set_file_permissions(&destination, self.file.permissions)
            .await?;

        let (valid, actual) = self.checksum_status(&destination).await?;
        if !valid {
            error!("checksum validation failed for {}", self.file.name);
            return Err(SecureFilesError::IntegrityFailure {
                name: self.file.name.clone(),
                expected: self.file.checksum.clone(),
                actual,
            });
        }

        info!("downloaded {} ({written} bytes)", self.file.name);
        Ok(DownloadOutcome::Verified { path: destination })
    }

    pub async fn delete(&self) -> SecureFilesResult<()> {
        self.client.delete(&self.file.id).await
    }

    async fn stream_to(&self, url: &str, saved_file: &mut File) -> SecureFilesResult<u64> {
        let mut resp = ensure_success(self.client.execute_request(url, Method::GET).await?)?;

        let mut written: u64 = 0;
        while let Some(chunk) = resp.chunk().await? {
            saved_file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        saved_file.flush().await?;

        Ok(written)
    }
}

/// Hex-encoded SHA-256 of a file, read in 64KB blocks.
pub async fn compute_checksum(path: &Path) -> SecureFilesResult<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let bytes_read = file.read(&mut buffer).await?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// A previous sync may have left the destination owner read-only.
async fn restore_owner_write(path: &Path) -> SecureFilesResult<()> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let mut perms = metadata.permissions();

    #[cfg(unix)]
    {
        if perms.mode() & 0o200 != 0 {
            return Ok(());
        }
        perms.set_mode(perms.mode() | 0o200);
    }
    #[cfg(not(unix))]
    {
        if !perms.readonly() {
            return Ok(());
        }
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
    }

    warn!("restoring owner write on {}", path.display());
    tokio::fs::set_permissions(path, perms).await?;
    Ok(())
}
