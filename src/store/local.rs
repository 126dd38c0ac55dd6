//! Lokaler Identity Store
//!
//! Erstellt, speichert und lädt die Identität im Dateisystem.
//! - Private Key: PKCS#8 PEM unter dem gewählten Pfad (0600)
//! - Public Key: SPKI PEM als `gid.pem` im selben Verzeichnis (0600)
//! - Neue Verzeichnisse werden mit 0700 angelegt
//!
//! Bestehende Dateien werden nur mit `overwrite = true` ersetzt. Schlägt das
//! Schreiben des Public Keys fehl, bleibt der bereits geschriebene Private Key
//! liegen; ein erneuter Aufruf mit `overwrite = true` stellt das Paar wieder her.
//!
//! ## Verwendung
//! ```rust,no_run
//! let identity = git_id::store::load_or_create("keys/id.pem")?;
//! println!("{}", identity.public_key_hex());
//! # Ok::<(), git_id::store::StoreError>(())
//! ```

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use ed25519_dalek::VerifyingKey;
use thiserror::Error;

use super::paths::IdentityPaths;
use crate::crypto::{codec, CodecError, Identity};

#[cfg(unix)]
const DIR_MODE: u32 = 0o700;
#[cfg(unix)]
const KEY_FILE_MODE: u32 = 0o600;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Path conflict at {}: {reason}", .path.display())]
    PathConflict { path: PathBuf, reason: &'static str },

    #[error("File {} already exists", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid key file {}: {source}", .path.display())]
    Codec {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

impl StoreError {
    /// Unveränderter Codec-Fehler, falls der Inhalt nicht dekodierbar war
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            StoreError::Codec { source, .. } => Some(source),
            _ => None,
        }
    }

    fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| StoreError::Io {
            action,
            path,
            source,
        }
    }

    fn codec(path: &Path) -> impl FnOnce(CodecError) -> Self {
        let path = path.to_path_buf();
        move |source| StoreError::Codec { path, source }
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Erstellt eine neue Identität unter `path` und `dirname(path)/gid.pem`
///
/// Ohne `overwrite` schlägt der Aufruf fehl, sobald eine der beiden Dateien
/// existiert. Verzeichnisse an einem der Pfade sind immer ein Fehler.
pub fn create(path: impl AsRef<Path>, overwrite: bool) -> Result<Identity, StoreError> {
    let paths = IdentityPaths::for_private_key(path);

    if !paths.names_file() {
        return Err(StoreError::PathConflict {
            path: paths.private_key().to_path_buf(),
            reason: "path does not name a file",
        });
    }
    if paths.is_collapsed() {
        return Err(StoreError::PathConflict {
            path: paths.private_key().to_path_buf(),
            reason: "private key would overwrite the public key file",
        });
    }
    check_target(paths.private_key(), overwrite)?;
    check_target(paths.public_key(), overwrite)?;
    tracing::debug!("Identity paths validated: {:?}", paths);

    ensure_parent_dir(paths.private_key())?;
    tracing::debug!("Directory ready for {:?}", paths.private_key());

    let identity = Identity::generate();
    tracing::debug!("Generated keypair {}", identity.public_key_hex());

    let private_pem = identity
        .private_key_pem()
        .map_err(StoreError::codec(paths.private_key()))?;
    let public_pem = identity
        .public_key_pem()
        .map_err(StoreError::codec(paths.public_key()))?;

    write_key_file(paths.private_key(), private_pem.as_bytes())?;
    write_key_file(paths.public_key(), public_pem.as_bytes())?;

    tracing::info!(
        "Created identity {} at {:?} (public key {:?})",
        identity.public_key_hex(),
        paths.private_key(),
        paths.public_key()
    );
    Ok(identity)
}

/// Lädt eine bestehende Identität aus einer PKCS#8 PEM-Datei
pub fn load(path: impl AsRef<Path>) -> Result<Identity, StoreError> {
    let path = path.as_ref();

    let pem = fs::read(path).map_err(StoreError::io("read identity file", path))?;
    let identity = Identity::from_private_pem(&pem).map_err(StoreError::codec(path))?;

    tracing::info!("Loaded identity {} from {:?}", identity.public_key_hex(), path);
    Ok(identity)
}

/// Lädt die Identität, oder erstellt sie falls `path` nicht existiert
///
/// Überschreibt niemals bestehende Dateien.
pub fn load_or_create(path: impl AsRef<Path>) -> Result<Identity, StoreError> {
    let path = path.as_ref();

    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(StoreError::PathConflict {
            path: path.to_path_buf(),
            reason: "is a directory, not a file",
        }),
        Ok(_) => {
            tracing::info!("Loading existing identity from {:?}", path);
            load(path)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!("Generating new identity at {:?}", path);
            create(path, false)
        }
        Err(source) => Err(StoreError::Io {
            action: "inspect",
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Lädt einen Public Key (`gid.pem`) aus einer lokalen Datei
pub fn read_public_key(path: impl AsRef<Path>) -> Result<VerifyingKey, StoreError> {
    let path = path.as_ref();

    let pem = fs::read(path).map_err(StoreError::io("read public key file", path))?;
    codec::decode_public_key(&pem).map_err(StoreError::codec(path))
}

// ============================================================================
// FILESYSTEM HELPERS
// ============================================================================

fn check_target(path: &Path, overwrite: bool) -> Result<(), StoreError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Err(StoreError::PathConflict {
            path: path.to_path_buf(),
            reason: "is a directory, not a file",
        }),
        Ok(_) if !overwrite => Err(StoreError::AlreadyExists {
            path: path.to_path_buf(),
        }),
        Ok(_) => {
            tracing::warn!("Overwriting existing key file {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StoreError::Io {
            action: "inspect",
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), StoreError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    if parent.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder
        .create(parent)
        .map_err(StoreError::io("create directory", parent))
}

fn write_key_file(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(KEY_FILE_MODE);
    }

    let mut file = options
        .open(path)
        .map_err(StoreError::io("open key file", path))?;

    // mode() greift nur beim Anlegen, überschriebene Dateien behalten sonst ihre Rechte
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(KEY_FILE_MODE))
            .map_err(StoreError::io("restrict permissions of", path))?;
    }

    file.write_all(contents)
        .map_err(StoreError::io("write key file", path))?;
    file.sync_all()
        .map_err(StoreError::io("sync key file", path))?;

    tracing::debug!("Wrote {} bytes to {:?}", contents.len(), path);
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
