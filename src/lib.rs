//! git-id - Ed25519 Identitäten in Git-Repositories
//!
//! Verwaltet eine einzelne Ed25519 Identität:
//! - Generierung und sichere Speicherung als PEM (PKCS#8 / SPKI)
//! - Laden einer bestehenden Identität
//! - Abrufen fremder Public Keys aus `gid.pem` in einem Git-Repository
//!
//! ## Verwendung
//! ```rust,no_run
//! use git_id::{remote, store};
//!
//! let identity = store::load_or_create("keys/id.pem")?;
//! println!("Public key: {}", identity.public_key_hex());
//!
//! let friend = remote::fetch_public_key("user/repo", remote::DEFAULT_REF, remote::DEFAULT_KEY_PATH)?;
//! println!("Friend: {}", hex::encode(friend.to_bytes()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod crypto;
pub mod remote;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::{ConfigError, Settings};
pub use crypto::{CodecError, Identity, KeyClass, KeyMaterial, PublicKeySummary};
pub use remote::{FetchError, RemoteKeyFetcher};
pub use store::{IdentityPaths, StoreError};

// ============================================================================
// LOGGING
// ============================================================================

/// Initialisiert das Logging auf stderr
///
/// Filter über `RUST_LOG`, Standard ist `git_id=info`. Mehrfache Aufrufe
/// sind erlaubt.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("git_id=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
