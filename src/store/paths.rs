//! Pfadkonvention für Identitäten
//!
//! Der Public Key liegt immer als `gid.pem` im selben Verzeichnis wie der
//! Private Key, unabhängig von dessen Dateinamen.

use std::path::{Path, PathBuf};

/// Dateiname des Public Keys neben dem Private Key
pub const PUBLIC_KEY_FILE_NAME: &str = "gid.pem";

/// Private-Key-Pfad und zugehöriger `gid.pem` Pfad
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPaths {
    private_key: PathBuf,
    public_key: PathBuf,
}

impl IdentityPaths {
    pub fn for_private_key(path: impl AsRef<Path>) -> Self {
        let private_key = path.as_ref().to_path_buf();
        let public_key = private_key
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(PUBLIC_KEY_FILE_NAME);

        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &Path {
        &self.private_key
    }

    pub fn public_key(&self) -> &Path {
        &self.public_key
    }

    /// `true` wenn der Private Key selbst `gid.pem` heißt
    pub fn is_collapsed(&self) -> bool {
        self.private_key == self.public_key
    }

    /// `true` wenn der Pfad mit einem Dateinamen endet
    ///
    /// `Path::file_name` normalisiert `c/` und `c/.` zu `c`, das
    /// Dateisystem behandelt beide aber als Verzeichnis.
    pub fn names_file(&self) -> bool {
        let raw = self.private_key.as_os_str().to_string_lossy();
        match self.private_key.file_name() {
            Some(name) => raw.ends_with(&*name.to_string_lossy()),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_is_sibling() {
        let paths = IdentityPaths::for_private_key("/tmp/x/secret.pem");
        assert_eq!(paths.private_key(), Path::new("/tmp/x/secret.pem"));
        assert_eq!(paths.public_key(), Path::new("/tmp/x/gid.pem"));
        assert!(!paths.is_collapsed());
    }

    #[test]
    fn test_bare_file_name_stays_relative() {
        let paths = IdentityPaths::for_private_key("id.pem");
        assert_eq!(paths.public_key(), Path::new("gid.pem"));
    }

    #[test]
    fn test_private_key_named_gid_pem_collapses() {
        assert!(IdentityPaths::for_private_key("keys/gid.pem").is_collapsed());
        assert!(IdentityPaths::for_private_key("gid.pem").is_collapsed());
    }

    #[test]
    fn test_names_file() {
        assert!(IdentityPaths::for_private_key("keys/id.pem").names_file());
        assert!(IdentityPaths::for_private_key("id").names_file());

        for path in ["keys/id/", "keys/id/.", "keys/..", "/", ""] {
            assert!(!IdentityPaths::for_private_key(path).names_file(), "{path}");
        }
    }
}
