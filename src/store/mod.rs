//! Store Module - Lokale Speicherung der Identität
//!
//! Dieses Modul verwaltet die Identität im Dateisystem:
//! - Erstellen mit Schutz vor versehentlichem Überschreiben
//! - Laden und Ableiten des Public Keys
//! - Pfadkonvention `dirname(private key)/gid.pem`
//!

mod local;
mod paths;

pub use local::{create, load, load_or_create, read_public_key, StoreError};
pub use paths::{IdentityPaths, PUBLIC_KEY_FILE_NAME};
