//! Remote Module - Public Keys anderer Benutzer
//!
//! Dieses Modul lädt veröffentlichte `gid.pem` Dateien per HTTP:
//! - URL-Konvention `{base}/{handler}/{ref}/{key_path}`
//! - Dekodierung über den Key Codec
//!

mod fetcher;

pub use fetcher::{
    fetch_public_key, FetchError, RemoteKeyFetcher, DEFAULT_KEY_PATH, DEFAULT_RAW_BASE_URL,
    DEFAULT_REF,
};
