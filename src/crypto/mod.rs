//! Crypto Module - Ed25519 Identität und Key Codec
//!
//! Dieses Modul enthält:
//! - `Identity`: das Ed25519 Schlüsselpaar des Benutzers
//! - `codec`: PEM Kodierung (PKCS#8 / SubjectPublicKeyInfo)
//!

pub mod codec;
mod identity;

pub use codec::{CodecError, KeyClass, KeyMaterial};
pub use identity::{Identity, PublicKeySummary};
