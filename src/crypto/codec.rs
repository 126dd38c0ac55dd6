//! Key Codec - PEM Kodierung für Ed25519 Schlüssel
//!
//! Wandelt Ed25519 Schlüssel in PEM-Container um und zurück:
//! - Private Key: PKCS#8 v1 `PrivateKeyInfo` im Block `PRIVATE KEY`
//! - Public Key: `SubjectPublicKeyInfo` im Block `PUBLIC KEY`
//!
//! Die Ausgabe ist bitgleich zu dem, was andere Ed25519-Implementierungen
//! (OpenSSL, Go `crypto/x509`) schreiben, damit `gid.pem` Dateien
//! austauschbar bleiben.
//!
//! ## Verwendung
//! ```rust
//! use ed25519_dalek::SigningKey;
//! use git_id::crypto::codec;
//!
//! let signing_key = SigningKey::from_bytes(&[7u8; 32]);
//! let pem = codec::encode_private_key(&signing_key)?;
//! let decoded = codec::decode_private_key(&pem)?;
//! assert_eq!(decoded.to_bytes(), signing_key.to_bytes());
//! # Ok::<(), git_id::crypto::CodecError>(())
//! ```

use std::fmt;

use ed25519_dalek::pkcs8::KeypairBytes;
use ed25519_dalek::{SigningKey, VerifyingKey};
use pem_rfc7468::LineEnding;
use pkcs8::der::asn1::ObjectIdentifier;
use pkcs8::der::Decode;
use pkcs8::spki::SubjectPublicKeyInfoRef;
use pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, PrivateKeyInfo};
use thiserror::Error;

/// PEM Label für PKCS#8 Private Keys
pub const PRIVATE_KEY_LABEL: &str = "PRIVATE KEY";

/// PEM Label für SubjectPublicKeyInfo Public Keys
pub const PUBLIC_KEY_LABEL: &str = "PUBLIC KEY";

/// Algorithmus-OID für Ed25519 (RFC 8410)
pub const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

const PEM_BEGIN: &str = "-----BEGIN ";
const PEM_END: &str = "-----END ";
const PEM_DASHES: &str = "-----";

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// PEM-Rahmen fehlt oder Inhalt ist kein gültiges DER
    #[error("Failed to decode key container: {0}")]
    Decode(String),

    /// Schlüssel ist kein Ed25519 oder hat die falsche Klasse
    #[error("Unexpected key type: {0}")]
    KeyType(String),

    #[error("Failed to encode key container: {0}")]
    Encode(String),
}

// ============================================================================
// KEY MATERIAL
// ============================================================================

/// Klasse eines Schlüssels, bestimmt durch das PEM Label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Private,
    Public,
}

impl KeyClass {
    /// PEM Label dieser Klasse
    pub fn label(self) -> &'static str {
        match self {
            KeyClass::Private => PRIVATE_KEY_LABEL,
            KeyClass::Public => PUBLIC_KEY_LABEL,
        }
    }

    fn from_label(label: &str) -> Result<Self, CodecError> {
        match label {
            PRIVATE_KEY_LABEL => Ok(KeyClass::Private),
            PUBLIC_KEY_LABEL => Ok(KeyClass::Public),
            // z.B. "RSA PRIVATE KEY", "EC PRIVATE KEY"
            other if other.ends_with(PRIVATE_KEY_LABEL) || other.ends_with(PUBLIC_KEY_LABEL) => {
                Err(CodecError::KeyType(format!(
                    "unsupported key container `{other}`, expected Ed25519 in PKCS#8 or SPKI"
                )))
            }
            other => Err(CodecError::Decode(format!(
                "PEM block `{other}` does not hold a key"
            ))),
        }
    }
}

impl fmt::Display for KeyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyClass::Private => write!(f, "private key"),
            KeyClass::Public => write!(f, "public key"),
        }
    }
}

/// Dekodierter Schlüssel, getaggt nach Klasse
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    Private(SigningKey),
    Public(VerifyingKey),
}

impl KeyMaterial {
    pub fn class(&self) -> KeyClass {
        match self {
            KeyMaterial::Private(_) => KeyClass::Private,
            KeyMaterial::Public(_) => KeyClass::Public,
        }
    }

    /// Public Key, bei Private Keys abgeleitet
    pub fn verifying_key(&self) -> VerifyingKey {
        match self {
            KeyMaterial::Private(signing_key) => signing_key.verifying_key(),
            KeyMaterial::Public(verifying_key) => *verifying_key,
        }
    }
}

// ============================================================================
// ENCODING
// ============================================================================

/// Kodiert einen Private Key als PKCS#8 PEM (`PRIVATE KEY`)
///
/// Geschrieben wird PKCS#8 v1 ohne eingebetteten Public Key, wie es auch
/// OpenSSL und Go tun.
pub fn encode_private_key(signing_key: &SigningKey) -> Result<String, CodecError> {
    let keypair_bytes = KeypairBytes {
        secret_key: signing_key.to_bytes(),
        public_key: None,
    };

    let der = keypair_bytes
        .to_pkcs8_der()
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    wrap_pem(KeyClass::Private, der.as_bytes())
}

/// Kodiert einen Public Key als SPKI PEM (`PUBLIC KEY`)
pub fn encode_public_key(verifying_key: &VerifyingKey) -> Result<String, CodecError> {
    let der = verifying_key
        .to_public_key_der()
        .map_err(|e| CodecError::Encode(e.to_string()))?;

    wrap_pem(KeyClass::Public, der.as_bytes())
}

fn wrap_pem(class: KeyClass, der: &[u8]) -> Result<String, CodecError> {
    pem_rfc7468::encode_string(class.label(), LineEnding::LF, der)
        .map_err(|e| CodecError::Encode(e.to_string()))
}

// ============================================================================
// DECODING
// ============================================================================

/// Dekodiert den ersten PEM-Block und liefert den getaggten Schlüssel
///
/// Text vor und nach dem Block wird ignoriert.
pub fn decode_key(text: impl AsRef<[u8]>) -> Result<KeyMaterial, CodecError> {
    let text = std::str::from_utf8(text.as_ref())
        .map_err(|_| CodecError::Decode("key container is not valid UTF-8".to_string()))?;

    let block = first_block(text)
        .ok_or_else(|| CodecError::Decode("no PEM block found".to_string()))?;

    let (label, der) = pem_rfc7468::decode_vec(block.as_bytes())
        .map_err(|e| CodecError::Decode(format!("malformed PEM block: {e}")))?;

    match KeyClass::from_label(label)? {
        KeyClass::Private => decode_private_der(&der).map(KeyMaterial::Private),
        KeyClass::Public => decode_public_der(&der).map(KeyMaterial::Public),
    }
}

/// Dekodiert einen Ed25519 Private Key aus PEM
pub fn decode_private_key(text: impl AsRef<[u8]>) -> Result<SigningKey, CodecError> {
    match decode_key(text)? {
        KeyMaterial::Private(signing_key) => Ok(signing_key),
        other => Err(unexpected_class(KeyClass::Private, other.class())),
    }
}

/// Dekodiert einen Ed25519 Public Key aus PEM
pub fn decode_public_key(text: impl AsRef<[u8]>) -> Result<VerifyingKey, CodecError> {
    match decode_key(text)? {
        KeyMaterial::Public(verifying_key) => Ok(verifying_key),
        other => Err(unexpected_class(KeyClass::Public, other.class())),
    }
}

fn decode_private_der(der: &[u8]) -> Result<SigningKey, CodecError> {
    let info = PrivateKeyInfo::from_der(der)
        .map_err(|e| CodecError::Decode(format!("malformed PKCS#8 structure: {e}")))?;
    ensure_ed25519(KeyClass::Private, info.algorithm.oid)?;

    SigningKey::from_pkcs8_der(der)
        .map_err(|e| CodecError::Decode(format!("invalid Ed25519 private key: {e}")))
}

fn decode_public_der(der: &[u8]) -> Result<VerifyingKey, CodecError> {
    let info = SubjectPublicKeyInfoRef::from_der(der)
        .map_err(|e| CodecError::Decode(format!("malformed SubjectPublicKeyInfo: {e}")))?;
    ensure_ed25519(KeyClass::Public, info.algorithm.oid)?;

    VerifyingKey::from_public_key_der(der)
        .map_err(|e| CodecError::Decode(format!("invalid Ed25519 public key: {e}")))
}

fn ensure_ed25519(class: KeyClass, oid: ObjectIdentifier) -> Result<(), CodecError> {
    if oid != ED25519_OID {
        return Err(CodecError::KeyType(format!(
            "{class} uses algorithm {oid}, expected Ed25519 ({ED25519_OID})"
        )));
    }
    Ok(())
}

fn unexpected_class(expected: KeyClass, found: KeyClass) -> CodecError {
    CodecError::KeyType(format!("expected {expected}, found {found}"))
}

/// Schneidet den ersten `-----BEGIN ...-----` / `-----END ...-----` Block aus
fn first_block(text: &str) -> Option<&str> {
    let start = text.find(PEM_BEGIN)?;
    let rest = &text[start..];

    let end = rest.find(PEM_END)? + PEM_END.len();
    let close = rest[end..].find(PEM_DASHES)? + PEM_DASHES.len();

    Some(&rest[..end + close])
}

// ============================================================================
// TESTS
// ============================================================================
