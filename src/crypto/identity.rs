//! Ed25519 Identity
//!
//! Ein Schlüsselpaar, das die Identität eines Benutzers darstellt.
//! Gespeichert wird nur der Signing Key, der Public Key wird bei Bedarf
//! abgeleitet und kann daher nie vom Private Key abweichen.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use serde::Serialize;

use super::codec::{self, CodecError};

// ============================================================================
// IDENTITY
// ============================================================================

/// Ed25519 Schlüsselpaar eines Benutzers
#[derive(Clone)]
pub struct Identity {
    signing_key: SigningKey,
}

impl Identity {
    /// Generiert eine neue zufällige Identität mit dem OS CSPRNG
    pub fn generate() -> Self {
        let mut csprng = OsRng;
        let signing_key = SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Übernimmt einen bereits dekodierten Signing Key
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        Self { signing_key }
    }

    /// Dekodiert eine Identität aus einem `PRIVATE KEY` PEM-Block
    pub fn from_private_pem(text: impl AsRef<[u8]>) -> Result<Self, CodecError> {
        codec::decode_private_key(text).map(Self::from_signing_key)
    }

    /// Signing Key für externe Signierung
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Gibt den VerifyingKey (Public Key) zurück
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Gibt den Public Key als raw bytes (32 Bytes) zurück
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.verifying_key().to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public_key_bytes())
    }

    /// PKCS#8 PEM des Private Keys
    pub fn private_key_pem(&self) -> Result<String, CodecError> {
        codec::encode_private_key(&self.signing_key)
    }

    /// SPKI PEM des Public Keys, Inhalt von `gid.pem`
    pub fn public_key_pem(&self) -> Result<String, CodecError> {
        codec::encode_public_key(&self.verifying_key())
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("public_key", &self.public_key_hex())
            .finish()
    }
}

// ============================================================================
// PUBLIC KEY SUMMARY
// ============================================================================

/// Darstellung eines Public Keys für Ausgaben (z.B. `--json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeySummary {
    pub public_key_hex: String,
    pub public_key_base64: String,
    pub public_key_pem: String,
}

impl PublicKeySummary {
    pub fn new(verifying_key: &VerifyingKey) -> Result<Self, CodecError> {
        let bytes = verifying_key.to_bytes();
        Ok(Self {
            public_key_hex: hex::encode(bytes),
            public_key_base64: BASE64.encode(bytes),
            public_key_pem: codec::encode_public_key(verifying_key)?,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
