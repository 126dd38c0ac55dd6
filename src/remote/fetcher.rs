//! Remote Key Fetcher
//!
//! Lädt den Public Key eines anderen Benutzers per Konvention aus einem
//! Git-Repository: `{base}/{handler}/{ref}/{key_path}`, standardmäßig über
//! `raw.githubusercontent.com`.
//!
//! Kein Caching, kein Retry und keine Signaturprüfung. Der
//! Aufrufer vertraut dem Repository, aus dem der Schlüssel stammt. Der
//! HTTP-Request blockiert den aufrufenden Thread.

use ed25519_dalek::VerifyingKey;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::crypto::{codec, CodecError};

/// Basis-URL für Raw-Dateien auf GitHub
pub const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";

/// Standard-Ref unter dem `gid.pem` veröffentlicht wird
pub const DEFAULT_REF: &str = "gid/main";

/// Standard-Pfad des Public Keys im Repository
pub const DEFAULT_KEY_PATH: &str = "gid.pem";

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Server antwortete mit einem Status außerhalb von 2xx
    #[error("Fetching {url} failed with HTTP {status}")]
    Status { url: Url, status: StatusCode },

    /// DNS, Verbindungsaufbau, TLS oder Lesen des Bodys fehlgeschlagen
    #[error("Network error while fetching {url}: {source}")]
    Network {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid public key at {url}: {source}")]
    Codec {
        url: Url,
        #[source]
        source: CodecError,
    },
}

impl FetchError {
    /// HTTP-Status bei `FetchError::Status`
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Unveränderter Codec-Fehler, falls der Body nicht dekodierbar war
    pub fn codec_error(&self) -> Option<&CodecError> {
        match self {
            FetchError::Codec { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// FETCHER
// ============================================================================

/// Blockierender HTTP Client für veröffentlichte Public Keys
#[derive(Debug, Clone)]
pub struct RemoteKeyFetcher {
    client: Client,
    base_url: Url,
}

impl RemoteKeyFetcher {
    /// Fetcher für `raw.githubusercontent.com`
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_RAW_BASE_URL)
    }

    /// Fetcher für einen anderen Raw-Content Host (Mirror, GitHub Enterprise)
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("gid/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;

        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, FetchError> {
        let invalid = |reason: String| FetchError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };

        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("cannot be used as a base URL".to_string()));
        }

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Baut `{base}/{handler}/{ref}/{key_path}`
    ///
    /// Schrägstriche in den Teilen bleiben Pfadtrenner, leere Segmente
    /// entfallen. Sonst wird nur escaped, was ein Pfadsegment verlangt.
    pub fn resolve_url(
        &self,
        handler: &str,
        reference: &str,
        key_path: &str,
    ) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| FetchError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "cannot be used as a base URL".to_string(),
            })?;
            segments.pop_if_empty();

            for part in [handler, reference, key_path] {
                segments.extend(part.split('/').filter(|segment| !segment.is_empty()));
            }
        }
        Ok(url)
    }

    /// Lädt und dekodiert den Public Key eines anderen Benutzers
    ///
    /// Genau ein GET Request, ohne Retry und ohne eigenes Timeout.
    pub fn fetch_public_key(
        &self,
        handler: &str,
        reference: &str,
        key_path: &str,
    ) -> Result<VerifyingKey, FetchError> {
        let url = self.resolve_url(handler, reference, key_path)?;
        tracing::info!("Fetching public key from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| FetchError::Network {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Fetching {} returned HTTP {}", url, status);
            return Err(FetchError::Status { url, status });
        }

        let body = response.bytes().map_err(|source| FetchError::Network {
            url: url.clone(),
            source,
        })?;

        let verifying_key = codec::decode_public_key(&body).map_err(|source| FetchError::Codec {
            url: url.clone(),
            source,
        })?;

        tracing::info!(
            "Fetched public key {} from {}",
            hex::encode(verifying_key.to_bytes()),
            url
        );
        Ok(verifying_key)
    }
}

/// Lädt einen Public Key von `raw.githubusercontent.com`
pub fn fetch_public_key(
    handler: &str,
    reference: &str,
    key_path: &str,
) -> Result<VerifyingKey, FetchError> {
    RemoteKeyFetcher::new()?.fetch_public_key(handler, reference, key_path)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Identity;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Beantwortet genau einen Request und liefert dessen Kopfzeilen zurück
    fn serve_once(status_line: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();

            String::from_utf8_lossy(&request).into_owned()
        });

        (base_url, handle)
    }

    fn local_fetcher(base_url: &str) -> RemoteKeyFetcher {
        let client = Client::builder().no_proxy().build().unwrap();
        RemoteKeyFetcher::with_client(client, base_url).unwrap()
    }

    #[test]
    fn test_resolve_github_url() {
        let fetcher = RemoteKeyFetcher::new().unwrap();
        let url = fetcher
            .resolve_url("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://raw.githubusercontent.com/user/repo/gid/main/gid.pem"
        );
    }

    #[test]
    fn test_resolve_escapes_segments_only_as_needed() {
        let fetcher = local_fetcher("https://mirror.example/raw/");
        let url = fetcher
            .resolve_url("/user/repo/", "v1.0", "keys/my key.pem")
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://mirror.example/raw/user/repo/v1.0/keys/my%20key.pem"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_optional() {
        let bare = local_fetcher("https://mirror.example/raw");
        let slashed = local_fetcher("https://mirror.example/raw/");
        assert_eq!(bare.base_url().as_str(), "https://mirror.example/raw");
        assert_eq!(slashed.base_url().as_str(), "https://mirror.example/raw/");

        let expected = "https://mirror.example/raw/user/repo/gid/main/gid.pem";
        for fetcher in [bare, slashed] {
            let url = fetcher
                .resolve_url("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
                .unwrap();
            assert_eq!(url.as_str(), expected);
        }

        let github = RemoteKeyFetcher::new().unwrap();
        assert_eq!(github.base_url().host_str(), Some("raw.githubusercontent.com"));
    }

    #[test]
    fn test_invalid_base_url() {
        let client = Client::builder().no_proxy().build().unwrap();
        let err = RemoteKeyFetcher::with_client(client.clone(), "not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));

        let err = RemoteKeyFetcher::with_client(client, "mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_fetch_decodes_public_key() {
        let identity = Identity::generate();
        let (base_url, server) = serve_once("200 OK", identity.public_key_pem().unwrap());

        let fetched = local_fetcher(&base_url)
            .fetch_public_key("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
            .unwrap();

        assert_eq!(fetched, identity.verifying_key());

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /user/repo/gid/main/gid.pem HTTP/1.1"));
    }

    #[test]
    fn test_fetch_404_is_status_error() {
        let (base_url, server) = serve_once("404 Not Found", String::new());

        let err = local_fetcher(&base_url)
            .fetch_public_key("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("/user/repo/gid/main/gid.pem"));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_unreachable_host_is_network_error() {
        // Port reservieren und wieder freigeben, damit niemand lauscht
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = local_fetcher(&format!("http://127.0.0.1:{port}/"))
            .fetch_public_key("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
            .unwrap_err();

        assert!(matches!(err, FetchError::Network { .. }));
    }

    #[test]
    fn test_fetch_garbage_body_is_codec_error() {
        let (base_url, server) = serve_once("200 OK", "<html>not a key</html>".to_string());

        let err = local_fetcher(&base_url)
            .fetch_public_key("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
            .unwrap_err();

        assert!(matches!(err.codec_error(), Some(CodecError::Decode(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_private_key_body_is_key_type_error() {
        let identity = Identity::generate();
        let (base_url, server) = serve_once("200 OK", identity.private_key_pem().unwrap());

        let err = local_fetcher(&base_url)
            .fetch_public_key("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
            .unwrap_err();

        assert!(matches!(err.codec_error(), Some(CodecError::KeyType(_))));
        server.join().unwrap();
    }

    #[test]
    fn test_fetch_foreign_algorithm_is_key_type_error() {
        // SPKI mit X25519-OID (1.3.101.110)
        let body = "-----BEGIN PUBLIC KEY-----\n\
                    MCowBQYDK2VuAyEAGb9ECWmEzf6FQbrBZ9w7lshQhqowtrbLDFw4rXAxZuE=\n\
                    -----END PUBLIC KEY-----\n";
        let (base_url, server) = serve_once("200 OK", body.to_string());

        let err = local_fetcher(&base_url)
            .fetch_public_key("user/repo", DEFAULT_REF, DEFAULT_KEY_PATH)
            .unwrap_err();

        assert!(matches!(err.codec_error(), Some(CodecError::KeyType(_))));
        server.join().unwrap();
    }
}
