//! Content fingerprints for change detection.

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// SHA-256 of `content`, encoded as URL-safe base64 (padded).
#[must_use]
pub fn fingerprint(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    URL_SAFE.encode(digest)
}
