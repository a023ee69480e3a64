//! Core value types shared across hashsync modules.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hex length of every supported digest (32 bytes for BLAKE3 and SHA-256).
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// Lowercase hexadecimal content digest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap raw digest bytes as a hex fingerprint.
    pub fn from_digest(bytes: &[u8]) -> Self {
        Self(hex::encode(bytes))
    }

    /// Parse a hex string, normalizing to lowercase.
    ///
    /// Rejects non-hex characters and any length other than
    /// [`FINGERPRINT_HEX_LEN`].
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.len() != FINGERPRINT_HEX_LEN {
            return Err(format!(
                "fingerprint {:?} has {} hex characters, expected {}",
                s,
                s.len(),
                FINGERPRINT_HEX_LEN
            ));
        }
        hex::decode(s).map_err(|e| format!("invalid fingerprint {:?}: {}", s, e))?;
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        self.0.get(..12).unwrap_or(&self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digest algorithm used to fingerprint file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintAlgorithm {
    #[default]
    Blake3,
    /// SHA-256 hex digests, as found in existing `file_metadata.json` manifests.
    Sha256,
}

impl FingerprintAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            FingerprintAlgorithm::Blake3 => "blake3",
            FingerprintAlgorithm::Sha256 => "sha256",
        }
    }
}

impl FromStr for FingerprintAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(FingerprintAlgorithm::Blake3),
            "sha256" | "sha-256" => Ok(FingerprintAlgorithm::Sha256),
            other => Err(format!(
                "unknown fingerprint algorithm '{}' (expected 'blake3' or 'sha256')",
                other
            )),
        }
    }
}

/// Identifier returned by the remote side for an uploaded object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteObjectId(pub String);

impl fmt::Display for RemoteObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
