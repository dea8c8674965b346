//! API key generation, hashing and verification.
//!
//! A plain key is shown to the caller exactly once, at creation. The stored
//! record keeps only a hash (per the configured algorithm) and a short
//! display prefix. Keys carry a checksum suffix so obviously-mangled input
//! can be rejected before any store lookup.

use std::fmt;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use utoipa::ToSchema;

use crate::user::UserRef;

/// Prefix identifying Vantage API keys in presented credentials.
pub const KEY_PREFIX: &str = "vgk_";

const PAYLOAD_BYTES: usize = 24;
const CHECKSUM_BYTES: usize = 4;

/// Length of the display prefix kept alongside the hash.
pub const DISPLAY_PREFIX_LEN: usize = 12;

/// The hash algorithm applied to stored API keys.
///
/// The serialized names are persisted with each key record so that existing
/// keys keep verifying after the default changes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
pub enum ApiKeyHashAlgorithm {
    /// SHA-256 over the trimmed key.
    #[default]
    #[serde(rename = "SHA2_256")]
    Sha2256,
    /// SHA-512 over the trimmed key.
    #[serde(rename = "SHA2_512")]
    Sha2512,
}

impl ApiKeyHashAlgorithm {
    /// Returns the human-readable label.
    #[must_use]
    pub fn display_value(self) -> &'static str {
        match self {
            Self::Sha2256 => "SHA2-256",
            Self::Sha2512 => "SHA2-512",
        }
    }

    /// Hashes a presented key with this algorithm.
    #[must_use]
    pub fn hash(self, api_key: &str) -> String {
        let trimmed = api_key.trim();
        match self {
            Self::Sha2256 => STANDARD.encode(Sha256::digest(trimmed.as_bytes())),
            Self::Sha2512 => STANDARD.encode(Sha512::digest(trimmed.as_bytes())),
        }
    }
}

impl fmt::Display for ApiKeyHashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_value())
    }
}

/// Generates a fresh plain API key: prefix, random payload, checksum suffix.
#[must_use]
pub fn generate_api_key() -> String {
    let mut payload = [0_u8; PAYLOAD_BYTES];
    rand::thread_rng().fill_bytes(&mut payload);
    let payload = URL_SAFE_NO_PAD.encode(payload);
    let checksum = checksum(&payload);
    format!("{KEY_PREFIX}{payload}_{checksum}")
}

/// Returns true when the input has the shape of a Vantage API key, including
/// a valid checksum. A well-formed key is not necessarily a known key.
#[must_use]
pub fn is_well_formed(api_key: &str) -> bool {
    let Some(rest) = api_key.trim().strip_prefix(KEY_PREFIX) else {
        return false;
    };
    let Some((payload, suffix)) = rest.rsplit_once('_') else {
        return false;
    };
    !payload.is_empty() && checksum(payload) == suffix
}

/// Returns the display prefix stored alongside the hash.
#[must_use]
pub fn display_prefix(api_key: &str) -> String {
    api_key.trim().chars().take(DISPLAY_PREFIX_LEN).collect()
}

fn checksum(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    URL_SAFE_NO_PAD.encode(&digest[..CHECKSUM_BYTES])
}

/// A stored API key record. The plain key is never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HashedApiKey {
    /// Store-assigned record ID.
    pub id: u64,
    /// The account the key authenticates as.
    pub owner: UserRef,
    /// Key name, unique per owner.
    pub name: String,
    /// Free-text comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Display prefix of the plain key.
    pub api_key_prefix: String,
    /// Hash of the plain key.
    pub api_key_hash: String,
    /// Algorithm the hash was produced with.
    #[serde(default)]
    pub hash_algorithm: ApiKeyHashAlgorithm,
    /// Expiry time; keys without one never expire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
    /// Disabled keys never verify.
    pub enabled: bool,
}

impl HashedApiKey {
    /// Returns true when the presented plain key matches this record and the
    /// record is usable at `now`.
    #[must_use]
    pub fn verify(&self, presented: &str, now: DateTime<Utc>) -> bool {
        if !self.enabled {
            return false;
        }
        if self.expire_time.is_some_and(|expiry| now >= expiry) {
            return false;
        }
        self.hash_algorithm.hash(presented) == self.api_key_hash
    }
}

/// Request to create a new API key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHashedApiKeyRequest {
    /// The account the key will authenticate as.
    pub owner: UserRef,
    /// Key name, unique per owner.
    pub name: String,
    /// Free-text comments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Optional expiry time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_time: Option<DateTime<Utc>>,
    /// Whether the key starts enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Hash algorithm for the stored record.
    #[serde(default)]
    pub hash_algorithm: ApiKeyHashAlgorithm,
}

/// Response to key creation; the only place the plain key ever appears.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHashedApiKeyResponse {
    /// The plain key. Shown once; store it now.
    pub api_key: String,
    /// The stored record.
    pub hashed_api_key: HashedApiKey,
}

fn default_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn record_for(key: &str) -> HashedApiKey {
        HashedApiKey {
            id: 1,
            owner: UserRef::named(Uuid::new_v4(), "jbloggs"),
            name: "ci".into(),
            comments: None,
            api_key_prefix: display_prefix(key),
            api_key_hash: ApiKeyHashAlgorithm::Sha2256.hash(key),
            hash_algorithm: ApiKeyHashAlgorithm::Sha2256,
            expire_time: None,
            enabled: true,
        }
    }

    #[test]
    fn generated_keys_are_well_formed_and_distinct() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert!(a.starts_with(KEY_PREFIX));
        assert!(is_well_formed(&a));
        assert!(is_well_formed(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn mangled_keys_are_rejected_before_lookup() {
        let key = generate_api_key();
        let mangled = format!("{}x", &key[..key.len() - 1]);
        assert!(!is_well_formed(&mangled));
        assert!(!is_well_formed("sk_not_ours"));
        assert!(!is_well_formed("vgk_"));
    }

    #[test]
    fn verify_accepts_the_original_key_only() {
        let key = generate_api_key();
        let record = record_for(&key);
        let now = Utc::now();

        assert!(record.verify(&key, now));
        assert!(record.verify(&format!("  {key}  "), now), "trims whitespace");
        assert!(!record.verify(&generate_api_key(), now));
    }

    #[test]
    fn disabled_and_expired_keys_never_verify() {
        let key = generate_api_key();
        let now = Utc::now();

        let mut disabled = record_for(&key);
        disabled.enabled = false;
        assert!(!disabled.verify(&key, now));

        let mut expired = record_for(&key);
        expired.expire_time = Some(now - Duration::hours(1));
        assert!(!expired.verify(&key, now));

        let mut live = record_for(&key);
        live.expire_time = Some(now + Duration::hours(1));
        assert!(live.verify(&key, now));
    }

    #[test]
    fn sha512_records_verify_with_their_own_algorithm() {
        let key = generate_api_key();
        let mut record = record_for(&key);
        record.hash_algorithm = ApiKeyHashAlgorithm::Sha2512;
        record.api_key_hash = ApiKeyHashAlgorithm::Sha2512.hash(&key);
        assert!(record.verify(&key, Utc::now()));
    }

    #[test]
    fn algorithm_names_are_stable_on_the_wire() {
        assert_eq!(
            serde_json::to_value(ApiKeyHashAlgorithm::Sha2256).unwrap(),
            serde_json::json!("SHA2_256")
        );
    }
}

