//! Immutable redaction and code-mapping policy.
//!
//! A [`SanitizePolicy`] is built once, then shared (it is cheap to clone, the
//! tables sit behind an `Arc`). Nothing mutates it after construction, so
//! several pipelines with different rules can run side by side, e.g. one per
//! tenant.
//!
//! # Loading From Configuration
//!
//! ```rust
//! use gql_error_shield::{ErrorCode, SanitizePolicy};
//!
//! let policy = SanitizePolicy::from_json(r#"{
//!     "denied_keys": ["trace"],
//!     "legacy_codes": { "not_allowed": "FORBIDDEN" },
//!     "preserve_custom_codes": false
//! }"#).unwrap();
//!
//! assert!(policy.is_denied("trace"));
//! assert!(policy.is_denied("stack"));
//! assert_eq!(policy.normalize_code(Some("not_allowed")), ErrorCode::Forbidden);
//! ```

use crate::definitions::{DENIED_EXTENSION_KEYS, LEGACY_CODES};
use crate::ErrorCode;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building a policy from configuration.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Configuration text was not valid JSON for [`PolicyConfig`].
    #[error("invalid policy configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A legacy code pointed at something that is not a canonical code.
    #[error("legacy code '{legacy}' maps to unknown canonical code '{target}'")]
    UnknownTarget { legacy: String, target: String },

    /// A legacy alias tried to redefine a canonical code.
    #[error("legacy code '{0}' collides with a canonical code")]
    ShadowsCanonical(String),
}

/// Serialized form of a policy. Every field layers over the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Extra keys to deny, added to the built-in deny set.
    pub denied_keys: Vec<String>,
    /// Extra legacy aliases, raw string to canonical wire string.
    pub legacy_codes: BTreeMap<String, String>,
    /// Whether unknown custom codes are shown to clients as-is.
    pub preserve_custom_codes: Option<bool>,
}

#[derive(Clone)]
struct PolicyTables {
    denied_keys: HashSet<String>,
    legacy_codes: HashMap<String, ErrorCode>,
}

/// Deny set, legacy code map and custom-code handling for one pipeline.
#[derive(Clone)]
pub struct SanitizePolicy {
    tables: Arc<PolicyTables>,
    preserve_custom_codes: bool,
}

impl SanitizePolicy {
    /// A policy with no denied keys and no legacy aliases.
    ///
    /// Mostly useful as a base for fully custom rules; production code wants
    /// [`SanitizePolicy::default`].
    pub fn empty() -> Self {
        Self {
            tables: Arc::new(PolicyTables {
                denied_keys: HashSet::new(),
                legacy_codes: HashMap::new(),
            }),
            preserve_custom_codes: true,
        }
    }

    /// Build a policy from JSON configuration layered over the defaults.
    pub fn from_json(text: &str) -> Result<Self, PolicyError> {
        let config: PolicyConfig = serde_json::from_str(text)?;
        Self::from_config(config)
    }

    /// Build a policy from an already deserialized configuration.
    pub fn from_config(config: PolicyConfig) -> Result<Self, PolicyError> {
        let mut policy = Self::default();
        for key in config.denied_keys {
            policy = policy.with_denied_key(key);
        }
        for (legacy, target) in config.legacy_codes {
            let Some(code) = ErrorCode::from_canonical(&target) else {
                return Err(PolicyError::UnknownTarget { legacy, target });
            };
            if ErrorCode::from_canonical(&legacy).is_some() {
                return Err(PolicyError::ShadowsCanonical(legacy));
            }
            policy = policy.with_legacy_code(legacy, code);
        }
        if let Some(preserve) = config.preserve_custom_codes {
            policy = policy.preserve_custom_codes(preserve);
        }
        Ok(policy)
    }

    /// Add a key to the deny set.
    pub fn with_denied_key(mut self, key: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.tables).denied_keys.insert(key.into());
        self
    }

    /// Add or replace a legacy alias.
    pub fn with_legacy_code(mut self, legacy: impl Into<String>, code: ErrorCode) -> Self {
        Arc::make_mut(&mut self.tables)
            .legacy_codes
            .insert(legacy.into(), code);
        self
    }

    /// Choose whether unknown custom codes reach the client verbatim.
    pub fn preserve_custom_codes(mut self, preserve: bool) -> Self {
        self.preserve_custom_codes = preserve;
        self
    }

    /// Whether `key` is stripped from client payloads.
    #[inline]
    pub fn is_denied(&self, key: &str) -> bool {
        self.tables.denied_keys.contains(key)
    }

    #[inline]
    pub(crate) fn legacy_target(&self, raw: &str) -> Option<ErrorCode> {
        self.tables.legacy_codes.get(raw).copied()
    }

    #[inline]
    pub fn preserves_custom_codes(&self) -> bool {
        self.preserve_custom_codes
    }

    /// Number of keys in the deny set.
    pub fn denied_key_count(&self) -> usize {
        self.tables.denied_keys.len()
    }
}

impl Default for SanitizePolicy {
    fn default() -> Self {
        Self {
            tables: Arc::new(PolicyTables {
                denied_keys: DENIED_EXTENSION_KEYS.iter().map(|k| (*k).to_string()).collect(),
                legacy_codes: LEGACY_CODES
                    .iter()
                    .map(|(raw, code)| ((*raw).to_string(), *code))
                    .collect(),
            }),
            preserve_custom_codes: true,
        }
    }
}

impl std::fmt::Debug for SanitizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SanitizePolicy")
            .field("denied_keys", &self.tables.denied_keys.len())
            .field("legacy_codes", &self.tables.legacy_codes.len())
            .field("preserve_custom_codes", &self.preserve_custom_codes)
            .finish()
    }
}
