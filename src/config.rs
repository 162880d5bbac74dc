//! Lookup configuration.
//!
//! All deployment-tunable knobs live in [`LookupConfig`]: which table to
//! read, which columns must exist, which fields are indexed and how their
//! values are normalized, the cache key and TTL, and the webhook's intent
//! prefix and code pattern. The defaults carry the original deployment's
//! constants; binaries override individual fields from CLI arguments.
//!
//! [`LookupConfig::validate`] is run once at startup so that a
//! misconfigured field registry fails fast instead of at call time.

use crate::normalize::Normalizer;
use regex::Regex;

/// Configuration for the dataset build, the cache entry, and the webhook's
/// query classification.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Source-of-truth identifier: a CSV directory path or a published
    /// spreadsheet id, depending on which source implementation is wired up.
    pub source_id: String,
    /// Table (sheet) name inside the source.
    pub table_name: String,
    /// Columns that must be present in the source header for a build to
    /// succeed.
    pub required_columns: Vec<String>,
    /// Fields to index, each with the normalizer applied to its values.
    pub indexed_fields: Vec<(String, Normalizer)>,
    /// Key under which the serialized snapshot is cached.
    pub cache_key: String,
    /// Cache entry lifetime in seconds.
    pub cache_ttl_secs: u64,
    /// Only intents whose display name starts with this prefix are handled.
    pub intent_prefix: String,
    /// Queries matching this pattern are classified as code lookups.
    pub code_pattern: String,
    /// Index field used for code-classified queries.
    pub code_field: String,
    /// Index field used for everything else; also the name of the webhook
    /// context parameter carrying the query text.
    pub query_field: String,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            source_id: String::new(),
            table_name: "data".to_string(),
            required_columns: vec![
                "code".to_string(),
                "herb".to_string(),
                "effect".to_string(),
                "description".to_string(),
                "loe".to_string(),
                "ref".to_string(),
            ],
            indexed_fields: vec![
                ("code".to_string(), Normalizer::Lowercase),
                ("herb".to_string(), Normalizer::Lowercase),
            ],
            cache_key: "herb_lookup_v1".to_string(),
            cache_ttl_secs: 6 * 60 * 60,
            intent_prefix: "herb".to_string(),
            code_pattern: r"^[hH]\d+".to_string(),
            code_field: "code".to_string(),
            query_field: "herb".to_string(),
        }
    }
}

/// Errors raised by configuration validation.
#[derive(Debug)]
pub enum ConfigError {
    /// A field referenced by the configuration is not in the indexed set.
    UnknownIndexField(String),
    /// An indexed field is not covered by the required-columns contract.
    UnindexableColumn(String),
    /// The code pattern does not compile.
    BadCodePattern(String),
    /// The cache key is blank.
    EmptyCacheKey,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::UnknownIndexField(field) => {
                write!(f, "Field '{}' is not a configured index field", field)
            }
            ConfigError::UnindexableColumn(field) => {
                write!(f, "Indexed field '{}' is not in the required-columns list", field)
            }
            ConfigError::BadCodePattern(msg) => write!(f, "Invalid code pattern: {}", msg),
            ConfigError::EmptyCacheKey => write!(f, "Cache key must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl LookupConfig {
    /// Look up the normalizer configured for `field`, if it is indexed.
    pub fn normalizer_for(&self, field: &str) -> Option<Normalizer> {
        self.indexed_fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, normalizer)| *normalizer)
    }

    /// Compile the code-classification regex.
    pub fn code_regex(&self) -> Result<Regex, ConfigError> {
        Regex::new(&self.code_pattern).map_err(|e| ConfigError::BadCodePattern(e.to_string()))
    }

    /// Validate the field registry and the code pattern.
    ///
    /// Run once at startup; after this succeeds, `UnknownIndexField` is not
    /// reachable through the webhook's classification paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_key.trim().is_empty() {
            return Err(ConfigError::EmptyCacheKey);
        }

        for (field, _) in &self.indexed_fields {
            if !self.required_columns.contains(field) {
                return Err(ConfigError::UnindexableColumn(field.clone()));
            }
        }

        // Both classification targets must resolve to a configured index.
        for field in [&self.code_field, &self.query_field] {
            if self.normalizer_for(field).is_none() {
                return Err(ConfigError::UnknownIndexField(field.clone()));
            }
        }

        self.code_regex()?;
        Ok(())
    }
}
