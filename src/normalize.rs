//! Pure normalization functions for header cells and index keys.
//!
//! Normalizers are deterministic and total over non-empty strings. They are
//! applied both at build time (when index keys are written) and at lookup
//! time (on the raw query value), so the same variant must be configured on
//! both sides of a field.

/// Canonicalize a raw header cell into a column name: trim, lower-case,
/// collapse whitespace runs into single underscores.
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

/// Normalizer applied to a field value before it enters (or is looked up in)
/// an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalizer {
    /// Trim surrounding whitespace and lower-case the value.
    Lowercase,
    /// Trim surrounding whitespace only, keeping the original casing.
    Trim,
}

impl Normalizer {
    /// Apply the normalizer to a raw field value.
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Normalizer::Lowercase => raw.trim().to_lowercase(),
            Normalizer::Trim => raw.trim().to_string(),
        }
    }
}
