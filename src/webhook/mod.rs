//! The fulfillment webhook: envelope parsing, query classification,
//! response wording, and the axum server.
//!
//! One request moves through a fixed pipeline: extract the query from the
//! conversation contexts, classify it as a code or a name, resolve it
//! through the cache-only lookup service, and map the outcome to one of
//! four stable messages. Every exit path, including internal failures,
//! produces a syntactically valid response envelope.

pub mod envelope;
pub mod server;

pub use envelope::{extract_query, WebhookRequest, WebhookResponse};
pub use server::{create_server, start_server, AppState};

use crate::config::LookupConfig;
use crate::dataset::RowRecord;
use regex::Regex;

/// Reply when no query text was found in any context.
pub const MSG_QUERY_NOT_FOUND: &str = "No search term found. Please try again.";

/// Reply when the cache holds no usable snapshot yet.
pub const MSG_CACHE_NOT_READY: &str =
    "The system is still loading its data. Please try again in a minute or two.";

/// Reply when an internal failure reached the handler boundary.
pub const MSG_INTERNAL_ERROR: &str =
    "Sorry, something went wrong on our side. Please contact the admin.";

/// Reply when the snapshot holds no row for the query; embeds the original
/// raw query text.
pub fn not_found_message(query: &str) -> String {
    format!("No data found for \"{}\". Please check the search term or ask the admin.", query)
}

/// Pick the index field for a query: code-shaped queries go to the code
/// index, everything else to the name index.
pub fn classify_field<'a>(query: &str, code_regex: &Regex, config: &'a LookupConfig) -> &'a str {
    if code_regex.is_match(query) {
        &config.code_field
    } else {
        &config.query_field
    }
}

/// Render the multi-line summary for a found row. Field values are taken
/// verbatim from the record.
pub fn format_row_summary(row: &RowRecord) -> String {
    format!(
        "Herb: {} (code: {})\nEffect: {}\nDescription: {}\nLevel of evidence: {}\nReference: {}",
        row.get("herb"),
        row.get("code"),
        row.get("effect"),
        row.get("description"),
        row.get("loe"),
        row.get("ref"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_classify_code_query() {
        let config = LookupConfig::default();
        let regex = config.code_regex().expect("Pattern should compile");
        assert_eq!(classify_field("h12", &regex, &config), "code");
        assert_eq!(classify_field("H3", &regex, &config), "code");
    }

    #[test]
    fn test_classify_name_query() {
        let config = LookupConfig::default();
        let regex = config.code_regex().expect("Pattern should compile");
        assert_eq!(classify_field("ginger", &regex, &config), "herb");
        assert_eq!(classify_field("hot pepper", &regex, &config), "herb");
    }

    #[test]
    fn test_row_summary_renders_fields_verbatim() {
        let mut fields = HashMap::new();
        fields.insert("code".to_string(), "H1".to_string());
        fields.insert("herb".to_string(), "Ginger".to_string());
        fields.insert("effect".to_string(), "Digestive aid".to_string());
        fields.insert("description".to_string(), "Zingiber officinale".to_string());
        fields.insert("loe".to_string(), "High".to_string());
        fields.insert("ref".to_string(), "ref1".to_string());
        let summary = format_row_summary(&RowRecord { fields });

        assert!(summary.contains("Herb: Ginger (code: H1)"));
        assert!(summary.contains("Effect: Digestive aid"));
        assert!(summary.contains("Level of evidence: High"));
        assert!(summary.contains("Reference: ref1"));
    }

    #[test]
    fn test_not_found_message_embeds_query() {
        assert!(not_found_message("h99").contains("\"h99\""));
    }
}
