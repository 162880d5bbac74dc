//! Dialogflow ES fulfillment request/response envelopes and query
//! extraction from conversation contexts.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Inbound fulfillment request. Unknown fields are ignored; everything is
/// defaulted so a sparse payload still deserializes.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookRequest {
    #[serde(rename = "queryResult", default)]
    pub query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub intent: Intent,
    #[serde(rename = "outputContexts", default)]
    pub output_contexts: Vec<OutputContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Intent {
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputContext {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parameters: HashMap<String, Value>,
}

/// Outbound fulfillment response: the same text in both the plain field and
/// the messages list, as Dialogflow expects.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    #[serde(rename = "fulfillmentText")]
    pub fulfillment_text: String,
    #[serde(rename = "fulfillmentMessages")]
    pub fulfillment_messages: Vec<FulfillmentMessage>,
}

#[derive(Debug, Serialize)]
pub struct FulfillmentMessage {
    pub text: TextMessage,
}

#[derive(Debug, Serialize)]
pub struct TextMessage {
    pub text: Vec<String>,
}

impl WebhookResponse {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            fulfillment_text: text.clone(),
            fulfillment_messages: vec![FulfillmentMessage {
                text: TextMessage { text: vec![text] },
            }],
        }
    }
}

/// Scan the output contexts in order for the user's query text.
///
/// An exact parameter (`<field>`) that is non-blank commits immediately. A
/// fallback parameter (`<field>.original`) is only remembered, with later
/// fallbacks overwriting earlier ones, and committed when no exact form
/// appears in any context.
pub fn extract_query(contexts: &[OutputContext], query_field: &str) -> Option<String> {
    let fallback_field = format!("{}.original", query_field);
    let mut fallback = None;

    for context in contexts {
        if let Some(text) = context.parameters.get(query_field).and_then(param_text) {
            return Some(text);
        }
        if let Some(text) = context.parameters.get(&fallback_field).and_then(param_text) {
            fallback = Some(text);
        }
    }

    fallback
}

/// Coerce a context parameter value to trimmed, non-empty text. Dialogflow
/// may deliver parameters as strings or numbers.
fn param_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
