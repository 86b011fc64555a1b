//! Parsing and cleanup of generated draft output.
//!
//! The model is asked for `{"lineItems": [...]}`. Anything that is not an
//! object with a non-blank string `description` is dropped; prices that are
//! missing, negative or not numbers become zero.

use serde_json::Value;

use super::types::DraftLineItem;
use crate::error::{EstimatorError, Result};

/// Parse a raw draft response body into sanitized line items.
pub fn parse_draft_response(raw: &str) -> Result<Vec<DraftLineItem>> {
    let raw = raw.trim();
    let raw = if raw.is_empty() { "{}" } else { raw };

    let parsed: Value = serde_json::from_str(raw)
        .map_err(|_| EstimatorError::UpstreamGeneration("AI returned invalid JSON".to_string()))?;

    let items = parsed
        .get("lineItems")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            EstimatorError::UpstreamGeneration("AI response missing lineItems array".to_string())
        })?;

    Ok(items.iter().filter_map(line_item_from_value).collect())
}

fn line_item_from_value(value: &Value) -> Option<DraftLineItem> {
    let object = value.as_object()?;
    let description = object.get("description")?.as_str()?;
    let proposal = object
        .get("proposal_description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let price = object
        .get("total_price")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);

    DraftLineItem::new(description, proposal, price).sanitized()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_sanitizes() {
        let raw = r#"{
            "lineItems": [
                {"description": " Demolition ", "proposal_description": "• Remove cabinets", "total_price": 2500.456},
                {"description": "", "total_price": 100},
                {"description": "Permits", "total_price": -5},
                {"description": "Cleanup", "total_price": "lots"},
                "not an object",
                {"proposal_description": "orphan"}
            ]
        }"#;

        let items = parse_draft_response(raw).unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].description, "Demolition");
        assert_eq!(items[0].total_price, 2500.46);
        assert_eq!(items[1].description, "Permits");
        assert_eq!(items[1].total_price, 0.0);
        assert_eq!(items[1].proposal_description, "");
        assert_eq!(items[2].description, "Cleanup");
        assert_eq!(items[2].total_price, 0.0);
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_draft_response("Sure! Here is your estimate").unwrap_err();
        assert!(matches!(err, EstimatorError::UpstreamGeneration(_)));
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_missing_line_items() {
        for raw in ["", "{}", r#"{"lineItems": {"a": 1}}"#] {
            let err = parse_draft_response(raw).unwrap_err();
            assert!(err.to_string().contains("missing lineItems"));
        }
    }

    #[test]
    fn test_empty_array_is_ok() {
        assert!(parse_draft_response(r#"{"lineItems": []}"#)
            .unwrap()
            .is_empty());
    }
}
