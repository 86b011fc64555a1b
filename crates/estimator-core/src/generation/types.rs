//! Request and response types for AI generation.

use serde::{Deserialize, Serialize};

use crate::error::{EstimatorError, Result};
use crate::money::clamp_price;

/// Context for drafting a full set of line items.
#[derive(Debug, Clone, Serialize)]
pub struct DraftRequest {
    pub project_type: String,
    pub project_name: String,
    pub project_address: Option<String>,
    pub project_description: String,
    /// Photo or drawing URLs. Only `http...` entries are forwarded.
    pub file_urls: Vec<String>,
}

impl DraftRequest {
    pub fn validate(&self) -> Result<()> {
        if self.project_description.trim().is_empty() {
            return Err(EstimatorError::Validation(
                "Project description is required".to_string(),
            ));
        }
        Ok(())
    }
}

/// One generated line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftLineItem {
    pub description: String,
    #[serde(default)]
    pub proposal_description: String,
    #[serde(default)]
    pub total_price: f64,
}

impl DraftLineItem {
    pub fn new(
        description: impl Into<String>,
        proposal_description: impl Into<String>,
        total_price: f64,
    ) -> Self {
        Self {
            description: description.into(),
            proposal_description: proposal_description.into(),
            total_price,
        }
    }

    /// Trim text and normalize the price. Returns `None` when the description
    /// is blank.
    pub fn sanitized(self) -> Option<Self> {
        let description = self.description.trim();
        if description.is_empty() {
            return None;
        }
        Some(Self {
            description: description.to_string(),
            proposal_description: self.proposal_description.trim().to_string(),
            total_price: clamp_price(self.total_price),
        })
    }
}

/// Context for writing the scope text of a single line item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScopeRequest {
    pub item_name: String,
    pub dictation: Option<String>,
    pub project_type: Option<String>,
    pub project_name: Option<String>,
    pub project_address: Option<String>,
    pub project_overview: Option<String>,
}

impl ScopeRequest {
    pub fn validate(&self) -> Result<()> {
        if self.item_name.trim().is_empty() {
            return Err(EstimatorError::Validation(
                "Item name is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_drops_blank_description() {
        assert!(DraftLineItem::new("   ", "", 10.0).sanitized().is_none());
    }

    #[test]
    fn test_sanitized_trims_and_clamps() {
        let item = DraftLineItem::new("  Framing ", " • Walls \n", -20.0)
            .sanitized()
            .unwrap();
        assert_eq!(item.description, "Framing");
        assert_eq!(item.proposal_description, "• Walls");
        assert_eq!(item.total_price, 0.0);
    }

    #[test]
    fn test_draft_request_requires_description() {
        let request = DraftRequest {
            project_type: "kitchen".to_string(),
            project_name: "Smith".to_string(),
            project_address: None,
            project_description: "  ".to_string(),
            file_urls: Vec::new(),
        };
        assert!(matches!(
            request.validate(),
            Err(EstimatorError::Validation(_))
        ));
    }
}
