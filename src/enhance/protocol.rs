//! Enhancement service wire types
//!
//! The request carries the document snapshot, the target suggestion ids,
//! and the document metadata the prompt needs. Responses are validated
//! strictly: a schema violation anywhere fails the whole batch, which the
//! queue then handles under its failure semantics.

use serde::{Deserialize, Serialize};

use crate::analyzers::DocumentMetadata;

// =============================================================================
// Request
// =============================================================================

/// One batch request for the remote rewrite service. Batches are grouped by
/// category so the prompt can specialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementRequest {
    pub batch_id: u64,
    pub category: String,
    pub target_suggestion_ids: Vec<String>,
    pub document_snapshot: String,
    pub metadata: DocumentMetadata,
}

// =============================================================================
// Response
// =============================================================================

/// One enhancement entry keyed back to its suggestion id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub id: String,
    #[serde(default)]
    pub enhanced_fix: Option<String>,
    pub confidence: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub should_replace: bool,
    #[serde(default)]
    pub alternative_fixes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnhancementResponse {
    pub suggestions: Vec<EnhancementResult>,
}

/// Parse and validate a raw response body. Any schema violation fails the
/// whole batch.
pub fn parse_response(body: &str) -> Result<EnhancementResponse, String> {
    let response: EnhancementResponse =
        serde_json::from_str(body).map_err(|e| format!("malformed response: {}", e))?;
    validate_response(&response)?;
    Ok(response)
}

/// Structural validation beyond what serde enforces.
pub fn validate_response(response: &EnhancementResponse) -> Result<(), String> {
    for result in &response.suggestions {
        if result.id.is_empty() {
            return Err("malformed response: empty suggestion id".to_string());
        }
        if !(0.0..=1.0).contains(&result.confidence) {
            return Err(format!(
                "malformed response: confidence {} outside [0, 1] for {}",
                result.confidence, result.id
            ));
        }
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
