//! Parsing of model responses into routing decisions.
//!
//! Models are asked for a bare JSON object but routinely wrap it in prose
//! or code fences. Parsing is therefore two-stage: a strict parse of the
//! whole content, then a retry on the largest `{…}` substring.

use router_core::{RouterError, RouterResult, RoutingDecision};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ModelDecision {
    service: Option<String>,
    confidence: Option<f64>,
    explanation: Option<String>,
}

/// Parse a model's response content into a routing decision.
///
/// # Errors
/// Returns `LlmProvider` when no JSON object with a non-blank `service`
/// can be extracted.
pub fn parse_decision(content: &str) -> RouterResult<RoutingDecision> {
    let parsed = serde_json::from_str::<ModelDecision>(content).or_else(|strict_err| {
        debug!(error = %strict_err, "strict parse failed, extracting object");
        extract_object(content)
            .ok_or(strict_err)
            .and_then(|candidate| serde_json::from_str::<ModelDecision>(candidate))
    });

    let decision = match parsed {
        Ok(decision) => decision,
        Err(error) => {
            return Err(RouterError::llm_provider_caused_by(
                "model response is not a JSON object",
                None,
                false,
                error,
            ))
        }
    };

    let service = decision
        .service
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            RouterError::llm_provider("model response is missing a service", None, false)
        })?;

    RoutingDecision::new(
        service,
        decision.confidence.unwrap_or(0.0),
        decision.explanation.unwrap_or_default(),
    )
}

// The largest `{…}` substring: first opening brace to last closing brace.
fn extract_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}
