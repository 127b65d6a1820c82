//! Normalization of raw model output into the canonical result.
//!
//! This is the only place that absorbs schema drift between provider
//! versions. Everything downstream sees `IdentificationResult` with its
//! invariants already enforced: confidences clamped to [0,1] and
//! non-increasing, at most 3 alternatives, poisonous matches always carrying
//! a safety warning.

use super::provider::VisionResponse;
use crate::error::IdentifyError;
use crate::types::{AlternativeMatch, Category, Edibility, IdentificationResult, SpeciesMatch};
use chrono::Utc;
use serde::Deserialize;

/// Substituted when the model classifies a species as poisonous but omits
/// the warning it was instructed to attach.
const DEFAULT_POISON_WARNING: &str =
    "This species is classified as poisonous. Do not touch, handle, or consume \
     it, and consult an expert before any interaction.";

// --- Wire shapes (the schema the prompt requests) ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePayload {
    primary_match: WireMatch,
    #[serde(default)]
    alternative_matches: Vec<WireAlternative>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMatch {
    common_name: String,
    #[serde(default)]
    scientific_name: String,
    #[serde(default)]
    family: Option<String>,
    #[serde(default)]
    category: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    description: String,
    #[serde(default)]
    habitat: String,
    #[serde(default)]
    edibility: String,
    #[serde(default)]
    edibility_details: Option<String>,
    #[serde(default)]
    herbal_benefits: Option<String>,
    #[serde(default)]
    safety_warning: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireAlternative {
    #[serde(flatten)]
    species: WireMatch,
    #[serde(default)]
    rationale: String,
}

/// Convert a raw model response into a normalized `IdentificationResult`.
///
/// `max_alternatives` is the configured cap (1..=3); anything beyond it is
/// dropped, keeping the highest-confidence entries.
pub fn normalize(
    response: &VisionResponse,
    provider: &str,
    max_alternatives: usize,
) -> Result<IdentificationResult, IdentifyError> {
    let json = extract_json(&response.text);
    let payload: WirePayload =
        serde_json::from_str(json).map_err(|e| IdentifyError::ParseFailure {
            message: format!("Model output is not valid identification JSON: {e}"),
        })?;

    let primary = normalize_match(payload.primary_match);

    let mut alternatives: Vec<AlternativeMatch> = payload
        .alternative_matches
        .into_iter()
        .map(|alt| AlternativeMatch {
            species: normalize_match(alt.species),
            rationale: alt.rationale,
        })
        .collect();

    // Highest-confidence alternatives first; stable so the model's original
    // order breaks ties.
    alternatives.sort_by(|a, b| {
        b.species
            .confidence
            .partial_cmp(&a.species.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    alternatives.truncate(max_alternatives.min(3));

    // The model's primary designation is authoritative: an alternative that
    // claims more confidence than the primary is clamped down, not promoted.
    let mut ceiling = primary.confidence;
    for alt in &mut alternatives {
        if alt.species.confidence > ceiling {
            alt.species.confidence = ceiling;
        }
        ceiling = alt.species.confidence;
    }

    Ok(IdentificationResult {
        primary,
        alternatives,
        identified_at: Utc::now(),
        provider: provider.to_string(),
        model: response.model.clone(),
        latency_ms: response.latency_ms,
    })
}

/// Normalize one wire match: clamp confidence, resolve enums leniently,
/// enforce the poisonous-warning rule.
fn normalize_match(wire: WireMatch) -> SpeciesMatch {
    let edibility = Edibility::from_label(&wire.edibility);

    let safety_warning = match wire.safety_warning {
        Some(warning) if !warning.trim().is_empty() => Some(warning),
        _ if edibility == Edibility::Poisonous => Some(DEFAULT_POISON_WARNING.to_string()),
        _ => None,
    };

    SpeciesMatch {
        common_name: wire.common_name,
        scientific_name: wire.scientific_name,
        family: wire.family.filter(|f| !f.trim().is_empty()),
        category: Category::from_label(&wire.category),
        confidence: clamp_confidence(wire.confidence),
        description: wire.description,
        habitat: wire.habitat,
        edibility,
        edibility_details: wire.edibility_details,
        herbal_benefits: wire.herbal_benefits,
        safety_warning,
    }
}

fn clamp_confidence(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Strip markdown code fences the model may wrap around its JSON, and trim
/// to the outermost object so stray prose around the payload doesn't break
/// parsing.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed);

    match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => &unfenced[start..=end],
        _ => unfenced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(text: &str) -> VisionResponse {
        VisionResponse {
            text: text.to_string(),
            model: "test-model".to_string(),
            latency_ms: 42,
        }
    }

    fn wire_match(name: &str, confidence: f32) -> String {
        format!(
            r#"{{"commonName":"{name}","scientificName":"Testus testus","category":"bird",
               "confidence":{confidence},"description":"d","habitat":"h",
               "edibility":"not-applicable"}}"#
        )
    }

    #[test]
    fn test_normalize_minimal_payload() {
        let text = format!(r#"{{"primaryMatch":{}}}"#, wire_match("Robin", 0.9));
        let result = normalize(&response(&text), "gemini", 3).unwrap();
        assert_eq!(result.primary.common_name, "Robin");
        assert_eq!(result.primary.category, Category::Bird);
        assert!(result.alternatives.is_empty());
        assert_eq!(result.provider, "gemini");
        assert_eq!(result.model, "test-model");
        assert_eq!(result.latency_ms, 42);
    }

    #[test]
    fn test_confidence_clamped_into_unit_interval() {
        let alt = r#"{"commonName":"Thrush","confidence":-0.4,"rationale":"similar","category":"bird","edibility":"inedible"}"#;
        let text = format!(
            r#"{{"primaryMatch":{},"alternativeMatches":[{alt}]}}"#,
            wire_match("Robin", 1.7),
        );
        let result = normalize(&response(&text), "gemini", 3).unwrap();
        assert_eq!(result.primary.confidence, 1.0);
        assert_eq!(result.alternatives[0].species.confidence, 0.0);
    }

    #[test]
    fn test_excess_alternatives_truncated_keeping_highest() {
        let alts: Vec<String> = [0.2_f32, 0.6, 0.4, 0.5, 0.1]
            .iter()
            .enumerate()
            .map(|(i, c)| {
                format!(
                    r#"{{"commonName":"Alt{i}","confidence":{c},"rationale":"r{i}","category":"bird","edibility":"inedible"}}"#
                )
            })
            .collect();
        let text = format!(
            r#"{{"primaryMatch":{},"alternativeMatches":[{}]}}"#,
            wire_match("Robin", 0.9),
            alts.join(",")
        );
        let result = normalize(&response(&text), "gemini", 3).unwrap();
        assert_eq!(result.alternatives.len(), 3);
        let confidences: Vec<f32> = result
            .alternatives
            .iter()
            .map(|a| a.species.confidence)
            .collect();
        assert_eq!(confidences, vec![0.6, 0.5, 0.4]);
        assert!(result.confidences_non_increasing());
    }

    #[test]
    fn test_alternative_above_primary_clamped_down() {
        let text = format!(
            r#"{{"primaryMatch":{},"alternativeMatches":[{{"commonName":"Upstart","confidence":0.95,"rationale":"bold","category":"bird","edibility":"inedible"}}]}}"#,
            wire_match("Robin", 0.7)
        );
        let result = normalize(&response(&text), "gemini", 3).unwrap();
        assert_eq!(result.primary.common_name, "Robin");
        assert_eq!(result.alternatives[0].species.confidence, 0.7);
        assert!(result.confidences_non_increasing());
    }

    #[test]
    fn test_unknown_category_maps_to_unknown() {
        let text = r#"{"primaryMatch":{"commonName":"Blob","category":"cryptid","confidence":0.5,"edibility":"inedible"}}"#;
        let result = normalize(&response(text), "gemini", 3).unwrap();
        assert_eq!(result.primary.category, Category::Unknown);
    }

    #[test]
    fn test_poisonous_without_warning_gets_default() {
        let text = r#"{"primaryMatch":{"commonName":"Death Cap","scientificName":"Amanita phalloides","category":"fungi","confidence":0.88,"edibility":"poisonous"}}"#;
        let result = normalize(&response(text), "gemini", 3).unwrap();
        let warning = result.primary.safety_warning.unwrap();
        assert!(!warning.is_empty());
        assert!(warning.contains("poisonous"));
    }

    #[test]
    fn test_poisonous_with_blank_warning_gets_default() {
        let text = r#"{"primaryMatch":{"commonName":"Death Cap","category":"fungi","confidence":0.88,"edibility":"poisonous","safetyWarning":"  "}}"#;
        let result = normalize(&response(text), "gemini", 3).unwrap();
        assert!(!result.primary.safety_warning.unwrap().trim().is_empty());
    }

    #[test]
    fn test_poisonous_with_warning_keeps_model_text() {
        let text = r#"{"primaryMatch":{"commonName":"Death Cap","category":"fungi","confidence":0.88,"edibility":"poisonous","safetyWarning":"Deadly. One cap can kill."}}"#;
        let result = normalize(&response(text), "gemini", 3).unwrap();
        assert_eq!(
            result.primary.safety_warning.as_deref(),
            Some("Deadly. One cap can kill.")
        );
    }

    #[test]
    fn test_non_poisonous_without_warning_stays_none() {
        let text = format!(r#"{{"primaryMatch":{}}}"#, wire_match("Robin", 0.9));
        let result = normalize(&response(&text), "gemini", 3).unwrap();
        assert!(result.primary.safety_warning.is_none());
    }

    #[test]
    fn test_malformed_output_is_parse_failure() {
        let err = normalize(&response("I think it's a bird?"), "gemini", 3).unwrap_err();
        assert!(matches!(err, IdentifyError::ParseFailure { .. }));
    }

    #[test]
    fn test_missing_primary_is_parse_failure() {
        let err = normalize(&response(r#"{"alternativeMatches":[]}"#), "gemini", 3).unwrap_err();
        assert!(matches!(err, IdentifyError::ParseFailure { .. }));
    }

    #[test]
    fn test_fenced_json_is_unwrapped() {
        let text = format!(
            "```json\n{{\"primaryMatch\":{}}}\n```",
            wire_match("Robin", 0.9)
        );
        let result = normalize(&response(&text), "gemini", 3).unwrap();
        assert_eq!(result.primary.common_name, "Robin");
    }

    #[test]
    fn test_prose_around_json_is_trimmed() {
        let text = format!(
            "Here is the identification:\n{{\"primaryMatch\":{}}}",
            wire_match("Robin", 0.9)
        );
        let result = normalize(&response(&text), "gemini", 3).unwrap();
        assert_eq!(result.primary.common_name, "Robin");
    }

    #[test]
    fn test_nan_confidence_becomes_zero() {
        assert_eq!(clamp_confidence(f32::NAN), 0.0);
        assert_eq!(clamp_confidence(0.5), 0.5);
        assert_eq!(clamp_confidence(2.0), 1.0);
        assert_eq!(clamp_confidence(-1.0), 0.0);
    }

    #[test]
    fn test_uppercase_edibility_spelling_accepted() {
        let text = r#"{"primaryMatch":{"commonName":"Robin","category":"bird","confidence":0.92,"edibility":"NOT_APPLICABLE"}}"#;
        let result = normalize(&response(text), "gemini", 3).unwrap();
        assert_eq!(result.primary.edibility, Edibility::NotApplicable);
    }
}
