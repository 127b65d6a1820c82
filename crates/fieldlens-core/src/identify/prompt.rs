//! Prompt construction for vision-model identification calls.
//!
//! The prompt pins the model to a fixed JSON schema so the normalizer has a
//! single shape to decode regardless of provider. Pure and deterministic:
//! the same hint always produces byte-identical output.

use crate::types::Category;

/// JSON schema the model is instructed to fill in.
///
/// Field names here are the contract with `normalize`; changing one side
/// without the other breaks decoding.
const RESPONSE_SCHEMA: &str = r#"{
  "primaryMatch": {
    "commonName": "string",
    "scientificName": "string",
    "family": "string or null",
    "category": "one of: plant, mammal, bird, reptile, amphibian, insect, fungi",
    "confidence": "number between 0.0 and 1.0",
    "description": "string, 1-3 sentences",
    "habitat": "string",
    "edibility": "one of: edible, conditionally-edible, inedible, poisonous, not-applicable",
    "edibilityDetails": "string or null",
    "herbalBenefits": "string or null",
    "safetyWarning": "string or null"
  },
  "alternativeMatches": [
    {
      "commonName": "string",
      "scientificName": "string",
      "family": "string or null",
      "category": "string",
      "confidence": "number between 0.0 and 1.0",
      "description": "string",
      "habitat": "string",
      "edibility": "string",
      "edibilityDetails": "string or null",
      "herbalBenefits": "string or null",
      "safetyWarning": "string or null",
      "rationale": "string, one sentence"
    }
  ]
}"#;

/// Build the identification prompt for an optional category hint.
pub fn build_prompt(hint: Option<Category>) -> String {
    let mut prompt = format!(
        "You are a wildlife and nature identification expert. Identify the \
         species shown in this photo.\n\n\
         Respond with a single JSON object, no surrounding text, matching \
         exactly this schema:\n{RESPONSE_SCHEMA}\n\n\
         Rules:\n\
         - Provide exactly one primaryMatch and between 1 and 3 alternativeMatches, \
           ordered by decreasing confidence.\n\
         - Lower the confidence scores when the photo is ambiguous, partial, or \
           low quality. Never overstate certainty.\n\
         - If edibility is \"poisonous\", safetyWarning must contain a clear, \
           specific warning. Never leave it null for poisonous species.\n\
         - Use \"not-applicable\" edibility for animals that are not plausibly \
           foraged."
    );

    if let Some(category) = hint {
        prompt.push_str(&format!(
            "\n- The user believes this is a {category}; weigh that hint but \
             correct it if the photo clearly shows otherwise."
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_schema_fields() {
        let prompt = build_prompt(None);
        for field in [
            "primaryMatch",
            "alternativeMatches",
            "commonName",
            "scientificName",
            "confidence",
            "edibility",
            "safetyWarning",
            "rationale",
        ] {
            assert!(prompt.contains(field), "schema field '{field}' missing");
        }
    }

    #[test]
    fn test_prompt_without_hint_has_no_hint_sentence() {
        let prompt = build_prompt(None);
        assert!(!prompt.contains("The user believes"));
    }

    #[test]
    fn test_prompt_with_hint_names_category() {
        let prompt = build_prompt(Some(Category::Bird));
        assert!(prompt.contains("The user believes this is a bird"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(build_prompt(Some(Category::Fungi)), build_prompt(Some(Category::Fungi)));
        assert_eq!(build_prompt(None), build_prompt(None));
    }

    #[test]
    fn test_prompt_instructs_poisonous_warning() {
        let prompt = build_prompt(None);
        assert!(prompt.contains("poisonous"));
        assert!(prompt.contains("safetyWarning must contain"));
    }
}
