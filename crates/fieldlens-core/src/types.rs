//! Core domain types for species identification.
//!
//! These types represent the canonical identification output. Provider-specific
//! response envelopes live in the `identify` module and are converted into
//! these shapes by the normalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Taxonomic category of an identified species.
///
/// `Unknown` is the lenient fallback for category strings the model invents —
/// normalization never fails on an unrecognized category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Plant,
    Mammal,
    Bird,
    Reptile,
    Amphibian,
    Insect,
    Fungi,
    #[default]
    Unknown,
}

impl Category {
    /// Parse a category label leniently.
    ///
    /// Accepts any casing and common plural forms; anything unrecognized maps
    /// to `Unknown` rather than failing.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "plant" | "plants" | "flora" => Self::Plant,
            "mammal" | "mammals" => Self::Mammal,
            "bird" | "birds" => Self::Bird,
            "reptile" | "reptiles" => Self::Reptile,
            "amphibian" | "amphibians" => Self::Amphibian,
            "insect" | "insects" | "bug" => Self::Insect,
            "fungi" | "fungus" | "mushroom" => Self::Fungi,
            _ => Self::Unknown,
        }
    }

    /// Canonical lowercase label, as used in prompts and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plant => "plant",
            Self::Mammal => "mammal",
            Self::Bird => "bird",
            Self::Reptile => "reptile",
            Self::Amphibian => "amphibian",
            Self::Insect => "insect",
            Self::Fungi => "fungi",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Safety-relevant edibility judgment attached to a species match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Edibility {
    Edible,
    ConditionallyEdible,
    Inedible,
    Poisonous,
    #[default]
    NotApplicable,
}

impl Edibility {
    /// Parse an edibility label leniently.
    ///
    /// Providers spell these inconsistently ("NOT_APPLICABLE",
    /// "conditionally edible", "conditionally-edible"); unrecognized values
    /// map to `NotApplicable`.
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .to_ascii_lowercase()
            .replace(['_', ' '], "-");
        match normalized.as_str() {
            "edible" => Self::Edible,
            "conditionally-edible" | "conditional" => Self::ConditionallyEdible,
            "inedible" | "not-edible" => Self::Inedible,
            "poisonous" | "toxic" | "venomous" => Self::Poisonous,
            _ => Self::NotApplicable,
        }
    }
}

/// A single species identification with confidence and safety metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesMatch {
    /// Common name (e.g., "American Robin")
    pub common_name: String,

    /// Scientific binomial name (e.g., "Turdus migratorius")
    pub scientific_name: String,

    /// Taxonomic family, when the model reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Taxonomic category
    pub category: Category,

    /// Confidence score, clamped to 0.0..=1.0 by the normalizer
    pub confidence: f32,

    /// Short description of the species
    pub description: String,

    /// Typical habitat
    pub habitat: String,

    /// Edibility classification
    pub edibility: Edibility,

    /// Free-text qualifications on the edibility judgment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edibility_details: Option<String>,

    /// Traditional/herbal usage notes, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub herbal_benefits: Option<String>,

    /// Safety warning. Always populated when `edibility` is `Poisonous`
    /// (the normalizer substitutes a default if the model omitted it).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_warning: Option<String>,
}

/// A lower-confidence candidate offered alongside the primary match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlternativeMatch {
    /// The candidate species
    #[serde(flatten)]
    pub species: SpeciesMatch,

    /// Short rationale for why this candidate was considered
    pub rationale: String,
}

/// The complete, normalized output of one identification call.
///
/// Invariants upheld by the normalizer:
/// - exactly one primary match
/// - at most 3 alternatives
/// - confidences non-increasing from primary through the last alternative
/// - poisonous matches carry a non-empty safety warning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentificationResult {
    /// Highest-confidence identification
    pub primary: SpeciesMatch,

    /// Up to 3 alternative candidates, ordered by non-increasing confidence
    pub alternatives: Vec<AlternativeMatch>,

    /// When the identification completed
    pub identified_at: DateTime<Utc>,

    /// Provider that produced the result ("gemini", "openai", "replicate")
    pub provider: String,

    /// Model identifier reported by or configured for the provider
    pub model: String,

    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

impl IdentificationResult {
    /// Check the confidence-ordering invariant across primary + alternatives.
    pub fn confidences_non_increasing(&self) -> bool {
        let mut prev = self.primary.confidence;
        for alt in &self.alternatives {
            if alt.species.confidence > prev {
                return false;
            }
            prev = alt.species.confidence;
        }
        true
    }
}
