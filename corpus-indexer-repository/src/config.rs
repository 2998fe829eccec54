//! Mapping configuration used when creating a new index.

use serde::{Deserialize, Serialize};

/// Text analyzer applied to the `_all` and `body` fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Analyzer {
    /// Lowercased simple tokens, no stemming.
    Standard,
    /// Lowercased tokens with English stop words removed and stemming.
    #[default]
    En,
}

impl Analyzer {
    /// Name under which the analyzer is registered with the engine.
    pub fn tokenizer_name(&self) -> &'static str {
        match self {
            Self::Standard => "corpus_standard",
            Self::En => "corpus_en",
        }
    }
}

impl std::str::FromStr for Analyzer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "en" | "english" => Ok(Self::En),
            other => Err(format!("unknown analyzer '{}'", other)),
        }
    }
}

/// Mapping supplied to [`crate::TantivyIndex::create`].
///
/// The engine is schema-flexible: documents are stored as generic JSON
/// objects, so the mapping only chooses how text is analyzed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMapping {
    pub analyzer: Analyzer,
}

impl IndexMapping {
    /// Create a mapping with the given analyzer.
    pub fn with_analyzer(analyzer: Analyzer) -> Self {
        Self { analyzer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyzer_from_str() {
        assert_eq!("EN".parse::<Analyzer>(), Ok(Analyzer::En));
        assert_eq!("standard".parse::<Analyzer>(), Ok(Analyzer::Standard));
        assert!("keyword".parse::<Analyzer>().is_err());
    }

    #[test]
    fn test_default_mapping_uses_english() {
        assert_eq!(IndexMapping::default().analyzer, Analyzer::En);
    }
}
