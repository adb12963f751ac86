use serde::{Deserialize, Serialize};
use std::fmt;

/// The smell categories the pipeline knows how to detect, validate, and
/// enrich. Each category is handled by exactly one detector call per
/// analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmellCategory {
    ComplexMethod,
    LongMethod,
    ComplexConditional,
    LongParameterList,
    LongStatement,
    LongIdentifier,
    MagicNumber,
    EmptyCatchBlock,
    MissingDefault,
    #[serde(rename = "long_lambda_function")]
    LongLambda,
    LongMessageChain,
}

impl SmellCategory {
    /// Stable machine identifier, used for config, logging, and wire payloads.
    pub fn id(&self) -> &'static str {
        match self {
            Self::ComplexMethod => "complex_method",
            Self::LongMethod => "long_method",
            Self::ComplexConditional => "complex_conditional",
            Self::LongParameterList => "long_parameter_list",
            Self::LongStatement => "long_statement",
            Self::LongIdentifier => "long_identifier",
            Self::MagicNumber => "magic_number",
            Self::EmptyCatchBlock => "empty_catch_block",
            Self::MissingDefault => "missing_default",
            Self::LongLambda => "long_lambda_function",
            Self::LongMessageChain => "long_message_chain",
        }
    }

    /// Human-readable label used in exported records.
    pub fn label(&self) -> &'static str {
        match self {
            Self::ComplexMethod => "Complex method",
            Self::LongMethod => "Long method",
            Self::ComplexConditional => "Complex conditional",
            Self::LongParameterList => "Long parameter list",
            Self::LongStatement => "Long statement",
            Self::LongIdentifier => "Long identifier",
            Self::MagicNumber => "Magic number",
            Self::EmptyCatchBlock => "Empty catch block",
            Self::MissingDefault => "Missing default",
            Self::LongLambda => "Long lambda function",
            Self::LongMessageChain => "Long message chain",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().iter().copied().find(|c| c.id() == id)
    }

    /// Every category, in the fixed order detectors are dispatched and
    /// report findings are merged.
    pub fn all() -> &'static [SmellCategory] {
        &[
            Self::ComplexMethod,
            Self::LongMethod,
            Self::ComplexConditional,
            Self::LongParameterList,
            Self::LongStatement,
            Self::LongIdentifier,
            Self::MagicNumber,
            Self::EmptyCatchBlock,
            Self::MissingDefault,
            Self::LongLambda,
            Self::LongMessageChain,
        ]
    }

    /// Method-level smells resolve to a start-end line range rather than a
    /// single line.
    pub fn is_method_level(&self) -> bool {
        matches!(self, Self::LongMethod | Self::ComplexMethod)
    }
}

impl fmt::Display for SmellCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip() {
        for category in SmellCategory::all() {
            assert_eq!(SmellCategory::from_id(category.id()), Some(*category));
        }
    }

    #[test]
    fn test_all_categories_unique() {
        let ids: std::collections::HashSet<_> =
            SmellCategory::all().iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), SmellCategory::all().len());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&SmellCategory::LongParameterList).unwrap();
        assert_eq!(json, "\"long_parameter_list\"");
    }
}
