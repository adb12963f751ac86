//! Category-specific acceptance rules
//!
//! Deterministic, pure filtering of untrusted candidates. Numeric thresholds
//! are strict: a value exactly at a threshold is rejected. When a candidate
//! carries no usable numeric evidence the validator measures against the
//! parsed structure where it can, falls back to the description-text
//! patterns in [`extract`], and otherwise follows the configured policy
//! (permissive by default, bounding false negatives at the cost of
//! precision).

pub mod extract;

use tracing::debug;

use crate::core::category::SmellCategory;
use crate::core::config::ValidationPolicy;
use crate::detector::schemas::Candidate;
use crate::structure::CodeUnit;

pub const MAX_METHOD_LINES: f64 = 67.0;
pub const MAX_PARAMETERS: f64 = 4.0;
pub const MAX_COMPLEXITY: f64 = 7.0;
pub const MAX_LOGICAL_OPERATORS: f64 = 2.0;
pub const MAX_STATEMENT_LENGTH: f64 = 120.0;
pub const MAX_IDENTIFIER_LENGTH: f64 = 20.0;
pub const MAX_LAMBDA_LENGTH: f64 = 80.0;
pub const MAX_CHAIN_LENGTH: f64 = 2.0;

/// Literal spellings that are never worth reporting as magic numbers.
const TRIVIAL_MAGIC_NUMBERS: &[&str] = &[
    "0", "1", "-1", "2", "-2", "0.0", "1.0", "-1.0", "2.0", "-2.0", "0.0f", "1.0f", "-1.0f",
    "2.0f", "-2.0f", "0L", "1L", "-1L", "2L", "-2L", "10", "100", "-10", "-100",
];

const TRIVIAL_MAGIC_VALUES: &[f64] = &[0.0, 1.0, -1.0, 2.0, -2.0, 10.0, 100.0];

/// Description phrases that mean the detector itself concluded there is no
/// violation; such candidates are noise regardless of any number they carry.
const NO_VIOLATION_PHRASES: &[&str] = &["under threshold", "no violation", "within acceptable"];

enum Evidence {
    Known(f64),
    Unknown,
}

pub struct FindingValidator {
    policy: ValidationPolicy,
}

impl FindingValidator {
    pub fn new(policy: ValidationPolicy) -> Self {
        Self { policy }
    }

    /// Accept or reject one candidate against its category's rule.
    pub fn validate(
        &self,
        category: SmellCategory,
        candidate: &Candidate,
        unit: &CodeUnit,
    ) -> bool {
        let accepted = match category {
            SmellCategory::LongMethod => self.check(
                self.method_lines_evidence(candidate, unit),
                MAX_METHOD_LINES,
            ),
            SmellCategory::ComplexMethod => {
                self.check(self.complexity_evidence(candidate, unit), MAX_COMPLEXITY)
            }
            SmellCategory::LongParameterList => {
                self.check(self.parameter_evidence(candidate, unit), MAX_PARAMETERS)
            }
            SmellCategory::ComplexConditional => self.check(
                numeric_field(candidate.logical_operators)
                    .or_else(|| extract::logical_operators(candidate.description_text()))
                    .map_or(Evidence::Unknown, Evidence::Known),
                MAX_LOGICAL_OPERATORS,
            ),
            SmellCategory::LongStatement => self.validate_long_statement(candidate, unit),
            SmellCategory::LongIdentifier => self.validate_long_identifier(candidate),
            SmellCategory::LongLambda => self.check(
                numeric_field(candidate.lambda_length)
                    .or_else(|| extract::characters(candidate.description_text()))
                    .map_or(Evidence::Unknown, Evidence::Known),
                MAX_LAMBDA_LENGTH,
            ),
            SmellCategory::LongMessageChain => self.check(
                numeric_field(candidate.chain_length)
                    .or_else(|| extract::chained_methods(candidate.description_text()))
                    .map_or(Evidence::Unknown, Evidence::Known),
                MAX_CHAIN_LENGTH,
            ),
            SmellCategory::MagicNumber => self.validate_magic_number(candidate),
            SmellCategory::EmptyCatchBlock => {
                self.structural_presence(unit, &unit.empty_handlers)
            }
            SmellCategory::MissingDefault => {
                self.structural_presence(unit, &unit.unguarded_matches)
            }
        };

        if !accepted {
            debug!(
                category = %category,
                method = candidate.method_name.as_deref().unwrap_or(""),
                "candidate rejected by validation rule"
            );
        }
        accepted
    }

    /// Strict comparison on known values; the configured policy decides the
    /// unknown case.
    fn check(&self, evidence: Evidence, threshold: f64) -> bool {
        match evidence {
            Evidence::Known(value) => value > threshold,
            Evidence::Unknown => !self.policy.strict_on_unknown,
        }
    }

    fn method_lines_evidence(&self, candidate: &Candidate, unit: &CodeUnit) -> Evidence {
        if let Some(value) = numeric_field(candidate.total_lines) {
            return Evidence::Known(value);
        }
        if let (Some(start), Some(end)) = (candidate.line_start, candidate.line_end) {
            if end >= start {
                return Evidence::Known((end - start + 1) as f64);
            }
        }
        if let Some((function, _)) = candidate
            .method_name
            .as_deref()
            .and_then(|name| unit.function_by_name(name))
        {
            return Evidence::Known(function.line_span() as f64);
        }
        extract::lines(candidate.description_text()).map_or(Evidence::Unknown, Evidence::Known)
    }

    fn complexity_evidence(&self, candidate: &Candidate, unit: &CodeUnit) -> Evidence {
        if let Some(value) = numeric_field(candidate.cyclomatic_complexity) {
            return Evidence::Known(value);
        }
        if let Some((function, _)) = candidate
            .method_name
            .as_deref()
            .and_then(|name| unit.function_by_name(name))
        {
            return Evidence::Known(unit.cyclomatic_complexity(function) as f64);
        }
        extract::complexity(candidate.description_text()).map_or(Evidence::Unknown, Evidence::Known)
    }

    fn parameter_evidence(&self, candidate: &Candidate, unit: &CodeUnit) -> Evidence {
        if let Some(value) = numeric_field(candidate.parameter_count) {
            return Evidence::Known(value);
        }
        if let Some((function, _)) = candidate
            .method_name
            .as_deref()
            .and_then(|name| unit.function_by_name(name))
        {
            return Evidence::Known(function.plain_parameter_count() as f64);
        }
        extract::parameters(candidate.description_text()).map_or(Evidence::Unknown, Evidence::Known)
    }

    fn validate_long_statement(&self, candidate: &Candidate, unit: &CodeUnit) -> bool {
        let description = candidate.description_text().to_lowercase();
        if NO_VIOLATION_PHRASES.iter().any(|p| description.contains(p)) {
            return false;
        }

        let evidence = numeric_field(candidate.line_length)
            .or_else(|| {
                candidate
                    .raw_line()
                    .and_then(|n| unit.line(n as usize))
                    .map(|line| line.chars().count() as f64)
            })
            .or_else(|| extract::characters(candidate.description_text()))
            .map_or(Evidence::Unknown, Evidence::Known);

        self.check(evidence, MAX_STATEMENT_LENGTH)
    }

    fn validate_long_identifier(&self, candidate: &Candidate) -> bool {
        if let Some(name) = candidate.identifier_name.as_deref() {
            let lowered = name.to_lowercase();
            if lowered.starts_with("__") && lowered.ends_with("__") {
                return false;
            }
            // The name itself is the measurement.
            return (name.chars().count() as f64) > MAX_IDENTIFIER_LENGTH;
        }

        let evidence = numeric_field(candidate.length)
            .or_else(|| extract::characters(candidate.description_text()))
            .map_or(Evidence::Unknown, Evidence::Known);
        self.check(evidence, MAX_IDENTIFIER_LENGTH)
    }

    fn validate_magic_number(&self, candidate: &Candidate) -> bool {
        let literal = candidate
            .magic_number
            .map(|v| trim_float(v))
            .or_else(|| extract::magic_number(candidate.description_text()));

        match literal {
            Some(spelling) => {
                if TRIVIAL_MAGIC_NUMBERS.contains(&spelling.as_str()) {
                    return false;
                }
                if let Ok(value) = spelling.parse::<f64>() {
                    if TRIVIAL_MAGIC_VALUES.contains(&value) {
                        return false;
                    }
                }
                true
            }
            None => !self.policy.strict_on_unknown,
        }
    }

    /// Empty Catch Block / Missing Default hold structurally or not at all.
    /// An unparsable unit leaves the structure unknown, so the permissive
    /// rule applies.
    fn structural_presence(
        &self,
        unit: &CodeUnit,
        structures: &[crate::structure::LineRange],
    ) -> bool {
        if !unit.is_parsable() {
            return !self.policy.strict_on_unknown;
        }
        !structures.is_empty()
    }
}

/// Candidate numeric fields use zero as "not filled in", matching the wire
/// behavior of detectors that emit every schema key.
fn numeric_field(value: Option<u32>) -> Option<f64> {
    value.filter(|v| *v > 0).map(|v| v as f64)
}

fn trim_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
