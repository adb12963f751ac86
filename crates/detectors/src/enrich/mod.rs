//! Location resolution and context attachment
//!
//! Turns an accepted candidate into a reportable finding by pinning it to a
//! real location in the parsed structure: an identifier's definition line, a
//! method's start line (or full range for method-level smells), or the
//! candidate's own line number when it indexes a real line. Candidates that
//! resolve to nothing are dropped here, never emitted with a guessed
//! location.

use tracing::debug;

use crate::core::category::SmellCategory;
use crate::core::context::FileContext;
use crate::core::result::{EnrichedFinding, Location};
use crate::detector::schemas::Candidate;
use crate::structure::CodeUnit;

pub struct FindingEnricher;

impl FindingEnricher {
    pub fn new() -> Self {
        Self
    }

    /// Resolves one validated candidate, or drops it when no location can be
    /// established.
    pub fn enrich(
        &self,
        category: SmellCategory,
        candidate: &Candidate,
        unit: &CodeUnit,
        context: &FileContext,
    ) -> Option<EnrichedFinding> {
        let resolved = self.resolve(category, candidate, unit);

        let Some((location, method_name, class_name)) = resolved else {
            debug!(
                category = %category,
                method = candidate.method_name.as_deref().unwrap_or(""),
                identifier = candidate.identifier_name.as_deref().unwrap_or(""),
                "dropping unresolvable finding"
            );
            return None;
        };

        let class_name =
            class_name.or_else(|| unit.class_at_line(location.line).map(|c| c.to_string()));

        let description = match candidate.description.as_deref() {
            Some(text) if !text.trim().is_empty() => text.trim().to_string(),
            _ => self.default_description(category, method_name.as_deref()),
        };

        Some(EnrichedFinding {
            category,
            location,
            description,
            method_name,
            class_name,
            module_name: context.module_name.clone(),
            package_name: context.package_name.clone(),
            file_path: context.file_path.clone(),
            project: context.project.clone(),
        })
    }

    /// Resolution order: named identifier, named method, raw line. Each
    /// source of evidence is checked against the parsed structure; nothing
    /// is trusted on its own.
    fn resolve(
        &self,
        category: SmellCategory,
        candidate: &Candidate,
        unit: &CodeUnit,
    ) -> Option<(Location, Option<String>, Option<String>)> {
        if let Some(name) = candidate.identifier_name.as_deref() {
            if let Some(line) = unit.identifier_definition_line(name) {
                return Some((Location::line(line), None, None));
            }
        }

        if let Some(name) = candidate.method_name.as_deref() {
            if let Some((function, class)) = unit.function_by_name(name) {
                let location = if category.is_method_level() {
                    Location::range(function.start_line, function.end_line)
                } else {
                    Location::line(function.start_line)
                };
                return Some((
                    location,
                    Some(function.name.clone()),
                    class.map(|c| c.to_string()),
                ));
            }
        }

        if let Some(line) = candidate.raw_line() {
            let line = line as usize;
            if unit.is_valid_line(line) {
                let method_name = unit
                    .function_at_line(line)
                    .map(|(f, _)| f.name.clone());
                return Some((Location::line(line), method_name, None));
            }
        }

        None
    }

    fn default_description(&self, category: SmellCategory, method: Option<&str>) -> String {
        match method {
            Some(method) => format!("{} detected in {}.", category.label(), method),
            None => format!("{} detected.", category.label()),
        }
    }
}

impl Default for FindingEnricher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_unit() -> CodeUnit {
        CodeUnit::parse(
            r#"
GRAVITY_CONSTANT = 9.81

class Simulator:
    def step(self, dt):
        if dt > 0:
            return dt
        return 0

def helper(x):
    return x
"#,
        )
    }

    fn context() -> FileContext {
        FileContext::from_path("sim/physics.py", "Sim")
    }

    fn enricher() -> FindingEnricher {
        FindingEnricher::new()
    }

    #[test]
    fn test_identifier_resolution() {
        let unit = fixture_unit();
        let candidate = Candidate {
            identifier_name: Some("GRAVITY_CONSTANT".to_string()),
            description: Some("Identifier 'GRAVITY_CONSTANT' is long".to_string()),
            ..Default::default()
        };

        let finding = enricher()
            .enrich(SmellCategory::LongIdentifier, &candidate, &unit, &context())
            .unwrap();
        assert_eq!(finding.location, Location::line(2));
        assert_eq!(finding.module_name, "physics");
        assert_eq!(finding.package_name, "sim");
    }

    #[test]
    fn test_method_resolution_uses_range_for_method_level() {
        let unit = fixture_unit();
        let candidate = Candidate {
            method_name: Some("step".to_string()),
            ..Default::default()
        };

        let finding = enricher()
            .enrich(SmellCategory::LongMethod, &candidate, &unit, &context())
            .unwrap();
        assert_eq!(finding.location, Location::range(5, 8));
        assert_eq!(finding.class_name.as_deref(), Some("Simulator"));
        assert_eq!(finding.method_name.as_deref(), Some("step"));
    }

    #[test]
    fn test_method_resolution_uses_start_line_for_line_level() {
        let unit = fixture_unit();
        let candidate = Candidate {
            method_name: Some("step".to_string()),
            ..Default::default()
        };

        let finding = enricher()
            .enrich(SmellCategory::LongParameterList, &candidate, &unit, &context())
            .unwrap();
        assert_eq!(finding.location, Location::line(5));
    }

    #[test]
    fn test_raw_line_fallback_names_enclosing_method() {
        let unit = fixture_unit();
        let candidate = Candidate {
            line_no: Some(6),
            description: Some("A conditional with 4 operators".to_string()),
            ..Default::default()
        };

        let finding = enricher()
            .enrich(SmellCategory::ComplexConditional, &candidate, &unit, &context())
            .unwrap();
        assert_eq!(finding.location, Location::line(6));
        assert_eq!(finding.method_name.as_deref(), Some("step"));
        assert_eq!(finding.class_name.as_deref(), Some("Simulator"));
    }

    #[test]
    fn test_unresolvable_candidate_is_dropped() {
        let unit = fixture_unit();
        let candidate = Candidate {
            method_name: Some("no_such_method".to_string()),
            identifier_name: Some("no_such_name".to_string()),
            line_no: Some(10_000),
            ..Default::default()
        };

        assert!(enricher()
            .enrich(SmellCategory::LongMethod, &candidate, &unit, &context())
            .is_none());
    }

    #[test]
    fn test_candidate_with_no_evidence_is_dropped() {
        let unit = fixture_unit();
        let candidate = Candidate::default();
        assert!(enricher()
            .enrich(SmellCategory::MagicNumber, &candidate, &unit, &context())
            .is_none());
    }

    #[test]
    fn test_blank_description_replaced() {
        let unit = fixture_unit();
        let candidate = Candidate {
            method_name: Some("helper".to_string()),
            description: Some("  ".to_string()),
            ..Default::default()
        };

        let finding = enricher()
            .enrich(SmellCategory::ComplexMethod, &candidate, &unit, &context())
            .unwrap();
        assert_eq!(finding.description, "Complex method detected in helper.");
    }
}
