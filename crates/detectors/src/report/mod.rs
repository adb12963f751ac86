//! Report aggregation
//!
//! Merges enriched findings from every category into the terminal report:
//! one ordered sequence (category order, then detector order within a
//! category), per-category counts, and the request-level usage summary.
//! Exact duplicates within a category collapse to one; findings in different
//! categories never collapse, the same line may legitimately carry two
//! different smells.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::core::category::SmellCategory;
use crate::core::result::{EnrichedFinding, SmellRecord};
use crate::core::usage::UsageSummary;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub findings: Vec<EnrichedFinding>,
    pub counts_by_category: BTreeMap<SmellCategory, usize>,
    pub usage: UsageSummary,
    /// Parse degradation note: set when the source was structurally
    /// unparsable and the pipeline ran against an empty structure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_error: Option<String>,
    pub generated_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Builds the report from per-category finding lists, already in
    /// category order.
    pub fn assemble(
        per_category: Vec<(SmellCategory, Vec<EnrichedFinding>)>,
        usage: UsageSummary,
        parse_error: Option<String>,
    ) -> Self {
        let mut findings = Vec::new();
        let mut counts_by_category = BTreeMap::new();

        for (category, category_findings) in per_category {
            let mut seen = HashSet::new();
            let mut kept = 0usize;
            for finding in category_findings {
                if !seen.insert(finding.dedup_key()) {
                    continue;
                }
                kept += 1;
                findings.push(finding);
            }
            if kept > 0 {
                counts_by_category.insert(category, kept);
            }
        }

        Self {
            findings,
            counts_by_category,
            usage,
            parse_error,
            generated_at: Utc::now(),
        }
    }

    pub fn total_findings(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn count_for(&self, category: SmellCategory) -> usize {
        self.counts_by_category.get(&category).copied().unwrap_or(0)
    }

    /// The flattened export rows downstream tooling consumes.
    pub fn records(&self) -> Vec<SmellRecord> {
        self.findings.iter().map(|f| f.to_record()).collect()
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
