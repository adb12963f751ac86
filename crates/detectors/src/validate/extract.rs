//! Numeric evidence extraction from free-text descriptions.
//!
//! Detectors are instructed to put the measured value in every description,
//! but the field form is not guaranteed. These fixed patterns are the bridge
//! for that formatting variance; they are deliberately the only place the
//! validator reads free text. A more structured detector contract can delete
//! this module without touching the rules.

use regex::Regex;
use std::sync::OnceLock;

struct Patterns {
    characters: Vec<Regex>,
    lines: Vec<Regex>,
    complexity: Vec<Regex>,
    parameters: Vec<Regex>,
    logical_operators: Vec<Regex>,
    chained_methods: Vec<Regex>,
    magic_number: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        characters: compile(&[r"(?i)(\d+)\s*characters?"]),
        lines: compile(&[r"(?i)has (\d+) lines?", r"(?i)(\d+)\s*lines?"]),
        complexity: compile(&[
            r"(?i)cyclomatic complexity of (\d+)",
            r"(?i)CC\s*=?\s*(\d+)",
            r"(?i)complexity\s*(?:of|is|:)?\s*(\d+)",
        ]),
        parameters: compile(&[r"(?i)has (\d+) parameters?", r"(?i)(\d+)\s*parameters?"]),
        logical_operators: compile(&[
            r"(?i)has (\d+) logical operators?",
            r"(?i)(\d+)\s*logical\s*operators?",
            r"(?i)(\d+)\s*(?:and|or)\s*operators?",
        ]),
        chained_methods: compile(&[
            r"(?i)has (\d+) chained methods?",
            r"(?i)chain.*?(\d+)\s*methods?",
            r"(?i)(\d+)\s*chained",
        ]),
        magic_number: Regex::new(r"(?i)magic number\s+([0-9.eE+-]+)").unwrap(),
    })
}

fn compile(sources: &[&str]) -> Vec<Regex> {
    sources.iter().map(|s| Regex::new(s).unwrap()).collect()
}

fn first_number(patterns: &[Regex], description: &str) -> Option<f64> {
    for pattern in patterns {
        if let Some(capture) = pattern.captures(description) {
            if let Some(value) = capture.get(1) {
                if let Ok(parsed) = value.as_str().parse::<f64>() {
                    return Some(parsed);
                }
            }
        }
    }
    None
}

pub fn characters(description: &str) -> Option<f64> {
    first_number(&patterns().characters, description)
}

pub fn lines(description: &str) -> Option<f64> {
    first_number(&patterns().lines, description)
}

pub fn complexity(description: &str) -> Option<f64> {
    first_number(&patterns().complexity, description)
}

pub fn parameters(description: &str) -> Option<f64> {
    first_number(&patterns().parameters, description)
}

pub fn logical_operators(description: &str) -> Option<f64> {
    first_number(&patterns().logical_operators, description)
}

pub fn chained_methods(description: &str) -> Option<f64> {
    first_number(&patterns().chained_methods, description)
}

/// The literal mentioned as `Magic number <value>`, normalized the way the
/// trivial-set lookup expects (`e+`/`E+` collapsed).
pub fn magic_number(description: &str) -> Option<String> {
    patterns()
        .magic_number
        .captures(description)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().replace("e+", "e").replace("E+", "E"))
}
