//! Instruction templates for category detectors.
//!
//! Each category gets one fixed instruction block plus the shared response
//! schema. The payload sent with it is the raw source annotated with line
//! numbers, which is the structural hint detectors anchor their line
//! evidence to.

use crate::core::category::SmellCategory;
use crate::structure::CodeUnit;

/// The JSON envelope detectors are asked to produce. Decoding is lenient,
/// but advertising one concrete shape keeps most responses on the happy
/// path.
pub const RESPONSE_SCHEMA: &str = r#"
Respond with ONLY a JSON object of this shape:
{
  "detections": [
    {
      "detected": true,
      "smell_type": "string",
      "method_name": "string (optional)",
      "identifier_name": "string (optional)",
      "line_no": 0,
      "description": "string, one sentence naming the finding and its measured value"
    }
  ],
  "analysis_summary": "string"
}
Return an empty "detections" list when nothing is found. Include the measured
value (lines, parameters, complexity, operators, characters, chained calls,
or the literal number) in every description.
"#;

pub fn instructions_for(category: SmellCategory) -> String {
    let task = match category {
        SmellCategory::ComplexMethod => {
            "Find methods or functions whose cyclomatic complexity exceeds 7. \
             Report the method name and the complexity you counted."
        }
        SmellCategory::LongMethod => {
            "Find methods or functions longer than 67 lines from their `def` \
             line to their last line. Report the method name and its line count."
        }
        SmellCategory::ComplexConditional => {
            "Find single conditional expressions using more than 2 logical \
             operators (`and`/`or`). Report the enclosing method, the line, and \
             the operator count."
        }
        SmellCategory::LongParameterList => {
            "Find functions or methods declaring more than 4 parameters, not \
             counting `self`/`cls` or `*args`/`**kwargs`. Report the method \
             name and the parameter count."
        }
        SmellCategory::LongStatement => {
            "Find source lines longer than 120 characters. Report the line \
             number and the character count."
        }
        SmellCategory::LongIdentifier => {
            "Find identifiers longer than 20 characters, ignoring dunder \
             names. Report the identifier name, its length, and its \
             definition line."
        }
        SmellCategory::MagicNumber => {
            "Find unexplained numeric literals used directly in logic. Skip \
             trivial values such as 0, 1, -1, 2, 10 and 100. Report each as \
             'Magic number <value>' with its line."
        }
        SmellCategory::EmptyCatchBlock => {
            "Find exception handlers whose body does nothing (only `pass` or \
             `...`). Report the enclosing method and the handler's line."
        }
        SmellCategory::MissingDefault => {
            "Find match statements with no wildcard `case _` arm. Report the \
             enclosing method and the statement's first line."
        }
        SmellCategory::LongLambda => {
            "Find lambda expressions longer than 80 characters. Report the \
             line and the character count."
        }
        SmellCategory::LongMessageChain => {
            "Find expressions chaining more than 2 method calls. Report the \
             enclosing method, the line, and the chained-call count."
        }
    };

    format!(
        "You are a code smell detector analyzing one Python source file. \
         {}\n{}",
        task, RESPONSE_SCHEMA
    )
}

/// Line-numbered rendition of the source plus the parsed function inventory,
/// so detectors report line evidence against the same numbering and names
/// the enricher resolves with.
pub fn build_payload(source: &str, unit: &CodeUnit) -> String {
    let mut payload = String::with_capacity(source.len() + source.len() / 8);

    let mut functions: Vec<String> = unit
        .all_functions()
        .map(|(f, class)| match class {
            Some(class) => format!("- {}.{} (lines {}-{})", class, f.name, f.start_line, f.end_line),
            None => format!("- {} (lines {}-{})", f.name, f.start_line, f.end_line),
        })
        .collect();
    if !functions.is_empty() {
        payload.push_str("Known functions:\n");
        functions.sort();
        for entry in functions {
            payload.push_str(&entry);
            payload.push('\n');
        }
        payload.push('\n');
    }

    payload.push_str("Analyze the following Python code:\n\n");
    for (idx, line) in source.lines().enumerate() {
        payload.push_str(&format!("{:>5} | {}\n", idx + 1, line));
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_instructions() {
        for category in SmellCategory::all() {
            let instructions = instructions_for(*category);
            assert!(instructions.contains("detections"));
            assert!(instructions.len() > 100);
        }
    }

    #[test]
    fn test_payload_is_line_numbered() {
        let source = "a = 1\nb = 2\n";
        let unit = CodeUnit::parse(source);
        let payload = build_payload(source, &unit);
        assert!(payload.contains("    1 | a = 1"));
        assert!(payload.contains("    2 | b = 2"));
    }

    #[test]
    fn test_payload_lists_known_functions() {
        let source = "def compute(x):\n    return x\n";
        let unit = CodeUnit::parse(source);
        let payload = build_payload(source, &unit);
        assert!(payload.contains("- compute (lines 1-2)"));
    }
}
