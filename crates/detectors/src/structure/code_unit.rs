use serde::{Deserialize, Serialize};

/// Inclusive 1-indexed line range within the analyzed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn contains(&self, line: usize) -> bool {
        self.start <= line && line <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionInfo {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    /// Parameter names as written, including `self`/`cls` receivers and
    /// splat forms (`*args`, `**kwargs`).
    pub parameters: Vec<String>,
    pub decorators: Vec<String>,
    /// Branching constructs in this function's own body, not counting
    /// nested function or class bodies.
    pub decision_points: u32,
}

impl FunctionInfo {
    pub fn line_span(&self) -> usize {
        self.end_line - self.start_line + 1
    }

    pub fn range(&self) -> LineRange {
        LineRange::new(self.start_line, self.end_line)
    }

    /// Parameter count for the Long Parameter List rule: implicit receivers
    /// and variadic catch-alls are not counted.
    pub fn plain_parameter_count(&self) -> usize {
        self.parameters
            .iter()
            .enumerate()
            .filter(|(i, p)| {
                if *i == 0 && (p.as_str() == "self" || p.as_str() == "cls") {
                    return false;
                }
                !p.starts_with('*') && p.as_str() != "/"
            })
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub start_line: usize,
    pub end_line: usize,
    pub methods: Vec<FunctionInfo>,
}

/// Immutable structural snapshot of one source file. Built once per analysis
/// request and shared read-only by detector input builders, validators, and
/// enrichers. Malformed source never fails the build: the unit comes back
/// with empty structure and `parse_error` set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeUnit {
    pub lines: Vec<String>,
    pub functions: Vec<FunctionInfo>,
    pub classes: Vec<ClassInfo>,
    /// Top-level name bindings (assignments, defs, classes), in source order.
    pub bindings: Vec<(String, usize)>,
    /// Exception handlers whose body is only `pass` or `...`.
    pub empty_handlers: Vec<LineRange>,
    /// Match statements with no unguarded `case _` arm.
    pub unguarded_matches: Vec<LineRange>,
    pub parse_error: Option<String>,
}

impl CodeUnit {
    pub fn parse(source: &str) -> Self {
        super::parser::extract(source)
    }

    pub fn is_parsable(&self) -> bool {
        self.parse_error.is_none()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// 1-indexed line lookup.
    pub fn line(&self, line_no: usize) -> Option<&str> {
        if line_no == 0 {
            return None;
        }
        self.lines.get(line_no - 1).map(|s| s.as_str())
    }

    pub fn is_valid_line(&self, line_no: usize) -> bool {
        line_no >= 1 && line_no <= self.lines.len()
    }

    /// All functions: top-level and nested first, then class methods paired
    /// with their class name.
    pub fn all_functions(&self) -> impl Iterator<Item = (&FunctionInfo, Option<&str>)> {
        self.functions.iter().map(|f| (f, None)).chain(
            self.classes.iter().flat_map(|c| {
                c.methods.iter().map(move |m| (m, Some(c.name.as_str())))
            }),
        )
    }

    /// Exact-name lookup; when several functions share a name across scopes,
    /// the first by ascending start line wins.
    pub fn function_by_name(&self, name: &str) -> Option<(&FunctionInfo, Option<&str>)> {
        self.all_functions()
            .filter(|(f, _)| f.name == name)
            .min_by_key(|(f, _)| f.start_line)
    }

    /// Innermost function (or method) whose range contains the line.
    pub fn function_at_line(&self, line_no: usize) -> Option<(&FunctionInfo, Option<&str>)> {
        self.all_functions()
            .filter(|(f, _)| f.range().contains(line_no))
            .min_by_key(|(f, _)| f.line_span())
    }

    pub fn class_at_line(&self, line_no: usize) -> Option<&str> {
        self.classes
            .iter()
            .filter(|c| c.start_line <= line_no && line_no <= c.end_line)
            .min_by_key(|c| c.end_line - c.start_line)
            .map(|c| c.name.as_str())
    }

    /// Line of the first top-level binding of `name`, if any.
    pub fn identifier_definition_line(&self, name: &str) -> Option<usize> {
        self.bindings
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, line)| *line)
            .min()
    }

    /// McCabe's measure restricted to the function's own body: one plus the
    /// pre-counted decision points.
    pub fn cyclomatic_complexity(&self, function: &FunctionInfo) -> u32 {
        1 + function.decision_points
    }
}
