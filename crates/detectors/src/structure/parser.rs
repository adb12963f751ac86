//! Structural extraction from Python source via tree-sitter.
//!
//! Scope-sensitive structure (functions, classes, bindings, decision points)
//! is collected by recursive traversal; flat structural facts (exception
//! handlers, match statements) are collected through declarative queries.

use streaming_iterator::StreamingIterator;
use tracing::debug;
use tree_sitter::{Node, Parser, Query, QueryCursor};

use super::code_unit::{ClassInfo, CodeUnit, FunctionInfo, LineRange};

const HANDLER_QUERY: &str = r#"
(except_clause) @handler
"#;

const MATCH_QUERY: &str = r#"
(match_statement) @match
"#;

pub(crate) fn extract(source: &str) -> CodeUnit {
    let lines: Vec<String> = source.lines().map(|l| l.to_string()).collect();

    let mut parser = Parser::new();
    let language: tree_sitter::Language = tree_sitter_python::LANGUAGE.into();
    if parser.set_language(&language).is_err() {
        return unparsable(lines, "grammar unavailable");
    }

    let tree = match parser.parse(source, None) {
        Some(tree) => tree,
        None => return unparsable(lines, "parser returned no tree"),
    };

    let root = tree.root_node();
    if root.has_error() {
        debug!("source has syntax errors, returning unparsable unit");
        return unparsable(lines, "syntax error");
    }

    let mut extractor = StructureExtractor {
        source,
        language,
        functions: Vec::new(),
        classes: Vec::new(),
        bindings: Vec::new(),
        empty_handlers: Vec::new(),
        unguarded_matches: Vec::new(),
    };

    extractor.extract_top_level(&root);
    extractor.extract_handlers(&root);
    extractor.extract_matches(&root);

    CodeUnit {
        lines,
        functions: extractor.functions,
        classes: extractor.classes,
        bindings: extractor.bindings,
        empty_handlers: extractor.empty_handlers,
        unguarded_matches: extractor.unguarded_matches,
        parse_error: None,
    }
}

fn unparsable(lines: Vec<String>, reason: &str) -> CodeUnit {
    CodeUnit {
        lines,
        functions: Vec::new(),
        classes: Vec::new(),
        bindings: Vec::new(),
        empty_handlers: Vec::new(),
        unguarded_matches: Vec::new(),
        parse_error: Some(reason.to_string()),
    }
}

struct StructureExtractor<'a> {
    source: &'a str,
    language: tree_sitter::Language,
    functions: Vec<FunctionInfo>,
    classes: Vec<ClassInfo>,
    bindings: Vec<(String, usize)>,
    empty_handlers: Vec<LineRange>,
    unguarded_matches: Vec<LineRange>,
}

impl<'a> StructureExtractor<'a> {
    fn text(&self, node: &Node) -> &'a str {
        &self.source[node.byte_range()]
    }

    fn start_line(node: &Node) -> usize {
        node.start_position().row + 1
    }

    fn end_line(node: &Node) -> usize {
        node.end_position().row + 1
    }

    fn extract_top_level(&mut self, root: &Node) {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            self.record_top_level_binding(&child);
            self.visit_statement(&child, None, &[]);
        }
    }

    /// Top-level assignments, defs, and classes bind names at module scope.
    fn record_top_level_binding(&mut self, node: &Node) {
        match node.kind() {
            "expression_statement" => {
                let Some(expr) = node.named_child(0) else {
                    return;
                };
                if expr.kind() != "assignment" {
                    return;
                }
                let Some(left) = expr.child_by_field_name("left") else {
                    return;
                };
                match left.kind() {
                    "identifier" => {
                        self.bindings
                            .push((self.text(&left).to_string(), Self::start_line(&left)));
                    }
                    "pattern_list" | "tuple_pattern" => {
                        let mut cursor = left.walk();
                        for target in left.children(&mut cursor) {
                            if target.kind() == "identifier" {
                                self.bindings.push((
                                    self.text(&target).to_string(),
                                    Self::start_line(&target),
                                ));
                            }
                        }
                    }
                    _ => {}
                }
            }
            "function_definition" | "class_definition" => {
                if let Some(name) = node.child_by_field_name("name") {
                    self.bindings
                        .push((self.text(&name).to_string(), Self::start_line(node)));
                }
            }
            "decorated_definition" => {
                if let Some(inner) = node.child_by_field_name("definition") {
                    if let Some(name) = inner.child_by_field_name("name") {
                        self.bindings
                            .push((self.text(&name).to_string(), Self::start_line(node)));
                    }
                }
            }
            _ => {}
        }
    }

    /// Walks one statement, collecting function and class structure. When
    /// `class_name` is set the statement sits directly in that class body, so
    /// function definitions become methods.
    fn visit_statement(&mut self, node: &Node, class_name: Option<&str>, decorators: &[String]) {
        match node.kind() {
            "decorated_definition" => {
                let decs = self.collect_decorators(node);
                if let Some(inner) = node.child_by_field_name("definition") {
                    self.visit_statement(&inner, class_name, &decs);
                }
            }
            "function_definition" => {
                let function = self.build_function(node, decorators);
                match class_name {
                    Some(name) => {
                        if let Some(class) = self.classes.iter_mut().find(|c| c.name == name) {
                            class.methods.push(function);
                        }
                    }
                    None => self.functions.push(function),
                }
                // Nested defs and classes live in their own scope.
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit_block(&body, None);
                }
            }
            "class_definition" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| self.text(&n).to_string())
                    .unwrap_or_default();
                self.classes.push(ClassInfo {
                    name: name.clone(),
                    start_line: Self::start_line(node),
                    end_line: Self::end_line(node),
                    methods: Vec::new(),
                });
                if let Some(body) = node.child_by_field_name("body") {
                    self.visit_block(&body, Some(&name));
                }
            }
            _ => {
                // Compound statements (if/for/while/try/with/match) may hide
                // nested definitions; descend through their blocks.
                let mut cursor = node.walk();
                let children: Vec<Node> = node.children(&mut cursor).collect();
                for child in children {
                    if child.kind() == "block" {
                        self.visit_block(&child, None);
                    } else if child.is_named() {
                        self.visit_statement(&child, None, &[]);
                    }
                }
            }
        }
    }

    fn visit_block(&mut self, block: &Node, class_name: Option<&str>) {
        let mut cursor = block.walk();
        let children: Vec<Node> = block.children(&mut cursor).collect();
        for child in children {
            self.visit_statement(&child, class_name, &[]);
        }
    }

    fn collect_decorators(&self, decorated: &Node) -> Vec<String> {
        let mut decorators = Vec::new();
        let mut cursor = decorated.walk();
        for child in decorated.children(&mut cursor) {
            if child.kind() == "decorator" {
                let text = self.text(&child).trim_start_matches('@');
                let name = text.split('(').next().unwrap_or(text).trim();
                decorators.push(name.to_string());
            }
        }
        decorators
    }

    fn build_function(&self, node: &Node, decorators: &[String]) -> FunctionInfo {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();

        let parameters = node
            .child_by_field_name("parameters")
            .map(|p| self.extract_parameters(&p))
            .unwrap_or_default();

        let decision_points = node
            .child_by_field_name("body")
            .map(|body| count_decision_points(&body))
            .unwrap_or(0);

        FunctionInfo {
            name,
            start_line: Self::start_line(node),
            end_line: Self::end_line(node),
            parameters,
            decorators: decorators.to_vec(),
            decision_points,
        }
    }

    fn extract_parameters(&self, params: &Node) -> Vec<String> {
        let mut names = Vec::new();
        let mut cursor = params.walk();
        for child in params.children(&mut cursor) {
            match child.kind() {
                "identifier" => names.push(self.text(&child).to_string()),
                "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    // Splat text keeps its stars so the parameter-count rule
                    // can recognize variadics.
                    let text = self.text(&child);
                    let name = text.split(':').next().unwrap_or(text).trim();
                    names.push(name.to_string());
                }
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(name) = child.child_by_field_name("name") {
                        let text = self.text(&name);
                        let name = text.split(':').next().unwrap_or(text).trim();
                        names.push(name.to_string());
                    }
                }
                _ => {}
            }
        }
        names
    }

    fn extract_handlers(&mut self, root: &Node) {
        let Ok(query) = Query::new(&self.language, HANDLER_QUERY) else {
            return;
        };
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, *root, self.source.as_bytes());

        matches.advance();
        while let Some(match_) = matches.get() {
            for capture in match_.captures {
                let handler = capture.node;
                if self.handler_body_is_empty(&handler) {
                    self.empty_handlers
                        .push(LineRange::new(Self::start_line(&handler), Self::end_line(&handler)));
                }
            }
            matches.advance();
        }
    }

    /// A handler is empty when its block holds nothing but `pass` or `...`.
    fn handler_body_is_empty(&self, handler: &Node) -> bool {
        let mut cursor = handler.walk();
        let Some(block) = handler
            .children(&mut cursor)
            .find(|c| c.kind() == "block")
        else {
            return false;
        };

        let mut cursor = block.walk();
        let statements: Vec<Node> = block.children(&mut cursor).filter(|c| c.is_named()).collect();
        if statements.is_empty() {
            return false;
        }

        statements.iter().all(|stmt| match stmt.kind() {
            "pass_statement" => true,
            "expression_statement" => stmt
                .named_child(0)
                .map(|e| e.kind() == "ellipsis")
                .unwrap_or(false),
            _ => false,
        })
    }

    fn extract_matches(&mut self, root: &Node) {
        let Ok(query) = Query::new(&self.language, MATCH_QUERY) else {
            return;
        };
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, *root, self.source.as_bytes());

        matches.advance();
        while let Some(match_) = matches.get() {
            for capture in match_.captures {
                let statement = capture.node;
                if !self.match_has_wildcard(&statement) {
                    self.unguarded_matches.push(LineRange::new(
                        Self::start_line(&statement),
                        Self::end_line(&statement),
                    ));
                }
            }
            matches.advance();
        }
    }

    /// True when the match carries an unguarded `case _` arm.
    fn match_has_wildcard(&self, statement: &Node) -> bool {
        let Some(body) = statement.child_by_field_name("body") else {
            return false;
        };
        let mut cursor = body.walk();
        for clause in body.children(&mut cursor) {
            if clause.kind() != "case_clause" {
                continue;
            }
            if clause.child_by_field_name("guard").is_some() {
                continue;
            }
            let mut clause_cursor = clause.walk();
            let has_wildcard = clause
                .children(&mut clause_cursor)
                .filter(|c| c.kind() == "case_pattern")
                .any(|pattern| self.text(&pattern).trim() == "_");
            if has_wildcard {
                return true;
            }
        }
        false
    }
}

/// Counts branching constructs in a function body: `if`/`elif`, loop
/// headers, exception handlers, and each boolean short-circuit operator.
/// Bodies of nested functions and classes are excluded; they carry their
/// own counts.
fn count_decision_points(body: &Node) -> u32 {
    let mut count = 0;
    let mut cursor = body.walk();
    let children: Vec<Node> = body.children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "function_definition" | "class_definition" => continue,
            "decorated_definition" => continue,
            "if_statement" | "elif_clause" | "for_statement" | "while_statement"
            | "except_clause" | "boolean_operator" => {
                count += 1;
                count += count_decision_points(&child);
            }
            _ => count += count_decision_points(&child),
        }
    }
    count
}
