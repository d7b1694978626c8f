//! Structural extraction of declarations from source text.
//!
//! A lightweight indentation-aware scan of Python-dialect source. It tracks
//! open `def`/`class` blocks on a stack and closes them when a code line at
//! the same or lower indent appears, which is enough to recover accurate line
//! spans for declarations without a full parser.

use std::sync::OnceLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{AnalysisError, Result};

/// Inclusive, 1-indexed line span of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// First line of the declaration.
    pub start: usize,
    /// Last line of the declared body, `end >= start`.
    pub end: usize,
}

/// Declarations found in one source text, bucketed by kind.
///
/// Buckets preserve discovery order. Redeclaring a name keeps its original
/// position and replaces the span, so the last declaration wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceInventory {
    /// Top-level functions by name.
    pub functions: IndexMap<String, LineSpan>,
    /// Classes by name.
    pub classes: IndexMap<String, LineSpan>,
    /// Methods by qualified `Class.method` name.
    pub methods: IndexMap<String, LineSpan>,
}

impl SourceInventory {
    /// Total number of declared callables (functions plus methods).
    pub fn callable_count(&self) -> usize {
        self.functions.len() + self.methods.len()
    }
}

fn def_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:async\s+)?def\s+(\w+)\s*\(").unwrap())
}

fn class_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*class\s+(\w+)\s*[:(]").unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Function,
    Method,
    Class,
}

#[derive(Debug)]
struct OpenBlock {
    kind: BlockKind,
    name: String,
    indent: usize,
    start: usize,
}

/// Scan source text into a [`SourceInventory`].
///
/// Async and sync declaration forms are treated identically. A `def` lexically
/// inside a class body becomes a method named after the innermost enclosing
/// class; a `def` outside any class body is a top-level function. A `def` or
/// `class` keyword that does not form a well-formed header is a hard
/// [`AnalysisError::Parse`].
pub fn extract_inventory(source: &str) -> Result<SourceInventory> {
    let mut inventory = SourceInventory::default();
    let mut open: Vec<OpenBlock> = Vec::new();
    let mut last_code_line = 0usize;

    for (index, raw) in source.split('\n').enumerate() {
        let number = index + 1;
        let trimmed = raw.trim();
        // Blank and comment-only lines neither open nor close blocks.
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = indent_width(raw);
        while open.last().is_some_and(|block| block.indent >= indent) {
            if let Some(block) = open.pop() {
                close_block(&mut inventory, block, last_code_line);
            }
        }

        if let Some(caps) = def_header().captures(raw) {
            let base_name = caps[1].to_string();
            let enclosing_class = open
                .iter()
                .rev()
                .find(|block| block.kind == BlockKind::Class)
                .map(|block| block.name.clone());
            let (kind, name) = match enclosing_class {
                Some(class_name) => (BlockKind::Method, format!("{class_name}.{base_name}")),
                None => (BlockKind::Function, base_name),
            };
            open.push(OpenBlock {
                kind,
                name,
                indent,
                start: number,
            });
        } else if let Some(caps) = class_header().captures(raw) {
            open.push(OpenBlock {
                kind: BlockKind::Class,
                name: caps[1].to_string(),
                indent,
                start: number,
            });
        } else {
            reject_malformed_header(trimmed, number)?;
        }
        last_code_line = number;
    }

    while let Some(block) = open.pop() {
        close_block(&mut inventory, block, last_code_line);
    }

    Ok(inventory)
}

fn close_block(inventory: &mut SourceInventory, block: OpenBlock, last_code_line: usize) {
    let span = LineSpan {
        start: block.start,
        end: last_code_line.max(block.start),
    };
    let bucket = match block.kind {
        BlockKind::Function => &mut inventory.functions,
        BlockKind::Method => &mut inventory.methods,
        BlockKind::Class => &mut inventory.classes,
    };
    bucket.insert(block.name, span);
}

/// Reject lines that start a `def`/`class` statement but never form a header.
fn reject_malformed_header(trimmed: &str, line: usize) -> Result<()> {
    let head = match trimmed.strip_prefix("async ") {
        Some(rest) => rest.trim_start(),
        None => trimmed,
    };
    if head == "def" || head.starts_with("def ") || head.starts_with("def(") {
        return Err(AnalysisError::parse(line, "malformed def statement"));
    }
    if head == "class" || head.starts_with("class ") || head.starts_with("class(") {
        return Err(AnalysisError::parse(line, "malformed class statement"));
    }
    Ok(())
}

fn indent_width(line: &str) -> usize {
    let mut width = 0usize;
    for ch in line.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += 8 - (width % 8),
            _ => break,
        }
    }
    width
}

#[cfg(test)]
mod tests {
    use super::{LineSpan, extract_inventory};
    use crate::error::AnalysisError;

    #[test]
    fn extracts_top_level_functions() {
        let source = "def launch():\n    return 1\n\nasync def dock():\n    return 2\n";
        let inventory = extract_inventory(source).expect("inventory");

        assert_eq!(
            inventory.functions.get("launch"),
            Some(&LineSpan { start: 1, end: 2 })
        );
        assert_eq!(
            inventory.functions.get("dock"),
            Some(&LineSpan { start: 4, end: 5 })
        );
        assert!(inventory.classes.is_empty());
        assert!(inventory.methods.is_empty());
    }

    #[test]
    fn qualifies_methods_with_innermost_class() {
        let source = concat!(
            "class Outer:\n",
            "    def top(self):\n",
            "        pass\n",
            "    class Inner:\n",
            "        def deep(self):\n",
            "            pass\n",
        );
        let inventory = extract_inventory(source).expect("inventory");

        assert!(inventory.methods.contains_key("Outer.top"));
        assert!(inventory.methods.contains_key("Inner.deep"));
        assert_eq!(
            inventory.classes.get("Outer"),
            Some(&LineSpan { start: 1, end: 6 })
        );
        assert_eq!(
            inventory.classes.get("Inner"),
            Some(&LineSpan { start: 4, end: 6 })
        );
    }

    #[test]
    fn nested_def_in_method_collapses_to_enclosing_class() {
        let source = concat!(
            "class Ship:\n",
            "    def steer(self):\n",
            "        def helper():\n",
            "            pass\n",
        );
        let inventory = extract_inventory(source).expect("inventory");

        assert!(inventory.methods.contains_key("Ship.steer"));
        assert!(inventory.methods.contains_key("Ship.helper"));
        assert!(inventory.functions.is_empty());
    }

    #[test]
    fn nested_def_without_class_stays_a_function() {
        let source = "def outer():\n    def inner():\n        pass\n";
        let inventory = extract_inventory(source).expect("inventory");

        assert!(inventory.functions.contains_key("outer"));
        assert!(inventory.functions.contains_key("inner"));
        assert!(inventory.methods.is_empty());
    }

    #[test]
    fn async_and_sync_defs_share_a_bucket() {
        let source = "async def fetch():\n    pass\n\ndef fetch_sync():\n    pass\n";
        let inventory = extract_inventory(source).expect("inventory");

        assert_eq!(inventory.functions.len(), 2);
    }

    #[test]
    fn duplicate_name_keeps_position_and_takes_last_span() {
        let source = concat!(
            "def probe():\n",
            "    return 1\n",
            "def beacon():\n",
            "    return 2\n",
            "def probe():\n",
            "    return 3\n",
        );
        let inventory = extract_inventory(source).expect("inventory");

        assert_eq!(inventory.functions.len(), 2);
        let first = inventory.functions.get_index(0).expect("first entry");
        assert_eq!(first.0, "probe");
        assert_eq!(first.1, &LineSpan { start: 5, end: 6 });
    }

    #[test]
    fn trailing_blank_lines_are_excluded_from_spans() {
        let source = "def probe():\n    return 1\n\n\n";
        let inventory = extract_inventory(source).expect("inventory");

        assert_eq!(
            inventory.functions.get("probe"),
            Some(&LineSpan { start: 1, end: 2 })
        );
    }

    #[test]
    fn comment_lines_do_not_close_blocks() {
        let source = "def probe():\n# interlude\n    return 1\n";
        let inventory = extract_inventory(source).expect("inventory");

        assert_eq!(
            inventory.functions.get("probe"),
            Some(&LineSpan { start: 1, end: 3 })
        );
    }

    #[test]
    fn malformed_def_is_a_parse_error() {
        let error = extract_inventory("def :\n    pass\n").expect_err("parse failure");
        assert!(matches!(error, AnalysisError::Parse { line: 1, .. }));
    }

    #[test]
    fn class_without_colon_is_a_parse_error() {
        let error = extract_inventory("x = 1\nclass Rudder\n").expect_err("parse failure");
        assert!(matches!(error, AnalysisError::Parse { line: 2, .. }));
    }

    #[test]
    fn empty_source_yields_empty_inventory() {
        let inventory = extract_inventory("").expect("inventory");
        assert_eq!(inventory.callable_count(), 0);
        assert!(inventory.classes.is_empty());
    }
}
