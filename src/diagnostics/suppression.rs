//! In-source suppressions.
//!
//! Two forms are understood:
//! - `#pragma warning disable ID[, ID]` ... `#pragma warning restore ID[, ID]`
//!   ranges, running to the end of the file when never restored;
//! - `// patternlint:ignore[ID, ID]` on the offending line and
//!   `// patternlint:ignore-next-line[ID]` on the line before it.
//!
//! An empty id list means every rule.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionBlock {
    pub start_line: usize,
    /// `None` when the range runs to the end of the file.
    pub end_line: Option<usize>,
    /// Empty means all ids.
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuppressionRule {
    pub ids: Vec<String>,
    pub reason: Option<String>,
    pub applies_to_next_line: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SuppressionContext {
    pub blocks: Vec<SuppressionBlock>,
    pub line_suppressions: HashMap<usize, SuppressionRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuppressionStats {
    pub total_suppressed: usize,
    pub suppressed_by_id: HashMap<String, usize>,
}

impl SuppressionStats {
    pub fn record(&mut self, id: &str) {
        self.total_suppressed += 1;
        *self.suppressed_by_id.entry(id.to_string()).or_insert(0) += 1;
    }

    pub fn merge(&mut self, other: SuppressionStats) {
        self.total_suppressed += other.total_suppressed;
        for (id, count) in other.suppressed_by_id {
            *self.suppressed_by_id.entry(id).or_insert(0) += count;
        }
    }
}

impl SuppressionContext {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.line_suppressions.is_empty()
    }

    /// Whether diagnostic `id` reported on 1-based `line` is suppressed.
    pub fn is_suppressed(&self, line: usize, id: &str) -> bool {
        [
            self.is_in_block(line, id),
            self.has_line_suppression(line, id),
            self.has_next_line_suppression(line, id),
        ]
        .into_iter()
        .any(|suppressed| suppressed)
    }

    fn is_in_block(&self, line: usize, id: &str) -> bool {
        self.blocks
            .iter()
            .filter(|block| line_within_block(line, block))
            .any(|block| id_matches(id, &block.ids))
    }

    fn has_line_suppression(&self, line: usize, id: &str) -> bool {
        self.line_suppressions
            .get(&line)
            .is_some_and(|rule| !rule.applies_to_next_line && id_matches(id, &rule.ids))
    }

    fn has_next_line_suppression(&self, line: usize, id: &str) -> bool {
        (line > 0)
            .then(|| self.line_suppressions.get(&(line - 1)))
            .flatten()
            .is_some_and(|rule| rule.applies_to_next_line && id_matches(id, &rule.ids))
    }
}

fn line_within_block(line: usize, block: &SuppressionBlock) -> bool {
    line >= block.start_line && block.end_line.map_or(true, |end| line <= end)
}

fn id_matches(id: &str, ids: &[String]) -> bool {
    ids.is_empty() || ids.iter().any(|allowed| allowed.eq_ignore_ascii_case(id) || allowed == "*")
}

static PRAGMA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*#\s*pragma\s+warning\s+(disable|restore)\b\s*([\w\s,]*?)\s*(?://.*)?$")
        .expect("pragma pattern")
});

static NEXT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//\s*patternlint:ignore-next-line(?:\s*\[([\w,\s*]*)\])?(?:\s*--\s*(.*))?$")
        .expect("next-line pattern")
});

static LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"//\s*patternlint:ignore(?:\s*\[([\w,\s*]*)\])?(?:\s*--\s*(.*))?$")
        .expect("line pattern")
});

enum LineParseResult {
    Disable(Vec<String>),
    Restore(Vec<String>),
    NextLine(Vec<String>, Option<String>),
    Line(Vec<String>, Option<String>),
    None,
}

fn parse_line(line: &str) -> LineParseResult {
    if let Some(captures) = PRAGMA.captures(line) {
        let ids = parse_ids(captures.get(2).map(|m| m.as_str()));
        return match captures.get(1).map(|m| m.as_str()) {
            Some("disable") => LineParseResult::Disable(ids),
            _ => LineParseResult::Restore(ids),
        };
    }
    if let Some(captures) = NEXT_LINE.captures(line) {
        return LineParseResult::NextLine(
            parse_ids(captures.get(1).map(|m| m.as_str())),
            reason(captures.get(2)),
        );
    }
    if let Some(captures) = LINE.captures(line) {
        return LineParseResult::Line(
            parse_ids(captures.get(1).map(|m| m.as_str())),
            reason(captures.get(2)),
        );
    }
    LineParseResult::None
}

fn reason(m: Option<regex::Match<'_>>) -> Option<String> {
    m.map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty())
}

fn parse_ids(list: Option<&str>) -> Vec<String> {
    list.map(|s| {
        s.split([',', ' ', '\t'])
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != "*")
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Open `#pragma warning disable` ranges; one entry per disable.
struct OpenBlocks(Vec<(usize, Vec<String>)>);

impl OpenBlocks {
    fn restore(&mut self, ids: &[String], line: usize, context: &mut SuppressionContext) {
        let mut still_open = Vec::new();
        for (start, open_ids) in self.0.drain(..) {
            if ids.is_empty() {
                context.blocks.push(SuppressionBlock {
                    start_line: start,
                    end_line: Some(line),
                    ids: open_ids,
                });
                continue;
            }
            if open_ids.is_empty() {
                // a blanket disable is not narrowed by restoring single ids
                still_open.push((start, open_ids));
                continue;
            }
            let (closed, remaining): (Vec<String>, Vec<String>) = open_ids
                .into_iter()
                .partition(|id| ids.iter().any(|r| r.eq_ignore_ascii_case(id)));
            if !closed.is_empty() {
                context.blocks.push(SuppressionBlock {
                    start_line: start,
                    end_line: Some(line),
                    ids: closed,
                });
            }
            if !remaining.is_empty() {
                still_open.push((start, remaining));
            }
        }
        self.0 = still_open;
    }
}

pub fn parse_suppressions(content: &str) -> SuppressionContext {
    let mut context = SuppressionContext::default();
    let mut open = OpenBlocks(Vec::new());

    for (line_number, line) in content.lines().enumerate().map(|(idx, l)| (idx + 1, l)) {
        match parse_line(line) {
            LineParseResult::Disable(ids) => open.0.push((line_number, ids)),
            LineParseResult::Restore(ids) => open.restore(&ids, line_number, &mut context),
            LineParseResult::NextLine(ids, reason) => {
                context.line_suppressions.insert(
                    line_number,
                    SuppressionRule {
                        ids,
                        reason,
                        applies_to_next_line: true,
                    },
                );
            }
            LineParseResult::Line(ids, reason) => {
                context.line_suppressions.insert(
                    line_number,
                    SuppressionRule {
                        ids,
                        reason,
                        applies_to_next_line: false,
                    },
                );
            }
            LineParseResult::None => {}
        }
    }

    context.blocks.extend(open.0.into_iter().map(|(start, ids)| SuppressionBlock {
        start_line: start,
        end_line: None,
        ids,
    }));
    context
}
