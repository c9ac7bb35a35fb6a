//! Linter for compiled layouts: surfaces conditions the codecs tolerate.
//!
//! ## Rules
//!
//! - **DuplicateLabel**: two fields at the same nesting level share a label.
//!   Struct-mode output keeps only the later one.
//! - **UnlabeledField**: struct-mode write advances past the field's region
//!   without writing anything, so whatever the buffer held there survives.
//!
//! Findings are never errors; both codecs run the layout as-is.

use crate::layout::{FieldKind, Layout};
use std::collections::HashMap;

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    /// Label reused at one nesting level; the later value wins.
    DuplicateLabel,
    /// Field invisible to struct-mode coding; its bytes are skipped.
    UnlabeledField,
}

/// A single lint finding with the field's index path from the layout root.
#[derive(Debug, Clone)]
pub struct LintMessage {
    pub rule: LintRule,
    /// Field indices from the root layout down to the flagged field.
    pub path: Vec<usize>,
    pub label: Option<String>,
    pub message: String,
}

/// Run all rules on a layout, recursing into composites. Messages come out
/// in field order.
pub fn lint(layout: &Layout) -> Vec<LintMessage> {
    let mut out = Vec::new();
    let mut path = Vec::new();
    lint_level(layout, &mut path, &mut out);
    out
}

fn lint_level(layout: &Layout, path: &mut Vec<usize>, out: &mut Vec<LintMessage>) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, field) in layout.fields().iter().enumerate() {
        path.push(i);
        match &field.label {
            Some(label) => {
                if let Some(first) = seen.insert(label.as_str(), i) {
                    out.push(LintMessage {
                        rule: LintRule::DuplicateLabel,
                        path: path.clone(),
                        label: Some(label.clone()),
                        message: format!(
                            "label '{}' already used by field {} at this level; struct-mode output keeps the later value",
                            label, first
                        ),
                    });
                }
            }
            None => {
                out.push(LintMessage {
                    rule: LintRule::UnlabeledField,
                    path: path.clone(),
                    label: None,
                    message: format!(
                        "field {} has no label; struct-mode write skips its {} byte(s) without writing",
                        i,
                        field.size_in_bytes()
                    ),
                });
            }
        }
        if let FieldKind::Composite(inner) = &field.kind {
            lint_level(inner, path, out);
        }
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn clean_layout_passes() {
        let layout = parse("le x:u8 y:u16 z:f32").expect("compile");
        assert!(lint(&layout).is_empty());
    }

    #[test]
    fn duplicate_label_flagged() {
        let layout = parse("le x:u8 x:u16").expect("compile");
        let msgs = lint(&layout);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].rule, LintRule::DuplicateLabel);
        assert_eq!(msgs[0].path, vec![1]);
        assert_eq!(msgs[0].label.as_deref(), Some("x"));
    }

    #[test]
    fn unlabeled_field_flagged() {
        let layout = parse("le x:u8 u16 y:u8").expect("compile");
        let msgs = lint(&layout);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].rule, LintRule::UnlabeledField);
        assert_eq!(msgs[0].path, vec![1]);
    }

    #[test]
    fn same_label_across_levels_is_fine() {
        let inner = parse("le x:u8").expect("compile inner");
        let layout = crate::parser::compile(
            &["le x:u16 nested:", ""],
            vec![crate::parser::PatternArg::from(&inner)],
        )
        .expect("compile outer");
        assert!(lint(&layout).is_empty());
    }

    #[test]
    fn recurses_into_composites() {
        let inner = parse("le u8 a:u8 a:u8").expect("compile inner");
        let layout = crate::parser::compile(
            &["le nested:", ""],
            vec![crate::parser::PatternArg::from(&inner)],
        )
        .expect("compile outer");
        let msgs = lint(&layout);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].rule, LintRule::UnlabeledField);
        assert_eq!(msgs[0].path, vec![0, 0]);
        assert_eq!(msgs[1].rule, LintRule::DuplicateLabel);
        assert_eq!(msgs[1].path, vec![0, 2]);
    }
}
