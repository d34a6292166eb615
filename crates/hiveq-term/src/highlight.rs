//! Highlighter: marks search-term matches in rendered lines.
//!
//! Rules are derived from the active search term. A plain (non-regex) data
//! or slack search gets three rules: the term itself plus its single-byte
//! and UTF-16LE hex renderings, since binary data is printed as hex. Every
//! rule matches case-insensitively. Highlighting never changes the text,
//! only wraps matched spans in colour.

use std::borrow::Cow;
use std::ops::Range;

use anyhow::Context;
use crossterm::style::{style, Color, Stylize};
use hiveq_core::predicate::TermEncodings;
use hiveq_core::SearchCriteria;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::theme::{HighlightColors, OutputStyle};

/// One pattern to paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRule {
    pub pattern: String,
    pub is_regex: bool,
    pub ignore_case: bool,
    pub fg: Color,
    pub bg: Color,
}

impl HighlightRule {
    fn new(pattern: impl Into<String>, is_regex: bool, colors: HighlightColors) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex,
            ignore_case: true,
            fg: colors.fg,
            bg: colors.bg,
        }
    }

    fn compile(&self) -> anyhow::Result<Regex> {
        let source = if self.is_regex {
            Cow::Borrowed(self.pattern.as_str())
        } else {
            Cow::Owned(regex::escape(&self.pattern))
        };
        RegexBuilder::new(&source)
            .case_insensitive(self.ignore_case)
            .build()
            .with_context(|| format!("invalid highlight pattern {:?}", self.pattern))
    }
}

/// Rules for the search term in `criteria`, if it has one.
pub fn rules_for(criteria: &SearchCriteria, colors: HighlightColors) -> Vec<HighlightRule> {
    match criteria {
        SearchCriteria::NameSearch { term, is_regex, .. } => {
            vec![HighlightRule::new(term.as_str(), *is_regex, colors)]
        }
        SearchCriteria::DataSearch { term, is_regex: true, .. } => {
            vec![HighlightRule::new(term.as_str(), true, colors)]
        }
        SearchCriteria::DataSearch { term, .. } => {
            let encodings = TermEncodings::of(term);
            vec![
                HighlightRule::new(term.as_str(), false, colors),
                HighlightRule::new(encodings.single_byte, false, colors),
                HighlightRule::new(encodings.utf16le, false, colors),
            ]
        }
        _ => Vec::new(),
    }
}

/// Compiled highlight rules, built once per run.
#[derive(Debug, Clone, Default)]
pub struct Highlighter {
    rules: Vec<(HighlightRule, Regex)>,
    enabled: bool,
}

impl Highlighter {
    /// A highlighter that never paints.
    pub fn none() -> Self {
        Self::default()
    }

    /// Compile `rules`. With `enabled` false, [`paint`](Self::paint) is a no-op.
    pub fn new(rules: Vec<HighlightRule>, enabled: bool) -> anyhow::Result<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| -> anyhow::Result<_> {
                let re = rule.compile()?;
                Ok((rule, re))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        debug!(rules = rules.len(), enabled, "highlight: registered");
        Ok(Self { rules, enabled })
    }

    /// Rules for `criteria` in the colours of `style`.
    pub fn for_criteria(criteria: &SearchCriteria, style: &OutputStyle) -> anyhow::Result<Self> {
        Self::new(rules_for(criteria, style.highlight), style.color)
    }

    pub fn rules(&self) -> impl Iterator<Item = &HighlightRule> {
        self.rules.iter().map(|(rule, _)| rule)
    }

    /// Non-overlapping matched byte ranges in `line`, each with the index of
    /// the rule that claimed it. Overlapping matches merge into the earliest.
    pub fn spans(&self, line: &str) -> Vec<(Range<usize>, usize)> {
        let mut found: Vec<(Range<usize>, usize)> = self
            .rules
            .iter()
            .enumerate()
            .flat_map(|(idx, (_, re))| {
                re.find_iter(line)
                    .filter(|m| !m.is_empty())
                    .map(move |m| (m.range(), idx))
            })
            .collect();
        found.sort_by_key(|(range, idx)| (range.start, *idx));

        let mut merged: Vec<(Range<usize>, usize)> = Vec::with_capacity(found.len());
        for (range, idx) in found {
            match merged.last_mut() {
                Some((last, _)) if range.start <= last.end => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push((range, idx)),
            }
        }
        merged
    }

    /// `line` with every match wrapped in its rule's colours.
    pub fn paint<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if !self.enabled || self.rules.is_empty() {
            return Cow::Borrowed(line);
        }
        let spans = self.spans(line);
        if spans.is_empty() {
            return Cow::Borrowed(line);
        }

        let mut out = String::with_capacity(line.len() + spans.len() * 16);
        let mut cursor = 0;
        for (range, idx) in spans {
            let rule = &self.rules[idx].0;
            out.push_str(&line[cursor..range.start]);
            out.push_str(
                &style(&line[range.clone()])
                    .with(rule.fg)
                    .on(rule.bg)
                    .to_string(),
            );
            cursor = range.end;
        }
        out.push_str(&line[cursor..]);
        Cow::Owned(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
