// src/filter.rs

//! Package filter expressions
//!
//! A filter is a comma-separated list of terms:
//!
//! - `com.example.app` - exact package identifier
//! - `com.example.*` - `*` matches any run of characters
//! - `!com.example.keep` - exclude anything the rest of the term matches
//!
//! A package is selected when it matches at least one inclusion term (or
//! there are no inclusion terms) and no exclusion term. Exclusion always
//! wins. An empty filter selects everything.

use crate::error::{Error, Result};
use crate::parser::PackageRef;
use glob::Pattern;

const TERM_SEPARATOR: char = ',';
const NEGATION_MARKER: char = '!';
const WILDCARD: char = '*';

/// How a single term compares against an identifier
#[derive(Debug, Clone)]
enum Matcher {
    Exact(String),
    Wildcard(Pattern),
}

impl Matcher {
    fn compile(text: &str) -> Result<Self> {
        if !text.contains(WILDCARD) {
            return Ok(Matcher::Exact(text.to_string()));
        }

        // Only `*` is special; everything else glob would interpret is escaped.
        // Runs of `*` collapse to one; glob rejects `**` inside a component.
        let mut escaped = String::new();
        for (i, piece) in text.split(WILDCARD).enumerate() {
            if i > 0 && !escaped.ends_with(WILDCARD) {
                escaped.push(WILDCARD);
            }
            escaped.push_str(&Pattern::escape(piece));
        }

        Pattern::new(&escaped)
            .map(Matcher::Wildcard)
            .map_err(|e| Error::InvalidFilter {
                term: text.to_string(),
                reason: e.to_string(),
            })
    }

    fn matches(&self, identifier: &str) -> bool {
        match self {
            Matcher::Exact(id) => id == identifier,
            Matcher::Wildcard(pattern) => pattern.matches(identifier),
        }
    }
}

/// One parsed filter term
#[derive(Debug, Clone)]
pub struct FilterTerm {
    pub text: String,
    pub negated: bool,
    matcher: Matcher,
}

impl FilterTerm {
    pub fn matches(&self, identifier: &str) -> bool {
        self.matcher.matches(identifier)
    }
}

/// Compiled filter expression
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    terms: Vec<FilterTerm>,
}

impl PackageFilter {
    /// Parse a comma-separated filter string
    ///
    /// Blank terms (and a lone `!`) are ignored.
    pub fn parse(filter: &str) -> Result<Self> {
        let mut terms = Vec::new();

        for raw in filter.split(TERM_SEPARATOR) {
            let raw = raw.trim();
            let (negated, text) = match raw.strip_prefix(NEGATION_MARKER) {
                Some(rest) => (true, rest.trim()),
                None => (false, raw),
            };
            if text.is_empty() {
                continue;
            }

            terms.push(FilterTerm {
                text: text.to_string(),
                negated,
                matcher: Matcher::compile(text)?,
            });
        }

        Ok(Self { terms })
    }

    pub fn terms(&self) -> &[FilterTerm] {
        &self.terms
    }

    /// True when the filter selects every package
    pub fn is_match_all(&self) -> bool {
        self.terms.is_empty()
    }

    /// Whether a single identifier is selected
    pub fn is_match(&self, identifier: &str) -> bool {
        let mut includes = self.terms.iter().filter(|t| !t.negated).peekable();
        let included = includes.peek().is_none() || includes.any(|t| t.matches(identifier));

        included
            && !self
                .terms
                .iter()
                .filter(|t| t.negated)
                .any(|t| t.matches(identifier))
    }

    /// Selected packages, in the order they were given
    ///
    /// Pure function of its inputs, so the preview and commit passes see
    /// the same sequence for the same package list.
    pub fn find_matches(&self, packages: &[PackageRef]) -> Vec<PackageRef> {
        packages
            .iter()
            .filter(|p| self.is_match(&p.identifier))
            .cloned()
            .collect()
    }
}

/// Parse a filter string
pub fn parse_filter(filter: &str) -> Result<PackageFilter> {
    PackageFilter::parse(filter)
}

/// Apply a parsed filter to a package list
pub fn find_matches(filter: &PackageFilter, packages: &[PackageRef]) -> Vec<PackageRef> {
    filter.find_matches(packages)
}
