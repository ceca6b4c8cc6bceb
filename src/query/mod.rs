// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The linkable-elements predicate.
//!
//! Hosts hand the modal a node test as selector text. The supported grammar is
//! the subset those selectors actually use: `*`, `name`, `self::name`, and
//! `|`-unions thereof. Evaluation is read-only against a loaded document.

use std::fmt;

use smol_str::SmolStr;

use crate::model::{Document, NodeId};

/// A parsed linkable-elements node test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkableQuery {
    source: String,
    alternatives: Vec<NameTest>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(SmolStr),
}

impl LinkableQuery {
    pub fn parse(source: &str) -> Result<Self, QueryParseError> {
        if source.trim().is_empty() {
            return Err(QueryParseError::Empty);
        }

        let mut alternatives = Vec::new();
        for raw in source.split('|') {
            let test = raw.trim();
            let test = test.strip_prefix("self::").unwrap_or(test);
            if test == "*" {
                alternatives.push(NameTest::Any);
                continue;
            }
            if test.is_empty() || !is_name(test) {
                return Err(QueryParseError::InvalidNameTest {
                    test: raw.trim().to_owned(),
                });
            }
            alternatives.push(NameTest::Name(SmolStr::new(test)));
        }
        Ok(Self {
            source: source.to_owned(),
            alternatives,
        })
    }

    /// The selector text as configured by the host.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the node is an element satisfying the test. Unknown nodes and
    /// non-element nodes never match.
    pub fn matches(&self, document: &Document, node_id: &NodeId) -> bool {
        let Some(node) = document.node(node_id) else {
            return false;
        };
        let Some(name) = node.name() else {
            return false;
        };
        self.alternatives.iter().any(|test| match test {
            NameTest::Any => true,
            NameTest::Name(expected) => expected.as_str() == name,
        })
    }
}

fn is_name(test: &str) -> bool {
    let mut chars = test.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParseError {
    Empty,
    InvalidNameTest { test: String },
}

impl fmt::Display for QueryParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("linkable elements query must not be empty"),
            Self::InvalidNameTest { test } => {
                write!(f, "invalid name test '{test}' in linkable elements query")
            }
        }
    }
}

impl std::error::Error for QueryParseError {}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{LinkableQuery, QueryParseError};
    use crate::model::{Document, DocumentId, NodeId};

    fn node_id(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    fn sample_document() -> Document {
        let mut document = Document::new(
            DocumentId::new("doc").expect("document id"),
            node_id("root"),
        );
        document
            .append_element(&node_id("root"), node_id("manual"), "manual")
            .expect("append manual");
        document
            .append_element(&node_id("manual"), node_id("section-1"), "section")
            .expect("append section");
        document
            .append_element(&node_id("manual"), node_id("para-1"), "para")
            .expect("append para");
        document
            .append_text(&node_id("para-1"), node_id("text-1"), "body")
            .expect("append text");
        document
    }

    #[rstest]
    #[case("self::section", "section-1", true)]
    #[case("self::section", "para-1", false)]
    #[case("section | para", "para-1", true)]
    #[case("*", "para-1", true)]
    #[case("self::section | self::manual", "manual", true)]
    fn name_tests_match_elements(
        #[case] source: &str,
        #[case] target: &str,
        #[case] expected: bool,
    ) {
        let document = sample_document();
        let query = LinkableQuery::parse(source).expect("parse query");
        assert_eq!(query.matches(&document, &node_id(target)), expected);
    }

    #[test]
    fn text_nodes_and_unknown_nodes_never_match() {
        let document = sample_document();
        let query = LinkableQuery::parse("*").expect("parse query");
        assert!(!query.matches(&document, &node_id("text-1")));
        assert!(!query.matches(&document, &node_id("nowhere")));
    }

    #[test]
    fn parse_rejects_empty_and_malformed_tests() {
        assert_eq!(LinkableQuery::parse("  ").unwrap_err(), QueryParseError::Empty);
        assert_eq!(
            LinkableQuery::parse("section | 1bad").unwrap_err(),
            QueryParseError::InvalidNameTest {
                test: "1bad".to_owned()
            }
        );
        assert!(LinkableQuery::parse("section |").is_err());
    }
}
