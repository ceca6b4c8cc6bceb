// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only DOM-like document trees.
//!
//! The browser never mutates document content; it only walks trees the host
//! has loaded. Nodes live in an arena indexed by insertion order, with parent
//! pointers so ancestor walks are a single pass instead of a recursive search.

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;
use smol_str::SmolStr;

use super::ids::{DocumentId, NodeId};

/// A loaded document: a document node at the root, elements and text below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    document_id: DocumentId,
    nodes: Vec<DomNode>,
    index_by_id: BTreeMap<NodeId, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomNode {
    node_id: NodeId,
    kind: DomNodeKind,
    parent: Option<usize>,
    children: SmallVec<[usize; 8]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomNodeKind {
    Document,
    Element { name: SmolStr },
    Text { content: SmolStr },
}

impl DomNode {
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    pub fn is_document(&self) -> bool {
        matches!(self.kind, DomNodeKind::Document)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, DomNodeKind::Element { .. })
    }

    /// Element name, `None` for document and text nodes.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            DomNodeKind::Element { name } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            DomNodeKind::Text { content } => Some(content.as_str()),
            _ => None,
        }
    }
}

impl Document {
    /// Creates a document whose root document node carries `root_node_id`.
    pub fn new(document_id: DocumentId, root_node_id: NodeId) -> Self {
        let mut index_by_id = BTreeMap::new();
        index_by_id.insert(root_node_id.clone(), 0);
        Self {
            document_id,
            nodes: vec![DomNode {
                node_id: root_node_id,
                kind: DomNodeKind::Document,
                parent: None,
                children: SmallVec::new(),
            }],
            index_by_id,
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn root(&self) -> &DomNode {
        &self.nodes[0]
    }

    /// The first element child of the document node, if any.
    pub fn document_element(&self) -> Option<&DomNode> {
        self.nodes[0]
            .children
            .iter()
            .map(|&index| &self.nodes[index])
            .find(|node| node.is_element())
    }

    pub fn contains(&self, node_id: &NodeId) -> bool {
        self.index_by_id.contains_key(node_id)
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&DomNode> {
        self.index_by_id
            .get(node_id)
            .map(|&index| &self.nodes[index])
    }

    pub fn parent_of(&self, node_id: &NodeId) -> Option<&DomNode> {
        let &index = self.index_by_id.get(node_id)?;
        let parent = self.nodes[index].parent?;
        Some(&self.nodes[parent])
    }

    pub fn children_of(&self, node_id: &NodeId) -> impl Iterator<Item = &DomNode> {
        let children = self
            .index_by_id
            .get(node_id)
            .map(|&index| self.nodes[index].children.as_slice())
            .unwrap_or(&[]);
        children.iter().map(|&index| &self.nodes[index])
    }

    /// Ids of `node_id` and its ancestors, nearest first, ending at the root.
    pub fn self_and_ancestor_ids(&self, node_id: &NodeId) -> SmallVec<[NodeId; 8]> {
        let mut ids = SmallVec::new();
        let Some(&index) = self.index_by_id.get(node_id) else {
            return ids;
        };
        let mut cursor = Some(index);
        while let Some(index) = cursor {
            let node = &self.nodes[index];
            ids.push(node.node_id.clone());
            cursor = node.parent;
        }
        ids
    }

    /// Depth-first walk over `node_id` and its descendants with depths
    /// relative to the walk origin.
    pub fn descendants_or_self<'a>(
        &'a self,
        node_id: &NodeId,
    ) -> impl Iterator<Item = (&'a DomNode, usize)> {
        let start = self.index_by_id.get(node_id).copied();
        DescendantsOrSelf {
            document: self,
            stack: start.map(|index| vec![(index, 0)]).unwrap_or_default(),
        }
    }

    pub fn append_element(
        &mut self,
        parent: &NodeId,
        node_id: NodeId,
        name: impl Into<SmolStr>,
    ) -> Result<(), DomError> {
        self.append_node(
            parent,
            node_id,
            DomNodeKind::Element { name: name.into() },
        )
    }

    pub fn append_text(
        &mut self,
        parent: &NodeId,
        node_id: NodeId,
        content: impl Into<SmolStr>,
    ) -> Result<(), DomError> {
        self.append_node(
            parent,
            node_id,
            DomNodeKind::Text {
                content: content.into(),
            },
        )
    }

    fn append_node(
        &mut self,
        parent: &NodeId,
        node_id: NodeId,
        kind: DomNodeKind,
    ) -> Result<(), DomError> {
        if self.index_by_id.contains_key(&node_id) {
            return Err(DomError::DuplicateNodeId(node_id));
        }
        let &parent_index = self
            .index_by_id
            .get(parent)
            .ok_or_else(|| DomError::UnknownParent(parent.clone()))?;

        let index = self.nodes.len();
        self.index_by_id.insert(node_id.clone(), index);
        self.nodes.push(DomNode {
            node_id,
            kind,
            parent: Some(parent_index),
            children: SmallVec::new(),
        });
        self.nodes[parent_index].children.push(index);
        Ok(())
    }
}

struct DescendantsOrSelf<'a> {
    document: &'a Document,
    stack: Vec<(usize, usize)>,
}

impl<'a> Iterator for DescendantsOrSelf<'a> {
    type Item = (&'a DomNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, depth) = self.stack.pop()?;
        let node = &self.document.nodes[index];
        for &child in node.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((node, depth))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    UnknownParent(NodeId),
    DuplicateNodeId(NodeId),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParent(node_id) => write!(f, "unknown parent node '{node_id}'"),
            Self::DuplicateNodeId(node_id) => write!(f, "duplicate node id '{node_id}'"),
        }
    }
}

impl std::error::Error for DomError {}
