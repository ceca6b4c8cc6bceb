// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The document hierarchy forest.
//!
//! Hierarchy nodes mirror the host's project tree. A node optionally carries a
//! `DocumentReference`; the referenced document may or may not be loaded yet,
//! and the browser only ever observes that state, it never loads anything
//! itself.

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;
use smol_str::SmolStr;

use super::ids::{DocumentId, HierarchyNodeId, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    nodes: BTreeMap<HierarchyNodeId, HierarchyNode>,
    roots: Vec<HierarchyNodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyNode {
    hierarchy_node_id: HierarchyNodeId,
    label: SmolStr,
    parent: Option<HierarchyNodeId>,
    children: Vec<HierarchyNodeId>,
    document_reference: Option<DocumentReference>,
}

/// A hierarchy node's link to a (possibly unloaded) document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReference {
    document_id: DocumentId,
    state: DocumentState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentState {
    NotLoaded,
    Loaded { traversal_root: TraversalRoot },
}

/// Where structure-view navigation anchors once the document is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalRoot {
    /// The loaded unit is a whole document; the anchor is its document element.
    WholeDocument,
    /// The loaded unit is a subtree rooted at this node.
    Node(NodeId),
}

impl DocumentReference {
    pub fn not_loaded(document_id: DocumentId) -> Self {
        Self {
            document_id,
            state: DocumentState::NotLoaded,
        }
    }

    pub fn loaded(document_id: DocumentId, traversal_root: TraversalRoot) -> Self {
        Self {
            document_id,
            state: DocumentState::Loaded { traversal_root },
        }
    }

    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, DocumentState::Loaded { .. })
    }

    pub fn traversal_root(&self) -> Option<&TraversalRoot> {
        match &self.state {
            DocumentState::Loaded { traversal_root } => Some(traversal_root),
            DocumentState::NotLoaded => None,
        }
    }

    pub fn mark_loaded(&mut self, traversal_root: TraversalRoot) {
        self.state = DocumentState::Loaded { traversal_root };
    }
}

impl HierarchyNode {
    pub fn new(hierarchy_node_id: HierarchyNodeId, label: impl Into<SmolStr>) -> Self {
        Self {
            hierarchy_node_id,
            label: label.into(),
            parent: None,
            children: Vec::new(),
            document_reference: None,
        }
    }

    pub fn with_document_reference(mut self, reference: DocumentReference) -> Self {
        self.document_reference = Some(reference);
        self
    }

    pub fn hierarchy_node_id(&self) -> &HierarchyNodeId {
        &self.hierarchy_node_id
    }

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn parent(&self) -> Option<&HierarchyNodeId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[HierarchyNodeId] {
        &self.children
    }

    pub fn document_reference(&self) -> Option<&DocumentReference> {
        self.document_reference.as_ref()
    }

    pub fn document_reference_mut(&mut self) -> Option<&mut DocumentReference> {
        self.document_reference.as_mut()
    }
}

impl Hierarchy {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn insert_root(&mut self, node: HierarchyNode) -> Result<(), HierarchyError> {
        let id = node.hierarchy_node_id.clone();
        self.insert_node(None, node)?;
        self.roots.push(id);
        Ok(())
    }

    pub fn insert_child(
        &mut self,
        parent: &HierarchyNodeId,
        mut node: HierarchyNode,
    ) -> Result<(), HierarchyError> {
        if !self.nodes.contains_key(parent) {
            return Err(HierarchyError::UnknownParent(parent.clone()));
        }
        node.parent = Some(parent.clone());
        let id = node.hierarchy_node_id.clone();
        self.insert_node(Some(parent.clone()), node)?;
        self.nodes
            .get_mut(parent)
            .map(|parent| parent.children.push(id));
        Ok(())
    }

    fn insert_node(
        &mut self,
        parent: Option<HierarchyNodeId>,
        mut node: HierarchyNode,
    ) -> Result<(), HierarchyError> {
        if self.nodes.contains_key(&node.hierarchy_node_id) {
            return Err(HierarchyError::DuplicateId(node.hierarchy_node_id));
        }
        node.parent = parent;
        self.nodes.insert(node.hierarchy_node_id.clone(), node);
        Ok(())
    }

    pub fn get(&self, hierarchy_node_id: &HierarchyNodeId) -> Option<&HierarchyNode> {
        self.nodes.get(hierarchy_node_id)
    }

    pub fn get_mut(&mut self, hierarchy_node_id: &HierarchyNodeId) -> Option<&mut HierarchyNode> {
        self.nodes.get_mut(hierarchy_node_id)
    }

    pub fn roots(&self) -> &[HierarchyNodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of `hierarchy_node_id` and its ancestors, nearest first, via
    /// parent pointers. A missing id yields an empty path.
    pub fn self_and_ancestor_ids(
        &self,
        hierarchy_node_id: &HierarchyNodeId,
    ) -> SmallVec<[HierarchyNodeId; 8]> {
        let mut ids = SmallVec::new();
        let mut cursor = self.nodes.get(hierarchy_node_id);
        while let Some(node) = cursor {
            ids.push(node.hierarchy_node_id.clone());
            cursor = node.parent.as_ref().and_then(|parent| self.nodes.get(parent));
        }
        ids
    }

    /// Depth-first walk over all roots, in tree order, with depths.
    pub fn walk(&self) -> Vec<(&HierarchyNode, usize)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(&HierarchyNodeId, usize)> = Vec::new();
        for root in self.roots.iter().rev() {
            stack.push((root, 0));
        }
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            out.push((node, depth));
            for child in node.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }
        out
    }

    /// First node (in tree order) whose document reference points at
    /// `document_id`.
    pub fn find_by_document_id(&self, document_id: &DocumentId) -> Option<&HierarchyNode> {
        self.walk().into_iter().map(|(node, _)| node).find(|node| {
            node.document_reference
                .as_ref()
                .is_some_and(|reference| reference.document_id() == document_id)
        })
    }
}

impl Default for Hierarchy {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    UnknownParent(HierarchyNodeId),
    DuplicateId(HierarchyNodeId),
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownParent(id) => write!(f, "unknown parent hierarchy node '{id}'"),
            Self::DuplicateId(id) => write!(f, "duplicate hierarchy node id '{id}'"),
        }
    }
}

impl std::error::Error for HierarchyError {}

#[cfg(test)]
mod tests {
    use super::{DocumentReference, Hierarchy, HierarchyError, HierarchyNode, TraversalRoot};
    use crate::model::ids::{DocumentId, HierarchyNodeId};

    fn hierarchy_node_id(value: &str) -> HierarchyNodeId {
        HierarchyNodeId::new(value).expect("hierarchy node id")
    }

    fn sample_hierarchy() -> Hierarchy {
        let mut hierarchy = Hierarchy::new();
        hierarchy
            .insert_root(HierarchyNode::new(hierarchy_node_id("manual"), "Manual"))
            .expect("insert root");
        hierarchy
            .insert_child(
                &hierarchy_node_id("manual"),
                HierarchyNode::new(hierarchy_node_id("chapter-1"), "Chapter 1"),
            )
            .expect("insert chapter");
        hierarchy
            .insert_child(
                &hierarchy_node_id("chapter-1"),
                HierarchyNode::new(hierarchy_node_id("topic-1"), "Topic 1"),
            )
            .expect("insert topic");
        hierarchy
    }

    #[test]
    fn ancestor_path_is_nearest_first() {
        let hierarchy = sample_hierarchy();
        let path = hierarchy.self_and_ancestor_ids(&hierarchy_node_id("topic-1"));
        let path: Vec<&str> = path.iter().map(|id| id.as_str()).collect();
        assert_eq!(path, ["topic-1", "chapter-1", "manual"]);
    }

    #[test]
    fn walk_visits_tree_order_with_depths() {
        let hierarchy = sample_hierarchy();
        let walked: Vec<(&str, usize)> = hierarchy
            .walk()
            .into_iter()
            .map(|(node, depth)| (node.hierarchy_node_id().as_str(), depth))
            .collect();
        assert_eq!(
            walked,
            [("manual", 0), ("chapter-1", 1), ("topic-1", 2)]
        );
    }

    #[test]
    fn insert_rejects_duplicates_and_unknown_parents() {
        let mut hierarchy = sample_hierarchy();
        let duplicate =
            hierarchy.insert_root(HierarchyNode::new(hierarchy_node_id("manual"), "Again"));
        assert_eq!(
            duplicate.unwrap_err(),
            HierarchyError::DuplicateId(hierarchy_node_id("manual"))
        );

        let orphan = hierarchy.insert_child(
            &hierarchy_node_id("missing"),
            HierarchyNode::new(hierarchy_node_id("new"), "New"),
        );
        assert_eq!(
            orphan.unwrap_err(),
            HierarchyError::UnknownParent(hierarchy_node_id("missing"))
        );
    }

    #[test]
    fn document_reference_load_state_is_observable() {
        let document_id = DocumentId::new("doc").expect("document id");
        let mut reference = DocumentReference::not_loaded(document_id);
        assert!(!reference.is_loaded());
        assert!(reference.traversal_root().is_none());

        reference.mark_loaded(TraversalRoot::WholeDocument);
        assert!(reference.is_loaded());
        assert_eq!(
            reference.traversal_root(),
            Some(&TraversalRoot::WholeDocument)
        );
    }
}
