// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The host collaborators the modal runs against.
//!
//! `Project` is the fused read view over the document hierarchy and the
//! documents loaded so far. The selection controller only ever borrows it;
//! mutations (installing a freshly loaded document) are applied by the shell
//! between events.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::model::{
    Document, DocumentId, Hierarchy, HierarchyNode, HierarchyNodeId, NodeId,
    SelectedStructureViewItem, TraversalRoot,
};

pub mod demo;
pub mod loader;
pub mod operations;

pub use loader::{DocumentLoader, LoadError, LoadOutcome, LoadTicket, LoadedDocument};
pub use operations::{
    EnablementOutcome, EnablementTicket, OperationInput, OperationQueryError, OperationResolver,
    OperationState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    hierarchy: Hierarchy,
    documents: BTreeMap<DocumentId, Document>,
}

impl Project {
    pub fn new(hierarchy: Hierarchy) -> Self {
        Self {
            hierarchy,
            documents: BTreeMap::new(),
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn document(&self, document_id: &DocumentId) -> Option<&Document> {
        self.documents.get(document_id)
    }

    pub fn hierarchy_node(&self, hierarchy_node_id: &HierarchyNodeId) -> Option<&HierarchyNode> {
        self.hierarchy.get(hierarchy_node_id)
    }

    /// Registers an already-loaded document (initial load set).
    pub fn insert_document(&mut self, document: Document) {
        self.documents.insert(document.document_id().clone(), document);
    }

    /// Whether the node's backing document is loaded. Nodes without a document
    /// reference have nothing to load.
    pub fn is_document_loaded(&self, hierarchy_node_id: &HierarchyNodeId) -> bool {
        let Some(node) = self.hierarchy.get(hierarchy_node_id) else {
            return false;
        };
        let Some(reference) = node.document_reference() else {
            return false;
        };
        reference.is_loaded() && self.documents.contains_key(reference.document_id())
    }

    pub fn document_id_for(&self, hierarchy_node_id: &HierarchyNodeId) -> Option<&DocumentId> {
        self.hierarchy
            .get(hierarchy_node_id)?
            .document_reference()
            .map(|reference| reference.document_id())
    }

    /// The node id structure-view navigation anchors at for a hierarchy node:
    /// the document element when the loaded unit is a whole document, the node
    /// itself when it is a subtree.
    pub fn traversal_root_node_id(&self, hierarchy_node_id: &HierarchyNodeId) -> Option<NodeId> {
        let reference = self.hierarchy.get(hierarchy_node_id)?.document_reference()?;
        let document = self.documents.get(reference.document_id())?;
        match reference.traversal_root()? {
            TraversalRoot::WholeDocument => document
                .document_element()
                .map(|element| element.node_id().clone()),
            TraversalRoot::Node(node_id) => {
                document.contains(node_id).then(|| node_id.clone())
            }
        }
    }

    /// Maps a document node onto the structure view: the row of the hierarchy
    /// node owning the document that contains `node_id`, with that row's
    /// traversal root as context.
    pub fn closest_structure_view_item(
        &self,
        node_id: &NodeId,
    ) -> Option<SelectedStructureViewItem> {
        let document = self
            .documents
            .values()
            .find(|document| document.contains(node_id))?;
        let hierarchy_node = self.hierarchy.find_by_document_id(document.document_id())?;
        Some(SelectedStructureViewItem {
            hierarchy_node_id: hierarchy_node.hierarchy_node_id().clone(),
            context_node_id: self
                .traversal_root_node_id(hierarchy_node.hierarchy_node_id()),
        })
    }

    /// Id set of a hierarchy node and its ancestors, for path highlighting in
    /// the structure view. One parent-pointer pass, no tree recursion.
    pub fn ancestor_hierarchy_ids(
        &self,
        hierarchy_node_id: &HierarchyNodeId,
    ) -> BTreeSet<HierarchyNodeId> {
        self.hierarchy
            .self_and_ancestor_ids(hierarchy_node_id)
            .into_iter()
            .collect()
    }

    /// Installs a document that just finished loading and marks the owning
    /// hierarchy node's reference loaded. Applied by the shell before the
    /// controller observes the load completion.
    pub fn install_document(
        &mut self,
        hierarchy_node_id: &HierarchyNodeId,
        document: Document,
        traversal_root: TraversalRoot,
    ) -> Result<(), InstallError> {
        let node = self
            .hierarchy
            .get_mut(hierarchy_node_id)
            .ok_or_else(|| InstallError::UnknownHierarchyNode(hierarchy_node_id.clone()))?;
        let reference = node
            .document_reference_mut()
            .ok_or_else(|| InstallError::NoDocumentReference(hierarchy_node_id.clone()))?;
        if reference.document_id() != document.document_id() {
            return Err(InstallError::DocumentIdMismatch {
                expected: reference.document_id().clone(),
                got: document.document_id().clone(),
            });
        }
        reference.mark_loaded(traversal_root);
        self.documents.insert(document.document_id().clone(), document);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    UnknownHierarchyNode(HierarchyNodeId),
    NoDocumentReference(HierarchyNodeId),
    DocumentIdMismatch {
        expected: DocumentId,
        got: DocumentId,
    },
}

impl fmt::Display for InstallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHierarchyNode(id) => {
                write!(f, "cannot install document for unknown hierarchy node '{id}'")
            }
            Self::NoDocumentReference(id) => {
                write!(f, "hierarchy node '{id}' has no document reference")
            }
            Self::DocumentIdMismatch { expected, got } => write!(
                f,
                "installed document '{got}' does not match referenced document '{expected}'"
            ),
        }
    }
}

impl std::error::Error for InstallError {}
