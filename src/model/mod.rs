// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core data model.
//!
//! Ids, read-only document trees, the hierarchy forest, selection payloads,
//! and the modal configuration object.

pub mod config;
pub mod dom;
pub mod hierarchy;
pub mod ids;
pub mod selection;

pub use config::{ModalConfig, MultiSubmitPolicy};
pub use dom::{Document, DomError, DomNode, DomNodeKind};
pub use hierarchy::{
    DocumentReference, DocumentState, Hierarchy, HierarchyError, HierarchyNode, TraversalRoot,
};
pub use ids::{DocumentId, HierarchyNodeId, Id, IdError, NodeId, OperationName};
pub use selection::{CheckedItem, CheckedItems, SelectedStructureViewItem, SubmitPayload};
