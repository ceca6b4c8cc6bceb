// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The document loading capability.
//!
//! Loading lives with the host. The modal fires a retry request carrying a
//! ticket and later receives the outcome for that ticket back; there is no
//! cancellation primitive, so a superseded request simply has its outcome
//! ignored when it arrives.

use std::fmt;

use crate::model::{Document, DocumentId, HierarchyNodeId, TraversalRoot};

/// Correlation token for one load attempt, captured at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub hierarchy_node_id: HierarchyNodeId,
}

/// A successfully loaded unit: the document plus how navigation anchors in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub document: Document,
    pub traversal_root: TraversalRoot,
}

/// Completion of a load attempt, delivered on the shell's outcome channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub ticket: LoadTicket,
    pub result: Result<LoadedDocument, LoadError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    NotFound { document_id: DocumentId },
    Unavailable { reason: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { document_id } => {
                write!(f, "document '{document_id}' could not be found")
            }
            Self::Unavailable { reason } => write!(f, "document unavailable: {reason}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Host capability for (re)loading documents behind hierarchy nodes.
///
/// `retry_loading` is fire-and-forget; the outcome must come back carrying the
/// same ticket. Environments without this capability report `false` from
/// `can_retry_loading`, and a hierarchy containing unloaded documents is then
/// a fatal host misconfiguration.
pub trait DocumentLoader {
    fn can_retry_loading(&self) -> bool;
    fn retry_loading(&self, ticket: LoadTicket, document_id: DocumentId);
}
