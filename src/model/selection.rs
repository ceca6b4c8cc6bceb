// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selection payload types shared between the controller, the structure view,
//! and the host hand-off surface.

use serde::{Deserialize, Serialize};

use super::ids::{DocumentId, HierarchyNodeId, NodeId};

/// The structure view's notion of a clicked row.
///
/// `context_node_id` is `None` until the row's document has loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedStructureViewItem {
    pub hierarchy_node_id: HierarchyNodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_node_id: Option<NodeId>,
}

/// One entry of the multi-select checkbox selection.
///
/// `context_node_id` may be temporarily absent while the backing document is
/// still loading; it is backfilled in place once the load resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedItem {
    pub hierarchy_node_id: HierarchyNodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_node_id: Option<NodeId>,
}

impl CheckedItem {
    /// Uniqueness-key match against a probe item.
    ///
    /// A stored entry without a context node id is still pending its load and
    /// matches any probe for the same hierarchy node; otherwise both the
    /// hierarchy node and the context node must agree.
    fn matches(&self, probe: &CheckedItem) -> bool {
        self.hierarchy_node_id == probe.hierarchy_node_id
            && (self.context_node_id.is_none() || self.context_node_id == probe.context_node_id)
    }
}

impl From<SelectedStructureViewItem> for CheckedItem {
    fn from(item: SelectedStructureViewItem) -> Self {
        Self {
            hierarchy_node_id: item.hierarchy_node_id,
            context_node_id: item.context_node_id,
        }
    }
}

/// The ordered checkbox selection. Insertion order is the order the user
/// checked items in and is visible to the user as selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckedItems {
    items: Vec<CheckedItem>,
}

impl CheckedItems {
    pub fn new(items: Vec<CheckedItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CheckedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_checked(&self, probe: &CheckedItem) -> bool {
        self.items.iter().any(|item| item.matches(probe))
    }

    /// Toggles membership by the uniqueness key: removes a matching entry,
    /// otherwise appends. Returns `true` when the item is checked afterwards.
    pub fn toggle(&mut self, item: CheckedItem) -> bool {
        match self.items.iter().position(|existing| existing.matches(&item)) {
            Some(index) => {
                self.items.remove(index);
                false
            }
            None => {
                self.items.push(item);
                true
            }
        }
    }

    /// Patches the first pending entry for `hierarchy_node_id` with its
    /// resolved context node id, keeping its position. Returns `true` when an
    /// entry was patched.
    pub fn backfill(
        &mut self,
        hierarchy_node_id: &HierarchyNodeId,
        context_node_id: &NodeId,
    ) -> bool {
        let Some(entry) = self.items.iter_mut().find(|item| {
            item.context_node_id.is_none() && &item.hierarchy_node_id == hierarchy_node_id
        }) else {
            return false;
        };
        entry.context_node_id = Some(context_node_id.clone());
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_items(self) -> Vec<CheckedItem> {
        self.items
    }
}

/// The result handed back to the host when the modal submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged, rename_all = "camelCase")]
pub enum SubmitPayload {
    #[serde(rename_all = "camelCase")]
    Single {
        document_id: DocumentId,
        node_id: NodeId,
    },
    #[serde(rename_all = "camelCase")]
    Multi { selected_items: Vec<CheckedItem> },
}
