// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Modal configuration as handed over by the host's modal manager.

use serde::{Deserialize, Serialize};

use super::ids::{DocumentId, NodeId, OperationName};
use super::selection::CheckedItem;

/// The configuration object the host opens the modal with.
///
/// Field names follow the host's wire casing so configs can be passed through
/// as JSON unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalConfig {
    /// The document the browser initially points at.
    pub document_id: DocumentId,
    /// Optional initial node; falls back to the document's document element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// Prior checkbox selection to seed multi-select mode with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_items: Vec<CheckedItem>,
    /// Chooses multi-select (checkbox) mode over single-select mode.
    #[serde(default)]
    pub show_checkbox_selector: bool,
    /// The host operation whose enablement gates the primary button.
    pub insert_operation_name: OperationName,
    /// Node test restricting which elements are eligible link targets.
    #[serde(default = "default_linkable_elements_query")]
    pub linkable_elements_query: String,
    pub modal_title: String,
    #[serde(default)]
    pub modal_icon: String,
    pub modal_primary_button_label: String,
    /// What "submittable" means in multi-select mode; the host decides.
    #[serde(default)]
    pub multi_submit_policy: MultiSubmitPolicy,
}

fn default_linkable_elements_query() -> String {
    "*".to_owned()
}

/// Submittability policy for multi-select mode.
///
/// Host implementations disagree on whether a non-empty checkbox selection is
/// enough or whether the insert operation must additionally report itself
/// enabled, so the choice is configuration, not a fixed rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MultiSubmitPolicy {
    #[default]
    NonEmptySelection,
    OperationEnabled,
}
