// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Selection-state reconciliation for the project browser modal.
//!
//! Three pieces of state are kept consistent: the active hierarchy selection,
//! the target selection (a single linkable candidate or an ordered checkbox
//! set, chosen once at construction), and the load gate for the document
//! backing the current hierarchy selection. Suspension points (document load
//! retries, operation-enablement queries) are not awaited here; the controller
//! emits requests carrying generation tickets and discards completions whose
//! ticket no longer matches current state.

use std::fmt;

use crossterm::event::KeyCode;
use serde_json::{Map, Value};

use crate::model::{
    CheckedItem, CheckedItems, DocumentId, HierarchyNodeId, ModalConfig, MultiSubmitPolicy,
    NodeId, OperationName, SelectedStructureViewItem, SubmitPayload,
};
use crate::project::{
    EnablementTicket, LoadError, LoadTicket, OperationInput, OperationQueryError, OperationState,
    Project,
};
use crate::query::{LinkableQuery, QueryParseError};

#[cfg(test)]
mod tests;

/// Load state of the document backing the current hierarchy selection.
///
/// Transitions are monotonic per attempt (`Idle → Loading → Loaded | Broken`);
/// a newer structure-view click supersedes an in-flight attempt, whose
/// completion is then discarded by generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadGate {
    Idle,
    Loading,
    Loaded,
    Broken,
}

/// Single-select candidate or multi-select checkbox set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSelection {
    Single { candidate: Option<NodeId> },
    Multi { checked: CheckedItems },
}

/// An effect the shell must dispatch to a host service.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Load(LoadTicket, DocumentId),
    Enablement(EnablementTicket, OperationInput),
}

/// Result of routing a key event through the keyboard gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    Cancel,
    Submit,
}

/// The two keyboard-gate states: submit is only reachable while submittable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardGate {
    CancelOnly,
    CancelOrSubmit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// The hierarchy contains unloaded documents but the host loader cannot
    /// retry loads for hierarchy nodes. Host misconfiguration; not
    /// recoverable at runtime.
    RetryUnsupported,
    Query(QueryParseError),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryUnsupported => f.write_str(
                "the hierarchy can not contain unloaded documents when the document loader \
                 does not support retrying loads for hierarchy nodes",
            ),
            Self::Query(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<QueryParseError> for ControllerError {
    fn from(err: QueryParseError) -> Self {
        Self::Query(err)
    }
}

pub struct SelectionController {
    target: TargetSelection,
    selected_item: Option<SelectedStructureViewItem>,
    load_gate: LoadGate,
    load_generation: u64,
    enablement_generation: u64,
    enabled: bool,
    requests: Vec<Request>,
    linkable_query: LinkableQuery,
    multi_submit_policy: MultiSubmitPolicy,
    can_retry_loading: bool,
    base_operation_data: Map<String, Value>,
    operation: OperationName,
}

impl SelectionController {
    /// Builds the controller from the host configuration, seeding the
    /// hierarchy selection from the configured node (falling back to the
    /// initial document's document element) and the target selection from the
    /// prior checked items or the seed node filtered through the
    /// linkable-elements test.
    pub fn new(
        project: &Project,
        config: &ModalConfig,
        can_retry_loading: bool,
    ) -> Result<Self, ControllerError> {
        let linkable_query = LinkableQuery::parse(&config.linkable_elements_query)?;

        let document_node_id = project
            .document(&config.document_id)
            .and_then(|document| document.document_element())
            .map(|element| element.node_id().clone());
        let seed_node_id = config.node_id.clone().or(document_node_id);

        let selected_item = seed_node_id
            .as_ref()
            .and_then(|node_id| project.closest_structure_view_item(node_id));

        let target = if config.show_checkbox_selector {
            TargetSelection::Multi {
                checked: CheckedItems::new(config.selected_items.clone()),
            }
        } else {
            let candidate = seed_node_id.filter(|node_id| {
                project
                    .document(&config.document_id)
                    .is_some_and(|document| linkable_query.matches(document, node_id))
            });
            TargetSelection::Single { candidate }
        };

        let load_gate = match &selected_item {
            Some(item) if project.is_document_loaded(&item.hierarchy_node_id) => LoadGate::Loaded,
            _ => LoadGate::Idle,
        };

        let base_operation_data = match serde_json::to_value(config) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };

        let mut controller = Self {
            target,
            selected_item,
            load_gate,
            load_generation: 0,
            enablement_generation: 0,
            enabled: false,
            requests: Vec::new(),
            linkable_query,
            multi_submit_policy: config.multi_submit_policy,
            can_retry_loading,
            base_operation_data,
            operation: config.insert_operation_name.clone(),
        };
        controller.refresh_enablement(project);
        Ok(controller)
    }

    pub fn is_multi_select(&self) -> bool {
        matches!(self.target, TargetSelection::Multi { .. })
    }

    pub fn target(&self) -> &TargetSelection {
        &self.target
    }

    pub fn selected_item(&self) -> Option<&SelectedStructureViewItem> {
        self.selected_item.as_ref()
    }

    pub fn load_gate(&self) -> LoadGate {
        self.load_gate
    }

    /// Single-select candidate, `None` in multi mode.
    pub fn candidate(&self) -> Option<&NodeId> {
        match &self.target {
            TargetSelection::Single { candidate } => candidate.as_ref(),
            TargetSelection::Multi { .. } => None,
        }
    }

    /// Checked items, empty in single mode.
    pub fn checked_items(&self) -> &[CheckedItem] {
        match &self.target {
            TargetSelection::Multi { checked } => checked.items(),
            TargetSelection::Single { .. } => &[],
        }
    }

    pub fn enablement_enabled(&self) -> bool {
        self.enabled
    }

    /// Document id derived from the current hierarchy selection.
    pub fn current_document_id<'a>(&self, project: &'a Project) -> Option<&'a DocumentId> {
        let selected = self.selected_item.as_ref()?;
        project.document_id_for(&selected.hierarchy_node_id)
    }

    /// Drains the effects emitted by the last state change, for the shell to
    /// dispatch to the host services.
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.requests)
    }

    /// Structure-view row click. The latest click wins: the load generation
    /// advances so a completion from an earlier, still in-flight load can no
    /// longer apply. Re-clicking the node whose load is already in flight
    /// keeps the pending ticket; at most one load per node is ever pending.
    pub fn handle_structure_view_click(
        &mut self,
        project: &Project,
        item: SelectedStructureViewItem,
    ) -> Result<(), ControllerError> {
        let same_load_in_flight = self.load_gate == LoadGate::Loading
            && self
                .selected_item
                .as_ref()
                .is_some_and(|selected| selected.hierarchy_node_id == item.hierarchy_node_id);

        self.selected_item = Some(item.clone());
        if let TargetSelection::Single { candidate } = &mut self.target {
            *candidate = None;
        }

        if same_load_in_flight {
            self.refresh_enablement(project);
            return Ok(());
        }
        self.load_generation = self.load_generation.wrapping_add(1);

        let reference = project
            .hierarchy_node(&item.hierarchy_node_id)
            .and_then(|node| node.document_reference());

        match reference {
            Some(reference) if !project.is_document_loaded(&item.hierarchy_node_id) => {
                if !self.can_retry_loading {
                    return Err(ControllerError::RetryUnsupported);
                }
                self.load_gate = LoadGate::Loading;
                self.requests.push(Request::Load(
                    LoadTicket {
                        generation: self.load_generation,
                        hierarchy_node_id: item.hierarchy_node_id.clone(),
                    },
                    reference.document_id().clone(),
                ));
            }
            Some(_) => {
                self.load_gate = LoadGate::Loaded;
                let candidate = item.context_node_id.clone().and_then(|node_id| {
                    self.eligible_candidate(project, &item.hierarchy_node_id, node_id)
                });
                if let TargetSelection::Single { candidate: slot } = &mut self.target {
                    *slot = candidate;
                }
            }
            None => {
                // A folder row; nothing to load, nothing to preview.
                self.load_gate = LoadGate::Idle;
            }
        }

        self.refresh_enablement(project);
        Ok(())
    }

    /// Checkbox click: toggles membership by the uniqueness key, then follows
    /// the structure-view click path so the preview tracks the checkbox.
    pub fn handle_checkbox_click(
        &mut self,
        project: &Project,
        item: SelectedStructureViewItem,
    ) -> Result<(), ControllerError> {
        if let TargetSelection::Multi { checked } = &mut self.target {
            checked.toggle(item.clone().into());
        }
        self.handle_structure_view_click(project, item)
    }

    /// Preview-pane selection change. The preview only offers nodes inside
    /// the already-loaded, already-eligible subtree, so the id is taken as-is.
    pub fn handle_preview_selection_change(&mut self, project: &Project, node_id: NodeId) {
        if let TargetSelection::Single { candidate } = &mut self.target {
            *candidate = Some(node_id);
            self.refresh_enablement(project);
        }
    }

    /// Empties the checkbox selection. The hierarchy selection and preview
    /// are untouched.
    pub fn handle_clear_selection(&mut self, project: &Project) {
        if let TargetSelection::Multi { checked } = &mut self.target {
            checked.clear();
            self.refresh_enablement(project);
        }
    }

    /// Applies a load completion.
    ///
    /// A successful load always backfills pending checked items for the node
    /// (the document is loaded regardless of who asked); everything else is
    /// guarded by the ticket generation so a superseded load cannot overwrite
    /// newer state.
    pub fn complete_load(
        &mut self,
        project: &Project,
        ticket: LoadTicket,
        result: Result<(), LoadError>,
    ) {
        match result {
            Ok(()) => {
                let traversal_root = project.traversal_root_node_id(&ticket.hierarchy_node_id);
                let mut target_changed = false;
                if let (TargetSelection::Multi { checked }, Some(root)) =
                    (&mut self.target, traversal_root.as_ref())
                {
                    target_changed = checked.backfill(&ticket.hierarchy_node_id, root);
                }

                if ticket.generation != self.load_generation {
                    if target_changed {
                        self.refresh_enablement(project);
                    }
                    return;
                }

                self.load_gate = LoadGate::Loaded;
                if let Some(selected) = &mut self.selected_item {
                    if selected.hierarchy_node_id == ticket.hierarchy_node_id {
                        selected.context_node_id = traversal_root.clone();
                    }
                }
                if matches!(self.target, TargetSelection::Single { .. }) {
                    let candidate = traversal_root.and_then(|root| {
                        self.eligible_candidate(project, &ticket.hierarchy_node_id, root)
                    });
                    if let TargetSelection::Single { candidate: slot } = &mut self.target {
                        *slot = candidate;
                    }
                }
                self.refresh_enablement(project);
            }
            Err(_) => {
                if ticket.generation != self.load_generation {
                    return;
                }
                self.load_gate = LoadGate::Broken;
            }
        }
    }

    /// Applies an enablement answer. Stale tickets are discarded; a rejected
    /// query is "not enabled", never an error.
    pub fn complete_enablement(
        &mut self,
        ticket: EnablementTicket,
        result: Result<OperationState, OperationQueryError>,
    ) {
        if ticket.generation != self.enablement_generation {
            return;
        }
        self.enabled = result.map(|state| state.enabled).unwrap_or(false);
    }

    pub fn can_submit(&self) -> bool {
        match &self.target {
            TargetSelection::Single { candidate } => candidate.is_some() && self.enabled,
            TargetSelection::Multi { checked } => {
                !checked.is_empty()
                    && match self.multi_submit_policy {
                        MultiSubmitPolicy::NonEmptySelection => true,
                        MultiSubmitPolicy::OperationEnabled => self.enabled,
                    }
            }
        }
    }

    pub fn keyboard_gate(&self) -> KeyboardGate {
        if self.can_submit() {
            KeyboardGate::CancelOrSubmit
        } else {
            KeyboardGate::CancelOnly
        }
    }

    /// Routes a key through the keyboard gate. Submittability is re-checked
    /// at the key event, never cached from an earlier render.
    pub fn modal_action_for_key(&self, key: KeyCode) -> Option<ModalAction> {
        match (key, self.keyboard_gate()) {
            (KeyCode::Esc, _) => Some(ModalAction::Cancel),
            (KeyCode::Enter, KeyboardGate::CancelOrSubmit) => Some(ModalAction::Submit),
            _ => None,
        }
    }

    /// The result handed to the host on submit. Multi-mode items still
    /// lacking a context node id are resolved through the current
    /// traversal-root mapping here, and left absent if that fails.
    pub fn submit_payload(&self, project: &Project) -> Option<SubmitPayload> {
        match &self.target {
            TargetSelection::Single { candidate } => {
                let node_id = candidate.clone()?;
                let document_id = self.current_document_id(project)?.clone();
                Some(SubmitPayload::Single {
                    document_id,
                    node_id,
                })
            }
            TargetSelection::Multi { checked } => {
                let selected_items = checked
                    .items()
                    .iter()
                    .cloned()
                    .map(|mut item| {
                        if item.context_node_id.is_none() {
                            item.context_node_id =
                                project.traversal_root_node_id(&item.hierarchy_node_id);
                        }
                        item
                    })
                    .collect();
                Some(SubmitPayload::Multi { selected_items })
            }
        }
    }

    fn eligible_candidate(
        &self,
        project: &Project,
        hierarchy_node_id: &HierarchyNodeId,
        node_id: NodeId,
    ) -> Option<NodeId> {
        let document_id = project.document_id_for(hierarchy_node_id)?;
        let document = project.document(document_id)?;
        self.linkable_query
            .matches(document, &node_id)
            .then_some(node_id)
    }

    /// Re-issues the enablement query for the current derived target. Every
    /// refresh advances the generation so answers to superseded inputs are
    /// discarded on arrival.
    fn refresh_enablement(&mut self, project: &Project) {
        self.enablement_generation = self.enablement_generation.wrapping_add(1);
        let ticket = EnablementTicket {
            generation: self.enablement_generation,
        };
        match &self.target {
            TargetSelection::Single { candidate: None } => {
                // Nothing to link; no operation to ask about.
                self.enabled = false;
            }
            TargetSelection::Single {
                candidate: Some(node_id),
            } => {
                let mut data = self.base_operation_data.clone();
                data.insert(
                    "nodeId".to_owned(),
                    Value::String(node_id.as_str().to_owned()),
                );
                data.insert(
                    "documentId".to_owned(),
                    self.current_document_id(project)
                        .map(|id| Value::String(id.as_str().to_owned()))
                        .unwrap_or(Value::Null),
                );
                self.requests.push(Request::Enablement(
                    ticket,
                    OperationInput {
                        operation: self.operation.clone(),
                        data,
                    },
                ));
            }
            TargetSelection::Multi { checked } => {
                let mut data = self.base_operation_data.clone();
                data.insert(
                    "selectedItems".to_owned(),
                    serde_json::to_value(checked.items()).unwrap_or(Value::Array(Vec::new())),
                );
                self.requests.push(Request::Enablement(
                    ticket,
                    OperationInput {
                        operation: self.operation.clone(),
                        data,
                    },
                ));
            }
        }
    }
}
