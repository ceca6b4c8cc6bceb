// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use crossterm::event::KeyCode;

use super::{
    ControllerError, KeyboardGate, LoadGate, ModalAction, Request, SelectionController,
};
use crate::model::{
    CheckedItem, Document, DocumentId, DocumentReference, Hierarchy, HierarchyNode,
    HierarchyNodeId, ModalConfig, MultiSubmitPolicy, NodeId, SelectedStructureViewItem,
    SubmitPayload, TraversalRoot,
};
use crate::project::{
    EnablementTicket, LoadError, LoadTicket, LoadedDocument, OperationQueryError, OperationState,
    Project,
};

fn hierarchy_node_id(value: &str) -> HierarchyNodeId {
    HierarchyNodeId::new(value).expect("hierarchy node id")
}

fn node_id(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn document_id(value: &str) -> DocumentId {
    DocumentId::new(value).expect("document id")
}

fn item(hierarchy: &str, context: Option<&str>) -> SelectedStructureViewItem {
    SelectedStructureViewItem {
        hierarchy_node_id: hierarchy_node_id(hierarchy),
        context_node_id: context.map(node_id),
    }
}

fn section_document(doc: &str, root: &str, element: &str, name: &str) -> Document {
    let mut document = Document::new(document_id(doc), node_id(root));
    document
        .append_element(&node_id(root), node_id(element), name)
        .expect("append element");
    document
}

/// Project layout used across these tests:
/// - `manual`: loaded; document element `manual-el` with a `section` and a
///   `para` child.
/// - `notes`: loaded; document element is a `para`.
/// - `appendix`, `extra`: unloaded, loadable (present in the remote map).
/// - `legacy`: unloaded, load always fails.
/// - `attachments`: a folder without a document reference.
fn fixture() -> (Project, BTreeMap<DocumentId, LoadedDocument>) {
    let mut manual = Document::new(document_id("manual-doc"), node_id("manual-root"));
    manual
        .append_element(&node_id("manual-root"), node_id("manual-el"), "manual")
        .expect("append manual");
    manual
        .append_element(&node_id("manual-el"), node_id("section-1"), "section")
        .expect("append section");
    manual
        .append_element(&node_id("manual-el"), node_id("para-1"), "para")
        .expect("append para");

    let notes = section_document("notes-doc", "notes-root", "notes-el", "para");

    let mut hierarchy = Hierarchy::new();
    hierarchy
        .insert_root(
            HierarchyNode::new(hierarchy_node_id("manual"), "Manual").with_document_reference(
                DocumentReference::loaded(document_id("manual-doc"), TraversalRoot::WholeDocument),
            ),
        )
        .expect("insert manual");
    hierarchy
        .insert_child(
            &hierarchy_node_id("manual"),
            HierarchyNode::new(hierarchy_node_id("notes"), "Notes").with_document_reference(
                DocumentReference::loaded(document_id("notes-doc"), TraversalRoot::WholeDocument),
            ),
        )
        .expect("insert notes");
    for (node, doc) in [
        ("appendix", "appendix-doc"),
        ("extra", "extra-doc"),
        ("legacy", "legacy-doc"),
    ] {
        hierarchy
            .insert_child(
                &hierarchy_node_id("manual"),
                HierarchyNode::new(hierarchy_node_id(node), node).with_document_reference(
                    DocumentReference::not_loaded(document_id(doc)),
                ),
            )
            .expect("insert unloaded node");
    }
    hierarchy
        .insert_child(
            &hierarchy_node_id("manual"),
            HierarchyNode::new(hierarchy_node_id("attachments"), "Attachments"),
        )
        .expect("insert folder");

    let mut project = Project::new(hierarchy);
    project.insert_document(manual);
    project.insert_document(notes);

    let mut remote = BTreeMap::new();
    remote.insert(
        document_id("appendix-doc"),
        LoadedDocument {
            document: section_document("appendix-doc", "appendix-root", "appendix-el", "section"),
            traversal_root: TraversalRoot::WholeDocument,
        },
    );
    remote.insert(
        document_id("extra-doc"),
        LoadedDocument {
            document: section_document("extra-doc", "extra-root", "extra-el", "section"),
            traversal_root: TraversalRoot::WholeDocument,
        },
    );
    (project, remote)
}

fn single_config(query: &str) -> ModalConfig {
    ModalConfig {
        document_id: document_id("manual-doc"),
        node_id: None,
        selected_items: Vec::new(),
        show_checkbox_selector: false,
        insert_operation_name: "insert-link".parse().expect("operation name"),
        linkable_elements_query: query.to_owned(),
        modal_title: "Browse project".to_owned(),
        modal_icon: "folder-open-o".to_owned(),
        modal_primary_button_label: "Insert".to_owned(),
        multi_submit_policy: MultiSubmitPolicy::NonEmptySelection,
    }
}

fn multi_config(policy: MultiSubmitPolicy) -> ModalConfig {
    ModalConfig {
        show_checkbox_selector: true,
        multi_submit_policy: policy,
        ..single_config("self::section")
    }
}

fn take_load(controller: &mut SelectionController) -> (LoadTicket, DocumentId) {
    let requests = controller.take_requests();
    requests
        .into_iter()
        .find_map(|request| match request {
            Request::Load(ticket, document_id) => Some((ticket, document_id)),
            Request::Enablement(..) => None,
        })
        .expect("expected a pending load request")
}

/// Latest queued enablement ticket; earlier ones are superseded.
fn take_enablement(controller: &mut SelectionController) -> EnablementTicket {
    let requests = controller.take_requests();
    requests
        .into_iter()
        .rev()
        .find_map(|request| match request {
            Request::Enablement(ticket, _) => Some(ticket),
            Request::Load(..) => None,
        })
        .expect("expected a pending enablement request")
}

/// Simulates the host loader resolving a load: installs the document into the
/// project, then reports completion with the dispatched ticket.
fn resolve_load(
    controller: &mut SelectionController,
    project: &mut Project,
    remote: &BTreeMap<DocumentId, LoadedDocument>,
    ticket: LoadTicket,
    requested: &DocumentId,
) {
    match remote.get(requested) {
        Some(loaded) => {
            project
                .install_document(
                    &ticket.hierarchy_node_id,
                    loaded.document.clone(),
                    loaded.traversal_root.clone(),
                )
                .expect("install document");
            controller.complete_load(project, ticket, Ok(()));
        }
        None => controller.complete_load(
            project,
            ticket,
            Err(LoadError::NotFound {
                document_id: requested.clone(),
            }),
        ),
    }
}

fn grant_enablement(controller: &mut SelectionController) {
    let ticket = take_enablement(controller);
    controller.complete_enablement(ticket, Ok(OperationState { enabled: true }));
}

#[test]
fn construction_seeds_selection_from_document_element() {
    let (project, _) = fixture();
    let controller = SelectionController::new(&project, &single_config("self::manual"), true)
        .expect("controller");

    let selected = controller.selected_item().expect("seeded selection");
    assert_eq!(selected.hierarchy_node_id, hierarchy_node_id("manual"));
    assert_eq!(selected.context_node_id, Some(node_id("manual-el")));
    assert_eq!(controller.candidate(), Some(&node_id("manual-el")));
    assert_eq!(controller.load_gate(), LoadGate::Loaded);
}

#[test]
fn ineligible_seed_collapses_to_no_candidate() {
    let (project, _) = fixture();
    let controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");
    assert_eq!(controller.candidate(), None);
    assert!(!controller.can_submit());
}

#[test]
fn invalid_query_is_a_construction_error() {
    let (project, _) = fixture();
    let result = SelectionController::new(&project, &single_config("self::"), true);
    assert!(matches!(result, Err(ControllerError::Query(_))));
}

#[test]
fn clicking_section_row_yields_candidate_and_enablement_gates_submit() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");
    controller.take_requests();

    controller
        .handle_structure_view_click(&project, item("manual", Some("manual-el")))
        .expect("click");
    // The manual's document element is not a section.
    assert_eq!(controller.candidate(), None);
    assert!(!controller.can_submit());

    controller.handle_preview_selection_change(&project, node_id("section-1"));
    assert_eq!(controller.candidate(), Some(&node_id("section-1")));
    assert!(!controller.can_submit());

    grant_enablement(&mut controller);
    assert!(controller.can_submit());
}

#[test]
fn clicking_para_context_row_disables_submit() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");

    controller
        .handle_structure_view_click(&project, item("notes", Some("notes-el")))
        .expect("click");
    assert_eq!(controller.candidate(), None);
    assert!(!controller.can_submit());
    assert_eq!(controller.keyboard_gate(), KeyboardGate::CancelOnly);
}

#[test]
fn structure_view_click_resets_previous_candidate() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");
    controller.handle_preview_selection_change(&project, node_id("section-1"));
    assert_eq!(controller.candidate(), Some(&node_id("section-1")));

    controller
        .handle_structure_view_click(&project, item("notes", Some("notes-el")))
        .expect("click");
    // Never a stale id from the previous document.
    assert_eq!(controller.candidate(), None);
}

#[test]
fn clicking_unloaded_row_requests_load_and_resolves_candidate() {
    let (mut project, remote) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");

    controller
        .handle_structure_view_click(&project, item("appendix", None))
        .expect("click");
    assert_eq!(controller.load_gate(), LoadGate::Loading);
    assert_eq!(controller.candidate(), None);

    let (ticket, requested) = take_load(&mut controller);
    assert_eq!(ticket.hierarchy_node_id, hierarchy_node_id("appendix"));
    assert_eq!(requested, document_id("appendix-doc"));

    resolve_load(&mut controller, &mut project, &remote, ticket, &requested);
    assert_eq!(controller.load_gate(), LoadGate::Loaded);
    assert_eq!(controller.candidate(), Some(&node_id("appendix-el")));
    let selected = controller.selected_item().expect("selection");
    assert_eq!(selected.context_node_id, Some(node_id("appendix-el")));

    grant_enablement(&mut controller);
    assert!(controller.can_submit());
    assert_eq!(
        controller.submit_payload(&project),
        Some(SubmitPayload::Single {
            document_id: document_id("appendix-doc"),
            node_id: node_id("appendix-el"),
        })
    );
}

#[test]
fn reclicking_a_loading_node_keeps_the_pending_load() {
    let (mut project, remote) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");

    controller
        .handle_structure_view_click(&project, item("appendix", None))
        .expect("first click");
    let (ticket, requested) = take_load(&mut controller);

    // Clicking the same node again while its load is in flight must not put
    // a second load for it on the wire.
    controller
        .handle_structure_view_click(&project, item("appendix", None))
        .expect("second click");
    assert_eq!(controller.load_gate(), LoadGate::Loading);
    assert!(!controller
        .take_requests()
        .iter()
        .any(|request| matches!(request, Request::Load(..))));

    // The original ticket is still current and its completion applies.
    resolve_load(&mut controller, &mut project, &remote, ticket, &requested);
    assert_eq!(controller.load_gate(), LoadGate::Loaded);
    assert_eq!(controller.candidate(), Some(&node_id("appendix-el")));
}

#[test]
fn superseded_load_cannot_overwrite_newer_selection() {
    let (mut project, remote) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");

    // Click A: slow load.
    controller
        .handle_structure_view_click(&project, item("appendix", None))
        .expect("click a");
    let (ticket_a, requested_a) = take_load(&mut controller);

    // Click B: fast load, resolves first.
    controller
        .handle_structure_view_click(&project, item("extra", None))
        .expect("click b");
    let (ticket_b, requested_b) = take_load(&mut controller);
    resolve_load(&mut controller, &mut project, &remote, ticket_b, &requested_b);
    assert_eq!(controller.candidate(), Some(&node_id("extra-el")));

    // A resolves last; its completion must be discarded.
    resolve_load(&mut controller, &mut project, &remote, ticket_a, &requested_a);
    let selected = controller.selected_item().expect("selection");
    assert_eq!(selected.hierarchy_node_id, hierarchy_node_id("extra"));
    assert_eq!(selected.context_node_id, Some(node_id("extra-el")));
    assert_eq!(controller.candidate(), Some(&node_id("extra-el")));
    assert_eq!(controller.load_gate(), LoadGate::Loaded);
}

#[test]
fn failed_load_breaks_gate_and_another_click_recovers() {
    let (mut project, remote) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");

    controller
        .handle_structure_view_click(&project, item("legacy", None))
        .expect("click");
    let (ticket, requested) = take_load(&mut controller);
    resolve_load(&mut controller, &mut project, &remote, ticket, &requested);
    assert_eq!(controller.load_gate(), LoadGate::Broken);
    assert_eq!(controller.candidate(), None);
    assert!(!controller.can_submit());

    controller
        .handle_structure_view_click(&project, item("manual", Some("manual-el")))
        .expect("click");
    assert_eq!(controller.load_gate(), LoadGate::Loaded);
}

#[test]
fn stale_failure_does_not_break_newer_selection() {
    let (mut project, remote) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");

    controller
        .handle_structure_view_click(&project, item("legacy", None))
        .expect("click legacy");
    let (ticket, requested) = take_load(&mut controller);

    controller
        .handle_structure_view_click(&project, item("manual", Some("manual-el")))
        .expect("click manual");
    resolve_load(&mut controller, &mut project, &remote, ticket, &requested);
    assert_eq!(controller.load_gate(), LoadGate::Loaded);
}

#[test]
fn unloaded_documents_without_retry_capability_are_fatal() {
    let (project, _) = fixture();
    let mut controller =
        SelectionController::new(&project, &single_config("self::section"), false)
            .expect("controller");

    let result = controller.handle_structure_view_click(&project, item("appendix", None));
    assert_eq!(result.unwrap_err(), ControllerError::RetryUnsupported);

    // Loaded rows keep working without the capability.
    let mut controller =
        SelectionController::new(&project, &single_config("self::section"), false)
            .expect("controller");
    controller
        .handle_structure_view_click(&project, item("manual", Some("manual-el")))
        .expect("loaded row click");
}

#[test]
fn folder_rows_have_nothing_to_load_or_preview() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::section"), true)
        .expect("controller");

    controller
        .handle_structure_view_click(&project, item("attachments", None))
        .expect("click folder");
    assert_eq!(controller.load_gate(), LoadGate::Idle);
    assert_eq!(controller.current_document_id(&project), None);
    assert!(controller.take_requests().is_empty());
}

#[test]
fn checkbox_toggles_preserve_insertion_order() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(
        &project,
        &multi_config(MultiSubmitPolicy::NonEmptySelection),
        true,
    )
    .expect("controller");

    controller
        .handle_checkbox_click(&project, item("manual", Some("manual-el")))
        .expect("check manual");
    controller
        .handle_checkbox_click(&project, item("notes", Some("notes-el")))
        .expect("check notes");
    let order: Vec<&str> = controller
        .checked_items()
        .iter()
        .map(|entry| entry.hierarchy_node_id.as_str())
        .collect();
    assert_eq!(order, ["manual", "notes"]);
    assert!(controller.can_submit());

    controller
        .handle_checkbox_click(&project, item("manual", Some("manual-el")))
        .expect("uncheck manual");
    let order: Vec<&str> = controller
        .checked_items()
        .iter()
        .map(|entry| entry.hierarchy_node_id.as_str())
        .collect();
    assert_eq!(order, ["notes"]);

    controller.handle_clear_selection(&project);
    assert!(controller.checked_items().is_empty());
    assert!(!controller.can_submit());
}

#[test]
fn checkbox_click_also_moves_the_preview_selection() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(
        &project,
        &multi_config(MultiSubmitPolicy::NonEmptySelection),
        true,
    )
    .expect("controller");

    controller
        .handle_checkbox_click(&project, item("notes", Some("notes-el")))
        .expect("check notes");
    let selected = controller.selected_item().expect("selection");
    assert_eq!(selected.hierarchy_node_id, hierarchy_node_id("notes"));
}

#[test]
fn checking_unloaded_node_appends_pending_entry_then_backfills_in_place() {
    let (mut project, remote) = fixture();
    let mut controller = SelectionController::new(
        &project,
        &multi_config(MultiSubmitPolicy::NonEmptySelection),
        true,
    )
    .expect("controller");

    controller
        .handle_checkbox_click(&project, item("manual", Some("manual-el")))
        .expect("check manual");
    controller
        .handle_checkbox_click(&project, item("appendix", None))
        .expect("check appendix");
    controller
        .handle_checkbox_click(&project, item("notes", Some("notes-el")))
        .expect("check notes");

    assert_eq!(controller.checked_items()[1].context_node_id, None);

    let (ticket, requested) = {
        // The appendix load was requested by its checkbox click; the later
        // notes click superseded it, but the pending entry must still gain
        // its context id when the load lands.
        let mut load = None;
        for request in controller.take_requests() {
            if let Request::Load(ticket, document_id) = request {
                load = Some((ticket, document_id));
            }
        }
        load.expect("load request")
    };
    resolve_load(&mut controller, &mut project, &remote, ticket, &requested);

    let entry = &controller.checked_items()[1];
    assert_eq!(entry.hierarchy_node_id, hierarchy_node_id("appendix"));
    assert_eq!(entry.context_node_id, Some(node_id("appendix-el")));
    // Position at check-time, not at backfill-time.
    assert_eq!(
        controller.checked_items()[2].hierarchy_node_id,
        hierarchy_node_id("notes")
    );
    // The selection still reflects the latest click.
    let selected = controller.selected_item().expect("selection");
    assert_eq!(selected.hierarchy_node_id, hierarchy_node_id("notes"));
}

#[test]
fn hierarchy_change_leaves_checked_items_untouched() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(
        &project,
        &multi_config(MultiSubmitPolicy::NonEmptySelection),
        true,
    )
    .expect("controller");

    controller
        .handle_checkbox_click(&project, item("manual", Some("manual-el")))
        .expect("check manual");
    let before = controller.checked_items().to_vec();

    controller
        .handle_structure_view_click(&project, item("notes", Some("notes-el")))
        .expect("plain click");
    assert_eq!(controller.checked_items(), before.as_slice());
}

#[test]
fn multi_submit_policy_can_require_operation_enablement() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(
        &project,
        &multi_config(MultiSubmitPolicy::OperationEnabled),
        true,
    )
    .expect("controller");

    controller
        .handle_checkbox_click(&project, item("manual", Some("manual-el")))
        .expect("check manual");
    assert!(!controller.can_submit());

    grant_enablement(&mut controller);
    assert!(controller.can_submit());
}

#[test]
fn submit_resolves_pending_items_through_current_traversal_roots() {
    let (project, _) = fixture();
    let mut config = multi_config(MultiSubmitPolicy::NonEmptySelection);
    config.selected_items = vec![
        CheckedItem {
            hierarchy_node_id: hierarchy_node_id("manual"),
            context_node_id: None,
        },
        CheckedItem {
            hierarchy_node_id: hierarchy_node_id("appendix"),
            context_node_id: None,
        },
    ];
    let controller = SelectionController::new(&project, &config, true).expect("controller");

    let Some(SubmitPayload::Multi { selected_items }) = controller.submit_payload(&project)
    else {
        panic!("expected multi payload");
    };
    // `manual` is loaded: the pending entry resolves at submit time.
    assert_eq!(selected_items[0].context_node_id, Some(node_id("manual-el")));
    // `appendix` never loaded: left absent rather than failing the submit.
    assert_eq!(selected_items[1].context_node_id, None);
}

#[test]
fn enablement_rejection_means_not_enabled() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::manual"), true)
        .expect("controller");

    grant_enablement(&mut controller);
    assert!(controller.can_submit());

    controller.handle_preview_selection_change(&project, node_id("manual-el"));
    let ticket = take_enablement(&mut controller);
    controller.complete_enablement(
        ticket,
        Err(OperationQueryError {
            reason: "resolver unavailable".to_owned(),
        }),
    );
    assert!(!controller.can_submit());
}

#[test]
fn stale_enablement_answers_are_discarded() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::manual"), true)
        .expect("controller");

    let stale_ticket = take_enablement(&mut controller);
    // The derived target changes before the answer arrives.
    controller.handle_preview_selection_change(&project, node_id("manual-el"));
    controller.complete_enablement(stale_ticket, Ok(OperationState { enabled: true }));
    assert!(!controller.can_submit());

    grant_enablement(&mut controller);
    assert!(controller.can_submit());
}

#[test]
fn enablement_requests_carry_the_operation_input_shape() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::manual"), true)
        .expect("controller");

    let input = controller
        .take_requests()
        .into_iter()
        .find_map(|request| match request {
            Request::Enablement(_, input) => Some(input),
            Request::Load(..) => None,
        })
        .expect("enablement request");
    assert_eq!(input.operation.as_str(), "insert-link");
    assert_eq!(
        input.data.get("nodeId").and_then(|value| value.as_str()),
        Some("manual-el")
    );
    assert_eq!(
        input.data.get("documentId").and_then(|value| value.as_str()),
        Some("manual-doc")
    );
    // The static modal configuration is spread underneath.
    assert_eq!(
        input.data.get("modalTitle").and_then(|value| value.as_str()),
        Some("Browse project")
    );
}

#[test]
fn escape_always_cancels_and_enter_respects_the_gate() {
    let (project, _) = fixture();
    let mut controller = SelectionController::new(&project, &single_config("self::manual"), true)
        .expect("controller");

    assert_eq!(controller.keyboard_gate(), KeyboardGate::CancelOnly);
    assert_eq!(
        controller.modal_action_for_key(KeyCode::Esc),
        Some(ModalAction::Cancel)
    );
    assert_eq!(controller.modal_action_for_key(KeyCode::Enter), None);

    grant_enablement(&mut controller);
    assert_eq!(controller.keyboard_gate(), KeyboardGate::CancelOrSubmit);
    assert_eq!(
        controller.modal_action_for_key(KeyCode::Enter),
        Some(ModalAction::Submit)
    );
    assert_eq!(
        controller.modal_action_for_key(KeyCode::Esc),
        Some(ModalAction::Cancel)
    );
    assert_eq!(controller.modal_action_for_key(KeyCode::Tab), None);
}
