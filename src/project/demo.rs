// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in demo project and demo host services.
//!
//! The demo loader and resolver stand in for the host's document manager and
//! operation system so the binary runs standalone: loads resolve after a
//! configurable delay, documents missing from the remote set fail to load,
//! and the demo operation is enabled whenever there is a concrete target.

use std::collections::BTreeMap;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::model::{
    Document, DocumentId, DocumentReference, Hierarchy, HierarchyNode, HierarchyNodeId,
    ModalConfig, MultiSubmitPolicy, NodeId, TraversalRoot,
};

use super::loader::{DocumentLoader, LoadError, LoadOutcome, LoadTicket, LoadedDocument};
use super::operations::{
    EnablementOutcome, EnablementTicket, OperationInput, OperationResolver, OperationState,
};
use super::Project;

fn hierarchy_node_id(value: &str) -> HierarchyNodeId {
    HierarchyNodeId::new(value).expect("demo hierarchy node id")
}

fn node_id(value: &str) -> NodeId {
    NodeId::new(value).expect("demo node id")
}

fn document_id(value: &str) -> DocumentId {
    DocumentId::new(value).expect("demo document id")
}

fn section(document: &mut Document, parent: &str, id: &str, title: &str, paras: &[&str]) {
    document
        .append_element(&node_id(parent), node_id(id), "section")
        .expect("demo section");
    let title_id = format!("{id}-title");
    document
        .append_element(&node_id(id), node_id(&title_id), "title")
        .expect("demo title");
    document
        .append_text(&node_id(&title_id), node_id(&format!("{id}-title-text")), title)
        .expect("demo title text");
    for (index, para) in paras.iter().enumerate() {
        let para_id = format!("{id}-para-{index}");
        document
            .append_element(&node_id(id), node_id(&para_id), "para")
            .expect("demo para");
        document
            .append_text(&node_id(&para_id), node_id(&format!("{para_id}-text")), *para)
            .expect("demo para text");
    }
}

fn manual_document() -> Document {
    let mut document = Document::new(document_id("manual-doc"), node_id("manual-root"));
    document
        .append_element(&node_id("manual-root"), node_id("manual-el"), "manual")
        .expect("demo manual");
    section(
        &mut document,
        "manual-el",
        "manual-intro",
        "Introduction",
        &["Welcome to the user manual.", "Pick a topic on the left."],
    );
    section(
        &mut document,
        "manual-el",
        "manual-install",
        "Installation",
        &["Download the package.", "Run the installer."],
    );
    document
}

fn release_notes_document() -> Document {
    let mut document = Document::new(document_id("release-notes-doc"), node_id("notes-root"));
    document
        .append_element(&node_id("notes-root"), node_id("notes-el"), "manual")
        .expect("demo notes");
    section(
        &mut document,
        "notes-el",
        "notes-latest",
        "Latest release",
        &["Fixed the things that were broken."],
    );
    document
}

fn remote_document(doc: &str, root_el: &str, title: &str) -> LoadedDocument {
    let mut document = Document::new(document_id(doc), node_id(&format!("{doc}-root")));
    document
        .append_element(
            &node_id(&format!("{doc}-root")),
            node_id(root_el),
            "manual",
        )
        .expect("demo remote root");
    section(
        &mut document,
        root_el,
        &format!("{doc}-main"),
        title,
        &["This document was loaded on demand."],
    );
    LoadedDocument {
        document,
        traversal_root: TraversalRoot::WholeDocument,
    }
}

/// The demo project: one loaded manual, a loaded release-notes document under
/// a folder, and two documents that only load on demand. `troubleshooting`
/// references a document the remote set does not contain, so selecting it
/// shows the broken-document state.
pub fn demo_project() -> (Project, BTreeMap<DocumentId, LoadedDocument>) {
    let mut hierarchy = Hierarchy::new();
    hierarchy
        .insert_root(
            HierarchyNode::new(hierarchy_node_id("user-manual"), "User manual")
                .with_document_reference(DocumentReference::loaded(
                    document_id("manual-doc"),
                    TraversalRoot::WholeDocument,
                )),
        )
        .expect("demo root");
    hierarchy
        .insert_child(
            &hierarchy_node_id("user-manual"),
            HierarchyNode::new(hierarchy_node_id("getting-started"), "Getting started")
                .with_document_reference(DocumentReference::not_loaded(document_id(
                    "getting-started-doc",
                ))),
        )
        .expect("demo getting started");
    hierarchy
        .insert_child(
            &hierarchy_node_id("user-manual"),
            HierarchyNode::new(hierarchy_node_id("advanced"), "Advanced topics")
                .with_document_reference(DocumentReference::not_loaded(document_id(
                    "advanced-doc",
                ))),
        )
        .expect("demo advanced");
    hierarchy
        .insert_child(
            &hierarchy_node_id("user-manual"),
            HierarchyNode::new(hierarchy_node_id("troubleshooting"), "Troubleshooting")
                .with_document_reference(DocumentReference::not_loaded(document_id(
                    "troubleshooting-doc",
                ))),
        )
        .expect("demo troubleshooting");
    hierarchy
        .insert_root(HierarchyNode::new(
            hierarchy_node_id("attachments"),
            "Attachments",
        ))
        .expect("demo attachments");
    hierarchy
        .insert_child(
            &hierarchy_node_id("attachments"),
            HierarchyNode::new(hierarchy_node_id("release-notes"), "Release notes")
                .with_document_reference(DocumentReference::loaded(
                    document_id("release-notes-doc"),
                    TraversalRoot::WholeDocument,
                )),
        )
        .expect("demo release notes");

    let mut project = Project::new(hierarchy);
    project.insert_document(manual_document());
    project.insert_document(release_notes_document());

    let mut remote = BTreeMap::new();
    remote.insert(
        document_id("getting-started-doc"),
        remote_document("getting-started-doc", "gs-el", "Getting started"),
    );
    remote.insert(
        document_id("advanced-doc"),
        remote_document("advanced-doc", "adv-el", "Advanced topics"),
    );
    (project, remote)
}

pub fn demo_config(multi: bool) -> ModalConfig {
    ModalConfig {
        document_id: document_id("manual-doc"),
        node_id: None,
        selected_items: Vec::new(),
        show_checkbox_selector: multi,
        insert_operation_name: if multi { "insert-conrefs" } else { "insert-link" }
            .parse()
            .expect("demo operation name"),
        linkable_elements_query: "self::section | self::manual".to_owned(),
        modal_title: if multi {
            "Select items to insert".to_owned()
        } else {
            "Select a link target".to_owned()
        },
        modal_icon: "folder-open-o".to_owned(),
        modal_primary_button_label: "Insert".to_owned(),
        multi_submit_policy: MultiSubmitPolicy::NonEmptySelection,
    }
}

/// Delay-and-answer loader over an in-memory remote document set.
pub struct DemoLoader {
    handle: Handle,
    outcomes: mpsc::UnboundedSender<LoadOutcome>,
    remote: BTreeMap<DocumentId, LoadedDocument>,
    delay: Duration,
}

impl DemoLoader {
    pub fn new(
        handle: Handle,
        outcomes: mpsc::UnboundedSender<LoadOutcome>,
        remote: BTreeMap<DocumentId, LoadedDocument>,
        delay: Duration,
    ) -> Self {
        Self {
            handle,
            outcomes,
            remote,
            delay,
        }
    }
}

impl DocumentLoader for DemoLoader {
    fn can_retry_loading(&self) -> bool {
        true
    }

    fn retry_loading(&self, ticket: LoadTicket, document_id: DocumentId) {
        let result = self
            .remote
            .get(&document_id)
            .cloned()
            .ok_or(LoadError::NotFound { document_id });
        let outcomes = self.outcomes.clone();
        let delay = self.delay;
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = outcomes.send(LoadOutcome { ticket, result });
        });
    }
}

/// Enables the demo operation whenever the input carries a concrete target:
/// a non-null `nodeId` or a non-empty `selectedItems`.
pub struct DemoResolver {
    handle: Handle,
    outcomes: mpsc::UnboundedSender<EnablementOutcome>,
    delay: Duration,
}

impl DemoResolver {
    pub fn new(
        handle: Handle,
        outcomes: mpsc::UnboundedSender<EnablementOutcome>,
        delay: Duration,
    ) -> Self {
        Self {
            handle,
            outcomes,
            delay,
        }
    }
}

impl OperationResolver for DemoResolver {
    fn query_enablement(&self, ticket: EnablementTicket, input: OperationInput) {
        let has_node = input
            .data
            .get("nodeId")
            .is_some_and(|value| value.is_string());
        let has_items = input
            .data
            .get("selectedItems")
            .and_then(|value| value.as_array())
            .is_some_and(|items| !items.is_empty());
        let enabled = has_node || has_items;
        let outcomes = self.outcomes.clone();
        let delay = self.delay;
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = outcomes.send(EnablementOutcome {
                ticket,
                result: Ok(OperationState { enabled }),
            });
        });
    }
}
