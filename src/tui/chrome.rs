// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Row models, state messages, and footer/style helpers used by modal
//! rendering.

use std::collections::BTreeSet;

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};

use crate::controller::LoadGate;
use crate::model::{CheckedItem, Document, HierarchyNodeId, NodeId};
use crate::project::Project;
use crate::query::LinkableQuery;

pub(super) const SELECTION_COLOR: Color = Color::LightGreen;
pub(super) const PATH_COLOR: Color = Color::Green;
pub(super) const CANDIDATE_COLOR: Color = Color::LightCyan;
pub(super) const MUTED_COLOR: Color = Color::DarkGray;
pub(super) const ERROR_COLOR: Color = Color::LightRed;
pub(super) const FOOTER_KEY_COLOR: Color = Color::Cyan;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

pub(super) fn spinner_frame(tick: u64) -> &'static str {
    SPINNER_FRAMES[(tick % SPINNER_FRAMES.len() as u64) as usize]
}

pub(super) fn stack_panes_vertically(area: Rect) -> bool {
    area.width < 80
}

/// One visible row of the structure view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct StructureRow {
    pub hierarchy_node_id: HierarchyNodeId,
    pub depth: usize,
    pub label: String,
    pub has_children: bool,
    pub is_collapsed: bool,
    pub remote_state: RemoteState,
}

/// Remote document state marker for a structure-view row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RemoteState {
    /// No document reference behind the row.
    None,
    NotLoaded,
    Loaded,
}

/// Checkbox display state for a row in multi-select mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum CheckState {
    Unchecked,
    /// Checked while the backing document is still loading.
    Pending,
    Checked,
}

/// Flattens the hierarchy into visible rows, skipping subtrees of collapsed
/// nodes.
pub(super) fn structure_rows(
    project: &Project,
    collapsed: &BTreeSet<HierarchyNodeId>,
) -> Vec<StructureRow> {
    let mut rows = Vec::new();
    let mut skip_deeper_than: Option<usize> = None;
    for (node, depth) in project.hierarchy().walk() {
        if let Some(limit) = skip_deeper_than {
            if depth > limit {
                continue;
            }
            skip_deeper_than = None;
        }
        let is_collapsed = collapsed.contains(node.hierarchy_node_id());
        if is_collapsed {
            skip_deeper_than = Some(depth);
        }
        let remote_state = match node.document_reference() {
            None => RemoteState::None,
            Some(_) if project.is_document_loaded(node.hierarchy_node_id()) => RemoteState::Loaded,
            Some(_) => RemoteState::NotLoaded,
        };
        rows.push(StructureRow {
            hierarchy_node_id: node.hierarchy_node_id().clone(),
            depth,
            label: node.label().to_owned(),
            has_children: !node.children().is_empty(),
            is_collapsed,
            remote_state,
        });
    }
    rows
}

pub(super) fn check_state(checked: &[CheckedItem], row: &StructureRow) -> CheckState {
    let Some(entry) = checked
        .iter()
        .find(|item| item.hierarchy_node_id == row.hierarchy_node_id)
    else {
        return CheckState::Unchecked;
    };
    if entry.context_node_id.is_some() {
        CheckState::Checked
    } else {
        CheckState::Pending
    }
}

/// The printable text of a structure-view row.
pub(super) fn structure_row_text(
    row: &StructureRow,
    check: Option<CheckState>,
) -> String {
    let mut text = String::new();
    for _ in 0..row.depth {
        text.push_str("  ");
    }
    text.push_str(match (row.has_children, row.is_collapsed) {
        (true, true) => "> ",
        (true, false) => "v ",
        (false, _) => "  ",
    });
    if let Some(check) = check {
        text.push_str(match check {
            CheckState::Unchecked => "[ ] ",
            CheckState::Pending => "[~] ",
            CheckState::Checked => "[x] ",
        });
    }
    text.push_str(&row.label);
    match row.remote_state {
        RemoteState::None => {}
        RemoteState::NotLoaded => text.push_str(" (o)"),
        RemoteState::Loaded => text.push_str(" (*)"),
    }
    text
}

pub(super) fn structure_row_style(is_selected: bool, on_path: bool) -> Style {
    if is_selected {
        Style::default()
            .fg(SELECTION_COLOR)
            .add_modifier(Modifier::BOLD)
    } else if on_path {
        Style::default().fg(PATH_COLOR)
    } else {
        Style::default()
    }
}

/// One row of the preview outline: an element of the traversal-root subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct PreviewRow {
    pub node_id: NodeId,
    pub depth: usize,
    pub text: String,
    pub linkable: bool,
}

/// Element outline of the subtree under `traversal_root`, with immediate text
/// content folded into each element's row.
pub(super) fn preview_rows(
    document: &Document,
    traversal_root: &NodeId,
    query: &LinkableQuery,
) -> Vec<PreviewRow> {
    let mut rows = Vec::new();
    for (node, depth) in document.descendants_or_self(traversal_root) {
        let Some(name) = node.name() else {
            continue;
        };
        let snippet: String = document
            .children_of(node.node_id())
            .filter_map(|child| child.text())
            .collect::<Vec<_>>()
            .join(" ");
        let mut text = format!("<{name}>");
        if !snippet.is_empty() {
            text.push(' ');
            text.push_str(&snippet);
        }
        rows.push(PreviewRow {
            node_id: node.node_id().clone(),
            depth,
            text,
            linkable: query.matches(document, node.node_id()),
        });
    }
    rows
}

pub(super) fn preview_row_text(row: &PreviewRow) -> String {
    let mut text = String::new();
    for _ in 0..row.depth {
        text.push_str("  ");
    }
    text.push_str(&row.text);
    text
}

/// What the preview pane shows when there is no document to preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct StateMessage {
    pub title: String,
    pub message: String,
    pub error: bool,
    pub spinner: bool,
}

pub(super) fn state_message(multi: bool, load_gate: LoadGate) -> StateMessage {
    match load_gate {
        LoadGate::Loading => StateMessage {
            title: "Loading".to_owned(),
            message: String::new(),
            error: false,
            spinner: true,
        },
        LoadGate::Broken => StateMessage {
            title: "This document could not be found".to_owned(),
            message: "Select a different item in the list to the left.".to_owned(),
            error: true,
            spinner: false,
        },
        LoadGate::Idle | LoadGate::Loaded if multi => StateMessage {
            title: "No item selected".to_owned(),
            message:
                "Select an item to preview it and use the checkboxes to select items to insert."
                    .to_owned(),
            error: false,
            spinner: false,
        },
        LoadGate::Idle | LoadGate::Loaded => StateMessage {
            title: "No item selected".to_owned(),
            message: "Select an item in the list to the left.".to_owned(),
            error: false,
            spinner: false,
        },
    }
}

/// The footer button line, left to right: cancel, optional clear-selection
/// with the live count, primary.
pub(super) fn footer_line(
    primary_label: &str,
    can_submit: bool,
    checked_count: Option<usize>,
) -> String {
    let mut line = String::from("[ Cancel (Esc) ]");
    if let Some(count) = checked_count {
        line.push_str(&format!("  [ Clear selection ( {count} ) (c) ]"));
    }
    if can_submit {
        line.push_str(&format!("  [ {primary_label} (Enter) ]"));
    } else {
        line.push_str(&format!("  ( {primary_label} )"));
    }
    line
}

pub(super) fn key_hints(multi: bool, preview_focused: bool) -> String {
    if preview_focused {
        "Up/Down select element  Tab structure view  Esc cancel".to_owned()
    } else if multi {
        "Up/Down move  Space preview  x toggle  c clear  Left/Right fold  Esc cancel".to_owned()
    } else {
        "Up/Down move  Space preview  Tab preview pane  Left/Right fold  Esc cancel".to_owned()
    }
}

pub(super) fn error_style() -> Style {
    Style::default().fg(ERROR_COLOR)
}

pub(super) fn muted_style() -> Style {
    Style::default().fg(MUTED_COLOR)
}
