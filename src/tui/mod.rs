// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Terminal rendering and event shell for the project browser modal.
//!
//! The shell owns the project view and the selection controller: each tick it
//! drains host-service outcomes from the channels, applies them to the
//! project first and the controller second, dispatches freshly emitted
//! requests, then draws. Escape and Enter go through the controller's
//! keyboard gate; everything else is pane navigation.

use std::collections::BTreeSet;
use std::error::Error;
use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use tokio::sync::mpsc;

use crate::controller::{LoadGate, ModalAction, Request, SelectionController};
use crate::model::{ModalConfig, SelectedStructureViewItem, SubmitPayload};
use crate::project::{
    DocumentLoader, EnablementOutcome, LoadOutcome, OperationResolver, Project,
};
use crate::query::LinkableQuery;

mod chrome;

use chrome::{PreviewRow, StructureRow};

/// How the modal closed.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutcome {
    Submitted(SubmitPayload),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PaneFocus {
    Structure,
    Preview,
}

/// Runs the modal until the user submits or cancels.
pub fn run_modal(
    project: Project,
    config: ModalConfig,
    loader: Box<dyn DocumentLoader>,
    resolver: Box<dyn OperationResolver>,
    load_outcomes: mpsc::UnboundedReceiver<LoadOutcome>,
    enablement_outcomes: mpsc::UnboundedReceiver<EnablementOutcome>,
) -> Result<ModalOutcome, Box<dyn Error>> {
    let mut terminal = TerminalSession::new()?;
    let mut shell = ModalShell::new(
        project,
        config,
        loader,
        resolver,
        load_outcomes,
        enablement_outcomes,
    )?;

    loop {
        shell.drain_outcomes();
        shell.dispatch_requests();
        shell.tick = shell.tick.wrapping_add(1);
        terminal.draw(|frame| draw(frame, &mut shell))?;

        if let Some(outcome) = shell.outcome.take() {
            return Ok(outcome);
        }

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    shell.handle_key(key)?;
                }
                _ => {}
            }
        }
    }
}

struct ModalShell {
    project: Project,
    config: ModalConfig,
    controller: SelectionController,
    linkable_query: LinkableQuery,
    loader: Box<dyn DocumentLoader>,
    resolver: Box<dyn OperationResolver>,
    load_outcomes: mpsc::UnboundedReceiver<LoadOutcome>,
    enablement_outcomes: mpsc::UnboundedReceiver<EnablementOutcome>,
    focus: PaneFocus,
    structure_cursor: usize,
    preview_cursor: usize,
    collapsed: BTreeSet<crate::model::HierarchyNodeId>,
    tick: u64,
    outcome: Option<ModalOutcome>,
}

impl ModalShell {
    fn new(
        project: Project,
        config: ModalConfig,
        loader: Box<dyn DocumentLoader>,
        resolver: Box<dyn OperationResolver>,
        load_outcomes: mpsc::UnboundedReceiver<LoadOutcome>,
        enablement_outcomes: mpsc::UnboundedReceiver<EnablementOutcome>,
    ) -> Result<Self, Box<dyn Error>> {
        let controller = SelectionController::new(&project, &config, loader.can_retry_loading())?;
        let linkable_query = LinkableQuery::parse(&config.linkable_elements_query)?;
        let mut shell = Self {
            project,
            config,
            controller,
            linkable_query,
            loader,
            resolver,
            load_outcomes,
            enablement_outcomes,
            focus: PaneFocus::Structure,
            structure_cursor: 0,
            preview_cursor: 0,
            collapsed: BTreeSet::new(),
            tick: 0,
            outcome: None,
        };
        shell.move_structure_cursor_to_selection();
        Ok(shell)
    }

    fn structure_rows(&self) -> Vec<StructureRow> {
        chrome::structure_rows(&self.project, &self.collapsed)
    }

    fn preview_rows(&self) -> Vec<PreviewRow> {
        let Some(document_id) = self.controller.current_document_id(&self.project) else {
            return Vec::new();
        };
        let Some(document) = self.project.document(document_id) else {
            return Vec::new();
        };
        let Some(traversal_root) = self
            .controller
            .selected_item()
            .and_then(|item| item.context_node_id.clone())
        else {
            return Vec::new();
        };
        chrome::preview_rows(document, &traversal_root, &self.linkable_query)
    }

    fn move_structure_cursor_to_selection(&mut self) {
        let Some(selected) = self.controller.selected_item() else {
            return;
        };
        let rows = self.structure_rows();
        if let Some(index) = rows
            .iter()
            .position(|row| row.hierarchy_node_id == selected.hierarchy_node_id)
        {
            self.structure_cursor = index;
        }
    }

    fn drain_outcomes(&mut self) {
        while let Ok(outcome) = self.load_outcomes.try_recv() {
            let LoadOutcome { ticket, result } = outcome;
            match result {
                Ok(loaded) => {
                    let install = self.project.install_document(
                        &ticket.hierarchy_node_id,
                        loaded.document,
                        loaded.traversal_root,
                    );
                    match install {
                        Ok(()) => self.controller.complete_load(&self.project, ticket, Ok(())),
                        Err(err) => self.controller.complete_load(
                            &self.project,
                            ticket,
                            Err(crate::project::LoadError::Unavailable {
                                reason: err.to_string(),
                            }),
                        ),
                    }
                }
                Err(err) => self.controller.complete_load(&self.project, ticket, Err(err)),
            }
            self.preview_cursor = 0;
        }
        while let Ok(outcome) = self.enablement_outcomes.try_recv() {
            self.controller
                .complete_enablement(outcome.ticket, outcome.result);
        }
    }

    fn dispatch_requests(&mut self) {
        for request in self.controller.take_requests() {
            match request {
                Request::Load(ticket, document_id) => {
                    self.loader.retry_loading(ticket, document_id);
                }
                Request::Enablement(ticket, input) => {
                    self.resolver.query_enablement(ticket, input);
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<(), Box<dyn Error>> {
        match self.controller.modal_action_for_key(key.code) {
            Some(ModalAction::Cancel) => {
                self.outcome = Some(ModalOutcome::Cancelled);
                return Ok(());
            }
            Some(ModalAction::Submit) => {
                if let Some(payload) = self.controller.submit_payload(&self.project) {
                    self.outcome = Some(ModalOutcome::Submitted(payload));
                }
                return Ok(());
            }
            None => {}
        }

        match key.code {
            KeyCode::Tab => self.toggle_focus(),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1)?,
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1)?,
            KeyCode::Char(' ') => self.activate_structure_row(false)?,
            KeyCode::Char('x') if self.controller.is_multi_select() => {
                self.activate_structure_row(true)?;
            }
            KeyCode::Char('c') if self.controller.is_multi_select() => {
                self.controller.handle_clear_selection(&self.project);
            }
            KeyCode::Left => self.set_current_collapsed(true),
            KeyCode::Right => self.set_current_collapsed(false),
            KeyCode::Char('[') => self.collapse_all(),
            KeyCode::Char(']') => self.collapsed.clear(),
            _ => {}
        }
        self.dispatch_requests();
        Ok(())
    }

    fn toggle_focus(&mut self) {
        // The preview is only interactive in single-select mode, where it
        // offers the linkable elements.
        if self.controller.is_multi_select() {
            return;
        }
        self.focus = match self.focus {
            PaneFocus::Structure if !self.preview_rows().is_empty() => PaneFocus::Preview,
            _ => PaneFocus::Structure,
        };
    }

    fn move_cursor(&mut self, delta: isize) -> Result<(), Box<dyn Error>> {
        match self.focus {
            PaneFocus::Structure => {
                let rows = self.structure_rows();
                if rows.is_empty() {
                    return Ok(());
                }
                let last = rows.len() - 1;
                self.structure_cursor = move_within(self.structure_cursor, delta, last);
            }
            PaneFocus::Preview => {
                let rows = self.preview_rows();
                let linkable_indexes: Vec<usize> = rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| row.linkable)
                    .map(|(index, _)| index)
                    .collect();
                if linkable_indexes.is_empty() {
                    return Ok(());
                }
                let position = linkable_indexes
                    .iter()
                    .position(|&index| index == self.preview_cursor)
                    .unwrap_or(0);
                let position = move_within(position, delta, linkable_indexes.len() - 1);
                self.preview_cursor = linkable_indexes[position];
                let node_id = rows[self.preview_cursor].node_id.clone();
                self.controller
                    .handle_preview_selection_change(&self.project, node_id);
            }
        }
        Ok(())
    }

    /// Space (row click) or `x` (checkbox click) on the structure row under
    /// the cursor.
    fn activate_structure_row(&mut self, checkbox: bool) -> Result<(), Box<dyn Error>> {
        let rows = self.structure_rows();
        let Some(row) = rows.get(self.structure_cursor) else {
            return Ok(());
        };
        let item = SelectedStructureViewItem {
            hierarchy_node_id: row.hierarchy_node_id.clone(),
            context_node_id: self.project.traversal_root_node_id(&row.hierarchy_node_id),
        };
        if checkbox {
            self.controller.handle_checkbox_click(&self.project, item)?;
        } else {
            self.controller
                .handle_structure_view_click(&self.project, item)?;
        }
        self.focus = PaneFocus::Structure;
        self.preview_cursor = 0;
        Ok(())
    }

    fn set_current_collapsed(&mut self, collapsed: bool) {
        let rows = self.structure_rows();
        let Some(row) = rows.get(self.structure_cursor) else {
            return;
        };
        if !row.has_children {
            return;
        }
        if collapsed {
            self.collapsed.insert(row.hierarchy_node_id.clone());
        } else {
            self.collapsed.remove(&row.hierarchy_node_id);
        }
    }

    fn collapse_all(&mut self) {
        for (node, _) in self.project.hierarchy().walk() {
            if !node.children().is_empty() {
                self.collapsed.insert(node.hierarchy_node_id().clone());
            }
        }
        let rows = self.structure_rows();
        if self.structure_cursor >= rows.len() {
            self.structure_cursor = rows.len().saturating_sub(1);
        }
    }
}

fn move_within(current: usize, delta: isize, last: usize) -> usize {
    if delta < 0 {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        (current + delta as usize).min(last)
    }
}

fn draw(frame: &mut Frame<'_>, shell: &mut ModalShell) {
    let area = frame.size();

    let modal = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", shell.config.modal_title));
    let inner = modal.inner(area);
    frame.render_widget(modal, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    let body_area = layout[0];
    let hints_area = layout[1];
    let footer_area = layout[2];

    let direction = if chrome::stack_panes_vertically(body_area) {
        Direction::Vertical
    } else {
        Direction::Horizontal
    };
    // Multi mode gives the structure view more room, as the checkboxes live
    // there; single mode favors the preview.
    let (structure_share, preview_share) = if shell.controller.is_multi_select() {
        (2, 3)
    } else {
        (1, 2)
    };
    let panes = Layout::default()
        .direction(direction)
        .constraints([
            Constraint::Ratio(structure_share, structure_share + preview_share),
            Constraint::Ratio(preview_share, structure_share + preview_share),
        ])
        .split(body_area);

    draw_structure_pane(frame, panes[0], shell);
    draw_preview_pane(frame, panes[1], shell);

    let hints = chrome::key_hints(
        shell.controller.is_multi_select(),
        shell.focus == PaneFocus::Preview,
    );
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(chrome::FOOTER_KEY_COLOR)),
        hints_area,
    );

    let checked_count = shell
        .controller
        .is_multi_select()
        .then(|| shell.controller.checked_items().len());
    let footer = chrome::footer_line(
        &shell.config.modal_primary_button_label,
        shell.controller.can_submit(),
        checked_count,
    );
    let footer_style = if shell.controller.can_submit() {
        Style::default()
    } else {
        chrome::muted_style()
    };
    frame.render_widget(Paragraph::new(footer).style(footer_style), footer_area);
}

fn draw_structure_pane(frame: &mut Frame<'_>, area: Rect, shell: &mut ModalShell) {
    let rows = shell.structure_rows();
    let selected_path = shell
        .controller
        .selected_item()
        .map(|item| shell.project.ancestor_hierarchy_ids(&item.hierarchy_node_id))
        .unwrap_or_default();
    let selected_id = shell
        .controller
        .selected_item()
        .map(|item| item.hierarchy_node_id.clone());
    let multi = shell.controller.is_multi_select();
    let checked = shell.controller.checked_items();

    let items: Vec<ListItem<'_>> = rows
        .iter()
        .map(|row| {
            let check = multi.then(|| chrome::check_state(checked, row));
            let is_selected = selected_id.as_ref() == Some(&row.hierarchy_node_id);
            let on_path = selected_path.contains(&row.hierarchy_node_id);
            ListItem::new(chrome::structure_row_text(row, check))
                .style(chrome::structure_row_style(is_selected, on_path))
        })
        .collect();

    let border_style = if shell.focus == PaneFocus::Structure {
        Style::default().fg(chrome::SELECTION_COLOR)
    } else {
        Style::default()
    };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(" Project "),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select((!rows.is_empty()).then_some(shell.structure_cursor.min(rows.len().saturating_sub(1))));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_preview_pane(frame: &mut Frame<'_>, area: Rect, shell: &mut ModalShell) {
    let border_style = if shell.focus == PaneFocus::Preview {
        Style::default().fg(chrome::SELECTION_COLOR)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(" Preview ");

    let rows = shell.preview_rows();
    if rows.is_empty() || shell.controller.load_gate() != LoadGate::Loaded {
        let message = chrome::state_message(
            shell.controller.is_multi_select(),
            shell.controller.load_gate(),
        );
        let mut text = message.title.clone();
        if message.spinner {
            text = format!("{} {}", chrome::spinner_frame(shell.tick), text);
        }
        if !message.message.is_empty() {
            text.push_str("\n\n");
            text.push_str(&message.message);
        }
        let style = if message.error {
            chrome::error_style()
        } else {
            chrome::muted_style()
        };
        frame.render_widget(
            Paragraph::new(text).style(style).wrap(Wrap { trim: true }).block(block),
            area,
        );
        return;
    }

    let candidate = shell.controller.candidate().cloned();
    let items: Vec<ListItem<'_>> = rows
        .iter()
        .map(|row| {
            let mut style = Style::default();
            if !shell.controller.is_multi_select() {
                if candidate.as_ref() == Some(&row.node_id) {
                    style = Style::default()
                        .fg(chrome::CANDIDATE_COLOR)
                        .add_modifier(Modifier::BOLD);
                } else if !row.linkable {
                    style = chrome::muted_style();
                }
            }
            ListItem::new(chrome::preview_row_text(row)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    if shell.focus == PaneFocus::Preview {
        state.select(Some(shell.preview_cursor.min(rows.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|err| {
            teardown_terminal();
            err
        })?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).map_err(|err| {
            teardown_terminal();
            err
        })?;
        terminal.clear().map_err(|err| {
            teardown_terminal();
            err
        })?;

        Ok(Self { terminal })
    }

    fn draw(&mut self, draw_fn: impl FnOnce(&mut Frame<'_>)) -> io::Result<()> {
        self.terminal.draw(draw_fn)?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
        teardown_terminal();
    }
}

fn teardown_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}
