// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus — terminal project browser modal for hierarchical document
//! sessions.
//!
//! A host embeds the modal by handing it a [`project::Project`] view, a
//! [`model::ModalConfig`], and the two host services
//! ([`project::DocumentLoader`], [`project::OperationResolver`]); the modal
//! resolves to a submit payload or a cancellation. The selection rules live
//! in [`controller::SelectionController`] and are usable without the
//! terminal shell.

pub mod controller;
pub mod model;
pub mod project;
pub mod query;
pub mod tui;
