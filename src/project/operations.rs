// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The operation-enablement bridge.
//!
//! Whether the primary button may submit depends on a host operation whose
//! enablement is computed elsewhere, possibly asynchronously. The modal sends
//! the operation name plus an input object (the modal configuration spread
//! with the live derived target on top) and receives `{enabled}` back,
//! correlated by ticket.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::OperationName;

/// Correlation token for one enablement query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnablementTicket {
    pub generation: u64,
}

/// The input object handed to the host resolver.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationInput {
    pub operation: OperationName,
    /// Modal configuration fields with `documentId`/`nodeId` or
    /// `selectedItems` overlaid, mirroring the host's operation data shape.
    pub data: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperationState {
    pub enabled: bool,
}

/// Completion of an enablement query, delivered on the shell's outcome
/// channel. A rejected query is an outcome, never a crash; the controller
/// coerces it to "not enabled".
#[derive(Debug, Clone, PartialEq)]
pub struct EnablementOutcome {
    pub ticket: EnablementTicket,
    pub result: Result<OperationState, OperationQueryError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationQueryError {
    pub reason: String,
}

impl fmt::Display for OperationQueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "operation enablement query failed: {}", self.reason)
    }
}

impl std::error::Error for OperationQueryError {}

/// Host capability answering enablement queries. Fire-and-forget, like the
/// document loader; results come back by ticket.
pub trait OperationResolver {
    fn query_enablement(&self, ticket: EnablementTicket, input: OperationInput);
}
