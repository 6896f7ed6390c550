// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Core graph data model.
//!
//! Editors hold ordered `ArcRecord`s; queries run against an immutable `GraphSnapshot` built from
//! those records.

pub mod arc;
pub mod fixtures;
pub mod ids;
pub mod snapshot;

pub use arc::{ArcLabel, ArcRecord, DirectedArc, ParseArcLabelError};
pub use fixtures::{ExampleGraph, UnknownExampleError};
pub use ids::{ArcIndex, Id, IdError, NodeId, ARC_LABEL_SEPARATOR};
pub use snapshot::{GraphSnapshot, IncidentArcs, SnapshotError};
