// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arcroute: shortest paths in weighted directed graphs, solved as an exact 0/1 arc-selection
//! program.
//!
//! A query snapshots the graph, builds the program (`formulation`), hands it to a backend
//! (`solver`), and walks the selected arcs back into an ordered path (`extract`). `query` ties
//! those together; `editor`, `format`, `view` and `mcp` are the surfaces around it.

pub mod editor;
pub mod extract;
pub mod format;
pub mod formulation;
pub mod mcp;
pub mod model;
pub mod query;
pub mod solver;
pub mod view;
