// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct McpArcRecord {
    pub source: String,
    /// Absent for a declared node without arcs.
    pub target: Option<String>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GraphReadResponse {
    pub rev: u64,
    pub nodes: Vec<String>,
    pub arc_labels: Vec<String>,
    pub records: Vec<McpArcRecord>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GraphAddNodeParams {
    pub node: String,
    pub base_rev: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GraphAddArcParams {
    pub source: String,
    pub target: String,
    pub weight: f64,
    pub base_rev: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GraphRemoveNodesParams {
    pub nodes: Vec<String>,
    pub base_rev: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GraphRemoveArcsParams {
    /// `source->target` labels; every parallel arc of a pair is removed.
    pub arcs: Vec<String>,
    pub base_rev: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GraphEditResponse {
    pub new_rev: u64,
    pub applied: u64,
    pub added_nodes: Vec<String>,
    pub added_arcs: Vec<String>,
    pub removed_records: u64,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GraphLoadExampleParams {
    /// `route` (default), `lecture` or `parallel`.
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GraphImportCsvParams {
    /// Full CSV text with a `source,target,weight` header.
    pub csv: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GraphReplaceResponse {
    pub rev: u64,
    pub records: u64,
    pub arcs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GraphExportCsvResponse {
    pub rev: u64,
    pub csv: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GraphElementsParams {
    pub source: Option<String>,
    pub target: Option<String>,
    /// Highlight the shortest path between `source` and `target` (default true when both are set).
    pub highlight_path: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpNodeElement {
    pub id: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpArcElement {
    pub index: u64,
    pub source: String,
    pub target: String,
    pub label: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GraphElementsResponse {
    pub rev: u64,
    pub nodes: Vec<McpNodeElement>,
    pub arcs: Vec<McpArcElement>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct PathFindParams {
    pub source: String,
    pub target: String,
    /// `mip` (default) or `cp`.
    pub backend: Option<String>,
    pub time_limit_ms: Option<u64>,
    pub node_limit: Option<u64>,
    /// Forbid arcs into the source and out of the target (default true).
    pub close_terminals: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct McpPathArc {
    pub index: u64,
    pub source: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PathFindResponse {
    pub rev: u64,
    pub found: bool,
    /// Display message on success, `No path found` otherwise.
    pub message: String,
    pub arcs: Vec<McpPathArc>,
    pub total_weight: Option<f64>,
    pub status: Option<String>,
    pub backend: String,
    /// Failure kind (`infeasible`, `malformed_query`, ...).
    pub kind: Option<String>,
    /// Human-readable failure reason.
    pub reason: Option<String>,
}
