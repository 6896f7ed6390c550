// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;
use std::time::Duration;

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::{Json, Parameters};
use rmcp::model::{ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler, ServiceExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::editor::{EditError, EditOp, EditResult, GraphDocument};
use crate::format::csv::{export_csv, parse_csv};
use crate::formulation::FormulationOptions;
use crate::model::{ArcLabel, ArcRecord, ExampleGraph, GraphSnapshot, NodeId};
use crate::query::{find_shortest_path, QueryError, QueryOptions, ShortestPath};
use crate::solver::Backend;
use crate::view;

use super::types::*;

#[derive(Clone)]
pub struct ArcrouteMcp {
    document: Arc<Mutex<GraphDocument>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl ArcrouteMcp {
    pub fn new(document: GraphDocument) -> Self {
        Self::with_shared_document(Arc::new(Mutex::new(document)))
    }

    pub fn with_shared_document(document: Arc<Mutex<GraphDocument>>) -> Self {
        Self { document, tool_router: Self::tool_router() }
    }

    pub async fn serve_stdio(self) -> Result<(), rmcp::RmcpError> {
        let service = self.serve((tokio::io::stdin(), tokio::io::stdout())).await?;
        service.waiting().await?;
        Ok(())
    }

    async fn apply_edit(
        &self,
        base_rev: Option<u64>,
        edit: impl FnOnce(&mut GraphDocument, u64) -> Result<EditResult, EditError>,
    ) -> Result<Json<GraphEditResponse>, ErrorData> {
        let mut document = self.document.lock().await;
        let base_rev = base_rev.unwrap_or_else(|| document.rev());
        let result = edit(&mut *document, base_rev).map_err(map_edit_error)?;
        debug!(new_rev = result.new_rev, applied = result.applied, "mcp: graph edited");
        Ok(Json(edit_response(result)))
    }

    /// Read the graph document: revision, sorted node labels, `A->B` arc labels and raw records.
    #[tool(name = "graph.read")]
    async fn graph_read(&self) -> Result<Json<GraphReadResponse>, ErrorData> {
        let document = self.document.lock().await;
        Ok(Json(GraphReadResponse {
            rev: document.rev(),
            nodes: document.nodes().iter().map(|node| node.as_str().to_owned()).collect(),
            arc_labels: document.arc_labels(),
            records: document.records().iter().map(record_to_mcp).collect(),
        }))
    }

    /// Declare a node; a no-op when the label is already used by any record.
    #[tool(name = "graph.add_node")]
    async fn graph_add_node(
        &self,
        params: Parameters<GraphAddNodeParams>,
    ) -> Result<Json<GraphEditResponse>, ErrorData> {
        let GraphAddNodeParams { node, base_rev } = params.0;
        let node = parse_node("node", &node)?;
        self.apply_edit(base_rev, |document, base_rev| {
            document.apply(base_rev, &[EditOp::AddNode { node }])
        })
        .await
    }

    /// Append a weighted arc; parallel arcs are kept as separate records.
    #[tool(name = "graph.add_arc")]
    async fn graph_add_arc(
        &self,
        params: Parameters<GraphAddArcParams>,
    ) -> Result<Json<GraphEditResponse>, ErrorData> {
        let GraphAddArcParams { source, target, weight, base_rev } = params.0;
        let source = parse_node("source", &source)?;
        let target = parse_node("target", &target)?;
        self.apply_edit(base_rev, |document, base_rev| {
            document.apply(base_rev, &[EditOp::AddArc { source, target, weight }])
        })
        .await
    }

    /// Remove nodes and every record touching them.
    #[tool(name = "graph.remove_nodes")]
    async fn graph_remove_nodes(
        &self,
        params: Parameters<GraphRemoveNodesParams>,
    ) -> Result<Json<GraphEditResponse>, ErrorData> {
        let GraphRemoveNodesParams { nodes, base_rev } = params.0;
        let nodes = nodes
            .iter()
            .map(|node| parse_node("nodes", node))
            .collect::<Result<Vec<_>, _>>()?;
        self.apply_edit(base_rev, |document, base_rev| {
            document.apply(base_rev, &[EditOp::RemoveNodes { nodes }])
        })
        .await
    }

    /// Remove arcs by `source->target` label (all parallel arcs of the pair).
    #[tool(name = "graph.remove_arcs")]
    async fn graph_remove_arcs(
        &self,
        params: Parameters<GraphRemoveArcsParams>,
    ) -> Result<Json<GraphEditResponse>, ErrorData> {
        let GraphRemoveArcsParams { arcs, base_rev } = params.0;
        let arcs = arcs
            .iter()
            .map(|arc| {
                arc.parse::<ArcLabel>().map_err(|err| {
                    ErrorData::invalid_params(
                        format!("invalid arc label: {err}"),
                        Some(serde_json::json!({ "arc": arc })),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.apply_edit(base_rev, |document, base_rev| {
            document.apply(base_rev, &[EditOp::RemoveArcs { arcs }])
        })
        .await
    }

    /// Replace the document with a built-in example (`route`, `lecture`, `parallel`).
    #[tool(name = "graph.load_example")]
    async fn graph_load_example(
        &self,
        params: Parameters<GraphLoadExampleParams>,
    ) -> Result<Json<GraphReplaceResponse>, ErrorData> {
        let example = match params.0.name.as_deref().filter(|name| !name.is_empty()) {
            None => ExampleGraph::default(),
            Some(name) => name.parse::<ExampleGraph>().map_err(|err| {
                let data = serde_json::json!({ "name": name });
                ErrorData::invalid_params(err.to_string(), Some(data))
            })?,
        };
        Ok(Json(self.replace_records(example.records()).await))
    }

    /// Replace the document with records parsed from `source,target,weight` CSV text.
    #[tool(name = "graph.import_csv")]
    async fn graph_import_csv(
        &self,
        params: Parameters<GraphImportCsvParams>,
    ) -> Result<Json<GraphReplaceResponse>, ErrorData> {
        let records = parse_csv(&params.0.csv)
            .map_err(|err| ErrorData::invalid_params(format!("invalid csv: {err}"), None))?;
        Ok(Json(self.replace_records(records).await))
    }

    /// Export the document as `source,target,weight` CSV text.
    #[tool(name = "graph.export_csv")]
    async fn graph_export_csv(&self) -> Result<Json<GraphExportCsvResponse>, ErrorData> {
        let document = self.document.lock().await;
        let csv = export_csv(document.records())
            .map_err(|err| ErrorData::internal_error(format!("csv export failed: {err}"), None))?;
        Ok(Json(GraphExportCsvResponse { rev: document.rev(), csv }))
    }

    /// Node and arc elements for rendering; optionally highlights the shortest path.
    #[tool(name = "graph.elements")]
    async fn graph_elements(
        &self,
        params: Parameters<GraphElementsParams>,
    ) -> Result<Json<GraphElementsResponse>, ErrorData> {
        let GraphElementsParams { source, target, highlight_path } = params.0;
        let source = source.as_deref().map(|value| parse_node("source", value)).transpose()?;
        let target = target.as_deref().map(|value| parse_node("target", value)).transpose()?;

        let (rev, records) = {
            let document = self.document.lock().await;
            (document.rev(), document.records().to_vec())
        };

        let mut message = None;
        let mut path = Vec::new();
        if let (Some(source), Some(target), true) =
            (source.clone(), target.clone(), highlight_path.unwrap_or(true))
        {
            let (_, outcome) =
                solve_off_thread(records.clone(), source, target, QueryOptions::default()).await;
            match outcome {
                Ok(found) => {
                    path = found.arc_indices();
                    message = Some(found.message());
                }
                Err(err) => message = Some(err.user_message().to_owned()),
            }
        }

        let elements = view::graph_elements(&records, source.as_ref(), target.as_ref(), &path);
        Ok(Json(GraphElementsResponse {
            rev,
            nodes: elements
                .nodes
                .into_iter()
                .map(|node| McpNodeElement {
                    id: node.id.into_string(),
                    role: node.role.as_str().to_owned(),
                })
                .collect(),
            arcs: elements
                .arcs
                .into_iter()
                .map(|arc| McpArcElement {
                    index: arc.index.get() as u64,
                    source: arc.source.into_string(),
                    target: arc.target.into_string(),
                    label: arc.label,
                    highlighted: arc.highlighted,
                })
                .collect(),
            message,
        }))
    }

    /// Find the minimum-weight path by solving a 0/1 arc-selection program; failures come back as
    /// `found: false` with `No path found` and a reason, never as a protocol error.
    #[tool(name = "path.find")]
    async fn path_find(
        &self,
        params: Parameters<PathFindParams>,
    ) -> Result<Json<PathFindResponse>, ErrorData> {
        let PathFindParams { source, target, backend, time_limit_ms, node_limit, close_terminals } =
            params.0;
        let source = parse_node("source", &source)?;
        let target = parse_node("target", &target)?;

        let mut options = QueryOptions::default();
        if let Some(backend) = backend.as_deref().filter(|value| !value.is_empty()) {
            options.backend = backend.parse::<Backend>().map_err(|err| {
                ErrorData::invalid_params(
                    err.to_string(),
                    Some(serde_json::json!({ "backend": backend })),
                )
            })?;
        }
        if let Some(time_limit_ms) = time_limit_ms {
            options.budget.time_limit = Some(Duration::from_millis(time_limit_ms));
        }
        if let Some(node_limit) = node_limit {
            options.budget.node_limit = Some(node_limit);
        }
        if let Some(close_terminals) = close_terminals {
            options.formulation = FormulationOptions { close_terminals };
        }

        let (rev, records) = {
            let document = self.document.lock().await;
            (document.rev(), document.records().to_vec())
        };
        let (backend, outcome) = solve_off_thread(records, source, target, options).await;
        Ok(Json(path_response(rev, backend, &outcome)))
    }

    async fn replace_records(&self, records: Vec<ArcRecord>) -> GraphReplaceResponse {
        let record_count = records.len() as u64;
        let arcs = records.iter().filter(|record| !record.is_declaration()).count() as u64;
        let rev = self.document.lock().await.replace_records(records);
        debug!(rev, records = record_count, "mcp: graph replaced");
        GraphReplaceResponse { rev, records: record_count, arcs }
    }
}

#[tool_handler]
impl ServerHandler for ArcrouteMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Arcroute shortest-path server (tools: graph.read, graph.add_node, graph.add_arc, graph.remove_nodes, graph.remove_arcs, graph.load_example, graph.import_csv, graph.export_csv, graph.elements, path.find)"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Snapshots `records` and runs the query on the blocking pool.
///
/// Every failure, including a graph that cannot be snapshotted, comes back as a `QueryError`.
async fn solve_off_thread(
    records: Vec<ArcRecord>,
    source: NodeId,
    target: NodeId,
    options: QueryOptions,
) -> (&'static str, Result<ShortestPath, QueryError>) {
    let backend = options.backend.as_str();
    let outcome = match GraphSnapshot::from_records(&records) {
        Ok(snapshot) => tokio::task::spawn_blocking(move || {
            find_shortest_path(&snapshot, &source, &target, &options)
        })
        .await
        .unwrap_or_else(|err| {
            Err(QueryError::SolverUnavailable {
                backend,
                reason: format!("solver task failed: {err}"),
            })
        }),
        Err(err) => Err(QueryError::from(err)),
    };
    if let Err(err) = &outcome {
        warn!(kind = err.kind(), reason = %err, "mcp: path.find failed");
    }
    (backend, outcome)
}

fn path_response(
    rev: u64,
    backend: &'static str,
    outcome: &Result<ShortestPath, QueryError>,
) -> PathFindResponse {
    match outcome {
        Ok(found) => PathFindResponse {
            rev,
            found: true,
            message: found.message(),
            arcs: found
                .path()
                .arcs()
                .iter()
                .map(|arc| McpPathArc {
                    index: arc.index.get() as u64,
                    source: arc.source.as_str().to_owned(),
                    target: arc.target.as_str().to_owned(),
                    weight: arc.weight,
                })
                .collect(),
            total_weight: Some(found.total_weight()),
            status: Some(found.status().as_str().to_owned()),
            backend: found.backend().to_owned(),
            kind: None,
            reason: None,
        },
        Err(err) => PathFindResponse {
            rev,
            found: false,
            message: err.user_message().to_owned(),
            arcs: Vec::new(),
            total_weight: None,
            status: None,
            backend: backend.to_owned(),
            kind: Some(err.kind().to_owned()),
            reason: Some(err.to_string()),
        },
    }
}

fn parse_node(field: &str, value: &str) -> Result<NodeId, ErrorData> {
    NodeId::new(value).map_err(|err| {
        ErrorData::invalid_params(
            format!("invalid {field}: {err}"),
            Some(serde_json::json!({ "field": field, "value": value })),
        )
    })
}

fn record_to_mcp(record: &ArcRecord) -> McpArcRecord {
    McpArcRecord {
        source: record.source().as_str().to_owned(),
        target: record.target().map(|target| target.as_str().to_owned()),
        weight: record.weight(),
    }
}

fn edit_response(result: EditResult) -> GraphEditResponse {
    GraphEditResponse {
        new_rev: result.new_rev,
        applied: result.applied as u64,
        added_nodes: result.delta.added_nodes.into_iter().map(NodeId::into_string).collect(),
        added_arcs: result.delta.added_arcs.iter().map(ToString::to_string).collect(),
        removed_records: result.delta.removed_records as u64,
    }
}

fn map_edit_error(err: EditError) -> ErrorData {
    match err {
        EditError::Conflict { base_rev, current_rev } => ErrorData::invalid_request(
            "conflict: stale base_rev",
            Some(serde_json::json!({ "base_rev": base_rev, "current_rev": current_rev })),
        ),
        EditError::NonFiniteWeight { arc, weight } => ErrorData::invalid_params(
            "arc weight must be finite",
            Some(serde_json::json!({ "arc": arc.to_string(), "weight": weight.to_string() })),
        ),
        EditError::NodeNotFound { node, suggestion } => ErrorData::resource_not_found(
            "node not found",
            Some(serde_json::json!({
                "node": node.as_str(),
                "suggestion": suggestion.as_ref().map(NodeId::as_str),
            })),
        ),
        EditError::ArcNotFound { arc } => ErrorData::resource_not_found(
            "arc not found",
            Some(serde_json::json!({ "arc": arc.to_string() })),
        ),
    }
}

#[cfg(test)]
mod tests;
