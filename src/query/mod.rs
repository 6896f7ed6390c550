// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shortest-path query facade.
//!
//! `find_shortest_path` runs build, solve and extract on one snapshot and folds every failure
//! into a single `QueryError`. A failed query never yields a partial path.

use std::fmt;
use std::time::Duration;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::extract::{self, ExtractionError, Path};
use crate::formulation::{self, BuildError, FormulationOptions, Terminal};
use crate::model::{ArcIndex, GraphSnapshot, NodeId, SnapshotError};
use crate::solver::{Backend, SolveBudget, SolveStatus, Solver};


/// Uniform user-facing text for every failed query.
pub const NO_PATH_FOUND: &str = "No path found";

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(10);

const SUGGESTION_MIN_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryOptions {
    pub backend: Backend,
    pub budget: SolveBudget,
    pub formulation: FormulationOptions,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            budget: SolveBudget::unlimited().with_time_limit(DEFAULT_TIME_LIMIT),
            formulation: FormulationOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPath {
    path: Path,
    status: SolveStatus,
    backend: &'static str,
    explored_nodes: u64,
}

impl ShortestPath {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn total_weight(&self) -> f64 {
        self.path.total_weight()
    }

    /// `Optimal`, or `Feasible` when the budget ran out holding an incumbent.
    pub fn status(&self) -> SolveStatus {
        self.status
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn explored_nodes(&self) -> u64 {
        self.explored_nodes
    }

    pub fn arc_indices(&self) -> Vec<ArcIndex> {
        self.path.arc_indices().collect()
    }

    pub fn pairs(&self) -> Vec<(&NodeId, &NodeId)> {
        self.path.arcs().iter().map(|arc| (&arc.source, &arc.target)).collect()
    }

    /// `Shortest Path: [('A', 'P2'), ('P2', 'P3')], Total Weight: 15`
    pub fn message(&self) -> String {
        let pairs = self
            .pairs()
            .into_iter()
            .map(|(source, target)| format!("('{source}', '{target}')"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Shortest Path: [{pairs}], Total Weight: {}", self.total_weight())
    }
}

impl fmt::Display for ShortestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The records could not be turned into a snapshot.
    InvalidGraph(SnapshotError),
    MalformedQuery { role: Terminal, node: NodeId, suggestion: Option<NodeId> },
    NegativeWeight { arc: ArcIndex, source: NodeId, target: NodeId, weight: f64 },
    Infeasible,
    SolverUnavailable { backend: &'static str, reason: String },
    ExtractionInconsistency(ExtractionError),
}

impl QueryError {
    /// What the end user sees, whatever the kind.
    pub fn user_message(&self) -> &'static str {
        NO_PATH_FOUND
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidGraph(_) => "invalid_graph",
            Self::MalformedQuery { .. } => "malformed_query",
            Self::NegativeWeight { .. } => "negative_weight",
            Self::Infeasible => "infeasible",
            Self::SolverUnavailable { .. } => "solver_unavailable",
            Self::ExtractionInconsistency(_) => "extraction_inconsistency",
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGraph(err) => write!(f, "graph cannot be queried: {err}"),
            Self::MalformedQuery { role, node, suggestion: Some(suggestion) } => write!(
                f,
                "{role} node `{node}` is not an endpoint of any arc (did you mean `{suggestion}`?)"
            ),
            Self::MalformedQuery { role, node, suggestion: None } => {
                write!(f, "{role} node `{node}` is not an endpoint of any arc")
            }
            Self::NegativeWeight { arc, source, target, weight } => write!(
                f,
                "arc {arc} ({source}->{target}) has negative weight {weight}"
            ),
            Self::Infeasible => f.write_str("no selection of arcs connects source to target"),
            Self::SolverUnavailable { backend, reason } => {
                write!(f, "{backend} backend failed: {reason}")
            }
            Self::ExtractionInconsistency(err) => {
                write!(f, "solver assignment does not decode into a path: {err}")
            }
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGraph(source) => Some(source),
            Self::ExtractionInconsistency(source) => Some(source),
            _ => None,
        }
    }
}

impl From<SnapshotError> for QueryError {
    fn from(value: SnapshotError) -> Self {
        Self::InvalidGraph(value)
    }
}

impl From<ExtractionError> for QueryError {
    fn from(value: ExtractionError) -> Self {
        Self::ExtractionInconsistency(value)
    }
}

/// Closest known label to `missing`, if any is similar enough to be worth suggesting.
pub fn suggest_node<'a>(
    candidates: impl IntoIterator<Item = &'a NodeId>,
    missing: &str,
) -> Option<NodeId> {
    let needle = missing.to_lowercase();
    candidates
        .into_iter()
        .map(|candidate| {
            let haystack = candidate.as_str().to_lowercase();
            (candidate, rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars()))
        })
        .filter(|(_, ratio)| *ratio >= SUGGESTION_MIN_RATIO)
        .max_by(|(left, left_ratio), (right, right_ratio)| {
            left_ratio.total_cmp(right_ratio).then_with(|| right.cmp(left))
        })
        .map(|(candidate, _)| candidate.clone())
}

pub fn find_shortest_path(
    snapshot: &GraphSnapshot,
    source: &NodeId,
    target: &NodeId,
    options: &QueryOptions,
) -> Result<ShortestPath, QueryError> {
    let solver = options.backend.solver();
    find_shortest_path_with(
        solver.as_ref(),
        snapshot,
        source,
        target,
        &options.budget,
        options.formulation,
    )
}

/// Like `find_shortest_path`, with a caller-provided backend.
pub fn find_shortest_path_with(
    solver: &dyn Solver,
    snapshot: &GraphSnapshot,
    source: &NodeId,
    target: &NodeId,
    budget: &SolveBudget,
    shape: FormulationOptions,
) -> Result<ShortestPath, QueryError> {
    let backend = solver.name();
    let program = formulation::build_with(snapshot, source, target, shape).map_err(
        |err| match err {
            BuildError::UnknownNode { role, node } => {
                let suggestion = suggest_node(snapshot.nodes(), node.as_str());
                QueryError::MalformedQuery { role, node, suggestion }
            }
            BuildError::NegativeWeight { arc, source, target, weight } => {
                QueryError::NegativeWeight { arc, source, target, weight }
            }
        },
    )?;
    debug!(
        backend,
        %source,
        %target,
        variables = program.variable_count(),
        constraints = program.constraints().len(),
        "query: solving"
    );

    let result = solver.solve(&program, budget).map_err(|err| {
        warn!(backend, error = %err, "query: backend failure");
        QueryError::SolverUnavailable { backend, reason: err.to_string() }
    })?;
    debug!(backend, status = %result.status, nodes = result.explored_nodes, "query: solved");

    let (assignment, objective) = match (result.status, result.assignment, result.objective_value)
    {
        (SolveStatus::Infeasible, _, _) => return Err(QueryError::Infeasible),
        (SolveStatus::Unknown, _, _) => {
            return Err(QueryError::SolverUnavailable {
                backend,
                reason: "budget exhausted before any feasible assignment was found".to_owned(),
            })
        }
        (_, Some(assignment), Some(objective)) => (assignment, objective),
        (status, _, _) => {
            return Err(QueryError::SolverUnavailable {
                backend,
                reason: format!("status {status} carried no assignment"),
            })
        }
    };

    let path = extract::extract(snapshot, source, target, &assignment)
        .and_then(|path| extract::verify_objective(&path, objective).map(|()| path))
        .map_err(|err| {
            warn!(backend, error = %err, "query: inconsistent assignment");
            QueryError::from(err)
        })?;

    Ok(ShortestPath {
        path,
        status: result.status,
        backend,
        explored_nodes: result.explored_nodes,
    })
}

/// Runs independent queries over one snapshot in parallel; results keep the input order.
pub fn find_shortest_paths(
    snapshot: &GraphSnapshot,
    queries: &[(NodeId, NodeId)],
    options: &QueryOptions,
) -> Vec<Result<ShortestPath, QueryError>> {
    queries
        .par_iter()
        .map(|(source, target)| find_shortest_path(snapshot, source, target, options))
        .collect()
}
