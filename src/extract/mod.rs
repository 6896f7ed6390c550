// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Recovers an ordered path from a solver assignment.
//!
//! The walk starts at the source and follows the unique selected arc leaving the current node.
//! Anything that does not decompose into exactly one source-to-target walk is an error; selected
//! arcs are never silently dropped.

use std::fmt;

use crate::model::{ArcIndex, GraphSnapshot, NodeId};
use crate::solver::Assignment;

const OBJECTIVE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct PathArc {
    pub index: ArcIndex,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    arcs: Vec<PathArc>,
    total_weight: f64,
}

impl Path {
    /// The path from a node to itself.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn arcs(&self) -> &[PathArc] {
        &self.arcs
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    pub fn arc_indices(&self) -> impl Iterator<Item = ArcIndex> + '_ {
        self.arcs.iter().map(|arc| arc.index)
    }

    /// Visited nodes in order, including both endpoints. Empty for the empty path.
    pub fn node_sequence(&self) -> Vec<&NodeId> {
        let mut nodes = Vec::with_capacity(self.arcs.len() + 1);
        if let Some(first) = self.arcs.first() {
            nodes.push(&first.source);
        }
        nodes.extend(self.arcs.iter().map(|arc| &arc.target));
        nodes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionError {
    /// The walk reached a node with zero or several selected outgoing arcs.
    AmbiguousOrDeadEnd { node: NodeId, candidates: usize },
    /// The walk used up every selected arc without arriving at the target.
    CycleWithoutReachingTarget { steps: usize },
    /// Selected arcs that the source-to-target walk never used.
    StrayArcs { count: usize },
    ObjectiveMismatch { path_weight: f64, objective: f64 },
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousOrDeadEnd { node, candidates: 0 } => {
                write!(f, "walk stopped at `{node}`: no selected outgoing arc")
            }
            Self::AmbiguousOrDeadEnd { node, candidates } => {
                write!(f, "walk stopped at `{node}`: {candidates} selected outgoing arcs")
            }
            Self::CycleWithoutReachingTarget { steps } => {
                write!(f, "walk cycled for {steps} steps without reaching the target")
            }
            Self::StrayArcs { count } => {
                write!(f, "{count} selected arc(s) are not on the source-to-target walk")
            }
            Self::ObjectiveMismatch { path_weight, objective } => write!(
                f,
                "path weight {path_weight} does not match solver objective {objective}"
            ),
        }
    }
}

impl std::error::Error for ExtractionError {}

pub fn extract(
    snapshot: &GraphSnapshot,
    source: &NodeId,
    target: &NodeId,
    assignment: &Assignment,
) -> Result<Path, ExtractionError> {
    let selected_count = assignment.selected_count();
    let mut arcs = Vec::new();
    let mut current = source;

    while current != target {
        if arcs.len() >= selected_count {
            return Err(ExtractionError::CycleWithoutReachingTarget { steps: arcs.len() });
        }

        let mut candidates = snapshot
            .outgoing(current)
            .iter()
            .copied()
            .filter(|index| assignment.is_selected(*index));
        let (Some(index), None) = (candidates.next(), candidates.next()) else {
            let candidates = snapshot
                .outgoing(current)
                .iter()
                .filter(|index| assignment.is_selected(**index))
                .count();
            return Err(ExtractionError::AmbiguousOrDeadEnd {
                node: current.clone(),
                candidates,
            });
        };
        let Some(arc) = snapshot.arc(index) else {
            return Err(ExtractionError::AmbiguousOrDeadEnd {
                node: current.clone(),
                candidates: 0,
            });
        };

        arcs.push(PathArc {
            index,
            source: arc.source().clone(),
            target: arc.target().clone(),
            weight: arc.weight(),
        });
        current = arc.target();
    }

    if arcs.len() < selected_count {
        return Err(ExtractionError::StrayArcs { count: selected_count - arcs.len() });
    }

    let total_weight = arcs.iter().map(|arc| arc.weight).sum();
    Ok(Path { arcs, total_weight })
}

/// Checks the extracted weight against the solver objective (relative tolerance `1e-6`).
pub fn verify_objective(path: &Path, objective: f64) -> Result<(), ExtractionError> {
    let path_weight = path.total_weight();
    let scale = path_weight.abs().max(objective.abs()).max(1.0);
    if (path_weight - objective).abs() <= OBJECTIVE_TOLERANCE * scale {
        Ok(())
    } else {
        Err(ExtractionError::ObjectiveMismatch { path_weight, objective })
    }
}
