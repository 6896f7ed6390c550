// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pluggable backends for `BinaryProgram`s.
//!
//! Every backend implements `Solver` and reports the same `SolverResult` shape, so the model
//! builder and path extractor never know which paradigm produced an assignment. `Backend` is the
//! only place the concrete variants are named.

mod cp;
mod mip;
mod simplex;


use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::formulation::BinaryProgram;
use crate::model::ArcIndex;

pub use cp::ConstraintProgrammingBackend;
pub use mip::MixedIntegerBackend;

/// Common interface for exact 0/1 program backends.
pub trait Solver: Send + Sync {
    /// Minimise the program's objective within `budget`.
    ///
    /// Running out of budget is not an error: it yields `Feasible` when an incumbent exists and
    /// `Unknown` otherwise. Errors are reserved for backend breakdowns.
    fn solve(
        &self,
        program: &BinaryProgram,
        budget: &SolveBudget,
    ) -> Result<SolverResult, SolverError>;

    /// Backend name for logging and responses.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    /// Budget ran out while holding an incumbent; callers treat it like `Optimal`.
    Feasible,
    Infeasible,
    /// Budget ran out before any feasible assignment was found.
    Unknown,
}

impl SolveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Optimal => "optimal",
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
            Self::Unknown => "unknown",
        }
    }

    pub fn has_solution(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-arc selection flags returned by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    selected: Vec<bool>,
}

impl Assignment {
    /// Maps per-variable values back onto the arcs the variables select.
    pub fn from_program_values(program: &BinaryProgram, values: &[bool]) -> Self {
        let arc_count =
            program.variables().iter().map(|var| var.arc().get() + 1).max().unwrap_or(0);
        let mut selected = vec![false; arc_count];
        for (var, value) in program.variables().iter().zip(values) {
            if *value {
                selected[var.arc().get()] = true;
            }
        }
        Self { selected }
    }

    pub fn from_selected_arcs(arc_count: usize, arcs: impl IntoIterator<Item = ArcIndex>) -> Self {
        let mut selected = vec![false; arc_count];
        for arc in arcs {
            if let Some(slot) = selected.get_mut(arc.get()) {
                *slot = true;
            }
        }
        Self { selected }
    }

    pub fn is_selected(&self, arc: ArcIndex) -> bool {
        self.selected.get(arc.get()).copied().unwrap_or(false)
    }

    pub fn selected_arcs(&self) -> impl Iterator<Item = ArcIndex> + '_ {
        self.selected
            .iter()
            .enumerate()
            .filter(|(_, selected)| **selected)
            .map(|(position, _)| ArcIndex::new(position))
    }

    pub fn selected_count(&self) -> usize {
        self.selected.iter().filter(|selected| **selected).count()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    pub status: SolveStatus,
    pub assignment: Option<Assignment>,
    pub objective_value: Option<f64>,
    /// Search nodes visited (branch-and-bound nodes or search-tree nodes).
    pub explored_nodes: u64,
}

impl SolverResult {
    pub(crate) fn with_solution(
        program: &BinaryProgram,
        status: SolveStatus,
        values: &[bool],
        explored_nodes: u64,
    ) -> Self {
        Self {
            status,
            assignment: Some(Assignment::from_program_values(program, values)),
            objective_value: Some(program.evaluate(values)),
            explored_nodes,
        }
    }

    pub(crate) fn without_solution(status: SolveStatus, explored_nodes: u64) -> Self {
        Self { status, assignment: None, objective_value: None, explored_nodes }
    }

    /// Builds the result for a finished or interrupted search.
    pub(crate) fn from_search(
        program: &BinaryProgram,
        incumbent: Option<Vec<bool>>,
        exhausted: bool,
        explored_nodes: u64,
    ) -> Self {
        match (incumbent, exhausted) {
            (Some(values), false) => {
                Self::with_solution(program, SolveStatus::Optimal, &values, explored_nodes)
            }
            (Some(values), true) => {
                Self::with_solution(program, SolveStatus::Feasible, &values, explored_nodes)
            }
            (None, false) => Self::without_solution(SolveStatus::Infeasible, explored_nodes),
            (None, true) => Self::without_solution(SolveStatus::Unknown, explored_nodes),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    IterationLimit { iterations: u64 },
    Numerical { detail: String },
    UnsupportedCoefficient { constraint: String, coefficient: f64 },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IterationLimit { iterations } => {
                write!(f, "simplex iteration limit reached after {iterations} pivots")
            }
            Self::Numerical { detail } => write!(f, "numerical failure: {detail}"),
            Self::UnsupportedCoefficient { constraint, coefficient } => write!(
                f,
                "constraint {constraint} has non-integral coefficient {coefficient}"
            ),
        }
    }
}

impl std::error::Error for SolverError {}

/// Limits for one solve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolveBudget {
    pub time_limit: Option<Duration>,
    pub node_limit: Option<u64>,
}

impl SolveBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    pub fn with_node_limit(mut self, node_limit: u64) -> Self {
        self.node_limit = Some(node_limit);
        self
    }

    pub(crate) fn start(&self) -> BudgetClock {
        BudgetClock {
            deadline: self.time_limit.map(|limit| Instant::now() + limit),
            node_limit: self.node_limit,
            nodes: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct BudgetClock {
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    nodes: u64,
}

impl BudgetClock {
    /// Accounts for one more search node; returns `false` once the budget is spent.
    pub(crate) fn tick(&mut self) -> bool {
        if self.node_limit.is_some_and(|limit| self.nodes >= limit) || self.expired() {
            return false;
        }
        self.nodes += 1;
        true
    }

    pub(crate) fn expired(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }

    pub(crate) fn nodes(&self) -> u64 {
        self.nodes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// LP relaxation plus branch-and-bound.
    #[default]
    MixedInteger,
    /// Propagation plus depth-first search.
    ConstraintProgramming,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Self::MixedInteger, Self::ConstraintProgramming];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MixedInteger => "mip",
            Self::ConstraintProgramming => "cp",
        }
    }

    pub fn solver(self) -> Box<dyn Solver> {
        match self {
            Self::MixedInteger => Box::new(MixedIntegerBackend::default()),
            Self::ConstraintProgramming => Box::new(ConstraintProgrammingBackend),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBackendError {
    value: String,
}

impl fmt::Display for ParseBackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown backend `{}` (expected mip|cp)", self.value)
    }
}

impl std::error::Error for ParseBackendError {}

impl FromStr for Backend {
    type Err = ParseBackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mip" | "milp" | "mixed-integer" => Ok(Self::MixedInteger),
            "cp" | "cp-sat" | "constraint" => Ok(Self::ConstraintProgramming),
            _ => Err(ParseBackendError { value: s.to_owned() }),
        }
    }
}
