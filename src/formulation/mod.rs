// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Shortest-path queries as 0/1 arc-selection programs.
//!
//! `build` turns a snapshot plus a `(source, target)` pair into a `BinaryProgram`: one binary
//! variable per arc, a linear minimisation objective over arc weights, and linear equality rows
//! (source egress, target ingress, flow conservation at every other node). Solvers only ever see
//! the program; they know nothing about graphs.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{ArcIndex, GraphSnapshot, NodeId};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Source,
    Target,
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormulationOptions {
    /// Forbid arcs entering the source and arcs leaving the target.
    ///
    /// Without these two rows a selection like `{s->a, a->s, t->b, b->t}` satisfies egress,
    /// ingress and conservation while encoding no path at all.
    pub close_terminals: bool,
}

impl Default for FormulationOptions {
    fn default() -> Self {
        Self { close_terminals: true }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    arc: ArcIndex,
    name: String,
}

impl Variable {
    pub fn arc(&self) -> ArcIndex {
        self.arc
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub var: usize,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    SourceEgress,
    TargetIngress,
    SourceIngressClosed,
    TargetEgressClosed,
    Conservation(NodeId),
}

/// `Σ coefficient * x[var] == rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    kind: ConstraintKind,
    terms: Vec<Term>,
    rhs: f64,
}

impl LinearConstraint {
    fn from_terms(kind: ConstraintKind, terms: impl IntoIterator<Item = Term>, rhs: f64) -> Self {
        let mut merged: BTreeMap<usize, f64> = BTreeMap::new();
        for term in terms {
            *merged.entry(term.var).or_default() += term.coefficient;
        }
        let terms = merged
            .into_iter()
            .filter(|(_, coefficient)| *coefficient != 0.0)
            .map(|(var, coefficient)| Term { var, coefficient })
            .collect();
        Self { kind, terms, rhs }
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn name(&self) -> String {
        match &self.kind {
            ConstraintKind::SourceEgress => "source_egress".to_owned(),
            ConstraintKind::TargetIngress => "target_ingress".to_owned(),
            ConstraintKind::SourceIngressClosed => "source_ingress_closed".to_owned(),
            ConstraintKind::TargetEgressClosed => "target_egress_closed".to_owned(),
            ConstraintKind::Conservation(node) => format!("conservation[{node}]"),
        }
    }

    pub fn lhs(&self, values: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|term| values.get(term.var).copied().unwrap_or(false))
            .map(|term| term.coefficient)
            .sum()
    }

    pub fn is_satisfied(&self, values: &[bool]) -> bool {
        (self.lhs(values) - self.rhs).abs() <= 1e-9
    }
}

/// A minimisation program over binary variables with linear equality constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryProgram {
    variables: Vec<Variable>,
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Objective coefficient per variable.
    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn constraint(&self, kind: &ConstraintKind) -> Option<&LinearConstraint> {
        self.constraints.iter().find(|constraint| constraint.kind() == kind)
    }

    pub fn evaluate(&self, values: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(values)
            .filter(|(_, selected)| **selected)
            .map(|(coefficient, _)| *coefficient)
            .sum()
    }

    pub fn is_feasible(&self, values: &[bool]) -> bool {
        values.len() == self.variables.len()
            && self.constraints.iter().all(|constraint| constraint.is_satisfied(values))
    }
}

#[cfg(test)]
impl BinaryProgram {
    /// A program over hand-written rows; variable `i` stands for `ArcIndex(i)`.
    pub(crate) fn from_rows(objective: &[f64], rows: &[(&str, &[(usize, f64)], f64)]) -> Self {
        let variables = (0..objective.len())
            .map(|index| Variable { arc: ArcIndex::new(index), name: format!("x[{index}]") })
            .collect();
        let constraints = rows
            .iter()
            .map(|(label, terms, rhs)| {
                let node = NodeId::new(*label).expect("row label");
                let terms = terms.iter().map(|(var, coefficient)| Term {
                    var: *var,
                    coefficient: *coefficient,
                });
                LinearConstraint::from_terms(ConstraintKind::Conservation(node), terms, *rhs)
            })
            .collect();
        Self { variables, objective: objective.to_vec(), constraints }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    UnknownNode { role: Terminal, node: NodeId },
    NegativeWeight { arc: ArcIndex, source: NodeId, target: NodeId, weight: f64 },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownNode { role, node } => {
                write!(f, "{role} node `{node}` is not an endpoint of any arc")
            }
            Self::NegativeWeight { arc, source, target, weight } => write!(
                f,
                "arc {arc} ({source}->{target}) has negative weight {weight} (weights must be >= 0)"
            ),
        }
    }
}

impl std::error::Error for BuildError {}

pub fn build(
    snapshot: &GraphSnapshot,
    source: &NodeId,
    target: &NodeId,
) -> Result<BinaryProgram, BuildError> {
    build_with(snapshot, source, target, FormulationOptions::default())
}

pub fn build_with(
    snapshot: &GraphSnapshot,
    source: &NodeId,
    target: &NodeId,
    options: FormulationOptions,
) -> Result<BinaryProgram, BuildError> {
    if !snapshot.contains_node(source) {
        return Err(BuildError::UnknownNode { role: Terminal::Source, node: source.clone() });
    }
    if !snapshot.contains_node(target) {
        return Err(BuildError::UnknownNode { role: Terminal::Target, node: target.clone() });
    }

    let mut variables = Vec::with_capacity(snapshot.arc_count());
    let mut objective = Vec::with_capacity(snapshot.arc_count());
    for (index, arc) in snapshot.indexed_arcs() {
        if arc.weight() < 0.0 {
            return Err(BuildError::NegativeWeight {
                arc: index,
                source: arc.source().clone(),
                target: arc.target().clone(),
                weight: arc.weight(),
            });
        }
        variables.push(Variable {
            arc: index,
            name: format!("x[{}{}]", arc.label(), index),
        });
        objective.push(arc.weight());
    }

    // Variables are laid out in arena order, so variable `i` selects `ArcIndex(i)`.
    let select = |arcs: &[ArcIndex], coefficient: f64| {
        arcs.iter()
            .map(move |arc| Term { var: arc.get(), coefficient })
            .collect::<Vec<_>>()
    };

    let mut constraints = Vec::new();
    if source == target {
        // Circulation program: the cheapest balanced selection is the empty one.
        for node in snapshot.nodes() {
            let mut terms = select(snapshot.incoming(node), 1.0);
            terms.extend(select(snapshot.outgoing(node), -1.0));
            constraints.push(LinearConstraint::from_terms(
                ConstraintKind::Conservation(node.clone()),
                terms,
                0.0,
            ));
        }
    } else {
        constraints.push(LinearConstraint::from_terms(
            ConstraintKind::SourceEgress,
            select(snapshot.outgoing(source), 1.0),
            1.0,
        ));
        constraints.push(LinearConstraint::from_terms(
            ConstraintKind::TargetIngress,
            select(snapshot.incoming(target), 1.0),
            1.0,
        ));
        if options.close_terminals {
            constraints.push(LinearConstraint::from_terms(
                ConstraintKind::SourceIngressClosed,
                select(snapshot.incoming(source), 1.0),
                0.0,
            ));
            constraints.push(LinearConstraint::from_terms(
                ConstraintKind::TargetEgressClosed,
                select(snapshot.outgoing(target), 1.0),
                0.0,
            ));
        }
        for node in snapshot.nodes().filter(|node| *node != source && *node != target) {
            let mut terms = select(snapshot.incoming(node), 1.0);
            terms.extend(select(snapshot.outgoing(node), -1.0));
            constraints.push(LinearConstraint::from_terms(
                ConstraintKind::Conservation(node.clone()),
                terms,
                0.0,
            ));
        }
    }

    Ok(BinaryProgram { variables, objective, constraints })
}
