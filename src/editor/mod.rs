// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editable graph document.
//!
//! The document is an ordered list of `ArcRecord`s plus a revision counter. Edits are applied as
//! batches with optimistic concurrency: a batch names the revision it was prepared against, is
//! applied to a copy, and only replaces the records when every op succeeded.

use std::collections::BTreeSet;
use std::fmt;

use crate::model::{ArcLabel, ArcRecord, GraphSnapshot, NodeId, SnapshotError};
use crate::query::suggest_node;

#[derive(Debug, Clone, PartialEq)]
pub enum EditOp {
    AddNode { node: NodeId },
    AddArc { source: NodeId, target: NodeId, weight: f64 },
    /// Drops every record touching any listed node.
    RemoveNodes { nodes: Vec<NodeId> },
    /// Drops every arc record matching any listed label, parallel arcs included.
    RemoveArcs { arcs: Vec<ArcLabel> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditDelta {
    pub added_nodes: Vec<NodeId>,
    pub added_arcs: Vec<ArcLabel>,
    pub removed_records: usize,
}

impl EditDelta {
    pub fn is_empty(&self) -> bool {
        self.added_nodes.is_empty() && self.added_arcs.is_empty() && self.removed_records == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: EditDelta,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    Conflict { base_rev: u64, current_rev: u64 },
    NonFiniteWeight { arc: ArcLabel, weight: f64 },
    NodeNotFound { node: NodeId, suggestion: Option<NodeId> },
    ArcNotFound { arc: ArcLabel },
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { base_rev, current_rev } => {
                write!(f, "stale base_rev (base_rev={base_rev}, current_rev={current_rev})")
            }
            Self::NonFiniteWeight { arc, weight } => {
                write!(f, "arc {arc} has non-finite weight {weight}")
            }
            Self::NodeNotFound { node, suggestion: Some(suggestion) } => {
                write!(f, "node not found (id={node}); did you mean {suggestion}?")
            }
            Self::NodeNotFound { node, suggestion: None } => {
                write!(f, "node not found (id={node})")
            }
            Self::ArcNotFound { arc } => write!(f, "arc not found ({arc})"),
        }
    }
}

impl std::error::Error for EditError {}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphDocument {
    records: Vec<ArcRecord>,
    rev: u64,
}

impl GraphDocument {
    pub fn new(records: Vec<ArcRecord>) -> Self {
        Self { records, rev: 0 }
    }

    pub fn records(&self) -> &[ArcRecord] {
        &self.records
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// Every label mentioned by any record, sorted.
    pub fn nodes(&self) -> Vec<NodeId> {
        node_set(&self.records).into_iter().collect()
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.records.iter().any(|record| record.touches(node))
    }

    /// `source->target` labels of the arc records, in record order.
    pub fn arc_labels(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| {
                record.target().map(|target| {
                    ArcLabel::new(record.source().clone(), target.clone()).to_string()
                })
            })
            .collect()
    }

    pub fn arc_count(&self) -> usize {
        self.records.iter().filter(|record| !record.is_declaration()).count()
    }

    /// Copies the current arcs into an immutable snapshot for one query.
    pub fn snapshot(&self) -> Result<GraphSnapshot, SnapshotError> {
        GraphSnapshot::from_records(&self.records)
    }

    /// Replaces the whole record list (example load, CSV import) and bumps the revision.
    pub fn replace_records(&mut self, records: Vec<ArcRecord>) -> u64 {
        self.records = records;
        self.rev += 1;
        self.rev
    }

    pub fn apply(&mut self, base_rev: u64, ops: &[EditOp]) -> Result<EditResult, EditError> {
        if base_rev != self.rev {
            return Err(EditError::Conflict { base_rev, current_rev: self.rev });
        }

        let mut records = self.records.clone();
        let mut delta = EditDelta::default();
        for op in ops {
            apply_op(&mut records, op, &mut delta)?;
        }

        if !delta.is_empty() {
            self.records = records;
            self.rev += 1;
        }
        Ok(EditResult { new_rev: self.rev, applied: ops.len(), delta })
    }

    pub fn add_node(&mut self, node: NodeId) -> Result<EditResult, EditError> {
        self.apply(self.rev, &[EditOp::AddNode { node }])
    }

    pub fn add_arc(
        &mut self,
        source: NodeId,
        target: NodeId,
        weight: f64,
    ) -> Result<EditResult, EditError> {
        self.apply(self.rev, &[EditOp::AddArc { source, target, weight }])
    }

    pub fn remove_nodes(&mut self, nodes: Vec<NodeId>) -> Result<EditResult, EditError> {
        self.apply(self.rev, &[EditOp::RemoveNodes { nodes }])
    }

    pub fn remove_arcs(&mut self, arcs: Vec<ArcLabel>) -> Result<EditResult, EditError> {
        self.apply(self.rev, &[EditOp::RemoveArcs { arcs }])
    }
}

fn node_set(records: &[ArcRecord]) -> BTreeSet<NodeId> {
    let mut nodes = BTreeSet::new();
    for record in records {
        nodes.insert(record.source().clone());
        if let Some(target) = record.target() {
            nodes.insert(target.clone());
        }
    }
    nodes
}

fn apply_op(
    records: &mut Vec<ArcRecord>,
    op: &EditOp,
    delta: &mut EditDelta,
) -> Result<(), EditError> {
    match op {
        EditOp::AddNode { node } => {
            if !records.iter().any(|record| record.touches(node)) {
                records.push(ArcRecord::declared_node(node.clone()));
                delta.added_nodes.push(node.clone());
            }
            Ok(())
        }
        EditOp::AddArc { source, target, weight } => {
            let label = ArcLabel::new(source.clone(), target.clone());
            if !weight.is_finite() {
                return Err(EditError::NonFiniteWeight { arc: label, weight: *weight });
            }
            records.push(ArcRecord::arc(source.clone(), target.clone(), *weight));
            delta.added_arcs.push(label);
            Ok(())
        }
        EditOp::RemoveNodes { nodes } => {
            for node in nodes {
                if !records.iter().any(|record| record.touches(node)) {
                    let known = node_set(records);
                    return Err(EditError::NodeNotFound {
                        node: node.clone(),
                        suggestion: suggest_node(&known, node.as_str()),
                    });
                }
            }
            let before = records.len();
            records.retain(|record| !nodes.iter().any(|node| record.touches(node)));
            delta.removed_records += before - records.len();
            Ok(())
        }
        EditOp::RemoveArcs { arcs } => {
            for arc in arcs {
                if !records.iter().any(|record| arc.matches(record)) {
                    return Err(EditError::ArcNotFound { arc: arc.clone() });
                }
            }
            let before = records.len();
            records.retain(|record| !arcs.iter().any(|arc| arc.matches(record)));
            delta.removed_records += before - records.len();
            Ok(())
        }
    }
}
