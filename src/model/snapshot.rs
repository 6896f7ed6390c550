// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;
use std::fmt;

use smallvec::SmallVec;

use super::arc::{ArcRecord, DirectedArc};
use super::ids::{ArcIndex, NodeId};

/// Arc indices incident to one node; most editor graphs have low degree.
pub type IncidentArcs = SmallVec<[ArcIndex; 4]>;

#[derive(Debug, Clone, Default)]
struct Incidence {
    outgoing: IncidentArcs,
    incoming: IncidentArcs,
}

/// Immutable view of the arc set a single query runs against.
///
/// Arcs live in an arena and are addressed by `ArcIndex`, so parallel arcs between the same
/// ordered pair stay distinct. The node set is exactly the set of arc endpoints.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    arcs: Vec<DirectedArc>,
    incidence: BTreeMap<NodeId, Incidence>,
}

impl GraphSnapshot {
    pub fn from_arcs(arcs: Vec<DirectedArc>) -> Result<Self, SnapshotError> {
        let mut incidence: BTreeMap<NodeId, Incidence> = BTreeMap::new();
        for (position, arc) in arcs.iter().enumerate() {
            if !arc.weight().is_finite() {
                return Err(SnapshotError::NonFiniteWeight {
                    record: position,
                    weight: arc.weight(),
                });
            }
            let index = ArcIndex::new(position);
            incidence.entry(arc.source().clone()).or_default().outgoing.push(index);
            incidence.entry(arc.target().clone()).or_default().incoming.push(index);
        }
        Ok(Self { arcs, incidence })
    }

    /// Builds a snapshot from editor records, skipping node declarations.
    pub fn from_records(records: &[ArcRecord]) -> Result<Self, SnapshotError> {
        let mut arcs = Vec::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            let Some(target) = record.target() else {
                continue;
            };
            let weight = record.weight().ok_or_else(|| SnapshotError::MissingWeight {
                record: position,
                source: record.source().clone(),
                target: target.clone(),
            })?;
            if !weight.is_finite() {
                return Err(SnapshotError::NonFiniteWeight { record: position, weight });
            }
            arcs.push(DirectedArc::new(record.source().clone(), target.clone(), weight));
        }
        Self::from_arcs(arcs)
    }

    pub fn arcs(&self) -> &[DirectedArc] {
        &self.arcs
    }

    pub fn arc(&self, index: ArcIndex) -> Option<&DirectedArc> {
        self.arcs.get(index.get())
    }

    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    pub fn indexed_arcs(&self) -> impl Iterator<Item = (ArcIndex, &DirectedArc)> + '_ {
        self.arcs.iter().enumerate().map(|(position, arc)| (ArcIndex::new(position), arc))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeId> + '_ {
        self.incidence.keys()
    }

    pub fn node_count(&self) -> usize {
        self.incidence.len()
    }

    pub fn contains_node(&self, node: &NodeId) -> bool {
        self.incidence.contains_key(node)
    }

    pub fn outgoing(&self, node: &NodeId) -> &[ArcIndex] {
        self.incidence.get(node).map(|entry| entry.outgoing.as_slice()).unwrap_or(&[])
    }

    pub fn incoming(&self, node: &NodeId) -> &[ArcIndex] {
        self.incidence.get(node).map(|entry| entry.incoming.as_slice()).unwrap_or(&[])
    }

    pub fn total_weight(&self, arcs: &[ArcIndex]) -> f64 {
        arcs.iter().filter_map(|index| self.arc(*index)).map(DirectedArc::weight).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotError {
    MissingWeight {
        record: usize,
        source: NodeId,
        target: NodeId,
    },
    NonFiniteWeight {
        record: usize,
        weight: f64,
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingWeight { record, source, target } => {
                write!(f, "record {record} ({source}->{target}) has no weight")
            }
            Self::NonFiniteWeight { record, weight } => {
                write!(f, "record {record} has a non-finite weight ({weight})")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

#[cfg(test)]
mod tests {
    use super::{GraphSnapshot, SnapshotError};
    use crate::model::{ArcIndex, ArcRecord, NodeId};

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    #[test]
    fn declarations_are_not_nodes() {
        let records = vec![
            ArcRecord::declared_node(nid("lonely")),
            ArcRecord::arc(nid("A"), nid("B"), 4.0),
        ];
        let snapshot = GraphSnapshot::from_records(&records).expect("snapshot");

        assert_eq!(snapshot.arc_count(), 1);
        assert!(!snapshot.contains_node(&nid("lonely")));
        assert_eq!(snapshot.nodes().map(NodeId::as_str).collect::<Vec<_>>(), vec!["A", "B"]);
    }

    #[test]
    fn parallel_arcs_keep_separate_indices() {
        let records = vec![
            ArcRecord::arc(nid("A"), nid("B"), 10.0),
            ArcRecord::arc(nid("A"), nid("B"), 3.0),
        ];
        let snapshot = GraphSnapshot::from_records(&records).expect("snapshot");

        assert_eq!(snapshot.outgoing(&nid("A")), &[ArcIndex::new(0), ArcIndex::new(1)]);
        assert_eq!(snapshot.incoming(&nid("B")), &[ArcIndex::new(0), ArcIndex::new(1)]);
        assert!(snapshot.incoming(&nid("A")).is_empty());
    }

    #[test]
    fn self_loops_are_accepted() {
        let records = vec![ArcRecord::arc(nid("A"), nid("A"), 1.0)];
        let snapshot = GraphSnapshot::from_records(&records).expect("snapshot");
        assert!(snapshot.arcs()[0].is_self_loop());
        assert_eq!(snapshot.outgoing(&nid("A")), snapshot.incoming(&nid("A")));
    }

    #[test]
    fn rejects_connected_record_without_weight() {
        let records = vec![ArcRecord::new(nid("A"), Some(nid("B")), None)];
        let err = GraphSnapshot::from_records(&records).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingWeight { record: 0, .. }));
    }

    #[test]
    fn rejects_non_finite_weight() {
        let records = vec![ArcRecord::arc(nid("A"), nid("B"), f64::NAN)];
        let err = GraphSnapshot::from_records(&records).unwrap_err();
        assert!(matches!(err, SnapshotError::NonFiniteWeight { record: 0, .. }));
    }
}
