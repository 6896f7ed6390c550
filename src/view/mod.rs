// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Display elements for a graph view.
//!
//! Nodes are tagged with their role in the current query and arcs carry their weight as a label.
//! Highlighting goes by arc index, so of several parallel arcs only the one on the path lights up.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::model::{ArcIndex, ArcRecord, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Source,
    Target,
    Normal,
}

impl NodeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeElement {
    pub id: NodeId,
    pub role: NodeRole,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArcElement {
    pub index: ArcIndex,
    pub source: NodeId,
    pub target: NodeId,
    pub label: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphElements {
    pub nodes: Vec<NodeElement>,
    pub arcs: Vec<ArcElement>,
}

impl GraphElements {
    pub fn highlighted_arcs(&self) -> impl Iterator<Item = &ArcElement> + '_ {
        self.arcs.iter().filter(|arc| arc.highlighted)
    }
}

/// Builds view elements for `records`.
///
/// `path` holds snapshot arc indices, which count arc records in order and skip declarations.
/// Declared nodes appear as nodes without arcs.
pub fn graph_elements(
    records: &[ArcRecord],
    source: Option<&NodeId>,
    target: Option<&NodeId>,
    path: &[ArcIndex],
) -> GraphElements {
    let on_path = path.iter().copied().collect::<HashSet<_>>();
    let mut labels = BTreeSet::new();
    let mut arcs = Vec::new();

    for record in records {
        labels.insert(record.source().clone());
        let (Some(arc_target), Some(weight)) = (record.target(), record.weight()) else {
            continue;
        };
        labels.insert(arc_target.clone());
        let index = ArcIndex::new(arcs.len());
        arcs.push(ArcElement {
            index,
            source: record.source().clone(),
            target: arc_target.clone(),
            label: weight.to_string(),
            highlighted: on_path.contains(&index),
        });
    }

    let nodes = labels
        .into_iter()
        .map(|id| {
            let role = if Some(&id) == source {
                NodeRole::Source
            } else if Some(&id) == target {
                NodeRole::Target
            } else {
                NodeRole::Normal
            };
            NodeElement { id, role }
        })
        .collect();

    GraphElements { nodes, arcs }
}

#[cfg(test)]
mod tests {
    use super::{graph_elements, NodeRole};
    use crate::model::{ArcIndex, ExampleGraph, NodeId};

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    #[test]
    fn tags_roles_and_labels_weights() {
        let records = ExampleGraph::Route.records();
        let (a, b) = (nid("A"), nid("B"));
        let elements = graph_elements(&records, Some(&a), Some(&b), &[]);

        let roles = elements
            .nodes
            .iter()
            .map(|node| (node.id.as_str(), node.role))
            .collect::<Vec<_>>();
        assert_eq!(
            roles,
            vec![
                ("A", NodeRole::Source),
                ("B", NodeRole::Target),
                ("P1", NodeRole::Normal),
                ("P2", NodeRole::Normal),
                ("P3", NodeRole::Normal),
            ]
        );
        assert_eq!(elements.arcs.len(), 7);
        assert_eq!(elements.arcs[4].label, "30");
        assert_eq!(elements.highlighted_arcs().count(), 0);
    }

    #[test]
    fn highlights_only_the_chosen_parallel_arc() {
        let records = ExampleGraph::Parallel.records();
        let path = [ArcIndex::new(1), ArcIndex::new(2)];
        let elements = graph_elements(&records, None, None, &path);

        let lit = elements.highlighted_arcs().map(|arc| arc.index.get()).collect::<Vec<_>>();
        assert_eq!(lit, vec![1, 2]);
        assert!(!elements.arcs[0].highlighted);
        assert!(elements.nodes.iter().any(|node| node.id.as_str() == "Z"));
        assert!(elements.nodes.iter().all(|node| node.role == NodeRole::Normal));
    }
}
