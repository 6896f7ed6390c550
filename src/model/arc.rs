// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{IdError, NodeId, ARC_LABEL_SEPARATOR};

/// One row of the editor's graph table.
///
/// A record without a target declares a node that has no arcs yet; such records never become
/// arcs. A record with a target must carry a weight.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcRecord {
    source: NodeId,
    target: Option<NodeId>,
    weight: Option<f64>,
}

impl ArcRecord {
    pub fn arc(source: NodeId, target: NodeId, weight: f64) -> Self {
        Self {
            source,
            target: Some(target),
            weight: Some(weight),
        }
    }

    pub fn declared_node(node: NodeId) -> Self {
        Self {
            source: node,
            target: None,
            weight: None,
        }
    }

    pub fn new(source: NodeId, target: Option<NodeId>, weight: Option<f64>) -> Self {
        Self { source, target, weight }
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> Option<&NodeId> {
        self.target.as_ref()
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn is_declaration(&self) -> bool {
        self.target.is_none()
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        &self.source == node || self.target.as_ref() == Some(node)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectedArc {
    source: NodeId,
    target: NodeId,
    weight: f64,
}

impl DirectedArc {
    pub fn new(source: NodeId, target: NodeId, weight: f64) -> Self {
        Self { source, target, weight }
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn label(&self) -> ArcLabel {
        ArcLabel::new(self.source.clone(), self.target.clone())
    }
}

/// An ordered node pair written as `source->target`.
///
/// Labels name every parallel arc between the pair at once; they are an editor convenience and
/// never used to identify a decision variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArcLabel {
    source: NodeId,
    target: NodeId,
}

impl ArcLabel {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &NodeId {
        &self.source
    }

    pub fn target(&self) -> &NodeId {
        &self.target
    }

    pub fn matches(&self, record: &ArcRecord) -> bool {
        record.source() == &self.source && record.target() == Some(&self.target)
    }
}

impl fmt::Display for ArcLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ARC_LABEL_SEPARATOR}{}", self.source, self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseArcLabelError {
    MissingSeparator,
    InvalidNode(IdError),
}

impl fmt::Display for ParseArcLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => {
                write!(f, "arc label must look like <source>{ARC_LABEL_SEPARATOR}<target>")
            }
            Self::InvalidNode(err) => write!(f, "invalid arc label endpoint: {err}"),
        }
    }
}

impl std::error::Error for ParseArcLabelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MissingSeparator => None,
            Self::InvalidNode(err) => Some(err),
        }
    }
}

impl FromStr for ArcLabel {
    type Err = ParseArcLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, target) =
            s.split_once(ARC_LABEL_SEPARATOR).ok_or(ParseArcLabelError::MissingSeparator)?;
        let source = NodeId::new(source.trim()).map_err(ParseArcLabelError::InvalidNode)?;
        let target = NodeId::new(target.trim()).map_err(ParseArcLabelError::InvalidNode)?;
        Ok(Self { source, target })
    }
}

#[cfg(test)]
mod tests {
    use super::{ArcLabel, ArcRecord, ParseArcLabelError};
    use crate::model::NodeId;

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    #[test]
    fn arc_label_round_trips_through_display() {
        let label: ArcLabel = "P1->B".parse().expect("label");
        assert_eq!(label.source().as_str(), "P1");
        assert_eq!(label.target().as_str(), "B");
        assert_eq!(label.to_string(), "P1->B");
    }

    #[test]
    fn arc_label_requires_separator() {
        assert_eq!("P1-B".parse::<ArcLabel>(), Err(ParseArcLabelError::MissingSeparator));
        assert!(matches!("->B".parse::<ArcLabel>(), Err(ParseArcLabelError::InvalidNode(_))));
    }

    #[test]
    fn arc_label_matches_only_connected_records() {
        let label = ArcLabel::new(nid("A"), nid("B"));
        assert!(label.matches(&ArcRecord::arc(nid("A"), nid("B"), 1.0)));
        assert!(!label.matches(&ArcRecord::arc(nid("B"), nid("A"), 1.0)));
        assert!(!label.matches(&ArcRecord::declared_node(nid("A"))));
    }
}
