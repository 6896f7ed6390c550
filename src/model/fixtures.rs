// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Built-in example graphs used by `--demo`, `graph.load_example`, tests and benches.

use std::fmt;
use std::str::FromStr;

use super::arc::ArcRecord;
use super::ids::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExampleGraph {
    /// Five-point routing exercise `A, P1, P2, P3, B`; the greedy first hop is a trap.
    #[default]
    Route,
    /// Seven-arc `A..E` graph with two-way arcs between `A` and `B`.
    Lecture,
    /// Parallel arcs with different weights plus a declared but unconnected node.
    Parallel,
}

impl ExampleGraph {
    pub const ALL: [ExampleGraph; 3] = [Self::Route, Self::Lecture, Self::Parallel];

    pub fn name(self) -> &'static str {
        match self {
            Self::Route => "route",
            Self::Lecture => "lecture",
            Self::Parallel => "parallel",
        }
    }

    pub fn records(self) -> Vec<ArcRecord> {
        match self {
            Self::Route => route(),
            Self::Lecture => lecture(),
            Self::Parallel => parallel(),
        }
    }
}

impl fmt::Display for ExampleGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownExampleError {
    name: String,
}

impl fmt::Display for UnknownExampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown example `{}` (expected route|lecture|parallel)", self.name)
    }
}

impl std::error::Error for UnknownExampleError {}

impl FromStr for ExampleGraph {
    type Err = UnknownExampleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|example| example.name() == s)
            .ok_or_else(|| UnknownExampleError { name: s.to_owned() })
    }
}

fn arcs(rows: &[(&'static str, &'static str, f64)]) -> Vec<ArcRecord> {
    rows.iter()
        .map(|&(source, target, weight)| {
            ArcRecord::arc(NodeId::from_static(source), NodeId::from_static(target), weight)
        })
        .collect()
}

fn route() -> Vec<ArcRecord> {
    arcs(&[
        ("A", "P1", 2.0),
        ("A", "P2", 7.0),
        ("P1", "P2", 10.0),
        ("P2", "P1", 10.0),
        ("P1", "B", 30.0),
        ("P2", "P3", 8.0),
        ("P3", "B", 5.0),
    ])
}

fn lecture() -> Vec<ArcRecord> {
    arcs(&[
        ("A", "B", 10.0),
        ("A", "C", 3.0),
        ("B", "A", 20.0),
        ("B", "D", 5.0),
        ("C", "B", 2.0),
        ("C", "E", 15.0),
        ("D", "E", 11.0),
    ])
}

fn parallel() -> Vec<ArcRecord> {
    let mut records = arcs(&[
        ("A", "B", 10.0),
        ("A", "B", 3.0),
        ("B", "C", 4.0),
        ("A", "C", 9.0),
        ("C", "C", 1.0),
    ]);
    records.push(ArcRecord::declared_node(NodeId::from_static("Z")));
    records
}
