// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::path::{Path, PathBuf};

use arcroute::format::csv::read_csv_file;
use arcroute::model::{GraphSnapshot, NodeId};
use arcroute::query::{find_shortest_path, QueryError, QueryOptions};
use arcroute::solver::Backend;
use rstest::rstest;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn load(name: &str) -> GraphSnapshot {
    let records = read_csv_file(&fixture(name)).unwrap_or_else(|err| panic!("{name}: {err}"));
    GraphSnapshot::from_records(&records).expect("snapshot")
}

fn nid(value: &str) -> NodeId {
    NodeId::new(value).expect("node id")
}

fn query(
    snapshot: &GraphSnapshot,
    from: &str,
    to: &str,
    backend: Backend,
) -> Result<String, QueryError> {
    let options = QueryOptions { backend, ..QueryOptions::default() };
    find_shortest_path(snapshot, &nid(from), &nid(to), &options).map(|found| found.message())
}

#[rstest]
#[case(Backend::MixedInteger)]
#[case(Backend::ConstraintProgramming)]
fn route_fixture_prints_the_detour(#[case] backend: Backend) {
    let snapshot = load("route.csv");
    assert_eq!(
        query(&snapshot, "A", "B", backend).expect("path"),
        "Shortest Path: [('A', 'P2'), ('P2', 'P3'), ('P3', 'B')], Total Weight: 20"
    );
    assert_eq!(query(&snapshot, "B", "A", backend), Err(QueryError::Infeasible));
}

#[rstest]
#[case(Backend::MixedInteger)]
#[case(Backend::ConstraintProgramming)]
fn cities_fixture_routes_through_leipzig(#[case] backend: Backend) {
    let snapshot = load("cities.csv");
    assert_eq!(
        query(&snapshot, "Berlin", "Munich", backend).expect("path"),
        "Shortest Path: [('Berlin', 'Leipzig'), ('Leipzig', 'Munich')], Total Weight: 620"
    );
    assert_eq!(
        query(&snapshot, "Frankfurt, Main", "Berlin", backend).expect("path"),
        "Shortest Path: [('Frankfurt, Main', 'Munich'), ('Munich', 'Berlin')], Total Weight: 586"
    );
}

#[test]
fn declared_only_city_is_not_routable() {
    let snapshot = load("cities.csv");
    let err = query(&snapshot, "Berlin", "Tokyo", Backend::default()).unwrap_err();
    assert_eq!(err.kind(), "malformed_query");
    assert_eq!(err.user_message(), "No path found");
}
