// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::*;
use rmcp::model::ErrorCode;

fn route_server() -> ArcrouteMcp {
    ArcrouteMcp::new(GraphDocument::new(ExampleGraph::Route.records()))
}

fn find(source: &str, target: &str) -> PathFindParams {
    PathFindParams { source: source.to_owned(), target: target.to_owned(), ..Default::default() }
}

#[tokio::test]
async fn graph_read_lists_nodes_and_arc_labels() {
    let server = route_server();
    let Json(read) = server.graph_read().await.expect("graph.read");

    assert_eq!(read.rev, 0);
    assert_eq!(read.nodes, vec!["A", "B", "P1", "P2", "P3"]);
    assert_eq!(read.arc_labels.len(), 7);
    assert_eq!(read.arc_labels[0], "A->P1");
    assert_eq!(read.records[6].target.as_deref(), Some("B"));
    assert_eq!(read.records[6].weight, Some(5.0));
}

#[tokio::test]
async fn edits_bump_rev_and_report_delta() {
    let server = ArcrouteMcp::new(GraphDocument::default());

    let Json(added) = server
        .graph_add_arc(Parameters(GraphAddArcParams {
            source: "A".to_owned(),
            target: "B".to_owned(),
            weight: 4.0,
            base_rev: Some(0),
        }))
        .await
        .expect("graph.add_arc");
    assert_eq!(added.new_rev, 1);
    assert_eq!(added.added_arcs, vec!["A->B"]);

    let Json(known) = server
        .graph_add_node(Parameters(GraphAddNodeParams { node: "B".to_owned(), base_rev: None }))
        .await
        .expect("graph.add_node known");
    assert_eq!(known.new_rev, 1);
    assert!(known.added_nodes.is_empty());

    let Json(fresh) = server
        .graph_add_node(Parameters(GraphAddNodeParams { node: "C".to_owned(), base_rev: None }))
        .await
        .expect("graph.add_node fresh");
    assert_eq!(fresh.new_rev, 2);
    assert_eq!(fresh.added_nodes, vec!["C"]);
}

#[tokio::test]
async fn stale_base_rev_is_rejected() {
    let server = route_server();
    server
        .graph_add_node(Parameters(GraphAddNodeParams { node: "Q".to_owned(), base_rev: None }))
        .await
        .expect("graph.add_node");

    let err = server
        .graph_add_arc(Parameters(GraphAddArcParams {
            source: "Q".to_owned(),
            target: "A".to_owned(),
            weight: 1.0,
            base_rev: Some(0),
        }))
        .await
        .err().expect("expected error");
    assert_eq!(err.code, ErrorCode::INVALID_REQUEST);
    assert!(err.message.contains("conflict"));

    let Json(read) = server.graph_read().await.expect("graph.read");
    assert_eq!(read.rev, 1);
    assert_eq!(read.arc_labels.len(), 7);
}

#[tokio::test]
async fn remove_arcs_drops_parallel_arcs_together() {
    let server = ArcrouteMcp::new(GraphDocument::new(ExampleGraph::Parallel.records()));
    let Json(removed) = server
        .graph_remove_arcs(Parameters(GraphRemoveArcsParams {
            arcs: vec!["A->B".to_owned()],
            base_rev: None,
        }))
        .await
        .expect("graph.remove_arcs");
    assert_eq!(removed.removed_records, 2);

    let err = server
        .graph_remove_arcs(Parameters(GraphRemoveArcsParams {
            arcs: vec!["A->B".to_owned()],
            base_rev: None,
        }))
        .await
        .err().expect("expected error");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
}

#[tokio::test]
async fn remove_unknown_node_carries_a_suggestion() {
    let server = route_server();
    let err = server
        .graph_remove_nodes(Parameters(GraphRemoveNodesParams {
            nodes: vec!["p2".to_owned()],
            base_rev: None,
        }))
        .await
        .err().expect("expected error");
    assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND);
    let data = err.data.expect("error data");
    assert_eq!(data["suggestion"], "P2");
}

#[tokio::test]
async fn load_example_replaces_the_document() {
    let server = route_server();
    let Json(loaded) = server
        .graph_load_example(Parameters(GraphLoadExampleParams {
            name: Some("lecture".to_owned()),
        }))
        .await
        .expect("graph.load_example");
    assert_eq!(loaded.rev, 1);
    assert_eq!(loaded.arcs, 7);

    let Json(found) = server.path_find(Parameters(find("A", "E"))).await.expect("path.find");
    assert!(found.found);
    assert_eq!(found.total_weight, Some(18.0));

    let err = server
        .graph_load_example(Parameters(GraphLoadExampleParams { name: Some("mesh".to_owned()) }))
        .await
        .err().expect("expected error");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn csv_import_and_export_agree() {
    let server = ArcrouteMcp::new(GraphDocument::default());
    let csv = "source,target,weight\nA,B,10\nA,B,3\nZ,,\n";
    let Json(imported) = server
        .graph_import_csv(Parameters(GraphImportCsvParams { csv: csv.to_owned() }))
        .await
        .expect("graph.import_csv");
    assert_eq!((imported.rev, imported.records, imported.arcs), (1, 3, 2));

    let Json(exported) = server.graph_export_csv().await.expect("graph.export_csv");
    assert_eq!(exported.rev, 1);
    assert_eq!(exported.csv, csv);

    let err = server
        .graph_import_csv(Parameters(GraphImportCsvParams { csv: "from,to\n".to_owned() }))
        .await
        .err().expect("expected error");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn path_find_returns_route_message() {
    let server = route_server();
    let Json(found) = server.path_find(Parameters(find("A", "B"))).await.expect("path.find");

    assert!(found.found);
    assert_eq!(
        found.message,
        "Shortest Path: [('A', 'P2'), ('P2', 'P3'), ('P3', 'B')], Total Weight: 20"
    );
    assert_eq!(found.arcs.iter().map(|arc| arc.index).collect::<Vec<_>>(), vec![1, 5, 6]);
    assert_eq!(found.total_weight, Some(20.0));
    assert_eq!(found.status.as_deref(), Some("optimal"));
    assert_eq!(found.backend, "mip");
    assert_eq!(found.kind, None);
}

#[tokio::test]
async fn path_find_with_cp_backend_agrees() {
    let server = route_server();
    let params = PathFindParams { backend: Some("cp".to_owned()), ..find("A", "B") };
    let Json(found) = server.path_find(Parameters(params)).await.expect("path.find");
    assert!(found.found);
    assert_eq!(found.backend, "cp");
    assert_eq!(found.total_weight, Some(20.0));
}

#[tokio::test]
async fn path_find_failures_stay_in_band() {
    let server = route_server();

    let Json(infeasible) = server.path_find(Parameters(find("B", "A"))).await.expect("path.find");
    assert!(!infeasible.found);
    assert_eq!(infeasible.message, "No path found");
    assert_eq!(infeasible.kind.as_deref(), Some("infeasible"));
    assert!(infeasible.arcs.is_empty());

    let Json(malformed) =
        server.path_find(Parameters(find("A", "P22"))).await.expect("path.find");
    assert!(!malformed.found);
    assert_eq!(malformed.kind.as_deref(), Some("malformed_query"));
    assert!(malformed.reason.as_deref().is_some_and(|reason| reason.contains("did you mean `P2`")));
}

#[tokio::test]
async fn unqueryable_graph_is_reported_in_band() {
    let records = vec![ArcRecord::arc(
        NodeId::new("A").expect("node"),
        NodeId::new("B").expect("node"),
        f64::NAN,
    )];
    let (backend, outcome) = solve_off_thread(
        records,
        NodeId::new("A").expect("node"),
        NodeId::new("B").expect("node"),
        QueryOptions::default(),
    )
    .await;

    let response = path_response(3, backend, &outcome);
    assert!(!response.found);
    assert_eq!(response.rev, 3);
    assert_eq!(response.message, "No path found");
    assert_eq!(response.kind.as_deref(), Some("invalid_graph"));
    assert!(response.reason.as_deref().is_some_and(|reason| reason.contains("non-finite")));
}

#[tokio::test]
async fn path_find_rejects_unknown_backend() {
    let server = route_server();
    let params = PathFindParams { backend: Some("lp".to_owned()), ..find("A", "B") };
    let err = server.path_find(Parameters(params)).await.err().expect("expected error");
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
}

#[tokio::test]
async fn path_find_honours_node_limit() {
    let server = route_server();
    let params = PathFindParams { node_limit: Some(0), ..find("A", "B") };
    let Json(found) = server.path_find(Parameters(params)).await.expect("path.find");
    assert!(!found.found);
    assert_eq!(found.kind.as_deref(), Some("solver_unavailable"));
}

#[tokio::test]
async fn elements_highlight_the_shortest_path() {
    let server = route_server();
    let Json(elements) = server
        .graph_elements(Parameters(GraphElementsParams {
            source: Some("A".to_owned()),
            target: Some("B".to_owned()),
            highlight_path: None,
        }))
        .await
        .expect("graph.elements");

    let lit = elements
        .arcs
        .iter()
        .filter(|arc| arc.highlighted)
        .map(|arc| arc.index)
        .collect::<Vec<_>>();
    assert_eq!(lit, vec![1, 5, 6]);
    assert_eq!(elements.nodes[0].role, "source");
    assert_eq!(elements.nodes[1].role, "target");
    assert!(elements.message.as_deref().is_some_and(|message| message.ends_with("20")));

    let Json(plain) = server
        .graph_elements(Parameters(GraphElementsParams {
            source: None,
            target: None,
            highlight_path: None,
        }))
        .await
        .expect("graph.elements plain");
    assert!(plain.arcs.iter().all(|arc| !arc.highlighted));
    assert_eq!(plain.message, None);
}
