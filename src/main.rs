// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Arcroute CLI entrypoint.
//!
//! With `--from`/`--to` this answers a single shortest-path query and exits. Otherwise it serves
//! MCP over streamable HTTP at `http://127.0.0.1:<port>/mcp`, or over stdio with `--mcp`.

use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arcroute::editor::GraphDocument;
use arcroute::format::csv::read_csv_file;
use arcroute::mcp::ArcrouteMcp;
use arcroute::model::{ArcRecord, ExampleGraph, GraphSnapshot, NodeId};
use arcroute::query::{find_shortest_path, QueryError, QueryOptions};
use arcroute::solver::Backend;
use axum::Router;
use rmcp::transport::{
    streamable_http_server::session::local::LocalSessionManager, StreamableHttpServerConfig,
    StreamableHttpService,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_MCP_HTTP_PORT: u16 = 27436;
const LOG_ENV: &str = "ARCROUTE_LOG";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<graph.csv> | --graph <path> | --demo [<example>]] --from <node> --to <node> [--backend mip|cp] [--time-limit-ms <ms>] [--node-limit <n>]\n  {program} [<graph.csv> | --graph <path> | --demo [<example>]] [--mcp-http-port <port>]\n  {program} [<graph.csv> | --graph <path> | --demo [<example>]] --mcp\n\nQuery mode prints the shortest path and exits 0, or prints `No path found` and exits 1.\nWithout --from/--to, MCP is served over streamable HTTP at `http://127.0.0.1:<port>/mcp`\n(--mcp-http-port selects the port, 0 = ephemeral; default {DEFAULT_MCP_HTTP_PORT}), or over stdio with --mcp.\n\nExamples: route (default), lecture, parallel. Set {LOG_ENV} to change the log filter (default warn)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    graph: Option<String>,
    demo: Option<ExampleGraph>,
    from: Option<String>,
    to: Option<String>,
    backend: Option<Backend>,
    time_limit_ms: Option<u64>,
    node_limit: Option<u64>,
    mcp: bool,
    mcp_http_port: Option<u16>,
}

impl CliOptions {
    fn is_query(&self) -> bool {
        self.from.is_some()
    }

    fn query_options(&self) -> QueryOptions {
        let mut options = QueryOptions::default();
        if let Some(backend) = self.backend {
            options.backend = backend;
        }
        if let Some(time_limit_ms) = self.time_limit_ms {
            options.budget.time_limit = Some(Duration::from_millis(time_limit_ms));
        }
        if let Some(node_limit) = self.node_limit {
            options.budget.node_limit = Some(node_limit);
        }
        options
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value);
    Ok(())
}

fn parse_options(args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut args = args.peekable();
    let mut options = CliOptions::default();
    let mut saw_demo = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mcp" => {
                if options.mcp {
                    return Err(());
                }
                options.mcp = true;
            }
            "--demo" => {
                if saw_demo {
                    return Err(());
                }
                saw_demo = true;
                let named = args.peek().and_then(|next| next.parse::<ExampleGraph>().ok());
                if named.is_some() {
                    args.next();
                }
                options.demo = Some(named.unwrap_or_default());
            }
            "--graph" => set_once(&mut options.graph, args.next().ok_or(())?)?,
            "--from" => set_once(&mut options.from, args.next().ok_or(())?)?,
            "--to" => set_once(&mut options.to, args.next().ok_or(())?)?,
            "--backend" => {
                let backend = args.next().ok_or(())?.parse::<Backend>().map_err(|_| ())?;
                set_once(&mut options.backend, backend)?;
            }
            "--time-limit-ms" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.time_limit_ms, raw.parse().map_err(|_| ())?)?;
            }
            "--node-limit" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.node_limit, raw.parse().map_err(|_| ())?)?;
            }
            "--mcp-http-port" => {
                let raw = args.next().ok_or(())?;
                set_once(&mut options.mcp_http_port, raw.parse().map_err(|_| ())?)?;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => set_once(&mut options.graph, arg)?,
        }
    }

    if options.demo.is_some() && options.graph.is_some() {
        return Err(());
    }
    if options.from.is_some() != options.to.is_some() {
        return Err(());
    }
    if options.mcp && options.mcp_http_port.is_some() {
        return Err(());
    }
    if options.is_query() && (options.mcp || options.mcp_http_port.is_some()) {
        return Err(());
    }
    let tunes_solver = options.backend.is_some()
        || options.time_limit_ms.is_some()
        || options.node_limit.is_some();
    if tunes_solver && !options.is_query() {
        return Err(());
    }

    Ok(options)
}

fn load_records(options: &CliOptions) -> Result<Vec<ArcRecord>, Box<dyn Error>> {
    if let Some(path) = options.graph.as_deref() {
        let records = read_csv_file(Path::new(path))?;
        info!(path, records = records.len(), "graph loaded");
        return Ok(records);
    }
    Ok(options.demo.map(ExampleGraph::records).unwrap_or_default())
}

/// Runs one query; `Ok(false)` means no path was found.
fn run_query(options: &CliOptions, records: &[ArcRecord]) -> Result<bool, Box<dyn Error>> {
    let (Some(from), Some(to)) = (options.from.as_deref(), options.to.as_deref()) else {
        return Err("query mode needs both --from and --to".into());
    };
    let source = NodeId::new(from)?;
    let target = NodeId::new(to)?;
    let outcome = GraphSnapshot::from_records(records)
        .map_err(QueryError::from)
        .and_then(|snapshot| {
            find_shortest_path(&snapshot, &source, &target, &options.query_options())
        });

    match outcome {
        Ok(found) => {
            println!("{}", found.message());
            Ok(true)
        }
        Err(err) => {
            warn!(kind = err.kind(), reason = %err, "query failed");
            println!("{}", err.user_message());
            Ok(false)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() {
    let result = (|| -> Result<bool, Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "arcroute".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        init_logging();
        let records = load_records(&options)?;

        if options.is_query() {
            return run_query(&options, &records);
        }

        let mcp = ArcrouteMcp::new(GraphDocument::new(records));
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

        if options.mcp {
            runtime.block_on(mcp.serve_stdio())?;
            return Ok(true);
        }

        let port = options.mcp_http_port.unwrap_or(DEFAULT_MCP_HTTP_PORT);
        runtime.block_on(serve_http(mcp, port))?;
        Ok(true)
    })();

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("arcroute: {err}");
            std::process::exit(1);
        }
    }
}

async fn serve_http(mcp: ArcrouteMcp, port: u16) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let addr = listener.local_addr()?;

    let config =
        StreamableHttpServerConfig { stateful_mode: true, ..StreamableHttpServerConfig::default() };
    let shutdown_token = config.cancellation_token.clone();

    let session_manager = Arc::new(LocalSessionManager::default());
    let mcp_service = StreamableHttpService::new(move || Ok(mcp.clone()), session_manager, config);

    let router = Router::new().nest_service("/mcp", mcp_service);
    eprintln!("arcroute: serving MCP at http://{addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            shutdown_token.cancel();
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_options, CliOptions};
    use arcroute::model::ExampleGraph;
    use arcroute::solver::Backend;

    fn parse(args: &[&str]) -> Result<CliOptions, ()> {
        parse_options(args.iter().map(|arg| (*arg).to_owned()))
    }

    #[test]
    fn parses_empty_args() {
        assert_eq!(parse(&[]).expect("parse options"), CliOptions::default());
    }

    #[test]
    fn parses_query_against_csv() {
        let options = parse(&["graph.csv", "--from", "A", "--to", "B"]).expect("parse options");
        assert_eq!(options.graph.as_deref(), Some("graph.csv"));
        assert_eq!(options.from.as_deref(), Some("A"));
        assert_eq!(options.to.as_deref(), Some("B"));
        assert!(options.is_query());
        assert!(!options.mcp);
    }

    #[test]
    fn demo_name_is_optional() {
        let options = parse(&["--demo"]).expect("parse options");
        assert_eq!(options.demo, Some(ExampleGraph::Route));

        let options = parse(&["--demo", "lecture", "--mcp"]).expect("parse options");
        assert_eq!(options.demo, Some(ExampleGraph::Lecture));
        assert!(options.mcp);

        let options = parse(&["--demo", "--from", "A", "--to", "B"]).expect("parse options");
        assert_eq!(options.demo, Some(ExampleGraph::Route));
        assert_eq!(options.from.as_deref(), Some("A"));
    }

    #[test]
    fn solver_flags_shape_query_options() {
        let options = parse(&[
            "--demo",
            "--from",
            "A",
            "--to",
            "B",
            "--backend",
            "cp",
            "--time-limit-ms",
            "250",
            "--node-limit",
            "40",
        ])
        .expect("parse options");
        let query = options.query_options();
        assert_eq!(query.backend, Backend::ConstraintProgramming);
        assert_eq!(query.budget.time_limit, Some(std::time::Duration::from_millis(250)));
        assert_eq!(query.budget.node_limit, Some(40));
        assert!(query.formulation.close_terminals);
    }

    #[test]
    fn parses_mcp_http_port() {
        let options = parse(&["--mcp-http-port", "1234"]).expect("parse options");
        assert_eq!(options.mcp_http_port, Some(1234));
        assert!(!options.mcp);
    }

    #[test]
    fn rejects_conflicting_modes() {
        parse(&["--mcp", "--mcp-http-port", "0"]).unwrap_err();
        parse(&["--demo", "--graph", "g.csv"]).unwrap_err();
        parse(&["--demo", "--from", "A", "--to", "B", "--mcp"]).unwrap_err();
        parse(&["--demo", "--from", "A"]).unwrap_err();
        parse(&["--demo", "--backend", "cp"]).unwrap_err();
    }

    #[test]
    fn rejects_bad_values() {
        parse(&["--demo", "--from", "A", "--to", "B", "--backend", "lp"]).unwrap_err();
        parse(&["--demo", "--from", "A", "--to", "B", "--node-limit", "many"]).unwrap_err();
        parse(&["--mcp-http-port", "70000"]).unwrap_err();
        parse(&["--from"]).unwrap_err();
    }

    #[test]
    fn rejects_unknown_and_duplicate_flags() {
        parse(&["--nope"]).unwrap_err();
        parse(&["--mcp", "--mcp"]).unwrap_err();
        parse(&["--demo", "--demo"]).unwrap_err();
        parse(&["one.csv", "two.csv"]).unwrap_err();
        parse(&["--graph", "one.csv", "two.csv"]).unwrap_err();
        parse(&["--demo", "--from", "A", "--from", "B", "--to", "C"]).unwrap_err();
    }
}
