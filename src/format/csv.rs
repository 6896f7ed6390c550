// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! `source,target,weight` edge lists.
//!
//! One record per row. Empty `target` and `weight` fields declare a node without arcs. Fields
//! follow RFC 4180 quoting, may span lines when quoted, and are trimmed on read.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, Writer};

use crate::model::{ArcRecord, IdError, NodeId};

pub const HEADER: [&str; 3] = ["source", "target", "weight"];

#[derive(Debug, Clone, PartialEq)]
pub enum CsvParseError {
    MissingHeader,
    InvalidHeader { line_no: usize, found: String },
    Malformed { line_no: usize, reason: String },
    FieldCount { line_no: usize, found: usize },
    InvalidNode { line_no: usize, value: String, reason: IdError },
    InvalidWeight { line_no: usize, value: String },
    MissingWeight { line_no: usize },
    WeightWithoutTarget { line_no: usize },
}

impl CsvParseError {
    fn from_reader(err: csv::Error) -> Self {
        let line_no = err.position().map_or(0, |position| position.line() as usize);
        Self::Malformed { line_no, reason: err.to_string() }
    }
}

impl fmt::Display for CsvParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => f.write_str("expected 'source,target,weight' header"),
            Self::InvalidHeader { line_no, found } => write!(
                f,
                "invalid header on line {line_no}: {found} (expected source,target,weight)"
            ),
            Self::Malformed { line_no, reason } => {
                write!(f, "malformed csv on line {line_no}: {reason}")
            }
            Self::FieldCount { line_no, found } => {
                write!(f, "expected 3 fields on line {line_no}, found {found}")
            }
            Self::InvalidNode { line_no, value, reason } => {
                write!(f, "invalid node '{value}' on line {line_no} ({reason})")
            }
            Self::InvalidWeight { line_no, value } => {
                write!(f, "invalid weight '{value}' on line {line_no} (expected a finite number)")
            }
            Self::MissingWeight { line_no } => write!(f, "arc on line {line_no} has no weight"),
            Self::WeightWithoutTarget { line_no } => {
                write!(f, "line {line_no} has a weight but no target")
            }
        }
    }
}

impl std::error::Error for CsvParseError {}

#[derive(Debug)]
pub enum CsvFileError {
    Io { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: CsvParseError },
    Encode { path: PathBuf, source: csv::Error },
}

impl fmt::Display for CsvFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Parse { path, source } => write!(f, "csv error in {path:?}: {source}"),
            Self::Encode { path, source } => {
                write!(f, "csv encoding for {path:?} failed: {source}")
            }
        }
    }
}

impl std::error::Error for CsvFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
        }
    }
}

fn parse_row(row: &StringRecord, line_no: usize) -> Result<ArcRecord, CsvParseError> {
    let (Some(source), Some(target), Some(weight), None) =
        (row.get(0), row.get(1), row.get(2), row.get(3))
    else {
        return Err(CsvParseError::FieldCount { line_no, found: row.len() });
    };
    let node = |value: &str| {
        NodeId::new(value).map_err(|reason| CsvParseError::InvalidNode {
            line_no,
            value: value.to_owned(),
            reason,
        })
    };
    let source = node(source)?;
    let target = if target.is_empty() { None } else { Some(node(target)?) };
    let weight = if weight.is_empty() {
        None
    } else {
        let parsed = weight
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| CsvParseError::InvalidWeight { line_no, value: weight.to_owned() })?;
        Some(parsed)
    };

    match (target, weight) {
        (Some(target), Some(weight)) => Ok(ArcRecord::arc(source, target, weight)),
        (None, None) => Ok(ArcRecord::declared_node(source)),
        (Some(_), None) => Err(CsvParseError::MissingWeight { line_no }),
        (None, Some(_)) => Err(CsvParseError::WeightWithoutTarget { line_no }),
    }
}

pub fn parse_csv(input: &str) -> Result<Vec<ArcRecord>, CsvParseError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(input.as_bytes());
    let mut records = Vec::new();
    let mut saw_header = false;
    let mut row = StringRecord::new();

    while reader.read_record(&mut row).map_err(CsvParseError::from_reader)? {
        let line_no = row.position().map_or(0, |position| position.line() as usize);
        if row.len() <= 1 && row.iter().all(str::is_empty) {
            continue;
        }

        if !saw_header {
            let matches_header = row.len() == HEADER.len()
                && row.iter().zip(HEADER).all(|(field, expected)| {
                    field.eq_ignore_ascii_case(expected)
                });
            if !matches_header {
                let found = row.iter().collect::<Vec<_>>().join(",");
                return Err(CsvParseError::InvalidHeader { line_no, found });
            }
            saw_header = true;
            continue;
        }

        records.push(parse_row(&row, line_no)?);
    }

    if !saw_header {
        return Err(CsvParseError::MissingHeader);
    }
    Ok(records)
}

/// Writes the header plus one row per record, in record order.
pub fn export_csv(records: &[ArcRecord]) -> Result<String, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        let target = record.target().map_or("", |target| target.as_str());
        let weight = record.weight().map(|weight| weight.to_string()).unwrap_or_default();
        writer.write_record([record.source().as_str(), target, weight.as_str()])?;
    }
    let bytes = writer.into_inner().map_err(|err| csv::Error::from(err.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn read_csv_file(path: &Path) -> Result<Vec<ArcRecord>, CsvFileError> {
    let input = fs::read_to_string(path)
        .map_err(|source| CsvFileError::Io { path: path.to_path_buf(), source })?;
    parse_csv(&input).map_err(|source| CsvFileError::Parse { path: path.to_path_buf(), source })
}

pub fn write_csv_file(path: &Path, records: &[ArcRecord]) -> Result<(), CsvFileError> {
    let text = export_csv(records)
        .map_err(|source| CsvFileError::Encode { path: path.to_path_buf(), source })?;
    fs::write(path, text).map_err(|source| CsvFileError::Io { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{export_csv, parse_csv, read_csv_file, write_csv_file, CsvParseError};
    use crate::model::{ArcRecord, ExampleGraph, IdError, NodeId};

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    fn temp_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).expect("clock").as_nanos();
        std::env::temp_dir().join(format!("arcroute-{name}-{}-{nanos}.csv", std::process::id()))
    }

    #[test]
    fn parses_arcs_and_declared_nodes() {
        let input = "source,target,weight\nA,B,2\nA,B,0.5\n\nZ,,\n";
        let records = parse_csv(input).expect("parse");
        assert_eq!(
            records,
            vec![
                ArcRecord::arc(nid("A"), nid("B"), 2.0),
                ArcRecord::arc(nid("A"), nid("B"), 0.5),
                ArcRecord::declared_node(nid("Z")),
            ]
        );
    }

    #[test]
    fn accepts_quoted_fields_and_loose_header() {
        let input = "\u{feff}Source, Target ,WEIGHT\n\"New York, NY\",\"Say \"\"hi\"\"\", 3\n";
        let records = parse_csv(input).expect("parse");
        assert_eq!(
            records,
            vec![ArcRecord::arc(nid("New York, NY"), nid("Say \"hi\""), 3.0)]
        );
    }

    #[test]
    fn errors_carry_line_numbers() {
        assert_eq!(parse_csv(""), Err(CsvParseError::MissingHeader));
        assert_eq!(
            parse_csv("from,to\nA,B,1\n"),
            Err(CsvParseError::InvalidHeader { line_no: 1, found: "from,to".to_owned() })
        );
        assert_eq!(
            parse_csv("source,target,weight\nA,B,1\nA,B\n"),
            Err(CsvParseError::FieldCount { line_no: 3, found: 2 })
        );
        assert_eq!(
            parse_csv("source,target,weight\nA,B,heavy\n"),
            Err(CsvParseError::InvalidWeight { line_no: 2, value: "heavy".to_owned() })
        );
        assert_eq!(
            parse_csv("source,target,weight\nA,B,\n"),
            Err(CsvParseError::MissingWeight { line_no: 2 })
        );
        assert_eq!(
            parse_csv("source,target,weight\nA,,4\n"),
            Err(CsvParseError::WeightWithoutTarget { line_no: 2 })
        );
        assert_eq!(
            parse_csv("source,target,weight\nA,B,1,9\n"),
            Err(CsvParseError::FieldCount { line_no: 2, found: 4 })
        );
        assert_eq!(
            parse_csv("source,target,weight\n,B,1\n"),
            Err(CsvParseError::InvalidNode {
                line_no: 2,
                value: String::new(),
                reason: IdError::Empty,
            })
        );
    }

    #[test]
    fn quoted_fields_may_span_lines() {
        let input = "source,target,weight\n\"two\nlines\",B,1\nA,B,heavy\n";
        assert_eq!(
            parse_csv(input),
            Err(CsvParseError::InvalidWeight { line_no: 4, value: "heavy".to_owned() })
        );

        let records = parse_csv("source,target,weight\n\"two\nlines\",B,1\n").expect("parse");
        assert_eq!(records, vec![ArcRecord::arc(nid("two\nlines"), nid("B"), 1.0)]);
    }

    #[test]
    fn text_after_closing_quote_is_kept() {
        let records = parse_csv("source,target,weight\n\"A\"x,B,1\n").expect("parse");
        assert_eq!(records, vec![ArcRecord::arc(nid("Ax"), nid("B"), 1.0)]);
    }

    #[test]
    fn rejects_non_finite_weights() {
        assert!(matches!(
            parse_csv("source,target,weight\nA,B,inf\n"),
            Err(CsvParseError::InvalidWeight { line_no: 2, .. })
        ));
    }

    #[test]
    fn exports_integral_weights_without_fraction() {
        let records = vec![
            ArcRecord::arc(nid("A"), nid("P2"), 7.0),
            ArcRecord::arc(nid("P2"), nid("x, y"), 2.5),
            ArcRecord::declared_node(nid("Z")),
        ];
        assert_eq!(
            export_csv(&records).expect("export"),
            "source,target,weight\nA,P2,7\nP2,\"x, y\",2.5\nZ,,\n"
        );
    }

    #[test]
    fn exported_example_reads_back() {
        let records = ExampleGraph::Parallel.records();
        let text = export_csv(&records).expect("export");
        assert_eq!(parse_csv(&text).expect("parse"), records);
    }

    #[test]
    fn file_helpers_write_and_read() {
        let path = temp_path("file-helpers");
        let records = ExampleGraph::Route.records();
        write_csv_file(&path, &records).expect("write");
        let loaded = read_csv_file(&path).expect("read");
        fs::remove_file(&path).expect("cleanup");
        assert_eq!(loaded, records);

        let missing = read_csv_file(&path).unwrap_err();
        assert!(missing.to_string().starts_with("io error at"));
    }
}
