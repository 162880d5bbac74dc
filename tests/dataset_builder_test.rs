//! Integration tests for the snapshot builder.
//!
//! Covers the required-columns contract, header normalization, value
//! trimming, and the last-write-wins index collision policy.

use herbarium::config::LookupConfig;
use herbarium::dataset::{build_snapshot, BuildError};
use herbarium::source::{SourceError, Table, TableSource};

/// Table source serving a fixed in-memory table.
struct StaticSource {
    table: Table,
}

impl StaticSource {
    fn new(header: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            table: Table {
                header: header.iter().map(|h| (*h).to_string()).collect(),
                rows: rows
                    .iter()
                    .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                    .collect(),
            },
        }
    }
}

impl TableSource for StaticSource {
    fn open_table(&self, _table: &str) -> Result<Table, SourceError> {
        Ok(self.table.clone())
    }

    fn source_id(&self) -> String {
        "static".to_string()
    }
}

fn test_config() -> LookupConfig {
    LookupConfig { source_id: "static".to_string(), ..LookupConfig::default() }
}

const FULL_HEADER: &[&str] = &["code", "herb", "effect", "description", "loe", "ref"];

#[test]
fn test_build_carries_all_header_columns_trimmed() {
    let source = StaticSource::new(
        &["code", "herb", "effect", "description", "loe", "ref", "note"],
        &[&[" H1 ", " Ginger", "Digestive aid ", "Root extract", "High", "ref1", " extra "]],
    );

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    assert_eq!(snapshot.rows.len(), 1);

    let row = &snapshot.rows[0];
    // Every discovered column is carried, not just the required ones.
    assert_eq!(row.fields.len(), 7);
    assert_eq!(row.get("code"), "H1");
    assert_eq!(row.get("herb"), "Ginger");
    assert_eq!(row.get("note"), "extra");
}

#[test]
fn test_each_missing_required_column_fails_with_its_name() {
    for missing in FULL_HEADER {
        let header: Vec<&str> =
            FULL_HEADER.iter().copied().filter(|h| h != missing).collect();
        let source = StaticSource::new(&header, &[]);

        match build_snapshot(&source, &test_config()) {
            Err(BuildError::MissingColumn(column)) => assert_eq!(column.as_str(), *missing),
            other => panic!("Expected MissingColumn({}), got {:?}", missing, other),
        }
    }
}

#[test]
fn test_header_cells_are_normalized() {
    let source = StaticSource::new(
        &[" Code ", "HERB", "Effect", "Description", "LoE", "Ref"],
        &[&["H1", "Ginger", "Digestive aid", "Root", "High", "ref1"]],
    );

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    assert_eq!(snapshot.rows[0].get("code"), "H1");
    assert_eq!(snapshot.rows[0].get("loe"), "High");
}

#[test]
fn test_later_row_wins_index_collision() {
    let source = StaticSource::new(
        FULL_HEADER,
        &[
            &["H1", "Ginger", "first", "d", "High", "r"],
            &["h1", "GINGER", "second", "d", "Low", "r"],
        ],
    );

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    assert_eq!(snapshot.rows.len(), 2);

    // Both normalized keys collide; the second source row owns them.
    let by_code = snapshot.lookup("code", "h1").expect("Code index should resolve");
    assert_eq!(by_code.get("effect"), "second");
    let by_herb = snapshot.lookup("herb", "ginger").expect("Herb index should resolve");
    assert_eq!(by_herb.get("effect"), "second");
}

#[test]
fn test_header_only_source_builds_empty_snapshot() {
    let source = StaticSource::new(FULL_HEADER, &[]);

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    assert_eq!(snapshot.rows.len(), 0);
    assert_eq!(snapshot.meta.rows, 0);
    assert!(snapshot.indexes["code"].is_empty());
    assert!(snapshot.indexes["herb"].is_empty());
}

#[test]
fn test_blank_source_id_is_source_unavailable() {
    let source = StaticSource::new(FULL_HEADER, &[]);
    let config = LookupConfig { source_id: "  ".to_string(), ..LookupConfig::default() };

    match build_snapshot(&source, &config) {
        Err(BuildError::Source(SourceError::Unavailable(_))) => {}
        other => panic!("Expected SourceUnavailable, got {:?}", other),
    }
}

#[test]
fn test_empty_values_never_enter_an_index() {
    let source = StaticSource::new(
        FULL_HEADER,
        &[&["H1", "   ", "effect", "d", "High", "r"]],
    );

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    assert_eq!(snapshot.rows.len(), 1);
    assert!(snapshot.indexes["herb"].is_empty());
    assert_eq!(snapshot.indexes["code"].len(), 1);
}

#[test]
fn test_missing_cells_coerce_to_empty_string() {
    let source = StaticSource::new(FULL_HEADER, &[&["H1", "Ginger"]]);

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    let row = &snapshot.rows[0];
    assert_eq!(row.fields.len(), FULL_HEADER.len());
    assert_eq!(row.get("effect"), "");
    assert_eq!(row.get("ref"), "");
}

#[test]
fn test_indexes_refer_only_to_snapshot_rows() {
    let source = StaticSource::new(
        FULL_HEADER,
        &[
            &["H1", "Ginger", "e1", "d1", "High", "r1"],
            &["H2", "Turmeric", "e2", "d2", "Mid", "r2"],
        ],
    );

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    for index in snapshot.indexes.values() {
        for &position in index.values() {
            assert!(position < snapshot.rows.len());
        }
    }
}

#[test]
fn test_scenario_a_code_and_name_resolve_the_row() {
    let source = StaticSource::new(
        FULL_HEADER,
        &[&["H1", "Ginger", "Digestive aid", "Zingiber officinale root", "High", "ref1"]],
    );

    let snapshot = build_snapshot(&source, &test_config()).expect("Build should succeed");
    let by_code = snapshot.lookup("code", "h1").expect("Lower-cased code should resolve");
    assert_eq!(by_code.get("herb"), "Ginger");
    let by_name = snapshot.lookup("herb", "ginger").expect("Lower-cased name should resolve");
    assert_eq!(by_name.get("code"), "H1");
}
