//! Row-count verification against the export's record-count manifest
//!
//! Read-only: the database is opened without write access, and mismatches or
//! unknown tables become report entries instead of errors.

use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ImportError;
use crate::parser::StrictQuotes;
use crate::ui::{Phase, Ui};

/// One `table,count` line of the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub table: String,
    pub expected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CountOutcome {
    Match { actual: u64 },
    Mismatch { actual: u64 },
    /// The table could not be counted, usually because it is not in the schema
    MissingTable { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountCheck {
    pub table: String,
    pub expected: u64,
    #[serde(flatten)]
    pub outcome: CountOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationReport {
    pub manifest: PathBuf,
    pub checks: Vec<CountCheck>,
}

impl VerificationReport {
    pub fn mismatches(&self) -> impl Iterator<Item = &CountCheck> {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CountOutcome::Mismatch { .. }))
    }

    pub fn missing_tables(&self) -> impl Iterator<Item = &CountCheck> {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, CountOutcome::MissingTable { .. }))
    }

    /// Every manifest table exists and has the expected number of rows
    pub fn is_clean(&self) -> bool {
        self.checks
            .iter()
            .all(|c| matches!(c.outcome, CountOutcome::Match { .. }))
    }
}

fn clean_field(field: Option<&str>) -> String {
    field.unwrap_or("").replace('"', "").trim().to_string()
}

/// Read the manifest, skipping its header. Stray quotes are stripped.
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestEntry>> {
    let file = File::open(path).with_context(|| format!("Failed to open manifest: {:?}", path))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(StrictQuotes::new(file));

    let mut entries = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to parse manifest: {:?}", path))?;
        let table = clean_field(record.get(0));
        let value = clean_field(record.get(1));

        let expected = value
            .parse::<u64>()
            .map_err(|_| ImportError::InvalidManifestCount {
                table: table.clone(),
                value: value.clone(),
            })?;

        entries.push(ManifestEntry { table, expected });
    }

    Ok(entries)
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Count the rows of a table
pub fn count_rows(conn: &Connection, table: &str) -> rusqlite::Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count as u64)
}

/// Compare each manifest entry with the database, in manifest order
pub fn verify_counts(
    conn: &Connection,
    manifest: &Path,
    entries: &[ManifestEntry],
    ui: &mut impl Ui,
) -> VerificationReport {
    let checks = entries
        .iter()
        .map(|entry| {
            let outcome = match count_rows(conn, &entry.table) {
                Ok(actual) if actual == entry.expected => {
                    debug!("Inserted {} into {}", actual, entry.table);
                    CountOutcome::Match { actual }
                }
                Ok(actual) => {
                    debug!("Inserted {} into {}", actual, entry.table);
                    ui.warn(format!(
                        "Expected {} but inserted {} in {}",
                        entry.expected, actual, entry.table
                    ));
                    CountOutcome::Mismatch { actual }
                }
                Err(e) => {
                    ui.warn(format!("Ignoring {}: {}", entry.table, e));
                    CountOutcome::MissingTable {
                        error: e.to_string(),
                    }
                }
            };

            CountCheck {
                table: entry.table.clone(),
                expected: entry.expected,
                outcome,
            }
        })
        .collect();

    VerificationReport {
        manifest: manifest.to_path_buf(),
        checks,
    }
}

/// Re-open an existing database read-only and check it against a manifest
pub fn verify_database(
    db_path: &Path,
    manifest: &Path,
    ui: &mut impl Ui,
) -> Result<VerificationReport> {
    if !db_path.is_file() {
        return Err(ImportError::OutputMissing(db_path.to_path_buf()).into());
    }

    ui.set_phase(Phase::Verifying);
    ui.log(format!("Checking counts against {}", manifest.display()));

    let conn = Connection::open_with_flags(
        db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open database: {:?}", db_path))?;

    let entries = read_manifest(manifest)?;
    Ok(verify_counts(&conn, manifest, &entries, ui))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SilentUi;
    use std::fs;

    fn manifest_file(contents: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), contents).unwrap();
        file
    }

    fn food_db(rows: usize) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE food (fdc_id INT NOT NULL PRIMARY KEY)")
            .unwrap();
        for id in 0..rows {
            conn.execute("INSERT INTO food VALUES (?1)", [id as i64]).unwrap();
        }
        conn
    }

    #[test]
    fn test_read_manifest_strips_quotes() {
        let file = manifest_file("\"Table\",\"Count\"\n\"food\",\"5\"\nnutrient,\" 477\"\n");
        let entries = read_manifest(file.path()).unwrap();
        assert_eq!(
            entries,
            vec![
                ManifestEntry { table: "food".into(), expected: 5 },
                ManifestEntry { table: "nutrient".into(), expected: 477 },
            ]
        );
    }

    #[test]
    fn test_malformed_manifest_quoting_rejected() {
        let file = manifest_file("table,count\n\"food\"x,5\n");
        let err = read_manifest(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("',' expected after '\"'"));

        let file = manifest_file("table,count\nfood,\"5\n");
        let err = read_manifest(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("unexpected end of data"));
    }

    #[test]
    fn test_non_numeric_count_rejected() {
        let file = manifest_file("table,count\nfood,many\n");
        let err = read_manifest(file.path()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::InvalidManifestCount { .. })
        ));
    }

    #[test]
    fn test_mismatch_and_missing_table_do_not_stop() {
        let conn = food_db(1);
        let entries = vec![
            ManifestEntry { table: "fndds_derivation".into(), expected: 10 },
            ManifestEntry { table: "food".into(), expected: 5 },
        ];

        let report = verify_counts(&conn, Path::new("m.csv"), &entries, &mut SilentUi::new());
        assert_eq!(report.checks.len(), 2);
        assert!(matches!(
            report.checks[0].outcome,
            CountOutcome::MissingTable { .. }
        ));
        assert_eq!(report.checks[1].outcome, CountOutcome::Mismatch { actual: 1 });
        assert_eq!(report.mismatches().count(), 1);
        assert_eq!(report.missing_tables().count(), 1);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_verification_is_repeatable() {
        let conn = food_db(3);
        let entries = vec![ManifestEntry { table: "food".into(), expected: 3 }];

        let first = verify_counts(&conn, Path::new("m.csv"), &entries, &mut SilentUi::new());
        let second = verify_counts(&conn, Path::new("m.csv"), &entries, &mut SilentUi::new());
        assert_eq!(first, second);
        assert!(first.is_clean());
    }

    #[test]
    fn test_report_json_shape() {
        let report = VerificationReport {
            manifest: PathBuf::from("m.csv"),
            checks: vec![CountCheck {
                table: "food".into(),
                expected: 5,
                outcome: CountOutcome::Mismatch { actual: 1 },
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["checks"][0]["status"], "mismatch");
        assert_eq!(json["checks"][0]["actual"], 1);
    }

    #[test]
    fn test_missing_database_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = verify_database(
            &dir.path().join("absent.db"),
            &dir.path().join("m.csv"),
            &mut SilentUi::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::OutputMissing(_))
        ));
    }
}
