use anyhow::{Context, Result};
use rusqlite::{params_from_iter, Connection};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace};

use super::schema_gen::generate_schema_script;
use crate::config::{ImportOptions, DEFAULT_BATCH_SIZE};
use crate::error::ImportError;
use crate::parser::{CsvSource, ParsedRow};
use crate::schema::{verify_load_plan, TableSchema, ALL_TABLES, IGNORED_FILES};
use crate::source::validate_input_dir;
use crate::ui::{Phase, Ui};

/// A row reported by `PRAGMA foreign_key_check`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForeignKeyViolation {
    pub table: String,
    pub rowid: Option<i64>,
    pub parent: String,
    pub fkid: i64,
}

/// Diagnostics from the post-load maintenance steps. Nothing here rolls
/// back inserted data.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MaintenanceReport {
    pub foreign_key_violations: Vec<ForeignKeyViolation>,
    pub integrity: Vec<String>,
    pub errors: Vec<String>,
}

impl MaintenanceReport {
    pub fn is_clean(&self) -> bool {
        self.foreign_key_violations.is_empty()
            && self.integrity.iter().all(|line| line == "ok")
            && self.errors.is_empty()
    }
}

/// Row counts of a finished import
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub tables: Vec<(String, u64)>,
    pub maintenance: MaintenanceReport,
}

impl ImportSummary {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|(_, count)| count).sum()
    }
}

pub struct SqliteWriter {
    conn: Connection,
    batch_size: usize,
}

impl SqliteWriter {
    /// Create a new database file. An existing file is replaced only when
    /// `force` is set.
    pub fn create(db_path: &Path, force: bool) -> Result<Self> {
        if db_path.exists() {
            if !force {
                return Err(ImportError::OutputExists(db_path.to_path_buf()).into());
            }
            std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;
        Self::with_connection(conn)
    }

    /// Wrap an open connection, enabling foreign key enforcement
    pub fn with_connection(conn: Connection) -> Result<Self> {
        // Enforcement is per connection and must be switched on every time
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -64000;",
        )?;

        Ok(Self {
            conn,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create all tables and indexes for the given schemas
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        debug!("Creating {} tables", schemas.len());
        self.conn
            .execute_batch(&generate_schema_script(schemas))
            .context("Failed to create schema")?;
        Ok(())
    }

    /// Import one CSV file into its table, one transaction per batch
    pub fn import_table(
        &mut self,
        schema: &TableSchema,
        csv_path: &Path,
        ui: &mut impl Ui,
    ) -> Result<u64> {
        let mut source = CsvSource::open(csv_path, schema.columns.len())?;
        let insert_sql = insert_statement(schema);
        let total = source.total_bytes();

        let mut count: u64 = 0;
        let mut batch: Vec<ParsedRow> = Vec::with_capacity(self.batch_size.min(DEFAULT_BATCH_SIZE));

        while let Some(row) = source.next_row()? {
            batch.push(row);

            if batch.len() >= self.batch_size {
                insert_batch(&mut self.conn, &insert_sql, &batch)
                    .with_context(|| format!("Failed to insert batch into {}", schema.name))?;
                count += batch.len() as u64;
                ui.set_progress(source.position(), total, schema.name);
                batch.clear();
            }
        }

        // Insert remaining batch
        if !batch.is_empty() {
            insert_batch(&mut self.conn, &insert_sql, &batch)
                .with_context(|| format!("Failed to insert batch into {}", schema.name))?;
            count += batch.len() as u64;
        }

        ui.set_progress(total, total, schema.name);
        Ok(count)
    }

    /// Foreign key check, integrity check, VACUUM and ANALYZE, in that
    /// order. Failures are recorded and the next step still runs.
    pub fn maintain(&self, ui: &mut impl Ui) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        match self.foreign_key_check() {
            Ok(violations) => {
                for v in &violations {
                    ui.warn(format!(
                        "Foreign key violation: {} row {:?} -> {} (fk {})",
                        v.table, v.rowid, v.parent, v.fkid
                    ));
                }
                report.foreign_key_violations = violations;
            }
            Err(e) => report.errors.push(format!("foreign_key_check: {e}")),
        }

        match self.integrity_check() {
            Ok(lines) => {
                for line in lines.iter().filter(|l| *l != "ok") {
                    ui.warn(format!("Integrity check: {}", line));
                }
                report.integrity = lines;
            }
            Err(e) => report.errors.push(format!("integrity_check: {e}")),
        }

        for step in ["VACUUM", "ANALYZE"] {
            debug!("Running {}", step);
            if let Err(e) = self.conn.execute_batch(step) {
                report.errors.push(format!("{step}: {e}"));
            }
        }

        for error in &report.errors {
            ui.warn(error.clone());
        }

        report
    }

    fn foreign_key_check(&self) -> rusqlite::Result<Vec<ForeignKeyViolation>> {
        let mut stmt = self.conn.prepare("PRAGMA foreign_key_check")?;
        let rows = stmt.query_map([], |row| {
            Ok(ForeignKeyViolation {
                table: row.get(0)?,
                rowid: row.get(1)?,
                parent: row.get(2)?,
                fkid: row.get(3)?,
            })
        })?;
        rows.collect()
    }

    fn integrity_check(&self) -> rusqlite::Result<Vec<String>> {
        let mut stmt = self.conn.prepare("PRAGMA integrity_check")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        rows.collect()
    }

    /// Close the connection, surfacing any error from the final flush
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .context("Failed to close database")
    }
}

/// Positional insert: CSV columns are already in table order
fn insert_statement(schema: &TableSchema) -> String {
    let placeholders: Vec<&str> = schema.columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} VALUES ({})",
        schema.name,
        placeholders.join(", ")
    )
}

/// Insert a batch of rows inside a single transaction
fn insert_batch(conn: &mut Connection, sql: &str, batch: &[ParsedRow]) -> Result<()> {
    debug!("Running {} with {} rows", sql, batch.len());
    trace!(rows = ?batch, "batch contents");

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare_cached(sql)?;
        for row in batch {
            stmt.execute(params_from_iter(row.values.iter()))?;
        }
    }
    tx.commit()?;

    Ok(())
}

/// Validate the input directory, create the schema and load every table in
/// dependency order, then run maintenance.
pub fn import_directory(options: &ImportOptions, ui: &mut impl Ui) -> Result<ImportSummary> {
    options.validate()?;

    ui.set_phase(Phase::Validating);
    verify_load_plan()?;
    validate_input_dir(&options.directory)?;

    let mut writer =
        SqliteWriter::create(&options.output, options.force)?.with_batch_size(options.batch_size);

    ui.set_phase(Phase::CreatingSchema);
    writer.create_tables(ALL_TABLES)?;

    ui.set_phase(Phase::Importing);
    let mut summary = ImportSummary::default();

    for (i, schema) in ALL_TABLES.iter().enumerate() {
        let file_name = schema.source_file();
        ui.set_info(format!(
            "{} ({}/{}), batch size {}",
            file_name,
            i + 1,
            ALL_TABLES.len(),
            options.batch_size
        ));
        ui.log(format!("Importing {}", file_name));

        let count = writer.import_table(schema, &options.directory.join(&file_name), ui)?;
        ui.clear_progress();
        if options.verbose {
            ui.log(format!("{}: {} rows", schema.name, count));
        }
        summary.tables.push((schema.name.to_string(), count));
    }

    for file_name in IGNORED_FILES {
        ui.log(format!("Skipping {}", file_name));
    }

    ui.set_phase(Phase::Maintenance);
    ui.set_info(format!("{} rows in {} tables", summary.total_rows(), summary.tables.len()));
    summary.maintenance = writer.maintain(ui);
    writer.close()?;

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::FOOD;
    use crate::ui::SilentUi;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn memory_writer(batch_size: usize) -> SqliteWriter {
        let writer = SqliteWriter::with_connection(Connection::open_in_memory().unwrap())
            .unwrap()
            .with_batch_size(batch_size);
        writer.create_tables(ALL_TABLES).unwrap();
        writer
    }

    #[test]
    fn test_insert_statement_is_positional() {
        assert_eq!(
            insert_statement(&FOOD),
            "INSERT INTO food VALUES (?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_import_flushes_partial_batch() {
        let mut csv = NamedTempFile::new().unwrap();
        writeln!(csv, "fdc_id,data_type,description,food_category_id,publication_date").unwrap();
        for id in 1..=5 {
            writeln!(csv, "{id},sr_legacy_food,Food {id},,2019-04-01").unwrap();
        }

        let mut writer = memory_writer(2);
        let count = writer.import_table(&FOOD, csv.path(), &mut SilentUi::new()).unwrap();
        assert_eq!(count, 5);

        let nulls: i64 = writer
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM food WHERE food_category_id IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(nulls, 5);
    }

    #[test]
    fn test_check_constraint_fails_batch() {
        let mut csv = NamedTempFile::new().unwrap();
        writeln!(csv, "fdc_id,data_type,description,food_category_id,publication_date").unwrap();
        writeln!(csv, "1,foundation_food,Apple,5,April 2019").unwrap();

        let mut writer = memory_writer(10);
        let err = writer
            .import_table(&FOOD, csv.path(), &mut SilentUi::new())
            .unwrap_err();
        assert!(format!("{err:#}").contains("CHECK constraint failed"));
    }

    #[test]
    fn test_maintenance_on_clean_database() {
        let writer = memory_writer(10);
        let report = writer.maintain(&mut SilentUi::new());
        assert!(report.foreign_key_violations.is_empty());
        assert_eq!(report.integrity, vec!["ok".to_string()]);
        assert!(report.is_clean(), "{report:?}");
    }

    #[test]
    fn test_existing_output_requires_force() {
        let existing = NamedTempFile::new().unwrap();
        let err = SqliteWriter::create(existing.path(), false).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::OutputExists(_))
        ));

        SqliteWriter::create(existing.path(), true).unwrap();
    }
}
