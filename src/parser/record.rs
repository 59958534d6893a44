use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::Path;

use super::strict::StrictQuotes;
use crate::error::ImportError;

/// A parsed row ready for positional insertion
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub values: Vec<Option<String>>,
}

/// Empty CSV fields are stored as NULL, everything else as the raw text
pub fn normalize_field(field: &str) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field.to_string())
    }
}

/// Convert a CSV record into a row, without any type coercion
pub fn parse_record(record: &StringRecord) -> ParsedRow {
    ParsedRow {
        values: record.iter().map(normalize_field).collect(),
    }
}

/// Streams the data rows of one export CSV, skipping its header
pub struct CsvSource {
    reader: csv::Reader<StrictQuotes<File>>,
    record: StringRecord,
    file_name: String,
    expected_columns: usize,
    total_bytes: u64,
}

impl CsvSource {
    pub fn open(path: &Path, expected_columns: usize) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Failed to open: {:?}", path))?;
        let total_bytes = file.metadata().map(|m| m.len()).unwrap_or(0);

        let reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(StrictQuotes::new(file));

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            reader,
            record: StringRecord::new(),
            file_name,
            expected_columns,
            total_bytes,
        })
    }

    /// Size of the underlying file
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Bytes consumed so far
    pub fn position(&self) -> u64 {
        self.reader.position().byte()
    }

    /// Read the next data row. Malformed CSV and rows whose width does not
    /// match the table are errors.
    pub fn next_row(&mut self) -> Result<Option<ParsedRow>> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .with_context(|| format!("Failed to parse record in {}", self.file_name))?;
        if !more {
            return Ok(None);
        }

        if self.record.len() != self.expected_columns {
            let line = self.record.position().map(|p| p.line()).unwrap_or(0);
            return Err(ImportError::ColumnCount {
                file: self.file_name.clone(),
                line,
                expected: self.expected_columns,
                found: self.record.len(),
            }
            .into());
        }

        Ok(Some(parse_record(&self.record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_normalize_field() {
        assert_eq!(normalize_field(""), None);
        assert_eq!(normalize_field(" "), Some(" ".to_string()));
        assert_eq!(normalize_field("0"), Some("0".to_string()));
    }

    #[test]
    fn test_header_skipped_and_empty_fields_null() {
        let file = csv_file("\"fdc_id\",\"data_type\",\"description\"\n\"1\",\"\",\"Apple, raw\"\n");
        let mut source = CsvSource::open(file.path(), 3).unwrap();

        let row = source.next_row().unwrap().unwrap();
        assert_eq!(
            row.values,
            vec![Some("1".to_string()), None, Some("Apple, raw".to_string())]
        );
        assert!(source.next_row().unwrap().is_none());
    }

    #[test]
    fn test_quoted_newline_is_one_field() {
        let file = csv_file("id,footnote\n7,\"line one\nline two\"\n");
        let mut source = CsvSource::open(file.path(), 2).unwrap();
        let row = source.next_row().unwrap().unwrap();
        assert_eq!(row.values[1].as_deref(), Some("line one\nline two"));
    }

    #[test]
    fn test_ragged_rows_fail() {
        let file = csv_file("a,b,c\n1,2,3\n4,5\n");
        let mut source = CsvSource::open(file.path(), 3).unwrap();
        assert!(source.next_row().unwrap().is_some());
        assert!(source.next_row().is_err());
    }

    #[test]
    fn test_text_after_closing_quote_fails() {
        let file = csv_file("a,b,c\n1,\"abc\"def,x\n");
        let mut source = CsvSource::open(file.path(), 3).unwrap();
        let err = source.next_row().unwrap_err();
        assert!(format!("{err:#}").contains("',' expected after '\"'"));
    }

    #[test]
    fn test_unterminated_quote_fails() {
        let file = csv_file("a,b,c\n1,2,\"unterminated\n");
        let mut source = CsvSource::open(file.path(), 3).unwrap();
        let err = source.next_row().unwrap_err();
        assert!(format!("{err:#}").contains("unexpected end of data"));
    }

    #[test]
    fn test_width_must_match_table() {
        let file = csv_file("a,b\n1,2\n");
        let mut source = CsvSource::open(file.path(), 3).unwrap();
        let err = source.next_row().unwrap_err();
        let err = err.downcast_ref::<ImportError>().unwrap();
        assert!(matches!(
            err,
            ImportError::ColumnCount { expected: 3, found: 2, .. }
        ));
    }
}
