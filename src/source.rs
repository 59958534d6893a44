//! Input directory inventory
//!
//! An export is only accepted when its CSV files are exactly the known set,
//! ignored files included, so partial or mismatched downloads fail early.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::ImportError;
use crate::schema::expected_files;

/// List the `*.csv` file names in a directory
pub fn list_csv_files(dir: &Path) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();

    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.insert(name.to_string());
        }
    }

    Ok(files)
}

/// Compare a set of found file names against the expected export contents
pub fn check_file_set(found: &BTreeSet<String>) -> Result<(), ImportError> {
    let expected: BTreeSet<String> = expected_files().into_iter().collect();

    let missing: Vec<String> = expected.difference(found).cloned().collect();
    let unexpected: Vec<String> = found.difference(&expected).cloned().collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(ImportError::FileSetMismatch {
            missing,
            unexpected,
        })
    }
}

/// Fail unless `dir` holds exactly the expected CSV files
pub fn validate_input_dir(dir: &Path) -> Result<()> {
    let found = list_csv_files(dir)?;
    check_file_set(&found)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_set() -> BTreeSet<String> {
        expected_files().into_iter().collect()
    }

    #[test]
    fn test_exact_set_passes() {
        check_file_set(&full_set()).unwrap();
    }

    #[test]
    fn test_missing_and_unexpected_reported() {
        let mut found = full_set();
        found.remove("nutrient.csv");
        found.insert("acquisition_samples.csv".to_string());

        match check_file_set(&found) {
            Err(ImportError::FileSetMismatch {
                missing,
                unexpected,
            }) => {
                assert_eq!(missing, vec!["nutrient.csv".to_string()]);
                assert_eq!(unexpected, vec!["acquisition_samples.csv".to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_ignored_files_are_required() {
        let mut found = full_set();
        found.remove("fndds_derivation.csv");
        assert!(check_file_set(&found).is_err());
    }

    #[test]
    fn test_only_csv_files_listed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("food.csv"), "fdc_id\n").unwrap();
        fs::write(dir.path().join("README.pdf"), "").unwrap();
        fs::create_dir(dir.path().join("nested.csv")).unwrap();

        let files = list_csv_files(dir.path()).unwrap();
        assert_eq!(files.into_iter().collect::<Vec<_>>(), vec!["food.csv"]);
    }
}
