use std::path::PathBuf;

use crate::error::ImportError;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_OUTPUT: &str = "usda_food_data.db";

/// Settings for one import run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Directory holding the export's CSV files
    pub directory: PathBuf,
    /// SQLite database to create
    pub output: PathBuf,
    /// Rows per insert batch; only affects performance
    pub batch_size: usize,
    /// Replace an existing output file
    pub force: bool,
    /// Log every insert batch and verified count
    pub verbose: bool,
}

impl ImportOptions {
    pub fn new(directory: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            output: output.into(),
            ..Self::default()
        }
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn validate(&self) -> Result<(), ImportError> {
        if self.batch_size == 0 {
            return Err(ImportError::InvalidBatchSize(self.batch_size));
        }
        Ok(())
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_OUTPUT),
            batch_size: DEFAULT_BATCH_SIZE,
            force: false,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ImportOptions::default();
        assert_eq!(opts.batch_size, 1000);
        assert_eq!(opts.output, PathBuf::from("usda_food_data.db"));
        assert!(!opts.force);
        opts.validate().unwrap();
    }

    #[test]
    fn test_zero_batch_rejected() {
        let opts = ImportOptions::new(".", "out.db").batch_size(0);
        assert!(matches!(opts.validate(), Err(ImportError::InvalidBatchSize(0))));
    }
}
