use std::collections::HashSet;

/// Declared SQLite column affinity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Int,
    Real,
    Text,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Int => "INT",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }
}

/// Value constraint attached to a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnCheck {
    /// `YYYY-MM-DD`, or NULL
    Date,
    /// `YYYY`, or NULL
    Year,
    /// Value must be one of the listed literals
    OneOf(&'static [&'static str]),
}

/// Column definition
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub check: Option<ColumnCheck>,
}

impl Column {
    /// Create an optional (nullable) column
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            nullable: true,
            primary_key: false,
            unique: false,
            check: None,
        }
    }

    /// Create a `NOT NULL PRIMARY KEY` column
    pub const fn key(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            nullable: false,
            primary_key: true,
            ..Self::new(name, col_type)
        }
    }

    pub const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }

    pub const fn check(self, check: ColumnCheck) -> Self {
        Self {
            check: Some(check),
            ..self
        }
    }
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

impl ForeignKey {
    pub const fn new(column: &'static str, references_table: &'static str) -> Self {
        Self {
            column,
            references_table,
            references_column: "id",
        }
    }

    /// Reference the `food` table by its `fdc_id` key
    pub const fn food(column: &'static str) -> Self {
        Self {
            column,
            references_table: "food",
            references_column: "fdc_id",
        }
    }

    /// Override the referenced column
    pub const fn to(self, references_column: &'static str) -> Self {
        Self {
            references_column,
            ..self
        }
    }
}

/// Non-unique index definition
#[derive(Debug, Clone)]
pub struct Index {
    pub columns: &'static [&'static str],
}

impl Index {
    pub const fn on(columns: &'static [&'static str]) -> Self {
        Self { columns }
    }
}

/// Table schema definition. One table per source CSV, columns in CSV order.
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Table-level composite primary key; empty when a column carries the key
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    pub indexes: &'static [Index],
}

impl TableSchema {
    /// Get all tables this table depends on (FK parents)
    pub fn dependencies(&self) -> HashSet<&'static str> {
        self.foreign_keys
            .iter()
            .map(|fk| fk.references_table)
            .collect()
    }

    /// Name of the CSV file this table is loaded from
    pub fn source_file(&self) -> String {
        format!("{}.csv", self.name)
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}
