use crate::schema::{ColumnCheck, TableSchema};

const DATE_GLOB: &str = "[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]";
const YEAR_GLOB: &str = "[0-9][0-9][0-9][0-9]";

fn check_clause(column: &str, check: &ColumnCheck) -> String {
    match check {
        ColumnCheck::Date => format!(
            "CHECK({column} IS NULL OR {column} GLOB '{DATE_GLOB}' IS 1)"
        ),
        ColumnCheck::Year => format!(
            "CHECK({column} IS NULL OR {column} GLOB '{YEAR_GLOB}' IS 1)"
        ),
        ColumnCheck::OneOf(values) => {
            let list: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
            format!("CHECK({column} IN ({}))", list.join(", "))
        }
    }
}

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let mut def = format!("    \"{}\" {}", col.name, col.col_type.sql());
        if !col.nullable {
            def.push_str(" NOT NULL");
        }
        if col.primary_key {
            def.push_str(" PRIMARY KEY");
        }
        if col.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(check) = &col.check {
            def.push(' ');
            def.push_str(&check_clause(col.name, check));
        }
        columns.push(def);
    }

    if !schema.primary_key.is_empty() {
        columns.push(format!("    PRIMARY KEY ({})", schema.primary_key.join(", ")));
    }

    // Add foreign key constraints
    for fk in schema.foreign_keys {
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({})",
            fk.column, fk.references_table, fk.references_column
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for the table's declared indexes
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .indexes
        .iter()
        .map(|index| {
            format!(
                "CREATE INDEX idx_{}_{} ON {} ({})",
                schema.name,
                index.columns.join("_"),
                schema.name,
                index.columns.join(", ")
            )
        })
        .collect()
}

/// The full DDL script for the given tables, indexes after each table
pub fn generate_schema_script(schemas: &[&TableSchema]) -> String {
    let mut script = String::new();
    for schema in schemas {
        script.push_str(&generate_create_table(schema));
        script.push_str(";\n");
        for index in generate_indexes(schema) {
            script.push_str(&index);
            script.push_str(";\n");
        }
        script.push('\n');
    }
    script
}
