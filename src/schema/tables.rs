//! Table schema definitions for the USDA FoodData Central CSV export
//!
//! Columns are listed in the same order as the CSV files; rows are inserted
//! positionally. Several foreign keys and checks that the field descriptions
//! imply are left out on purpose because the published data violates them.

use super::types::*;

const DATE: ColumnCheck = ColumnCheck::Date;
const YEAR: ColumnCheck = ColumnCheck::Year;

// =============================================================================
// Independent Tables (no FK dependencies)
// =============================================================================

pub static FOOD_CATEGORY: TableSchema = TableSchema {
    name: "food_category",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("code", ColumnType::Text),
        Column::new("description", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static FOOD: TableSchema = TableSchema {
    name: "food",
    columns: &[
        Column::key("fdc_id", ColumnType::Int),
        Column::new("data_type", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        // Not a foreign key: references categories missing from food_category
        Column::new("food_category_id", ColumnType::Int),
        Column::new("publication_date", ColumnType::Text).check(DATE),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[Index::on(&["data_type"]), Index::on(&["food_category_id"])],
};

pub static NUTRIENT: TableSchema = TableSchema {
    name: "nutrient",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("name", ColumnType::Text),
        Column::new("unit_name", ColumnType::Text),
        Column::new("nutrient_nbr", ColumnType::Int).unique(),
        Column::new("rank", ColumnType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static FOOD_NUTRIENT_SOURCE: TableSchema = TableSchema {
    name: "food_nutrient_source",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("code", ColumnType::Int).unique(),
        Column::new("description", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static MEASURE_UNIT: TableSchema = TableSchema {
    name: "measure_unit",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("name", ColumnType::Text).unique(),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static LAB_METHOD: TableSchema = TableSchema {
    name: "lab_method",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("description", ColumnType::Text),
        Column::new("technique", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static WWEIA_FOOD_CATEGORY: TableSchema = TableSchema {
    name: "wweia_food_category",
    columns: &[
        Column::key("wweia_food_category_code", ColumnType::Int),
        Column::new("wweia_food_category_description", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static AGRICULTURAL_ACQUISITION: TableSchema = TableSchema {
    name: "agricultural_acquisition",
    columns: &[
        Column::key("fdc_id", ColumnType::Int),
        Column::new("acquisition_date", ColumnType::Text).check(DATE),
        Column::new("market_class", ColumnType::Text),
        Column::new("treatment", ColumnType::Text),
        Column::new("state", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static FOOD_ATTRIBUTE_TYPE: TableSchema = TableSchema {
    name: "food_attribute_type",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("name", ColumnType::Text),
        Column::new("description", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static FOOD_CALORIE_CONVERSION_FACTOR: TableSchema = TableSchema {
    name: "food_calorie_conversion_factor",
    columns: &[
        // Not a foreign key: dangling conversion factor ids in the export
        Column::key("food_nutrient_conversion_factor_id", ColumnType::Int),
        Column::new("protein_value", ColumnType::Real),
        Column::new("fat_value", ColumnType::Real),
        Column::new("carbohydrate_value", ColumnType::Real),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[],
};

pub static FOOD_NUTRIENT: TableSchema = TableSchema {
    name: "food_nutrient",
    columns: &[
        Column::key("id", ColumnType::Int),
        // fdc_id, nutrient_id and derivation_id all have dangling references
        Column::new("fdc_id", ColumnType::Int),
        Column::new("nutrient_id", ColumnType::Int),
        Column::new("amount", ColumnType::Real),
        Column::new("data_points", ColumnType::Int),
        Column::new("derivation_id", ColumnType::Int),
        Column::new("min", ColumnType::Real),
        Column::new("max", ColumnType::Real),
        Column::new("median", ColumnType::Real),
        Column::new("loq", ColumnType::Real),
        Column::new("footnote", ColumnType::Text),
        Column::new("min_year_acquired", ColumnType::Text).check(YEAR),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[
        Index::on(&["fdc_id"]),
        Index::on(&["nutrient_id"]),
        Index::on(&["derivation_id"]),
    ],
};

pub static SUB_SAMPLE_FOOD: TableSchema = TableSchema {
    name: "sub_sample_food",
    columns: &[
        // Both columns reference foods that are not in the export
        Column::key("fdc_id", ColumnType::Int),
        Column::new("fdc_id_of_sample_food", ColumnType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[],
    indexes: &[Index::on(&["fdc_id_of_sample_food"])],
};

// =============================================================================
// Tables referencing food
// =============================================================================

pub static FOOD_NUTRIENT_CONVERSION_FACTOR: TableSchema = TableSchema {
    name: "food_nutrient_conversion_factor",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("fdc_id", ColumnType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::food("fdc_id")],
    indexes: &[Index::on(&["fdc_id"])],
};

pub static ACQUISITION_SAMPLE: TableSchema = TableSchema {
    name: "acquisition_sample",
    columns: &[
        Column::new("fdc_id_of_sample_food", ColumnType::Int),
        Column::new("fdc_id_of_acquisition_food", ColumnType::Int),
    ],
    primary_key: &["fdc_id_of_sample_food", "fdc_id_of_acquisition_food"],
    foreign_keys: &[
        ForeignKey::food("fdc_id_of_sample_food"),
        ForeignKey::food("fdc_id_of_acquisition_food"),
    ],
    indexes: &[],
};

pub static BRANDED_FOOD: TableSchema = TableSchema {
    name: "branded_food",
    columns: &[
        Column::key("fdc_id", ColumnType::Int),
        Column::new("brand_owner", ColumnType::Text),
        Column::new("brand_name", ColumnType::Text),
        Column::new("subbrand_name", ColumnType::Text),
        Column::new("gtin_upc", ColumnType::Text),
        Column::new("ingredients", ColumnType::Text),
        Column::new("not_a_significant_source_of", ColumnType::Text),
        Column::new("serving_size", ColumnType::Real),
        // Units, sources and dates are free text in practice, so no checks
        Column::new("serving_size_unit", ColumnType::Text),
        Column::new("household_serving_fulltext", ColumnType::Text),
        Column::new("branded_food_category", ColumnType::Text),
        Column::new("data_source", ColumnType::Text),
        Column::new("package_weight", ColumnType::Text),
        Column::new("modified_date", ColumnType::Text),
        Column::new("available_date", ColumnType::Text),
        Column::new("market_country", ColumnType::Text),
        Column::new("discontinued_date", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::food("fdc_id")],
    indexes: &[
        Index::on(&["gtin_upc"]),
        Index::on(&["branded_food_category"]),
    ],
};

pub static FOOD_ATTRIBUTE: TableSchema = TableSchema {
    name: "food_attribute",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("fdc_id", ColumnType::Int),
        Column::new("seq_num", ColumnType::Int),
        Column::new("food_attribute_type_id", ColumnType::Int),
        Column::new("name", ColumnType::Text),
        Column::new("value", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::food("fdc_id"),
        ForeignKey::new("food_attribute_type_id", "food_attribute_type"),
    ],
    indexes: &[
        Index::on(&["fdc_id"]),
        Index::on(&["food_attribute_type_id"]),
    ],
};

pub static FOOD_COMPONENT: TableSchema = TableSchema {
    name: "food_component",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("fdc_id", ColumnType::Int),
        Column::new("name", ColumnType::Text),
        Column::new("pct_weight", ColumnType::Real),
        Column::new("is_refuse", ColumnType::Text).check(ColumnCheck::OneOf(&["Y", "N"])),
        Column::new("gram_weight", ColumnType::Real),
        Column::new("data_points", ColumnType::Int),
        Column::new("min_year_acquired", ColumnType::Text).check(YEAR),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::food("fdc_id")],
    indexes: &[Index::on(&["fdc_id"])],
};

pub static FOOD_NUTRIENT_DERIVATION: TableSchema = TableSchema {
    name: "food_nutrient_derivation",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("code", ColumnType::Text),
        Column::new("description", ColumnType::Text),
        Column::new("source_id", ColumnType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("source_id", "food_nutrient_source")],
    indexes: &[Index::on(&["source_id"])],
};

pub static FOOD_PORTION: TableSchema = TableSchema {
    name: "food_portion",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("fdc_id", ColumnType::Int),
        Column::new("seq_num", ColumnType::Int),
        Column::new("amount", ColumnType::Real),
        Column::new("measure_unit_id", ColumnType::Int),
        Column::new("portion_description", ColumnType::Text),
        Column::new("modifier", ColumnType::Text),
        Column::new("gram_weight", ColumnType::Real),
        Column::new("data_points", ColumnType::Int),
        Column::new("footnote", ColumnType::Text),
        Column::new("min_year_acquired", ColumnType::Text).check(YEAR),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::food("fdc_id"),
        ForeignKey::new("measure_unit_id", "measure_unit"),
    ],
    indexes: &[Index::on(&["fdc_id"]), Index::on(&["measure_unit_id"])],
};

pub static FOOD_PROTEIN_CONVERSION_FACTOR: TableSchema = TableSchema {
    name: "food_protein_conversion_factor",
    columns: &[
        Column::key("food_nutrient_conversion_factor_id", ColumnType::Int),
        Column::new("value", ColumnType::Real),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new(
        "food_nutrient_conversion_factor_id",
        "food_nutrient_conversion_factor",
    )],
    indexes: &[],
};

pub static FOUNDATION_FOOD: TableSchema = TableSchema {
    name: "foundation_food",
    columns: &[
        Column::key("fdc_id", ColumnType::Int),
        Column::new("NDB_number", ColumnType::Int).unique(),
        Column::new("footnote", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::food("fdc_id")],
    indexes: &[],
};

pub static SR_LEGACY_FOOD: TableSchema = TableSchema {
    name: "sr_legacy_food",
    columns: &[
        Column::key("fdc_id", ColumnType::Int),
        Column::new("NDB_number", ColumnType::Int).unique(),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::food("fdc_id")],
    indexes: &[],
};

pub static SURVEY_FNDDS_FOOD: TableSchema = TableSchema {
    name: "survey_fndds_food",
    columns: &[
        Column::key("fdc_id", ColumnType::Int),
        Column::new("food_code", ColumnType::Int).unique(),
        Column::new("wweia_category_code", ColumnType::Int),
        Column::new("start_date", ColumnType::Text).check(DATE),
        Column::new("end_date", ColumnType::Text).check(DATE),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::food("fdc_id"),
        ForeignKey::new("wweia_category_code", "wweia_food_category")
            .to("wweia_food_category_code"),
    ],
    indexes: &[Index::on(&["wweia_category_code"])],
};

pub static INPUT_FOOD: TableSchema = TableSchema {
    name: "input_food",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("fdc_id", ColumnType::Int),
        Column::new("fdc_id_of_input_food", ColumnType::Int),
        Column::new("seq_num", ColumnType::Int),
        Column::new("amount", ColumnType::Real),
        // SR code and portion code are informational, not keys
        Column::new("sr_code", ColumnType::Int),
        Column::new("sr_description", ColumnType::Text),
        Column::new("unit", ColumnType::Text),
        Column::new("portion_code", ColumnType::Int),
        Column::new("portion_description", ColumnType::Text),
        Column::new("gram_weight", ColumnType::Real),
        Column::new("retention_code", ColumnType::Int),
        Column::new("survey_flag", ColumnType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::food("fdc_id"),
        ForeignKey::food("fdc_id_of_input_food"),
    ],
    indexes: &[Index::on(&["fdc_id"]), Index::on(&["fdc_id_of_input_food"])],
};

pub static LAB_METHOD_CODE: TableSchema = TableSchema {
    name: "lab_method_code",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("lab_method_id", ColumnType::Int),
        Column::new("code", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("lab_method_id", "lab_method")],
    indexes: &[Index::on(&["lab_method_id"])],
};

pub static LAB_METHOD_NUTRIENT: TableSchema = TableSchema {
    name: "lab_method_nutrient",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("lab_method_id", ColumnType::Int),
        // Not a foreign key: some nutrient ids are missing from nutrient
        Column::new("nutrient_id", ColumnType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("lab_method_id", "lab_method")],
    indexes: &[Index::on(&["lab_method_id"])],
};

pub static MARKET_ACQUISITION: TableSchema = TableSchema {
    name: "market_acquisition",
    columns: &[
        Column::key("fdc_id", ColumnType::Int),
        Column::new("brand_description", ColumnType::Text),
        Column::new("expiration_date", ColumnType::Text).check(DATE),
        Column::new("label_weight", ColumnType::Real),
        Column::new("location", ColumnType::Text),
        Column::new("acquisition_date", ColumnType::Text).check(DATE),
        Column::new("sales_type", ColumnType::Text),
        Column::new("sample_lot_nbr", ColumnType::Int),
        Column::new("sell_by_date", ColumnType::Text).check(DATE),
        Column::new("store_city", ColumnType::Text),
        Column::new("store_name", ColumnType::Text),
        Column::new("store_state", ColumnType::Text),
        Column::new("upc_code", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::food("fdc_id")],
    indexes: &[],
};

pub static NUTRIENT_INCOMING_NAME: TableSchema = TableSchema {
    name: "nutrient_incoming_name",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("name", ColumnType::Text),
        Column::new("nutrient_id", ColumnType::Int),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("nutrient_id", "nutrient")],
    indexes: &[Index::on(&["nutrient_id"])],
};

pub static RETENTION_FACTOR: TableSchema = TableSchema {
    name: "retention_factor",
    columns: &[
        Column::key("id", ColumnType::Int),
        Column::new("code", ColumnType::Text),
        Column::new("food_group_id", ColumnType::Int),
        Column::new("description", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("food_group_id", "food_category")],
    indexes: &[Index::on(&["food_group_id"])],
};

pub static SAMPLE_FOOD: TableSchema = TableSchema {
    name: "sample_food",
    columns: &[Column::key("fdc_id", ColumnType::Int)],
    primary_key: &[],
    foreign_keys: &[ForeignKey::food("fdc_id")],
    indexes: &[],
};

pub static SUB_SAMPLE_RESULT: TableSchema = TableSchema {
    name: "sub_sample_result",
    columns: &[
        Column::key("food_nutrient_id", ColumnType::Int),
        Column::new("adjusted_amount", ColumnType::Real),
        Column::new("lab_method_id", ColumnType::Int),
        Column::new("nutrient_name", ColumnType::Text),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("food_nutrient_id", "food_nutrient"),
        ForeignKey::new("lab_method_id", "lab_method"),
    ],
    indexes: &[Index::on(&["lab_method_id"])],
};

// =============================================================================
// Load order and source files
// =============================================================================

/// All tables in load order: every FK parent precedes its children
pub static ALL_TABLES: &[&TableSchema] = &[
    &FOOD_CATEGORY,
    &FOOD,
    &FOOD_NUTRIENT_CONVERSION_FACTOR,
    &NUTRIENT,
    &FOOD_NUTRIENT_SOURCE,
    &MEASURE_UNIT,
    &LAB_METHOD,
    &WWEIA_FOOD_CATEGORY,
    &ACQUISITION_SAMPLE,
    &AGRICULTURAL_ACQUISITION,
    &BRANDED_FOOD,
    &FOOD_ATTRIBUTE_TYPE,
    &FOOD_ATTRIBUTE,
    &FOOD_CALORIE_CONVERSION_FACTOR,
    &FOOD_COMPONENT,
    &FOOD_NUTRIENT_DERIVATION,
    &FOOD_PORTION,
    &FOOD_PROTEIN_CONVERSION_FACTOR,
    &FOUNDATION_FOOD,
    &SR_LEGACY_FOOD,
    &SURVEY_FNDDS_FOOD,
    &INPUT_FOOD,
    &LAB_METHOD_CODE,
    &LAB_METHOD_NUTRIENT,
    &MARKET_ACQUISITION,
    &NUTRIENT_INCOMING_NAME,
    &RETENTION_FACTOR,
    &SAMPLE_FOOD,
    &SUB_SAMPLE_FOOD,
    &FOOD_NUTRIENT,
    &SUB_SAMPLE_RESULT,
];

/// Row-count manifest shipped with every export
pub const MANIFEST_FILE: &str = "all_downloaded_table_record_counts.csv";

/// Files that must be present in the export but are not loaded into a table
pub const IGNORED_FILES: &[&str] = &[
    MANIFEST_FILE,
    "fndds_derivation.csv",
    "fndds_ingredient_nutrient_value.csv",
    "food_update_log_entry.csv",
];

/// Get a table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names in load order
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}

/// Every CSV file name an export directory must contain, loaded or not
pub fn expected_files() -> Vec<String> {
    ALL_TABLES
        .iter()
        .map(|t| t.source_file())
        .chain(IGNORED_FILES.iter().map(|f| f.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_names_are_unique() {
        let names: HashSet<_> = table_names().into_iter().collect();
        assert_eq!(names.len(), ALL_TABLES.len());
        assert_eq!(ALL_TABLES.len(), 31);
    }

    #[test]
    fn test_expected_files_include_ignored() {
        let files = expected_files();
        assert_eq!(files.len(), 35);
        assert!(files.contains(&"food.csv".to_string()));
        assert!(files.contains(&MANIFEST_FILE.to_string()));
        assert!(files.contains(&"food_update_log_entry.csv".to_string()));
    }

    #[test]
    fn test_foreign_keys_name_real_columns() {
        for table in ALL_TABLES {
            let columns = table.column_names();
            for fk in table.foreign_keys {
                assert!(columns.contains(&fk.column), "{}.{}", table.name, fk.column);
                let parent = get_table(fk.references_table)
                    .unwrap_or_else(|| panic!("unknown parent {}", fk.references_table));
                assert!(
                    parent.column_names().contains(&fk.references_column),
                    "{} -> {}.{}",
                    table.name,
                    parent.name,
                    fk.references_column
                );
            }
            for index in table.indexes {
                for col in index.columns {
                    assert!(columns.contains(col), "index {}.{}", table.name, col);
                }
            }
        }
    }
}
