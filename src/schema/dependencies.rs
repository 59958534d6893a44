use super::tables::{get_table, table_names, ALL_TABLES};
use super::types::TableSchema;
use crate::error::ImportError;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Check that every foreign-key parent is loaded before the tables that
/// reference it. Parents outside `tables` are not checked.
pub fn validate_load_order(tables: &[&TableSchema]) -> Result<(), ImportError> {
    let names: HashSet<&str> = tables.iter().map(|t| t.name).collect();
    let mut loaded: HashSet<&str> = HashSet::new();

    for table in tables {
        for parent in table.dependencies() {
            if parent != table.name && names.contains(parent) && !loaded.contains(parent) {
                return Err(ImportError::UnorderedLoad {
                    table: table.name.to_string(),
                    parent: parent.to_string(),
                });
            }
        }
        loaded.insert(table.name);
    }

    Ok(())
}

/// Check the fixed load order before an import: the dependency graph must
/// resolve (no cycles) to the same set of tables, and `ALL_TABLES` must load
/// every parent before its children.
pub fn verify_load_plan() -> anyhow::Result<()> {
    let resolved = DependencyResolver::new()
        .order(&table_names())
        .map_err(anyhow::Error::msg)?;

    let resolved_names: BTreeSet<&str> = resolved.iter().map(|t| t.name).collect();
    let listed_names: BTreeSet<&str> = ALL_TABLES.iter().map(|t| t.name).collect();
    anyhow::ensure!(
        resolved_names == listed_names && resolved.len() == ALL_TABLES.len(),
        "resolved load order does not cover the table list"
    );

    validate_load_order(&resolved)?;
    validate_load_order(ALL_TABLES)?;
    Ok(())
}

/// Resolves table dependencies into a load order
pub struct DependencyResolver {
    /// Map of table name -> tables it depends on
    deps: HashMap<&'static str, HashSet<&'static str>>,
}

impl DependencyResolver {
    pub fn new() -> Self {
        let deps = ALL_TABLES
            .iter()
            .map(|table| (table.name, table.dependencies()))
            .collect();

        Self { deps }
    }

    /// Return the given tables in dependency order (parents before children).
    /// Independent tables keep a stable, alphabetical relative order.
    pub fn order(&self, requested: &[&str]) -> Result<Vec<&'static TableSchema>, String> {
        for name in requested {
            if get_table(name).is_none() {
                return Err(format!("Unknown table: {}", name));
            }
        }

        let included: BTreeSet<&str> = requested.iter().copied().collect();
        let mut result = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut temp_visited: HashSet<&str> = HashSet::new();

        for table_name in &included {
            if !visited.contains(table_name) {
                self.visit(
                    table_name,
                    &included,
                    &mut visited,
                    &mut temp_visited,
                    &mut result,
                )?;
            }
        }

        Ok(result)
    }

    fn visit<'a>(
        &self,
        name: &'a str,
        included: &BTreeSet<&'a str>,
        visited: &mut HashSet<&'a str>,
        temp_visited: &mut HashSet<&'a str>,
        result: &mut Vec<&'static TableSchema>,
    ) -> Result<(), String> {
        if temp_visited.contains(name) {
            return Err(format!("Circular dependency detected at: {}", name));
        }
        if visited.contains(name) {
            return Ok(());
        }

        temp_visited.insert(name);

        if let Some(deps) = self.deps.get(name) {
            let mut deps: Vec<_> = deps.iter().copied().collect();
            deps.sort_unstable();
            for dep in deps {
                if dep != name && included.contains(dep) {
                    self.visit(dep, included, visited, temp_visited, result)?;
                }
            }
        }

        temp_visited.remove(name);
        visited.insert(name);

        if let Some(table) = get_table(name) {
            result.push(table);
        }

        Ok(())
    }
}

impl Default for DependencyResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::tables::{table_names, FOOD, FOOD_PORTION, MEASURE_UNIT};

    #[test]
    fn test_load_order_is_dependency_respecting() {
        validate_load_order(ALL_TABLES).unwrap();
    }

    #[test]
    fn test_load_plan_verifies() {
        verify_load_plan().unwrap();
    }

    #[test]
    fn test_child_before_parent_is_rejected() {
        let err = validate_load_order(&[&FOOD_PORTION, &FOOD, &MEASURE_UNIT]).unwrap_err();
        match err {
            ImportError::UnorderedLoad { table, parent } => {
                assert_eq!(table, "food_portion");
                assert!(parent == "food" || parent == "measure_unit");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolver_puts_parents_first() {
        let resolver = DependencyResolver::new();
        let tables = resolver
            .order(&["sub_sample_result", "food_nutrient", "lab_method"])
            .unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name).collect();

        let result_pos = names.iter().position(|&n| n == "sub_sample_result").unwrap();
        let nutrient_pos = names.iter().position(|&n| n == "food_nutrient").unwrap();
        let method_pos = names.iter().position(|&n| n == "lab_method").unwrap();
        assert!(nutrient_pos < result_pos);
        assert!(method_pos < result_pos);
    }

    #[test]
    fn test_resolved_full_order_validates() {
        let resolver = DependencyResolver::new();
        let tables = resolver.order(&table_names()).unwrap();
        assert_eq!(tables.len(), ALL_TABLES.len());
        validate_load_order(&tables).unwrap();
    }

    #[test]
    fn test_unknown_table_error() {
        let resolver = DependencyResolver::new();
        assert!(resolver.order(&["nonexistent"]).is_err());
    }
}
