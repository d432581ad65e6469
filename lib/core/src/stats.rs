use crate::catalog::Catalog;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Aggregate statistics over the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_tools: usize,
    pub total_companies: usize,
    pub open_source_count: usize,
    pub api_available_count: usize,
    /// Per-category counts; items without a category count under `""`
    pub categories: BTreeMap<String, usize>,
    pub modalities: BTreeMap<String, usize>,
    /// Items without a release year are not counted
    pub releases_by_year: BTreeMap<i32, usize>,
}

impl CatalogStats {
    pub fn compute(catalog: &Catalog) -> Self {
        let mut companies = HashSet::new();
        let mut categories = BTreeMap::new();
        let mut modalities = BTreeMap::new();
        let mut releases_by_year = BTreeMap::new();
        let mut open_source_count = 0;
        let mut api_available_count = 0;

        for tool in catalog.iter() {
            if !tool.company.is_empty() {
                companies.insert(tool.company.as_str());
            }
            if tool.flags.open_source() {
                open_source_count += 1;
            }
            if tool.flags.api_available() {
                api_available_count += 1;
            }
            *categories.entry(tool.category.clone()).or_insert(0) += 1;
            *modalities.entry(tool.modality.clone()).or_insert(0) += 1;
            if let Some(year) = tool.release_year {
                *releases_by_year.entry(year).or_insert(0) += 1;
            }
        }

        Self {
            total_tools: catalog.len(),
            total_companies: companies.len(),
            open_source_count,
            api_available_count,
            categories,
            modalities,
            releases_by_year,
        }
    }
}
