//! Query service
//!
//! [`RecommenderService`] answers read-only queries against an immutable
//! [`RecommenderModel`]. It holds no interior mutability, so one instance can
//! be shared across threads behind an `Arc` without locking.

use crate::catalog::ToolRecord;
use crate::filter::{AttributeFilter, Filter};
use crate::model::RecommenderModel;
use crate::stats::CatalogStats;
use crate::vector::cosine;
use crate::{Error, Result};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeSet;
use tracing::debug;

/// One tool in a query response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    #[serde(rename = "tool_name")]
    pub name: String,
    pub company: String,
    pub category: String,
    pub modality: String,
    pub open_source: bool,
    pub api_available: bool,
    pub website: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_status: Option<String>,
    /// Outer `None`: not reported by this query. Inner `None`: unknown year.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "release_year_field"
    )]
    pub release_year: Option<Option<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f32>,
}

// Lets `release_year` serialize as `null` when reported but unknown
mod release_year_field {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Option<i32>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(inner) => inner.serialize(s),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Option<i32>>, D::Error> {
        Option::<i32>::deserialize(d).map(Some)
    }
}

impl ToolSummary {
    fn from_record(tool: &ToolRecord) -> Self {
        Self {
            name: tool.tool_name.clone(),
            company: tool.company.clone(),
            category: tool.category.clone(),
            modality: tool.modality.clone(),
            open_source: tool.flags.open_source(),
            api_available: tool.flags.api_available(),
            website: tool.website.clone(),
            api_status: None,
            release_year: None,
            similarity_score: None,
        }
    }

    #[must_use]
    fn with_score(mut self, score: f32) -> Self {
        self.similarity_score = Some(score);
        self
    }

    #[must_use]
    fn with_release_year(mut self, tool: &ToolRecord) -> Self {
        self.release_year = Some(tool.release_year);
        self
    }

    #[must_use]
    fn with_api_status(mut self, tool: &ToolRecord) -> Self {
        self.api_status = Some(tool.api_status.clone());
        self
    }
}

fn require_non_blank(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{} must not be empty", what)));
    }
    Ok(())
}

pub struct RecommenderService {
    model: RecommenderModel,
}

impl RecommenderService {
    pub fn new(model: RecommenderModel) -> Self {
        Self { model }
    }

    #[inline]
    pub fn model(&self) -> &RecommenderModel {
        &self.model
    }

    #[inline]
    pub fn tool_count(&self) -> usize {
        self.model.catalog().len()
    }

    /// Rank (index, score) pairs by descending score, ties by catalog index
    fn rank(mut scored: Vec<(usize, f32)>) -> Vec<(usize, f32)> {
        scored.sort_by_key(|&(idx, score)| (Reverse(OrderedFloat(score)), idx));
        scored
    }

    fn take_filtered(
        &self,
        ranked: Vec<(usize, f32)>,
        n: usize,
        filters: &AttributeFilter,
    ) -> Vec<ToolSummary> {
        let catalog = self.model.catalog();
        ranked
            .into_iter()
            .filter_map(|(idx, score)| catalog.get(idx).map(|tool| (tool, score)))
            .filter(|(tool, _)| filters.matches(tool))
            .take(n)
            .map(|(tool, score)| ToolSummary::from_record(tool).with_score(score))
            .collect()
    }

    /// Tools most similar to the named tool, excluding the tool itself
    ///
    /// The name is matched case-insensitively and the first match wins.
    /// Returns fewer than `n` results when the filters exhaust the catalog.
    pub fn similar_to_item(
        &self,
        name: &str,
        n: usize,
        filters: &AttributeFilter,
    ) -> Result<Vec<ToolSummary>> {
        require_non_blank(name, "tool name")?;
        let target = self
            .model
            .catalog()
            .find_by_name(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        let scored = self
            .model
            .similarity()
            .row(target)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(idx, _)| idx != target)
            .collect();

        let results = self.take_filtered(Self::rank(scored), n, filters);
        debug!("similar_to_item({:?}) -> {} results", name, results.len());
        Ok(results)
    }

    /// Tools whose text block is closest to a free-text query
    ///
    /// The query goes through the vectorizer fitted at build time; items with
    /// no positive similarity are not returned.
    pub fn similar_to_text(
        &self,
        query: &str,
        n: usize,
        filters: &AttributeFilter,
    ) -> Result<Vec<ToolSummary>> {
        require_non_blank(query, "query")?;
        let query_vector = self.model.vectorizer().transform(query);

        let scored = (0..self.tool_count())
            .map(|idx| (idx, cosine(&query_vector, self.model.text_features(idx))))
            .filter(|&(_, score)| score > 0.0)
            .collect();

        let results = self.take_filtered(Self::rank(scored), n, filters);
        debug!("similar_to_text({:?}) -> {} results", query, results.len());
        Ok(results)
    }

    /// Tools in a category (case-insensitive), newest releases first
    ///
    /// Tools without a release date sort last; ties keep catalog order.
    pub fn by_category(
        &self,
        category: &str,
        n: usize,
        filters: &AttributeFilter,
    ) -> Result<Vec<ToolSummary>> {
        require_non_blank(category, "category")?;
        let needle = category.to_lowercase();
        let reference_year = self.model.config().reference_year;

        let mut matches: Vec<&ToolRecord> = self
            .model
            .catalog()
            .iter()
            .filter(|t| t.category.to_lowercase() == needle)
            .filter(|t| filters.matches(t))
            .collect();

        // stable sort
        matches.sort_by_key(|t| match t.years_since_release(reference_year) {
            Some(years) => (0, OrderedFloat(years)),
            None => (1, OrderedFloat(0.0)),
        });

        Ok(matches
            .into_iter()
            .take(n)
            .map(|t| ToolSummary::from_record(t).with_release_year(t))
            .collect())
    }

    /// Case-insensitive substring search over name, company, category and
    /// modality, in catalog order
    pub fn search(&self, query: &str, n: usize) -> Result<Vec<ToolSummary>> {
        require_non_blank(query, "query")?;
        let needle = query.to_lowercase();

        Ok(self
            .model
            .catalog()
            .iter()
            .filter(|t| {
                [&t.tool_name, &t.company, &t.category, &t.modality]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            })
            .take(n)
            .map(ToolSummary::from_record)
            .collect())
    }

    /// Every tool passing the filters, in catalog order
    ///
    /// `category` and `modality` conditions given as strings match
    /// case-insensitively here; every other condition is exact.
    pub fn list_tools(&self, filters: &AttributeFilter) -> Vec<ToolSummary> {
        let mut filters = filters.clone();
        let category = take_label(&mut filters, "category");
        let modality = take_label(&mut filters, "modality");

        self.model
            .catalog()
            .iter()
            .filter(|t| category.as_ref().map_or(true, |c| t.category.to_lowercase() == *c))
            .filter(|t| modality.as_ref().map_or(true, |m| t.modality.to_lowercase() == *m))
            .filter(|t| filters.matches(t))
            .map(|t| {
                ToolSummary::from_record(t)
                    .with_api_status(t)
                    .with_release_year(t)
            })
            .collect()
    }

    /// Sorted distinct non-empty categories
    pub fn categories(&self) -> Vec<String> {
        self.distinct(|t| &t.category)
    }

    /// Sorted distinct non-empty modalities
    pub fn modalities(&self) -> Vec<String> {
        self.distinct(|t| &t.modality)
    }

    fn distinct<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&ToolRecord) -> &String,
    {
        self.model
            .catalog()
            .iter()
            .map(field)
            .filter(|v| !v.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn statistics(&self) -> CatalogStats {
        CatalogStats::compute(self.model.catalog())
    }
}

fn take_label(filters: &mut AttributeFilter, field: &str) -> Option<String> {
    match filters.remove(field) {
        Some(serde_json::Value::String(s)) => Some(s.to_lowercase()),
        Some(other) => {
            filters.insert(field, other);
            None
        }
        None => None,
    }
}
