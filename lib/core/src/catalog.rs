//! Catalog records
//!
//! One validated [`ToolRecord`] per row of the source CSV. Cells are read as
//! optional strings and coerced once here, so the rest of the crate works with
//! plain typed fields. Missing text cells become `""` and missing flags become
//! `false`; malformed cells abort the load.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Binary attribute columns, in feature-vector order
pub const BINARY_COLUMNS: [&str; 12] = [
    "open_source",
    "api_available",
    "mod_text",
    "mod_image",
    "mod_video",
    "mod_audio",
    "mod_code",
    "mod_design",
    "mod_infra",
    "mod_productivity",
    "mod_safety",
    "mod_multimodal",
];

/// Binary capability flags of a tool, indexed like [`BINARY_COLUMNS`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFlags {
    values: [bool; BINARY_COLUMNS.len()],
}

impl ToolFlags {
    /// Column index of a flag name
    #[inline]
    pub fn column_index(column: &str) -> Option<usize> {
        BINARY_COLUMNS.iter().position(|c| *c == column)
    }

    #[inline]
    pub fn get(&self, column: &str) -> Option<bool> {
        Self::column_index(column).map(|i| self.values[i])
    }

    /// Set a flag by name. Returns false for an unknown column.
    pub fn set(&mut self, column: &str, value: bool) -> bool {
        match Self::column_index(column) {
            Some(i) => {
                self.values[i] = value;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn open_source(&self) -> bool {
        self.values[0]
    }

    #[inline]
    pub fn api_available(&self) -> bool {
        self.values[1]
    }

    /// Flags as 0.0/1.0 in column order
    pub fn as_f32(&self) -> [f32; BINARY_COLUMNS.len()] {
        let mut out = [0.0; BINARY_COLUMNS.len()];
        for (dst, &flag) in out.iter_mut().zip(self.values.iter()) {
            *dst = if flag { 1.0 } else { 0.0 };
        }
        out
    }
}

/// A single catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub tool_name: String,
    pub company: String,
    pub category: String,
    pub modality: String,
    pub website: String,
    pub api_status: String,
    pub release_year: Option<i32>,
    /// Value of the `years_since_release` column when the source carries one
    pub years_since_release: Option<f32>,
    pub flags: ToolFlags,
}

impl ToolRecord {
    /// Create a record with only a name; every other attribute takes its
    /// missing-value default
    #[must_use]
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            company: String::new(),
            category: String::new(),
            modality: String::new(),
            website: String::new(),
            api_status: String::new(),
            release_year: None,
            years_since_release: None,
            flags: ToolFlags::default(),
        }
    }

    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = company.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = modality.into();
        self
    }

    #[must_use]
    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = website.into();
        self
    }

    #[must_use]
    pub fn with_release_year(mut self, year: i32) -> Self {
        self.release_year = Some(year);
        self
    }

    /// Set a binary flag by column name; unknown names are ignored
    #[must_use]
    pub fn with_flag(mut self, column: &str, value: bool) -> Self {
        self.flags.set(column, value);
        self
    }

    /// Text used for the TF-IDF block: category, modality and company
    pub fn text_blob(&self) -> String {
        format!("{} {} {}", self.category, self.modality, self.company)
    }

    /// Years since release, from the explicit column or derived from the
    /// release year
    pub fn years_since_release(&self, reference_year: i32) -> Option<f32> {
        self.years_since_release
            .or_else(|| self.release_year.map(|y| (reference_year - y) as f32))
    }
}

/// Row shape of the catalog CSV before validation
#[derive(Debug, Deserialize)]
struct RawToolRow {
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    category_canonical: Option<String>,
    #[serde(default)]
    modality_canonical: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    api_status: Option<String>,
    #[serde(default)]
    release_year: Option<String>,
    #[serde(default)]
    years_since_release: Option<String>,
    #[serde(default)]
    open_source: Option<String>,
    #[serde(default)]
    api_available: Option<String>,
    #[serde(default)]
    mod_text: Option<String>,
    #[serde(default)]
    mod_image: Option<String>,
    #[serde(default)]
    mod_video: Option<String>,
    #[serde(default)]
    mod_audio: Option<String>,
    #[serde(default)]
    mod_code: Option<String>,
    #[serde(default)]
    mod_design: Option<String>,
    #[serde(default)]
    mod_infra: Option<String>,
    #[serde(default)]
    mod_productivity: Option<String>,
    #[serde(default)]
    mod_safety: Option<String>,
    #[serde(default)]
    mod_multimodal: Option<String>,
}

impl RawToolRow {
    fn flag_cells(&self) -> [&Option<String>; BINARY_COLUMNS.len()] {
        [
            &self.open_source,
            &self.api_available,
            &self.mod_text,
            &self.mod_image,
            &self.mod_video,
            &self.mod_audio,
            &self.mod_code,
            &self.mod_design,
            &self.mod_infra,
            &self.mod_productivity,
            &self.mod_safety,
            &self.mod_multimodal,
        ]
    }

    fn into_record(self, line: u64) -> Result<ToolRecord> {
        let tool_name = text_cell(&self.tool_name);
        if tool_name.is_empty() {
            return Err(Error::InvalidRecord {
                line,
                reason: "tool_name is empty".to_string(),
            });
        }

        let mut flags = ToolFlags::default();
        for (i, cell) in self.flag_cells().into_iter().enumerate() {
            flags.values[i] = parse_flag(cell.as_deref(), BINARY_COLUMNS[i], line)?;
        }

        Ok(ToolRecord {
            tool_name,
            company: text_cell(&self.company),
            category: text_cell(&self.category_canonical),
            modality: text_cell(&self.modality_canonical),
            website: text_cell(&self.website),
            api_status: text_cell(&self.api_status),
            release_year: parse_year(self.release_year.as_deref(), line)?,
            years_since_release: parse_number(
                self.years_since_release.as_deref(),
                "years_since_release",
                line,
            )?,
            flags,
        })
    }
}

fn text_cell(cell: &Option<String>) -> String {
    cell.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn parse_flag(cell: Option<&str>, column: &str, line: u64) -> Result<bool> {
    let value = match cell.map(str::trim) {
        None | Some("") => return Ok(false),
        Some(v) => v.to_ascii_lowercase(),
    };
    match value.as_str() {
        "1" | "1.0" | "true" | "yes" => Ok(true),
        "0" | "0.0" | "false" | "no" => Ok(false),
        other => Err(Error::InvalidRecord {
            line,
            reason: format!("column '{}' is not a binary flag: '{}'", column, other),
        }),
    }
}

fn parse_number(cell: Option<&str>, column: &str, line: u64) -> Result<Option<f32>> {
    match cell.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Some)
            .ok_or_else(|| Error::InvalidRecord {
                line,
                reason: format!("column '{}' is not a number: '{}'", column, v),
            }),
    }
}

// Accepts "2023" as well as the "2023.0" produced by spreadsheet exports
fn parse_year(cell: Option<&str>, line: u64) -> Result<Option<i32>> {
    let invalid = |v: &str| Error::InvalidRecord {
        line,
        reason: format!("column 'release_year' is not a year: '{}'", v),
    };
    match cell.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            let year: f64 = v.parse().map_err(|_| invalid(v))?;
            if year.fract() != 0.0 || !(0.0..=9999.0).contains(&year) {
                return Err(invalid(v));
            }
            Ok(Some(year as i32))
        }
    }
}

/// The full, read-only catalog snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    tools: Vec<ToolRecord>,
}

impl Catalog {
    pub fn new(tools: Vec<ToolRecord>) -> Self {
        Self { tools }
    }

    /// Load a catalog CSV from disk
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let catalog = Self::from_reader(file)?;
        info!("Loaded {} tools from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    /// Parse a catalog CSV with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(false)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if !headers.iter().any(|h| h == "tool_name") {
            return Err(Error::InvalidRecord {
                line: 1,
                reason: "missing required column 'tool_name'".to_string(),
            });
        }

        let mut tools = Vec::new();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let raw: RawToolRow = record.deserialize(Some(&headers))?;
            tools.push(raw.into_record(line)?);
        }

        let catalog = Self { tools };
        let duplicates = catalog.duplicate_names();
        if !duplicates.is_empty() {
            warn!(
                "Catalog contains duplicate tool names (first match wins): {:?}",
                duplicates
            );
        }
        Ok(catalog)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[inline]
    pub fn tools(&self) -> &[ToolRecord] {
        &self.tools
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&ToolRecord> {
        self.tools.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ToolRecord> {
        self.tools.iter()
    }

    /// Index of the first tool whose name equals `name`, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<usize> {
        let needle = name.to_lowercase();
        self.tools
            .iter()
            .position(|t| t.tool_name.to_lowercase() == needle)
    }

    /// Names (lowercased) that occur more than once, in first-seen order
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let mut duplicates = Vec::new();
        for tool in &self.tools {
            let key = tool.tool_name.to_lowercase();
            if !seen.insert(key.clone()) && reported.insert(key.clone()) {
                duplicates.push(key);
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "tool_name,company,category_canonical,modality_canonical,website,release_year,open_source,api_available,api_status,mod_text,mod_image,mod_video,mod_audio,mod_code,mod_design,mod_infra,mod_productivity,mod_safety,mod_multimodal";

    fn parse(rows: &[&str]) -> Result<Catalog> {
        let mut csv = String::from(HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        Catalog::from_reader(csv.as_bytes())
    }

    #[test]
    fn test_parse_full_row() {
        let catalog = parse(&[
            "ChatGPT,OpenAI,Chatbot,Text,https://chat.openai.com,2022,0,1,GA,1,0,0,0,0,0,0,0,0,0",
        ])
        .unwrap();
        assert_eq!(catalog.len(), 1);
        let tool = catalog.get(0).unwrap();
        assert_eq!(tool.tool_name, "ChatGPT");
        assert_eq!(tool.category, "Chatbot");
        assert_eq!(tool.release_year, Some(2022));
        assert!(!tool.flags.open_source());
        assert!(tool.flags.api_available());
        assert_eq!(tool.flags.get("mod_text"), Some(true));
    }

    #[test]
    fn test_missing_cells_default() {
        let catalog = parse(&["Mystery,,,,,,,,,,,,,,,,,,"]).unwrap();
        let tool = catalog.get(0).unwrap();
        assert_eq!(tool.company, "");
        assert_eq!(tool.category, "");
        assert_eq!(tool.release_year, None);
        assert_eq!(tool.flags, ToolFlags::default());
        assert_eq!(tool.text_blob(), "  ");
    }

    #[test]
    fn test_float_year_and_flags() {
        let catalog = parse(&[
            "Llama,Meta,Chatbot,Text,,2023.0,1.0,True,,1,0,0,0,0,0,0,0,0,0",
        ])
        .unwrap();
        let tool = catalog.get(0).unwrap();
        assert_eq!(tool.release_year, Some(2023));
        assert!(tool.flags.open_source());
        assert!(tool.flags.api_available());
    }

    #[test]
    fn test_malformed_flag_rejected() {
        let err = parse(&["Bad,Co,Cat,Mod,,2023,maybe,0,,0,0,0,0,0,0,0,0,0,0"]).unwrap_err();
        match err {
            Error::InvalidRecord { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("open_source"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = parse(&[" ,Co,Cat,Mod,,2023,0,0,,0,0,0,0,0,0,0,0,0,0"]).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { .. }));
    }

    #[test]
    fn test_missing_name_column_rejected() {
        let err = Catalog::from_reader("company,website\nOpenAI,x".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord { line: 1, .. }));
    }

    #[test]
    fn test_find_by_name_first_match_wins() {
        let catalog = Catalog::new(vec![
            ToolRecord::new("Gemini").with_company("Google"),
            ToolRecord::new("gemini").with_company("Other"),
        ]);
        assert_eq!(catalog.find_by_name("GEMINI"), Some(0));
        assert_eq!(catalog.find_by_name("nope"), None);
        assert_eq!(catalog.duplicate_names(), vec!["gemini".to_string()]);
    }

    #[test]
    fn test_years_since_release() {
        let tool = ToolRecord::new("A").with_release_year(2021);
        assert_eq!(tool.years_since_release(2025), Some(4.0));

        let mut explicit = tool.clone();
        explicit.years_since_release = Some(1.5);
        assert_eq!(explicit.years_since_release(2025), Some(1.5));

        assert_eq!(ToolRecord::new("B").years_since_release(2025), None);
    }

    #[test]
    fn test_from_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("tools.csv");
        std::fs::write(
            &path,
            "tool_name,company,category_canonical\nChatGPT,OpenAI,Chatbot\nClaude,Anthropic,Chatbot\n",
        )
        .unwrap();

        let catalog = Catalog::from_path(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find_by_name("claude"), Some(1));
        assert!(Catalog::from_path(temp_dir.path().join("missing.csv")).is_err());
    }
}
