use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, ToolError};

/// Nested key/value structure holding the translations of one language.
///
/// Leaves are translation strings; any other non-object value is carried as an
/// opaque scalar. Key order follows the source document.
pub type LocaleTree = Map<String, Value>;

/// Language codes in the order the sheet columns expect them.
pub const DEFAULT_LANGUAGES: [&str; 6] = ["zh-tw", "zh-cn", "en", "vi", "th", "pt"];

/// Ordered list of language codes. The position of a code is its ordinal:
/// the column offset of that language in every table the tool produces or
/// consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LanguageSet {
    codes: Vec<String>,
}

impl LanguageSet {
    /// Builds a set from codes in ordinal order. Codes must be unique and the
    /// set must not be empty.
    pub fn new<I, S>(codes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for code in codes {
            let code = code.into().trim().to_string();
            if code.is_empty() {
                return Err(ToolError::InvalidConfig("empty language code".into()));
            }
            if unique.contains(&code) {
                return Err(ToolError::InvalidConfig(format!(
                    "language '{code}' listed twice"
                )));
            }
            unique.push(code);
        }
        if unique.is_empty() {
            return Err(ToolError::InvalidConfig("no languages configured".into()));
        }
        Ok(Self { codes: unique })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Returns the ordinal of `code`.
    pub fn ordinal(&self, code: &str) -> Result<usize> {
        self.codes
            .iter()
            .position(|candidate| candidate == code)
            .ok_or_else(|| ToolError::UnknownLanguage(code.to_string()))
    }

    pub fn code(&self, ordinal: usize) -> Option<&str> {
        self.codes.get(ordinal).map(String::as_str)
    }

    /// Iterates `(ordinal, code)` pairs in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.codes.iter().map(String::as_str).enumerate()
    }
}

impl Default for LanguageSet {
    fn default() -> Self {
        Self {
            codes: DEFAULT_LANGUAGES.iter().map(|code| code.to_string()).collect(),
        }
    }
}

impl TryFrom<Vec<String>> for LanguageSet {
    type Error = ToolError;

    fn try_from(codes: Vec<String>) -> Result<Self> {
        Self::new(codes)
    }
}

impl From<LanguageSet> for Vec<String> {
    fn from(languages: LanguageSet) -> Self {
        languages.codes
    }
}

impl FromStr for LanguageSet {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self> {
        Self::new(value.split(',').filter(|code| !code.trim().is_empty()))
    }
}

/// A single dotted-key/value pair extracted from a [`LocaleTree`].
#[derive(Debug, Clone, PartialEq)]
pub struct FlatEntry {
    /// `.`-joined path from the tree root to the leaf.
    pub key: String,
    /// Leaf value, usually a string.
    pub value: Value,
}

impl FlatEntry {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Text written into a sheet cell for this entry. Strings are written
    /// verbatim, other scalars use their JSON rendering.
    pub fn cell_text(&self) -> String {
        match &self.value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// One key plus its value in every language, positioned by ordinal.
///
/// An empty string marks a missing translation; rows are never omitted for
/// missing languages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRow {
    pub key: String,
    pub values: Vec<String>,
}

impl TranslationRow {
    /// Creates a row with `language_count` empty slots.
    pub fn new(key: impl Into<String>, language_count: usize) -> Self {
        Self {
            key: key.into(),
            values: vec![String::new(); language_count],
        }
    }

    /// Value at `ordinal`, or `""` when the slot is empty or out of range.
    pub fn value(&self, ordinal: usize) -> &str {
        self.values.get(ordinal).map(String::as_str).unwrap_or_default()
    }

    /// Sheet cells `[key, values...]`.
    pub fn to_cells(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.values.len() + 1);
        cells.push(self.key.clone());
        cells.extend(self.values.iter().cloned());
        cells
    }

    /// Splits sheet cells back into a row holding `language_count` values.
    /// Status and shadow columns beyond the language columns are ignored.
    pub fn from_cells(cells: &[String], language_count: usize) -> Self {
        let key = cells.first().cloned().unwrap_or_default();
        let values = (1..=language_count)
            .map(|column| cells.get(column).cloned().unwrap_or_default())
            .collect();
        Self { key, values }
    }
}

/// Reconciliation marker stored in the status column of an annotated row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// At least one checked language slot is empty.
    NeedToTranslate,
    /// A checked language value differs from the locale files.
    Updated,
    /// The key did not exist in the sheet before this export.
    Added,
}

impl RowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RowStatus::NeedToTranslate => "need to translate",
            RowStatus::Updated => "updated",
            RowStatus::Added => "added",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "need to translate" => Some(RowStatus::NeedToTranslate),
            "updated" => Some(RowStatus::Updated),
            "added" => Some(RowStatus::Added),
            _ => None,
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row as persisted in the sheet: the key, language values, a status cell
/// and shadow cells holding values that changed since the last export.
///
/// Rows read from a sheet are ragged, so every accessor tolerates missing
/// trailing cells and every setter pads the row as needed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnnotatedRow {
    pub cells: Vec<String>,
}

impl AnnotatedRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    pub fn key(&self) -> &str {
        self.cell(0)
    }

    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or_default()
    }

    pub fn set_cell(&mut self, column: usize, value: impl Into<String>) {
        if self.cells.len() <= column {
            self.cells.resize(column + 1, String::new());
        }
        self.cells[column] = value.into();
    }

    pub fn status(&self, column: usize) -> Option<RowStatus> {
        RowStatus::parse(self.cell(column))
    }

    pub fn set_status(&mut self, column: usize, status: RowStatus) {
        self.set_cell(column, status.as_str());
    }

    pub fn into_cells(self) -> Vec<String> {
        self.cells
    }
}

impl From<Vec<String>> for AnnotatedRow {
    fn from(cells: Vec<String>) -> Self {
        Self::new(cells)
    }
}

impl From<&TranslationRow> for AnnotatedRow {
    fn from(row: &TranslationRow) -> Self {
        Self::new(row.to_cells())
    }
}
