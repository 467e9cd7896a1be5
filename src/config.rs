use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolError};
use crate::io::{SheetRange, ValueInputMode};
use crate::model::LanguageSet;
use crate::reconcile::ReconcileLayout;

/// Range read and written by default: everything below the header row of
/// the `kefu` sheet, key column plus six languages.
pub const DEFAULT_RANGE: &str = "kefu!A2:G";

/// Settings shared by the export and import pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// Language codes in column order.
    pub languages: LanguageSet,
    /// Directory holding one `<code>.json` file per language.
    pub locales_dir: PathBuf,
    /// Workbook standing in for the shared translation sheet.
    pub workbook: PathBuf,
    /// Rows exchanged with the sheet, in A1 notation.
    pub range: String,
    pub layout: ReconcileLayout,
    pub input_mode: ValueInputMode,
    /// OAuth client secret file. When set, a token is required before any
    /// pipeline runs.
    pub credentials: Option<PathBuf>,
    pub token: Option<PathBuf>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            languages: LanguageSet::default(),
            locales_dir: PathBuf::from("locales"),
            workbook: PathBuf::from("translations.xlsx"),
            range: DEFAULT_RANGE.to_string(),
            layout: ReconcileLayout::default(),
            input_mode: ValueInputMode::default(),
            credentials: None,
            token: None,
        }
    }
}

impl SyncConfig {
    /// Loads a JSON configuration file; absent fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ToolError::MissingInput(path.to_path_buf()));
        }
        let source = fs::read_to_string(path)?;
        let config: SyncConfig = serde_json::from_str(&source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn sheet_range(&self) -> Result<SheetRange> {
        self.range.parse()
    }

    /// Checks the range and layout. The status column must lie inside the
    /// range, otherwise every export would read the row without its status
    /// and drop it on rewrite.
    pub fn validate(&self) -> Result<()> {
        let range = self.sheet_range()?;
        self.layout.validate()?;
        if let Some(width) = range.width() {
            if self.layout.status_column >= width {
                return Err(ToolError::InvalidConfig(format!(
                    "status column {} lies outside range {}",
                    self.layout.status_column, self.range
                )));
            }
        }
        if self.layout.checked_languages > self.languages.len() {
            return Err(ToolError::InvalidConfig(format!(
                "{} languages checked but only {} configured",
                self.layout.checked_languages,
                self.languages.len()
            )));
        }
        Ok(())
    }

    /// Header row written above the range when the sheet is created.
    ///
    /// Language columns keep their code; the status and shadow labels only
    /// fill columns no language occupies.
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["key".to_string()];
        header.extend(self.languages.iter().map(|(_, code)| code.to_string()));

        let mut label = |column: usize, text: String| {
            if column <= self.languages.len() {
                return;
            }
            if header.len() <= column {
                header.resize(column + 1, String::new());
            }
            header[column] = text;
        };

        label(self.layout.status_column, "status".to_string());
        for column in self.layout.checked_columns() {
            if let Some(code) = self.languages.code(column - 1) {
                label(self.layout.shadow_column(column), format!("{code} (updated)"));
            }
        }
        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_the_shared_sheet() {
        let config = SyncConfig::default();
        assert!(config.validate().is_ok());
        let range = config.sheet_range().unwrap();
        assert_eq!(range.sheet, "kefu");
        assert_eq!(range.width(), Some(7));
        assert_eq!(
            config.header(),
            vec!["key", "zh-tw", "zh-cn", "en", "vi", "th", "pt", "en (updated)"]
        );
    }

    #[test]
    fn widened_layout_labels_every_annotation_column() {
        let config = SyncConfig {
            languages: "en,vi".parse().unwrap(),
            layout: ReconcileLayout::checking(2),
            ..SyncConfig::default()
        };
        assert_eq!(
            config.header(),
            vec!["key", "en", "vi", "status", "en (updated)", "vi (updated)"]
        );
    }

    #[test]
    fn loads_partial_files_and_rejects_unknown_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sync.json");
        fs::write(
            &path,
            r#"{ "languages": ["en", "vi", "th"], "range": "Sheet!B2:E", "input_mode": "RAW" }"#,
        )
        .unwrap();

        let config = SyncConfig::load(&path).unwrap();
        assert_eq!(config.languages.len(), 3);
        assert_eq!(config.input_mode, ValueInputMode::Raw);
        assert_eq!(config.locales_dir, PathBuf::from("locales"));

        fs::write(&path, r#"{ "langs": ["en"] }"#).unwrap();
        assert!(matches!(SyncConfig::load(&path), Err(ToolError::Json(_))));
    }

    #[test]
    fn status_column_must_fit_in_the_range() {
        let widened = SyncConfig {
            layout: ReconcileLayout::checking(6),
            ..SyncConfig::default()
        };
        assert!(matches!(widened.validate(), Err(ToolError::InvalidConfig(_))));

        let wide_range = SyncConfig {
            range: "kefu!A2:N".to_string(),
            ..widened.clone()
        };
        assert!(wide_range.validate().is_ok());

        let open_range = SyncConfig {
            range: "kefu!A2".to_string(),
            ..widened
        };
        assert!(open_range.validate().is_ok());
    }

    #[test]
    fn checked_languages_cannot_exceed_configured_ones() {
        let config = SyncConfig {
            languages: "en,vi".parse().unwrap(),
            ..SyncConfig::default()
        };
        assert!(matches!(config.validate(), Err(ToolError::InvalidConfig(_))));
    }
}
