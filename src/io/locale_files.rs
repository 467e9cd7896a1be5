use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Result, ToolError};
use crate::model::LocaleTree;

/// Conventional location of a language file: `<dir>/<code>.json`.
pub fn locale_path(dir: &Path, code: &str) -> PathBuf {
    dir.join(format!("{code}.json"))
}

/// Reads a locale file. The file must exist and hold a JSON object.
pub fn read_locale(path: &Path) -> Result<LocaleTree> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    match serde_json::from_str(&source)? {
        Value::Object(tree) => {
            debug!(path = %path.display(), top_level_keys = tree.len(), "loaded locale file");
            Ok(tree)
        }
        _ => Err(ToolError::InvalidLocale(path.to_path_buf())),
    }
}

/// Reads a locale file, starting from an empty tree when it does not exist.
pub fn read_locale_or_empty(path: &Path) -> Result<LocaleTree> {
    if path.exists() {
        read_locale(path)
    } else {
        warn!(path = %path.display(), "locale file missing, starting from an empty tree");
        Ok(LocaleTree::new())
    }
}

/// Writes a locale tree with two-space indentation and a trailing newline.
pub fn write_locale(path: &Path, tree: &LocaleTree) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut json = serde_json::to_string_pretty(tree)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}
