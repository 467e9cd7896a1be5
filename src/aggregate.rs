use indexmap::IndexMap;
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{FlatEntry, LanguageSet, TranslationRow};

/// Merges the flattened entries of every language into one row per key.
///
/// Languages are visited in ordinal order and each value lands in the slot of
/// its language. Rows are emitted in the order their key was first seen, so a
/// key that only a later language defines still gets a row with the earlier
/// slots left empty.
pub fn aggregate<E>(
    languages: &LanguageSet,
    per_language: impl IntoIterator<Item = (usize, E)>,
) -> Result<Vec<TranslationRow>>
where
    E: AsRef<[FlatEntry]>,
{
    let mut inputs: Vec<(usize, E)> = per_language.into_iter().collect();
    inputs.sort_by_key(|(ordinal, _)| *ordinal);

    let mut rows: IndexMap<String, TranslationRow> = IndexMap::new();
    for (ordinal, entries) in &inputs {
        if *ordinal >= languages.len() {
            return Err(ToolError::UnknownLanguage(format!("#{ordinal}")));
        }
        for entry in entries.as_ref() {
            let row = rows
                .entry(entry.key.clone())
                .or_insert_with(|| TranslationRow::new(entry.key.clone(), languages.len()));
            row.values[*ordinal] = entry.cell_text();
        }
    }

    debug!(
        row_count = rows.len(),
        language_count = inputs.len(),
        "aggregated translation rows"
    );
    Ok(rows.into_values().collect())
}
