use tracing::{debug, info, instrument, warn};

use crate::aggregate::aggregate;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::flatten::{expand, flatten, overlay};
use crate::io::TableStore;
use crate::io::locale_files::{locale_path, read_locale, read_locale_or_empty, write_locale};
use crate::model::{AnnotatedRow, FlatEntry, LanguageSet, LocaleTree, TranslationRow};
use crate::reconcile::{ReconcileLayout, ReconcileSummary, reconcile};

/// What an export did to the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    /// Rows produced from the locale files.
    pub aggregated: usize,
    /// Rows written back to the sheet.
    pub written: usize,
    /// True when the sheet was empty and the aggregated rows were written
    /// without annotations.
    pub initial_population: bool,
    pub summary: ReconcileSummary,
}

/// What an import did to the locale files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub rows_read: usize,
    /// Rows ignored because their key cell was empty.
    pub rows_skipped: usize,
    /// `(language code, values written)` in language order.
    pub applied: Vec<(String, usize)>,
}

/// Flattens every configured locale file and merges them into rows.
#[instrument(level = "info", skip_all, fields(locales = %config.locales_dir.display()))]
pub fn collect_rows(config: &SyncConfig) -> Result<Vec<TranslationRow>> {
    let mut per_language = Vec::with_capacity(config.languages.len());
    for (ordinal, code) in config.languages.iter() {
        let tree = read_locale(&locale_path(&config.locales_dir, code))?;
        let entries = flatten(&tree);
        debug!(language = code, entry_count = entries.len(), "flattened locale");
        per_language.push((ordinal, entries));
    }
    aggregate(&config.languages, per_language)
}

/// Exports the locale files to the sheet.
///
/// An empty sheet receives the aggregated rows as they are. Otherwise the
/// rows are reconciled against the sheet content and the whole range is
/// rewritten. Nothing is written until every file was read and merged.
#[instrument(level = "info", skip_all, fields(range = %config.range))]
pub fn export(config: &SyncConfig, store: &mut dyn TableStore) -> Result<ExportReport> {
    config.validate()?;
    let range = config.sheet_range()?;
    if let Some(width) = range.width() {
        let clipped: Vec<usize> = config
            .layout
            .checked_columns()
            .map(|column| config.layout.shadow_column(column))
            .filter(|column| *column >= width)
            .collect();
        if !clipped.is_empty() {
            warn!(
                columns = ?clipped,
                "shadow columns lie outside the range and are not read back"
            );
        }
    }
    let rows = collect_rows(config)?;
    info!(row_count = rows.len(), "aggregated locale files");

    let existing = store.read(&range)?;
    if existing.is_empty() {
        let matrix: Vec<Vec<String>> = rows.iter().map(TranslationRow::to_cells).collect();
        store.write(&range, &matrix, config.input_mode)?;
        info!(row_count = matrix.len(), "sheet was empty, wrote aggregated rows");
        return Ok(ExportReport {
            aggregated: rows.len(),
            written: matrix.len(),
            initial_population: true,
            summary: ReconcileSummary::default(),
        });
    }

    let existing: Vec<AnnotatedRow> = existing.into_iter().map(AnnotatedRow::from).collect();
    let reconciliation = reconcile(&rows, existing, &config.layout);
    let matrix: Vec<Vec<String>> = reconciliation
        .rows
        .into_iter()
        .map(AnnotatedRow::into_cells)
        .collect();
    store.write(&range, &matrix, config.input_mode)?;

    let summary = reconciliation.summary;
    info!(
        row_count = matrix.len(),
        added = summary.added,
        updated = summary.updated,
        need_translation = summary.need_translation,
        "sheet reconciled"
    );
    Ok(ExportReport {
        aggregated: rows.len(),
        written: matrix.len(),
        initial_population: false,
        summary,
    })
}

/// Splits sheet rows into per-language entries, indexed by ordinal.
///
/// Rows without a key are dropped. Languages whose column receives export
/// annotations under `layout` get no entries. Empty values are kept as
/// entries and skipped later by [`overlay`].
pub fn split_rows(
    rows: &[Vec<String>],
    languages: &LanguageSet,
    layout: &ReconcileLayout,
) -> Vec<Vec<FlatEntry>> {
    let mut per_language: Vec<Vec<FlatEntry>> = vec![Vec::new(); languages.len()];
    for cells in rows {
        let row = TranslationRow::from_cells(cells, languages.len());
        if row.key.trim().is_empty() {
            continue;
        }
        for (ordinal, value) in row.values.into_iter().enumerate() {
            if layout.is_annotation_column(ordinal + 1) {
                continue;
            }
            per_language[ordinal].push(FlatEntry::new(row.key.clone(), value));
        }
    }
    per_language
}

/// Imports the sheet into the locale files.
///
/// Each file is loaded with its dotted keys expanded, then the non-empty
/// values are overlaid onto it, so translations missing from the sheet keep
/// whatever the file holds. Language columns shared with the status or
/// shadow columns are not imported.
#[instrument(
    level = "info",
    skip_all,
    fields(range = %config.range, locales = %config.locales_dir.display())
)]
pub fn import(config: &SyncConfig, store: &mut dyn TableStore) -> Result<ImportReport> {
    config.validate()?;
    let range = config.sheet_range()?;
    let rows = store.read(&range)?;
    info!(row_count = rows.len(), "read sheet rows");

    let rows_skipped = rows
        .iter()
        .filter(|cells| cells.first().is_none_or(|key| key.trim().is_empty()))
        .count();
    if rows_skipped > 0 {
        warn!(rows_skipped, "ignoring rows without a key");
    }

    let annotated: Vec<&str> = config
        .languages
        .iter()
        .filter(|(ordinal, _)| config.layout.is_annotation_column(ordinal + 1))
        .map(|(_, code)| code)
        .collect();
    if !annotated.is_empty() {
        warn!(
            languages = ?annotated,
            "language columns hold export annotations and are not imported"
        );
    }

    let per_language = split_rows(&rows, &config.languages, &config.layout);

    let mut trees: Vec<(String, LocaleTree, usize)> = Vec::with_capacity(per_language.len());
    for ((_, code), entries) in config.languages.iter().zip(&per_language) {
        let path = locale_path(&config.locales_dir, code);
        let mut tree = expand(&read_locale_or_empty(&path)?);
        let applied = overlay(&mut tree, entries);
        debug!(language = code, applied, "overlaid sheet values");
        trees.push((code.to_string(), tree, applied));
    }

    let mut applied = Vec::with_capacity(trees.len());
    for (code, tree, count) in trees {
        write_locale(&locale_path(&config.locales_dir, &code), &tree)?;
        applied.push((code, count));
    }

    info!(languages = applied.len(), "locale files written");
    Ok(ImportReport {
        rows_read: rows.len(),
        rows_skipped,
        applied,
    })
}
