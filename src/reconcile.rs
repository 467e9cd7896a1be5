//! Diff freshly aggregated rows against the rows already stored in the sheet.
//!
//! The sheet stays the source of truth for translators: existing language
//! values are never overwritten. A changed value is parked in a shadow column
//! next to the row and the row is flagged, new keys are appended, and rows
//! whose key disappeared from the locale files are kept untouched.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ToolError};
use crate::model::{AnnotatedRow, RowStatus, TranslationRow};

/// Column positions used when annotating rows.
///
/// Columns are zero-based sheet columns; column 0 holds the key and column
/// `n` holds the language with ordinal `n - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileLayout {
    /// Number of leading languages compared against the sheet.
    pub checked_languages: usize,
    /// Column receiving the [`RowStatus`] marker.
    pub status_column: usize,
    /// Distance between a language column and its shadow column.
    pub shadow_offset: usize,
}

impl Default for ReconcileLayout {
    fn default() -> Self {
        Self {
            checked_languages: 3,
            status_column: 4,
            shadow_offset: 4,
        }
    }
}

impl ReconcileLayout {
    /// Layout checking the first `checked_languages` languages, with the
    /// status column right after them and the shadow columns after that.
    pub fn checking(checked_languages: usize) -> Self {
        Self {
            checked_languages,
            status_column: checked_languages + 1,
            shadow_offset: checked_languages + 1,
        }
    }

    /// Sheet columns holding the checked language values.
    pub fn checked_columns(&self) -> std::ops::RangeInclusive<usize> {
        1..=self.checked_languages
    }

    pub fn shadow_column(&self, column: usize) -> usize {
        column + self.shadow_offset
    }

    /// True when export writes a status marker or a shadow value into
    /// `column`.
    pub fn is_annotation_column(&self, column: usize) -> bool {
        column == self.status_column
            || self
                .checked_columns()
                .any(|checked| self.shadow_column(checked) == column)
    }

    /// Rejects layouts whose status or shadow cells would land on the key or
    /// on a checked language column.
    pub fn validate(&self) -> Result<()> {
        if self.checked_languages == 0 {
            return Err(ToolError::InvalidConfig(
                "at least one language must be checked".into(),
            ));
        }
        if self.checked_columns().contains(&self.status_column) || self.status_column == 0 {
            return Err(ToolError::InvalidConfig(format!(
                "status column {} overlaps the checked language columns",
                self.status_column
            )));
        }
        if self.shadow_offset < self.checked_languages
            || self
                .checked_columns()
                .any(|column| self.shadow_column(column) == self.status_column)
        {
            return Err(ToolError::InvalidConfig(format!(
                "shadow offset {} collides with the language or status columns",
                self.shadow_offset
            )));
        }
        Ok(())
    }
}

/// Counts of what a reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub added: usize,
    pub updated: usize,
    pub need_translation: usize,
    pub unchanged: usize,
}

/// Annotated rows ready to be written back, plus what changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub rows: Vec<AnnotatedRow>,
    pub summary: ReconcileSummary,
}

/// Merges `new_rows` into `existing`.
///
/// Matched rows are annotated in place; a row holds a single status cell, so
/// when several checked columns trigger, the last column examined decides the
/// status. Unmatched new rows are appended with status `added`, replaced by
/// `need to translate` when one of their checked values is empty. Existing
/// rows without a counterpart are left as they are. Only the first row with a
/// given key is considered when the sheet holds duplicates.
pub fn reconcile(
    new_rows: &[TranslationRow],
    existing: Vec<AnnotatedRow>,
    layout: &ReconcileLayout,
) -> Reconciliation {
    let mut rows = existing;
    let mut index: HashMap<String, usize> = HashMap::with_capacity(rows.len());
    for (position, row) in rows.iter().enumerate() {
        index.entry(row.key().to_string()).or_insert(position);
    }

    let mut summary = ReconcileSummary::default();
    let mut appended = Vec::new();

    for new_row in new_rows {
        match index.get(new_row.key.as_str()) {
            Some(&position) => {
                let status = annotate_existing(&mut rows[position], new_row, layout);
                record(&mut summary, status);
            }
            None => {
                let row = added_row(new_row, layout);
                record(&mut summary, row.status(layout.status_column));
                appended.push(row);
            }
        }
    }

    debug!(
        existing = rows.len(),
        appended = appended.len(),
        updated = summary.updated,
        need_translation = summary.need_translation,
        "reconciled sheet rows"
    );

    rows.extend(appended);
    Reconciliation { rows, summary }
}

fn annotate_existing(
    row: &mut AnnotatedRow,
    new_row: &TranslationRow,
    layout: &ReconcileLayout,
) -> Option<RowStatus> {
    let mut status = None;
    for column in layout.checked_columns() {
        let incoming = new_row.value(column - 1);
        let current = row.cell(column);
        if current.is_empty() {
            status = Some(RowStatus::NeedToTranslate);
        } else if current != incoming {
            row.set_cell(layout.shadow_column(column), incoming);
            status = Some(RowStatus::Updated);
        }
    }
    if let Some(status) = status {
        row.set_status(layout.status_column, status);
    }
    status
}

fn added_row(new_row: &TranslationRow, layout: &ReconcileLayout) -> AnnotatedRow {
    let mut cells = Vec::with_capacity(layout.status_column + 1);
    cells.push(new_row.key.clone());
    for column in 1..layout.status_column {
        cells.push(new_row.value(column - 1).to_string());
    }

    let mut row = AnnotatedRow::new(cells);
    row.set_status(layout.status_column, RowStatus::Added);
    for column in layout.checked_columns() {
        if row.cell(column).is_empty() {
            row.set_status(layout.status_column, RowStatus::NeedToTranslate);
        }
    }
    row
}

fn record(summary: &mut ReconcileSummary, status: Option<RowStatus>) {
    match status {
        Some(RowStatus::Added) => summary.added += 1,
        Some(RowStatus::Updated) => summary.updated += 1,
        Some(RowStatus::NeedToTranslate) => summary.need_translation += 1,
        None => summary.unchanged += 1,
    }
}
