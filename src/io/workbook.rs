use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::io::excel_read;
use crate::io::excel_write;
use crate::io::range::SheetRange;
use crate::io::store::{Grid, TableStore, ValueInputMode};

/// [`TableStore`] backed by a local `.xlsx` workbook.
///
/// Writes rebuild the whole file: the target sheet is spliced in memory and
/// every other sheet is carried over cell by cell.
#[derive(Debug, Clone)]
pub struct WorkbookStore {
    path: PathBuf,
    header: Option<Vec<String>>,
}

impl WorkbookStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            header: None,
        }
    }

    /// Header row written above the range when the target sheet is created.
    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<IndexMap<String, Grid>> {
        if self.path.exists() {
            excel_read::read_sheets(&self.path)
        } else {
            Ok(IndexMap::new())
        }
    }
}

impl TableStore for WorkbookStore {
    #[instrument(
        level = "debug",
        skip_all,
        fields(path = %self.path.display(), range = %range)
    )]
    fn read(&mut self, range: &SheetRange) -> Result<Vec<Vec<String>>> {
        let sheets = self.load()?;
        let rows = sheets
            .get(&range.sheet)
            .map(|grid| grid.slice(range))
            .unwrap_or_default();
        debug!(row_count = rows.len(), "read sheet rows");
        Ok(rows)
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(path = %self.path.display(), range = %range, row_count = rows.len(), ?mode)
    )]
    fn write(
        &mut self,
        range: &SheetRange,
        rows: &[Vec<String>],
        mode: ValueInputMode,
    ) -> Result<()> {
        let mut sheets = self.load()?;
        let grid = sheets.entry(range.sheet.clone()).or_default();
        if grid.is_blank() {
            if let Some(header) = &self.header {
                grid.write_header(range, header);
            }
        }
        grid.splice(range, rows, mode);
        excel_write::write_sheets(&self.path, &sheets)
    }
}
