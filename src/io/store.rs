use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::io::range::SheetRange;

/// How written values are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueInputMode {
    /// Values are stored verbatim as text.
    Raw,
    /// Values are interpreted as if typed by a user: numbers, booleans and
    /// `=` formulas are recognised, a leading `'` forces text.
    #[default]
    UserEntered,
}

/// Tabular store holding the translation sheet.
pub trait TableStore {
    /// Reads the rows inside `range` as text. Trailing empty cells and rows
    /// are dropped; a missing sheet reads as no rows.
    fn read(&mut self, range: &SheetRange) -> Result<Vec<Vec<String>>>;

    /// Replaces every row from the range origin downward with `rows`.
    /// Cells left of the range and rows above it are kept.
    fn write(
        &mut self,
        range: &SheetRange,
        rows: &[Vec<String>],
        mode: ValueInputMode,
    ) -> Result<()>;
}

/// A typed sheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// Formula source without the leading `=`.
    Formula(String),
}

impl Cell {
    /// Converts input text according to `mode`.
    pub fn from_input(text: &str, mode: ValueInputMode) -> Self {
        if text.is_empty() {
            return Cell::Empty;
        }
        if mode == ValueInputMode::Raw {
            return Cell::Text(text.to_string());
        }
        if let Some(literal) = text.strip_prefix('\'') {
            return Cell::Text(literal.to_string());
        }
        if let Some(formula) = text.strip_prefix('=') {
            if !formula.is_empty() {
                return Cell::Formula(formula.to_string());
            }
        }
        match text.to_ascii_uppercase().as_str() {
            "TRUE" => return Cell::Bool(true),
            "FALSE" => return Cell::Bool(false),
            _ => {}
        }
        if looks_numeric(text) {
            if let Ok(number) = text.parse::<f64>() {
                if number.is_finite() {
                    return Cell::Number(number);
                }
            }
        }
        Cell::Text(text.to_string())
    }

    /// Text shown for the cell when it is read back.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(number) => format_number(*number),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
            Cell::Formula(formula) => format!("={formula}"),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty) || matches!(self, Cell::Text(text) if text.is_empty())
    }
}

fn looks_numeric(text: &str) -> bool {
    let body = text.strip_prefix(['-', '+']).unwrap_or(text);
    body.starts_with(|ch: char| ch.is_ascii_digit() || ch == '.')
        && body
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '.' | 'e' | 'E' | '-' | '+'))
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < 1e15 {
        format!("{}", number as i64)
    } else {
        number.to_string()
    }
}

/// In-memory cell grid addressed by absolute zero-based row and column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn is_blank(&self) -> bool {
        self.rows.iter().flatten().all(Cell::is_empty)
    }

    pub fn set(&mut self, row: usize, column: usize, cell: Cell) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= column {
            cells.resize_with(column + 1, Cell::default);
        }
        cells[column] = cell;
    }

    /// Text of the cells inside `range`.
    pub fn slice(&self, range: &SheetRange) -> Vec<Vec<String>> {
        let start_column = usize::from(range.start_column);
        let mut rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .skip(range.start_row as usize)
            .take(range.height().unwrap_or(usize::MAX))
            .map(|cells| {
                let mut texts: Vec<String> = cells
                    .iter()
                    .skip(start_column)
                    .take(range.width().unwrap_or(usize::MAX))
                    .map(Cell::text)
                    .collect();
                while texts.last().is_some_and(String::is_empty) {
                    texts.pop();
                }
                texts
            })
            .collect();
        while rows.last().is_some_and(Vec::is_empty) {
            rows.pop();
        }
        rows
    }

    /// Writes `rows` at the range origin and clears what used to be below
    /// them from the start column onward.
    pub fn splice(&mut self, range: &SheetRange, rows: &[Vec<String>], mode: ValueInputMode) {
        let start_row = range.start_row as usize;
        let start_column = usize::from(range.start_column);

        for existing in self.rows.iter_mut().skip(start_row) {
            existing.truncate(start_column);
        }
        for (offset, cells) in rows.iter().enumerate() {
            for (column, text) in cells.iter().enumerate() {
                let cell = Cell::from_input(text, mode);
                if !cell.is_empty() {
                    self.set(start_row + offset, start_column + column, cell);
                }
            }
        }
        while self.rows.last().is_some_and(Vec::is_empty) {
            self.rows.pop();
        }
    }

    /// Writes `header` on the row above the range when there is one.
    pub fn write_header(&mut self, range: &SheetRange, header: &[String]) {
        let Some(row) = (range.start_row as usize).checked_sub(1) else {
            return;
        };
        for (column, text) in header.iter().enumerate() {
            self.set(
                row,
                usize::from(range.start_column) + column,
                Cell::Text(text.clone()),
            );
        }
    }
}

/// [`TableStore`] keeping its sheets in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    sheets: HashMap<String, Grid>,
    header: Option<Vec<String>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header row written above the range when a sheet is first created.
    pub fn with_header(mut self, header: Vec<String>) -> Self {
        self.header = Some(header);
        self
    }

    /// Seeds `range` with `rows` as raw text.
    pub fn with_rows(mut self, range: &SheetRange, rows: &[Vec<String>]) -> Self {
        self.sheets
            .entry(range.sheet.clone())
            .or_default()
            .splice(range, rows, ValueInputMode::Raw);
        self
    }

    /// Number of completed writes.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl TableStore for MemoryStore {
    fn read(&mut self, range: &SheetRange) -> Result<Vec<Vec<String>>> {
        Ok(self
            .sheets
            .get(&range.sheet)
            .map(|grid| grid.slice(range))
            .unwrap_or_default())
    }

    fn write(
        &mut self,
        range: &SheetRange,
        rows: &[Vec<String>],
        mode: ValueInputMode,
    ) -> Result<()> {
        let grid = self.sheets.entry(range.sheet.clone()).or_default();
        if grid.is_blank() {
            if let Some(header) = &self.header {
                grid.write_header(range, header);
            }
        }
        grid.splice(range, rows, mode);
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(values: &[&[&str]]) -> Vec<Vec<String>> {
        values
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    #[test]
    fn user_entered_values_are_interpreted() {
        let mode = ValueInputMode::UserEntered;
        assert_eq!(Cell::from_input("42", mode), Cell::Number(42.0));
        assert_eq!(Cell::from_input("-1.5e3", mode), Cell::Number(-1500.0));
        assert_eq!(Cell::from_input("true", mode), Cell::Bool(true));
        assert_eq!(Cell::from_input("=A1&B1", mode), Cell::Formula("A1&B1".into()));
        assert_eq!(Cell::from_input("'007", mode), Cell::Text("007".into()));
        assert_eq!(Cell::from_input("inf", mode), Cell::Text("inf".into()));
        assert_eq!(Cell::from_input("1.2.3", mode), Cell::Text("1.2.3".into()));
        assert_eq!(Cell::from_input("", mode), Cell::Empty);
    }

    #[test]
    fn raw_values_stay_text() {
        assert_eq!(
            Cell::from_input("42", ValueInputMode::Raw),
            Cell::Text("42".into())
        );
        assert_eq!(Cell::Number(42.0).text(), "42");
        assert_eq!(Cell::Number(0.5).text(), "0.5");
    }

    #[test]
    fn slice_clips_to_the_range_and_trims_blanks() {
        let mut grid = Grid::new();
        let everything: SheetRange = "S!A1".parse().unwrap();
        grid.splice(
            &everything,
            &rows(&[&["key", "a", "b"], &["k1", "1", "", "", "x"], &["", ""]]),
            ValueInputMode::Raw,
        );

        let range: SheetRange = "S!A2:C".parse().unwrap();
        assert_eq!(grid.slice(&range), rows(&[&["k1", "1"]]));
    }

    #[test]
    fn splice_clears_stale_rows_but_keeps_the_header() {
        let range: SheetRange = "S!A2".parse().unwrap();
        let mut store = MemoryStore::new().with_header(vec!["key".into(), "en".into()]);
        store
            .write(&range, &rows(&[&["a", "1"], &["b", "2"]]), ValueInputMode::Raw)
            .unwrap();
        store
            .write(&range, &rows(&[&["c", "3"]]), ValueInputMode::Raw)
            .unwrap();

        let all: SheetRange = "S!A1".parse().unwrap();
        assert_eq!(store.read(&all).unwrap(), rows(&[&["key", "en"], &["c", "3"]]));
        assert_eq!(store.writes(), 2);
    }

    #[test]
    fn missing_sheet_reads_as_empty() {
        let mut store = MemoryStore::new();
        let range: SheetRange = "nothing!A2:G".parse().unwrap();
        assert!(store.read(&range).unwrap().is_empty());
    }
}
