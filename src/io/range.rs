use std::fmt;
use std::str::FromStr;

use crate::error::{Result, ToolError};

/// Sheet used when a range does not name one.
pub const DEFAULT_SHEET: &str = "Sheet1";

/// Rectangular region of a sheet in A1 notation, e.g. `kefu!A2:G`.
///
/// Coordinates are zero-based. The end column and end row are optional; an
/// open range extends to the last used row or column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: String,
    pub start_row: u32,
    pub start_column: u16,
    pub end_row: Option<u32>,
    pub end_column: Option<u16>,
}

impl SheetRange {
    /// Number of columns covered, if the range is bounded horizontally.
    pub fn width(&self) -> Option<usize> {
        self.end_column
            .map(|end| usize::from(end.saturating_sub(self.start_column)) + 1)
    }

    pub fn height(&self) -> Option<usize> {
        self.end_row
            .map(|end| end.saturating_sub(self.start_row) as usize + 1)
    }
}

impl FromStr for SheetRange {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self> {
        let invalid = || ToolError::InvalidRange(value.to_string());

        let (sheet, cells) = match value.rsplit_once('!') {
            Some((sheet, cells)) => (unquote(sheet), cells),
            None => (DEFAULT_SHEET.to_string(), value),
        };
        if sheet.is_empty() {
            return Err(invalid());
        }

        let (start, end) = match cells.split_once(':') {
            Some((start, end)) => (start, Some(end)),
            None => (cells, None),
        };

        let (start_column, start_row) = parse_cell(start).ok_or_else(invalid)?;
        let start_row = start_row.ok_or_else(invalid)?;

        let (end_column, end_row) = match end {
            Some(end) => {
                let (column, row) = parse_cell(end).ok_or_else(invalid)?;
                (Some(column), row)
            }
            None => (None, None),
        };

        if end_column.is_some_and(|column| column < start_column)
            || end_row.is_some_and(|row| row < start_row)
        {
            return Err(invalid());
        }

        Ok(Self {
            sheet,
            start_row,
            start_column,
            end_row,
            end_column,
        })
    }
}

impl fmt::Display for SheetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sheet.chars().all(|ch| ch.is_alphanumeric() || ch == '_') {
            write!(f, "{}!", self.sheet)?;
        } else {
            write!(f, "'{}'!", self.sheet.replace('\'', "''"))?;
        }
        write!(f, "{}{}", column_name(self.start_column), self.start_row + 1)?;
        if let Some(end) = self.end_column {
            write!(f, ":{}", column_name(end))?;
            if let Some(row) = self.end_row {
                write!(f, "{}", row + 1)?;
            }
        }
        Ok(())
    }
}

fn unquote(sheet: &str) -> String {
    sheet
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
        .map(|inner| inner.replace("''", "'"))
        .unwrap_or_else(|| sheet.to_string())
}

/// Parses `B12` into `(1, Some(11))` and `G` into `(6, None)`.
fn parse_cell(cell: &str) -> Option<(u16, Option<u32>)> {
    let cell = cell.trim();
    let split = cell
        .find(|ch: char| ch.is_ascii_digit())
        .unwrap_or(cell.len());
    let (letters, digits) = cell.split_at(split);

    let column = column_index(letters)?;
    let row = if digits.is_empty() {
        None
    } else {
        let row: u32 = digits.parse().ok()?;
        Some(row.checked_sub(1)?)
    };
    Some((column, row))
}

/// Converts column letters to a zero-based index: `A` is 0, `AA` is 26.
pub fn column_index(letters: &str) -> Option<u16> {
    if letters.is_empty() {
        return None;
    }
    let mut index: u32 = 0;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = u32::from(ch.to_ascii_uppercase()) - u32::from('A') + 1;
        index = index.checked_mul(26)?.checked_add(digit)?;
    }
    u16::try_from(index - 1).ok()
}

/// Converts a zero-based column index to its letters.
pub fn column_name(index: u16) -> String {
    let mut remaining = u32::from(index) + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        let digit = ((remaining - 1) % 26) as u8;
        letters.push(char::from(b'A' + digit));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}
