use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use indexmap::IndexMap;

use crate::error::{Result, ToolError};
use crate::io::store::{Cell, Grid};

/// Reads every sheet of an `.xlsx` workbook into grids keyed by sheet name,
/// in workbook order.
///
/// Formula cells are read back as their `=` source so a workbook written by
/// [`excel_write`](crate::io::excel_write) round-trips unchanged.
pub fn read_sheets(path: &Path) -> Result<IndexMap<String, Grid>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let names = workbook.sheet_names().to_vec();

    let mut sheets = IndexMap::with_capacity(names.len());
    for name in names {
        let grid = read_sheet(&mut workbook, &name)?;
        sheets.insert(name, grid);
    }
    Ok(sheets)
}

fn read_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<Grid> {
    let range = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?
        .map_err(ToolError::from)?;

    let mut grid = Grid::new();
    if let Some((first_row, first_column)) = range.start() {
        for (row, column, cell) in range.cells() {
            let cell = data_to_cell(cell);
            if !cell.is_empty() {
                grid.set(
                    first_row as usize + row,
                    first_column as usize + column,
                    cell,
                );
            }
        }
    }

    if let Some(formulas) = workbook.worksheet_formula(name) {
        let formulas = formulas.map_err(ToolError::from)?;
        if let Some((first_row, first_column)) = formulas.start() {
            for (row, column, formula) in formulas.cells() {
                if !formula.is_empty() {
                    grid.set(
                        first_row as usize + row,
                        first_column as usize + column,
                        Cell::Formula(formula.trim_start_matches('=').to_string()),
                    );
                }
            }
        }
    }

    Ok(grid)
}

fn data_to_cell(cell: &DataType) -> Cell {
    match cell {
        DataType::String(value) => Cell::Text(value.clone()),
        DataType::Float(value) => Cell::Number(*value),
        DataType::Int(value) => Cell::Number(*value as f64),
        DataType::Bool(value) => Cell::Bool(*value),
        DataType::Empty => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}
