use std::path::Path;

use indexmap::IndexMap;
use rust_xlsxwriter::Workbook;

use crate::error::Result;
use crate::io::store::{Cell, Grid};

/// Writes the provided sheets to the given path, replacing the file.
pub fn write_sheets(path: &Path, sheets: &IndexMap<String, Grid>) -> Result<()> {
    let mut workbook = Workbook::new();

    for (name, grid) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(name)?;

        for (row_idx, row) in grid.rows().iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (row_num, col_num) = (row_idx as u32, col_idx as u16);
                match cell {
                    Cell::Empty => {}
                    Cell::Text(text) => {
                        worksheet.write_string(row_num, col_num, text)?;
                    }
                    Cell::Number(number) => {
                        worksheet.write_number(row_num, col_num, *number)?;
                    }
                    Cell::Bool(value) => {
                        worksheet.write_boolean(row_num, col_num, *value)?;
                    }
                    Cell::Formula(formula) => {
                        let source = format!("={formula}");
                        worksheet.write_formula(row_num, col_num, source.as_str())?;
                    }
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
