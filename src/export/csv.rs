use crate::data::model::{CellValue, Column, ColumnType, Table};

use super::ExportError;

/// Serialize `rows` of `table` as UTF-8 CSV: header row, `\n` line ends,
/// no index column. Row indices past the end are written as empty cells.
pub fn write_csv(table: &Table, rows: &[usize]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;

    let date_only: Vec<bool> = table.columns().iter().map(is_date_only).collect();
    for &row in rows {
        let record = table
            .columns()
            .iter()
            .zip(&date_only)
            .map(|(col, &date_only)| {
                col.values
                    .get(row)
                    .map_or_else(String::new, |value| format_cell(value, date_only))
            });
        writer.write_record(record)?;
    }

    writer
        .into_inner()
        .map_err(|e| ExportError::Io(e.into_error()))
}

/// A datetime column whose every value sits at midnight is written as plain dates.
fn is_date_only(column: &Column) -> bool {
    column.dtype == ColumnType::DateTime
        && column
            .values
            .iter()
            .filter_map(CellValue::as_datetime)
            .all(|d| d.time() == chrono::NaiveTime::MIN)
}

fn format_cell(value: &CellValue, date_only: bool) -> String {
    match value {
        CellValue::Null => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Integer(i) => i.to_string(),
        CellValue::Float(f) => format_float(*f),
        CellValue::Bool(true) => "True".to_string(),
        CellValue::Bool(false) => "False".to_string(),
        CellValue::DateTime(d) if date_only => d.format("%Y-%m-%d").to_string(),
        CellValue::DateTime(d) => d.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
    }
}

/// Whole floats keep one decimal (`2.0`) so they reload as floats.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
