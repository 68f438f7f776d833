use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType, Reader, Xlsx};
use thiserror::Error;

use super::model::{CellValue, Column, ColumnType, Table};

/// Why a file could not be turned into a [`Table`].
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0} (expected .csv or .xlsx)")]
    UnsupportedExtension(String),
    #[error("the file is empty")]
    Empty,
    #[error("row {row} has {found} fields but the header has {expected}")]
    Malformed {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("column '{column}' has {found} rows, expected {expected}")]
    RaggedColumns {
        column: String,
        expected: usize,
        found: usize,
    },
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Excel parse error: {0}")]
    Excel(#[from] calamine::XlsxError),
    #[error("the workbook contains no worksheet")]
    NoWorksheet,
    #[error("reading file: {0}")]
    Io(#[from] std::io::Error),
}

/// Tokens read as a missing value, as common DataFrame readers do.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "NaN", "nan", "-NaN", "null", "NULL", "None", "#N/A", "<NA>",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a file on disk.  Dispatch by extension.
pub fn load_file(path: &Path) -> Result<Table, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();
    let bytes = std::fs::read(path)?;
    load_bytes(&bytes, &ext)
}

/// Parse an uploaded byte stream given its declared extension.
///
/// Supported formats:
/// * `.csv`  – comma separated, header row first
/// * `.xlsx` – first worksheet, header row first
pub fn load_bytes(bytes: &[u8], extension: &str) -> Result<Table, LoadError> {
    let ext = extension.trim_start_matches('.').to_ascii_lowercase();
    if ext != "csv" && ext != "xlsx" {
        return Err(LoadError::UnsupportedExtension(ext));
    }
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(LoadError::Empty);
    }

    let table = match ext.as_str() {
        "csv" => load_csv(bytes)?,
        _ => load_xlsx(bytes)?,
    };
    if table.n_cols() == 0 {
        return Err(LoadError::Empty);
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per row.
/// Short rows are padded with missing values; long rows are rejected.
fn load_csv(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);
    let headers = normalize_headers(reader.headers()?.iter().map(str::to_string).collect());
    let width = headers.len();

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > width {
            return Err(LoadError::Malformed {
                row: row_no + 1,
                expected: width,
                found: record.len(),
            });
        }
        for (col_idx, cells) in raw.iter_mut().enumerate() {
            let value = record
                .get(col_idx)
                .filter(|s| !NA_TOKENS.contains(s))
                .map(str::to_string);
            cells.push(value);
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| column_from_strings(name, cells))
        .collect();
    Table::new(columns)
}

/// Pick the narrowest dtype every non-missing cell parses as.
fn column_from_strings(name: String, cells: Vec<Option<String>>) -> Column {
    let present = || cells.iter().flatten().map(|s| s.trim());

    let dtype = if present().next().is_none() {
        ColumnType::Text
    } else if present().all(|s| s.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present().all(|s| s.parse::<f64>().is_ok()) {
        ColumnType::Float
    } else if present().all(|s| parse_bool(s).is_some()) {
        ColumnType::Bool
    } else {
        ColumnType::Text
    };

    let values = cells
        .into_iter()
        .map(|cell| match cell {
            None => CellValue::Null,
            Some(s) => typed_value(s, dtype),
        })
        .collect();
    Column::new(name, dtype, values)
}

fn typed_value(s: String, dtype: ColumnType) -> CellValue {
    let t = s.trim();
    match dtype {
        ColumnType::Integer => t.parse().map(CellValue::Integer).unwrap_or(CellValue::Null),
        ColumnType::Float => t.parse().map(float_cell).unwrap_or(CellValue::Null),
        ColumnType::Bool => parse_bool(t).map(CellValue::Bool).unwrap_or(CellValue::Null),
        ColumnType::DateTime | ColumnType::Text => CellValue::Text(s),
    }
}

/// NaN is a missing value, whatever spelling produced it.
fn float_cell(f: f64) -> CellValue {
    if f.is_nan() {
        CellValue::Null
    } else {
        CellValue::Float(f)
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

/// Fill blank header names and de-duplicate repeated ones (`a`, `a.1`, ...).
fn normalize_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(i, name)| {
            let base = if name.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                name
            };
            let mut candidate = base.clone();
            let mut n = 1;
            while !seen.insert(candidate.clone()) {
                candidate = format!("{base}.{n}");
                n += 1;
            }
            candidate
        })
        .collect()
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

/// Read the first worksheet; its first row holds the column names.
fn load_xlsx(bytes: &[u8]) -> Result<Table, LoadError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(LoadError::Empty);
    };
    let headers = normalize_headers(header_row.iter().map(excel_text).collect());
    let body: Vec<&[Data]> = rows.collect();

    let columns = headers
        .into_iter()
        .enumerate()
        .map(|(col_idx, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(col_idx).unwrap_or(&Data::Empty))
                .collect();
            column_from_excel(name, &cells)
        })
        .collect();
    Table::new(columns)
}

fn is_missing(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

fn excel_text(cell: &Data) -> String {
    if is_missing(cell) {
        return String::new();
    }
    cell.as_string().unwrap_or_else(|| cell.to_string())
}

fn column_from_excel(name: String, cells: &[&Data]) -> Column {
    let present: Vec<&Data> = cells.iter().copied().filter(|c| !is_missing(c)).collect();
    let is_number = |c: &&Data| c.is_int() || c.is_float();

    let dtype = if present.is_empty() {
        ColumnType::Text
    } else if present.iter().all(is_number) {
        let whole = present
            .iter()
            .all(|c| c.is_int() || c.get_float().is_some_and(|f| f.fract() == 0.0));
        if whole {
            ColumnType::Integer
        } else {
            ColumnType::Float
        }
    } else if present.iter().all(|c| c.is_bool()) {
        ColumnType::Bool
    } else if present.iter().all(|c| c.is_datetime()) {
        ColumnType::DateTime
    } else {
        ColumnType::Text
    };

    let values = cells
        .iter()
        .map(|cell| {
            if is_missing(cell) {
                return CellValue::Null;
            }
            let value = match dtype {
                ColumnType::Integer => cell.as_i64().map(CellValue::Integer),
                ColumnType::Float => cell.as_f64().map(float_cell),
                ColumnType::Bool => cell.get_bool().map(CellValue::Bool),
                ColumnType::DateTime => cell.as_datetime().map(CellValue::DateTime),
                ColumnType::Text => Some(CellValue::Text(excel_text(cell))),
            };
            value.unwrap_or(CellValue::Null)
        })
        .collect();
    Column::new(name, dtype, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(text: &str) -> Table {
        load_bytes(text.as_bytes(), "csv").unwrap()
    }

    #[test]
    fn infers_column_dtypes_from_strings() {
        let table = load("i,f,b,t\n1,1.5,true,x\n2,2,False,y\n");
        let dtypes: Vec<ColumnType> = table.columns().iter().map(|c| c.dtype).collect();
        assert_eq!(
            dtypes,
            vec![ColumnType::Integer, ColumnType::Float, ColumnType::Bool, ColumnType::Text]
        );
        assert_eq!(table.column("f").unwrap().values[1], CellValue::Float(2.0));
    }

    #[test]
    fn na_tokens_become_null_without_changing_dtype() {
        let table = load("a,b\n1,x\nNA,\n3,z\n");
        let a = table.column("a").unwrap();
        assert_eq!(a.dtype, ColumnType::Integer);
        assert_eq!(a.values[1], CellValue::Null);
        assert_eq!(table.column("b").unwrap().values[1], CellValue::Null);
    }

    #[test]
    fn mixed_column_keeps_raw_text() {
        let table = load("code\n007\nabc\n");
        let col = table.column("code").unwrap();
        assert_eq!(col.dtype, ColumnType::Text);
        assert_eq!(col.values[0], CellValue::Text("007".into()));
    }

    #[test]
    fn short_rows_are_padded_long_rows_rejected() {
        let table = load("a,b\n1\n2,3\n");
        assert_eq!(table.column("b").unwrap().values[0], CellValue::Null);

        let err = load_bytes(b"a,b\n1,2,3\n", "csv").unwrap_err();
        assert!(matches!(err, LoadError::Malformed { row: 1, expected: 2, found: 3 }));
    }

    #[test]
    fn headers_are_filled_and_deduplicated() {
        let table = load("a,,a,a\n1,2,3,4\n");
        assert_eq!(table.column_names(), vec!["a", "Unnamed: 1", "a.1", "a.2"]);
    }

    #[test]
    fn header_only_file_yields_zero_rows() {
        let table = load("a,b\n");
        assert_eq!(table.n_cols(), 2);
        assert_eq!(table.n_rows(), 0);
    }

    #[test]
    fn rejects_empty_and_unknown_inputs() {
        assert!(matches!(load_bytes(b"", "csv"), Err(LoadError::Empty)));
        assert!(matches!(load_bytes(b"  \n", "csv"), Err(LoadError::Empty)));
        assert!(matches!(
            load_bytes(b"a,b", "json"),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "json"
        ));
    }

    #[test]
    fn extension_is_case_insensitive() {
        assert!(load_bytes(b"a\n1\n", ".CSV").is_ok());
    }

    #[test]
    fn nan_spellings_are_missing_values() {
        let table = load("x\n1.5\nNAN\n3.5\n-nan\n");
        let x = table.column("x").unwrap();
        assert_eq!(x.dtype, ColumnType::Float);
        assert_eq!(
            x.values,
            vec![CellValue::Float(1.5), CellValue::Null, CellValue::Float(3.5), CellValue::Null]
        );
    }

    /// Columns: whole numbers, text with a gap, dates, fractions, bools, and
    /// a column mixing a number with text.
    fn sample_workbook() -> Vec<u8> {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let sheet = workbook.add_worksheet();
        for (col, name) in ["a", "b", "c", "f", "flag", "mixed"].into_iter().enumerate() {
            sheet.write_string(0, col as u16, name).unwrap();
        }
        for (i, day) in [1u8, 2, 3].into_iter().enumerate() {
            let date = ExcelDateTime::from_ymd(2020, 1, day).unwrap();
            sheet
                .write_datetime_with_format(i as u32 + 1, 2, &date, &date_format)
                .unwrap();
        }
        sheet.write_number(1, 0, 1.0).unwrap();
        sheet.write_number(2, 0, 2.0).unwrap();
        sheet.write_string(1, 1, "x").unwrap();
        sheet.write_string(3, 1, "y").unwrap();
        sheet.write_number(1, 3, 1.5).unwrap();
        sheet.write_number(2, 3, 2.0).unwrap();
        sheet.write_boolean(1, 4, true).unwrap();
        sheet.write_boolean(2, 4, false).unwrap();
        sheet.write_boolean(3, 4, true).unwrap();
        sheet.write_number(1, 5, 2.5).unwrap();
        sheet.write_string(2, 5, "x").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn workbook_cells_map_to_column_dtypes() {
        let table = load_bytes(&sample_workbook(), "xlsx").unwrap();
        assert_eq!(table.column_names(), vec!["a", "b", "c", "f", "flag", "mixed"]);
        assert_eq!(table.n_rows(), 3);

        let dtypes: Vec<ColumnType> = table.columns().iter().map(|c| c.dtype).collect();
        assert_eq!(
            dtypes,
            vec![
                ColumnType::Integer,
                ColumnType::Text,
                ColumnType::DateTime,
                ColumnType::Float,
                ColumnType::Bool,
                ColumnType::Text,
            ]
        );

        let values = |name: &str| table.column(name).unwrap().values.clone();
        assert_eq!(
            values("a"),
            vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Null]
        );
        assert_eq!(
            values("b"),
            vec![CellValue::Text("x".into()), CellValue::Null, CellValue::Text("y".into())]
        );
        let first_day = chrono::NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(values("c")[0], CellValue::DateTime(first_day));
        assert_eq!(
            values("f"),
            vec![CellValue::Float(1.5), CellValue::Float(2.0), CellValue::Null]
        );
        assert_eq!(
            values("flag"),
            vec![CellValue::Bool(true), CellValue::Bool(false), CellValue::Bool(true)]
        );
        assert_eq!(
            values("mixed"),
            vec![CellValue::Text("2.5".into()), CellValue::Text("x".into()), CellValue::Null]
        );
    }

    #[test]
    fn corrupt_workbook_is_an_excel_error() {
        let err = load_bytes(b"definitely not a zip archive", "xlsx").unwrap_err();
        assert!(matches!(err, LoadError::Excel(_)));
    }
}
