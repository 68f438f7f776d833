use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{CellValue, Column, ColumnType, Table};

/// Timestamp layouts tried in order, date-and-time first.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Best-effort timestamp parser. Offsets are normalized to UTC.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Reinterpret every text column whose cells all parse as timestamps.
///
/// All-or-nothing per column: a single unparseable cell leaves the column
/// as it was. Returns the names of the converted columns.
pub fn infer_temporal(table: &mut Table) -> Vec<String> {
    let mut converted = Vec::new();
    for column in table.columns_mut() {
        if column.dtype != ColumnType::Text {
            continue;
        }
        match to_datetime(column) {
            Some(values) => {
                column.values = values;
                column.dtype = ColumnType::DateTime;
                converted.push(column.name.clone());
            }
            None => log::debug!("column '{}' kept as text", column.name),
        }
    }
    converted
}

fn to_datetime(column: &Column) -> Option<Vec<CellValue>> {
    if column.values.iter().all(CellValue::is_null) {
        return None;
    }
    column
        .values
        .iter()
        .map(|v| match v {
            CellValue::Null => Some(CellValue::Null),
            CellValue::Text(s) => parse_datetime(s).map(CellValue::DateTime),
            _ => None,
        })
        .collect()
}
