use super::model::{ColumnType, Table};

/// Partition of column names by inferred element type.
/// Each list keeps table column order; a column lands in exactly one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClasses {
    pub numeric: Vec<String>,
    pub temporal: Vec<String>,
    pub categorical: Vec<String>,
}

impl ColumnClasses {
    pub fn has_line_chart(&self) -> bool {
        !self.temporal.is_empty() && !self.numeric.is_empty()
    }
}

pub fn classify(table: &Table) -> ColumnClasses {
    let mut classes = ColumnClasses::default();
    for column in table.columns() {
        let bucket = match column.dtype {
            ColumnType::Integer | ColumnType::Float => &mut classes.numeric,
            ColumnType::DateTime => &mut classes.temporal,
            ColumnType::Bool | ColumnType::Text => &mut classes.categorical,
        };
        bucket.push(column.name.clone());
    }
    classes
}
