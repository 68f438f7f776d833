use chrono::NaiveDateTime;

use crate::data::model::{distinct_values, CellValue, ColumnType, Table};

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub column: String,
    pub bins: Vec<Bin>,
}

/// Sturges' rule: `ceil(log2 n) + 1`.
fn sturges(n: usize) -> usize {
    (n as f64).log2().ceil() as usize + 1
}

/// Equal-width frequency counts of a numeric column over `rows`.
///
/// The last bin is closed on the right, and there are never more bins than
/// values. Returns `None` for a non-numeric or unknown column.
pub fn histogram(table: &Table, column: &str, rows: &[usize], bins: Option<usize>) -> Option<Histogram> {
    let col = table.column(column).filter(|c| c.dtype.is_numeric())?;
    let values = col.numeric_values(rows);
    let mut hist = Histogram {
        column: column.to_string(),
        bins: Vec::new(),
    };
    if values.is_empty() {
        return Some(hist);
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        hist.bins.push(Bin {
            lo: min - 0.5,
            hi: max + 0.5,
            count: values.len(),
        });
        return Some(hist);
    }

    let n_bins = bins.unwrap_or_else(|| sturges(values.len())).clamp(1, values.len());
    let width = (max - min) / n_bins as f64;
    hist.bins = (0..n_bins)
        .map(|i| Bin {
            lo: min + width * i as f64,
            hi: if i + 1 == n_bins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(n_bins - 1);
        hist.bins[idx].count += 1;
    }
    Some(hist)
}

// ---------------------------------------------------------------------------
// Pie chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub value: CellValue,
    pub count: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PieChart {
    pub column: String,
    pub slices: Vec<Slice>,
}

/// Share of each distinct non-missing value, in first-appearance order.
pub fn pie_chart(table: &Table, column: &str, rows: &[usize]) -> Option<PieChart> {
    table.column(column)?;
    let subset = table.take(rows);
    let col = subset.column(column)?;
    let values = &col.values;
    let total = values.iter().filter(|v| !v.is_null()).count();

    let slices = distinct_values(col)
        .into_iter()
        .map(|value| {
            let count = values.iter().filter(|v| **v == value).count();
            Slice {
                value,
                count,
                fraction: count as f64 / total as f64,
            }
        })
        .collect();
    Some(PieChart {
        column: column.to_string(),
        slices,
    })
}

// ---------------------------------------------------------------------------
// Line chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    pub x_column: String,
    pub y_column: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Stable ascending sort of `rows` by a temporal column; missing timestamps last.
pub fn sort_by_time(table: &Table, column: &str, rows: &[usize]) -> Vec<usize> {
    let mut sorted = rows.to_vec();
    if let Some(col) = table.column(column) {
        sorted.sort_by_key(|&r| {
            let ts = col.values.get(r).and_then(CellValue::as_datetime);
            (ts.is_none(), ts)
        });
    }
    sorted
}

/// `y_column` plotted against time-sorted `x_column`, skipping missing points.
pub fn line_chart(table: &Table, x_column: &str, y_column: &str, rows: &[usize]) -> Option<LineChart> {
    let x = table.column(x_column).filter(|c| c.dtype == ColumnType::DateTime)?;
    let y = table.column(y_column).filter(|c| c.dtype.is_numeric())?;
    let points = sort_by_time(table, x_column, rows)
        .into_iter()
        .filter_map(|r| Some((x.values.get(r)?.as_datetime()?, y.values.get(r)?.as_f64()?)))
        .collect();
    Some(LineChart {
        x_column: x_column.to_string(),
        y_column: y_column.to_string(),
        points,
    })
}

/// The charts that apply to the current table; absent ones are omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSet {
    pub histogram: Option<Histogram>,
    pub pie: Option<PieChart>,
    pub line: Option<LineChart>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;
    use chrono::NaiveDate;

    fn day(d: u32) -> CellValue {
        CellValue::DateTime(NaiveDate::from_ymd_opt(2020, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn ints(values: &[i64]) -> Vec<CellValue> {
        values.iter().map(|&v| CellValue::Integer(v)).collect()
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let table = Table::new(vec![Column::new("n", ColumnType::Integer, ints(&[0, 1, 2, 3, 4, 10]))]).unwrap();
        let hist = histogram(&table, "n", &table.all_rows(), Some(5)).unwrap();

        assert_eq!(hist.bins.len(), 5);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 6);
        assert_eq!(hist.bins[0].count, 2);
        assert_eq!(hist.bins[4].count, 1);
        assert_eq!(hist.bins[4].hi, 10.0);
    }

    #[test]
    fn histogram_degenerate_and_empty_inputs() {
        let table = Table::new(vec![Column::new("n", ColumnType::Integer, ints(&[7, 7]))]).unwrap();
        let hist = histogram(&table, "n", &[0, 1], None).unwrap();
        assert_eq!(hist.bins, vec![Bin { lo: 6.5, hi: 7.5, count: 2 }]);

        let empty = histogram(&table, "n", &[], None).unwrap();
        assert!(empty.bins.is_empty());
    }

    #[test]
    fn bin_count_is_capped_by_the_number_of_values() {
        let table = Table::new(vec![Column::new("n", ColumnType::Integer, ints(&[1, 2, 3]))]).unwrap();
        let hist = histogram(&table, "n", &table.all_rows(), Some(usize::MAX)).unwrap();
        assert_eq!(hist.bins.len(), 3);
        assert_eq!(hist.bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn pie_fractions_sum_to_one() {
        let text = |s: &str| CellValue::Text(s.to_string());
        let table = Table::new(vec![Column::new(
            "c",
            ColumnType::Text,
            vec![text("b"), text("a"), text("b"), CellValue::Null],
        )])
        .unwrap();
        let pie = pie_chart(&table, "c", &table.all_rows()).unwrap();

        assert_eq!(pie.slices.len(), 2);
        assert_eq!(pie.slices[0].value, text("b"));
        assert_eq!(pie.slices[0].count, 2);
        assert!((pie.slices.iter().map(|s| s.fraction).sum::<f64>() - 1.0).abs() < 1e-12);

        assert!(pie_chart(&table, "c", &[]).unwrap().slices.is_empty());
    }

    #[test]
    fn time_sort_is_stable_with_nulls_last() {
        let table = Table::new(vec![
            Column::new("t", ColumnType::DateTime, vec![day(2), CellValue::Null, day(1), day(2), day(1)]),
            Column::new("v", ColumnType::Integer, ints(&[0, 1, 2, 3, 4])),
        ])
        .unwrap();

        assert_eq!(sort_by_time(&table, "t", &table.all_rows()), vec![2, 4, 0, 3, 1]);

        let line = line_chart(&table, "t", "v", &table.all_rows()).unwrap();
        let ys: Vec<f64> = line.points.iter().map(|p| p.1).collect();
        assert_eq!(ys, vec![2.0, 4.0, 0.0, 3.0]);
    }

    #[test]
    fn line_chart_requires_matching_column_types() {
        let table = Table::new(vec![
            Column::new("t", ColumnType::DateTime, vec![day(1)]),
            Column::new("v", ColumnType::Integer, ints(&[1])),
        ])
        .unwrap();
        assert!(line_chart(&table, "v", "t", &[0]).is_none());
    }

    #[test]
    fn rows_past_the_end_are_skipped() {
        let table = Table::new(vec![
            Column::new("t", ColumnType::DateTime, vec![day(2), day(1)]),
            Column::new("v", ColumnType::Integer, ints(&[5, 6])),
        ])
        .unwrap();

        assert_eq!(sort_by_time(&table, "t", &[9, 0, 1]), vec![1, 0, 9]);
        let line = line_chart(&table, "t", "v", &[9, 0, 1]).unwrap();
        assert_eq!(line.points.len(), 2);
    }
}
