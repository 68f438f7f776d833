use super::model::Table;

/// Row labels of a descriptive summary, in display order.
pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Descriptive statistics of every numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub columns: Vec<String>,
    /// `stats[c][s]` is statistic `STAT_LABELS[s]` of `columns[c]`.
    pub stats: Vec<[f64; 8]>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Look up one statistic by label (`"mean"`, `"25%"`, ...).
    pub fn value(&self, stat: &str, column: &str) -> Option<f64> {
        let s = STAT_LABELS.iter().position(|l| *l == stat)?;
        let c = self.columns.iter().position(|n| n == column)?;
        Some(self.stats[c][s])
    }

    /// Right-aligned monospaced table, values rounded to two decimals.
    pub fn to_text(&self) -> String {
        if self.is_empty() {
            return "Empty summary: no numeric columns".to_string();
        }
        let label_width = STAT_LABELS.iter().map(|l| l.len()).max().unwrap_or(0);
        let cells: Vec<Vec<String>> = self
            .stats
            .iter()
            .map(|col| col.iter().map(|v| format_stat(*v)).collect())
            .collect();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .zip(&cells)
            .map(|(name, col)| {
                col.iter()
                    .map(String::len)
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = " ".repeat(label_width);
        for (name, w) in self.columns.iter().zip(&widths) {
            out.push_str(&format!("  {name:>w$}"));
        }
        for (s, label) in STAT_LABELS.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{label:<label_width$}"));
            for (col, w) in cells.iter().zip(&widths) {
                out.push_str(&format!("  {:>w$}", col[s]));
            }
        }
        out
    }
}

fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.2}")
    }
}

/// Summarize every numeric column; other columns are left out.
pub fn describe(table: &Table) -> Summary {
    let rows = table.all_rows();
    let (columns, stats): (Vec<String>, Vec<[f64; 8]>) = table
        .columns()
        .iter()
        .filter(|c| c.dtype.is_numeric())
        .map(|c| (c.name.clone(), column_stats(c.numeric_values(&rows))))
        .unzip();
    Summary { columns, stats }
}

fn column_stats(mut values: Vec<f64>) -> [f64; 8] {
    values.sort_by(f64::total_cmp);
    let n = values.len();
    let count = n as f64;
    if n == 0 {
        return [0.0, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN];
    }
    let mean = values.iter().sum::<f64>() / count;
    let std = if n > 1 {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (count - 1.0)).sqrt()
    } else {
        f64::NAN
    };
    [
        count,
        mean,
        std,
        values[0],
        quantile(&values, 0.25),
        quantile(&values, 0.5),
        quantile(&values, 0.75),
        values[n - 1],
    ]
}

/// Linear-interpolated quantile of sorted, non-empty `values`.
fn quantile(values: &[f64], q: f64) -> f64 {
    let pos = q * (values.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    values[lo] + (values[hi] - values[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnType};

    fn table(values: Vec<CellValue>) -> Table {
        Table::new(vec![
            Column::new("a", ColumnType::Integer, values.clone()),
            Column::new(
                "label",
                ColumnType::Text,
                values.iter().map(|_| CellValue::Text("t".into())).collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn describes_numeric_columns_only() {
        let ints = [1, 2, 3].map(CellValue::Integer).to_vec();
        let summary = describe(&table(ints));

        assert_eq!(summary.columns, vec!["a"]);
        assert_eq!(summary.value("count", "a"), Some(3.0));
        assert_eq!(summary.value("mean", "a"), Some(2.0));
        assert_eq!(summary.value("std", "a"), Some(1.0));
        assert_eq!(summary.value("25%", "a"), Some(1.5));
        assert_eq!(summary.value("max", "a"), Some(3.0));
        assert_eq!(summary.value("mean", "label"), None);
    }

    #[test]
    fn text_rendering_rounds_to_two_decimals() {
        let ints = [1, 2, 3].map(CellValue::Integer).to_vec();
        let text = describe(&table(ints)).to_text();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0].trim(), "a");
        assert_eq!(lines[1], "count  3.00");
        assert_eq!(lines[2], "mean   2.00");
        assert_eq!(lines[4], "min    1.00");
        assert_eq!(lines[8], "max    3.00");
    }

    #[test]
    fn nulls_are_not_counted_and_empty_columns_are_nan() {
        let summary = describe(&table(vec![CellValue::Integer(4), CellValue::Null]));
        assert_eq!(summary.value("count", "a"), Some(1.0));
        assert!(summary.value("std", "a").unwrap().is_nan());

        let empty = describe(&table(Vec::new()));
        assert_eq!(empty.value("count", "a"), Some(0.0));
        assert!(empty.to_text().contains("NaN"));
    }

    #[test]
    fn no_numeric_columns_renders_a_notice() {
        let t = Table::new(vec![Column::new("s", ColumnType::Text, vec![])]).unwrap();
        assert_eq!(describe(&t).to_text(), "Empty summary: no numeric columns");
    }
}
