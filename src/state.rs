use std::path::Path;

use crate::chart::{self, ChartSet};
use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::classify::{classify, ColumnClasses};
use crate::data::filter::{
    category_indices, filtered_indices, numeric_bounds, CategoryFilter, FilterSelection,
    NumericFilter,
};
use crate::data::infer::infer_temporal;
use crate::data::loader::{self, LoadError};
use crate::data::model::{distinct_values, CellValue, Table};
use crate::data::stats::describe;
use crate::export::{self, ExportError};

// ---------------------------------------------------------------------------
// Chart column choices
// ---------------------------------------------------------------------------

/// Which column each chart draws.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSelection {
    pub histogram: Option<String>,
    pub pie: Option<String>,
    pub line_x: Option<String>,
    pub line_y: Option<String>,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// `table == None` is the Empty state; a successful load moves to Loaded and
/// a later load replaces the table in place. A failed load keeps whatever
/// was there and records the error in `status_message`.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded table (None until user loads a file).
    pub table: Option<Table>,

    /// File name of the loaded table.
    pub source_name: Option<String>,

    /// Column partition of the loaded table.
    pub classes: ColumnClasses,

    /// Category membership and numeric range selections.
    pub filters: FilterSelection,

    /// Distinct values offered by the category filter.
    pub category_options: Vec<CellValue>,

    /// Observed range of the numeric filter column after the category filter.
    pub numeric_bounds: Option<(f64, f64)>,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    pub charts: ChartSelection,

    /// Pie slice colours for the pie column.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            table: None,
            source_name: None,
            classes: ColumnClasses::default(),
            filters: FilterSelection::default(),
            category_options: Vec::new(),
            numeric_bounds: None,
            visible_indices: Vec::new(),
            charts: ChartSelection::default(),
            color_map: None,
            status_message: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }

    /// Parse an uploaded file; the extension is taken from `name`.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) -> Result<(), LoadError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        match loader::load_bytes(bytes, ext) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from {name}",
                    table.n_rows(),
                    table.column_names()
                );
                self.source_name = Some(name.to_string());
                self.set_table(table);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e}");
                self.status_message = Some(format!("Error loading file: {e}"));
                Err(e)
            }
        }
    }

    /// Read and load a file from disk.
    pub fn open_path(&mut self, path: &Path) -> Result<(), LoadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match std::fs::read(path) {
            Ok(bytes) => self.load_bytes(&name, &bytes),
            Err(e) => {
                log::error!("Failed to read {}: {e}", path.display());
                self.status_message = Some(format!("Error loading file: {e}"));
                Err(LoadError::Io(e))
            }
        }
    }

    /// Ingest a newly loaded table: infer types, classify, reset selections.
    pub fn set_table(&mut self, mut table: Table) {
        let converted = infer_temporal(&mut table);
        if !converted.is_empty() {
            log::info!("Parsed {converted:?} as datetime");
        }
        self.classes = classify(&table);

        // Defaults: first column of each class.
        self.charts = ChartSelection {
            histogram: self.classes.numeric.first().cloned(),
            pie: self.classes.categorical.first().cloned(),
            line_x: self.classes.temporal.first().cloned(),
            line_y: self.classes.numeric.first().cloned(),
        };
        self.filters = FilterSelection {
            category: self.classes.categorical.first().map(CategoryFilter::new),
            numeric: None,
        };
        self.numeric_bounds = None;

        self.table = Some(table);
        self.status_message = None;

        self.refresh_category_options();
        self.rebuild_color_map();
        if let Some(col) = self.classes.numeric.first().cloned() {
            self.set_numeric_column(&col);
        } else {
            self.refilter();
        }
    }

    fn refresh_category_options(&mut self) {
        self.category_options = match (&self.table, &self.filters.category) {
            (Some(table), Some(filter)) => table
                .column(&filter.column)
                .map(distinct_values)
                .unwrap_or_default(),
            _ => Vec::new(),
        };
    }

    /// Rebuild the pie colour map from the current pie column.
    fn rebuild_color_map(&mut self) {
        self.color_map = match (&self.table, &self.charts.pie) {
            (Some(table), Some(col)) => table
                .column(col)
                .map(|c| ColorMap::new(col, &distinct_values(c))),
            _ => None,
        };
    }

    /// Recompute `numeric_bounds` and `visible_indices` after a filter change.
    ///
    /// The numeric bounds follow the category-filtered rows; when they move,
    /// the numeric range snaps back to the new full range.
    pub fn refilter(&mut self) {
        let Some(table) = &self.table else {
            self.visible_indices.clear();
            return;
        };
        if let Some(numeric) = &mut self.filters.numeric {
            let rows = category_indices(table, self.filters.category.as_ref());
            let bounds = numeric_bounds(table, &numeric.column, &rows);
            if bounds != self.numeric_bounds {
                if let Some((min, max)) = bounds {
                    numeric.lo = min;
                    numeric.hi = max;
                }
                self.numeric_bounds = bounds;
            }
        }
        self.visible_indices = filtered_indices(table, &self.filters);
    }

    // -- filter controls --

    /// Choose the category filter column; clears the selected values.
    pub fn set_category_column(&mut self, column: &str) {
        if !self.classes.categorical.iter().any(|c| c == column) {
            return;
        }
        self.filters.category = Some(CategoryFilter::new(column));
        self.refresh_category_options();
        self.refilter();
    }

    /// Toggle a single value in the category filter.
    pub fn toggle_category_value(&mut self, value: &CellValue) {
        if let Some(filter) = &mut self.filters.category {
            if !filter.selected.remove(value) {
                filter.selected.insert(value.clone());
            }
            self.refilter();
        }
    }

    /// Deselect every value, which disables the category filter.
    pub fn clear_category_values(&mut self) {
        if let Some(filter) = &mut self.filters.category {
            filter.selected.clear();
            self.refilter();
        }
    }

    /// Choose the numeric filter column; the range resets to its full bounds.
    pub fn set_numeric_column(&mut self, column: &str) {
        let Some(table) = &self.table else {
            return;
        };
        if !self.classes.numeric.iter().any(|c| c == column) {
            return;
        }
        let rows = category_indices(table, self.filters.category.as_ref());
        self.numeric_bounds = numeric_bounds(table, column, &rows);
        let (lo, hi) = self.numeric_bounds.unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        self.filters.numeric = Some(NumericFilter {
            column: column.to_string(),
            lo,
            hi,
        });
        self.refilter();
    }

    /// Set the numeric interval, clamped to the observed bounds.
    pub fn set_numeric_range(&mut self, lo: f64, hi: f64) {
        let Some(numeric) = &mut self.filters.numeric else {
            return;
        };
        let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if let Some((min, max)) = self.numeric_bounds {
            lo = lo.clamp(min, max);
            hi = hi.clamp(min, max);
        }
        numeric.lo = lo;
        numeric.hi = hi;
        self.refilter();
    }

    // -- chart controls --

    pub fn set_histogram_column(&mut self, column: &str) {
        if self.classes.numeric.iter().any(|c| c == column) {
            self.charts.histogram = Some(column.to_string());
        }
    }

    pub fn set_pie_column(&mut self, column: &str) {
        if self.classes.categorical.iter().any(|c| c == column) {
            self.charts.pie = Some(column.to_string());
            self.rebuild_color_map();
        }
    }

    pub fn set_line_columns(&mut self, x: &str, y: &str) {
        if self.classes.temporal.iter().any(|c| c == x) && self.classes.numeric.iter().any(|c| c == y) {
            self.charts.line_x = Some(x.to_string());
            self.charts.line_y = Some(y.to_string());
        }
    }

    // -- derived views --

    /// The filtered rows as a materialized table.
    pub fn filtered_table(&self) -> Option<Table> {
        self.table.as_ref().map(|t| t.take(&self.visible_indices))
    }

    /// First `preview_rows` rows of the loaded table.
    pub fn preview(&self) -> Option<Table> {
        self.table.as_ref().map(|t| t.head(self.config.preview_rows))
    }

    /// Build every chart whose required column classes are present.
    pub fn charts(&self) -> ChartSet {
        let Some(table) = &self.table else {
            return ChartSet::default();
        };
        let rows = &self.visible_indices;
        let histogram = self
            .charts
            .histogram
            .as_deref()
            .and_then(|col| chart::histogram(table, col, rows, self.config.histogram_bins));
        let pie = self
            .charts
            .pie
            .as_deref()
            .and_then(|col| chart::pie_chart(table, col, rows));
        let line = match (self.charts.line_x.as_deref(), self.charts.line_y.as_deref()) {
            (Some(x), Some(y)) => chart::line_chart(table, x, y, rows),
            _ => None,
        };
        ChartSet { histogram, pie, line }
    }

    // -- exports --

    /// Filtered rows as CSV bytes.
    pub fn export_csv(&self) -> Result<Vec<u8>, ExportError> {
        let table = self.table.as_ref().ok_or(ExportError::NoTable)?;
        export::csv::write_csv(table, &self.visible_indices)
    }

    /// Descriptive statistics of the filtered rows as a PDF document.
    pub fn export_summary_pdf(&self) -> Result<Vec<u8>, ExportError> {
        let filtered = self.filtered_table().ok_or(ExportError::NoTable)?;
        export::pdf::summary_pdf(&describe(&filtered), &self.config.pdf)
    }
}
