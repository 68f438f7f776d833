use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if !state.is_loaded() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            category_filter(ui, state);
            ui.separator();
            numeric_filter(ui, state);
        });
}

fn category_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Category");
    let Some(current) = state.filters.category.as_ref().map(|f| f.column.clone()) else {
        ui.label("No categorical columns.");
        return;
    };

    let columns = state.classes.categorical.clone();
    egui::ComboBox::from_id_salt("category_column")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                if ui.selectable_label(current == *col, col).clicked() {
                    state.set_category_column(col);
                }
            }
        });

    let n_selected = state
        .filters
        .category
        .as_ref()
        .map_or(0, |f| f.selected.len());
    let n_total = state.category_options.len();
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("{n_selected}/{n_total} selected"));
        if ui.small_button("Clear").clicked() {
            state.clear_category_values();
        }
    });
    if n_selected == 0 {
        ui.label(RichText::new("Nothing selected: all rows shown").weak());
    }

    let options = state.category_options.clone();
    for value in &options {
        let mut checked = state
            .filters
            .category
            .as_ref()
            .is_some_and(|f| f.selected.contains(value));
        let mut text = RichText::new(value.to_string());
        if state.charts.pie.as_deref() == Some(current.as_str()) {
            if let Some(cm) = &state.color_map {
                text = text.color(cm.color_for(value));
            }
        }
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_category_value(value);
        }
    }
}

fn numeric_filter(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Numeric range");
    let Some(numeric) = state.filters.numeric.clone() else {
        ui.label("No numeric columns.");
        return;
    };

    let columns = state.classes.numeric.clone();
    egui::ComboBox::from_id_salt("numeric_column")
        .selected_text(&numeric.column)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &columns {
                if ui.selectable_label(numeric.column == *col, col).clicked() {
                    state.set_numeric_column(col);
                }
            }
        });

    let Some((min, max)) = state.numeric_bounds else {
        ui.label("No values in range.");
        return;
    };
    let Some(current) = state.filters.numeric.clone() else {
        return;
    };
    let (mut lo, mut hi) = (current.lo, current.hi);
    let lo_changed = ui.add(egui::Slider::new(&mut lo, min..=max).text("min")).changed();
    let hi_changed = ui.add(egui::Slider::new(&mut hi, min..=max).text("max")).changed();
    if lo_changed || hi_changed {
        state.set_numeric_range(lo, hi);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{}: {} rows loaded, {} visible",
                state.source_name.as_deref().unwrap_or("table"),
                table.n_rows(),
                state.visible_indices.len()
            ));
            ui.separator();

            if ui.button("⬇ Download filtered data as CSV").clicked() {
                export_csv_dialog(state);
            }
            if ui.button("⬇ Download summary as PDF").clicked() {
                export_pdf_dialog(state);
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CSV or Excel file")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_file();

    if let Some(path) = file {
        // Errors are already logged and shown through `status_message`.
        let _ = state.open_path(&path);
    }
}

fn export_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(&state.config.csv_file_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        let result = state
            .export_csv()
            .context("serializing filtered rows")
            .and_then(|bytes| write_export(&path, &bytes));
        report(state, result, &path);
    }
}

fn export_pdf_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Save data summary")
        .set_file_name(&state.config.pdf_file_name)
        .add_filter("PDF", &["pdf"])
        .save_file();

    if let Some(path) = file {
        let result = state
            .export_summary_pdf()
            .context("rendering summary PDF")
            .and_then(|bytes| write_export(&path, &bytes));
        report(state, result, &path);
    }
}

fn write_export(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn report(state: &mut AppState, result: Result<()>, path: &Path) {
    match result {
        Ok(()) => {
            log::info!("Exported {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}
