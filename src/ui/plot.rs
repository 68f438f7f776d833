use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, RichText, ScrollArea, Sense, Shape, Stroke, Ui, Vec2};
use egui_extras::{Column as TableColumn, TableBuilder};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints, Points};

use crate::chart::{Histogram, LineChart, PieChart};
use crate::data::model::{CellValue, Table};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel: preview + charts
// ---------------------------------------------------------------------------

/// Render the data preview and every applicable chart.
pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let Some(preview) = state.preview() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a CSV or Excel file to build a dashboard  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Data Preview");
            preview_table(ui, &preview);
            ui.separator();

            ui.heading("Charts");
            chart_selectors(ui, state);
            let charts = state.charts();

            if let Some(hist) = &charts.histogram {
                histogram_plot(ui, hist);
            }
            if let Some(pie) = &charts.pie {
                pie_plot(ui, pie, state);
            }
            if let Some(line) = &charts.line {
                line_plot(ui, line);
            }
        });
}

fn preview_table(ui: &mut Ui, table: &Table) {
    let columns = table.columns();
    ui.push_id("preview_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(TableColumn::auto().at_least(60.0), columns.len())
            .header(20.0, |mut header| {
                for col in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(format!("{} ({})", col.name, col.dtype));
                    });
                }
            })
            .body(|mut body| {
                for row in 0..table.n_rows() {
                    body.row(18.0, |mut table_row| {
                        for col in columns {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(col.values[row].to_string());
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Column selectors
// ---------------------------------------------------------------------------

/// A combo box over `columns`; returns the newly picked column, if any.
fn column_combo(ui: &mut Ui, id: &str, label: &str, columns: &[String], current: Option<&str>) -> Option<String> {
    let mut picked = None;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        egui::ComboBox::from_id_salt(id)
            .selected_text(current.unwrap_or(""))
            .show_ui(ui, |ui: &mut Ui| {
                for col in columns {
                    if ui.selectable_label(current == Some(col.as_str()), col).clicked() {
                        picked = Some(col.clone());
                    }
                }
            });
    });
    picked
}

fn chart_selectors(ui: &mut Ui, state: &mut AppState) {
    let classes = state.classes.clone();
    let selection = state.charts.clone();

    if !classes.numeric.is_empty() {
        if let Some(col) = column_combo(
            ui,
            "hist_column",
            "Histogram column",
            &classes.numeric,
            selection.histogram.as_deref(),
        ) {
            state.set_histogram_column(&col);
        }
    }
    if !classes.categorical.is_empty() {
        if let Some(col) = column_combo(
            ui,
            "pie_column",
            "Pie chart column",
            &classes.categorical,
            selection.pie.as_deref(),
        ) {
            state.set_pie_column(&col);
        }
    }
    if classes.has_line_chart() {
        let x = column_combo(ui, "line_x", "Date column", &classes.temporal, selection.line_x.as_deref());
        let y = column_combo(
            ui,
            "line_y",
            "Line chart value",
            &classes.numeric,
            selection.line_y.as_deref(),
        );
        if x.is_some() || y.is_some() {
            let x = x.or(selection.line_x).unwrap_or_default();
            let y = y.or(selection.line_y).unwrap_or_default();
            state.set_line_columns(&x, &y);
        }
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn histogram_plot(ui: &mut Ui, hist: &Histogram) {
    ui.add_space(8.0);
    ui.strong(format!("Histogram of {}", hist.column));

    let bars: Vec<Bar> = hist
        .bins
        .iter()
        .map(|b| Bar::new(b.center(), b.count as f64).width(b.width()))
        .collect();

    Plot::new("histogram_plot")
        .height(260.0)
        .x_axis_label(hist.column.as_str())
        .y_axis_label("count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE));
        });
}

fn pie_plot(ui: &mut Ui, pie: &PieChart, state: &AppState) {
    ui.add_space(8.0);
    ui.strong(format!("Pie Chart of {}", pie.column));

    if pie.slices.is_empty() {
        ui.label(RichText::new("No values to show.").weak());
        return;
    }

    let color_of = |value: &CellValue| {
        state
            .color_map
            .as_ref()
            .map_or(Color32::GRAY, |cm| cm.color_for(value))
    };

    ui.horizontal(|ui: &mut Ui| {
        let size = 220.0;
        let (rect, _) = ui.allocate_exact_size(Vec2::splat(size), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let radius = size / 2.0 - 4.0;
        let point = |angle: f32| center + radius * Vec2::new(angle.cos(), angle.sin());

        // Start at twelve o'clock, clockwise.
        let mut start = -TAU / 4.0;
        for slice in &pie.slices {
            let sweep = slice.fraction as f32 * TAU;
            let steps = ((sweep / 0.05).ceil() as usize).max(1);
            let color = color_of(&slice.value);
            for i in 0..steps {
                let a0 = start + sweep * i as f32 / steps as f32;
                let a1 = start + sweep * (i + 1) as f32 / steps as f32;
                let triangle: Vec<Pos2> = vec![center, point(a0), point(a1)];
                painter.add(Shape::convex_polygon(triangle, color, Stroke::NONE));
            }
            start += sweep;
        }

        ui.vertical(|ui: &mut Ui| {
            for slice in &pie.slices {
                let text = format!("{}  {:.1}% ({})", slice.value, slice.fraction * 100.0, slice.count);
                ui.label(RichText::new(text).color(color_of(&slice.value)));
            }
        });
    });
}

fn line_plot(ui: &mut Ui, line: &LineChart) {
    ui.add_space(8.0);
    ui.strong(format!("{} over {}", line.y_column, line.x_column));

    let coords: Vec<[f64; 2]> = line
        .points
        .iter()
        .map(|(t, y)| [t.and_utc().timestamp() as f64, *y])
        .collect();

    Plot::new("line_plot")
        .height(260.0)
        .x_axis_label(line.x_column.as_str())
        .y_axis_label(line.y_column.as_str())
        .x_axis_formatter(|mark, _range| {
            chrono::DateTime::from_timestamp(mark.value as i64, 0)
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(coords.clone()))
                    .name(&line.y_column)
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5),
            );
            plot_ui.points(Points::new(PlotPoints::from(coords)).radius(2.5));
        });
}
