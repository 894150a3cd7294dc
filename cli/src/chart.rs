//! Character-grid rendering for the analytics page.

use std::fmt::Write as _;

use records::analytics::{AnalyticsSummary, Series};
use records::embedding::{ClientType, Plot, color_for_label};

pub const DEFAULT_COLUMNS: usize = 72;
pub const DEFAULT_ROWS: usize = 24;
const BAR_WIDTH: usize = 40;

/// Rasterize a plot onto a `columns` x `rows` grid. Each mark becomes the
/// first letter of its client type; overlapping marks show `*`.
#[must_use]
pub fn render_plot(plot: &Plot, columns: usize, rows: usize) -> String {
    let columns = columns.max(2);
    let rows = rows.max(2);
    let mut grid = vec![vec![' '; columns]; rows];

    for mark in &plot.marks {
        let Some((col, row)) = cell(mark.x, mark.y, plot.width, plot.height, columns, rows) else {
            continue;
        };
        let glyph = glyph_for_color(&mark.color);
        let slot = &mut grid[row][col];
        *slot = if *slot == ' ' || *slot == glyph { glyph } else { '*' };
    }

    let mut out = String::with_capacity((columns + 3) * (rows + 4));
    let border = format!("+{}+\n", "-".repeat(columns));
    out.push_str(&border);
    for row in grid {
        out.push('|');
        out.extend(row);
        out.push_str("|\n");
    }
    out.push_str(&border);

    for label in &plot.labels {
        let color = color_for_label(&label.text);
        let _ = writeln!(out, "  {} = {} {color}", glyph_for_label(&label.text), label.text);
    }
    if let Some(axes) = &plot.axes {
        let _ = writeln!(out, "  x: {}", axes.x_label);
        let _ = writeln!(out, "  y: {}", axes.y_label);
    }
    out.push_str(&legend());
    out
}

/// Map canvas coordinates to a grid cell. Marks outside the canvas (cluster
/// scatter can overshoot) are dropped.
fn cell(x: f64, y: f64, width: f64, height: f64, columns: usize, rows: usize) -> Option<(usize, usize)> {
    if !(0.0..=width).contains(&x) || !(0.0..=height).contains(&y) || width <= 0.0 || height <= 0.0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let to_index = |value: f64, extent: f64, cells: usize| -> usize {
        ((value / extent * cells as f64) as usize).min(cells - 1)
    };
    Some((to_index(x, width, columns), to_index(y, height, rows)))
}

fn glyph_for_label(label: &str) -> char {
    label.chars().next().unwrap_or('?')
}

/// Glyph keyed by mark colour so the grid and the legend agree.
fn glyph_for_color(color: &str) -> char {
    ClientType::ALL
        .iter()
        .find(|t| t.color() == color)
        .map_or('o', |t| glyph_for_label(t.label()))
}

fn legend() -> String {
    let entries: Vec<String> = ClientType::ALL
        .iter()
        .map(|t| format!("{}={}", glyph_for_label(t.label()), t.label()))
        .collect();
    format!("  legend: {}, *=overlap\n", entries.join(", "))
}

/// Horizontal bar chart for every summary series.
#[must_use]
pub fn render_summary(summary: &AnalyticsSummary) -> String {
    let mut out = String::new();
    for series in [&summary.api_requests, &summary.embedding_types, &summary.response_times] {
        out.push_str(&render_series(series));
        out.push('\n');
    }
    out
}

#[must_use]
pub fn render_series(series: &Series) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", series.label);

    let max = series.values.iter().copied().max().unwrap_or(0);
    let label_width = series.labels.iter().map(String::len).max().unwrap_or(0);
    let unit = series.unit.as_deref().unwrap_or("");

    for (label, value) in series.labels.iter().zip(&series.values) {
        let bar = if max == 0 {
            0
        } else {
            usize::try_from(u64::from(*value) * BAR_WIDTH as u64 / u64::from(max)).unwrap_or(BAR_WIDTH)
        };
        let _ = writeln!(out, "  {label:<label_width$} {:<BAR_WIDTH$} {value}{unit}", "#".repeat(bar));
    }
    out
}

#[cfg(test)]
#[path = "chart_test.rs"]
mod tests;
