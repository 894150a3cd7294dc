use super::*;
use records::analytics::{EmbeddingRequest, embedding_plot, summary};
use records::embedding::{Label, Mark, View};

fn plot_with(marks: Vec<Mark>) -> Plot {
    Plot {
        view: View::Scatter,
        width: 100.0,
        height: 50.0,
        vertical_grid: Vec::new(),
        horizontal_grid: Vec::new(),
        marks,
        labels: Vec::new(),
        axes: None,
    }
}

fn mark(x: f64, y: f64, kind: ClientType) -> Mark {
    Mark { id: "m".into(), x, y, radius: 3.0, color: kind.color().into() }
}

#[test]
fn marks_land_in_scaled_cells() {
    let plot = plot_with(vec![mark(0.0, 0.0, ClientType::Conservative), mark(100.0, 50.0, ClientType::Aggressive)]);
    let out = render_plot(&plot, 10, 5);
    let rows: Vec<&str> = out.lines().collect();

    assert_eq!(rows[0], "+----------+");
    assert_eq!(rows[1], "|C         |");
    assert_eq!(rows[5], "|         A|");
    assert_eq!(rows[6], "+----------+");
}

#[test]
fn overlapping_types_show_star() {
    let plot = plot_with(vec![
        mark(10.0, 10.0, ClientType::Moderate),
        mark(10.5, 10.5, ClientType::Moderate),
        mark(60.0, 30.0, ClientType::Moderate),
        mark(60.5, 30.5, ClientType::GrowthFocused),
    ]);
    let out = render_plot(&plot, 10, 5);
    let grid: String = out.lines().skip(1).take(5).collect();
    assert_eq!(grid.matches('M').count(), 1);
    assert_eq!(grid.matches('*').count(), 1);
}

#[test]
fn marks_outside_canvas_are_dropped() {
    let plot = plot_with(vec![mark(-5.0, 10.0, ClientType::Conservative), mark(50.0, 80.0, ClientType::Conservative)]);
    let out = render_plot(&plot, 10, 5);
    let grid: String = out.lines().skip(1).take(5).collect();
    assert!(!grid.contains('C'));
}

#[test]
fn cluster_labels_and_legend_are_listed() {
    let mut plot = plot_with(Vec::new());
    plot.labels = vec![Label { text: "Income-focused".into(), x: 0.0, y: 0.0 }];
    let out = render_plot(&plot, 10, 5);
    assert!(out.contains(&format!("I = Income-focused {}", ClientType::IncomeFocused.color())));
    assert!(out.contains("legend: C=Conservative"));
}

#[test]
fn generated_plot_renders_every_row() {
    let plot = embedding_plot(&EmbeddingRequest::new(View::Scatter, Some(50), Some(8), None, None));
    let out = render_plot(&plot, DEFAULT_COLUMNS, DEFAULT_ROWS);
    assert_eq!(out.lines().filter(|l| l.starts_with('|')).count(), DEFAULT_ROWS);
    assert!(out.contains("x: Investment Style"));
}

#[test]
fn series_bars_scale_to_max() {
    let series = Series {
        label: "Latency".into(),
        labels: vec!["fast".into(), "slow".into()],
        values: vec![10, 20],
        unit: Some("%".into()),
    };
    let out = render_series(&series);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Latency");
    assert_eq!(lines[1].matches('#').count(), 20);
    assert_eq!(lines[2].matches('#').count(), 40);
    assert!(lines[2].ends_with("20%"));
}

#[test]
fn empty_series_renders_header_only() {
    let series = Series { label: "None".into(), labels: Vec::new(), values: Vec::new(), unit: None };
    assert_eq!(render_series(&series), "None\n");
}

#[test]
fn summary_renders_three_series() {
    let out = render_summary(&summary());
    assert!(out.contains("API Requests"));
    assert!(out.contains("Embedding Types"));
    assert!(out.contains("Response Time Distribution"));
}
