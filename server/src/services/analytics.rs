//! SVG rendering for the embedding scatterplot.
//!
//! The plot itself comes from `records::analytics`; this module only turns a
//! laid-out [`Plot`] into a standalone SVG document.

use std::fmt::Write as _;

use records::embedding::Plot;

/// Render a plot as a standalone SVG document.
#[must_use]
pub fn render_svg(plot: &Plot) -> String {
    let (w, h) = (plot.width, plot.height);
    let mut svg = String::with_capacity(256 + plot.marks.len() * 96);

    let _ = writeln!(svg, r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#);
    let _ = writeln!(svg, r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##);

    svg.push_str(r#"<g stroke="rgba(0,0,0,0.05)" stroke-width="1">"#);
    svg.push('\n');
    for x in &plot.vertical_grid {
        let _ = writeln!(svg, r#"<line x1="{x:.1}" y1="0" x2="{x:.1}" y2="{h}"/>"#);
    }
    for y in &plot.horizontal_grid {
        let _ = writeln!(svg, r#"<line x1="0" y1="{y:.1}" x2="{w}" y2="{y:.1}"/>"#);
    }
    svg.push_str("</g>\n");

    svg.push_str(r#"<g fill-opacity="0.7" stroke="rgba(255,255,255,0.8)" stroke-width="1">"#);
    svg.push('\n');
    for mark in &plot.marks {
        let _ = writeln!(
            svg,
            r#"<circle cx="{:.1}" cy="{:.1}" r="{:.2}" fill="{}"><title>{}</title></circle>"#,
            mark.x,
            mark.y,
            mark.radius,
            mark.color,
            escape(&mark.id)
        );
    }
    svg.push_str("</g>\n");

    for label in &plot.labels {
        let _ = writeln!(
            svg,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="14" font-weight="bold">{}</text>"#,
            label.x,
            label.y,
            escape(&label.text)
        );
    }

    if let Some(axes) = &plot.axes {
        let _ = writeln!(
            svg,
            r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="12" fill="#666">{}</text>"##,
            w / 2.0,
            h - 10.0,
            escape(&axes.x_label)
        );
        let _ = writeln!(
            svg,
            r##"<text x="15" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="12" fill="#666" transform="rotate(-90 15 {:.1})">{}</text>"##,
            h / 2.0,
            h / 2.0,
            escape(&axes.y_label)
        );
    }

    svg.push_str("</svg>\n");
    svg
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
