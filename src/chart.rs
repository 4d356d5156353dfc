//! SVG bar chart of carbon storage per tree.

use std::fmt::Write;

use crate::config::ChartConfig;
use crate::models::{tree_label, ResultTable};

/// Chart title.
pub const TITLE: &str = "Carbon sequestration from individual trees";
/// Y axis label.
pub const Y_LABEL: &str = "Carbon sequestration (kgCO2)";

const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 90.0;
const Y_TICKS: usize = 5;

/// One bar of the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

/// Bars for every row of a result table, labelled `Tree number N`.
pub fn bars(table: &ResultTable) -> Vec<Bar> {
    table
        .rows
        .iter()
        .map(|row| Bar {
            label: tree_label(row.index),
            value: row.breakdown.carbon_storage,
        })
        .collect()
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the bars as a standalone SVG document.
///
/// Bars share the plot width equally; the y axis runs from 0 to the largest
/// value. Negative values are drawn as empty bars.
pub fn render_svg(bars: &[Bar], config: &ChartConfig) -> String {
    let width = config.width as f64;
    let height = config.height as f64;
    let plot_w = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
    let plot_h = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
    let baseline = MARGIN_TOP + plot_h;

    let max = bars.iter().map(|b| b.value).fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { plot_h / max } else { 0.0 };
    let font = escape(&config.font_family);

    let mut svg = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
        w = config.width,
        h = config.height,
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{x}" y="{y}" text-anchor="middle" font-size="18">{t}</text>"#,
        x = width / 2.0,
        y = MARGIN_TOP / 2.0,
        t = escape(TITLE),
    );
    let _ = writeln!(
        svg,
        r#"<text x="20" y="{y}" text-anchor="middle" font-size="13" transform="rotate(-90 20 {y})">{t}</text>"#,
        y = MARGIN_TOP + plot_h / 2.0,
        t = escape(Y_LABEL),
    );

    // Axes
    let _ = writeln!(
        svg,
        r#"<line x1="{x}" y1="{top}" x2="{x}" y2="{b}" stroke="black"/>"#,
        x = MARGIN_LEFT,
        top = MARGIN_TOP,
        b = baseline,
    );
    let _ = writeln!(
        svg,
        r#"<line x1="{x1}" y1="{b}" x2="{x2}" y2="{b}" stroke="black"/>"#,
        x1 = MARGIN_LEFT,
        x2 = MARGIN_LEFT + plot_w,
        b = baseline,
    );

    for i in 0..=Y_TICKS {
        let value = max * i as f64 / Y_TICKS as f64;
        let y = baseline - value * scale;
        let _ = writeln!(
            svg,
            r#"<text x="{x}" y="{y}" text-anchor="end" font-size="11">{value:.2}</text>"#,
            x = MARGIN_LEFT - 6.0,
        );
    }

    if !bars.is_empty() {
        let slot = plot_w / bars.len() as f64;
        let bar_w = slot * 0.8;
        for (i, bar) in bars.iter().enumerate() {
            let h = (bar.value.max(0.0)) * scale;
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
            let cx = x + bar_w / 2.0;
            let _ = writeln!(
                svg,
                r#"<rect x="{x:.2}" y="{y:.2}" width="{bar_w:.2}" height="{h:.2}" fill="{fill}"><title>{label}: {value}</title></rect>"#,
                y = baseline - h,
                fill = config.bar_color,
                label = escape(&bar.label),
                value = bar.value,
            );
            let _ = writeln!(
                svg,
                r#"<text x="{cx:.2}" y="{y:.2}" text-anchor="end" font-size="11" transform="rotate(-45 {cx:.2} {y:.2})">{label}</text>"#,
                y = baseline + 14.0,
                label = escape(&bar.label),
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}
