use crate::model::{Bounds, FunnelLayout, LabelAnchorLayout, LayoutPoint, TextAlign};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Adds extra space around the computed viewBox.
    pub viewbox_padding: f64,
    /// Optional root `id` attribute.
    pub diagram_id: Option<String>,
    /// When true, include label connectors and label text.
    pub include_labels: bool,
    /// When true, mark tooltip anchors with a small cross.
    pub include_tooltip_anchors: bool,
    /// When true, outline placeholder rows (they share the last segment's shape).
    pub include_placeholders: bool,
    /// Connector stroke width (`dataLabels.connectorWidth`).
    pub connector_width: f64,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 8.0,
            diagram_id: None,
            include_labels: true,
            include_tooltip_anchors: true,
            include_placeholders: false,
            connector_width: 1.0,
        }
    }
}

/// SVG path data for a closed polygon: `M x0 y0 L x1 y1 x2 y2 ... Z`.
pub fn polygon_path_data(points: &[LayoutPoint]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        match i {
            0 => out.push('M'),
            1 => out.push_str(" L"),
            _ => {}
        }
        let _ = write!(&mut out, " {} {}", num(p.x), num(p.y));
    }
    if !points.is_empty() {
        out.push_str(" Z");
    }
    out
}

/// SVG path data for a label connector (open polyline).
pub fn connector_path_data(label: &LabelAnchorLayout) -> String {
    let mut out = String::new();
    for (i, p) in label.points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { "L" };
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(&mut out, "{cmd} {} {}", num(p.x), num(p.y));
    }
    out
}

/// Debug rendering of a funnel layout: segment outlines, tooltip anchors and label connectors.
pub fn render_funnel_debug_svg(layout: &FunnelLayout, options: &SvgRenderOptions) -> String {
    let bounds = layout.bounds.clone().unwrap_or(Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 100.0,
        max_y: 100.0,
    });
    let pad = options.viewbox_padding.max(0.0);
    let vb_min_x = bounds.min_x - pad;
    let vb_min_y = bounds.min_y - pad;
    let vb_w = (bounds.max_x - bounds.min_x) + pad * 2.0;
    let vb_h = (bounds.max_y - bounds.min_y) + pad * 2.0;

    let mut out = String::new();
    let id_attr = options
        .diagram_id
        .as_deref()
        .map(|id| format!(r#" id="{}""#, escape_xml(id)))
        .unwrap_or_default();
    let _ = writeln!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg"{id_attr} viewBox="{} {} {} {}">"#,
        num(vb_min_x),
        num(vb_min_y),
        num(vb_w.max(1.0)),
        num(vb_h.max(1.0))
    );
    let _ = writeln!(
        &mut out,
        r#"<style>
 .segment {{ fill: #ECECFF; stroke: #2563eb; stroke-width: 1; }}
 .segment.hidden {{ fill: none; stroke-dasharray: 4,2; }}
 .placeholder {{ fill: none; stroke: #92400e; stroke-dasharray: 2,2; }}
 .connector {{ fill: none; stroke: #606060; stroke-width: {}; }}
 .label {{ fill: #1f2937; font-family: ui-sans-serif, system-ui, sans-serif; font-size: 11px; dominant-baseline: middle; }}
 .debug-cross {{ stroke: #ef4444; stroke-width: 1; }}
</style>"#,
        num(options.connector_width)
    );

    out.push_str(r#"<g class="segments">"#);
    out.push('\n');
    for s in &layout.segments {
        let class = if s.visible { "segment" } else { "segment hidden" };
        let _ = writeln!(
            &mut out,
            r#"<path class="{class}" data-index="{}" d="{}" />"#,
            s.index,
            polygon_path_data(&s.polygon)
        );
    }
    if options.include_placeholders {
        for p in &layout.placeholders {
            let _ = writeln!(
                &mut out,
                r#"<path class="placeholder" data-index="{}" d="{}" />"#,
                p.index,
                polygon_path_data(&p.polygon)
            );
        }
    }
    out.push_str("</g>\n");

    if options.include_tooltip_anchors {
        out.push_str(r#"<g class="tooltip-anchors">"#);
        out.push('\n');
        for s in &layout.segments {
            let (x, y) = (s.tooltip.x, s.tooltip.y);
            let _ = writeln!(
                &mut out,
                r#"<path class="debug-cross" d="M {} {} L {} {} M {} {} L {} {}" />"#,
                num(x - 3.0),
                num(y),
                num(x + 3.0),
                num(y),
                num(x),
                num(y - 3.0),
                num(x),
                num(y + 3.0)
            );
        }
        out.push_str("</g>\n");
    }

    if options.include_labels {
        out.push_str(r#"<g class="labels">"#);
        out.push('\n');
        let labels = layout
            .segments
            .iter()
            .map(|s| (&s.label, label_text(s.name.as_deref(), s.percentage)))
            .chain(
                layout
                    .placeholders
                    .iter()
                    .map(|p| (&p.label, label_text(p.name.as_deref(), p.percentage))),
            );
        for (label, text) in labels {
            let _ = writeln!(
                &mut out,
                r#"<path class="connector" d="{}" />"#,
                connector_path_data(label)
            );
            let Some(landing) = label.landing() else {
                continue;
            };
            let anchor = match label.align {
                TextAlign::Left => "start",
                TextAlign::Right => "end",
            };
            let _ = writeln!(
                &mut out,
                r#"<text class="label" x="{}" y="{}" text-anchor="{anchor}">{}</text>"#,
                num(landing.x),
                num(landing.y),
                escape_xml(&text)
            );
        }
        out.push_str("</g>\n");
    }

    out.push_str("</svg>\n");
    out
}

fn label_text(name: Option<&str>, percentage: f64) -> String {
    match name {
        Some(name) => format!("{name} ({}%)", num(percentage)),
        None => format!("{}%", num(percentage)),
    }
}

/// Three fractional digits, ties toward +inf, shortest representation. Non-finite values and
/// anything that rounds to zero print as `0`.
fn num(v: f64) -> String {
    let r = (v * 1000.0 + 0.5).floor() / 1000.0;
    if !r.is_finite() || r == 0.0 {
        return "0".to_string();
    }
    r.to_string()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
