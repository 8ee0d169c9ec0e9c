//! Funnel and pyramid segment layout.
//!
//! Segment corner naming (un-reversed):
//!
//! ```text
//! x1,y1 _________________ x2,y1
//!  \                         /
//!   \                       /
//!    \                     /
//!     \                   /
//!     x3,y3 _________ x4,y3
//!
//! and, when the segment runs past the neck boundary:
//!
//!       |               |
//!     x3,y5 _________ x4,y5
//! ```

mod geometry;
pub mod labels;

use crate::model::{
    Bounds, FunnelGeometry, FunnelLayout, LayoutPoint, PlaceholderLayout, SegmentLayout, Side,
};
use crate::{Error, LayoutOptions, Result};
use funnel_core::{FunnelConfig, SizeSpec};
use serde::Deserialize;

pub use labels::derive_label_anchor;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmentInput {
    pub value: f64,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub name: Option<String>,
}

fn default_visible() -> bool {
    true
}

impl SegmentInput {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            visible: true,
            name: None,
        }
    }

    pub fn hidden(value: f64) -> Self {
        Self {
            visible: false,
            ..Self::new(value)
        }
    }

    /// Whether this value takes part in the sum (and in cumulative positioning).
    pub fn is_counted(&self, ignore_hidden_point: bool) -> bool {
        !ignore_hidden_point || self.visible
    }
}

#[derive(Debug, Clone, Deserialize)]
struct FunnelModel {
    #[serde(default)]
    data: Vec<SegmentInput>,
}

/// Typed series options, read from the effective config.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesOptions {
    pub center: [SizeSpec; 2],
    pub width: SizeSpec,
    pub height: SizeSpec,
    pub neck_width: SizeSpec,
    pub neck_height: SizeSpec,
    pub reversed: bool,
    pub ignore_hidden_point: bool,
    /// Number of leading records that are real segments; the rest are placeholders.
    /// `None` means every record is real.
    pub data_length: Option<usize>,
    pub label_distance: f64,
    pub label_side: Side,
}

impl Default for SeriesOptions {
    fn default() -> Self {
        Self {
            center: [SizeSpec::percent(50), SizeSpec::percent(50)],
            width: SizeSpec::percent(90),
            height: SizeSpec::percent(100),
            neck_width: SizeSpec::percent(30),
            neck_height: SizeSpec::percent(25),
            reversed: false,
            ignore_hidden_point: true,
            data_length: None,
            label_distance: 30.0,
            label_side: Side::Right,
        }
    }
}

impl SeriesOptions {
    pub fn pyramid() -> Self {
        Self {
            neck_width: SizeSpec::percent(0),
            neck_height: SizeSpec::percent(0),
            reversed: true,
            ..Self::default()
        }
    }

    /// Reads options from an effective config, keeping funnel defaults for missing or
    /// mistyped keys.
    pub fn from_config(cfg: &FunnelConfig) -> Self {
        let defaults = Self::default();
        let size = |key: &str, fallback: &SizeSpec| {
            cfg.get_value(key)
                .and_then(SizeSpec::from_value)
                .unwrap_or_else(|| fallback.clone())
        };

        let center = match cfg.get_value("center").and_then(|v| v.as_array()) {
            Some(items) => [
                items
                    .first()
                    .and_then(SizeSpec::from_value)
                    .unwrap_or_else(|| defaults.center[0].clone()),
                items
                    .get(1)
                    .and_then(SizeSpec::from_value)
                    .unwrap_or_else(|| defaults.center[1].clone()),
            ],
            None => defaults.center.clone(),
        };

        let data_length = cfg.get_u64("dataLength").map(|n| n as usize);
        if data_length.is_none() {
            if let Some(v) = cfg.get_value("dataLength").filter(|v| !v.is_null()) {
                tracing::warn!(
                    value = %v,
                    "ignoring dataLength that is not a non-negative integer"
                );
            }
        }

        // Alias of `ignoreHiddenPoint`; the defaults never set it, so it wins when present.
        let ignore_hidden_point = cfg
            .get_bool("ignoreHiddenValue")
            .or_else(|| cfg.get_bool("ignoreHiddenPoint"))
            .unwrap_or(defaults.ignore_hidden_point);

        Self {
            center,
            width: size("width", &defaults.width),
            height: size("height", &defaults.height),
            neck_width: size("neckWidth", &defaults.neck_width),
            neck_height: size("neckHeight", &defaults.neck_height),
            reversed: cfg.get_bool("reversed").unwrap_or(defaults.reversed),
            ignore_hidden_point,
            data_length,
            label_distance: cfg
                .get_f64("dataLabels.distance")
                .unwrap_or(defaults.label_distance),
            label_side: Side::from_position(cfg.get_str("dataLabels.position")),
        }
    }
}

pub fn layout_funnel_diagram(
    semantic: &serde_json::Value,
    effective_config: &FunnelConfig,
    options: &LayoutOptions,
) -> Result<FunnelLayout> {
    let model = FunnelModel::deserialize(semantic)?;
    let series = SeriesOptions::from_config(effective_config);
    let geometry = FunnelGeometry::resolve(&series, options.plot_width, options.plot_height);
    layout_funnel(&model.data, &series, &geometry)
}

/// Sum of the values counted under the hidden-point policy.
pub fn series_sum(segments: &[SegmentInput], ignore_hidden_point: bool) -> f64 {
    segments
        .iter()
        .filter(|s| s.is_counted(ignore_hidden_point))
        .map(|s| s.value)
        .sum()
}

/// Lays out `records` inside `geometry`.
///
/// The first `series.data_length` records (all of them by default) are real segments; any
/// remaining records become placeholders that reuse the last real segment's shape. Geometry
/// itself never fails; only an inconsistent `data_length` is an error.
pub fn layout_funnel(
    records: &[SegmentInput],
    series: &SeriesOptions,
    geometry: &FunnelGeometry,
) -> Result<FunnelLayout> {
    let data_length = series.data_length.unwrap_or(records.len());
    if data_length > records.len() {
        return Err(Error::InvalidModel {
            message: format!(
                "dataLength {data_length} exceeds the number of data points ({})",
                records.len()
            ),
        });
    }
    if data_length == 0 && !records.is_empty() {
        return Err(Error::InvalidModel {
            message: "placeholder rows need at least one real segment (dataLength is 0)"
                .to_string(),
        });
    }

    let real = &records[..data_length];
    let sum = series_sum(real, series.ignore_hidden_point);
    let distance = series.label_distance;

    tracing::debug!(
        segments = real.len(),
        placeholders = records.len() - data_length,
        sum,
        ?geometry,
        "funnel layout pass"
    );

    let mut cumulative = 0.0;
    let mut segments: Vec<SegmentLayout> = Vec::with_capacity(real.len());
    for (index, input) in real.iter().enumerate() {
        let counted = input.is_counted(series.ignore_hidden_point);
        let fraction = if sum > 0.0 { input.value / sum } else { 0.0 };
        let shape = segment_shape(geometry, cumulative, fraction);

        if counted {
            cumulative += fraction;
        }

        let label = derive_label_anchor(geometry, distance, shape.y1, series.label_side);
        tracing::trace!(index, fraction, y1 = shape.y1, y3 = shape.y3, y5 = ?shape.y5, "segment");

        segments.push(SegmentLayout {
            index,
            name: input.name.clone(),
            value: input.value,
            visible: input.visible,
            counted,
            fraction,
            percentage: fraction * 100.0,
            cumulative,
            x1: shape.x1,
            x2: shape.x2,
            x3: shape.x3,
            x4: shape.x4,
            y1: shape.y1,
            y3: shape.y3,
            y5: shape.y5,
            polygon: shape.polygon(),
            plot_x: geometry.center_x,
            plot_y: shape.plot_y(),
            tooltip: LayoutPoint::new(geometry.center_x, shape.plot_y()),
            side: series.label_side,
            label,
        });
    }

    let placeholders: Vec<PlaceholderLayout> = match segments.last() {
        Some(last) => labels::layout_placeholders(
            geometry,
            distance,
            last,
            records
                .iter()
                .enumerate()
                .skip(data_length)
                .map(|(i, r)| (i, r.name.clone())),
        ),
        None => Vec::new(),
    };

    let bounds = Bounds::from_points(
        segments
            .iter()
            .flat_map(|s| s.polygon.iter().chain(s.label.points.iter().skip(1)))
            .chain(placeholders.iter().flat_map(|p| p.label.points.iter().skip(1)))
            .map(|p| (p.x, p.y)),
    );

    Ok(FunnelLayout {
        bounds,
        geometry: geometry.clone(),
        series_center: [geometry.center_x, geometry.center_y, geometry.height],
        label_slot_height: geometry.height - 2.0 * distance,
        label_distance: distance,
        sum,
        data_length,
        segments,
        placeholders,
    })
}

#[derive(Debug, Clone, Copy)]
struct SegmentShape {
    x1: f64,
    x2: f64,
    x3: f64,
    x4: f64,
    y1: f64,
    y3: f64,
    y5: Option<f64>,
}

impl SegmentShape {
    fn polygon(&self) -> Vec<LayoutPoint> {
        let mut pts = vec![
            LayoutPoint::new(self.x1, self.y1),
            LayoutPoint::new(self.x2, self.y1),
            LayoutPoint::new(self.x4, self.y3),
        ];
        if let Some(y5) = self.y5 {
            pts.push(LayoutPoint::new(self.x4, y5));
            pts.push(LayoutPoint::new(self.x3, y5));
        }
        pts.push(LayoutPoint::new(self.x3, self.y3));
        pts
    }

    fn plot_y(&self) -> f64 {
        (self.y1 + self.y5.unwrap_or(self.y3)) / 2.0
    }
}

fn segment_shape(geometry: &FunnelGeometry, cumulative: f64, fraction: f64) -> SegmentShape {
    let cx = geometry.center_x;
    let neck_y = geometry.neck_y;

    let y1 = geometry.top() + cumulative * geometry.height;
    let mut y3 = y1 + fraction * geometry.height;
    let mut y5 = None;

    let top_width = geometry.width_at(y1);
    let (mut x1, mut x2) = (cx - top_width / 2.0, cx + top_width / 2.0);
    let bottom_width = geometry.width_at(y3);
    let (mut x3, mut x4) = (cx - bottom_width / 2.0, cx + bottom_width / 2.0);

    if y1 > neck_y {
        // Entirely within the neck.
        x1 = cx - geometry.neck_width / 2.0;
        x3 = x1;
        x2 = cx + geometry.neck_width / 2.0;
        x4 = x2;
    } else if y3 > neck_y {
        // Straddles the neck boundary: the bottom edge moves up to the boundary and the neck
        // part hangs below it down to the unclipped bottom.
        y5 = Some(y3);
        let neck_boundary_width = geometry.width_at(neck_y);
        x3 = cx - neck_boundary_width / 2.0;
        x4 = cx + neck_boundary_width / 2.0;
        y3 = neck_y;
    }

    SegmentShape {
        x1,
        x2,
        x3,
        x4,
        y1: geometry.orient_y(y1),
        y3: geometry.orient_y(y3),
        y5: y5.map(|y| geometry.orient_y(y)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use funnel_core::generated::default_series_config;
    use serde_json::json;

    fn sample_geometry(reversed: bool) -> FunnelGeometry {
        FunnelGeometry::new(50.0, 50.0, 100.0, 100.0, 30.0, 25.0, reversed)
    }

    fn sample_series(reversed: bool, ignore_hidden_point: bool) -> SeriesOptions {
        SeriesOptions {
            reversed,
            ignore_hidden_point,
            ..SeriesOptions::default()
        }
    }

    fn inputs(values: &[f64]) -> Vec<SegmentInput> {
        values.iter().copied().map(SegmentInput::new).collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn options_from_default_config_match_typed_defaults() {
        let cfg = default_series_config("funnel").unwrap();
        assert_eq!(SeriesOptions::from_config(&cfg), SeriesOptions::default());
        let cfg = default_series_config("pyramid").unwrap();
        assert_eq!(SeriesOptions::from_config(&cfg), SeriesOptions::pyramid());
    }

    #[test]
    fn options_fall_back_on_mistyped_keys() {
        let cfg = FunnelConfig::from_value(json!({
            "width": true,
            "center": [120],
            "dataLength": -1,
            "dataLabels": { "position": "left", "distance": 12 }
        }));
        let opts = SeriesOptions::from_config(&cfg);
        assert_eq!(opts.width, SizeSpec::percent(90));
        assert_eq!(opts.center, [SizeSpec::Absolute(120.0), SizeSpec::percent(50)]);
        assert_eq!(opts.data_length, None);
        assert_eq!(opts.label_side, Side::Left);
        assert_eq!(opts.label_distance, 12.0);
    }

    #[test]
    fn options_read_data_length_as_integer() {
        let cfg = FunnelConfig::from_value(json!({ "dataLength": 3 }));
        assert_eq!(SeriesOptions::from_config(&cfg).data_length, Some(3));
        let cfg = FunnelConfig::from_value(json!({ "dataLength": 2.5 }));
        assert_eq!(SeriesOptions::from_config(&cfg).data_length, None);
    }

    #[test]
    fn ignore_hidden_value_overrides_the_default_point_key() {
        let mut cfg = default_series_config("funnel").unwrap();
        cfg.deep_merge(&json!({ "ignoreHiddenValue": false }));
        assert!(!SeriesOptions::from_config(&cfg).ignore_hidden_point);

        let cfg = FunnelConfig::from_value(json!({ "ignoreHiddenPoint": false }));
        assert!(!SeriesOptions::from_config(&cfg).ignore_hidden_point);

        let cfg = FunnelConfig::from_value(json!({}));
        assert!(SeriesOptions::from_config(&cfg).ignore_hidden_point);
    }

    #[test]
    fn hidden_points_count_unless_ignored() {
        let segs = vec![SegmentInput::new(10.0), SegmentInput::hidden(5.0)];
        assert_eq!(series_sum(&segs, true), 10.0);
        assert_eq!(series_sum(&segs, false), 15.0);
    }

    #[test]
    fn trapezoid_above_the_neck_has_four_vertices() {
        let layout = layout_funnel(
            &inputs(&[50.0, 30.0, 20.0]),
            &sample_series(false, false),
            &sample_geometry(false),
        )
        .unwrap();
        let s = &layout.segments[0];
        assert_eq!(s.polygon.len(), 4);
        assert_eq!(s.y5, None);
        assert_eq!((s.x1, s.x2), (0.0, 100.0));
        // Width at y = 50 is 30 + 70 * (1 - 50/75).
        let w = 30.0 + 70.0 * (1.0 - 50.0 / 75.0);
        assert!((s.x4 - s.x3 - w).abs() < 1e-9);
        assert_eq!(s.tooltip, LayoutPoint::new(50.0, 25.0));
    }

    #[test]
    fn shape_for_segment_straddling_the_neck() {
        let layout = layout_funnel(
            &inputs(&[50.0, 30.0, 20.0]),
            &sample_series(false, false),
            &sample_geometry(false),
        )
        .unwrap();
        let s = &layout.segments[1];
        let y5 = s.y5.expect("neck base");
        assert_close(s.y1, 50.0);
        assert_close(s.y3, 75.0);
        assert_close(y5, 80.0);
        assert_eq!((s.x3, s.x4), (35.0, 65.0));
        assert_eq!(
            s.polygon,
            vec![
                LayoutPoint::new(s.x1, s.y1),
                LayoutPoint::new(s.x2, s.y1),
                LayoutPoint::new(65.0, s.y3),
                LayoutPoint::new(65.0, y5),
                LayoutPoint::new(35.0, y5),
                LayoutPoint::new(35.0, s.y3),
            ]
        );
        assert_close(s.plot_y, 65.0);
    }

    #[test]
    fn segment_inside_the_neck_is_a_neck_wide_rectangle() {
        let layout = layout_funnel(
            &inputs(&[50.0, 30.0, 20.0]),
            &sample_series(false, false),
            &sample_geometry(false),
        )
        .unwrap();
        let s = &layout.segments[2];
        assert_eq!(s.polygon.len(), 4);
        assert_eq!(s.x1, s.x3);
        assert_eq!(s.x2, s.x4);
        assert_eq!(s.x2 - s.x1, 30.0);
        assert_close(s.y1, 80.0);
        assert_close(s.y3, 100.0);
    }

    #[test]
    fn real_segment_labels_anchor_at_y1() {
        let layout = layout_funnel(
            &inputs(&[50.0, 30.0, 20.0]),
            &sample_series(false, false),
            &sample_geometry(false),
        )
        .unwrap();
        for s in &layout.segments {
            assert!(s.label.points.iter().all(|p| p.y == s.y1));
            assert_eq!(s.label.points[0].x, 0.0);
            assert_eq!(s.side, Side::Right);
        }
    }

    #[test]
    fn degenerate_geometry_still_lays_out() {
        let g = FunnelGeometry::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, false);
        let layout = layout_funnel(&inputs(&[1.0, 2.0]), &sample_series(false, true), &g).unwrap();
        for s in &layout.segments {
            assert!(s.polygon.iter().all(|p| p.x == 0.0 && p.y == 0.0));
        }
    }
}
