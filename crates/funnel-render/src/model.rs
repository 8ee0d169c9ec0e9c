use funnel_core::ParseMetadata;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutMeta {
    pub series_type: String,
    pub title: Option<String>,
    pub config: Value,
    pub effective_config: Value,
}

impl LayoutMeta {
    pub fn from_parse_metadata(meta: &ParseMetadata) -> Self {
        Self {
            series_type: meta.series_type.clone(),
            title: meta.title.clone(),
            config: meta.config.as_value().clone(),
            effective_config: meta.effective_config.as_value().clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        Some(b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

impl LayoutPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which side of the funnel a data label sits on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    #[default]
    Right,
}

impl Side {
    /// Direction of the horizontal offset away from the center axis.
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => -1.0,
            Side::Right => 1.0,
        }
    }

    /// Text alignment of a label on this side: labels hug the funnel, so a label on the left
    /// is right-aligned and vice versa.
    pub fn label_align(self) -> TextAlign {
        match self {
            Side::Left => TextAlign::Right,
            Side::Right => TextAlign::Left,
        }
    }

    /// `dataLabels.position`: only `"left"` flips the default side.
    pub fn from_position(position: Option<&str>) -> Self {
        match position {
            Some("left") => Side::Left,
            _ => Side::Right,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
}

/// The resolved funnel box for one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelGeometry {
    pub center_x: f64,
    pub center_y: f64,
    pub width: f64,
    pub height: f64,
    pub neck_width: f64,
    pub neck_height: f64,
    /// Y coordinate where the tapered body meets the straight neck (un-reversed space).
    pub neck_y: f64,
    pub reversed: bool,
}

/// Three-point connector from the center axis to the label landing point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAnchorLayout {
    /// Center-axis start, first break, landing point.
    pub points: Vec<LayoutPoint>,
    pub align: TextAlign,
    /// Funnel labels are never rotated; kept for renderers shared with angled series.
    pub angle: f64,
}

impl LabelAnchorLayout {
    pub fn landing(&self) -> Option<LayoutPoint> {
        self.points.last().copied()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentLayout {
    pub index: usize,
    pub name: Option<String>,
    pub value: f64,
    pub visible: bool,
    /// Whether the value contributed to the series sum (and advanced the cumulative position).
    pub counted: bool,
    pub fraction: f64,
    pub percentage: f64,
    /// Running fraction after this segment.
    pub cumulative: f64,
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
    pub x4: f64,
    pub y1: f64,
    pub y3: f64,
    /// Bottom of the neck part when the segment straddles the neck boundary.
    pub y5: Option<f64>,
    /// Closed outline, 4 vertices (trapezoid) or 6 (trapezoid + neck).
    pub polygon: Vec<LayoutPoint>,
    pub plot_x: f64,
    pub plot_y: f64,
    pub tooltip: LayoutPoint,
    pub side: Side,
    pub label: LabelAnchorLayout,
}

impl SegmentLayout {
    /// Lower edge of the drawn shape: the neck base when present, otherwise `y3`.
    pub fn junction_y(&self) -> f64 {
        self.y5.unwrap_or(self.y3)
    }
}

/// A trailing record past `data_length`; borrows its shape from the last real segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceholderLayout {
    pub index: usize,
    /// Index of the real segment the shape was copied from.
    pub source_index: usize,
    pub name: Option<String>,
    pub fraction: f64,
    pub percentage: f64,
    pub polygon: Vec<LayoutPoint>,
    pub plot_x: f64,
    pub plot_y: f64,
    pub side: Side,
    pub label: LabelAnchorLayout,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunnelLayout {
    pub bounds: Option<Bounds>,
    pub geometry: FunnelGeometry,
    /// `[center_x, center_y, height]`.
    pub series_center: [f64; 3],
    /// Vertical space available to label anti-collision: the height less one label distance at
    /// each end.
    pub label_slot_height: f64,
    pub label_distance: f64,
    pub sum: f64,
    pub data_length: usize,
    pub segments: Vec<SegmentLayout>,
    pub placeholders: Vec<PlaceholderLayout>,
}

impl FunnelLayout {
    /// Segment indices ordered top to bottom by `plot_y` (draw/label order).
    pub fn segments_by_plot_y(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.segments.len()).collect();
        order.sort_by(|&a, &b| {
            self.segments[a]
                .plot_y
                .total_cmp(&self.segments[b].plot_y)
        });
        order
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutedFunnel {
    pub meta: LayoutMeta,
    pub semantic: Value,
    pub layout: FunnelLayout,
}
