use crate::model::{
    FunnelGeometry, LabelAnchorLayout, LayoutPoint, PlaceholderLayout, SegmentLayout, Side,
};

/// Gap between the connector's first break and its landing point.
pub const CONNECTOR_PADDING: f64 = 5.0;

/// Derives the label connector for an anchor at `y` (layout space, i.e. already reversed when the
/// funnel is) on `side`.
///
/// `x` is the funnel edge at `y` pushed out by `distance`; the connector runs from the center
/// axis to `x + distance * sign`, breaking `CONNECTOR_PADDING` before the end.
pub fn derive_label_anchor(
    geometry: &FunnelGeometry,
    distance: f64,
    y: f64,
    side: Side,
) -> LabelAnchorLayout {
    let sign = side.sign();
    let half_width = geometry.width_at(geometry.orient_y(y)) / 2.0;
    let x = geometry.center_x + sign * (half_width + distance);

    LabelAnchorLayout {
        points: vec![
            LayoutPoint::new(0.0, y),
            LayoutPoint::new(x + (distance - CONNECTOR_PADDING) * sign, y),
            LayoutPoint::new(x + distance * sign, y),
        ],
        align: side.label_align(),
        angle: 0.0,
    }
}

/// Lays out records `data_length..record_count` as placeholder rows keyed to `last`.
///
/// The first placeholder anchors at the junction of the last real segment and keeps its side;
/// later ones anchor halfway down that segment and always sit on the right.
pub(crate) fn layout_placeholders(
    geometry: &FunnelGeometry,
    distance: f64,
    last: &SegmentLayout,
    names: impl IntoIterator<Item = (usize, Option<String>)>,
) -> Vec<PlaceholderLayout> {
    let junction = last.junction_y();
    let mut out = Vec::new();

    for (n, (index, name)) in names.into_iter().enumerate() {
        let (y, side) = if n == 0 {
            (junction, last.side)
        } else {
            ((last.y1 + junction) / 2.0, Side::Right)
        };

        tracing::trace!(index, y, ?side, "placeholder label anchor");

        out.push(PlaceholderLayout {
            index,
            source_index: last.index,
            name,
            fraction: last.fraction,
            percentage: last.percentage,
            polygon: last.polygon.clone(),
            plot_x: last.plot_x,
            plot_y: y,
            side,
            label: derive_label_anchor(geometry, distance, y, side),
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextAlign;

    fn sample(reversed: bool) -> FunnelGeometry {
        FunnelGeometry::new(50.0, 50.0, 100.0, 100.0, 30.0, 25.0, reversed)
    }

    #[test]
    fn right_side_connector_runs_outward() {
        let g = sample(false);
        let anchor = derive_label_anchor(&g, 30.0, 0.0, Side::Right);
        // Full width at the top: edge at 100, pushed out by 30.
        assert_eq!(
            anchor.points,
            vec![
                LayoutPoint::new(0.0, 0.0),
                LayoutPoint::new(155.0, 0.0),
                LayoutPoint::new(160.0, 0.0),
            ]
        );
        assert_eq!(anchor.align, TextAlign::Left);
        assert_eq!(anchor.angle, 0.0);
    }

    #[test]
    fn left_side_connector_mirrors_the_offset() {
        let g = sample(false);
        let anchor = derive_label_anchor(&g, 30.0, 80.0, Side::Left);
        // In the neck: half width 15, x = 50 - 45 = 5.
        assert_eq!(anchor.points[1], LayoutPoint::new(-20.0, 80.0));
        assert_eq!(anchor.landing(), Some(LayoutPoint::new(-25.0, 80.0)));
        assert_eq!(anchor.align, TextAlign::Right);
    }

    #[test]
    fn reversed_anchor_reads_width_in_unreversed_space() {
        let g = sample(true);
        // Layout y = 100 is un-reversed y = 0: full width.
        let anchor = derive_label_anchor(&g, 10.0, 100.0, Side::Right);
        assert_eq!(anchor.landing(), Some(LayoutPoint::new(120.0, 100.0)));
    }
}
