use crate::model::FunnelGeometry;

use super::SeriesOptions;

impl FunnelGeometry {
    /// Resolves size specs against the plot area.
    ///
    /// Horizontal lengths are relative to the plot width, vertical ones to the plot height. The
    /// neck is clamped into the body so `neck_y` always lies within the funnel box.
    pub fn resolve(options: &SeriesOptions, plot_width: f64, plot_height: f64) -> Self {
        let center_x = options.center[0].resolve(plot_width);
        let center_y = options.center[1].resolve(plot_height);
        let width = options.width.resolve(plot_width);
        let height = options.height.resolve(plot_height);
        let mut neck_width = options.neck_width.resolve(plot_width);
        let mut neck_height = options.neck_height.resolve(plot_height);

        let max_neck_height = height.max(0.0);
        if !(0.0..=max_neck_height).contains(&neck_height) {
            tracing::warn!(neck_height, height, "neck height clamped into the funnel body");
            neck_height = neck_height.clamp(0.0, max_neck_height);
        }
        if neck_width > width {
            tracing::warn!(neck_width, width, "neck width clamped to the funnel width");
            neck_width = width;
        }

        Self::new(
            center_x,
            center_y,
            width,
            height,
            neck_width,
            neck_height,
            options.reversed,
        )
    }

    pub fn new(
        center_x: f64,
        center_y: f64,
        width: f64,
        height: f64,
        neck_width: f64,
        neck_height: f64,
        reversed: bool,
    ) -> Self {
        let neck_y = (center_y - height / 2.0) + height - neck_height;
        Self {
            center_x,
            center_y,
            width,
            height,
            neck_width,
            neck_height,
            neck_y,
            reversed,
        }
    }

    pub fn top(&self) -> f64 {
        self.center_y - self.height / 2.0
    }

    pub fn bottom(&self) -> f64 {
        self.top() + self.height
    }

    /// Funnel width at `y` (un-reversed space).
    ///
    /// Linear from `width` at the top to `neck_width` at `neck_y`, constant below.
    pub fn width_at(&self, y: f64) -> f64 {
        if y > self.neck_y || self.height == self.neck_height {
            return self.neck_width;
        }
        let top = self.top();
        self.neck_width
            + (self.width - self.neck_width) * (1.0 - (y - top) / (self.height - self.neck_height))
    }

    /// Flips a y coordinate when the funnel is reversed. Applying it twice is the identity.
    pub fn orient_y(&self, y: f64) -> f64 {
        if self.reversed { self.height - y } else { y }
    }
}

#[cfg(test)]
mod tests {
    use crate::funnel::SeriesOptions;
    use crate::model::FunnelGeometry;
    use funnel_core::SizeSpec;

    fn sample() -> FunnelGeometry {
        FunnelGeometry::new(50.0, 50.0, 100.0, 100.0, 30.0, 25.0, false)
    }

    #[test]
    fn neck_y_sits_above_the_bottom_by_neck_height() {
        let g = sample();
        assert_eq!(g.top(), 0.0);
        assert_eq!(g.bottom(), 100.0);
        assert_eq!(g.neck_y, 75.0);
    }

    #[test]
    fn full_width_at_top() {
        let g = sample();
        assert_eq!(g.width_at(g.top()), 100.0);
    }

    #[test]
    fn width_is_continuous_at_the_neck() {
        let g = sample();
        let below = g.width_at(g.neck_y + 1e-9);
        let at = g.width_at(g.neck_y);
        let above = g.width_at(g.neck_y - 1e-9);
        assert_eq!(below, 30.0);
        assert!((at - 30.0).abs() < 1e-12, "at neck: {at}");
        assert!((above - 30.0).abs() < 1e-6, "just above neck: {above}");
    }

    #[test]
    fn width_interpolates_linearly_in_the_body() {
        let g = sample();
        // Halfway between top (0) and neck (75).
        assert!((g.width_at(37.5) - 65.0).abs() < 1e-12);
        assert_eq!(g.width_at(90.0), 30.0);
    }

    #[test]
    fn straight_funnel_is_constant_width() {
        let g = FunnelGeometry::new(50.0, 50.0, 100.0, 100.0, 100.0, 100.0, false);
        assert_eq!(g.width_at(0.0), 100.0);
        assert_eq!(g.width_at(50.0), 100.0);
        assert_eq!(g.width_at(100.0), 100.0);
    }

    #[test]
    fn orient_y_mirrors_only_when_reversed() {
        let g = sample();
        assert_eq!(g.orient_y(20.0), 20.0);
        let r = FunnelGeometry { reversed: true, ..g };
        assert_eq!(r.orient_y(20.0), 80.0);
        assert_eq!(r.orient_y(r.orient_y(20.0)), 20.0);
    }

    #[test]
    fn resolve_clamps_an_oversized_neck_into_the_body() {
        let options = SeriesOptions {
            neck_height: SizeSpec::from("150%"),
            neck_width: SizeSpec::Absolute(900.0),
            ..SeriesOptions::default()
        };
        let g = FunnelGeometry::resolve(&options, 600.0, 400.0);

        assert_eq!(g.width, 540.0);
        assert_eq!(g.height, 400.0);
        assert_eq!(g.neck_height, g.height);
        assert_eq!(g.neck_width, g.width);
        assert_eq!(g.neck_y, g.top());
    }

    #[test]
    fn resolve_clamps_a_negative_neck_height_to_zero() {
        let options = SeriesOptions {
            neck_height: SizeSpec::Absolute(-20.0),
            ..SeriesOptions::default()
        };
        let g = FunnelGeometry::resolve(&options, 600.0, 400.0);
        assert_eq!(g.neck_height, 0.0);
        assert_eq!(g.neck_y, g.bottom());
    }
}
