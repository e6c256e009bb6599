//! Geometric extents and their normalization on a pixel grid.
//!
//! [`ExtentResolver`] computes the box that the colorization pipeline
//! requests imagery for: the true bounds of the points, widened when an axis
//! is degenerate and snapped outward to the pixel grid of the resolution.

use crate::cloud::PointCloud;

/// Axis-aligned rectangle in ground units.
///
/// Invariant: `xmax >= xmin` and `ymax >= ymin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

/// Sides of an extent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sides {
    pub west: bool,
    pub east: bool,
    pub south: bool,
    pub north: bool,
}

impl Sides {
    /// Union of two side sets.
    pub fn union(self, other: Sides) -> Sides {
        Sides {
            west: self.west || other.west,
            east: self.east || other.east,
            south: self.south || other.south,
            north: self.north || other.north,
        }
    }
}

impl Extent {
    /// Creates an extent from two corners given in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            xmin: x1.min(x2),
            ymin: y1.min(y2),
            xmax: x1.max(x2),
            ymax: y1.max(y2),
        }
    }

    /// Zero-area extent located on a single position.
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Inclusive containment test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Checks that `other` lies entirely inside this extent.
    pub fn contains_extent(&self, other: &Extent) -> bool {
        self.contains(other.xmin, other.ymin) && self.contains(other.xmax, other.ymax)
    }

    /// Grows the extent by `distance` on every side.
    pub fn expand(&self, distance: f64) -> Extent {
        self.expand_sides(
            Sides {
                west: true,
                east: true,
                south: true,
                north: true,
            },
            distance,
        )
    }

    /// Grows the extent by `distance` on the selected sides only.
    pub fn expand_sides(&self, sides: Sides, distance: f64) -> Extent {
        Extent {
            xmin: if sides.west { self.xmin - distance } else { self.xmin },
            xmax: if sides.east { self.xmax + distance } else { self.xmax },
            ymin: if sides.south { self.ymin - distance } else { self.ymin },
            ymax: if sides.north { self.ymax + distance } else { self.ymax },
        }
    }

    /// Smallest extent containing both.
    pub fn union(&self, other: &Extent) -> Extent {
        Extent {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }

    /// Grows the extent so that it contains `(x, y)`.
    pub fn include(&mut self, x: f64, y: f64) {
        self.xmin = self.xmin.min(x);
        self.ymin = self.ymin.min(y);
        self.xmax = self.xmax.max(x);
        self.ymax = self.ymax.max(y);
    }
}

/// Computes colorization extents aligned on a pixel grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtentResolver {
    resolution: f64,
}

impl ExtentResolver {
    /// Creates a resolver for a pixel size of `resolution` ground units.
    ///
    /// Non-positive or non-finite resolutions fall back to the default
    /// colorization resolution.
    pub fn new(resolution: f64) -> Self {
        let resolution = if resolution.is_finite() && resolution > 0.0 {
            resolution
        } else {
            crate::config::DEFAULT_COLOR_RESOLUTION
        };
        Self { resolution }
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns the snapped extent of a cloud.
    ///
    /// The bounds come from the points; an empty cloud falls back on its
    /// header bounds, then on the origin. The result always contains every
    /// point and is at least one pixel wide on each axis.
    pub fn resolve(&self, cloud: &PointCloud) -> Extent {
        let raw = cloud
            .bounds()
            .or(cloud.header().bounds)
            .unwrap_or_else(|| Extent::point(0.0, 0.0));
        self.snap(raw)
    }

    /// Snaps an arbitrary extent outward on the pixel grid.
    pub fn snap(&self, extent: Extent) -> Extent {
        let (xmin, xmax) = snap_axis(extent.xmin, extent.xmax, self.resolution);
        let (ymin, ymax) = snap_axis(extent.ymin, extent.ymax, self.resolution);
        Extent {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }
}

impl Default for ExtentResolver {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_COLOR_RESOLUTION)
    }
}

/// Snaps one axis.
///
/// A span of at least one pixel is pushed outward by up to one pixel on each
/// side: `(ceil(min/res) - 1) * res` and `(floor(max/res) + 1) * res`. A
/// shorter span is widened to the pixel cells covering it, at least one.
fn snap_axis(min: f64, max: f64, res: f64) -> (f64, f64) {
    let (mut lo, mut hi) = if max - min >= res {
        (
            ((min / res).ceil() - 1.0) * res,
            ((max / res).floor() + 1.0) * res,
        )
    } else {
        let lo = (min / res).floor() * res;
        (lo, ((max / res).ceil() * res).max(lo + res))
    };

    // Rounding of the division can land one ulp inside the points.
    if lo > min {
        lo -= res;
    }
    if hi < max {
        hi += res;
    }
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{Point, PointCloud, Schema};
    use proptest::prelude::*;

    fn cloud_of(coords: &[(f64, f64)]) -> PointCloud {
        let mut cloud = PointCloud::new(Schema::new());
        for &(x, y) in coords {
            cloud.push(Point::new(x, y, 0.0, Vec::new()));
        }
        cloud
    }

    #[test]
    fn test_expand_sides_east_only() {
        let extent = Extent::new(770_000.0, 6_277_000.0, 771_000.0, 6_278_000.0);
        let sides = Sides {
            east: true,
            ..Sides::default()
        };
        let grown = extent.expand_sides(sides, 20.0);
        assert_eq!(grown.xmax, 771_020.0);
        assert_eq!(grown.xmin, 770_000.0);
        assert_eq!(grown.ymin, 6_277_000.0);
        assert_eq!(grown.ymax, 6_278_000.0);
    }

    #[test]
    fn test_new_orders_corners() {
        let extent = Extent::new(10.0, 5.0, 0.0, -5.0);
        assert_eq!(extent, Extent::new(0.0, -5.0, 10.0, 5.0));
    }

    #[test]
    fn test_single_point_is_widened() {
        let resolver = ExtentResolver::new(0.5);
        let extent = resolver.resolve(&cloud_of(&[(100.2, 200.2)]));
        assert!(extent.contains(100.2, 200.2));
        assert!(extent.width() >= 0.5);
        assert!(extent.height() >= 0.5);
    }

    #[test]
    fn test_collinear_points_are_widened_on_flat_axis() {
        let resolver = ExtentResolver::new(1.0);
        let extent = resolver.resolve(&cloud_of(&[(0.0, 10.0), (50.0, 10.0)]));
        assert!(extent.height() >= 1.0);
        assert!(extent.width() >= 50.0);
    }

    #[test]
    fn test_snapping_matches_pixel_grid() {
        let resolver = ExtentResolver::new(0.2);
        let extent = resolver.snap(Extent::new(10.05, 20.0, 11.0, 21.33));
        assert!((extent.xmin - 10.0).abs() < 1e-9);
        assert!((extent.xmax - 11.2).abs() < 1e-9);
        assert!((extent.ymin - 19.8).abs() < 1e-9);
        assert!((extent.ymax - 21.4).abs() < 1e-9);
    }

    #[test]
    fn test_empty_cloud_uses_header_bounds() {
        let mut cloud = cloud_of(&[]);
        cloud.header_mut().bounds = Some(Extent::new(0.0, 0.0, 10.0, 10.0));
        let extent = ExtentResolver::new(1.0).resolve(&cloud);
        assert!(extent.contains_extent(&Extent::new(0.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn test_empty_cloud_without_bounds_is_not_degenerate() {
        let extent = ExtentResolver::new(1.0).resolve(&cloud_of(&[]));
        assert!(extent.width() > 0.0);
        assert!(extent.height() > 0.0);
    }

    #[test]
    fn test_invalid_resolution_falls_back_to_default() {
        assert_eq!(
            ExtentResolver::new(-1.0).resolution(),
            crate::config::DEFAULT_COLOR_RESOLUTION
        );
        assert_eq!(
            ExtentResolver::new(f64::NAN).resolution(),
            crate::config::DEFAULT_COLOR_RESOLUTION
        );
    }

    proptest! {
        #[test]
        fn prop_resolved_extent_contains_points_and_is_not_degenerate(
            coords in prop::collection::vec((-1.0e5..1.0e5f64, -1.0e5..1.0e5f64), 0..20),
            resolution in 0.05..5.0f64,
        ) {
            let resolver = ExtentResolver::new(resolution);
            let extent = resolver.resolve(&cloud_of(&coords));

            prop_assert!(extent.width() > 0.0);
            prop_assert!(extent.height() > 0.0);
            prop_assert!(extent.width() >= resolution * (1.0 - 1e-9));
            prop_assert!(extent.height() >= resolution * (1.0 - 1e-9));
            for &(x, y) in &coords {
                prop_assert!(extent.contains(x, y));
            }
        }
    }
}
