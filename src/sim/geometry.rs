//! Circle geometry helpers
//!
//! Everything here works on map coordinates (`DVec2`, origin at the
//! bottom-left corner of the square map).

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec2,
    pub max: DVec2,
}

impl Aabb {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    /// Bounding box of a circle
    pub fn around(center: DVec2, radius: f64) -> Self {
        Self {
            min: center - DVec2::splat(radius),
            max: center + DVec2::splat(radius),
        }
    }

    /// Grow on every side
    pub fn expand(&self, by: f64) -> Self {
        Self {
            min: self.min - DVec2::splat(by),
            max: self.max + DVec2::splat(by),
        }
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Point reached by walking `distance` along `direction` from `origin`
#[inline]
pub fn point_along(origin: DVec2, direction: DVec2, distance: f64) -> DVec2 {
    origin + direction * distance
}

/// Mean of the given centers (cheap stand-in for the polygon center)
pub fn centroid<I>(points: I) -> Option<DVec2>
where
    I: IntoIterator<Item = DVec2>,
{
    let mut sum = DVec2::ZERO;
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    (count > 0).then(|| sum / count as f64)
}

/// Bounding box of a set of circles `(center, radius)`
pub fn circles_bounds<I>(circles: I) -> Option<Aabb>
where
    I: IntoIterator<Item = (DVec2, f64)>,
{
    circles.into_iter().fold(None, |acc: Option<Aabb>, (c, r)| {
        let b = Aabb::around(c, r);
        Some(match acc {
            None => b,
            Some(a) => Aabb::new(a.min.min(b.min), a.max.max(b.max)),
        })
    })
}

/// Circles touch or overlap
#[inline]
pub fn circles_touch(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    a.distance(b) <= ra + rb
}

/// Near-total overlap: the smaller circle is covered except for a rim of
/// `slack * min(ra, rb)`. `slack` is in [0, 1].
#[inline]
pub fn circles_overlapping(a: DVec2, ra: f64, b: DVec2, rb: f64, slack: f64) -> bool {
    a.distance(b) <= (ra - rb).abs() + ra.min(rb) * slack
}

/// Clamp a point so a circle of `radius` keeps its inset square inside the map
#[inline]
pub fn clamp_inset(p: DVec2, radius: f64, inset: f64, map_size: f64) -> DVec2 {
    clamp_margin(p, radius * inset, map_size)
}

/// Clamp a point to `[margin, map_size - margin]` on both axes
#[inline]
pub fn clamp_margin(p: DVec2, margin: f64, map_size: f64) -> DVec2 {
    let lo = margin.min(map_size / 2.0);
    let hi = map_size - lo;
    DVec2::new(p.x.clamp(lo, hi), p.y.clamp(lo, hi))
}

/// Unit vector pointing up, rotated counter-clockwise by `angle` radians
#[inline]
pub fn up_rotated(angle: f64) -> DVec2 {
    DVec2::new(-angle.sin(), angle.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_along() {
        let p = point_along(DVec2::new(10.0, 10.0), DVec2::new(1.0, 0.0), 5.0);
        assert_eq!(p, DVec2::new(15.0, 10.0));
    }

    #[test]
    fn test_centroid() {
        let c = centroid([DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0), DVec2::new(5.0, 30.0)]);
        assert_eq!(c, Some(DVec2::new(5.0, 10.0)));
        assert_eq!(centroid(std::iter::empty()), None);
    }

    #[test]
    fn test_circles_bounds() {
        let b = circles_bounds([(DVec2::new(10.0, 10.0), 5.0), (DVec2::new(30.0, 0.0), 2.0)])
            .unwrap();
        assert_eq!(b.min, DVec2::new(5.0, -2.0));
        assert_eq!(b.max, DVec2::new(32.0, 15.0));
        assert_eq!(b.center(), DVec2::new(18.5, 6.5));
    }

    #[test]
    fn test_overlap_threshold() {
        let big = DVec2::new(0.0, 0.0);
        // |30 - 10| + 10 * 0.2 = 22
        assert!(circles_overlapping(big, 30.0, DVec2::new(21.9, 0.0), 10.0, 0.2));
        assert!(!circles_overlapping(big, 30.0, DVec2::new(22.1, 0.0), 10.0, 0.2));
        // Touching is weaker than overlapping
        assert!(circles_touch(big, 30.0, DVec2::new(39.0, 0.0), 10.0));
    }

    #[test]
    fn test_clamp_inset() {
        let p = clamp_inset(DVec2::new(-50.0, 5000.0), 100.0, 0.73, 3000.0);
        assert!((p.x - 73.0).abs() < 1e-9);
        assert!((p.y - 2927.0).abs() < 1e-9);
    }

    #[test]
    fn test_up_rotated() {
        let v = up_rotated(std::f64::consts::FRAC_PI_2);
        assert!((v - DVec2::new(-1.0, 0.0)).length() < 1e-12);
    }
}
