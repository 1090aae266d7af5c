//! Epsilon-aware comparisons and basic geometric helpers.
//!
//! All geometric predicates in this crate go through these functions
//! instead of comparing floats exactly.

use nalgebra::{Point2, Point3, Vector3};

/// Tolerance used by every geometric comparison in the crate.
pub const EPS: f64 = 1e-8;

/// Coordinate axis, used by importers to report the up direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    X,
    Y,
    Z,
}

#[inline]
pub fn is_zero(a: f64) -> bool {
    a.abs() < EPS
}

#[inline]
pub fn is_equal(a: f64, b: f64) -> bool {
    (b - a).abs() < EPS
}

#[inline]
pub fn is_equal_eps(a: f64, b: f64, eps: f64) -> bool {
    (b - a).abs() < eps
}

#[inline]
pub fn is_lower(a: f64, b: f64) -> bool {
    b - a > EPS
}

#[inline]
pub fn is_greater(a: f64, b: f64) -> bool {
    a - b > EPS
}

#[inline]
pub fn is_lower_or_equal(a: f64, b: f64) -> bool {
    b - a > -EPS
}

#[inline]
pub fn is_greater_or_equal(a: f64, b: f64) -> bool {
    a - b > -EPS
}

#[inline]
pub fn is_positive(a: f64) -> bool {
    a > EPS
}

#[inline]
pub fn is_negative(a: f64) -> bool {
    a < -EPS
}

/// Component-wise epsilon equality for points.
#[inline]
pub fn is_equal_point3(a: &Point3<f64>, b: &Point3<f64>) -> bool {
    is_equal(a.x, b.x) && is_equal(a.y, b.y) && is_equal(a.z, b.z)
}

/// Component-wise epsilon equality for vectors.
#[inline]
pub fn is_equal_vector3(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    is_equal(a.x, b.x) && is_equal(a.y, b.y) && is_equal(a.z, b.z)
}

/// Component-wise epsilon equality for 2D points.
#[inline]
pub fn is_equal_point2(a: &Point2<f64>, b: &Point2<f64>) -> bool {
    is_equal(a.x, b.x) && is_equal(a.y, b.y)
}

/// Unit normal of the triangle (v0, v1, v2) with counter-clockwise winding.
///
/// Returns the zero vector for degenerate (zero area) triangles.
pub fn triangle_normal(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> Vector3<f64> {
    let normal = (v1 - v0).cross(&(v2 - v0));
    let len_sq = normal.norm_squared();
    if is_zero(len_sq) {
        Vector3::zeros()
    } else {
        normal / len_sq.sqrt()
    }
}

/// Area of the triangle (v0, v1, v2).
#[inline]
pub fn triangle_area(v0: &Point3<f64>, v1: &Point3<f64>, v2: &Point3<f64>) -> f64 {
    (v1 - v0).cross(&(v2 - v0)).norm() * 0.5
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Epsilon-tolerant containment check, boundary points included.
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        is_greater_or_equal(point.x, self.min.x)
            && is_lower_or_equal(point.x, self.max.x)
            && is_greater_or_equal(point.y, self.min.y)
            && is_lower_or_equal(point.y, self.max.y)
            && is_greater_or_equal(point.z, self.min.z)
            && is_lower_or_equal(point.z, self.max.z)
    }
}

/// Incremental bounding box accumulator.
#[derive(Debug, Clone)]
pub struct BoundingBoxCalculator {
    min: Point3<f64>,
    max: Point3<f64>,
    valid: bool,
}

impl BoundingBoxCalculator {
    pub fn new() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            valid: false,
        }
    }

    pub fn add_point(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
        self.valid = true;
    }

    /// The accumulated box, or `None` if no point was added.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        if self.valid {
            Some(BoundingBox::new(self.min, self.max))
        } else {
            None
        }
    }
}

impl Default for BoundingBoxCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_equal() {
        assert!(is_equal(1.0, 1.0));
        assert!(is_equal(1.0, 1.000000001));
        assert!(!is_equal(1.0, 1.0001));
    }

    #[test]
    fn test_is_greater() {
        assert!(is_greater(1.0, 0.0));
        assert!(is_greater(1.0001, 1.0));
        assert!(!is_greater(1.000000001, 1.0));

        assert!(is_greater_or_equal(1.0001, 1.0));
        assert!(is_greater_or_equal(1.000000001, 1.0));
        assert!(is_greater_or_equal(0.999999999, 1.0));
        assert!(!is_greater_or_equal(0.999, 1.0));
    }

    #[test]
    fn test_is_lower() {
        assert!(is_lower(0.0, 1.0));
        assert!(is_lower(1.0, 1.0001));
        assert!(!is_lower(1.0, 1.000000001));

        assert!(is_lower_or_equal(1.0, 1.0001));
        assert!(is_lower_or_equal(1.0, 1.000000001));
        assert!(is_lower_or_equal(1.0, 0.999999999));
        assert!(!is_lower_or_equal(1.0, 0.999));
    }

    #[test]
    fn test_triangle_normal() {
        let normal = triangle_normal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
        );
        assert!(is_equal_vector3(&normal, &Vector3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_degenerate_triangle_normal() {
        let normal = triangle_normal(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(2.0, 0.0, 0.0),
        );
        assert!(is_equal_vector3(&normal, &Vector3::zeros()));
    }

    #[test]
    fn test_triangle_area() {
        let area = triangle_area(
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &Point3::new(0.0, 1.0, 0.0),
        );
        assert!(is_equal(area, 0.5));
    }

    #[test]
    fn test_bounding_box_calculator() {
        let mut calculator = BoundingBoxCalculator::new();
        assert!(calculator.bounding_box().is_none());

        calculator.add_point(&Point3::new(0.0, 0.0, 0.0));
        calculator.add_point(&Point3::new(10.0, 5.0, 3.0));
        calculator.add_point(&Point3::new(-2.0, 8.0, 1.0));

        let bounds = calculator.bounding_box().expect("non-empty");
        assert!(is_equal_point3(&bounds.min, &Point3::new(-2.0, 0.0, 0.0)));
        assert!(is_equal_point3(&bounds.max, &Point3::new(10.0, 8.0, 3.0)));
    }

    #[test]
    fn test_bounding_box_contains_boundary() {
        let bounds = BoundingBox::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert!(bounds.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(bounds.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(bounds.contains(&Point3::new(0.5, 0.5, 0.5)));
        assert!(!bounds.contains(&Point3::new(1.1, 0.5, 0.5)));
    }
}
