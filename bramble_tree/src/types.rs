// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and the scalar abstraction.

use core::fmt::Debug;

/// A 2D point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point2D<T> {
    /// Horizontal coordinate.
    pub x: T,
    /// Vertical coordinate.
    pub y: T,
}

impl<T> Point2D<T> {
    /// Create a new point.
    #[inline(always)]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Scalar> Point2D<T> {
    /// Squared Euclidean distance to another point, in the widened
    /// accumulator type.
    #[inline]
    pub fn dist_squared(&self, other: &Self) -> T::Acc {
        let dx = T::widen(T::sub(self.x, other.x));
        let dy = T::widen(T::sub(self.y, other.y));
        dx * dx + dy * dy
    }
}

/// Axis-aligned rectangle in 2D with inclusive edges.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Rect2D<T> {
    /// Create a new rectangle from min/max corners.
    #[inline(always)]
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Rect2D<T> {
    /// Whether this rectangle contains the point.
    ///
    /// All four edges are part of the rectangle: a point exactly on an edge
    /// or corner is contained.
    #[inline]
    pub fn contains_point(&self, p: Point2D<T>) -> bool {
        self.min_x <= p.x && self.min_y <= p.y && p.x <= self.max_x && p.y <= self.max_y
    }

    /// Determines whether this rectangle overlaps with another in any way.
    ///
    /// The edge of a rectangle is considered part of itself, so two
    /// rectangles that merely share an edge are considered to overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use bramble_tree::Rect2D;
    ///
    /// let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect2D::new(5.0, 5.0, 15.0, 15.0);
    /// assert!(a.overlaps(&b));
    ///
    /// let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect2D::new(10.0, 0.0, 20.0, 10.0);
    /// assert!(a.overlaps(&b));
    ///
    /// let a = Rect2D::new(0.0, 0.0, 10.0, 10.0);
    /// let b = Rect2D::new(11.0, 0.0, 20.0, 10.0);
    /// assert!(!a.overlaps(&b));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }
}

impl<T: Scalar> Rect2D<T> {
    /// The rectangle spanning the whole representable finite coordinate
    /// range. Used as the bounds of a tree's root node.
    #[inline]
    pub fn everything() -> Self {
        let m = T::max_value();
        Self {
            min_x: T::sub(T::zero(), m),
            min_y: T::sub(T::zero(), m),
            max_x: m,
            max_y: m,
        }
    }

    /// The axis-aligned bounding square of a circle.
    #[inline]
    pub fn around(center: Point2D<T>, radius: T) -> Self {
        Self {
            min_x: T::sub(center.x, radius),
            min_y: T::sub(center.y, radius),
            max_x: T::add(center.x, radius),
            max_y: T::add(center.y, radius),
        }
    }
}

/// Numeric scalar abstraction for tree coordinates.
///
/// Provides the minimal set of operations the tree needs (midpoint splits
/// and distance tests), and an associated widened accumulator type so that
/// squared distances are computed without precision loss (f32→f64).
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type for squared-distance computations.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Add two scalar values.
    fn add(a: Self, b: Self) -> Self;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// Max of the two scalar values.
    fn max(a: Self, b: Self) -> Self;

    /// Min of the two scalar values.
    fn min(a: Self, b: Self) -> Self;

    /// Midpoint between a and b (used for split coordinates).
    fn mid(a: Self, b: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Largest representable finite magnitude.
    fn max_value() -> Self;

    /// Whether the value is finite (never NaN or infinite).
    fn is_finite(v: Self) -> bool;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }

    #[inline(always)]
    fn max_value() -> Self {
        Self::MAX
    }

    #[inline]
    fn is_finite(v: Self) -> bool {
        v.is_finite()
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline]
    fn max(a: Self, b: Self) -> Self {
        Self::max(a, b)
    }

    #[inline]
    fn min(a: Self, b: Self) -> Self {
        Self::min(a, b)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline(always)]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline(always)]
    fn max_value() -> Self {
        Self::MAX
    }

    #[inline]
    fn is_finite(v: Self) -> bool {
        v.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::{Point2D, Rect2D};

    #[test]
    fn contains_point_is_edge_inclusive() {
        let r = Rect2D::<f64>::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(Point2D::new(0.0, 0.0)));
        assert!(r.contains_point(Point2D::new(10.0, 10.0)));
        assert!(r.contains_point(Point2D::new(10.0, 0.0)));
        assert!(r.contains_point(Point2D::new(5.0, 5.0)));
        assert!(!r.contains_point(Point2D::new(10.000001, 5.0)));
        assert!(!r.contains_point(Point2D::new(5.0, -0.000001)));
    }

    #[test]
    fn everything_contains_extremes() {
        let r = Rect2D::<f64>::everything();
        assert!(r.contains_point(Point2D::new(f64::MAX, f64::MIN)));
        assert!(r.contains_point(Point2D::new(0.0, 0.0)));
        assert!(r.contains_point(Point2D::new(-1e300, 1e300)));
    }

    #[test]
    fn bounding_square_of_circle() {
        let r = Rect2D::around(Point2D::new(3.0_f64, -2.0), 5.0);
        assert_eq!(r, Rect2D::new(-2.0, -7.0, 8.0, 3.0));
    }

    #[test]
    fn dist_squared_widens_f32() {
        let a = Point2D::new(1.0_f32, 2.0);
        let b = Point2D::new(4.0_f32, 6.0);
        let d: f64 = a.dist_squared(&b);
        assert_eq!(d, 25.0);
    }
}
