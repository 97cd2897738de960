//! Geometry primitives for collision
//!
//! Plain value types: axis-aligned boxes, implicit lines, line segments and
//! ellipses. All collision routines work in "ellipse space", the non-uniform
//! scale that turns an ellipse into a unit circle (see [`Ellipse::espace`]).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SEGMENT_BOX_TOLERANCE;
use crate::{left_perp, right_perp};

/// Axis-aligned bounding box. Always satisfies `min <= max` per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    min: Vec2,
    max: Vec2,
}

impl Aabb {
    /// Box spanning two arbitrary corners
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Degenerate box around a single point
    pub fn from_point(p: Vec2) -> Self {
        Self { min: p, max: p }
    }

    /// Smallest box containing all points, `None` for an empty iterator
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec2>,
    {
        let mut iter = points.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for p in iter {
            bounds.add_point(p);
        }
        Some(bounds)
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec2 {
        (self.max - self.min) * 0.5
    }

    /// Grow to contain `p`
    pub fn add_point(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow to contain `other`
    pub fn add_box(&mut self, other: &Aabb) {
        self.add_point(other.min);
        self.add_point(other.max);
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.min += offset;
        self.max += offset;
    }

    /// Grow each side by `margin` (componentwise, must be non-negative)
    pub fn expanded(&self, margin: Vec2) -> Self {
        let margin = margin.abs();
        Self {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// Inclusive point containment
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.y >= self.min.y && p.x <= self.max.x && p.y <= self.max.y
    }

    /// Inclusive overlap test (touching boxes overlap)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// Implicit line `a*x + b*y + c = 0` with `(a, b)` stored as `normal`.
///
/// The normal is not required to be unit length; distances divide by its
/// length so callers never need to normalize first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEquation {
    pub normal: Vec2,
    pub c: f32,
}

impl LineEquation {
    pub fn new(a: f32, b: f32, c: f32) -> Self {
        Self {
            normal: Vec2::new(a, b),
            c,
        }
    }

    /// Line through `point` with the given normal
    pub fn from_point_normal(point: Vec2, normal: Vec2) -> Self {
        Self {
            normal,
            c: -normal.dot(point),
        }
    }

    #[inline]
    pub fn a(&self) -> f32 {
        self.normal.x
    }

    #[inline]
    pub fn b(&self) -> f32 {
        self.normal.y
    }

    /// Raw `a*x + b*y + c` (scaled by the normal's length)
    #[inline]
    pub fn multiply_through(&self, p: Vec2) -> f32 {
        self.normal.dot(p) + self.c
    }

    /// Distance from the line, positive on the side the normal points toward
    #[inline]
    pub fn signed_distance(&self, p: Vec2) -> f32 {
        self.multiply_through(p) / self.normal.length()
    }

    #[inline]
    pub fn point_distance(&self, p: Vec2) -> f32 {
        self.signed_distance(p).abs()
    }

    /// Orthogonal projection of `p` onto the line
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p - self.normal.normalize() * self.signed_distance(p)
    }

    /// Normal rotated +90°; a direction along the line
    pub fn left_norm(&self) -> Vec2 {
        left_perp(self.normal)
    }

    /// Normal rotated -90°; the opposite direction along the line
    pub fn right_norm(&self) -> Vec2 {
        right_perp(self.normal)
    }
}

/// Directed line segment. The solid side is to the right of `start -> end`,
/// so the left-hand normal faces out of the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Vec2,
    pub end: Vec2,
}

impl LineSegment {
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.end - self.start
    }

    pub fn length_squared(&self) -> f32 {
        self.direction().length_squared()
    }

    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    /// True when `start == end`; such segments have no equation
    pub fn is_degenerate(&self) -> bool {
        self.length_squared() == 0.0
    }

    /// Implicit equation of the infinite line; its normal is the
    /// (unnormalized) left-hand normal.
    pub fn equation(&self) -> LineEquation {
        LineEquation::from_point_normal(self.end, self.left_hand_normal())
    }

    pub fn left_hand_normal(&self) -> Vec2 {
        left_perp(self.direction())
    }

    pub fn right_hand_normal(&self) -> Vec2 {
        right_perp(self.direction())
    }

    /// Point containment in the segment's bounding box, with slack
    pub fn within_bounding_box(&self, p: Vec2, tolerance: f32) -> bool {
        let lo = self.start.min(self.end) - Vec2::splat(tolerance);
        let hi = self.start.max(self.end) + Vec2::splat(tolerance);
        p.x >= lo.x && p.y >= lo.y && p.x <= hi.x && p.y <= hi.y
    }

    /// [`Self::within_bounding_box`] with the default tolerance
    pub fn contains_in_box(&self, p: Vec2) -> bool {
        self.within_bounding_box(p, SEGMENT_BOX_TOLERANCE)
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self::new(self.start + offset, self.end + offset)
    }

    /// Componentwise scale of both endpoints (used for ellipse-space transforms)
    pub fn scaled(&self, scale: Vec2) -> Self {
        Self::new(self.start * scale, self.end * scale)
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.start, self.end)
    }
}

/// Axis-aligned ellipse. `size` holds the radii (half extents), not the diameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    pub position: Vec2,
    pub size: Vec2,
}

impl Ellipse {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self { position, size }
    }

    /// Scale mapping world space into the space where this ellipse is a unit circle
    #[inline]
    pub fn espace(&self) -> Vec2 {
        self.size.recip()
    }

    /// Ellipse-space position of the center
    #[inline]
    pub fn espace_position(&self) -> Vec2 {
        self.position * self.espace()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.position - self.size, self.position + self.size)
    }
}
