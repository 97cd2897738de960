//! Swept collision between a moving ellipse and static geometry
//!
//! The tricky part of the simulation: time-of-impact tests for an ellipse
//! moving along a straight velocity vector against points and line segments.
//! Every test maps the problem into ellipse space, where the ellipse is a
//! unit circle, solves the circle case there, and maps the result back.
//!
//! Times are fractions of the velocity passed in, always in `[0, 1]`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geom::{Ellipse, LineSegment};
use crate::UP;

/// What kind of geometry produced a contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ContactKind {
    #[default]
    None,
    Line,
    Ellipse,
    Point,
}

/// Result of a swept collision test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionResult {
    /// Geometry that was hit
    pub kind: ContactKind,
    /// Fraction of the velocity travelled before impact (meaningless on a miss)
    pub time: f32,
    /// Contact point on the surface, world space
    pub position: Vec2,
    /// Unit surface normal, pointing from the surface toward the moving body
    pub normal: Vec2,
    /// Whether a collision occurred
    pub hit: bool,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            kind: ContactKind::None,
            time: 1.0,
            position: Vec2::ZERO,
            normal: Vec2::ZERO,
            hit: false,
        }
    }

    fn point_hit(time: f32, position: Vec2, normal: Vec2) -> Self {
        Self {
            kind: ContactKind::Point,
            time,
            position,
            normal,
            hit: true,
        }
    }
}

impl Default for CollisionResult {
    fn default() -> Self {
        Self::miss()
    }
}

/// Result of a static overlap test (body already intersecting geometry)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapResult {
    pub kind: ContactKind,
    /// World-space distance to push the body along `normal` to clear the geometry
    pub distance: f32,
    /// Unit ejection direction
    pub normal: Vec2,
    /// Closest point on the geometry, world space
    pub point: Vec2,
}

/// Sweep an ellipse along `velocity` against a single point.
///
/// Solves `|E + d*t - P|² = 1` in ellipse space. Returns `None` when the
/// ellipse moves away from the point, never reaches it, or reaches it
/// outside `t ∈ [0, 1]`.
pub fn collide_ellipse_with_point(
    ellipse: &Ellipse,
    velocity: Vec2,
    point: Vec2,
) -> Option<CollisionResult> {
    let xform = ellipse.espace();

    let e = ellipse.espace_position();
    let d = velocity * xform;
    let p = point * xform;
    let offset = e - p;

    // Moving away from the point
    if d.dot(offset) > 0.0 {
        return None;
    }

    let a = d.length_squared();
    if a == 0.0 {
        return None;
    }
    let b = 2.0 * offset.dot(d);
    let c = offset.length_squared() - 1.0;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let t0 = (-b - root) / (2.0 * a);
    let t1 = (-b + root) / (2.0 * a);

    let t = if (0.0..=1.0).contains(&t0) {
        t0
    } else if (0.0..=1.0).contains(&t1) {
        t1
    } else {
        return None;
    };

    // Gradients map back to world space by the same scale as points map in
    let center_at_hit = e + d * t;
    let normal = ((center_at_hit - p) * xform).normalize_or(UP);

    Some(CollisionResult::point_hit(t, point, normal))
}

/// Sweep an ellipse along `velocity` against a line segment.
///
/// Only the segment's front face (the side its left-hand normal points to)
/// collides. When the face contact lies outside the segment, or the ellipse
/// is already embedded in the line's band while moving parallel to it, the
/// test falls back to the two endpoints and keeps the earlier hit.
pub fn collide_ellipse_with_line(
    ellipse: &Ellipse,
    velocity: Vec2,
    segment: &LineSegment,
) -> Option<CollisionResult> {
    if velocity == Vec2::ZERO {
        return None;
    }
    if segment.is_degenerate() {
        return collide_ellipse_with_point(ellipse, velocity, segment.start);
    }

    let xform = ellipse.espace();

    let e = ellipse.espace_position();
    let d = velocity * xform;
    let line = segment.scaled(xform);
    let equation = line.equation();

    // Moving away from the front face
    let approach = d.dot(equation.normal);
    if approach > 0.0 {
        return None;
    }

    let dist_at_start = equation.signed_distance(e);
    let dist_at_end = equation.signed_distance(e + d);

    let embedded;
    let mut t0 = 0.0;

    if approach == 0.0 || dist_at_end == dist_at_start {
        // Parallel: either out of reach for the whole frame or inside the band for all of it
        if dist_at_start >= 1.0 {
            return None;
        }
        embedded = true;
    } else {
        embedded = false;
        let mut enter = (1.0 - dist_at_start) / (dist_at_end - dist_at_start);
        let mut exit = (-1.0 - dist_at_start) / (dist_at_end - dist_at_start);
        if enter > exit {
            std::mem::swap(&mut enter, &mut exit);
        }
        if enter > 1.0 || exit < 0.0 {
            return None;
        }
        t0 = enter.clamp(0.0, 1.0);
    }

    if !embedded {
        let center_at_hit = e + d * t0;
        let hit_proportion =
            (center_at_hit - line.start).dot(line.direction()) / line.length_squared();

        if (0.0..=1.0).contains(&hit_proportion) {
            let unit_normal = equation.normal.normalize();
            return Some(CollisionResult {
                kind: ContactKind::Line,
                time: t0,
                position: (center_at_hit - unit_normal) * ellipse.size,
                normal: segment.left_hand_normal().normalize(),
                hit: true,
            });
        }
    }

    // Corner case: the ellipse clips an endpoint rather than the face
    let start_hit = collide_ellipse_with_point(ellipse, velocity, segment.start);
    let end_hit = collide_ellipse_with_point(ellipse, velocity, segment.end);

    match (start_hit, end_hit) {
        (Some(s), Some(e)) => Some(if e.time <= s.time { e } else { s }),
        (s, e) => s.or(e),
    }
}

/// Check whether an ellipse already contains `point`.
///
/// Meant as a start-of-tick safety net; swept tests cannot see geometry the
/// body already overlaps.
pub fn overlap_ellipse_with_point(ellipse: &Ellipse, point: Vec2) -> Option<OverlapResult> {
    let xform = ellipse.espace();
    let offset = ellipse.espace_position() - point * xform;
    let offset_sq = offset.length_squared();

    if offset_sq >= 1.0 {
        return None;
    }

    // Center sitting on the point: eject upward
    let (circle_edge, normal) = if offset_sq < crate::consts::NORMAL_EPSILON {
        (-UP, UP)
    } else {
        (-offset.normalize(), (offset * xform).normalize_or(UP))
    };

    Some(OverlapResult {
        kind: ContactKind::Point,
        distance: ((circle_edge + offset) * ellipse.size).length(),
        normal,
        point,
    })
}

/// Check whether an ellipse already intersects a line segment.
///
/// Face overlap is tested first; if the closest point on the line falls
/// outside the segment the endpoints are tried, keeping the shallower one.
pub fn overlap_ellipse_with_line(
    ellipse: &Ellipse,
    segment: &LineSegment,
) -> Option<OverlapResult> {
    if segment.is_degenerate() {
        return overlap_ellipse_with_point(ellipse, segment.start);
    }

    let xform = ellipse.espace();
    let e = ellipse.espace_position();
    let line = segment.scaled(xform);
    let equation = line.equation();

    let dist = equation.signed_distance(e);
    if dist.abs() >= 1.0 {
        return None;
    }

    let closest = equation.closest_point(e);
    if line.contains_in_box(closest) {
        let circle_edge = e - equation.normal.normalize();
        return Some(OverlapResult {
            kind: ContactKind::Line,
            distance: ((circle_edge - closest) * ellipse.size).length(),
            normal: segment.left_hand_normal().normalize(),
            point: closest * ellipse.size,
        });
    }

    let start = overlap_ellipse_with_point(ellipse, segment.start);
    let end = overlap_ellipse_with_point(ellipse, segment.end);
    match (start, end) {
        (Some(s), Some(e)) => Some(if e.distance < s.distance { e } else { s }),
        (s, e) => s.or(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 0.0001;

    fn unit_ellipse() -> Ellipse {
        Ellipse::new(Vec2::ZERO, Vec2::ONE)
    }

    #[test]
    fn test_point_head_on() {
        let point = Vec2::new(1.5, 0.0);
        let hit = collide_ellipse_with_point(&unit_ellipse(), Vec2::new(1.0, 0.0), point)
            .expect("should hit");
        assert!(hit.hit);
        assert_eq!(hit.kind, ContactKind::Point);
        assert!((hit.time - 0.5).abs() < EPS);
        assert!((hit.position - point).length() < EPS);
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_point_moving_away() {
        let hit = collide_ellipse_with_point(&unit_ellipse(), Vec2::new(-1.0, 0.0), Vec2::new(1.5, 0.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_point_out_of_reach() {
        // Passes above the point with clearance
        let hit = collide_ellipse_with_point(&unit_ellipse(), Vec2::new(4.0, 0.0), Vec2::new(2.0, 1.5));
        assert!(hit.is_none());
        // Too short a move
        let hit = collide_ellipse_with_point(&unit_ellipse(), Vec2::new(0.25, 0.0), Vec2::new(1.5, 0.0));
        assert!(hit.is_none());
    }

    #[test]
    fn test_point_zero_velocity() {
        assert!(collide_ellipse_with_point(&unit_ellipse(), Vec2::ZERO, Vec2::new(1.5, 0.0)).is_none());
    }

    #[test]
    fn test_line_perpendicular_approach() {
        let line = LineSegment::new(Vec2::new(1.5, -2.0), Vec2::new(1.5, 2.0));
        let hit = collide_ellipse_with_line(&unit_ellipse(), Vec2::new(1.0, 0.0), &line)
            .expect("should hit");
        assert_eq!(hit.kind, ContactKind::Line);
        assert!((hit.time - 0.5).abs() < EPS);
        assert!((hit.position.x - 1.5).abs() < EPS);
        assert!(hit.position.y.abs() < EPS);
        assert!((hit.normal - Vec2::new(-1.0, 0.0)).length() < EPS);
    }

    #[test]
    fn test_line_non_uniform_ellipse() {
        let ellipse = Ellipse::new(Vec2::ZERO, Vec2::new(2.0, 1.0));
        let line = LineSegment::new(Vec2::new(2.5, -2.0), Vec2::new(2.5, 2.0));
        let hit = collide_ellipse_with_line(&ellipse, Vec2::new(1.0, 0.0), &line)
            .expect("should hit");
        assert!((hit.time - 0.5).abs() < EPS);
        assert!((hit.position.x - 2.5).abs() < EPS);
        assert!(hit.position.y.abs() < EPS);
    }

    #[test]
    fn test_line_diagonal_approach() {
        let line = LineSegment::new(Vec2::new(2.0, 0.0), Vec2::new(0.0, 2.0));
        let hit = collide_ellipse_with_line(&unit_ellipse(), Vec2::new(1.0, 1.0), &line)
            .expect("should hit");
        let expected = 1.0 - 1.0 / 2.0_f32.sqrt();
        assert!((hit.time - expected).abs() < EPS);
        assert!((hit.position - Vec2::new(1.0, 1.0)).length() < EPS);
        let diag = -Vec2::ONE.normalize();
        assert!((hit.normal - diag).length() < EPS);
    }

    #[test]
    fn test_line_endpoint_fallback() {
        let ellipse = Ellipse::new(Vec2::ZERO, Vec2::new(1.0, 5.0));
        let line = LineSegment::new(Vec2::new(3.0, 0.0), Vec2::new(1.0, 2.0));
        let hit = collide_ellipse_with_line(&ellipse, Vec2::new(1.0, 0.0), &line)
            .expect("should hit");
        assert_eq!(hit.kind, ContactKind::Point);
        assert!((hit.time - 0.083_484_83).abs() < EPS);
        assert!((hit.position - line.end).length() < EPS);
    }

    #[test]
    fn test_line_back_face_ignored() {
        // Same line reversed: its front face now points away from the ellipse
        let line = LineSegment::new(Vec2::new(1.5, 2.0), Vec2::new(1.5, -2.0));
        let hit = collide_ellipse_with_line(&unit_ellipse(), Vec2::new(1.0, 0.0), &line);
        assert!(hit.is_none());
    }

    #[test]
    fn test_line_zero_velocity() {
        let line = LineSegment::new(Vec2::new(1.5, -2.0), Vec2::new(1.5, 2.0));
        assert!(collide_ellipse_with_line(&unit_ellipse(), Vec2::ZERO, &line).is_none());
    }

    #[test]
    fn test_line_parallel_out_of_reach() {
        // Floor two units below, sliding sideways
        let floor = LineSegment::new(Vec2::new(-10.0, -2.0), Vec2::new(10.0, -2.0));
        assert!(collide_ellipse_with_line(&unit_ellipse(), Vec2::new(3.0, 0.0), &floor).is_none());
    }

    #[test]
    fn test_line_parallel_embedded_uses_endpoints() {
        // Floor half a unit below, inside the band: only endpoints can report hits
        let floor = LineSegment::new(Vec2::new(-10.0, -0.5), Vec2::new(2.0, -0.5));
        let hit = collide_ellipse_with_line(&unit_ellipse(), Vec2::new(-3.0, 0.0), &floor);
        assert!(hit.is_none(), "neither endpoint reachable this frame");

        let hit = collide_ellipse_with_line(&unit_ellipse(), Vec2::new(3.0, 0.0), &floor)
            .expect("endpoint in the way");
        assert_eq!(hit.kind, ContactKind::Point);
        assert!((hit.position - floor.end).length() < EPS);
    }

    #[test]
    fn test_line_picks_earlier_endpoint() {
        let ellipse = unit_ellipse();
        let seg = LineSegment::new(Vec2::new(4.0, 0.5), Vec2::new(2.0, 0.5));
        // Segment lies along the motion, both endpoints ahead; the nearer one wins
        let hit = collide_ellipse_with_line(&ellipse, Vec2::new(5.0, 0.0), &seg).expect("hit");
        assert!((hit.position - Vec2::new(2.0, 0.5)).length() < EPS);
    }

    #[test]
    fn test_overlap_point() {
        let e = Ellipse::new(Vec2::ZERO, Vec2::new(2.0, 2.0));
        let o = overlap_ellipse_with_point(&e, Vec2::new(1.5, 0.0)).expect("overlapping");
        assert!((o.distance - 0.5).abs() < EPS);
        assert!((o.normal - Vec2::new(-1.0, 0.0)).length() < EPS);
        assert!(overlap_ellipse_with_point(&e, Vec2::new(2.5, 0.0)).is_none());
    }

    #[test]
    fn test_overlap_point_at_center() {
        let e = Ellipse::new(Vec2::ZERO, Vec2::new(1.0, 3.0));
        let o = overlap_ellipse_with_point(&e, Vec2::ZERO).expect("overlapping");
        assert_eq!(o.normal, UP);
        assert!((o.distance - 3.0).abs() < EPS);
    }

    #[test]
    fn test_overlap_line_face() {
        let e = Ellipse::new(Vec2::new(0.0, 1.5), Vec2::new(4.0, 2.0));
        // Directed +x so the left-hand normal faces up
        let floor = LineSegment::new(Vec2::new(-8.0, 0.0), Vec2::new(8.0, 0.0));
        let o = overlap_ellipse_with_line(&e, &floor).expect("overlapping");
        assert_eq!(o.kind, ContactKind::Line);
        assert!((o.distance - 0.5).abs() < EPS);
        assert!((o.normal - UP).length() < EPS);
        assert!(o.point.y.abs() < EPS);
    }

    #[test]
    fn test_overlap_line_endpoint() {
        let e = Ellipse::new(Vec2::new(8.5, 0.5), Vec2::ONE);
        let floor = LineSegment::new(Vec2::new(-8.0, 0.0), Vec2::new(8.0, 0.0));
        let o = overlap_ellipse_with_line(&e, &floor).expect("overlapping");
        assert_eq!(o.kind, ContactKind::Point);
        assert_eq!(o.point, Vec2::new(8.0, 0.0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn vec2(range: f32) -> impl Strategy<Value = Vec2> {
            (-range..range, -range..range).prop_map(|(x, y)| Vec2::new(x, y))
        }

        fn radii() -> impl Strategy<Value = Vec2> {
            (0.5f32..20.0, 0.5f32..20.0).prop_map(|(x, y)| Vec2::new(x, y))
        }

        proptest! {
            #[test]
            fn swept_line_results_are_well_formed(
                position in vec2(100.0),
                size in radii(),
                velocity in vec2(50.0),
                start in vec2(100.0),
                end in vec2(100.0),
            ) {
                prop_assume!(start.distance(end) > 0.01);
                let ellipse = Ellipse::new(position, size);
                let segment = LineSegment::new(start, end);
                if let Some(hit) = collide_ellipse_with_line(&ellipse, velocity, &segment) {
                    prop_assert!(hit.hit);
                    prop_assert!((0.0..=1.0).contains(&hit.time), "time {}", hit.time);
                    prop_assert!(hit.position.is_finite());
                    prop_assert!((hit.normal.length() - 1.0).abs() < 1e-3);
                    prop_assert!(hit.kind == ContactKind::Line || hit.kind == ContactKind::Point);
                }
            }

            #[test]
            fn swept_point_results_are_well_formed(
                position in vec2(100.0),
                size in radii(),
                velocity in vec2(50.0),
                point in vec2(100.0),
            ) {
                let ellipse = Ellipse::new(position, size);
                if let Some(hit) = collide_ellipse_with_point(&ellipse, velocity, point) {
                    prop_assert!((0.0..=1.0).contains(&hit.time));
                    prop_assert!(hit.normal.is_finite());
                    prop_assert_eq!(hit.position, point);
                }
            }

            #[test]
            fn overlap_results_are_well_formed(
                position in vec2(40.0),
                size in radii(),
                start in vec2(40.0),
                end in vec2(40.0),
            ) {
                prop_assume!(start.distance(end) > 0.01);
                let ellipse = Ellipse::new(position, size);
                let segment = LineSegment::new(start, end);
                if let Some(o) = overlap_ellipse_with_line(&ellipse, &segment) {
                    prop_assert!(o.distance.is_finite() && o.distance >= 0.0);
                    prop_assert!((o.normal.length() - 1.0).abs() < 1e-3);
                }
            }
        }
    }
}
