//! Map-level collision queries
//!
//! Gathers the tiles a moving body can reach this tick, sweeps it against
//! every visible segment and keeps the earliest hit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{
    CollisionResult, OverlapResult, collide_ellipse_with_line, overlap_ellipse_with_line,
};
use super::geom::{Aabb, Ellipse};
use super::tilemap::TileMap;
use crate::consts::{COLLISION_BUFFER, DEPENETRATION_SKIN, DISALLOWED_NORMAL_EPSILON};

/// Anything that can be swept through a tile map
pub trait CollisionBody {
    fn position(&self) -> Vec2;
    fn velocity(&self) -> Vec2;
    /// Collision shape at the current position
    fn collision(&self) -> Ellipse;

    /// Cheap bounds of the collision shape
    fn rough_bounds(&self) -> Aabb {
        self.collision().bounds()
    }
}

/// A bare ellipse with a velocity, for queries without a full player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweptEllipse {
    pub ellipse: Ellipse,
    pub velocity: Vec2,
}

impl SweptEllipse {
    pub fn new(position: Vec2, size: Vec2, velocity: Vec2) -> Self {
        Self {
            ellipse: Ellipse::new(position, size),
            velocity,
        }
    }
}

impl CollisionBody for SweptEllipse {
    fn position(&self) -> Vec2 {
        self.ellipse.position
    }

    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn collision(&self) -> Ellipse {
        self.ellipse
    }
}

/// Bounds covering the body at both ends of `velocity`, padded by a fraction of its radii
pub fn moving_bounds<B: CollisionBody + ?Sized>(body: &B, velocity: Vec2) -> Aabb {
    let start = body.rough_bounds();
    let mut end = start;
    end.translate(velocity);

    let mut swept = start;
    swept.add_box(&end);
    swept.expanded(body.collision().size * COLLISION_BUFFER)
}

/// Earliest collision of `body` against `map` over the rest of the tick.
///
/// `time_offset` is the fraction of the tick already consumed; the body is
/// swept along `velocity * (1 - time_offset)`. Hits whose normal points the
/// same way as `disallowed_normal` are skipped, so a body that just slid
/// onto a surface is not stopped again by the seam of the next tile.
/// Among equal times the first segment found wins.
pub fn first_collision<B: CollisionBody + ?Sized>(
    body: &B,
    map: &TileMap,
    time_offset: f32,
    disallowed_normal: Vec2,
) -> CollisionResult {
    let velocity = body.velocity() * (1.0 - time_offset);
    if velocity == Vec2::ZERO {
        return CollisionResult::miss();
    }

    let ellipse = body.collision();
    let range = map.tile_range(&moving_bounds(body, velocity));

    let mut best = CollisionResult::miss();
    for tile in range {
        for segment in map.tile_geometry(tile.x, tile.y) {
            let Some(result) = collide_ellipse_with_line(&ellipse, velocity, &segment) else {
                continue;
            };
            if result.normal.dot(disallowed_normal) >= 1.0 - DISALLOWED_NORMAL_EPSILON {
                continue;
            }
            if !best.hit || result.time < best.time {
                best = result;
            }
        }
    }
    best
}

/// Deepest overlap between `ellipse` and the visible geometry under it
pub fn deepest_overlap(ellipse: &Ellipse, map: &TileMap) -> Option<OverlapResult> {
    let range = map.tile_range(&ellipse.bounds());
    range
        .into_iter()
        .flat_map(|tile| map.tile_geometry(tile.x, tile.y))
        .filter_map(|segment| overlap_ellipse_with_line(ellipse, &segment))
        .fold(None, |deepest: Option<OverlapResult>, overlap| match deepest {
            Some(d) if d.distance >= overlap.distance => Some(d),
            _ => Some(overlap),
        })
}

/// Push `ellipse` out of the geometry it overlaps, deepest contact first.
///
/// Returns the total world-space offset; `Vec2::ZERO` when already clear.
/// Stops after `max_iterations` pushes even if some overlap remains.
pub fn resolve_overlaps(ellipse: &Ellipse, map: &TileMap, max_iterations: u32) -> Vec2 {
    let mut moved = *ellipse;
    let mut push = Vec2::ZERO;

    for _ in 0..max_iterations {
        let Some(overlap) = deepest_overlap(&moved, map) else {
            break;
        };
        let step = overlap.normal * (overlap.distance + DEPENETRATION_SKIN);
        moved.position += step;
        push += step;
    }

    if push != Vec2::ZERO {
        log::debug!(
            "Depenetrated ellipse at ({:.2}, {:.2}) by ({:.3}, {:.3})",
            ellipse.position.x,
            ellipse.position.y,
            push.x,
            push.y
        );
    }
    push
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UP;
    use crate::settings::OutOfBoundsPolicy;
    use crate::sim::level::parse_level;

    const EPS: f32 = 0.0001;

    fn map(rows: &str, width: u32, policy: OutOfBoundsPolicy) -> TileMap {
        parse_level(rows, width, policy).unwrap()
    }

    #[test]
    fn test_moving_bounds_cover_both_ends() {
        let body = SweptEllipse::new(Vec2::new(10.0, 10.0), Vec2::new(4.0, 8.0), Vec2::new(20.0, -5.0));
        let bounds = moving_bounds(&body, body.velocity);
        assert!(bounds.contains_point(Vec2::new(6.0, 2.0)));
        assert!(bounds.contains_point(Vec2::new(34.0, 13.0)));
        // Padding is a fraction of the radii
        assert!((bounds.min().x - (6.0 - 0.4)).abs() < EPS);
        assert!((bounds.max().y - (18.0 + 0.8)).abs() < EPS);
    }

    #[test]
    fn test_zero_velocity_misses() {
        let floor = map("111", 3, OutOfBoundsPolicy::Empty);
        let body = SweptEllipse::new(Vec2::new(24.0, 20.0), Vec2::splat(4.0), Vec2::ZERO);
        let result = first_collision(&body, &floor, 0.0, Vec2::ZERO);
        assert!(!result.hit);
        assert_eq!(result, CollisionResult::miss());
    }

    #[test]
    fn test_falls_onto_floor() {
        let floor = map("111", 3, OutOfBoundsPolicy::Empty);
        let body = SweptEllipse::new(Vec2::new(24.0, 40.0), Vec2::splat(4.0), Vec2::new(0.0, -40.0));
        let result = first_collision(&body, &floor, 0.0, Vec2::ZERO);
        assert!(result.hit);
        assert!((result.time - 0.5).abs() < EPS);
        assert!((result.normal - UP).length() < EPS);
        assert!((result.position - Vec2::new(24.0, 16.0)).length() < 0.01);
    }

    #[test]
    fn test_time_offset_shortens_sweep() {
        let floor = map("111", 3, OutOfBoundsPolicy::Empty);
        let body = SweptEllipse::new(Vec2::new(24.0, 40.0), Vec2::splat(4.0), Vec2::new(0.0, -40.0));
        // 30 units of travel left; the floor is 20 away
        let result = first_collision(&body, &floor, 0.25, Vec2::ZERO);
        assert!(result.hit);
        assert!((result.time - 2.0 / 3.0).abs() < EPS);

        let result = first_collision(&body, &floor, 0.75, Vec2::ZERO);
        assert!(!result.hit);
    }

    #[test]
    fn test_earliest_tile_wins() {
        // A box standing on the floor is reached before the floor itself
        let level = map("010111", 3, OutOfBoundsPolicy::Empty);
        let body = SweptEllipse::new(Vec2::new(24.0, 60.0), Vec2::splat(4.0), Vec2::new(0.0, -50.0));
        let result = first_collision(&body, &level, 0.0, Vec2::ZERO);
        assert!(result.hit);
        assert!((result.time - 0.48).abs() < EPS);
        assert!((result.position - Vec2::new(24.0, 32.0)).length() < 0.01);
    }

    #[test]
    fn test_seam_does_not_stop_sliding_body() {
        let floor = map("11", 2, OutOfBoundsPolicy::Empty);
        let body = SweptEllipse::new(Vec2::new(14.0, 20.5), Vec2::splat(4.0), Vec2::new(6.0, -1.0));

        let first = first_collision(&body, &floor, 0.0, Vec2::ZERO);
        assert!(first.hit);
        assert!((first.time - 0.5).abs() < EPS);
        assert!((first.normal - UP).length() < EPS);

        let second = first_collision(&body, &floor, first.time, first.normal);
        assert!(!second.hit || second.normal.dot(first.normal) < 1.0 - DISALLOWED_NORMAL_EPSILON);
    }

    #[test]
    fn test_out_of_bounds_policy_walls() {
        let body = SweptEllipse::new(Vec2::new(8.0, 24.0), Vec2::splat(4.0), Vec2::new(-10.0, 0.0));

        let open = map("000000000", 3, OutOfBoundsPolicy::Empty);
        assert!(!first_collision(&body, &open, 0.0, Vec2::ZERO).hit);

        let walled = map("000000000", 3, OutOfBoundsPolicy::Solid);
        let result = first_collision(&body, &walled, 0.0, Vec2::ZERO);
        assert!(result.hit);
        assert!((result.time - 0.4).abs() < EPS);
        assert!((result.normal - Vec2::X).length() < EPS);
    }

    #[test]
    fn test_disallowed_normal_skips_matching_surface() {
        let floor = map("111", 3, OutOfBoundsPolicy::Empty);
        let body = SweptEllipse::new(Vec2::new(24.0, 40.0), Vec2::splat(4.0), Vec2::new(0.0, -40.0));
        let result = first_collision(&body, &floor, 0.0, UP);
        assert!(!result.hit);
    }

    #[test]
    fn test_clear_body_has_no_overlap() {
        let floor = map("111", 3, OutOfBoundsPolicy::Empty);
        let resting = Ellipse::new(Vec2::new(24.0, 20.01), Vec2::splat(4.0));
        assert!(deepest_overlap(&resting, &floor).is_none());
        assert_eq!(resolve_overlaps(&resting, &floor, 4), Vec2::ZERO);
    }

    #[test]
    fn test_sunken_body_is_pushed_out() {
        let floor = map("111", 3, OutOfBoundsPolicy::Empty);
        let sunk = Ellipse::new(Vec2::new(24.0, 18.0), Vec2::splat(4.0));

        let overlap = deepest_overlap(&sunk, &floor).unwrap();
        assert!((overlap.distance - 2.0).abs() < 0.001);

        let push = resolve_overlaps(&sunk, &floor, 4);
        assert!(push.x.abs() < 0.001);
        assert!((push.y - 2.0).abs() < 0.01);

        let moved = Ellipse::new(sunk.position + push, sunk.size);
        assert!(deepest_overlap(&moved, &floor).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn level() -> impl Strategy<Value = TileMap> {
            proptest::collection::vec(0u8..6, 16).prop_map(|digits| {
                let text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
                parse_level(&text, 4, OutOfBoundsPolicy::Solid).unwrap()
            })
        }

        proptest! {
            #[test]
            fn first_collision_is_well_formed(
                map in level(),
                px in 0.0f32..64.0,
                py in 0.0f32..64.0,
                vx in -40.0f32..40.0,
                vy in -40.0f32..40.0,
                disallow_up in any::<bool>(),
            ) {
                let body = SweptEllipse::new(Vec2::new(px, py), Vec2::new(4.0, 6.0), Vec2::new(vx, vy));
                let disallowed = if disallow_up { UP } else { Vec2::ZERO };
                let result = first_collision(&body, &map, 0.0, disallowed);
                if result.hit {
                    prop_assert!((0.0..=1.0).contains(&result.time));
                    prop_assert!((result.normal.length() - 1.0).abs() < 0.001);
                    prop_assert!(result.normal.dot(disallowed) < 1.0 - DISALLOWED_NORMAL_EPSILON);
                } else {
                    prop_assert_eq!(result, CollisionResult::miss());
                }
            }
        }
    }
}
