//! Turns portal openings into concrete waypoints.

use glam::Vec2;

use crate::Portal;

/// Clearance kept from portal corners, as a multiple of the agent radius.
const CORNER_INSET: f32 = 1.5;

/// Two points on either side of the opening, `radius` away from it, the one
/// closer to `previous` first.
///
/// The crossing point is the projection of `previous` onto the opening. When
/// that projection falls beyond an endpoint it is pulled back inside by
/// `radius * 1.5`; openings too narrow for that inset are crossed at their middle.
pub(crate) fn straddle(portal: &Portal, previous: Vec2, radius: f32) -> [Vec2; 2] {
    let crossing = crossing_point(portal.start(), portal.end(), previous, radius);
    let direction = (portal.end() - portal.start()).normalize_or_zero();
    let normal = direction.perp();
    let a = crossing + normal * radius;
    let b = crossing - normal * radius;
    if a.distance_squared(previous) <= b.distance_squared(previous) {
        [a, b]
    } else {
        [b, a]
    }
}

fn crossing_point(start: Vec2, end: Vec2, previous: Vec2, radius: f32) -> Vec2 {
    let span = end - start;
    let length_squared = span.length_squared();
    if length_squared == 0.0 {
        return start;
    }
    let t = (previous - start).dot(span) / length_squared;
    if (0.0..=1.0).contains(&t) {
        return start + span * t;
    }

    let inset = radius * CORNER_INSET;
    let length = length_squared.sqrt();
    if length <= inset * 2.0 {
        return (start + end) * 0.5;
    }
    let direction = span / length;
    if t < 0.0 {
        start + direction * inset
    } else {
        end - direction * inset
    }
}
