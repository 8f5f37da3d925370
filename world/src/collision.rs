//! Swept overlap tests between circles and rectangles, plus the line-of-sight test.
//!
//! A moving pair collides when the overlap of their projections on the separating
//! axis grows during the step. Bodies already interpenetrating may therefore move
//! apart freely but never deeper.

use catacomb_core::{Interval, Shape};
use glam::Vec2;

/// Collision candidate: centre, shape and the offset proposed for this step.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Swept {
    pub(crate) position: Vec2,
    pub(crate) shape: Shape,
    pub(crate) offset: Vec2,
}

impl Swept {
    fn after(&self) -> Vec2 {
        self.position + self.offset
    }
}

/// Broad phase: rejects pairs that cannot meet even when both travel their full offsets.
pub(crate) fn may_touch(a: &Swept, b: &Swept) -> bool {
    let reach = a.shape.bounding_radius()
        + b.shape.bounding_radius()
        + a.offset.length()
        + b.offset.length();
    a.position.distance_squared(b.position) <= reach * reach
}

/// Narrow phase, symmetric in its arguments.
pub(crate) fn collides(a: &Swept, b: &Swept) -> bool {
    match (a.shape, b.shape) {
        (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
            circle_circle(a, ra, b, rb)
        }
        (Shape::Circle { radius }, Shape::Rectangle { half_extents }) => {
            circle_rectangle(a, radius, b.position, half_extents)
        }
        (Shape::Rectangle { half_extents }, Shape::Circle { radius }) => {
            circle_rectangle(b, radius, a.position, half_extents)
        }
        (Shape::Rectangle { .. }, Shape::Rectangle { .. }) => false,
    }
}

fn circle_circle(a: &Swept, ra: f32, b: &Swept, rb: f32) -> bool {
    let axis = b.position - a.position;
    let Some(axis) = axis.try_normalize() else {
        return true;
    };
    let before = projected_overlap(a.position, ra, b.position, rb, axis);
    let after = projected_overlap(a.after(), ra, b.after(), rb, axis);
    after > before
}

/// Rectangles never move; only the circle's offset is considered.
fn circle_rectangle(circle: &Swept, radius: f32, center: Vec2, half: Vec2) -> bool {
    let before = circle.position - center;
    let after = circle.after() - center;
    let reach = half + Vec2::splat(radius);

    if before.x.abs() <= half.x || before.y.abs() <= half.y {
        let x_before = axis_overlap(before.x, reach.x);
        let x_after = axis_overlap(after.x, reach.x);
        let y_before = axis_overlap(before.y, reach.y);
        let y_after = axis_overlap(after.y, reach.y);
        return (x_after > x_before && y_after > 0.0) || (y_after > y_before && x_after > 0.0);
    }

    let Some(axis) = before.try_normalize() else {
        return true;
    };
    let extent = half.x * axis.x.abs() + half.y * axis.y.abs();
    let rect = Interval::around(center.dot(axis), extent);
    let before = rect.overlap_length(&Interval::around(circle.position.dot(axis), radius));
    let after = rect.overlap_length(&Interval::around(circle.after().dot(axis), radius));
    after > before
}

fn projected_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32, axis: Vec2) -> f32 {
    Interval::around(a.dot(axis), ra).overlap_length(&Interval::around(b.dot(axis), rb))
}

/// Overlap of `[-reach, reach]` with a unit-free point at `delta`, expressed as penetration depth.
fn axis_overlap(delta: f32, reach: f32) -> f32 {
    (reach - delta.abs()).max(0.0)
}

/// Reports whether the segment from `a` to `b` crosses the rectangle.
///
/// Uses the separating axis theorem over the rectangle axes, the segment normal and
/// the axis from the rectangle centre to the segment midpoint. Merely grazing an edge
/// does not block a segment of positive length.
pub(crate) fn segment_blocked(a: Vec2, b: Vec2, center: Vec2, half: Vec2) -> bool {
    let direction = b - a;
    let midpoint = (a + b) * 0.5;
    let mut axes = vec![Vec2::X, Vec2::Y];
    if let Some(normal) = direction.perp().try_normalize() {
        axes.push(normal);
    }
    if let Some(toward) = (midpoint - center).try_normalize() {
        axes.push(toward);
    }

    axes.into_iter().all(|axis| {
        let extent = half.x * axis.x.abs() + half.y * axis.y.abs();
        let rect = Interval::around(center.dot(axis), extent);
        let segment = Interval::new(a.dot(axis), b.dot(axis));
        match rect.overlap(&segment) {
            None => false,
            Some(shared) => {
                let grazing = shared.length() == 0.0
                    && (shared.start() == rect.end() || shared.end() == rect.start());
                !grazing
            }
        }
    })
}
