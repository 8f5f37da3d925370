#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Coarse navigation over walkable rectangles connected by portals.
//!
//! The graph is rebuilt in phases: areas are inserted, then
//! [`AreaGraph::generate_portals`] recomputes every adjacency. Both take
//! `&mut self`, while path queries borrow the graph immutably, so a query can
//! never observe a half-built graph.

mod refine;

use catacomb_core::{Interval, MinFrontier, WorldRect};
use glam::Vec2;
use tracing::debug;

/// Index of an area inside its [`AreaGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(usize);

impl AreaId {
    /// Position of the area in insertion order.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Shared boundary segment between two adjacent areas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Portal {
    start: Vec2,
    end: Vec2,
    neighbor: AreaId,
}

impl Portal {
    /// First endpoint of the opening.
    #[must_use]
    pub const fn start(&self) -> Vec2 {
        self.start
    }

    /// Second endpoint of the opening.
    #[must_use]
    pub const fn end(&self) -> Vec2 {
        self.end
    }

    /// Area reached by crossing the portal.
    #[must_use]
    pub const fn neighbor(&self) -> AreaId {
        self.neighbor
    }

    /// Length of the opening.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// Walkable rectangle free of walls.
#[derive(Clone, Debug, PartialEq)]
pub struct Area {
    rect: WorldRect,
    portals: Vec<Portal>,
}

impl Area {
    /// Bounds in world pixels.
    #[must_use]
    pub const fn rect(&self) -> WorldRect {
        self.rect
    }

    /// Centre used as the search node position.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Openings toward adjacent areas.
    #[must_use]
    pub fn portals(&self) -> &[Portal] {
        &self.portals
    }
}

/// Graph of walkable areas.
#[derive(Clone, Debug, Default)]
pub struct AreaGraph {
    areas: Vec<Area>,
}

impl AreaGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an area without portals. Call [`AreaGraph::generate_portals`] once a batch is in.
    pub fn insert_area(&mut self, rect: WorldRect) -> AreaId {
        let id = AreaId(self.areas.len());
        self.areas.push(Area {
            rect,
            portals: Vec::new(),
        });
        id
    }

    /// Drops every area. Identifiers handed out earlier become invalid.
    pub fn clear(&mut self) {
        self.areas.clear();
    }

    /// Number of areas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Reports whether the graph holds no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    /// Returns the area registered under `id`.
    #[must_use]
    pub fn area(&self, id: AreaId) -> Option<&Area> {
        self.areas.get(id.0)
    }

    /// Iterates over all areas with their identifiers.
    pub fn areas(&self) -> impl Iterator<Item = (AreaId, &Area)> {
        self.areas
            .iter()
            .enumerate()
            .map(|(index, area)| (AreaId(index), area))
    }

    /// Total number of directed portals.
    #[must_use]
    pub fn portal_count(&self) -> usize {
        self.areas.iter().map(|area| area.portals.len()).sum()
    }

    /// First area, in insertion order, containing `point` (edges included).
    #[must_use]
    pub fn area_at(&self, point: Vec2) -> Option<AreaId> {
        self.areas
            .iter()
            .position(|area| area.rect.contains(point))
            .map(AreaId)
    }

    /// Recomputes every portal from scratch.
    ///
    /// Two areas are adjacent when one's edge lies exactly on the other's
    /// opposite edge and the shared stretch has positive length.
    pub fn generate_portals(&mut self) {
        for area in &mut self.areas {
            area.portals.clear();
        }
        for first in 0..self.areas.len() {
            for second in first + 1..self.areas.len() {
                let a = self.areas[first].rect;
                let b = self.areas[second].rect;
                if let Some((start, end)) = shared_edge(&a, &b) {
                    self.areas[first].portals.push(Portal {
                        start,
                        end,
                        neighbor: AreaId(second),
                    });
                    self.areas[second].portals.push(Portal {
                        start,
                        end,
                        neighbor: AreaId(first),
                    });
                }
            }
        }
        debug!(
            areas = self.areas.len(),
            portals = self.portal_count(),
            "regenerated portals"
        );
    }

    /// Area-level A* from `start` to `end`.
    ///
    /// Returns the crossed portals ordered from the `end` side back to the
    /// `start` side. Empty when both are the same area or no route exists.
    #[must_use]
    pub fn astar_area(&self, start: AreaId, end: AreaId) -> Vec<Portal> {
        let (Some(_), Some(goal)) = (self.area(start), self.area(end)) else {
            return Vec::new();
        };
        if start == end {
            return Vec::new();
        }
        let goal = goal.center();

        let mut cost = vec![f32::INFINITY; self.areas.len()];
        let mut came_from: Vec<Option<(AreaId, Portal)>> = vec![None; self.areas.len()];
        let mut closed = vec![false; self.areas.len()];
        let mut frontier = MinFrontier::new();
        cost[start.0] = 0.0;
        frontier.push(start, self.areas[start.0].center().distance(goal));

        while let Some((current, _)) = frontier.pop() {
            if current == end {
                return unwind(&came_from, start, end);
            }
            if closed[current.0] {
                continue;
            }
            closed[current.0] = true;

            let here = self.areas[current.0].center();
            for portal in &self.areas[current.0].portals {
                let next = portal.neighbor;
                if closed[next.0] {
                    continue;
                }
                let there = self.areas[next.0].center();
                let tentative = cost[current.0] + here.distance(there);
                if tentative < cost[next.0] {
                    cost[next.0] = tentative;
                    came_from[next.0] = Some((current, *portal));
                    frontier.push(next, tentative + there.distance(goal));
                }
            }
        }
        Vec::new()
    }

    /// Waypoints leading from `start` to `end`, ordered from `end` back to `start`.
    ///
    /// Each crossed portal contributes two points straddling the opening at
    /// `radius` so an agent of that radius passes through without grazing the
    /// corners. Empty when either point lies outside every area or no route exists.
    #[must_use]
    pub fn get_path(&self, start: Vec2, end: Vec2, radius: f32) -> Vec<Vec2> {
        let (Some(from), Some(to)) = (self.area_at(start), self.area_at(end)) else {
            return Vec::new();
        };
        if from == to {
            return vec![end, start];
        }
        let portals = self.astar_area(from, to);
        if portals.is_empty() {
            return Vec::new();
        }

        let mut path = Vec::with_capacity(portals.len() * 2 + 2);
        path.push(end);
        let mut previous = end;
        for portal in &portals {
            let [near, far] = refine::straddle(portal, previous, radius);
            path.push(near);
            path.push(far);
            previous = far;
        }
        path.push(start);
        path
    }
}

fn unwind(came_from: &[Option<(AreaId, Portal)>], start: AreaId, end: AreaId) -> Vec<Portal> {
    let mut portals = Vec::new();
    let mut current = end;
    while current != start {
        let Some((previous, portal)) = came_from[current.0] else {
            return Vec::new();
        };
        portals.push(portal);
        current = previous;
    }
    portals
}

fn shared_edge(a: &WorldRect, b: &WorldRect) -> Option<(Vec2, Vec2)> {
    let vertical = |x: f32| {
        positive_overlap(a.vertical(), b.vertical())
            .map(|shared| (Vec2::new(x, shared.start()), Vec2::new(x, shared.end())))
    };
    let horizontal = |y: f32| {
        positive_overlap(a.horizontal(), b.horizontal())
            .map(|shared| (Vec2::new(shared.start(), y), Vec2::new(shared.end(), y)))
    };

    if a.max().x == b.min().x {
        vertical(a.max().x)
    } else if a.min().x == b.max().x {
        vertical(a.min().x)
    } else if a.max().y == b.min().y {
        horizontal(a.max().y)
    } else if a.min().y == b.max().y {
        horizontal(a.min().y)
    } else {
        None
    }
}

fn positive_overlap(a: Interval, b: Interval) -> Option<Interval> {
    a.overlap(&b).filter(|shared| shared.length() > 0.0)
}
