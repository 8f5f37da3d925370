use catacomb_core::WorldRect;
use catacomb_system_pathfinding::AreaGraph;
use glam::Vec2;

fn rect(x: f32, y: f32, w: f32, h: f32) -> WorldRect {
    WorldRect::from_min_max(Vec2::new(x, y), Vec2::new(x + w, y + h))
}

fn quadtree_like() -> AreaGraph {
    let mut graph = AreaGraph::new();
    for area in [
        rect(0.0, 0.0, 128.0, 128.0),
        rect(128.0, 0.0, 64.0, 64.0),
        rect(192.0, 0.0, 64.0, 64.0),
        rect(128.0, 64.0, 64.0, 64.0),
        rect(192.0, 64.0, 64.0, 64.0),
        rect(0.0, 128.0, 256.0, 128.0),
    ] {
        let _ = graph.insert_area(area);
    }
    graph.generate_portals();
    graph
}

fn l_shaped() -> AreaGraph {
    let mut graph = AreaGraph::new();
    for area in [
        rect(0.0, 0.0, 128.0, 128.0),
        rect(128.0, 32.0, 128.0, 64.0),
        rect(256.0, 0.0, 128.0, 128.0),
        rect(256.0, 128.0, 128.0, 128.0),
    ] {
        let _ = graph.insert_area(area);
    }
    graph.generate_portals();
    graph
}

#[test]
fn portals_are_symmetric() {
    let graph = quadtree_like();
    for (id, area) in graph.areas() {
        for portal in area.portals() {
            let neighbor = graph
                .area(portal.neighbor())
                .expect("portal points at a live area");
            let back: Vec<_> = neighbor
                .portals()
                .iter()
                .filter(|candidate| candidate.neighbor() == id)
                .collect();
            assert_eq!(back.len(), 1, "area {id:?} lacks a single return portal");
            assert_eq!(back[0].start(), portal.start());
            assert_eq!(back[0].end(), portal.end());
            assert!(portal.width() > 0.0);
        }
    }
    assert_eq!(graph.portal_count(), 2 * 9);
}

#[test]
fn area_lookup_prefers_the_first_inserted_area_on_shared_edges() {
    let graph = quadtree_like();
    assert_eq!(
        graph.area_at(Vec2::new(128.0, 10.0)).map(|id| id.index()),
        Some(0)
    );
    assert_eq!(graph.area_at(Vec2::new(300.0, 10.0)), None);
}

#[test]
fn path_starts_at_the_goal_and_ends_at_the_origin() {
    let graph = l_shaped();
    let start = Vec2::new(20.0, 20.0);
    let end = Vec2::new(300.0, 200.0);
    let path = graph.get_path(start, end, 8.0);

    assert_eq!(path.first(), Some(&end));
    assert_eq!(path.last(), Some(&start));
    assert_eq!(path.len(), 2 + 2 * 3);
}

#[test]
fn every_path_leg_stays_inside_walkable_areas() {
    let graph = l_shaped();
    let path = graph.get_path(Vec2::new(20.0, 20.0), Vec2::new(300.0, 200.0), 8.0);
    assert!(!path.is_empty());

    for point in &path {
        assert!(graph.area_at(*point).is_some(), "{point} is off the graph");
    }
    for leg in path.windows(2) {
        for step in 1..8 {
            let sample = leg[0].lerp(leg[1], step as f32 / 8.0);
            assert!(
                graph.area_at(sample).is_some(),
                "leg {:?} -> {:?} leaves the graph at {sample}",
                leg[0],
                leg[1]
            );
        }
    }
}

#[test]
fn narrow_corridor_keeps_waypoints_off_the_corners() {
    let graph = l_shaped();
    let corridor = graph.area_at(Vec2::new(192.0, 64.0));
    let path = graph.get_path(Vec2::new(20.0, 20.0), Vec2::new(300.0, 200.0), 8.0);
    let inside: Vec<&Vec2> = path[1..path.len() - 1]
        .iter()
        .filter(|point| graph.area_at(**point) == corridor)
        .collect();
    assert_eq!(inside.len(), 2);
    for point in inside {
        assert!(point.y >= 32.0 + 8.0 && point.y <= 96.0 - 8.0);
    }
}

#[test]
fn points_outside_the_graph_have_no_path() {
    let graph = l_shaped();
    assert!(graph
        .get_path(Vec2::new(-5.0, -5.0), Vec2::new(300.0, 200.0), 8.0)
        .is_empty());
    assert!(graph
        .get_path(Vec2::new(20.0, 20.0), Vec2::new(200.0, 200.0), 8.0)
        .is_empty());
}
