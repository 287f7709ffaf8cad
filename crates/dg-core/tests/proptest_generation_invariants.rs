//! Property-based invariant tests for layout generation.
//!
//! Verifies structural invariants that must hold for any input:
//!
//! 1. Quarter turns compose: rotating by `a` then `b` equals rotating by `a + b`
//! 2. Rotated cells stay inside the rotated footprint
//! 3. Triangles are counter-clockwise with empty circumcircles
//! 4. Delaunay edges connect every point and include every edge of the
//!    triangles that avoid the enclosing super-triangle
//! 5. A* finds the cheapest route (checked against exhaustive search on grids up to 6x6)
//! 6. Real rooms never overlap and keep a one-cell gap, corridors never enter rooms
//! 7. Every door is either used by a corridor or sealed

use std::collections::BTreeSet;

use dg_core::graph::{RoomClusters, delaunay_edges, triangulate};
use dg_core::room::{rotate_direction, rotate_position, rotated_size};
use dg_core::router::{RouteCosts, find_path, path_cost};
use dg_core::{
    Direction, GameRng, GeneratorConfig, GridBounds, GridPos, GridRect, Occupancy, RoomId,
    RoomTemplate, Rotation, Theme, TileKind, generate_layer,
};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::East),
        Just(Direction::South),
        Just(Direction::West),
    ]
}

fn rotation_strategy() -> impl Strategy<Value = Rotation> {
    (0u8..4).prop_map(Rotation::new)
}

/// A template size and a cell inside it
fn local_cell_strategy() -> impl Strategy<Value = ((i32, i32), GridPos)> {
    (1i32..9, 1i32..9).prop_flat_map(|(w, d)| {
        (Just((w, d)), (0..w, 0..d).prop_map(|(x, y)| GridPos::new(x, y)))
    })
}

fn distinct_points_strategy() -> impl Strategy<Value = Vec<GridPos>> {
    prop::collection::btree_set((0i32..30, 0i32..30), 3..24)
        .prop_map(|set| set.into_iter().map(|(x, y)| GridPos::new(x, y)).collect())
}

/// Cell contents of a small router grid: 0 empty, 1 corridor, 2 room
#[derive(Debug, Clone)]
struct SmallGrid {
    width: i32,
    height: i32,
    cells: Vec<u8>,
    start: GridPos,
    goal: GridPos,
}

fn small_grid_strategy() -> impl Strategy<Value = SmallGrid> {
    (2i32..=6, 2i32..=6).prop_flat_map(|(width, height)| {
        let n = (width * height) as usize;
        (
            prop::collection::vec(prop_oneof![3 => Just(0u8), 1 => Just(1u8), 1 => Just(2u8)], n),
            (0..width, 0..height),
            (0..width, 0..height),
        )
            .prop_map(move |(cells, (sx, sy), (gx, gy))| SmallGrid {
                width,
                height,
                cells,
                start: GridPos::new(sx, sy),
                goal: GridPos::new(gx, gy),
            })
    })
}

fn route_costs_strategy() -> impl Strategy<Value = RouteCosts> {
    (1u32..4, 1u32..8, 0u32..12).prop_map(|(existing, extra, turn)| RouteCosts {
        digging: existing + extra,
        existing,
        turn,
    })
}

// ── Helpers ─────────────────────────────────────────────────────────────

type Point = (i128, i128);

fn point(pos: GridPos) -> Point {
    (i128::from(pos.x), i128::from(pos.y))
}

fn orient(a: Point, b: Point, c: Point) -> i128 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn strictly_in_circle(a: Point, b: Point, c: Point, d: Point) -> bool {
    let (adx, ady) = (a.0 - d.0, a.1 - d.1);
    let (bdx, bdy) = (b.0 - d.0, b.1 - d.1);
    let (cdx, cdy) = (c.0 - d.0, c.1 - d.1);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    ad * (bdx * cdy - cdx * bdy) + bd * (cdx * ady - adx * cdy) + cd * (adx * bdy - bdx * ady) > 0
}

fn build_occupancy(grid: &SmallGrid) -> Occupancy {
    let mut occupancy = Occupancy::new(GridBounds::new(grid.width, grid.height));
    for (i, &kind) in grid.cells.iter().enumerate() {
        let pos = GridPos::new(i as i32 % grid.width, i as i32 / grid.width);
        match kind {
            1 => {
                occupancy.carve(pos);
            }
            2 => {
                occupancy.mark_room(&GridRect::from_origin(pos, 1, 1), RoomId(0));
            }
            _ => {}
        }
    }
    occupancy
}

/// Cheapest cost over every simple path, by depth-first search
///
/// Branches are cut only once their cost plus a lower bound on the rest
/// cannot beat the best complete path found so far.
fn brute_force_cost(occupancy: &Occupancy, start: GridPos, goal: GridPos, costs: &RouteCosts) -> Option<u32> {
    struct Search<'a> {
        occupancy: &'a Occupancy,
        goal: GridPos,
        costs: &'a RouteCosts,
        path: Vec<GridPos>,
        best: Option<u32>,
    }

    impl Search<'_> {
        fn walk(&mut self, cost: u32, incoming: Option<Direction>) {
            let Some(&pos) = self.path.last() else {
                return;
            };
            let bound = cost + pos.manhattan(self.goal) * self.costs.existing;
            if self.best.is_some_and(|b| bound >= b) {
                return;
            }
            if pos == self.goal {
                // Cross-check the incremental sum against the public cost function.
                debug_assert_eq!(path_cost(self.occupancy, &self.path, self.costs), cost);
                self.best = Some(cost);
                return;
            }
            for dir in [Direction::North, Direction::East, Direction::South, Direction::West] {
                let next = pos.step(dir);
                let walkable = next == self.goal
                    || (self.occupancy.bounds().contains(next) && !self.occupancy.is_room(next));
                if !walkable || self.path.contains(&next) {
                    continue;
                }
                let mut step = if self.occupancy.is_corridor(next) {
                    self.costs.existing
                } else {
                    self.costs.digging
                };
                if incoming.is_some_and(|d| d != dir) {
                    step += self.costs.turn;
                }
                self.path.push(next);
                self.walk(cost + step, Some(dir));
                self.path.pop();
            }
        }
    }

    let mut search = Search {
        occupancy,
        goal,
        costs,
        path: vec![start],
        best: None,
    };
    search.walk(0, None);
    search.best
}

fn generation_theme() -> Theme {
    let hall = RoomTemplate::new("hall", "Rooms/Hall", 4, 3)
        .with_door(1, 0, Direction::South)
        .with_door(3, 1, Direction::East)
        .with_door(1, 2, Direction::North);
    let cell = RoomTemplate::new("cell", "Rooms/Cell", 2, 2)
        .with_door(0, 1, Direction::West)
        .with_door(1, 0, Direction::South);
    let nook = RoomTemplate::new("nook", "Rooms/Nook", 1, 2).with_door(0, 0, Direction::South);
    Theme::new("props")
        .with_room(hall, 3)
        .with_room(cell, 2)
        .with_room(nook, 1)
        .with_tile(TileKind::Straight, "Corr/Straight", 1)
        .with_blocked_door("Props/Rubble")
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Rotation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rotations_compose((size, local) in local_cell_strategy(), a in rotation_strategy(), b in rotation_strategy()) {
        let once = rotate_position(local, size, a);
        let twice = rotate_position(once, rotated_size(size, a), b);
        let combined = Rotation::new(a.steps() + b.steps());
        prop_assert_eq!(twice, rotate_position(local, size, combined));
        prop_assert_eq!(rotated_size(rotated_size(size, a), b), rotated_size(size, combined));
    }

    #[test]
    fn rotated_cells_stay_in_footprint((size, local) in local_cell_strategy(), r in rotation_strategy()) {
        let (w, d) = rotated_size(size, r);
        let p = rotate_position(local, size, r);
        prop_assert!(p.x >= 0 && p.x < w, "x {} outside 0..{}", p.x, w);
        prop_assert!(p.y >= 0 && p.y < d, "y {} outside 0..{}", p.y, d);
    }

    #[test]
    fn direction_turns_compose(dir in direction_strategy(), a in rotation_strategy(), b in rotation_strategy()) {
        let combined = Rotation::new(a.steps() + b.steps());
        prop_assert_eq!(
            rotate_direction(rotate_direction(dir, a), b),
            rotate_direction(dir, combined)
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3-4. Triangulation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn triangles_are_delaunay(points in distinct_points_strategy()) {
        for t in triangulate(&points) {
            let (a, b, c) = (point(points[t[0]]), point(points[t[1]]), point(points[t[2]]));
            prop_assert!(orient(a, b, c) > 0, "triangle {:?} is not counter-clockwise", t);
            for (i, p) in points.iter().enumerate() {
                if t.contains(&i) {
                    continue;
                }
                prop_assert!(
                    !strictly_in_circle(a, b, c, point(*p)),
                    "point {} inside circumcircle of {:?}",
                    p,
                    t
                );
            }
        }
    }

    #[test]
    fn delaunay_edges_connect_all_points(points in distinct_points_strategy()) {
        let edges = delaunay_edges(&points);
        let mut clusters = RoomClusters::new(points.len());
        for &(i, j) in &edges {
            prop_assert!(i < j && j < points.len());
            clusters.union(RoomId(i), RoomId(j));
        }
        prop_assert_eq!(clusters.cluster_size(RoomId(0)), points.len());
    }

    #[test]
    fn delaunay_edges_cover_real_triangles(points in distinct_points_strategy()) {
        let edges: BTreeSet<(usize, usize)> = delaunay_edges(&points).into_iter().collect();
        for t in triangulate(&points) {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let edge = (a.min(b), a.max(b));
                prop_assert!(edges.contains(&edge), "edge {:?} of {:?} missing", edge, t);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Router optimality
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn astar_matches_exhaustive_search(grid in small_grid_strategy(), costs in route_costs_strategy()) {
        let occupancy = build_occupancy(&grid);
        let found = find_path(&occupancy, grid.start, grid.goal, &costs);
        let expected = brute_force_cost(&occupancy, grid.start, grid.goal, &costs);

        prop_assert_eq!(found.as_ref().map(|p| p.cost), expected);
        if let Some(path) = found {
            prop_assert_eq!(path.cells.first(), Some(&grid.start));
            prop_assert_eq!(path.cells.last(), Some(&grid.goal));
            prop_assert_eq!(path_cost(&occupancy, &path.cells, &costs), path.cost);
            for pair in path.cells.windows(2) {
                prop_assert_eq!(pair[0].manhattan(pair[1]), 1);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6-7. Whole layers
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn generated_layers_hold_invariants(
        seed in any::<u64>(),
        target in 2usize..14,
        size in 20i32..40,
        cap_room_chance in 0.0f64..=1.0,
    ) {
        let config = GeneratorConfig {
            grid_width: size,
            grid_height: size,
            target_room_count: target,
            cap_room_chance,
            seed,
            ..Default::default()
        };
        let theme = generation_theme();
        let layout = generate_layer(&config, &theme, &[], 0, &mut GameRng::new(seed)).unwrap();

        let capped: BTreeSet<(RoomId, RoomId)> = layout
            .cap_links
            .iter()
            .map(|&(s, c)| (layout.doors[s.0].room, layout.doors[c.0].room))
            .collect();
        for (i, a) in layout.rooms.iter().enumerate() {
            for b in &layout.rooms[i + 1..] {
                prop_assert!(!a.footprint().intersects(&b.footprint()));
                if !capped.contains(&(a.id, b.id)) && !capped.contains(&(b.id, a.id)) {
                    prop_assert!(!a.footprint().expanded(1).intersects(&b.footprint()));
                }
            }
        }

        for pos in layout.occupancy.corridor_cells() {
            prop_assert!(layout.bounds.contains(pos));
            prop_assert!(!layout.occupancy.is_room(pos));
        }

        let sealed: BTreeSet<_> = layout.seals.iter().map(|s| (s.position, s.direction)).collect();
        for door in &layout.doors {
            let used = layout.used_doors.contains(&door.id);
            let is_sealed = sealed.contains(&(door.position, door.direction));
            prop_assert!(used != is_sealed, "door {:?} used={} sealed={}", door.id, used, is_sealed);
        }
    }
}
