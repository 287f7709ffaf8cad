//! Connectivity reduction
//!
//! Candidate edges are first filtered (no edge inside one room, no edge whose
//! line of sight crosses a third real room), then reduced Kruskal-style over
//! rooms: every edge joining two separate room clusters is kept, and edges
//! inside a cluster survive with probability `loop_chance`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{GridPos, Occupancy};
use crate::placement::RoomSet;
use crate::rng::GameRng;
use crate::room::{DoorEdge, DoorNode, RoomId};

/// Disjoint sets of rooms joined by accepted edges
#[derive(Debug, Clone)]
pub struct RoomClusters {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl RoomClusters {
    /// Every room starts in its own cluster
    pub fn new(num_rooms: usize) -> Self {
        Self {
            parent: (0..num_rooms).collect(),
            size: vec![1; num_rooms],
        }
    }

    /// Representative of the room's cluster
    pub fn find(&mut self, room: RoomId) -> usize {
        let mut root = room.0;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Path compression
        let mut current = room.0;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    pub fn are_connected(&mut self, a: RoomId, b: RoomId) -> bool {
        self.find(a) == self.find(b)
    }

    /// Merge two clusters; returns false when they were already one
    pub fn union(&mut self, a: RoomId, b: RoomId) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }

    /// Number of rooms sharing this room's cluster
    pub fn cluster_size(&mut self, room: RoomId) -> usize {
        let root = self.find(room);
        self.size[root]
    }
}

/// Cells on the Bresenham line from `start` to `end`, both included
pub fn line_cells(start: GridPos, end: GridPos) -> Vec<GridPos> {
    let (mut x0, mut y0) = (start.x, start.y);
    let (x1, y1) = (end.x, end.y);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cells = Vec::new();
    loop {
        cells.push(GridPos::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    cells
}

/// True unless the line between the two entry tiles crosses a third real room
///
/// Ghost rooms never block line of sight.
pub fn is_line_clear(a: &DoorNode, b: &DoorNode, rooms: &RoomSet) -> bool {
    let occupancy: &Occupancy = &rooms.occupancy;
    line_cells(a.entry_tile(), b.entry_tile()).into_iter().all(|pos| {
        match occupancy.room_at(pos) {
            Some(hit) if hit != a.room && hit != b.room => {
                rooms.room(hit).is_some_and(|room| room.ghost)
            }
            _ => true,
        }
    })
}

/// Drop self-room and occluded edges; order is preserved
pub fn filter_edges(candidates: &[DoorEdge], nodes: &[DoorNode], rooms: &RoomSet) -> Vec<DoorEdge> {
    candidates
        .iter()
        .filter(|edge| {
            let (a, b) = (&nodes[edge.a.0], &nodes[edge.b.0]);
            a.room != b.room && is_line_clear(a, b, rooms)
        })
        .copied()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Joined two clusters
    Spanning,
    /// Closed a loop inside one cluster
    Loop,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectedEdge {
    pub edge: DoorEdge,
    pub kind: EdgeKind,
}

/// Minimum spanning forest over rooms plus random loop edges
pub fn select_edges(
    filtered: &[DoorEdge],
    nodes: &[DoorNode],
    num_rooms: usize,
    loop_chance: f64,
    rng: &mut GameRng,
) -> Vec<SelectedEdge> {
    let mut sorted = filtered.to_vec();
    sorted.sort_by(|x, y| x.distance.total_cmp(&y.distance));

    let mut clusters = RoomClusters::new(num_rooms);
    let mut selected = Vec::new();
    for edge in sorted {
        let (ra, rb) = (nodes[edge.a.0].room, nodes[edge.b.0].room);
        if clusters.union(ra, rb) {
            selected.push(SelectedEdge { edge, kind: EdgeKind::Spanning });
        } else if rng.chance(loop_chance) {
            selected.push(SelectedEdge { edge, kind: EdgeKind::Loop });
        }
    }

    debug!(
        candidates = filtered.len(),
        spanning = selected.iter().filter(|s| s.kind == EdgeKind::Spanning).count(),
        loops = selected.iter().filter(|s| s.kind == EdgeKind::Loop).count(),
        "edge selection finished"
    );
    selected
}
