//! Bowyer–Watson Delaunay triangulation of door positions
//!
//! Door positions are integer cells, so both geometric predicates are
//! evaluated exactly in `i128`. The in-circle test is strict: a point lying
//! exactly on a circumcircle does not break that triangle. With exact
//! arithmetic this keeps every cavity star-shaped around the inserted point.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;

use crate::grid::GridPos;
use crate::room::{DoorEdge, DoorNode};

type Point = (i128, i128);

/// Twice the signed area of `abc`; positive when counter-clockwise
fn orient(a: Point, b: Point, c: Point) -> i128 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Positive when `d` is strictly inside the circumcircle of the CCW triangle `abc`
fn in_circle(a: Point, b: Point, c: Point, d: Point) -> i128 {
    let (adx, ady) = (a.0 - d.0, a.1 - d.1);
    let (bdx, bdy) = (b.0 - d.0, b.1 - d.1);
    let (cdx, cdy) = (c.0 - d.0, c.1 - d.1);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    ad * (bdx * cdy - cdx * bdy) + bd * (cdx * ady - adx * cdy) + cd * (adx * bdy - bdx * ady)
}

fn to_point(pos: GridPos) -> Point {
    (i128::from(pos.x), i128::from(pos.y))
}

/// Every triangle of the run, super vertices included (indices `n..n+3`)
fn bowyer_watson(points: &[GridPos]) -> Vec<[usize; 3]> {
    let n = points.len();
    let mut verts: Vec<Point> = points.iter().map(|p| to_point(*p)).collect();

    let min_x = verts.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = verts.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = verts.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = verts.iter().map(|p| p.1).max().unwrap_or(0);
    let span = (max_x - min_x).max(max_y - min_y) + 1;
    let (cx, cy) = ((min_x + max_x) / 2, (min_y + max_y) / 2);
    verts.push((cx - 20 * span, cy - 10 * span));
    verts.push((cx + 20 * span, cy - 10 * span));
    verts.push((cx, cy + 20 * span));

    let mut triangles: Vec<[usize; 3]> = vec![[n, n + 1, n + 2]];

    for i in 0..n {
        let p = verts[i];
        let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) = triangles
            .into_iter()
            .partition(|t| in_circle(verts[t[0]], verts[t[1]], verts[t[2]], p) > 0);

        let mut edge_count: HashMap<(usize, usize), u32> = HashMap::new();
        for t in &bad {
            for (a, b) in tri_edges(t) {
                *edge_count.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }

        triangles = good;
        for t in &bad {
            for (a, b) in tri_edges(t) {
                if edge_count.get(&(a.min(b), a.max(b))) == Some(&1) {
                    // `ab` runs counter-clockwise around the cavity, so `abp` does too.
                    debug_assert!(orient(verts[a], verts[b], p) > 0);
                    triangles.push([a, b, i]);
                }
            }
        }
    }
    triangles
}

fn tri_edges(t: &[usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

/// Delaunay triangles over distinct points, counter-clockwise, as indices into `points`
///
/// Triangles touching the enclosing super-triangle are dropped. Points
/// repeated at the same position must be removed by the caller.
pub fn triangulate(points: &[GridPos]) -> Vec<[usize; 3]> {
    let n = points.len();
    bowyer_watson(points)
        .into_iter()
        .filter(|t| t.iter().all(|&v| v < n))
        .collect()
}

/// Deduplicated Delaunay edges `(i, j)` with `i < j` over distinct points
///
/// Fewer than three points are chained in order. Otherwise every edge joining
/// two real points in the final triangulation is returned, including those
/// of triangles that also touch a super vertex: their circumcircle is empty,
/// so they belong to the triangulation of the real points (hull edges, and
/// the only edges a collinear set has).
pub fn delaunay_edges(points: &[GridPos]) -> Vec<(usize, usize)> {
    let n = points.len();
    if n < 3 {
        return (1..n).map(|i| (i - 1, i)).collect();
    }
    let mut edges = BTreeSet::new();
    for t in bowyer_watson(points) {
        for (a, b) in tri_edges(&t) {
            if a < n && b < n {
                edges.insert((a.min(b), a.max(b)));
            }
        }
    }
    edges.into_iter().collect()
}

/// Candidate edges between door nodes
///
/// Doors sharing a cell are triangulated once; each position edge expands to
/// every door pair of the two cells, and doors sharing a cell are linked to
/// each other. Edge order is deterministic for a given node order.
pub fn door_edges(nodes: &[DoorNode]) -> Vec<DoorEdge> {
    if nodes.len() < 3 {
        return nodes
            .windows(2)
            .map(|pair| DoorEdge::between(&pair[0], &pair[1]))
            .collect();
    }

    let mut positions: Vec<GridPos> = Vec::new();
    let mut groups: BTreeMap<GridPos, Vec<usize>> = BTreeMap::new();
    for (i, node) in nodes.iter().enumerate() {
        let group = groups.entry(node.position).or_default();
        if group.is_empty() {
            positions.push(node.position);
        }
        group.push(i);
    }

    let mut edges = Vec::new();
    for pos in &positions {
        let group = &groups[pos];
        for (k, &a) in group.iter().enumerate() {
            for &b in &group[k + 1..] {
                edges.push(DoorEdge::between(&nodes[a], &nodes[b]));
            }
        }
    }
    for (i, j) in delaunay_edges(&positions) {
        for &a in &groups[&positions[i]] {
            for &b in &groups[&positions[j]] {
                edges.push(DoorEdge::between(&nodes[a], &nodes[b]));
            }
        }
    }
    edges
}
