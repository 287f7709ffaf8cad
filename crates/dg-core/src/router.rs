//! Weighted A* corridor router
//!
//! Searches the 4-connected grid from one entry tile to another. Entering a
//! carved corridor cell is cheap, digging a fresh cell is not, and every
//! change of direction pays a turn penalty. The search state is the cell
//! together with the direction it was entered from, which keeps the result
//! optimal even though the turn penalty depends on the previous step.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::config::GeneratorConfig;
use crate::grid::{Direction, GridPos, Occupancy};

/// Step costs of the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteCosts {
    pub digging: u32,
    pub existing: u32,
    pub turn: u32,
}

impl RouteCosts {
    /// Cost of stepping into `pos`
    fn enter(&self, occupancy: &Occupancy, pos: GridPos) -> u32 {
        if occupancy.is_corridor(pos) {
            self.existing
        } else {
            self.digging
        }
    }

    fn heuristic(&self, from: GridPos, to: GridPos) -> u32 {
        from.manhattan(to).saturating_mul(self.digging.min(self.existing))
    }
}

impl From<&GeneratorConfig> for RouteCosts {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            digging: config.digging_cost,
            existing: config.existing_path_cost,
            turn: config.turn_cost,
        }
    }
}

/// A routed corridor, endpoints included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorPath {
    pub cells: Vec<GridPos>,
    pub cost: u32,
}

type State = (GridPos, Option<Direction>);

#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenEntry {
    f: u32,
    g: u32,
    state: State,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.g.cmp(&self.g))
            .then_with(|| other.state.cmp(&self.state))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cost of walking `cells` in order under `costs`
///
/// The first cell is free; the first move never pays a turn. Costs saturate
/// at `u32::MAX`.
pub fn path_cost(occupancy: &Occupancy, cells: &[GridPos], costs: &RouteCosts) -> u32 {
    let mut cost: u32 = 0;
    let mut previous: Option<Direction> = None;
    for pair in cells.windows(2) {
        let dir = Direction::from_offset(pair[1] - pair[0]);
        cost = cost.saturating_add(costs.enter(occupancy, pair[1]));
        if previous.is_some() && previous != dir {
            cost = cost.saturating_add(costs.turn);
        }
        previous = dir;
    }
    cost
}

/// Cheapest path from `start` to `goal`, or `None` when the goal is unreachable
///
/// Room cells and cells outside the grid are impassable, except that `start`
/// and `goal` themselves are always walkable.
pub fn find_path(
    occupancy: &Occupancy,
    start: GridPos,
    goal: GridPos,
    costs: &RouteCosts,
) -> Option<CorridorPath> {
    let bounds = occupancy.bounds();
    let walkable = |pos: GridPos| pos == goal || (bounds.contains(pos) && !occupancy.is_room(pos));

    let mut open = BinaryHeap::new();
    let mut best: HashMap<State, u32> = HashMap::new();
    let mut came_from: HashMap<State, State> = HashMap::new();
    let mut closed: HashSet<State> = HashSet::new();

    let origin: State = (start, None);
    best.insert(origin, 0);
    open.push(OpenEntry {
        f: costs.heuristic(start, goal),
        g: 0,
        state: origin,
    });

    while let Some(OpenEntry { g, state, .. }) = open.pop() {
        if !closed.insert(state) {
            continue;
        }
        let (pos, incoming) = state;
        if pos == goal {
            return Some(CorridorPath {
                cells: reconstruct(&came_from, state),
                cost: g,
            });
        }

        for dir in Direction::iter() {
            let next = pos.step(dir);
            if !walkable(next) {
                continue;
            }
            let mut step = costs.enter(occupancy, next);
            if incoming.is_some_and(|d| d != dir) {
                step = step.saturating_add(costs.turn);
            }
            let next_state = (next, Some(dir));
            let next_g = g.saturating_add(step);
            if best.get(&next_state).is_some_and(|&known| known <= next_g) {
                continue;
            }
            best.insert(next_state, next_g);
            came_from.insert(next_state, state);
            open.push(OpenEntry {
                f: next_g.saturating_add(costs.heuristic(next, goal)),
                g: next_g,
                state: next_state,
            });
        }
    }

    None
}

fn reconstruct(came_from: &HashMap<State, State>, end: State) -> Vec<GridPos> {
    let mut cells = vec![end.0];
    let mut current = end;
    while let Some(&prev) = came_from.get(&current) {
        cells.push(prev.0);
        current = prev;
    }
    cells.reverse();
    cells
}

/// Carve every non-room cell of the path; returns how many cells were new
pub fn carve_path(occupancy: &mut Occupancy, path: &CorridorPath) -> usize {
    path.cells
        .iter()
        .filter(|&&pos| !occupancy.is_corridor(pos) && occupancy.carve(pos))
        .count()
}
