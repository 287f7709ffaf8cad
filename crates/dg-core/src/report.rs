//! Per-layer generation summary
//!
//! Partial results are normal: a run that could not place a template or route
//! a corridor still produces a layout, and the shortfall is listed here.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::GridPos;
use crate::room::DoorId;

/// Something the run could not do, recorded instead of failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationWarning {
    /// A mandatory template found no valid position within the attempt limit
    MandatoryPlacementFailed { template: String, attempts: u32 },
    /// A* found no path between two accepted doors
    RouteFailed { from: DoorId, to: DoorId },
    /// A door's entry tile lies outside the grid, so the edge was skipped
    EntryOutOfBounds { door: DoorId, entry: GridPos },
    /// A fixed room was registered on top of an occupied cell
    FixedRoomOverlap { template: String, cells: usize },
}

impl fmt::Display for GenerationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerationWarning::MandatoryPlacementFailed { template, attempts } => {
                write!(f, "mandatory room '{template}' not placed after {attempts} attempts")
            }
            GenerationWarning::RouteFailed { from, to } => {
                write!(f, "no corridor route between door {} and door {}", from.0, to.0)
            }
            GenerationWarning::EntryOutOfBounds { door, entry } => {
                write!(f, "door {} opens onto {entry}, outside the grid", door.0)
            }
            GenerationWarning::FixedRoomOverlap { template, cells } => {
                write!(f, "fixed room '{template}' overlaps {cells} occupied cells")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub layer: i32,
    pub seed: u64,
    pub rooms_requested: usize,
    /// Real rooms on this layer, cap rooms included
    pub rooms_placed: usize,
    pub ghost_rooms: usize,
    pub cap_rooms: usize,
    pub door_nodes: usize,
    /// Edges out of the triangulation
    pub candidate_edges: usize,
    /// Edges left after the self-room and line-of-sight filter
    pub filtered_edges: usize,
    pub spanning_edges: usize,
    pub loop_edges: usize,
    pub routed_edges: usize,
    pub failed_routes: usize,
    pub corridor_cells: usize,
    pub sealed_doors: usize,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationReport {
    pub fn new(layer: i32, seed: u64) -> Self {
        Self {
            layer,
            seed,
            ..Default::default()
        }
    }

    /// Edges kept by the reducer
    pub fn final_edges(&self) -> usize {
        self.spanning_edges + self.loop_edges
    }

    /// False when a mandatory template could not be placed
    pub fn is_complete(&self) -> bool {
        !self
            .warnings
            .iter()
            .any(|w| matches!(w, GenerationWarning::MandatoryPlacementFailed { .. }))
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "layer {} (seed {})", self.layer, self.seed)?;
        writeln!(
            f,
            "  rooms: {} placed of {} requested, {} ghost, {} cap",
            self.rooms_placed, self.rooms_requested, self.ghost_rooms, self.cap_rooms
        )?;
        writeln!(
            f,
            "  edges: {} candidate, {} filtered, {} spanning, {} loop",
            self.candidate_edges, self.filtered_edges, self.spanning_edges, self.loop_edges
        )?;
        writeln!(
            f,
            "  corridors: {} routed, {} failed, {} cells; {} doors sealed",
            self.routed_edges, self.failed_routes, self.corridor_cells, self.sealed_doors
        )?;
        for warning in &self.warnings {
            writeln!(f, "  warning: {warning}")?;
        }
        Ok(())
    }
}
