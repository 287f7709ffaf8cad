//! Themes: the room and tile assets a run draws from
//!
//! A theme owns the mandatory templates, the weighted random room pool, one
//! weighted prefab pool per corridor tile kind and the optional prop used to
//! block unused doors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::autotile::TileKind;
use crate::error::ConfigError;
use crate::rng::GameRng;
use crate::room::RoomTemplate;

/// Prefab key with a relative draw weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedPrefab {
    pub prefab: String,
    pub weight: u32,
}

impl WeightedPrefab {
    pub fn new(prefab: impl Into<String>, weight: u32) -> Self {
        Self {
            prefab: prefab.into(),
            weight,
        }
    }
}

/// Room template with a relative draw weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTemplate {
    pub template: Arc<RoomTemplate>,
    pub weight: u32,
}

/// Corridor prefab pools, one per tile kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TilePools {
    pub straight: Vec<WeightedPrefab>,
    pub corner: Vec<WeightedPrefab>,
    pub t_junction: Vec<WeightedPrefab>,
    pub cross: Vec<WeightedPrefab>,
    pub dead_end: Vec<WeightedPrefab>,
    pub floor_only: Vec<WeightedPrefab>,
}

impl TilePools {
    pub fn pool(&self, kind: TileKind) -> &[WeightedPrefab] {
        match kind {
            TileKind::Straight => &self.straight,
            TileKind::Corner => &self.corner,
            TileKind::TJunction => &self.t_junction,
            TileKind::Cross => &self.cross,
            TileKind::DeadEnd => &self.dead_end,
            TileKind::FloorOnly => &self.floor_only,
        }
    }

    pub fn pool_mut(&mut self, kind: TileKind) -> &mut Vec<WeightedPrefab> {
        match kind {
            TileKind::Straight => &mut self.straight,
            TileKind::Corner => &mut self.corner,
            TileKind::TJunction => &mut self.t_junction,
            TileKind::Cross => &mut self.cross,
            TileKind::DeadEnd => &mut self.dead_end,
            TileKind::FloorOnly => &mut self.floor_only,
        }
    }

    /// Weighted draw from the pool of `kind`
    ///
    /// An empty dead-end pool falls back to the straight pool. Returns `None`
    /// when there is nothing to draw from.
    pub fn pick(&self, kind: TileKind, rng: &mut GameRng) -> Option<&str> {
        let pool = match kind {
            TileKind::DeadEnd if total_weight(&self.dead_end) == 0 => self.straight.as_slice(),
            _ => self.pool(kind),
        };
        rng.choose_weighted(pool, |p| p.weight)
            .map(|p| p.prefab.as_str())
    }
}

fn total_weight(pool: &[WeightedPrefab]) -> u64 {
    pool.iter().map(|p| u64::from(p.weight)).sum()
}

/// Everything a run may instantiate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    /// Placed once each per run, before the random pool
    pub mandatory: Vec<Arc<RoomTemplate>>,
    pub rooms: Vec<WeightedTemplate>,
    pub tiles: TilePools,
    /// Prop placed in front of a door nothing connects to
    pub blocked_door: Option<String>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_room(mut self, template: RoomTemplate, weight: u32) -> Self {
        self.rooms.push(WeightedTemplate {
            template: Arc::new(template),
            weight,
        });
        self
    }

    pub fn with_mandatory(mut self, template: RoomTemplate) -> Self {
        self.mandatory.push(Arc::new(template));
        self
    }

    pub fn with_tile(mut self, kind: TileKind, prefab: impl Into<String>, weight: u32) -> Self {
        self.tiles.pool_mut(kind).push(WeightedPrefab::new(prefab, weight));
        self
    }

    pub fn with_blocked_door(mut self, prefab: impl Into<String>) -> Self {
        self.blocked_door = Some(prefab.into());
        self
    }

    /// Validate every template the theme references
    pub fn validate(&self) -> Result<(), ConfigError> {
        for template in self.mandatory.iter().chain(self.rooms.iter().map(|w| &w.template)) {
            template.validate()?;
        }
        Ok(())
    }

    /// A positive random budget needs something to draw
    pub fn check_room_budget(&self, budget: usize) -> Result<(), ConfigError> {
        let drawable = self.rooms.iter().any(|w| w.weight > 0);
        if budget > 0 && !drawable {
            return Err(ConfigError::EmptyRoomPool {
                theme: self.name.clone(),
                budget,
            });
        }
        Ok(())
    }

    /// Weighted draw from the random room pool
    pub fn pick_room(&self, rng: &mut GameRng) -> Option<Arc<RoomTemplate>> {
        rng.choose_weighted(&self.rooms, |w| w.weight)
            .map(|w| Arc::clone(&w.template))
    }

    /// Pool templates that can terminate a single socket
    pub fn cap_templates(&self) -> Vec<Arc<RoomTemplate>> {
        self.rooms
            .iter()
            .filter(|w| w.template.is_cap_candidate())
            .map(|w| Arc::clone(&w.template))
            .collect()
    }
}
