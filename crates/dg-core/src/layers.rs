//! Vertical layer stack
//!
//! Layer 0 is generated first. Rooms on it that reach into the layer above or
//! below are projected there as ghost fixed rooms, so a shaft keeps the same
//! footprint on every layer it crosses. Neighbouring layers get their own
//! seeds derived from the base seed.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GeneratorConfig;
use crate::error::GenerationError;
use crate::generator::{LayerLayout, generate_layer};
use crate::placement::FixedRoom;
use crate::rng::GameRng;
use crate::scene::{Scene, SpawnHandle};
use crate::theme::Theme;

/// Seed of a layer derived from the base seed
pub fn layer_seed(base_seed: u64, layer: i32) -> u64 {
    if layer >= 0 {
        base_seed.wrapping_add(layer.unsigned_abs().into())
    } else {
        base_seed.wrapping_sub(layer.unsigned_abs().into())
    }
}

/// Ghost projections of layer-0 rooms onto `target_layer`
pub fn ghosts_for(base: &LayerLayout, target_layer: i32) -> Vec<FixedRoom> {
    base.rooms
        .iter()
        .filter(|room| !room.ghost)
        .filter(|room| match target_layer - base.layer {
            1 => room.template.occupies_layer_above,
            -1 => room.template.occupies_layer_below,
            _ => false,
        })
        .map(FixedRoom::ghost_of)
        .collect()
}

/// The generated layers, base layer first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonStack {
    pub base_seed: u64,
    pub layers: Vec<LayerLayout>,
}

impl DungeonStack {
    pub fn layer(&self, index: i32) -> Option<&LayerLayout> {
        self.layers.iter().find(|l| l.layer == index)
    }

    /// World elevation of a layer
    pub fn elevation(index: i32, layer_height_gap: f32) -> f32 {
        index as f32 * layer_height_gap
    }
}

/// Theme of each layer; a neighbour without a theme is not generated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackThemes {
    pub base: Theme,
    pub above: Option<Theme>,
    pub below: Option<Theme>,
}

impl StackThemes {
    pub fn base_only(theme: Theme) -> Self {
        Self {
            base: theme,
            above: None,
            below: None,
        }
    }

    /// The same theme on layer 0 and both neighbours
    pub fn uniform(theme: Theme) -> Self {
        Self {
            above: Some(theme.clone()),
            below: Some(theme.clone()),
            base: theme,
        }
    }
}

/// Generate layer 0 and the neighbours that have a theme
pub fn generate_stack(config: &GeneratorConfig, themes: &StackThemes) -> Result<DungeonStack, GenerationError> {
    let base_seed = config.make_rng().seed();
    let base = generate_layer(config, &themes.base, &[], 0, &mut GameRng::new(base_seed))?;

    let mut neighbours = Vec::new();
    for (theme, index) in [(&themes.above, 1), (&themes.below, -1)] {
        let Some(theme) = theme else {
            continue;
        };
        let ghosts = ghosts_for(&base, index);
        let mut rng = GameRng::new(layer_seed(base_seed, index));
        neighbours.push(generate_layer(config, theme, &ghosts, index, &mut rng)?);
    }

    let mut layers = vec![base];
    layers.extend(neighbours);
    info!(base_seed, layers = layers.len(), "layer stack generated");
    Ok(DungeonStack { base_seed, layers })
}

/// Multi-layer generator with manual generate and clear entry points
#[derive(Debug, Clone)]
pub struct MultiLayerDungeon {
    config: GeneratorConfig,
    themes: StackThemes,
    spawned: Vec<SpawnHandle>,
}

impl MultiLayerDungeon {
    pub fn new(config: GeneratorConfig, themes: StackThemes) -> Self {
        Self {
            config,
            themes,
            spawned: Vec::new(),
        }
    }

    pub fn spawned(&self) -> &[SpawnHandle] {
        &self.spawned
    }

    /// Tear down the previous run, then generate and spawn every layer
    ///
    /// On error the scene is left untouched.
    pub fn generate<S: Scene + ?Sized>(&mut self, scene: &mut S) -> Result<DungeonStack, GenerationError> {
        let stack = generate_stack(&self.config, &self.themes)?;
        self.clear(scene);
        for layout in &stack.layers {
            let elevation = DungeonStack::elevation(layout.layer, self.config.layer_height_gap);
            self.spawned
                .extend(layout.spawn_into(scene, self.config.unit_size, elevation));
        }
        Ok(stack)
    }

    pub fn clear<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for handle in self.spawned.drain(..) {
            scene.destroy(handle);
        }
    }
}
