//! The engine-facing side of generation
//!
//! The generator only ever asks a scene to instantiate a prefab at a
//! transform and, on the next run, to destroy what it created. Anything that
//! can do that (a game engine, a file writer, a test double) implements
//! [`Scene`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// World-space position; `y` is up
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    /// Rotation about the up axis, clockwise seen from above
    pub yaw_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnKind {
    Room,
    Corridor,
    Seal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub prefab: String,
    pub transform: Transform,
    pub kind: SpawnKind,
}

/// Opaque token for one spawned object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnHandle(pub u64);

/// Something that can instantiate and destroy prefabs
pub trait Scene {
    fn spawn(&mut self, request: &SpawnRequest) -> SpawnHandle;
    fn destroy(&mut self, handle: SpawnHandle);
}

/// In-memory scene that records every live spawn in creation order
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    next_handle: u64,
    live: BTreeMap<SpawnHandle, SpawnRequest>,
    destroyed: usize,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> impl Iterator<Item = &SpawnRequest> {
        self.live.values()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn count(&self, kind: SpawnKind) -> usize {
        self.live.values().filter(|r| r.kind == kind).count()
    }

    /// Total number of destroy calls honoured so far
    pub fn destroyed(&self) -> usize {
        self.destroyed
    }
}

impl Scene for RecordingScene {
    fn spawn(&mut self, request: &SpawnRequest) -> SpawnHandle {
        let handle = SpawnHandle(self.next_handle);
        self.next_handle += 1;
        self.live.insert(handle, request.clone());
        handle
    }

    fn destroy(&mut self, handle: SpawnHandle) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}
