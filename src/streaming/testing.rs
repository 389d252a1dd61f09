//! Test doubles shared by the streaming unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec3;

use crate::core::{Error, Result};
use crate::mesh::{MeshRequest, MeshSynthesizer};
use crate::streaming::coords::ChunkCoords;
use crate::streaming::sink::RenderSink;
use crate::terrain::HeightField;

/// Render sink that records every call
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    next_handle: u32,
    pub(crate) visible: HashMap<u32, bool>,
    pub(crate) attached: HashMap<u32, usize>,
    pub(crate) visibility_calls: usize,
}

impl RecordingSink {
    pub(crate) fn created(&self) -> u32 {
        self.next_handle
    }

    pub(crate) fn is_visible(&self, handle: u32) -> bool {
        self.visible.get(&handle).copied().unwrap_or(false)
    }
}

impl<M> RenderSink<M> for RecordingSink {
    type Handle = u32;

    fn create_visual_object(&mut self) -> u32 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.visible.insert(handle, false);
        handle
    }

    fn attach_mesh(&mut self, handle: &u32, _mesh: &M) {
        *self.attached.entry(*handle).or_default() += 1;
    }

    fn set_visible(&mut self, handle: &u32, visible: bool) {
        self.visibility_calls += 1;
        self.visible.insert(*handle, visible);
    }
}

/// Flat terrain at a fixed height
pub(crate) struct FlatField(pub(crate) f32);

impl HeightField for FlatField {
    fn height_at(&self, _x: f32, _z: f32) -> f32 {
        self.0
    }

    fn color_at(&self, _x: f32, _z: f32, _height: f32, _slope: f32) -> Vec3 {
        Vec3::ONE
    }
}

/// Cheap mesh standing in for real geometry
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StubMesh {
    pub(crate) request: MeshRequest,
    pub(crate) serial: u64,
}

/// Synthesizer that records requests and can be told to fail
#[derive(Default)]
pub(crate) struct StubSynthesizer {
    calls: AtomicU64,
    failing: Mutex<HashSet<(usize, ChunkCoords)>>,
}

impl StubSynthesizer {
    pub(crate) fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_for(&self, lod: usize, coords: ChunkCoords) {
        self.failing.lock().unwrap().insert((lod, coords));
    }

    pub(crate) fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }
}

impl MeshSynthesizer for StubSynthesizer {
    type Mesh = StubMesh;

    fn synthesize(&self, _field: &dyn HeightField, request: &MeshRequest) -> Result<StubMesh> {
        let serial = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&(request.lod, request.coords)) {
            return Err(Error::Collaborator(format!("refusing {:?}", request.coords)));
        }
        Ok(StubMesh { request: *request, serial })
    }
}
