//! Live-chunk queue and cross-LOD coverage propagation.
//!
//! Each LOD keeps a round-robin queue of chunks that are still of interest.
//! One turn pops the head, evaluates the distance bands, requests geometry,
//! decides visibility, and re-enqueues the chunk if it should stay live.
//!
//! Parents track how many of their four children are *effectively active*
//! (visible, or fully covered by their own children). A parent whose counter
//! reaches 4 inside its LOD gap steps back, so a region is drawn by one tier
//! at a time.

use std::collections::VecDeque;

use super::chunk::CHILD_COUNT;
use super::coords::ChunkCoords;
use super::lod::DistanceBands;
use super::registry::ChunkId;
use super::sink::RenderSink;
use super::stats::StreamingStats;
use super::tier::LodTier;

/// Round-robin queue of live chunks for one LOD
#[derive(Debug, Default)]
pub struct LiveQueue {
    entries: VecDeque<(ChunkCoords, ChunkId)>,
}

impl LiveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, coords: ChunkCoords, id: ChunkId) {
        self.entries.push_back((coords, id));
    }

    pub fn pop(&mut self) -> Option<(ChunkCoords, ChunkId)> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ChunkCoords, ChunkId)> {
        self.entries.iter()
    }
}

/// Direction of a child's coverage report to its parent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coverage {
    /// The child became effectively active
    Gained,
    /// The child stopped being effectively active
    Lost,
}

/// What one live-queue turn decided
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveTurn {
    pub coords: ChunkCoords,
    pub bands: DistanceBands,
    /// A mesh request was issued this turn
    pub requested_mesh: bool,
    /// The chunk was re-enqueued
    pub kept_live: bool,
    /// Visibility after the turn
    pub visible: bool,
}

/// Process the head of `lod`'s live queue for an observer in chunk `observer`
/// (measured on `lod`'s grid).
pub(crate) fn step<M, S>(
    tiers: &mut [LodTier<S::Handle, M>],
    lod: usize,
    observer: ChunkCoords,
    sink: &mut S,
    stats: &mut StreamingStats,
) -> Option<LiveTurn>
where
    S: RenderSink<M>,
{
    let tier = &mut tiers[lod];
    let (coords, id) = tier.live_queue.pop()?;
    let bands = tier.policy.bands(coords, observer);

    let chunk = tier.registry.get(id);
    let has_mesh = chunk.has_mesh();
    let covered_children = chunk.pseudo_active_child_count;

    let requested_mesh = bands.within_render_dist && tier.request_mesh(coords, id);
    if requested_mesh {
        stats.mesh_requests += 1;
    }

    let try_going_active = wants_activation(tiers, lod, coords, bands, covered_children);
    let going_active = try_going_active && has_mesh;

    let tier = &mut tiers[lod];
    if try_going_active {
        tier.live_queue.push(coords, id);
    } else {
        tier.registry.get_mut(id).in_live_queue = false;
        stats.chunks_retired += 1;
        log::trace!("LOD {}: retired chunk {:?}", lod, coords);
    }

    let visible = apply_visibility(tiers, lod, coords, id, going_active, sink, stats);

    Some(LiveTurn {
        coords,
        bands,
        requested_mesh,
        kept_live: try_going_active,
        visible,
    })
}

/// Whether the chunk should be shown (once meshed) and kept live
fn wants_activation<H, M>(
    tiers: &[LodTier<H, M>],
    lod: usize,
    coords: ChunkCoords,
    bands: DistanceBands,
    covered_children: u8,
) -> bool {
    if bands.within_render_dist && !bands.within_lod_gap {
        return true;
    }
    if bands.within_lod_gap {
        // Stand in until the children cover the whole cell
        return covered_children < CHILD_COUNT;
    }

    bands.within_reasonable_dist
        && !tiers[lod].policy.is_coarsest
        && !ancestor_visible(tiers, lod, coords)
}

/// Whether any existing ancestor of `coords` is currently shown
fn ancestor_visible<H, M>(tiers: &[LodTier<H, M>], lod: usize, coords: ChunkCoords) -> bool {
    let mut ancestor = coords;
    for tier in &tiers[lod + 1..] {
        ancestor = ancestor.parent();
        if tier.registry.lookup(ancestor).is_some_and(|chunk| chunk.visible) {
            return true;
        }
    }
    false
}

/// Switch a chunk's visibility, reporting coverage changes to its parent
/// first. Returns the visibility actually applied.
pub(crate) fn apply_visibility<M, S>(
    tiers: &mut [LodTier<S::Handle, M>],
    lod: usize,
    coords: ChunkCoords,
    id: ChunkId,
    mut going_active: bool,
    sink: &mut S,
    stats: &mut StreamingStats,
) -> bool
where
    S: RenderSink<M>,
{
    let chunk = tiers[lod].registry.get(id);
    if going_active && !chunk.has_mesh() {
        stats.violation(format_args!(
            "LOD {}: refusing to show chunk {:?} before it has a mesh",
            lod, coords
        ));
        going_active = false;
    }

    let was_active = chunk.visible;
    let was_pseudo = chunk.is_pseudo_active();

    // A fully covered chunk already counts as active for its parent
    if going_active && !(was_active || was_pseudo) {
        update_super_chunk(tiers, lod, coords, Coverage::Gained, sink, stats);
    } else if !was_pseudo && !going_active && was_active {
        update_super_chunk(tiers, lod, coords, Coverage::Lost, sink, stats);
    }

    let chunk = tiers[lod].registry.get_mut(id);
    if chunk.visible != going_active {
        chunk.visible = going_active;
        sink.set_visible(&chunk.render_handle, going_active);
        if going_active {
            stats.activations += 1;
        } else {
            stats.deactivations += 1;
        }
        log::trace!("LOD {}: chunk {:?} visible={}", lod, coords, going_active);
    }
    going_active
}

/// Report a child's coverage change to its parent at `lod + 1`, creating the
/// parent if needed.
///
/// A hidden parent whose counter crosses between 3 and 4 changes its own
/// coverage, so the report is forwarded to the grandparent before the counter
/// moves.
pub(crate) fn update_super_chunk<M, S>(
    tiers: &mut [LodTier<S::Handle, M>],
    lod: usize,
    coords: ChunkCoords,
    change: Coverage,
    sink: &mut S,
    stats: &mut StreamingStats,
) where
    S: RenderSink<M>,
{
    let parent_lod = lod + 1;
    if parent_lod >= tiers.len() {
        return;
    }

    let parent_coords = coords.parent();
    let (parent_id, _) = tiers[parent_lod]
        .registry
        .get_or_create(parent_coords, || sink.create_visual_object());

    let parent = tiers[parent_lod].registry.get(parent_id);
    let count = parent.pseudo_active_child_count;
    let parent_visible = parent.visible;

    match change {
        Coverage::Gained => {
            if count == CHILD_COUNT - 1 && !parent_visible {
                update_super_chunk(tiers, parent_lod, parent_coords, Coverage::Gained, sink, stats);
            }
            if !tiers[parent_lod].registry.get_mut(parent_id).add_covering_child() {
                stats.violation(format_args!(
                    "LOD {}: chunk {:?} already has {} covering children",
                    parent_lod, parent_coords, CHILD_COUNT
                ));
            }
        }
        Coverage::Lost => {
            if count == CHILD_COUNT && !parent_visible {
                update_super_chunk(tiers, parent_lod, parent_coords, Coverage::Lost, sink, stats);
            }
            if !tiers[parent_lod].registry.get_mut(parent_id).remove_covering_child() {
                stats.violation(format_args!(
                    "LOD {}: chunk {:?} lost a covering child it never had",
                    parent_lod, parent_coords
                ));
            }
        }
    }
}
