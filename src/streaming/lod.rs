//! Level of Detail (LOD) tiers and the distance bands that decide which tier
//! owns a chunk.
//!
//! LOD 0 is the finest tier. Each level doubles the triangle size and, for a
//! fixed mesh subdivision count, the chunk world size. A chunk's visibility is
//! driven by three Chebyshev-distance bands measured on its own LOD grid:
//!
//! - render band: the tier generates geometry for the chunk
//! - LOD gap: the inner band where the tier yields to its finer children
//! - reasonable band: a wider radius where a finer chunk may stand in for a
//!   coarser ancestor that has not been generated yet

use serde::{Deserialize, Serialize};

use super::coords::ChunkCoords;

/// Default number of LOD tiers
pub const DEFAULT_LOD_COUNT: usize = 13;

/// Upper bound on LOD tiers (keeps per-LOD shifts inside 64-bit integers)
pub const MAX_LOD_COUNT: usize = 32;

/// Default number of triangle cells along one chunk edge
pub const DEFAULT_MESH_SIZE: u32 = 32;

/// Width of one triangle cell at LOD 0 (world units)
pub const DEFAULT_LOD0_TRIANGLE_SIZE: f32 = 0.06125;

/// Default render radius in chunks, measured on each LOD's own grid
pub const DEFAULT_RENDER_RADIUS: u32 = 7;

/// Default divisor turning the render radius into the LOD gap radius
pub const DEFAULT_LOD_GAP_DIVISOR: u32 = 2;

/// Calculate triangle size at a given LOD level
///
/// Each LOD level doubles the triangle size from the base.
///
/// # Examples
/// ```
/// use lodscape::streaming::lod::triangle_size_at_lod;
///
/// assert_eq!(triangle_size_at_lod(0.25, 0), 0.25);
/// assert_eq!(triangle_size_at_lod(0.25, 1), 0.5);
/// assert_eq!(triangle_size_at_lod(0.25, 3), 2.0);
/// ```
pub fn triangle_size_at_lod(base_triangle_size: f32, lod: usize) -> f32 {
    base_triangle_size * (1u64 << lod) as f32
}

/// Calculate chunk world size at a given LOD level
///
/// # Examples
/// ```
/// use lodscape::streaming::lod::chunk_size_at_lod;
///
/// assert_eq!(chunk_size_at_lod(0.25, 4, 0), 1.0);
/// assert_eq!(chunk_size_at_lod(0.25, 4, 2), 4.0);
/// ```
pub fn chunk_size_at_lod(base_triangle_size: f32, mesh_size: u32, lod: usize) -> f32 {
    triangle_size_at_lod(base_triangle_size, lod) * mesh_size as f32
}

/// Radius (in chunks of `lod`) inside which a chunk may stand in for an
/// ancestor that is not visible yet.
///
/// Scales with the number of tiers above `lod`, so fine tiers keep their
/// placeholders for a long way while the coarse tiers catch up.
pub fn reasonable_radius(render_radius: u32, lod: usize, lod_count: usize) -> i64 {
    let levels_above = lod_count.saturating_sub(lod + 1) as u32;
    (render_radius as i64).saturating_mul(1i64 << levels_above.min(62))
}

/// Smallest LOD gap radius at `lod + 1` that still contains every parent
/// whose four children can all be in range at `lod`.
///
/// Sibling pairs start on even coordinates, so with the observer anywhere in
/// its parent cell a fully in-range parent sits at most `render_radius / 2`
/// parent cells away. This holds for both metrics: parent-aligned rounding
/// gives all four siblings one verdict at the same parent distance. A smaller
/// gap leaves a ring of parents drawn on top of all their children.
///
/// # Examples
/// ```
/// use lodscape::streaming::lod::min_gap_radius;
///
/// assert_eq!(min_gap_radius(7), 3);
/// assert_eq!(min_gap_radius(4), 2);
/// assert_eq!(min_gap_radius(1), 0);
/// ```
pub fn min_gap_radius(finer_render_radius: u32) -> u32 {
    finer_render_radius / 2
}

/// How the render-distance test measures Chebyshev distance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Distance between the raw chunk coordinates
    #[default]
    Raw,
    /// Distance between coordinates rounded down to the parent grid (even
    /// values), so sibling chunks always share one verdict. Never applied to
    /// the coarsest tier, which has no parent grid.
    ParentAligned,
}

/// Distance-band membership for one chunk at one moment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DistanceBands {
    pub within_render_dist: bool,
    pub within_lod_gap: bool,
    pub within_reasonable_dist: bool,
}

/// Distance policy for one LOD tier
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodPolicy {
    /// LOD index this policy belongs to
    pub lod: usize,
    /// Render radius in chunks
    pub render_radius: i64,
    /// LOD gap radius; `None` at the finest tier (no children to yield to)
    pub gap_radius: Option<i64>,
    /// Stand-in radius for ungenerated ancestors
    pub reasonable_radius: i64,
    /// Metric for the render-distance test
    pub metric: DistanceMetric,
    /// Whether this is the coarsest tier
    pub is_coarsest: bool,
}

impl LodPolicy {
    /// Build the policy for `lod` out of `lod_count` tiers
    pub fn new(
        lod: usize,
        lod_count: usize,
        render_radius: u32,
        gap_divisor: u32,
        metric: DistanceMetric,
    ) -> Self {
        let gap_radius = (lod > 0).then(|| (render_radius / gap_divisor.max(1)) as i64);

        Self {
            lod,
            render_radius: render_radius as i64,
            gap_radius,
            reasonable_radius: reasonable_radius(render_radius, lod, lod_count),
            metric,
            is_coarsest: lod + 1 >= lod_count,
        }
    }

    /// Whether this is the finest tier
    pub fn is_finest(&self) -> bool {
        self.lod == 0
    }

    /// Metric actually used for the render test at this tier
    pub fn render_metric(&self) -> DistanceMetric {
        if self.is_coarsest {
            DistanceMetric::Raw
        } else {
            self.metric
        }
    }

    /// Half-width of the square the discovery spiral covers.
    ///
    /// Parent-aligned rounding can pull a cell one step further into range,
    /// so that metric walks one extra ring.
    pub fn discovery_radius(&self) -> i64 {
        match self.render_metric() {
            DistanceMetric::Raw => self.render_radius,
            DistanceMetric::ParentAligned => self.render_radius + 1,
        }
    }

    /// Whether `coords` passes the render-distance test
    pub fn within_render_dist(&self, coords: ChunkCoords, observer: ChunkCoords) -> bool {
        let dist = match self.render_metric() {
            DistanceMetric::Raw => coords.chebyshev_distance(observer),
            DistanceMetric::ParentAligned => coords
                .parent_aligned()
                .chebyshev_distance(observer.parent_aligned()),
        };
        dist <= self.render_radius
    }

    /// Evaluate all three bands for a chunk against the observer's chunk
    pub fn bands(&self, coords: ChunkCoords, observer: ChunkCoords) -> DistanceBands {
        let dist = coords.chebyshev_distance(observer);

        DistanceBands {
            within_render_dist: self.within_render_dist(coords, observer),
            within_lod_gap: self.gap_radius.is_some_and(|gap| dist <= gap),
            within_reasonable_dist: dist <= self.reasonable_radius,
        }
    }
}
