//! Spiral discovery walk.
//!
//! Each LOD walks an outward square spiral around the observer's chunk, one
//! cell per step, feeding never-queued chunks into its live queue. When the
//! observer crosses into another chunk mid-walk the spiral is abandoned and a
//! new one starts from the new goal. A finished spiral starts over, so chunks
//! retired from the live queue are picked up again while in range.

use super::coords::ChunkCoords;
use super::registry::ChunkId;
use super::stats::StreamingStats;
use super::tier::LodTier;

/// Spiral heading
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Heading {
    /// +x
    Right,
    /// +z
    Forward,
    /// -x
    Left,
    /// -z
    Back,
}

impl Heading {
    fn turn(self) -> Self {
        match self {
            Heading::Right => Heading::Forward,
            Heading::Forward => Heading::Left,
            Heading::Left => Heading::Back,
            Heading::Back => Heading::Right,
        }
    }

    fn delta(self) -> (i64, i64) {
        match self {
            Heading::Right => (1, 0),
            Heading::Forward => (0, 1),
            Heading::Left => (-1, 0),
            Heading::Back => (0, -1),
        }
    }
}

/// Outward square spiral bounded to `radius` cells around its goal.
///
/// Leg length grows by one every second turn. Iteration ends the first time
/// the cursor leaves the bounding square, which happens right after the
/// outermost ring is complete.
#[derive(Clone, Debug)]
pub struct Spiral {
    goal: ChunkCoords,
    radius: i64,
    cursor: ChunkCoords,
    heading: Heading,
    leg_len: i64,
    leg_progress: i64,
}

impl Spiral {
    pub fn new(goal: ChunkCoords, radius: i64) -> Self {
        Self {
            goal,
            radius,
            cursor: goal,
            heading: Heading::Right,
            leg_len: 1,
            leg_progress: 0,
        }
    }

    /// Centre the spiral was started from
    pub fn goal(&self) -> ChunkCoords {
        self.goal
    }

    fn in_bounds(&self) -> bool {
        self.cursor.chebyshev_distance(self.goal) <= self.radius
    }

    fn advance(&mut self) {
        if self.leg_progress == self.leg_len {
            self.leg_progress = 0;
            self.heading = self.heading.turn();
            if matches!(self.heading, Heading::Left | Heading::Right) {
                self.leg_len += 1;
            }
        }
        self.leg_progress += 1;

        let (dx, dz) = self.heading.delta();
        self.cursor = self.cursor.offset(dx, dz);
    }
}

impl Iterator for Spiral {
    type Item = ChunkCoords;

    fn next(&mut self) -> Option<ChunkCoords> {
        if !self.in_bounds() {
            return None;
        }
        let cell = self.cursor;
        self.advance();
        Some(cell)
    }
}

/// Result of one discovery step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WalkStep {
    /// Cell visited this step
    pub cell: ChunkCoords,
    /// The previous spiral was abandoned because the goal moved
    pub restarted: bool,
}

/// Resumable spiral walk for one LOD
#[derive(Debug, Default)]
pub struct DiscoveryWalker {
    spiral: Option<Spiral>,
    passes_completed: u64,
}

impl DiscoveryWalker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Goal of the spiral currently being walked
    pub fn goal(&self) -> Option<ChunkCoords> {
        self.spiral.as_ref().map(Spiral::goal)
    }

    /// Spirals walked to completion
    pub fn passes_completed(&self) -> u64 {
        self.passes_completed
    }

    /// Visit the next cell for an observer currently in chunk `goal`.
    pub fn step(&mut self, goal: ChunkCoords, radius: i64) -> WalkStep {
        let restarted = self.spiral.as_ref().is_some_and(|s| s.goal() != goal);
        if restarted || self.spiral.is_none() {
            self.spiral = Some(Spiral::new(goal, radius));
        }

        if let Some(cell) = self.spiral.as_mut().and_then(Iterator::next) {
            return WalkStep { cell, restarted };
        }

        // Previous pass finished: start over from the current goal
        self.passes_completed += 1;
        let mut spiral = Spiral::new(goal, radius);
        let cell = spiral.next().unwrap_or(goal);
        self.spiral = Some(spiral);
        WalkStep { cell, restarted }
    }
}

impl<H, M> LodTier<H, M> {
    /// One discovery increment: visit a spiral cell, register its chunk, and
    /// enqueue it into the live queue if it is not there already.
    ///
    /// Returns the chunk id if it was newly enqueued.
    pub(crate) fn step_discovery(
        &mut self,
        goal: ChunkCoords,
        create_handle: impl FnOnce() -> H,
        stats: &mut StreamingStats,
    ) -> Option<ChunkId> {
        let step = self.discovery.step(goal, self.policy.discovery_radius());
        stats.spiral_cells_visited += 1;
        if step.restarted {
            stats.spiral_restarts += 1;
            log::debug!("LOD {}: observer moved, restarting spiral at {:?}", self.lod(), goal);
        }

        let (id, _) = self.registry.get_or_create(step.cell, create_handle);
        let chunk = self.registry.get_mut(id);
        if chunk.in_live_queue {
            return None;
        }

        chunk.in_live_queue = true;
        self.live_queue.push(step.cell, id);
        stats.chunks_enqueued += 1;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::lod::{DistanceMetric, LodPolicy};
    use std::collections::HashSet;

    fn tier(render_radius: u32) -> LodTier<u32, ()> {
        LodTier::new(LodPolicy::new(0, 1, render_radius, 2, DistanceMetric::Raw))
    }

    #[test]
    fn test_spiral_order() {
        let cells: Vec<_> = Spiral::new(ChunkCoords::new(0, 0), 1).collect();
        let expected = vec![
            ChunkCoords::new(0, 0),
            ChunkCoords::new(1, 0),
            ChunkCoords::new(1, 1),
            ChunkCoords::new(0, 1),
            ChunkCoords::new(-1, 1),
            ChunkCoords::new(-1, 0),
            ChunkCoords::new(-1, -1),
            ChunkCoords::new(0, -1),
            ChunkCoords::new(1, -1),
        ];
        assert_eq!(cells, expected);
    }

    #[test]
    fn test_spiral_covers_square_exactly_once() {
        for radius in 0..6 {
            let goal = ChunkCoords::new(-3, 5);
            let cells: Vec<_> = Spiral::new(goal, radius).collect();
            let unique: HashSet<_> = cells.iter().copied().collect();

            let side = (2 * radius + 1) as usize;
            assert_eq!(cells.len(), side * side, "radius {}", radius);
            assert_eq!(unique.len(), cells.len());
            assert!(cells.iter().all(|c| c.chebyshev_distance(goal) <= radius));
        }
    }

    #[test]
    fn test_spiral_nearest_first() {
        let goal = ChunkCoords::new(0, 0);
        let rings: Vec<_> = Spiral::new(goal, 4)
            .map(|c| c.chebyshev_distance(goal))
            .collect();
        assert!(rings.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_first_pass_enqueues_exact_block() {
        let mut tier = tier(2);
        let mut stats = StreamingStats::default();
        let mut enqueued = HashSet::new();
        let mut next_handle = 0;

        for _ in 0..25 {
            let id = tier.step_discovery(ChunkCoords::new(0, 0), || {
                next_handle += 1;
                next_handle
            }, &mut stats);
            let id = id.expect("every cell of the first pass is new");
            enqueued.insert(tier.registry.coords_of(id));
        }

        let expected: HashSet<_> = (-2..=2)
            .flat_map(|x| (-2..=2).map(move |z| ChunkCoords::new(x, z)))
            .collect();
        assert_eq!(enqueued, expected);
        assert_eq!(tier.registry.len(), 25);
        assert_eq!(tier.live_queue.len(), 25);
        assert_eq!(stats.chunks_enqueued, 25);

        // Second pass revisits cells that are already live
        for _ in 0..25 {
            assert!(tier.step_discovery(ChunkCoords::new(0, 0), || 0, &mut stats).is_none());
        }
        assert_eq!(tier.registry.len(), 25);
        assert_eq!(tier.live_queue.len(), 25);
        assert_eq!(tier.discovery.passes_completed(), 1);
    }

    #[test]
    fn test_goal_change_restarts_spiral() {
        let mut walker = DiscoveryWalker::new();

        for _ in 0..5 {
            let step = walker.step(ChunkCoords::new(0, 0), 3);
            assert!(!step.restarted);
        }

        let step = walker.step(ChunkCoords::new(1, 0), 3);
        assert!(step.restarted);
        assert_eq!(step.cell, ChunkCoords::new(1, 0));
        assert_eq!(walker.goal(), Some(ChunkCoords::new(1, 0)));

        // Continues the new spiral without restarting again
        let step = walker.step(ChunkCoords::new(1, 0), 3);
        assert!(!step.restarted);
        assert_eq!(step.cell, ChunkCoords::new(2, 0));
    }

    #[test]
    fn test_finished_pass_starts_over() {
        let mut walker = DiscoveryWalker::new();
        let goal = ChunkCoords::new(4, 4);

        for _ in 0..9 {
            walker.step(goal, 1);
        }
        assert_eq!(walker.passes_completed(), 0);

        let step = walker.step(goal, 1);
        assert_eq!(step.cell, goal);
        assert!(!step.restarted);
        assert_eq!(walker.passes_completed(), 1);
    }

    #[test]
    fn test_discovery_skips_chunks_already_live() {
        let mut tier = tier(1);
        let mut stats = StreamingStats::default();

        let (id, _) = tier.registry.get_or_create(ChunkCoords::new(0, 0), || 99);
        tier.registry.get_mut(id).in_live_queue = true;

        assert!(tier.step_discovery(ChunkCoords::new(0, 0), || 1, &mut stats).is_none());
        assert_eq!(tier.live_queue.len(), 0);
        assert_eq!(*tier.registry.get(id).render_handle(), 99);
    }
}
