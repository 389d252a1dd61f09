//! Per-LOD chunk registry.
//!
//! An append-only arena: chunks are created on first reference and never
//! removed for the lifetime of the streamer. Queues hold [`ChunkId`]s, so a
//! lookup after the initial hash lookup is a plain index.

use std::collections::HashMap;

use super::chunk::Chunk;
use super::coords::ChunkCoords;

/// Index of a chunk inside one LOD's registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkId(usize);

impl ChunkId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Coordinate → chunk mapping for one LOD
pub struct ChunkRegistry<H, M> {
    chunks: Vec<Chunk<H, M>>,
    coords: Vec<ChunkCoords>,
    index: HashMap<ChunkCoords, ChunkId>,
}

impl<H, M> ChunkRegistry<H, M> {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            coords: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Look up a chunk, creating it with a fresh visual object if absent.
    ///
    /// Returns the chunk's id and whether it was created by this call.
    pub fn get_or_create(
        &mut self,
        coords: ChunkCoords,
        create_handle: impl FnOnce() -> H,
    ) -> (ChunkId, bool) {
        if let Some(&id) = self.index.get(&coords) {
            return (id, false);
        }

        let id = ChunkId(self.chunks.len());
        self.chunks.push(Chunk::new(create_handle()));
        self.coords.push(coords);
        self.index.insert(coords, id);
        (id, true)
    }

    /// Id of an existing chunk
    pub fn find(&self, coords: ChunkCoords) -> Option<ChunkId> {
        self.index.get(&coords).copied()
    }

    /// Existing chunk at `coords`, without creating one
    pub fn lookup(&self, coords: ChunkCoords) -> Option<&Chunk<H, M>> {
        self.find(coords).map(|id| self.get(id))
    }

    pub fn get(&self, id: ChunkId) -> &Chunk<H, M> {
        &self.chunks[id.index()]
    }

    pub fn get_mut(&mut self, id: ChunkId) -> &mut Chunk<H, M> {
        &mut self.chunks[id.index()]
    }

    /// Coordinate a chunk was registered under
    pub fn coords_of(&self, id: ChunkId) -> ChunkCoords {
        self.coords[id.index()]
    }

    /// Number of registered chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All chunks in creation order
    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoords, &Chunk<H, M>)> {
        self.coords.iter().copied().zip(self.chunks.iter())
    }
}

impl<H, M> Default for ChunkRegistry<H, M> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_creates_once() {
        let mut registry: ChunkRegistry<u32, ()> = ChunkRegistry::new();
        let mut handles_created = 0;

        let (first, created) = registry.get_or_create(ChunkCoords::new(1, 2), || {
            handles_created += 1;
            10
        });
        assert!(created);

        let (again, created) = registry.get_or_create(ChunkCoords::new(1, 2), || {
            handles_created += 1;
            20
        });
        assert!(!created);
        assert_eq!(first, again);
        assert_eq!(handles_created, 1);
        assert_eq!(*registry.get(first).render_handle(), 10);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_ids_index_the_arena() {
        let mut registry: ChunkRegistry<u32, ()> = ChunkRegistry::new();
        for i in 0..5 {
            let (id, _) = registry.get_or_create(ChunkCoords::new(i, -i), || 0);
            assert_eq!(id.index(), i as usize);
        }

        // Ids span the whole arena range, not just 32 bits
        let past_u32 = u32::MAX as usize + 1;
        assert_eq!(ChunkId(past_u32).index(), past_u32);
        assert_ne!(ChunkId(past_u32), ChunkId(0));
    }

    #[test]
    fn test_find_and_lookup() {
        let mut registry: ChunkRegistry<u32, ()> = ChunkRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.find(ChunkCoords::new(0, 0)).is_none());
        assert!(registry.lookup(ChunkCoords::new(0, 0)).is_none());

        let (id, _) = registry.get_or_create(ChunkCoords::new(-4, 9), || 3);
        assert_eq!(registry.find(ChunkCoords::new(-4, 9)), Some(id));
        assert_eq!(registry.coords_of(id), ChunkCoords::new(-4, 9));
        assert!(registry.lookup(ChunkCoords::new(-4, 9)).is_some());

        // Lookups never create
        assert!(registry.lookup(ChunkCoords::new(9, -4)).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_mut_persists() {
        let mut registry: ChunkRegistry<u32, ()> = ChunkRegistry::new();
        let (id, _) = registry.get_or_create(ChunkCoords::new(0, 0), || 0);

        registry.get_mut(id).in_live_queue = true;
        assert!(registry.get(id).in_live_queue());
    }

    #[test]
    fn test_iter_in_creation_order() {
        let mut registry: ChunkRegistry<u32, ()> = ChunkRegistry::new();
        let coords = [ChunkCoords::new(2, 0), ChunkCoords::new(-1, 5), ChunkCoords::new(0, 0)];
        for (i, c) in coords.iter().enumerate() {
            registry.get_or_create(*c, || i as u32);
        }

        let seen: Vec<_> = registry.iter().map(|(c, chunk)| (c, *chunk.render_handle())).collect();
        assert_eq!(
            seen,
            vec![(coords[0], 0), (coords[1], 1), (coords[2], 2)]
        );
    }
}
