use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::{Chunk, ChunkPos};

/// Resident chunks of one world, bounded by an LRU budget.
///
/// Lookups through [`ChunkStorage::get`] do not refresh recency; writes and
/// inserts do. Iteration follows position order so that anything derived
/// from the resident set is reproducible.
pub struct ChunkStorage {
    chunks: BTreeMap<ChunkPos, Chunk>,
    recency: LruCache<ChunkPos, ()>,
    budget: NonZeroUsize,
}

impl ChunkStorage {
    pub fn new(budget: usize) -> Self {
        let budget = NonZeroUsize::new(budget).unwrap_or(NonZeroUsize::MIN);
        Self {
            chunks: BTreeMap::new(),
            recency: LruCache::new(budget),
            budget,
        }
    }

    pub fn budget(&self) -> usize {
        self.budget.get()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    /// Make `chunk` resident. When the budget is full the least recently
    /// written chunk is unloaded first and its position returned.
    pub fn insert(&mut self, chunk: Chunk) -> Option<ChunkPos> {
        let pos = chunk.position();
        let evicted = if self.chunks.contains_key(&pos) || self.chunks.len() < self.budget() {
            None
        } else {
            self.evict_oldest()
        };
        self.recency.put(pos, ());
        self.chunks.insert(pos, chunk);
        evicted
    }

    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    /// Mutable access for writes. Marks the chunk as recently used.
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        let chunk = self.chunks.get_mut(&pos)?;
        self.recency.put(pos, ());
        Some(chunk)
    }

    /// Drop a chunk. Returns it when it was resident.
    pub fn unload(&mut self, pos: ChunkPos) -> Option<Chunk> {
        self.recency.pop(&pos);
        self.chunks.remove(&pos)
    }

    /// Resident positions in ascending order.
    pub fn positions(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.chunks.keys().copied()
    }

    fn evict_oldest(&mut self) -> Option<ChunkPos> {
        let (oldest, ()) = self.recency.pop_lru()?;
        self.chunks.remove(&oldest);
        debug!(chunk = %oldest, budget = self.budget(), "Evicted chunk");
        Some(oldest)
    }
}
