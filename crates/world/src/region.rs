//! Bounded voxel regions.
//!
//! Every write the generator, the portal linker or the lava cleanup makes
//! goes through [`VoxelRegion`]. Reads outside the region return `None` and
//! writes outside it are no-ops that report `false`, so callers can stamp
//! structures that straddle the region edge without checking every cell.

use warped_core::BlockPos;

use crate::chunk::{Chunk, HeightBounds, Voxel, CHUNK_SIZE_X, CHUNK_SIZE_Z};
use crate::material::Material;

/// A bounded 3D block region owned by the host.
pub trait VoxelRegion {
    /// Whether the cell is addressable through this region.
    fn is_in_region(&self, x: i32, y: i32, z: i32) -> bool;

    /// Read a cell. `None` when out of region.
    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<Voxel>;

    /// Write a cell. Returns false (and changes nothing) when out of region.
    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) -> bool;

    fn material(&self, x: i32, y: i32, z: i32) -> Option<Material> {
        self.voxel(x, y, z).map(|v| v.material)
    }

    fn set_material(&mut self, x: i32, y: i32, z: i32, material: Material) -> bool {
        self.set_voxel(x, y, z, Voxel::of(material))
    }

    /// True when the cell is in region and holds exactly `material`.
    fn material_is(&self, x: i32, y: i32, z: i32, material: Material) -> bool {
        self.material(x, y, z) == Some(material)
    }

    fn material_at(&self, pos: BlockPos) -> Option<Material> {
        self.material(pos.x, pos.y, pos.z)
    }
}

impl<R: VoxelRegion + ?Sized> VoxelRegion for &mut R {
    fn is_in_region(&self, x: i32, y: i32, z: i32) -> bool {
        (**self).is_in_region(x, y, z)
    }

    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        (**self).voxel(x, y, z)
    }

    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) -> bool {
        (**self).set_voxel(x, y, z, voxel)
    }
}

/// Topmost non-air cell of a column, scanning from `max_y - 1` down to
/// `min_y + 1`. Cells outside the region are skipped.
pub fn find_surface(
    region: &dyn VoxelRegion,
    bounds: HeightBounds,
    x: i32,
    z: i32,
) -> Option<i32> {
    ((bounds.min_y + 1)..bounds.max_y)
        .rev()
        .find(|&y| region.material(x, y, z).is_some_and(|m| !m.is_air()))
}

/// Region covering exactly one chunk column.
pub struct ChunkRegion<'a> {
    chunk: &'a mut Chunk,
    origin_x: i32,
    origin_z: i32,
}

impl<'a> ChunkRegion<'a> {
    pub fn new(chunk: &'a mut Chunk) -> Self {
        let (origin_x, origin_z) = chunk.position().origin();
        Self {
            chunk,
            origin_x,
            origin_z,
        }
    }

    fn local(&self, x: i32, z: i32) -> Option<(usize, usize)> {
        let lx = x - self.origin_x;
        let lz = z - self.origin_z;
        if (0..CHUNK_SIZE_X as i32).contains(&lx) && (0..CHUNK_SIZE_Z as i32).contains(&lz) {
            Some((lx as usize, lz as usize))
        } else {
            None
        }
    }
}

impl VoxelRegion for ChunkRegion<'_> {
    fn is_in_region(&self, x: i32, y: i32, z: i32) -> bool {
        self.local(x, z).is_some() && self.chunk.bounds().contains(y)
    }

    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        let (lx, lz) = self.local(x, z)?;
        self.chunk.voxel(lx, y, lz)
    }

    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) -> bool {
        let Some((lx, lz)) = self.local(x, z) else {
            return false;
        };
        self.chunk.set_voxel(lx, y, lz, voxel)
    }
}

/// One write observed by a [`TracedRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TracedWrite {
    pub pos: BlockPos,
    pub material: Material,
    pub accepted: bool,
}

/// Wrapper that records every write attempt before forwarding it.
pub struct TracedRegion<R> {
    inner: R,
    log: Vec<TracedWrite>,
}

impl<R: VoxelRegion> TracedRegion<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            log: Vec::new(),
        }
    }

    pub fn log(&self) -> &[TracedWrite] {
        &self.log
    }

    /// Writes the wrapped region accepted.
    pub fn accepted(&self) -> impl Iterator<Item = &TracedWrite> {
        self.log.iter().filter(|w| w.accepted)
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: VoxelRegion> VoxelRegion for TracedRegion<R> {
    fn is_in_region(&self, x: i32, y: i32, z: i32) -> bool {
        self.inner.is_in_region(x, y, z)
    }

    fn voxel(&self, x: i32, y: i32, z: i32) -> Option<Voxel> {
        self.inner.voxel(x, y, z)
    }

    fn set_voxel(&mut self, x: i32, y: i32, z: i32, voxel: Voxel) -> bool {
        let accepted = self.inner.set_voxel(x, y, z, voxel);
        self.log.push(TracedWrite {
            pos: BlockPos::new(x, y, z),
            material: voxel.material,
            accepted,
        });
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkPos;

    fn chunk() -> Chunk {
        Chunk::new(ChunkPos::new(-1, 2), HeightBounds::new(0, 64))
    }

    #[test]
    fn chunk_region_maps_world_coordinates() {
        let mut chunk = chunk();
        let mut region = ChunkRegion::new(&mut chunk);
        assert!(region.is_in_region(-16, 0, 32));
        assert!(region.is_in_region(-1, 63, 47));
        assert!(!region.is_in_region(0, 10, 32));
        assert!(!region.is_in_region(-16, 64, 32));

        assert!(region.set_material(-10, 20, 40, Material::Sculk));
        assert!(!region.set_material(5, 20, 40, Material::Sculk));
        assert!(region.material_is(-10, 20, 40, Material::Sculk));
        assert_eq!(region.material(5, 20, 40), None);
        drop(region);
        assert_eq!(chunk.material(6, 20, 8), Some(Material::Sculk));
    }

    #[test]
    fn find_surface_skips_min_layer() {
        let mut chunk = chunk();
        let mut region = ChunkRegion::new(&mut chunk);
        let bounds = HeightBounds::new(0, 64);
        region.set_material(-16, 0, 32, Material::Bedrock);
        assert_eq!(find_surface(&region, bounds, -16, 32), None);
        region.set_material(-16, 12, 32, Material::Sculk);
        assert_eq!(find_surface(&region, bounds, -16, 32), Some(12));
    }

    #[test]
    fn traced_region_records_rejections() {
        let mut chunk = chunk();
        let mut traced = TracedRegion::new(ChunkRegion::new(&mut chunk));
        traced.set_material(-8, 5, 40, Material::AmethystBlock);
        traced.set_material(100, 5, 40, Material::AmethystBlock);
        assert_eq!(traced.log().len(), 2);
        assert_eq!(traced.accepted().count(), 1);
    }
}
