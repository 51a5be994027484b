//! Property-based tests for populator writes.
//!
//! Critical invariants:
//! - Every accepted write lands inside the chunk being populated
//! - A populator whose biome does not match the chunk attempts no writes
//! - Chunks in other worlds are never touched
//! - The whole pipeline is a pure function of (seed, chunk)

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use warped_world::amethyst_rocks::AmethystRocksPopulator;
use warped_world::amethyst_tree::AmethystTreePopulator;
use warped_world::chorus::ChorusPopulator;
use warped_world::fungus::WarpedFungusPopulator;
use warped_world::populator::GenerationGate;
use warped_world::ruin::RuinsPopulator;
use warped_world::sculk_tree::SculkTreePopulator;
use warped_world::terrain::TerrainGenerator;
use warped_world::{
    BiomeNoiseClassifier, Chunk, ChunkPos, ChunkRegion, HeightBounds, Populator, TracedRegion,
    WarpedChunkGenerator, WorldInfo,
};

const DIMENSION: &str = "warped_dimension";

fn populators() -> Vec<Box<dyn Populator>> {
    let gate = GenerationGate::new(DIMENSION, BiomeNoiseClassifier::default());
    vec![
        Box::new(WarpedFungusPopulator::new(gate.clone())),
        Box::new(SculkTreePopulator::new(gate.clone())),
        Box::new(AmethystTreePopulator::new(gate.clone())),
        Box::new(AmethystRocksPopulator::new(gate.clone())),
        Box::new(ChorusPopulator::new(gate.clone())),
        Box::new(RuinsPopulator::with_chance(gate, 1.0)),
    ]
}

fn surfaced_chunk(seed: u64, pos: ChunkPos) -> Chunk {
    let generator = WarpedChunkGenerator::new(
        WorldInfo::new(DIMENSION, seed, HeightBounds::OVERWORLD),
        BiomeNoiseClassifier::default(),
        1.0,
    );
    let mut chunk = TerrainGenerator::new(seed, HeightBounds::OVERWORLD).generate_chunk(pos);
    generator.rewrite_surface(&mut chunk);
    chunk
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: accepted writes stay in the chunk; rejected ones fall outside it.
    #[test]
    fn writes_stay_in_region(
        seed in any::<u64>(),
        chunk_x in -64i32..64i32,
        chunk_z in -64i32..64i32,
    ) {
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let info = WorldInfo::new(DIMENSION, seed, HeightBounds::OVERWORLD);
        let mut chunk = surfaced_chunk(seed, pos);

        for (index, populator) in populators().iter().enumerate() {
            let mut region = TracedRegion::new(ChunkRegion::new(&mut chunk));
            let mut rng = StdRng::seed_from_u64(seed ^ index as u64);
            populator.populate(&info, &mut rng, pos, &mut region);

            for write in region.log() {
                let inside = pos.contains_column(write.pos.x, write.pos.z)
                    && info.bounds.contains(write.pos.y);
                prop_assert_eq!(
                    write.accepted, inside,
                    "{} wrote {:?} at {} (chunk {})",
                    populator.name(), write.material, write.pos, pos
                );
            }
        }
    }

    /// Property: a populator never writes into a chunk of another biome.
    #[test]
    fn biome_mismatch_means_no_writes(
        seed in any::<u64>(),
        chunk_x in -64i32..64i32,
        chunk_z in -64i32..64i32,
    ) {
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let info = WorldInfo::new(DIMENSION, seed, HeightBounds::OVERWORLD);
        let biome = BiomeNoiseClassifier::default().classify_chunk(pos, seed);
        let mut chunk = surfaced_chunk(seed, pos);

        for populator in populators().iter().filter(|p| p.target_biome() != biome) {
            let mut region = TracedRegion::new(ChunkRegion::new(&mut chunk));
            let mut rng = StdRng::seed_from_u64(seed);
            populator.populate(&info, &mut rng, pos, &mut region);
            prop_assert!(region.log().is_empty(), "{} touched a {:?} chunk", populator.name(), biome);
        }
    }

    /// Property: other worlds are left alone even when the biome matches.
    #[test]
    fn other_worlds_are_untouched(
        seed in any::<u64>(),
        chunk_x in -64i32..64i32,
        chunk_z in -64i32..64i32,
    ) {
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let info = WorldInfo::new("world", seed, HeightBounds::OVERWORLD);
        let mut chunk = surfaced_chunk(seed, pos);

        for populator in populators() {
            let mut region = TracedRegion::new(ChunkRegion::new(&mut chunk));
            let mut rng = StdRng::seed_from_u64(seed);
            populator.populate(&info, &mut rng, pos, &mut region);
            prop_assert!(region.log().is_empty());
        }
    }

    /// Property: the full pipeline reproduces the same chunk.
    #[test]
    fn pipeline_is_deterministic(
        seed in any::<u64>(),
        chunk_x in -64i32..64i32,
        chunk_z in -64i32..64i32,
    ) {
        let pos = ChunkPos::new(chunk_x, chunk_z);
        let generator = WarpedChunkGenerator::new(
            WorldInfo::new(DIMENSION, seed, HeightBounds::OVERWORLD),
            BiomeNoiseClassifier::default(),
            0.01,
        );
        let terrain = TerrainGenerator::new(seed, HeightBounds::OVERWORLD);

        let mut a = terrain.generate_chunk(pos);
        let mut b = terrain.generate_chunk(pos);
        let report_a = generator.generate_chunk(&mut a);
        let report_b = generator.generate_chunk(&mut b);

        prop_assert_eq!(report_a, report_b);
        prop_assert!(a.voxels() == b.voxels());
    }
}
