//! Worldtest: amethyst rocks on a flat sculk plain.
//!
//! Uses the Amethyst Forest chunk nearest the origin at seed 42, a sculk
//! floor at y=63 with air from y=64, and a fixed random stream.

use rand::{rngs::StdRng, SeedableRng};
use warped_world::amethyst_rocks::AmethystRocksPopulator;
use warped_world::populator::GenerationGate;
use warped_world::{
    BiomeCategory, BiomeNoiseClassifier, Chunk, ChunkPos, ChunkRegion, HeightBounds, Material,
    Populator, TracedRegion, Voxel, WorldInfo, CHUNK_SIZE_X, CHUNK_SIZE_Z,
};

const WORLD_SEED: u64 = 42;
const DIMENSION: &str = "warped_dimension";
const FLOOR_Y: i32 = 63;

fn nearest_tertiary_chunk(classifier: &BiomeNoiseClassifier) -> ChunkPos {
    let mut candidates: Vec<ChunkPos> = (-64..=64)
        .flat_map(|x| (-64..=64).map(move |z| ChunkPos::new(x, z)))
        .filter(|&pos| classifier.classify_chunk(pos, WORLD_SEED) == BiomeCategory::Tertiary)
        .collect();
    candidates.sort_by_key(|pos| {
        let (x, z) = pos.center();
        (x as i64 * x as i64 + z as i64 * z as i64, pos.x, pos.z)
    });
    candidates[0]
}

fn sculk_plain(pos: ChunkPos) -> Chunk {
    let mut chunk = Chunk::new(pos, HeightBounds::OVERWORLD);
    for x in 0..CHUNK_SIZE_X {
        for z in 0..CHUNK_SIZE_Z {
            chunk.set_voxel(x, FLOOR_Y, z, Voxel::of(Material::Sculk));
        }
    }
    chunk
}

fn populate(pos: ChunkPos) -> (Chunk, Vec<warped_world::TracedWrite>) {
    let classifier = BiomeNoiseClassifier::default();
    let populator = AmethystRocksPopulator::new(GenerationGate::new(DIMENSION, classifier));
    let info = WorldInfo::new(DIMENSION, WORLD_SEED, HeightBounds::OVERWORLD);
    let mut chunk = sculk_plain(pos);
    let mut region = TracedRegion::new(ChunkRegion::new(&mut chunk));
    let mut rng = StdRng::seed_from_u64(WORLD_SEED);
    populator.populate(&info, &mut rng, pos, &mut region);
    let log = region.log().to_vec();
    drop(region);
    (chunk, log)
}

#[test]
fn rocks_and_shards_grow_on_the_plain() {
    let pos = nearest_tertiary_chunk(&BiomeNoiseClassifier::default());
    println!("nearest amethyst forest chunk: {pos}");
    let (chunk, log) = populate(pos);

    let placed: Vec<_> = log.iter().filter(|w| w.accepted).collect();
    assert!(!placed.is_empty(), "no amethyst placed in {pos}");
    for write in placed {
        assert!(
            (FLOOR_Y + 1..=FLOOR_Y + 4).contains(&write.pos.y),
            "write at {} outside the rock band",
            write.pos
        );
        assert!(matches!(
            write.material,
            Material::AmethystBlock | Material::AmethystCluster | Material::BuddingAmethyst
        ));
    }

    for x in 0..CHUNK_SIZE_X {
        for z in 0..CHUNK_SIZE_Z {
            assert_eq!(chunk.material(x, FLOOR_Y, z), Some(Material::Sculk));
            assert_eq!(chunk.material(x, FLOOR_Y + 5, z), Some(Material::Air));
        }
    }
}

#[test]
fn same_stream_same_rocks() {
    let pos = nearest_tertiary_chunk(&BiomeNoiseClassifier::default());
    let (a, log_a) = populate(pos);
    let (b, log_b) = populate(pos);
    assert_eq!(log_a, log_b);
    assert!(a.voxels() == b.voxels());
}
