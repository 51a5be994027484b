use warped_core::SimTick;
use warped_testkit::{EventRecord, JsonlSink};
use warped_world::sandbox::{ChunkSource, InMemoryWorld};
use warped_world::{ChunkPos, DimensionConfig, HeightBounds, WarpedDimension};

#[test]
fn generated_reports_can_be_logged() {
    let dimension = WarpedDimension::new(DimensionConfig::default());
    let generator = dimension.chunk_generator(42, HeightBounds::OVERWORLD);
    let info = generator.info().clone();
    let mut world = InMemoryWorld::new(info, ChunkSource::warped(generator));
    world.load_area(ChunkPos::new(0, 0), 1);
    assert_eq!(world.reports().len(), 9);

    let path = std::env::temp_dir().join(format!("warped-smoke-{}.jsonl", std::process::id()));
    let mut sink = JsonlSink::create(&path).expect("can create temp log");
    for report in world.reports() {
        sink.write_event(&EventRecord {
            tick: SimTick::ZERO.advance(1),
            kind: "chunk_generated",
            payload: report,
        })
        .expect("can write event");
    }
    sink.flush().expect("can flush");
    assert_eq!(sink.lines(), 9);
}
