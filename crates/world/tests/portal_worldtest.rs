//! Worldtest: reinforced-deepslate portals.
//!
//! Validates:
//! - A 4×5 frame lights on right-click with an igniter and registers one anchor
//! - Travel builds a linked portal on the far side, then reuses it
//! - The way back resolves through the registry
//! - Missing destination worlds cancel travel without effects

use warped_core::{BlockPos, Location, SimTick};
use warped_world::event::{HeldItem, InteractAction, TravelCause};
use warped_world::portal::{FrameOrientation, LinkSource};
use warped_world::sandbox::{flatten, ChunkSource, InMemoryWorld, SandboxHost};
use warped_world::{
    Axis, ChunkPos, DimensionConfig, HeightBounds, Host, HostEffect, HostEvent, HostWorld,
    Material, PlayerId, VoxelRegion, WarpedDimension, WorldInfo,
};

const OVERWORLD: &str = "world";
const DIMENSION: &str = "warped_dimension";
const PLAYER: PlayerId = PlayerId(7);

fn flat_world(name: &str, ground: Material) -> InMemoryWorld {
    let mut world = InMemoryWorld::new(
        WorldInfo::new(name, 42, HeightBounds::OVERWORLD),
        ChunkSource::Void,
    );
    flatten(&mut world, ChunkPos::new(0, 0), 2, 63, ground);
    world
}

fn host(with_dimension: bool) -> SandboxHost {
    let mut host = SandboxHost::new();
    host.add_world(flat_world(OVERWORLD, Material::Stone));
    if with_dimension {
        host.add_world(flat_world(DIMENSION, Material::Sculk));
    }
    host.add_player(PLAYER, OVERWORLD, Location::new(0.5, 64.0, -3.5));
    host
}

/// Frame border of `width` by `height` standing on `corner`.
fn build_frame(
    host: &mut SandboxHost,
    world: &str,
    corner: BlockPos,
    orientation: FrameOrientation,
    width: i32,
    height: i32,
) {
    let world = host.world_state_mut(world).unwrap();
    for along in 0..width {
        for up in 0..height {
            let edge = along == 0 || along == width - 1 || up == 0 || up == height - 1;
            if edge {
                let p = orientation.step(corner, along, up);
                world.set_material(p.x, p.y, p.z, Material::ReinforcedDeepslate);
            }
        }
    }
}

fn ignite(world: &str, block: BlockPos) -> HostEvent {
    HostEvent::Interact {
        player: PLAYER,
        world: world.into(),
        action: InteractAction::RightClickBlock,
        item: HeldItem::FlintAndSteel,
        block: Some(block),
    }
}

fn travel(world: &str, from: Location) -> HostEvent {
    HostEvent::PortalTravel {
        player: PLAYER,
        world: world.into(),
        from,
        cause: TravelCause::NetherPortal,
    }
}

fn teleport_target(effects: &[HostEffect]) -> Option<(&str, Location)> {
    effects.iter().find_map(|effect| match effect {
        HostEffect::Teleport {
            world, location, ..
        } => Some((world.as_str(), *location)),
        _ => None,
    })
}

#[test]
fn four_by_five_frame_activates_once() {
    let mut host = host(true);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        OVERWORLD,
        BlockPos::new(0, 64, 0),
        FrameOrientation::AlongX,
        4,
        5,
    );

    let outcome = dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(1, 64, 0)));
    assert!(outcome.cancelled);
    assert_eq!(
        outcome.messages_for(PLAYER).collect::<Vec<_>>(),
        ["Warped Portal activated!"]
    );
    assert_eq!(dimension.registry().len(), 1);

    let world = host.world(OVERWORLD).unwrap();
    for x in 1..=2 {
        for y in 65..=67 {
            let voxel = world.voxel(x, y, 0).unwrap();
            assert_eq!(voxel.material, Material::NetherPortal);
            assert_eq!(voxel.axis, Some(Axis::X));
        }
    }
    assert_eq!(world.material(0, 65, 0), Some(Material::ReinforcedDeepslate));

    // Lighting it again finds the same frame and keeps a single anchor.
    let again = dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(0, 66, 0)));
    assert!(again.cancelled);
    assert_eq!(dimension.registry().len(), 1);
}

#[test]
fn frames_along_z_carry_the_z_axis() {
    let mut host = host(true);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        OVERWORLD,
        BlockPos::new(10, 64, 10),
        FrameOrientation::AlongZ,
        5,
        6,
    );

    let outcome =
        dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(10, 64, 12)));
    assert!(outcome.cancelled);
    let world = host.world(OVERWORLD).unwrap();
    let voxel = world.voxel(10, 66, 12).unwrap();
    assert_eq!(voxel.material, Material::NetherPortal);
    assert_eq!(voxel.axis, Some(Axis::Z));
    assert_eq!(world.material(10, 68, 13), Some(Material::NetherPortal));
}

#[test]
fn broken_frames_and_wrong_items_do_nothing() {
    let mut host = host(true);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        OVERWORLD,
        BlockPos::new(0, 64, 0),
        FrameOrientation::AlongX,
        4,
        5,
    );

    let compass = HostEvent::Interact {
        player: PLAYER,
        world: OVERWORLD.into(),
        action: InteractAction::RightClickBlock,
        item: HeldItem::Compass,
        block: Some(BlockPos::new(1, 64, 0)),
    };
    assert!(!dimension.handle_event(&mut host, compass).cancelled);

    host.world_state_mut(OVERWORLD)
        .unwrap()
        .set_material(3, 66, 0, Material::Stone);
    let outcome = dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(1, 64, 0)));
    assert!(!outcome.cancelled);
    assert!(dimension.registry().is_empty());
    assert_eq!(
        host.world(OVERWORLD).unwrap().material(1, 65, 0),
        Some(Material::Air)
    );
}

#[test]
fn travel_builds_then_reuses_the_linked_portal() {
    let mut host = host(true);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        OVERWORLD,
        BlockPos::new(0, 64, 0),
        FrameOrientation::AlongX,
        4,
        5,
    );
    dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(1, 64, 0)));

    let entrance = Location::new(1.5, 65.0, 0.5);
    let outcome = dimension.handle_event(&mut host, travel(OVERWORLD, entrance));
    assert!(outcome.cancelled);
    let (world, arrival) = teleport_target(&outcome.effects).expect("teleport effect");
    assert_eq!(world, DIMENSION);
    assert_eq!(arrival, Location::new(3.0, 65.0, 0.5));
    assert_eq!(
        outcome.messages_for(PLAYER).collect::<Vec<_>>(),
        ["Welcome to the Warped Dimension!"]
    );

    // The new frame stands on the sculk floor, one block below the entrance.
    let far = host.world(DIMENSION).unwrap();
    assert_eq!(far.material(1, 64, 0), Some(Material::ReinforcedDeepslate));
    assert_eq!(far.material(4, 68, 0), Some(Material::ReinforcedDeepslate));
    assert_eq!(far.material(2, 65, 0), Some(Material::NetherPortal));
    assert_eq!(dimension.registry().len(), 2);

    let second = dimension.handle_event(&mut host, travel(OVERWORLD, entrance));
    let (_, arrival) = teleport_target(&second.effects).expect("teleport effect");
    assert_eq!(arrival, Location::new(2.5, 65.0, 0.5));
    assert_eq!(dimension.registry().len(), 2);

    let back = dimension.handle_event(&mut host, travel(DIMENSION, arrival));
    let (world, home) = teleport_target(&back.effects).expect("teleport effect");
    assert_eq!(world, OVERWORLD);
    assert_eq!(home, Location::new(1.5, 65.0, 0.5));
    assert_eq!(
        back.messages_for(PLAYER).collect::<Vec<_>>(),
        ["Returned to the Overworld!"]
    );
}

#[test]
fn unregistered_portals_are_found_by_scanning() {
    let mut host = host(true);
    let dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        DIMENSION,
        BlockPos::new(6, 64, 6),
        FrameOrientation::AlongX,
        4,
        5,
    );
    {
        let world = host.world_state_mut(DIMENSION).unwrap();
        for x in 7..=8 {
            for y in 65..=67 {
                world.set_material(x, y, 6, Material::NetherPortal);
            }
        }
    }

    let target = host.world_mut(DIMENSION).unwrap();
    let link = dimension
        .linker()
        .resolve_destination(target, Location::new(0.5, 65.0, 0.5));
    assert_eq!(link.source, LinkSource::Scan);
    assert_eq!(link.destination, Location::new(7.5, 65.0, 6.5));
    assert_eq!(dimension.registry().len(), 1);
}

#[test]
fn missing_destination_cancels_without_effects() {
    let mut host = host(false);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        OVERWORLD,
        BlockPos::new(0, 64, 0),
        FrameOrientation::AlongX,
        4,
        5,
    );
    dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(1, 64, 0)));

    let outcome =
        dimension.handle_event(&mut host, travel(OVERWORLD, Location::new(1.5, 65.0, 0.5)));
    assert!(outcome.cancelled);
    assert!(outcome.effects.is_empty());
}

#[test]
fn vanilla_portals_are_left_alone() {
    let mut host = host(true);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());

    let far_from_frames = dimension.handle_event(
        &mut host,
        travel(OVERWORLD, Location::new(20.5, 64.0, 20.5)),
    );
    assert_eq!(far_from_frames, warped_world::EventOutcome::pass());

    let end_portal = HostEvent::PortalTravel {
        player: PLAYER,
        world: OVERWORLD.into(),
        from: Location::new(0.5, 64.0, 0.5),
        cause: TravelCause::EndPortal,
    };
    assert!(!dimension.handle_event(&mut host, end_portal).cancelled);
}

#[test]
fn periodic_task_prunes_broken_portals() {
    let mut host = host(true);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        OVERWORLD,
        BlockPos::new(0, 64, 0),
        FrameOrientation::AlongX,
        4,
        5,
    );
    dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(1, 64, 0)));
    assert_eq!(dimension.registry().len(), 1);

    {
        let world = host.world_state_mut(OVERWORLD).unwrap();
        for x in 1..=2 {
            for y in 65..=67 {
                world.set_material(x, y, 0, Material::Air);
            }
        }
    }
    assert!(dimension.tick(&mut host, SimTick(50)).is_none());
    let report = dimension.tick(&mut host, SimTick(100)).expect("task fires");
    assert_eq!(report.anchors_pruned, 1);
    assert!(dimension.registry().is_empty());
}

#[test]
fn periodic_task_reloads_anchor_chunks() {
    let mut host = host(true);
    let mut dimension = WarpedDimension::new(DimensionConfig::default());
    build_frame(
        &mut host,
        OVERWORLD,
        BlockPos::new(0, 64, 0),
        FrameOrientation::AlongX,
        4,
        5,
    );
    dimension.handle_event(&mut host, ignite(OVERWORLD, BlockPos::new(1, 64, 0)));
    assert!(host
        .world_state_mut(OVERWORLD)
        .unwrap()
        .unload_chunk(ChunkPos::new(0, 0)));

    let report = dimension.tick(&mut host, SimTick(100)).expect("task fires");
    assert_eq!(report.chunks_preloaded, 1);
    assert!(host.world(OVERWORLD).unwrap().is_chunk_loaded(ChunkPos::new(0, 0)));
    // A void world regenerates the chunk empty, so the anchor has nothing left.
    assert_eq!(report.anchors_pruned, 1);
}
