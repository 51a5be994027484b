//! Reinforced-deepslate portals between the overworld and the dimension.
//!
//! A frame is any rectangle of reinforced deepslate, from 4 wide by 5 tall
//! up to 23 by 23, standing along the X or the Z axis. Lighting it fills
//! the interior with portal medium. Walking through looks for a linked
//! portal on the other side at the same coordinates: first in the anchor
//! registry, then by scanning the terrain, and finally by building one.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use warped_core::{BlockPos, Location};

use crate::chunk::{ChunkPos, Voxel};
use crate::host::{Host, HostWorld};
use crate::material::{Axis, Material};
use crate::populator::Span;
use crate::region::VoxelRegion;

pub const FRAME_MATERIAL: Material = Material::ReinforcedDeepslate;
pub const PORTAL_MEDIUM: Material = Material::NetherPortal;

/// Frame width and height of portals built on arrival.
pub const BUILT_WIDTH: i32 = 4;
pub const BUILT_HEIGHT: i32 = 5;

/// Direction a frame extends in from its corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameOrientation {
    AlongX,
    AlongZ,
}

impl FrameOrientation {
    /// Search order.
    pub const ALL: [FrameOrientation; 2] = [FrameOrientation::AlongX, FrameOrientation::AlongZ];

    /// Axis tag given to the portal medium.
    pub fn axis(self) -> Axis {
        match self {
            FrameOrientation::AlongX => Axis::X,
            FrameOrientation::AlongZ => Axis::Z,
        }
    }

    /// Position `along` cells sideways and `up` cells above `corner`.
    pub fn step(self, corner: BlockPos, along: i32, up: i32) -> BlockPos {
        match self {
            FrameOrientation::AlongX => corner.offset(along, up, 0),
            FrameOrientation::AlongZ => corner.offset(0, up, along),
        }
    }
}

/// A rectangular frame. `width` and `height` include the border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalFrame {
    pub corner: BlockPos,
    pub orientation: FrameOrientation,
    pub width: i32,
    pub height: i32,
}

impl PortalFrame {
    pub fn border(&self) -> impl Iterator<Item = BlockPos> + '_ {
        let (w, h) = (self.width, self.height);
        let bottom_top = (0..w).flat_map(move |i| [(i, 0), (i, h - 1)]);
        let sides = (1..h - 1).flat_map(move |i| [(0, i), (w - 1, i)]);
        bottom_top
            .chain(sides)
            .map(move |(along, up)| self.orientation.step(self.corner, along, up))
    }

    pub fn interior(&self) -> impl Iterator<Item = BlockPos> + '_ {
        (1..self.width - 1).flat_map(move |along| {
            (1..self.height - 1).map(move |up| self.orientation.step(self.corner, along, up))
        })
    }

    /// Lowest interior cell, used as the frame's anchor.
    pub fn anchor_cell(&self) -> BlockPos {
        self.orientation.step(self.corner, 1, 1)
    }

    /// Border is all frame material and the interior is air or portal medium.
    pub fn is_valid(&self, region: &dyn VoxelRegion) -> bool {
        self.border()
            .all(|p| region.material_at(p) == Some(FRAME_MATERIAL))
            && self
                .interior()
                .all(|p| matches!(region.material_at(p), Some(Material::Air | PORTAL_MEDIUM)))
    }
}

/// Bounds of the frame search around a clicked block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSearch {
    /// Corner offsets tried sideways, `-reach..=reach`.
    pub horizontal_reach: i32,
    /// Corner offsets tried vertically, `-reach..=reach`.
    pub vertical_reach: i32,
    pub widths: Span,
    pub heights: Span,
}

impl Default for FrameSearch {
    fn default() -> Self {
        Self {
            horizontal_reach: 4,
            vertical_reach: 4,
            widths: Span::new(4, 23),
            heights: Span::new(5, 23),
        }
    }
}

impl FrameSearch {
    /// First valid frame around `clicked`. Orientations are tried in order,
    /// then corner offsets (sideways outer, vertical inner), then sizes
    /// (width outer, height inner). The first match wins.
    pub fn find(&self, region: &dyn VoxelRegion, clicked: BlockPos) -> Option<PortalFrame> {
        for orientation in FrameOrientation::ALL {
            for along in -self.horizontal_reach..=self.horizontal_reach {
                for up in -self.vertical_reach..=self.vertical_reach {
                    let corner = orientation.step(clicked, along, up);
                    if let Some(frame) = self.frame_at(region, corner, orientation) {
                        return Some(frame);
                    }
                }
            }
        }
        None
    }

    fn frame_at(
        &self,
        region: &dyn VoxelRegion,
        corner: BlockPos,
        orientation: FrameOrientation,
    ) -> Option<PortalFrame> {
        // Every frame needs its corner; skip the size loops otherwise.
        if region.material_at(corner) != Some(FRAME_MATERIAL) {
            return None;
        }
        for width in self.widths.min..=self.widths.max {
            for height in self.heights.min..=self.heights.max {
                let frame = PortalFrame {
                    corner,
                    orientation,
                    width,
                    height,
                };
                if frame.is_valid(region) {
                    return Some(frame);
                }
            }
        }
        None
    }
}

/// Fill a frame's interior with axis-tagged portal medium. Returns cells written.
pub fn activate(region: &mut dyn VoxelRegion, frame: &PortalFrame) -> usize {
    let medium = Voxel::with_axis(PORTAL_MEDIUM, frame.orientation.axis());
    let cells: Vec<BlockPos> = frame.interior().collect();
    cells
        .into_iter()
        .filter(|p| region.set_voxel(p.x, p.y, p.z, medium))
        .count()
}

/// True when frame material sits within `reach` blocks (cube) of `pos`.
pub fn frame_nearby(region: &dyn VoxelRegion, pos: BlockPos, reach: i32) -> bool {
    for dx in -reach..=reach {
        for dy in -reach..=reach {
            for dz in -reach..=reach {
                if region.material_at(pos.offset(dx, dy, dz)) == Some(FRAME_MATERIAL) {
                    return true;
                }
            }
        }
    }
    false
}

/// A known portal: its world, one medium cell and its axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortalAnchor {
    pub world: String,
    pub pos: BlockPos,
    pub axis: Axis,
}

impl PortalAnchor {
    pub fn new(world: impl Into<String>, pos: BlockPos, axis: Axis) -> Self {
        Self {
            world: world.into(),
            pos,
            axis,
        }
    }

    /// Arrival point in the middle of the anchor cell.
    pub fn arrival(&self) -> Location {
        Location::new(
            self.pos.x as f64 + 0.5,
            self.pos.y as f64,
            self.pos.z as f64 + 0.5,
        )
    }
}

/// Distance with the vertical component counted at one third.
pub fn weighted_distance(a: BlockPos, b: BlockPos) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64 / 3.0;
    let dz = (a.z - b.z) as f64;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// What [`PortalRegistry::register`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// An anchor already sat within the duplicate radius. Nothing changed.
    Duplicate,
    /// An anchor within the merge radius moved to the new position.
    Moved,
}

/// In-memory portal anchors, kept for the process lifetime.
#[derive(Debug, Clone)]
pub struct PortalRegistry {
    anchors: Vec<PortalAnchor>,
    duplicate_radius: f64,
    merge_radius: f64,
}

impl Default for PortalRegistry {
    fn default() -> Self {
        Self::new(5.0, 25.0)
    }
}

impl PortalRegistry {
    pub fn new(duplicate_radius: f64, merge_radius: f64) -> Self {
        Self {
            anchors: Vec::new(),
            duplicate_radius,
            merge_radius,
        }
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn anchors(&self) -> &[PortalAnchor] {
        &self.anchors
    }

    pub fn merge_radius(&self) -> f64 {
        self.merge_radius
    }

    fn nearest_index(&self, world: &str, pos: BlockPos) -> Option<(usize, f64)> {
        self.anchors
            .iter()
            .enumerate()
            .filter(|(_, a)| a.world == world)
            .map(|(i, a)| (i, weighted_distance(a.pos, pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Nearest anchor in `world` within `radius` weighted blocks.
    pub fn nearest(&self, world: &str, pos: BlockPos, radius: f64) -> Option<&PortalAnchor> {
        let (index, distance) = self.nearest_index(world, pos)?;
        (distance <= radius).then(|| &self.anchors[index])
    }

    pub fn register(&mut self, anchor: PortalAnchor) -> Registration {
        match self.nearest_index(&anchor.world, anchor.pos) {
            Some((_, d)) if d < self.duplicate_radius => Registration::Duplicate,
            Some((index, d)) if d <= self.merge_radius => {
                self.anchors[index] = anchor;
                Registration::Moved
            }
            _ => {
                self.anchors.push(anchor);
                Registration::Added
            }
        }
    }

    /// Drop anchors for which `keep` returns false. Returns how many were dropped.
    pub fn prune(&mut self, mut keep: impl FnMut(&PortalAnchor) -> bool) -> usize {
        let before = self.anchors.len();
        self.anchors.retain(|anchor| keep(anchor));
        before - self.anchors.len()
    }
}

/// Registry shared between event handlers and the periodic task.
#[derive(Debug, Clone, Default)]
pub struct SharedPortalRegistry {
    inner: Arc<Mutex<PortalRegistry>>,
}

impl SharedPortalRegistry {
    pub fn new(registry: PortalRegistry) -> Self {
        Self {
            inner: Arc::new(Mutex::new(registry)),
        }
    }

    /// Lock the registry. A poisoned lock is recovered: the registry holds
    /// no invariant a panicking writer could have broken halfway.
    pub fn lock(&self) -> MutexGuard<'_, PortalRegistry> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("Portal registry lock was poisoned; recovering");
            poisoned.into_inner()
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn register(&self, anchor: PortalAnchor) -> Registration {
        self.lock().register(anchor)
    }

    pub fn snapshot(&self) -> Vec<PortalAnchor> {
        self.lock().anchors().to_vec()
    }
}

/// Tunables for linking and building portals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalSearchConfig {
    pub frame: FrameSearch,
    /// Registry lookup radius in weighted blocks.
    pub link_radius: f64,
    pub duplicate_radius: f64,
    /// Horizontal scan radii, tried in order.
    pub scan_radii: Vec<i32>,
    /// Vertical half-window of the terrain scan.
    pub scan_y_window: i32,
    /// Frame material must lie this close to a scanned medium cell.
    pub medium_frame_reach: i32,
    /// Frame material must lie this close to a travel entrance.
    pub entrance_frame_reach: i32,
    /// Largest vertical offset tried for a new portal.
    pub build_search_offset: i32,
    /// Space kept free under the world ceiling when building.
    pub ceiling_margin: i32,
}

impl Default for PortalSearchConfig {
    fn default() -> Self {
        Self {
            frame: FrameSearch::default(),
            link_radius: 25.0,
            duplicate_radius: 5.0,
            scan_radii: vec![8, 16],
            scan_y_window: 10,
            medium_frame_reach: 2,
            entrance_frame_reach: 4,
            build_search_offset: 20,
            ceiling_margin: 10,
        }
    }
}

/// How a destination was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    Registry,
    Scan,
    Built,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortalLink {
    pub destination: Location,
    pub source: LinkSource,
}

/// Frame activation and destination resolution.
#[derive(Debug, Clone)]
pub struct PortalLinker {
    config: PortalSearchConfig,
    registry: SharedPortalRegistry,
}

impl PortalLinker {
    pub fn new(config: PortalSearchConfig, registry: SharedPortalRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &PortalSearchConfig {
        &self.config
    }

    pub fn registry(&self) -> &SharedPortalRegistry {
        &self.registry
    }

    /// Light the frame around `clicked`. Returns the frame when one was
    /// found and activated. Exactly one anchor is registered for it.
    pub fn try_activate(&self, world: &mut dyn HostWorld, clicked: BlockPos) -> Option<PortalFrame> {
        if world.material_at(clicked) != Some(FRAME_MATERIAL) {
            return None;
        }
        let frame = self.config.frame.find(world.as_region(), clicked)?;
        let filled = activate(world.as_region_mut(), &frame);
        let anchor = PortalAnchor::new(world.name(), frame.anchor_cell(), frame.orientation.axis());
        let registration = self.registry.register(anchor);
        info!(
            world = world.name(),
            corner = %frame.corner,
            width = frame.width,
            height = frame.height,
            filled,
            ?registration,
            "Warped portal activated"
        );
        Some(frame)
    }

    /// Whether a travel entrance belongs to a reinforced-deepslate portal.
    pub fn is_warped_portal(&self, region: &dyn VoxelRegion, entrance: BlockPos) -> bool {
        frame_nearby(region, entrance, self.config.entrance_frame_reach)
    }

    /// Resolve where a traveller arriving at `target` (same coordinates,
    /// destination world) should land.
    pub fn resolve_destination(&self, world: &mut dyn HostWorld, target: Location) -> PortalLink {
        let target_block = target.block();
        let (cx, cz) = target_block.chunk();
        for x in (cx - 1)..=(cx + 1) {
            for z in (cz - 1)..=(cz + 1) {
                let chunk = ChunkPos::new(x, z);
                if !world.is_chunk_loaded(chunk) {
                    world.load_chunk(chunk);
                }
            }
        }

        let known = self
            .registry
            .lock()
            .nearest(world.name(), target_block, self.config.link_radius)
            .cloned();
        if let Some(anchor) = known {
            debug!(world = world.name(), pos = %anchor.pos, "Linked through registry");
            return PortalLink {
                destination: anchor.arrival().with_angles_of(target),
                source: LinkSource::Registry,
            };
        }

        for &radius in &self.config.scan_radii {
            if let Some(cell) = self.scan_for_portal(world, target_block, radius) {
                let axis = world.voxel(cell.x, cell.y, cell.z).and_then(|v| v.axis);
                self.registry.register(PortalAnchor::new(
                    world.name(),
                    cell,
                    axis.unwrap_or(Axis::X),
                ));
                debug!(world = world.name(), pos = %cell, radius, "Linked through scan");
                return PortalLink {
                    destination: cell.center().with_angles_of(target),
                    source: LinkSource::Scan,
                };
            }
        }

        let corner = self.find_build_location(world, target_block);
        let destination = self.build_portal(world, corner).with_angles_of(target);
        info!(world = world.name(), corner = %corner, "Built linked portal");
        PortalLink {
            destination,
            source: LinkSource::Built,
        }
    }

    /// Portal medium with frame material nearby, within `radius` columns of
    /// `center` and the configured vertical window.
    pub fn scan_for_portal(
        &self,
        world: &dyn HostWorld,
        center: BlockPos,
        radius: i32,
    ) -> Option<BlockPos> {
        let bounds = world.info().bounds;
        let y_min = (center.y - self.config.scan_y_window).max(bounds.min_y);
        let y_max = (center.y + self.config.scan_y_window).min(bounds.max_y - 1);
        for x in (center.x - radius)..=(center.x + radius) {
            for z in (center.z - radius)..=(center.z + radius) {
                for y in y_min..=y_max {
                    if world.material(x, y, z) != Some(PORTAL_MEDIUM) {
                        continue;
                    }
                    let cell = BlockPos::new(x, y, z);
                    if frame_nearby(world.as_region(), cell, self.config.medium_frame_reach) {
                        return Some(cell);
                    }
                }
            }
        }
        None
    }

    /// Corner for a new portal near `target`: offsets 0, -1, +1, -2, +2 and
    /// so on, each needing safe ground and a clear footprint. Falls back to
    /// one above the highest block without checks.
    pub fn find_build_location(&self, world: &dyn HostWorld, target: BlockPos) -> BlockPos {
        let bounds = world.info().bounds;
        for offset in 0..=self.config.build_search_offset {
            for sign in [-1, 1] {
                let y = target.y + offset * sign;
                if y < bounds.min_y || y > bounds.max_y - self.config.ceiling_margin {
                    continue;
                }
                let corner = BlockPos::new(target.x, y, target.z);
                if Self::is_safe_for_portal(world.as_region(), corner) {
                    return corner;
                }
            }
        }
        let top = world
            .highest_block_y(target.x, target.z)
            .unwrap_or(bounds.min_y);
        BlockPos::new(target.x, top + 1, target.z)
    }

    /// Solid, non-hazard ground below and a replaceable 4×5 footprint.
    pub fn is_safe_for_portal(region: &dyn VoxelRegion, corner: BlockPos) -> bool {
        let below = region.material(corner.x, corner.y - 1, corner.z);
        if !below.is_some_and(|m| m.is_solid() && !m.is_hazard()) {
            return false;
        }
        (0..BUILT_WIDTH).all(|dx| {
            (0..BUILT_HEIGHT).all(|dy| {
                region
                    .material(corner.x + dx, corner.y + dy, corner.z)
                    .is_some_and(Material::is_portal_replaceable)
            })
        })
    }

    /// Build a lit 4×5 frame along X at `corner` and register it. Returns
    /// the arrival point.
    pub fn build_portal(&self, world: &mut dyn HostWorld, corner: BlockPos) -> Location {
        let frame = PortalFrame {
            corner,
            orientation: FrameOrientation::AlongX,
            width: BUILT_WIDTH,
            height: BUILT_HEIGHT,
        };
        let border: Vec<BlockPos> = frame.border().collect();
        for p in border {
            world.set_material(p.x, p.y, p.z, FRAME_MATERIAL);
        }
        activate(world.as_region_mut(), &frame);
        self.registry.register(PortalAnchor::new(
            world.name(),
            frame.anchor_cell(),
            Axis::X,
        ));
        Location::new(
            corner.x as f64 + BUILT_WIDTH as f64 / 2.0,
            corner.y as f64 + 1.0,
            corner.z as f64 + 0.5,
        )
    }

    /// Load the chunks holding registered anchors so linked portals stay
    /// resolvable. Returns how many chunks were loaded.
    pub fn preload(&self, host: &mut dyn Host) -> usize {
        let mut loaded = 0;
        for anchor in self.registry.snapshot() {
            let Some(world) = host.world_mut(&anchor.world) else {
                continue;
            };
            let (cx, cz) = anchor.pos.chunk();
            let chunk = ChunkPos::new(cx, cz);
            if !world.is_chunk_loaded(chunk) && world.load_chunk(chunk) {
                loaded += 1;
            }
        }
        loaded
    }

    /// Drop anchors whose cell no longer holds portal medium. Anchors in
    /// missing worlds or unloaded chunks are kept.
    pub fn prune(&self, host: &dyn Host) -> usize {
        let dropped = self.registry.lock().prune(|anchor| {
            let Some(world) = host.world(&anchor.world) else {
                return true;
            };
            let (cx, cz) = anchor.pos.chunk();
            if !world.is_chunk_loaded(ChunkPos::new(cx, cz)) {
                return true;
            }
            world.material_at(anchor.pos) == Some(PORTAL_MEDIUM)
        });
        if dropped > 0 {
            debug!(dropped, "Pruned stale portal anchors");
        }
        dropped
    }
}
