//! Tick-replay harness for determinism tests.
//!
//! A replay steps a small simulation for a fixed number of ticks and
//! captures a serializable snapshot after each step. Running the same replay
//! twice from freshly built state must produce identical canonical JSON.

use crate::snapshot::{canonical_value, first_divergence};
use anyhow::Result;
use serde::Serialize;
use warped_core::SimTick;

/// Configuration for a replay.
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Human-readable name, used in error messages.
    pub name: String,
    /// Number of ticks to step (the replay also holds the initial frame at tick 0).
    pub ticks: u64,
}

/// Single snapshot frame captured at a given tick.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayFrame<S> {
    /// Tick number.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Step `state` for `config.ticks` ticks and collect a frame per tick.
///
/// Captures the initial snapshot at tick 0, then steps `config.ticks` times,
/// capturing a snapshot after each step (so the result holds `ticks + 1` frames).
pub fn record_replay<State, Snapshot, StepFn, SnapFn>(
    config: &ReplayConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Vec<ReplayFrame<Snapshot>>
where
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(config.ticks as usize + 1);

    let mut tick = SimTick::ZERO;
    frames.push(ReplayFrame {
        tick: tick.0,
        snapshot: snapshot(tick, &state),
    });

    for _ in 0..config.ticks {
        step(tick, &mut state);
        tick = tick.advance(1);
        frames.push(ReplayFrame {
            tick: tick.0,
            snapshot: snapshot(tick, &state),
        });
    }

    frames
}

/// Run the replay twice from `make_state` and fail on the first tick whose
/// snapshots differ, naming the path inside the snapshot that diverged.
pub fn assert_deterministic_replay<State, Snapshot, MakeFn, StepFn, SnapFn>(
    config: &ReplayConfig,
    mut make_state: MakeFn,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Result<()>
where
    Snapshot: Serialize,
    MakeFn: FnMut() -> State,
    StepFn: FnMut(SimTick, &mut State),
    SnapFn: FnMut(SimTick, &State) -> Snapshot,
{
    let first = record_replay(config, make_state(), &mut step, &mut snapshot);
    let second = record_replay(config, make_state(), &mut step, &mut snapshot);

    for (a, b) in first.iter().zip(&second) {
        let (left, right) = (canonical_value(&a.snapshot)?, canonical_value(&b.snapshot)?);
        if let Some(path) = first_divergence(&left, &right) {
            anyhow::bail!(
                "Replay {} diverged at tick {} ({path})",
                config.name,
                a.tick
            );
        }
    }
    Ok(())
}
