//! Channel state reconciliation and dispatch for a lighting desk.
//!
//! [`DeskSession`] holds what the operator has set: raw channel levels, the
//! grand master, the blackout override and the preset bank. [`DispatchLoop`]
//! turns that state into output values on every tick and is the only thing
//! that talks to the [`DeviceLink`].

use anyhow::{Context, Result};
use device_link::DeviceLink;
use shared::persistence::PresetPersistence;
use tracing::info;

pub mod blackout;
pub mod channel;
pub mod config;
pub mod dispatch;
pub mod grand_master;
pub mod mirror;
pub mod preset;
pub mod scheduler;
pub mod session;

pub use blackout::{BlackoutEdge, BlackoutOverride};
pub use channel::ChannelState;
pub use config::DeskConfig;
pub use dispatch::{DispatchLoop, DispatchSnapshot, TickReport};
pub use grand_master::GrandMaster;
pub use mirror::NumericMirror;
pub use preset::{PresetError, PresetSlot, PresetStore, PresetView};
pub use scheduler::{IntervalTicks, TickSource};
pub use session::DeskSession;

/// Flushes presets and releases the output link. Both are attempted even if
/// the first one fails.
pub fn shutdown<L: DeviceLink>(
    session: &DeskSession,
    dispatch: DispatchLoop<L>,
    persistence: &impl PresetPersistence,
) -> Result<()> {
    let committed = session
        .commit_presets(persistence)
        .context("failed to save presets on shutdown");
    let released = dispatch
        .shutdown()
        .map(|_| ())
        .context("failed to close output link on shutdown");

    committed?;
    released?;
    info!("desk shut down");
    Ok(())
}
