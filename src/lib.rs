//! Windowed render statistics with an on-screen overlay for Bevy.
//!
//! The host renderer bumps [`RenderCounters`] during the frame. While the
//! overlay is shown (or sampling is enabled) a `PostUpdate` system counts
//! frames, and roughly once per second closes a window: counters are averaged
//! per frame into a [`MetricSnapshot`], reset, and painted by whichever
//! backend the host environment allows.
//!
//! ```no_run
//! use bevy::prelude::*;
//! use bevy_stat_overlay::{RenderCounters, StatOverlayCommandsExt, StatOverlayPlugin};
//!
//! fn open(mut commands: Commands) {
//!     commands.show_stat_overlay(8.0, 8.0);
//! }
//!
//! fn draw(mut counters: ResMut<RenderCounters>) {
//!     counters.add_render_batches(3);
//!     counters.add_shader_calls(2);
//! }
//!
//! App::new()
//!     .add_plugins((DefaultPlugins, StatOverlayPlugin::default()))
//!     .add_systems(Startup, open)
//!     .add_systems(Update, draw)
//!     .run();
//! ```

mod backend;
mod config;
mod constants;
mod counters;
mod environment;
mod immediate;
mod lifecycle;
mod memory;
mod plugin;
mod render;
mod retained;
mod sampling;
mod snapshot;
mod systems;
mod view_model;

pub use backend::{panel_height, AttachContext, BackendKind, OverlayBackend, OverlayClickHandler};
pub use config::{ImmediateSettings, RetainedSettings, StatOverlaySettings};
pub use constants::*;
pub use counters::{Counter, RenderCounters};
pub use environment::{HostEnvironment, HostSandbox, RenderMode};
pub use immediate::{paint_surface, ImmediateLayout, ImmediateSurfaceBackend};
pub use lifecycle::{
    clear, enable, hide, set_click_handler, show, StatOverlay, StatOverlayCommandsExt,
};
pub use memory::{
    MemoryAccountant, MemorySample, MemorySampleContext, MemorySource, ProcessMemoryAccountant,
    ReportedMemory, ReportedMemoryAccountant, StatOverlayAppExt,
};
pub use plugin::StatOverlayPlugin;
pub use render::{glyph_scale_for, DrawContext, PixelCanvas};
pub use retained::RetainedNodeBackend;
pub use sampling::SamplingWindow;
pub use snapshot::{
    canvas_label, ceil_average, fps_label, round_average, sprite_label, window_fps,
    MetricSnapshot,
};
pub use systems::{
    paint_overlay, paint_pending, sampling_registered, sync_pixel_ratio, tick_sampling_window,
};
pub use view_model::{
    format_value, MetricDescriptor, MetricField, MetricUnit, MetricValue, ViewModel,
};
