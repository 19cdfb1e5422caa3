//! Core plugin implementation for the stat overlay.
//!
//! This module contains the main [`StatOverlayPlugin`] and its setup logic.

use bevy::{
    app::{App, Plugin, PostUpdate, PreUpdate, Startup},
    diagnostic::SystemInformationDiagnosticsPlugin,
    ecs::system::Commands,
    math::Vec2,
    prelude::IntoScheduleConfigs,
};

use crate::{
    paint_overlay, paint_pending, sampling_registered, sync_pixel_ratio, tick_sampling_window,
    HostEnvironment, MemorySource, MetricSnapshot, ProcessMemoryAccountant, RenderCounters,
    ReportedMemory, SamplingWindow, StatOverlay, StatOverlayCommandsExt, StatOverlaySettings,
    ViewModel,
};

/// Main plugin for the stat overlay.
///
/// Registers the counters, sampling window and overlay state, plus the systems
/// that tick the window and paint the overlay. Nothing is sampled until the
/// overlay is shown or enabled, unless `show_at` is set.
///
/// # Example
///
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_stat_overlay::StatOverlayPlugin;
///
/// let mut app = App::new();
/// app.add_plugins(DefaultPlugins);
/// app.add_plugins(StatOverlayPlugin {
///     show_at: Some(Vec2::new(8.0, 8.0)),
///     ..default()
/// });
/// app.run();
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatOverlayPlugin {
    /// Show the overlay at this logical position on startup
    pub show_at: Option<Vec2>,
    /// Read CPU memory from the process instead of [`ReportedMemory`]
    pub process_memory: bool,
}

impl Plugin for StatOverlayPlugin {
    fn build(&self, app: &mut App) {
        if self.process_memory && !app.is_plugin_added::<SystemInformationDiagnosticsPlugin>() {
            app.add_plugins(SystemInformationDiagnosticsPlugin);
        }

        app.init_resource::<StatOverlaySettings>()
            .init_resource::<HostEnvironment>()
            .init_resource::<RenderCounters>()
            .init_resource::<SamplingWindow>()
            .init_resource::<MetricSnapshot>()
            .init_resource::<ViewModel>()
            .init_resource::<ReportedMemory>()
            .init_resource::<MemorySource>()
            .init_resource::<StatOverlay>()
            .add_systems(PreUpdate, sync_pixel_ratio)
            .add_systems(
                PostUpdate,
                (
                    tick_sampling_window.run_if(sampling_registered),
                    paint_overlay.run_if(paint_pending),
                )
                    .chain(),
            );

        if self.process_memory {
            app.world_mut()
                .resource_mut::<MemorySource>()
                .set(ProcessMemoryAccountant);
        }

        if let Some(at) = self.show_at {
            app.add_systems(Startup, move |mut commands: Commands| {
                commands.show_stat_overlay(at.x, at.y);
            });
        }
    }
}
