//! Bevy systems driving the stat overlay.
//!
//! - `tick_sampling_window`: counts frames and closes windows while sampling
//! - `paint_overlay`: paints a closed window onto the active backend
//! - `sync_pixel_ratio`: follows the primary window's scale factor

use bevy::{
    diagnostic::DiagnosticsStore,
    ecs::{
        query::With,
        system::{Query, Res, ResMut},
        world::World,
    },
    log::debug,
    time::{Real, Time},
    window::{PrimaryWindow, Window},
};

use crate::{
    config::StatOverlaySettings,
    counters::RenderCounters,
    environment::HostEnvironment,
    lifecycle::{repaint, StatOverlay},
    memory::{MemorySampleContext, MemorySource, ReportedMemory},
    sampling::SamplingWindow,
    snapshot::MetricSnapshot,
};

/// Run condition: the sampling tick is registered.
pub fn sampling_registered(overlay: Option<Res<StatOverlay>>) -> bool {
    overlay.is_some_and(|overlay| overlay.is_sampling())
}

/// Run condition: a closed window is waiting to be painted.
pub fn paint_pending(overlay: Option<Res<StatOverlay>>) -> bool {
    overlay.is_some_and(|overlay| overlay.is_paint_pending())
}

/// Advance the sampling window by one frame.
///
/// Closing a window publishes a new [`MetricSnapshot`], resets the counted
/// render counters, and requests a paint when the overlay is visible.
#[allow(clippy::too_many_arguments)]
pub fn tick_sampling_window(
    time: Res<Time<Real>>,
    mut overlay: ResMut<StatOverlay>,
    mut window: ResMut<SamplingWindow>,
    mut counters: ResMut<RenderCounters>,
    mut snapshot: ResMut<MetricSnapshot>,
    mut memory: ResMut<MemorySource>,
    reported: Res<ReportedMemory>,
    diagnostics: Option<Res<DiagnosticsStore>>,
) {
    let backend = overlay.backend_kind();
    let closed = window.tick(time.elapsed(), &mut counters, backend, || {
        memory.sample(MemorySampleContext {
            diagnostics: diagnostics.as_deref(),
            reported: *reported,
        })
    });
    let Some(closed) = closed else {
        return;
    };

    debug!(
        "stat window closed: fps {} batches {} shaders {}",
        closed.fps, closed.render_batches, closed.shader_calls
    );
    *snapshot = closed;
    overlay.request_paint();
}

/// Paint the latest snapshot onto the active backend.
pub fn paint_overlay(world: &mut World) {
    repaint(world);
}

/// Copy the primary window's scale factor into [`HostEnvironment`].
pub fn sync_pixel_ratio(
    settings: Res<StatOverlaySettings>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut env: ResMut<HostEnvironment>,
) {
    if !settings.follow_window_scale {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let ratio = window.scale_factor();
    if env.pixel_ratio != ratio {
        env.pixel_ratio = ratio;
    }
}
