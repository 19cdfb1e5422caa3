//! Show / hide / enable / clear and click binding.
//!
//! All state lives in the [`StatOverlay`] resource. The world-level functions
//! here are the primary API; [`StatOverlayCommandsExt`] queues the same calls
//! from ordinary systems.

use std::sync::Arc;

use bevy::{
    ecs::{
        system::Commands,
        world::{Mut, World},
    },
    log::{debug, info},
    math::Vec2,
    prelude::Resource,
    time::{Real, Time},
};

use crate::{
    backend::{AttachContext, BackendKind, OverlayBackend, OverlayClickHandler},
    config::StatOverlaySettings,
    counters::RenderCounters,
    environment::HostEnvironment,
    sampling::SamplingWindow,
    snapshot::MetricSnapshot,
    view_model::ViewModel,
};

/// Lifecycle state of the overlay.
///
/// The backend is created on the first `show` and kept for the rest of the
/// app's life.
#[derive(Resource, Default)]
pub struct StatOverlay {
    sampling: bool,
    visible: bool,
    pending_paint: bool,
    paints: u64,
    origin: Option<Vec2>,
    backend: Option<Box<dyn OverlayBackend>>,
    click_handler: Option<OverlayClickHandler>,
}

impl StatOverlay {
    /// The sampling tick is registered.
    pub fn is_sampling(&self) -> bool {
        self.sampling
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Kind of the backend, once one has been created.
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(|backend| backend.kind())
    }

    /// Number of paints performed so far, first paints included.
    pub fn paint_count(&self) -> u64 {
        self.paints
    }

    pub fn has_click_handler(&self) -> bool {
        self.click_handler.is_some()
    }

    /// Logical position passed to the last `show`.
    pub fn origin(&self) -> Option<Vec2> {
        self.origin
    }

    /// A closed window is waiting to be painted.
    pub fn is_paint_pending(&self) -> bool {
        self.pending_paint
    }

    pub(crate) fn request_paint(&mut self) {
        if self.visible {
            self.pending_paint = true;
        }
    }

    /// Register the tick: open a fresh window at "now" with zeroed counters.
    fn start_sampling(&mut self, world: &mut World) {
        if self.sampling {
            return;
        }
        let now = world
            .get_resource::<Time<Real>>()
            .map(|time| time.elapsed())
            .unwrap_or_default();
        let length = world.resource::<StatOverlaySettings>().window_length;

        let mut window = world.resource_mut::<SamplingWindow>();
        window.set_length(length);
        window.restart(now);
        // Counts gathered while no window was open must not leak into the first one.
        if let Some(mut counters) = world.get_resource_mut::<RenderCounters>() {
            counters.reset_window_counters();
        }
        self.sampling = true;
    }
}

fn ensure_resources(world: &mut World) {
    world.init_resource::<StatOverlay>();
    world.init_resource::<StatOverlaySettings>();
    world.init_resource::<HostEnvironment>();
    world.init_resource::<SamplingWindow>();
    world.init_resource::<RenderCounters>();
    world.init_resource::<MetricSnapshot>();
    world.init_resource::<ViewModel>();
}

/// Show the overlay with its top-left corner at logical (`x`, `y`).
///
/// Creates the backend on first use, rebuilds the view model for the current
/// render mode, starts sampling and paints the current snapshot right away.
pub fn show(world: &mut World, x: f32, y: f32) {
    ensure_resources(world);

    let settings = world.resource::<StatOverlaySettings>().clone();
    let env = world.resource::<HostEnvironment>().clone();
    let view = ViewModel::build(env.render_mode);
    world.insert_resource(view.clone());
    let snapshot = world.resource::<MetricSnapshot>().clone();

    world.resource_scope(|world, mut overlay: Mut<StatOverlay>| {
        let overlay = &mut *overlay;
        let origin = Vec2::new(x, y);

        let backend = overlay.backend.get_or_insert_with(|| {
            let kind = env.select_backend();
            info!("stat overlay using {kind:?} backend");
            kind.create(&settings)
        });
        backend.attach(
            world,
            AttachContext {
                origin,
                pixel_ratio: env.effective_pixel_ratio(),
            },
            &view,
        );
        if let Some(handler) = &overlay.click_handler {
            backend.bind_click(world, handler.clone());
        }

        backend.paint(&snapshot, &view, true);
        backend.present(world);

        overlay.paints += 1;
        overlay.pending_paint = false;
        overlay.visible = true;
        overlay.origin = Some(origin);
        overlay.start_sampling(world);
    });

    info!("stat overlay shown at ({x}, {y})");
}

/// Stop sampling and take the overlay off screen.
///
/// The raster surface is detached; retained nodes stay where they are.
pub fn hide(world: &mut World) {
    if !world.contains_resource::<StatOverlay>() {
        return;
    }
    world.resource_scope(|world, mut overlay: Mut<StatOverlay>| {
        overlay.sampling = false;
        overlay.visible = false;
        overlay.pending_paint = false;
        if let Some(backend) = overlay.backend.as_mut() {
            backend.detach(world);
        }
    });
    info!("stat overlay hidden");
}

/// Start sampling without showing anything.
///
/// Counters keep being averaged and reset every window and the
/// [`MetricSnapshot`] resource keeps updating.
pub fn enable(world: &mut World) {
    ensure_resources(world);
    world.resource_scope(|world, mut overlay: Mut<StatOverlay>| {
        overlay.start_sampling(world);
    });
    debug!("stat overlay sampling enabled");
}

/// Zero the counted render counters immediately.
pub fn clear(world: &mut World) {
    if let Some(mut counters) = world.get_resource_mut::<RenderCounters>() {
        counters.reset_window_counters();
    }
}

/// Run `handler` whenever the overlay is clicked.
///
/// Binding before the first `show` is allowed; the handler is applied once the
/// backend exists.
pub fn set_click_handler<F>(world: &mut World, handler: F)
where
    F: Fn(&mut Commands) + Send + Sync + 'static,
{
    world.init_resource::<StatOverlay>();
    let handler: OverlayClickHandler = Arc::new(handler);
    world.resource_scope(|world, mut overlay: Mut<StatOverlay>| {
        overlay.click_handler = Some(handler.clone());
        match overlay.backend.as_mut() {
            Some(backend) => backend.bind_click(world, handler),
            None => debug!("stat overlay click handler stored until the overlay is shown"),
        }
    });
}

/// Paint the latest snapshot if a closed window is waiting.
pub(crate) fn repaint(world: &mut World) {
    if !world.contains_resource::<StatOverlay>() {
        return;
    }
    let Some(snapshot) = world.get_resource::<MetricSnapshot>().cloned() else {
        return;
    };
    let Some(view) = world.get_resource::<ViewModel>().cloned() else {
        return;
    };

    world.resource_scope(|world, mut overlay: Mut<StatOverlay>| {
        let overlay = &mut *overlay;
        if !overlay.pending_paint {
            return;
        }
        overlay.pending_paint = false;
        let Some(backend) = overlay.backend.as_mut() else {
            return;
        };
        backend.paint(&snapshot, &view, false);
        backend.present(world);
        overlay.paints += 1;
    });
}

/// Queue lifecycle calls from a system.
///
/// # Example
/// ```rust
/// use bevy::prelude::*;
/// use bevy_stat_overlay::StatOverlayCommandsExt;
///
/// fn open_stats(mut commands: Commands) {
///     commands.show_stat_overlay(8.0, 8.0);
///     commands.set_stat_overlay_click_handler(|_commands| info!("stats clicked"));
/// }
/// ```
pub trait StatOverlayCommandsExt {
    fn show_stat_overlay(&mut self, x: f32, y: f32);
    fn hide_stat_overlay(&mut self);
    fn enable_stat_overlay(&mut self);
    fn clear_stat_counters(&mut self);
    fn set_stat_overlay_click_handler<F>(&mut self, handler: F)
    where
        F: Fn(&mut Commands) + Send + Sync + 'static;
}

impl StatOverlayCommandsExt for Commands<'_, '_> {
    fn show_stat_overlay(&mut self, x: f32, y: f32) {
        self.queue(move |world: &mut World| show(world, x, y));
    }

    fn hide_stat_overlay(&mut self) {
        self.queue(hide);
    }

    fn enable_stat_overlay(&mut self) {
        self.queue(enable);
    }

    fn clear_stat_counters(&mut self) {
        self.queue(clear);
    }

    fn set_stat_overlay_click_handler<F>(&mut self, handler: F)
    where
        F: Fn(&mut Commands) + Send + Sync + 'static,
    {
        self.queue(move |world: &mut World| set_click_handler(world, handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::HostSandbox;

    #[test]
    fn show_creates_backend_once_and_paints() {
        let mut world = World::new();
        show(&mut world, 10.0, 10.0);

        let overlay = world.resource::<StatOverlay>();
        assert_eq!(overlay.backend_kind(), Some(BackendKind::ImmediateSurface));
        assert!(overlay.is_visible());
        assert!(overlay.is_sampling());
        assert_eq!(overlay.paint_count(), 1);

        // Environment changes after creation do not swap the backend.
        world.resource_mut::<HostEnvironment>().native = true;
        show(&mut world, 0.0, 0.0);
        let overlay = world.resource::<StatOverlay>();
        assert_eq!(overlay.backend_kind(), Some(BackendKind::ImmediateSurface));
        assert_eq!(overlay.paint_count(), 2);
    }

    #[test]
    fn sandboxed_host_gets_retained_backend() {
        let mut world = World::new();
        world.insert_resource(HostEnvironment {
            sandbox: Some(HostSandbox::MiniGame),
            ..Default::default()
        });
        show(&mut world, 0.0, 0.0);
        assert_eq!(
            world.resource::<StatOverlay>().backend_kind(),
            Some(BackendKind::RetainedNodes)
        );
    }

    #[test]
    fn enable_samples_without_backend_or_visibility() {
        let mut world = World::new();
        enable(&mut world);

        let overlay = world.resource::<StatOverlay>();
        assert!(overlay.is_sampling());
        assert!(!overlay.is_visible());
        assert_eq!(overlay.backend_kind(), None);
        assert!(world.resource::<ViewModel>().is_empty());
    }

    #[test]
    fn hide_stops_sampling_and_drops_pending_paint() {
        let mut world = World::new();
        show(&mut world, 0.0, 0.0);
        world.resource_mut::<StatOverlay>().request_paint();

        hide(&mut world);
        let overlay = world.resource::<StatOverlay>();
        assert!(!overlay.is_sampling());
        assert!(!overlay.is_visible());
        assert!(!overlay.is_paint_pending());
    }

    #[test]
    fn hidden_overlay_ignores_paint_requests() {
        let mut world = World::new();
        enable(&mut world);
        world.resource_mut::<StatOverlay>().request_paint();
        assert!(!world.resource::<StatOverlay>().is_paint_pending());
    }

    #[test]
    fn clear_zeroes_counted_subset() {
        let mut world = World::new();
        world.init_resource::<RenderCounters>();
        {
            let mut counters = world.resource_mut::<RenderCounters>();
            counters.add_render_batches(5);
            counters.set_sprite_count(3);
        }
        clear(&mut world);

        let counters = world.resource::<RenderCounters>();
        assert_eq!(counters.get(crate::Counter::RenderBatches), 0);
        assert_eq!(counters.sprite_count(), 3);
    }

    #[test]
    fn click_handler_is_deferred_until_show() {
        let mut world = World::new();
        set_click_handler(&mut world, |_| {});
        let overlay = world.resource::<StatOverlay>();
        assert!(overlay.has_click_handler());
        assert_eq!(overlay.backend_kind(), None);

        show(&mut world, 0.0, 0.0);
        assert!(world.resource::<StatOverlay>().has_click_handler());
    }

    #[test]
    fn starting_sampling_discards_counts_from_before() {
        let mut world = World::new();
        world.init_resource::<RenderCounters>();
        world.resource_mut::<RenderCounters>().add_render_batches(200);

        enable(&mut world);
        assert_eq!(
            world.resource::<RenderCounters>().get(crate::Counter::RenderBatches),
            0
        );

        // Already sampling: show keeps the running window's counts.
        world.resource_mut::<RenderCounters>().add_render_batches(5);
        show(&mut world, 0.0, 0.0);
        assert_eq!(
            world.resource::<RenderCounters>().get(crate::Counter::RenderBatches),
            5
        );
    }

    #[test]
    fn restart_only_when_not_already_sampling() {
        let mut world = World::new();
        enable(&mut world);
        world
            .resource_mut::<SamplingWindow>()
            .restart(std::time::Duration::from_secs(3));

        // Already registered: the window is left alone.
        show(&mut world, 0.0, 0.0);
        assert_eq!(
            world.resource::<SamplingWindow>().window_start(),
            std::time::Duration::from_secs(3)
        );
    }
}
