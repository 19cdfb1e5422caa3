//! The overlay backend interface shared by both renderers.
//!
//! A backend owns whatever it needs to put the metric table on screen. Painting
//! is split in two halves: [`OverlayBackend::paint`] only touches backend-owned
//! state, [`OverlayBackend::present`] pushes that state into the Bevy world.

use std::sync::Arc;

use bevy::{
    ecs::{observer::Observer, system::Commands, world::World},
    log::debug,
    math::Vec2,
    picking::events::{Click, Pointer},
    prelude::{Entity, Trigger},
};

use crate::{
    config::StatOverlaySettings, immediate::ImmediateSurfaceBackend, retained::RetainedNodeBackend,
    snapshot::MetricSnapshot, view_model::ViewModel,
};

/// Callback run when the overlay is clicked.
pub type OverlayClickHandler = Arc<dyn Fn(&mut Commands) + Send + Sync>;

/// Which renderer draws the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// CPU raster surface uploaded as an image
    ImmediateSurface,
    /// UI node tree with two text blocks
    RetainedNodes,
}

impl BackendKind {
    /// Construct an unattached backend of this kind.
    pub fn create(self, settings: &StatOverlaySettings) -> Box<dyn OverlayBackend> {
        match self {
            BackendKind::ImmediateSurface => Box::new(ImmediateSurfaceBackend::new(settings.clone())),
            BackendKind::RetainedNodes => Box::new(RetainedNodeBackend::new(settings.clone())),
        }
    }
}

/// Where and at which scale the overlay is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttachContext {
    /// Top-left corner in logical pixels
    pub origin: Vec2,
    /// Device pixel ratio the surface is sized with
    pub pixel_ratio: f32,
}

/// A renderer able to display a [`ViewModel`] filled from a [`MetricSnapshot`].
pub trait OverlayBackend: Send + Sync + 'static {
    fn kind(&self) -> BackendKind;

    /// Put the overlay into the world at `ctx.origin`, laid out for `view`.
    ///
    /// Called on every `show`. Attaching an already attached backend moves it.
    fn attach(&mut self, world: &mut World, ctx: AttachContext, view: &ViewModel);

    /// Take the overlay out of the world. Backends whose nodes outlive `hide`
    /// leave them in place.
    fn detach(&mut self, world: &mut World);

    /// Draw `snapshot` into backend-owned state.
    ///
    /// `first_paint` asks for a full redraw including static titles.
    fn paint(&mut self, snapshot: &MetricSnapshot, view: &ViewModel, first_paint: bool);

    /// Sync the painted state into assets and components.
    fn present(&mut self, world: &mut World);

    /// Route clicks on the overlay to `handler`, replacing any previous one.
    fn bind_click(&mut self, world: &mut World, handler: OverlayClickHandler);
}

/// Pixel height of a table of `rows` rows at `pixel_ratio`.
pub fn panel_height(rows: usize, font_size: f32, pixel_ratio: f32) -> f32 {
    pixel_ratio * (rows as f32 * font_size + 3.0 * pixel_ratio) + 4.0
}

/// Spawn an observer that runs `handler` when `target` is clicked.
pub(crate) fn spawn_click_observer(
    world: &mut World,
    target: Entity,
    handler: OverlayClickHandler,
) -> Entity {
    let observer = Observer::new(move |_trigger: Trigger<Pointer<Click>>, mut commands: Commands| {
        handler(&mut commands);
    })
    .with_entity(target);
    let id = world.spawn(observer).id();
    debug!("stat overlay click observer {id} bound to {target}");
    id
}

/// Despawn `entity` if it is still alive.
pub(crate) fn despawn_if_alive(world: &mut World, entity: Option<Entity>) {
    if let Some(entity) = entity {
        if let Ok(entity_mut) = world.get_entity_mut(entity) {
            entity_mut.despawn();
        }
    }
}
