//! Retained UI-node backend, used where a raster surface cannot be attached.
//!
//! One container node holds two `Text` leaves: the label block and the value
//! block. Rows are newline separated.

use bevy::{
    ecs::world::World,
    log::debug,
    prelude::{default, ChildOf, Entity, Name},
    text::{TextColor, TextFont},
    ui::{widget::Text, BackgroundColor, GlobalZIndex, Node, PositionType, Val},
};

use crate::{
    backend::{
        despawn_if_alive, panel_height, spawn_click_observer, AttachContext, BackendKind,
        OverlayBackend, OverlayClickHandler,
    },
    config::StatOverlaySettings,
    constants::RETAINED_TEXT_INSET,
    snapshot::MetricSnapshot,
    view_model::ViewModel,
};

/// Backend drawing the table with `bevy_ui` nodes.
pub struct RetainedNodeBackend {
    settings: StatOverlaySettings,
    container: Option<Entity>,
    labels: Option<Entity>,
    values: Option<Entity>,
    label_text: String,
    value_text: String,
    observer: Option<Entity>,
    dirty: bool,
}

impl RetainedNodeBackend {
    pub fn new(settings: StatOverlaySettings) -> Self {
        Self {
            settings,
            container: None,
            labels: None,
            values: None,
            label_text: String::new(),
            value_text: String::new(),
            observer: None,
            dirty: false,
        }
    }

    pub fn container(&self) -> Option<Entity> {
        self.container
    }

    pub fn label_text(&self) -> &str {
        &self.label_text
    }

    pub fn value_text(&self) -> &str {
        &self.value_text
    }

    fn spawn_tree(&mut self, world: &mut World) -> Entity {
        let retained = &self.settings.retained;
        let container = world
            .spawn((
                Name::new("StatOverlayPanel"),
                Node {
                    position_type: PositionType::Absolute,
                    ..default()
                },
                BackgroundColor(retained.background),
                GlobalZIndex(self.settings.z_index),
            ))
            .id();

        let labels = world
            .spawn((
                Text::new(""),
                TextFont::default(),
                TextColor(retained.text_color),
                Node {
                    position_type: PositionType::Absolute,
                    ..default()
                },
                ChildOf(container),
            ))
            .id();
        let values = world
            .spawn((
                Text::new(""),
                TextFont::default(),
                TextColor(retained.text_color),
                Node {
                    position_type: PositionType::Absolute,
                    ..default()
                },
                ChildOf(container),
            ))
            .id();

        self.container = Some(container);
        self.labels = Some(labels);
        self.values = Some(values);
        container
    }

    fn layout_tree(&self, world: &mut World, ctx: AttachContext, rows: usize) {
        let ratio = ctx.pixel_ratio;
        let font_size = self.settings.font_size * ratio;

        if let Some(mut node) = self.container.and_then(|e| world.get_mut::<Node>(e)) {
            node.left = Val::Px(ctx.origin.x);
            node.top = Val::Px(ctx.origin.y);
            node.width = Val::Px(self.settings.retained.width * ratio);
            node.height = Val::Px(panel_height(rows, self.settings.font_size, ratio));
        }

        let columns = [
            (self.labels, RETAINED_TEXT_INSET),
            (self.values, self.settings.retained.value_column * ratio),
        ];
        for (entity, left) in columns {
            let Some(entity) = entity else {
                continue;
            };
            if let Some(mut node) = world.get_mut::<Node>(entity) {
                node.left = Val::Px(left);
                node.top = Val::Px(RETAINED_TEXT_INSET);
            }
            if let Some(mut font) = world.get_mut::<TextFont>(entity) {
                font.font_size = font_size;
            }
        }
    }
}

impl OverlayBackend for RetainedNodeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RetainedNodes
    }

    fn attach(&mut self, world: &mut World, ctx: AttachContext, view: &ViewModel) {
        let alive = self.container.is_some_and(|e| world.get_entity(e).is_ok());
        if !alive {
            let container = self.spawn_tree(world);
            debug!("stat overlay panel {container} spawned");
        }
        self.layout_tree(world, ctx, view.row_count());

        self.label_text = view.title_block();
        self.dirty = true;
    }

    fn detach(&mut self, _world: &mut World) {
        // Nodes stay in the tree after hide; only sampling stops.
    }

    fn paint(&mut self, snapshot: &MetricSnapshot, view: &ViewModel, _first_paint: bool) {
        self.value_text = view.value_block(snapshot);
        self.dirty = true;
    }

    fn present(&mut self, world: &mut World) {
        if !self.dirty {
            return;
        }
        for (entity, text) in [(self.labels, &self.label_text), (self.values, &self.value_text)] {
            let Some(mut current) = entity.and_then(|e| world.get_mut::<Text>(e)) else {
                continue;
            };
            if current.0 != *text {
                current.0.clone_from(text);
            }
        }
        self.dirty = false;
    }

    fn bind_click(&mut self, world: &mut World, handler: OverlayClickHandler) {
        despawn_if_alive(world, self.observer.take());
        let Some(container) = self.container else {
            return;
        };
        self.observer = Some(spawn_click_observer(world, container, handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::RenderMode;
    use bevy::math::Vec2;

    fn attach(world: &mut World, backend: &mut RetainedNodeBackend, view: &ViewModel, ratio: f32) {
        backend.attach(
            world,
            AttachContext {
                origin: Vec2::new(30.0, 40.0),
                pixel_ratio: ratio,
            },
            view,
        );
    }

    fn text_of(world: &World, entity: Option<Entity>) -> String {
        entity
            .and_then(|e| world.get::<Text>(e))
            .map(|t| t.0.clone())
            .unwrap_or_default()
    }

    #[test]
    fn label_block_matches_view_titles() {
        let mut world = World::new();
        let view = ViewModel::build(RenderMode::ThreeD);
        let mut backend = RetainedNodeBackend::new(StatOverlaySettings::default());

        attach(&mut world, &mut backend, &view, 1.0);
        backend.paint(&MetricSnapshot::default(), &view, true);
        backend.present(&mut world);

        let labels = text_of(&world, backend.labels);
        assert_eq!(labels, view.title_block());
        assert_eq!(labels.lines().next(), Some("FPS(3D)"));
        assert_eq!(labels.lines().count(), 10);
        assert_eq!(text_of(&world, backend.values), view.value_block(&MetricSnapshot::default()));
    }

    #[test]
    fn paint_only_rewrites_values() {
        let mut world = World::new();
        let view = ViewModel::build(RenderMode::TwoD);
        let mut backend = RetainedNodeBackend::new(StatOverlaySettings::default());
        attach(&mut world, &mut backend, &view, 1.0);
        backend.present(&mut world);

        let snapshot = MetricSnapshot {
            shader_calls: 42,
            ..Default::default()
        };
        backend.paint(&snapshot, &view, false);
        backend.present(&mut world);

        let values = text_of(&world, backend.values);
        assert_eq!(values.lines().nth(6), Some("42"));
        assert_eq!(text_of(&world, backend.labels), view.title_block());
    }

    #[test]
    fn layout_scales_with_pixel_ratio() {
        let mut world = World::new();
        let view = ViewModel::build(RenderMode::TwoD);
        let mut backend = RetainedNodeBackend::new(StatOverlaySettings::default());
        attach(&mut world, &mut backend, &view, 2.0);

        let container = backend.container().expect("container");
        let node = world.get::<Node>(container).expect("container node");
        assert_eq!(node.left, Val::Px(30.0));
        assert_eq!(node.width, Val::Px(276.0));

        let values = backend.values.expect("value text");
        assert_eq!(world.get::<Node>(values).map(|n| n.left), Some(Val::Px(160.0)));
        assert_eq!(world.get::<TextFont>(values).map(|f| f.font_size), Some(24.0));
    }

    #[test]
    fn nodes_survive_detach_and_reattach_moves_them() {
        let mut world = World::new();
        let view = ViewModel::build(RenderMode::TwoD);
        let mut backend = RetainedNodeBackend::new(StatOverlaySettings::default());
        attach(&mut world, &mut backend, &view, 1.0);
        let container = backend.container().expect("container");

        backend.detach(&mut world);
        assert!(world.get_entity(container).is_ok());

        backend.attach(
            &mut world,
            AttachContext {
                origin: Vec2::new(5.0, 6.0),
                pixel_ratio: 1.0,
            },
            &view,
        );
        assert_eq!(backend.container(), Some(container));
        assert_eq!(world.get::<Node>(container).map(|n| n.top), Some(Val::Px(6.0)));
    }
}
