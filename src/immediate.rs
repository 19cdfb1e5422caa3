//! Immediate raster backend.
//!
//! Rows are drawn into a [`PixelCanvas`] which is uploaded into an [`Image`]
//! and shown through an absolutely positioned [`ImageNode`]. Titles are drawn
//! once per attach; later paints only redraw the value column.

use bevy::{
    asset::{Assets, Handle},
    color::Color,
    ecs::world::World,
    image::Image,
    log::{debug, warn},
    picking::Pickable,
    prelude::{default, Entity, Name},
    ui::{widget::ImageNode, BackgroundColor, GlobalZIndex, Node, PositionType, Val},
};

use crate::{
    backend::{
        despawn_if_alive, panel_height, spawn_click_observer, AttachContext, BackendKind,
        OverlayBackend, OverlayClickHandler,
    },
    config::StatOverlaySettings,
    constants::IMMEDIATE_TITLE_X,
    render::{DrawContext, PixelCanvas},
    snapshot::MetricSnapshot,
    view_model::ViewModel,
};

/// Physical-pixel layout of the raster surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImmediateLayout {
    pub width: u32,
    pub height: u32,
    pub value_column: u32,
    pub row_height: u32,
    pub top: u32,
    pub title_x: u32,
    pub font_size: f32,
    pub pixel_ratio: f32,
}

impl ImmediateLayout {
    pub fn new(settings: &StatOverlaySettings, rows: usize, pixel_ratio: f32) -> Self {
        let font_size = settings.font_size * pixel_ratio;
        Self {
            width: (settings.immediate.width * pixel_ratio).round() as u32,
            height: panel_height(rows, settings.font_size, pixel_ratio).round() as u32,
            value_column: (settings.immediate.value_column * pixel_ratio).round() as u32,
            row_height: (font_size.round() as u32).max(1),
            top: (2.0 * pixel_ratio).round() as u32,
            title_x: IMMEDIATE_TITLE_X,
            font_size,
            pixel_ratio,
        }
    }

    /// Top edge of row `row`.
    pub fn row_y(&self, row: usize) -> u32 {
        row as u32 * self.row_height + self.top
    }

    /// Logical size of the surface on screen.
    fn logical_size(&self) -> (f32, f32) {
        (
            self.width as f32 / self.pixel_ratio,
            self.height as f32 / self.pixel_ratio,
        )
    }
}

/// Paint one frame of the table into `ctx`.
pub fn paint_surface<C: DrawContext>(
    ctx: &mut C,
    layout: &ImmediateLayout,
    snapshot: &MetricSnapshot,
    view: &ViewModel,
    first_paint: bool,
    title_color: Color,
) {
    if first_paint {
        ctx.clear_rect(0, 0, layout.width, layout.height);
        for row in view.rows() {
            ctx.fill_text(&row.title, layout.title_x, layout.row_y(row.row), title_color);
        }
    } else {
        ctx.clear_rect(
            layout.value_column,
            0,
            layout.width.saturating_sub(layout.value_column),
            layout.height,
        );
    }

    for row in view.rows() {
        ctx.fill_text(
            &row.format(snapshot),
            layout.value_column,
            layout.row_y(row.row),
            row.color,
        );
    }
}

/// Backend drawing the table onto a CPU canvas shown as an image node.
pub struct ImmediateSurfaceBackend {
    settings: StatOverlaySettings,
    layout: Option<ImmediateLayout>,
    canvas: Option<PixelCanvas>,
    image: Option<Handle<Image>>,
    display: Option<Entity>,
    observer: Option<Entity>,
    dirty: bool,
    warned_headless: bool,
}

impl ImmediateSurfaceBackend {
    pub fn new(settings: StatOverlaySettings) -> Self {
        Self {
            settings,
            layout: None,
            canvas: None,
            image: None,
            display: None,
            observer: None,
            dirty: false,
            warned_headless: false,
        }
    }

    pub fn layout(&self) -> Option<&ImmediateLayout> {
        self.layout.as_ref()
    }

    pub fn canvas(&self) -> Option<&PixelCanvas> {
        self.canvas.as_ref()
    }

    /// Entity currently showing the surface, `None` while detached.
    pub fn display(&self) -> Option<Entity> {
        self.display
    }

    pub fn image(&self) -> Option<&Handle<Image>> {
        self.image.as_ref()
    }

    fn ensure_image(&mut self, world: &mut World) {
        let Some(canvas) = self.canvas.as_ref() else {
            return;
        };
        let Some(mut images) = world.get_resource_mut::<Assets<Image>>() else {
            if !self.warned_headless {
                warn!("stat overlay: no Assets<Image>, immediate surface stays CPU-side");
                self.warned_headless = true;
            }
            return;
        };

        match &self.image {
            Some(handle) => {
                if let Some(image) = images.get_mut(handle) {
                    *image = canvas.to_image();
                }
            }
            None => self.image = Some(images.add(canvas.to_image())),
        }
    }
}

impl OverlayBackend for ImmediateSurfaceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ImmediateSurface
    }

    fn attach(&mut self, world: &mut World, ctx: AttachContext, view: &ViewModel) {
        self.detach(world);

        let layout = ImmediateLayout::new(&self.settings, view.row_count(), ctx.pixel_ratio);
        let resized = self
            .canvas
            .as_ref()
            .is_none_or(|c| c.width() != layout.width || c.height() != layout.height)
            || self.layout.is_none_or(|l| l.font_size != layout.font_size);
        if resized {
            self.canvas = Some(PixelCanvas::new(layout.width, layout.height, layout.font_size));
        }
        self.layout = Some(layout);
        self.ensure_image(world);

        let (width, height) = layout.logical_size();
        let mut display = world.spawn((
            Name::new("StatOverlaySurface"),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(ctx.origin.x),
                top: Val::Px(ctx.origin.y),
                width: Val::Px(width),
                height: Val::Px(height),
                ..default()
            },
            BackgroundColor(self.settings.immediate.background),
            GlobalZIndex(self.settings.z_index),
            Pickable::IGNORE,
        ));
        if let Some(handle) = &self.image {
            display.insert(ImageNode::new(handle.clone()));
        }
        let id = display.id();
        debug!("stat overlay surface {id} attached at {}", ctx.origin);
        self.display = Some(id);
    }

    fn detach(&mut self, world: &mut World) {
        despawn_if_alive(world, self.observer.take());
        despawn_if_alive(world, self.display.take());
    }

    fn paint(&mut self, snapshot: &MetricSnapshot, view: &ViewModel, first_paint: bool) {
        let (Some(canvas), Some(layout)) = (self.canvas.as_mut(), self.layout.as_ref()) else {
            return;
        };
        paint_surface(
            canvas,
            layout,
            snapshot,
            view,
            first_paint,
            self.settings.immediate.title_color,
        );
        self.dirty = true;
    }

    fn present(&mut self, world: &mut World) {
        if !self.dirty {
            return;
        }
        self.ensure_image(world);
        self.dirty = false;
    }

    fn bind_click(&mut self, world: &mut World, handler: OverlayClickHandler) {
        despawn_if_alive(world, self.observer.take());
        let Some(display) = self.display else {
            return;
        };
        if let Ok(mut entity) = world.get_entity_mut(display) {
            entity.insert(Pickable::default());
        }
        self.observer = Some(spawn_click_observer(world, display, handler));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::RenderMode;
    use bevy::math::Vec2;

    /// Records draw calls instead of rasterizing.
    #[derive(Default)]
    struct Recorder {
        clears: Vec<(u32, u32, u32, u32)>,
        texts: Vec<(String, u32, u32)>,
    }

    impl DrawContext for Recorder {
        fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) {
            self.clears.push((x, y, width, height));
        }

        fn fill_text(&mut self, text: &str, x: u32, y: u32, _color: Color) {
            self.texts.push((text.to_owned(), x, y));
        }
    }

    fn ignore_click(_commands: &mut bevy::prelude::Commands) {}

    fn layout(ratio: f32) -> ImmediateLayout {
        ImmediateLayout::new(&StatOverlaySettings::default(), 8, ratio)
    }

    #[test]
    fn layout_scales_with_pixel_ratio() {
        let one = layout(1.0);
        assert_eq!((one.width, one.value_column, one.height), (180, 120, 103));
        assert_eq!(one.row_y(0), 2);
        assert_eq!(one.row_y(3), 38);

        let two = layout(2.0);
        assert_eq!((two.width, two.value_column, two.row_height), (360, 240, 24));
        assert_eq!(two.row_y(1), 28);
    }

    #[test]
    fn first_paint_draws_titles_and_values() {
        let view = ViewModel::build(RenderMode::TwoD);
        let mut recorder = Recorder::default();
        paint_surface(
            &mut recorder,
            &layout(1.0),
            &MetricSnapshot::default(),
            &view,
            true,
            Color::WHITE,
        );

        assert_eq!(recorder.clears, vec![(0, 0, 180, 103)]);
        assert_eq!(recorder.texts.len(), 16);
        assert_eq!(recorder.texts[0], ("FPS(2D)".to_owned(), 4, 2));
        assert_eq!(recorder.texts[8].1, 120);
    }

    #[test]
    fn later_paints_leave_title_column_untouched() {
        let view = ViewModel::build(RenderMode::ThreeD);
        let mut recorder = Recorder::default();
        paint_surface(
            &mut recorder,
            &layout(1.0),
            &MetricSnapshot::default(),
            &view,
            false,
            Color::WHITE,
        );

        assert!(recorder.clears.iter().all(|&(x, ..)| x >= 120));
        assert!(recorder.texts.iter().all(|(_, x, _)| *x >= 120));
        assert_eq!(recorder.texts.len(), view.row_count());
    }

    #[test]
    fn repaint_keeps_title_pixels() {
        let view = ViewModel::build(RenderMode::TwoD);
        let layout = layout(1.0);
        let mut canvas = PixelCanvas::new(layout.width, layout.height, layout.font_size);
        let snapshot = MetricSnapshot::default();

        paint_surface(&mut canvas, &layout, &snapshot, &view, true, Color::WHITE);
        let titles_before: Vec<_> = (0..layout.height)
            .flat_map(|y| (0..layout.value_column).map(move |x| (x, y)))
            .map(|(x, y)| canvas.pixel(x, y))
            .collect();

        let busier = MetricSnapshot {
            render_batches: 12345,
            ..Default::default()
        };
        paint_surface(&mut canvas, &layout, &busier, &view, false, Color::WHITE);
        let titles_after: Vec<_> = (0..layout.height)
            .flat_map(|y| (0..layout.value_column).map(move |x| (x, y)))
            .map(|(x, y)| canvas.pixel(x, y))
            .collect();

        assert_eq!(titles_before, titles_after);
        assert!(canvas.has_ink(layout.value_column, 0, 60, layout.height));
    }

    #[test]
    fn attach_without_image_assets_keeps_canvas_cpu_side() {
        let mut world = World::new();
        let view = ViewModel::build(RenderMode::TwoD);
        let mut backend = ImmediateSurfaceBackend::new(StatOverlaySettings::default());
        backend.attach(
            &mut world,
            AttachContext {
                origin: Vec2::new(10.0, 20.0),
                pixel_ratio: 1.0,
            },
            &view,
        );
        backend.paint(&MetricSnapshot::default(), &view, true);
        backend.present(&mut world);

        assert!(backend.image().is_none());
        assert!(backend.canvas().is_some_and(|c| c.has_ink(0, 0, 120, 103)));
        let display = backend.display().expect("display entity");
        assert!(world.get::<ImageNode>(display).is_none());
    }

    #[test]
    fn detach_despawns_display() {
        let mut world = World::new();
        world.init_resource::<Assets<Image>>();
        let view = ViewModel::build(RenderMode::TwoD);
        let mut backend = ImmediateSurfaceBackend::new(StatOverlaySettings::default());
        let ctx = AttachContext {
            origin: Vec2::ZERO,
            pixel_ratio: 1.0,
        };

        backend.attach(&mut world, ctx, &view);
        let display = backend.display().expect("display entity");
        assert!(world.get::<ImageNode>(display).is_some());
        assert_eq!(world.get::<Pickable>(display), Some(&Pickable::IGNORE));

        backend.detach(&mut world);
        assert!(backend.display().is_none());
        assert!(world.get_entity(display).is_err());
    }

    #[test]
    fn bind_click_makes_display_pickable() {
        let mut world = World::new();
        let view = ViewModel::build(RenderMode::TwoD);
        let mut backend = ImmediateSurfaceBackend::new(StatOverlaySettings::default());
        backend.attach(
            &mut world,
            AttachContext {
                origin: Vec2::ZERO,
                pixel_ratio: 1.0,
            },
            &view,
        );
        backend.bind_click(&mut world, std::sync::Arc::new(ignore_click));

        let display = backend.display().expect("display entity");
        assert_eq!(world.get::<Pickable>(display), Some(&Pickable::default()));
    }
}
