use bevy::math::primitives::Cuboid;
use bevy::prelude::*;
use bevy_stat_overlay::{
    HostEnvironment, RenderCounters, RenderMode, StatOverlay, StatOverlayCommandsExt,
    StatOverlayPlugin, StatOverlaySettings,
};

#[derive(Component)]
struct DemoCube;

/// Rotating grid of cubes. A stand-in renderer feeds the stat counters from the
/// visible meshes every frame.
///
/// Controls: F3 toggles the overlay, Space adds a row of cubes, C clears the
/// counters. Clicking the overlay logs a line.
fn main() {
    App::new()
        .insert_resource(ClearColor(Color::srgba(0.02, 0.02, 0.05, 1.0)))
        .insert_resource(HostEnvironment {
            render_mode: RenderMode::ThreeD,
            ..default()
        })
        .insert_resource(StatOverlaySettings {
            follow_window_scale: true,
            ..default()
        })
        .add_plugins(DefaultPlugins)
        .add_plugins(StatOverlayPlugin {
            show_at: Some(Vec2::new(8.0, 8.0)),
            process_memory: true,
        })
        .add_systems(Startup, (setup_scene, bind_click))
        .add_systems(Update, (spin_cubes, feed_counters, handle_input))
        .run();
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 6.0, 14.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight {
            illuminance: 10_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    spawn_row(&mut commands, &mut meshes, &mut materials, 0);
}

fn spawn_row(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    row: usize,
) {
    let mesh = meshes.add(Cuboid::new(0.8, 0.8, 0.8));
    let material = materials.add(Color::srgb(0.3, 0.6, 0.9));
    for i in 0..10 {
        commands.spawn((
            DemoCube,
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_xyz(i as f32 * 1.2 - 5.4, 0.0, -(row as f32) * 1.2),
        ));
    }
}

fn bind_click(mut commands: Commands) {
    commands.set_stat_overlay_click_handler(|_commands| info!("stat overlay clicked"));
}

fn spin_cubes(time: Res<Time>, mut cubes: Query<&mut Transform, With<DemoCube>>) {
    for mut transform in &mut cubes {
        transform.rotate_y(time.delta_secs());
    }
}

/// Pretend every visible cube is one draw call of twelve triangles.
fn feed_counters(
    time: Res<Time>,
    cubes: Query<&ViewVisibility, With<DemoCube>>,
    mut counters: ResMut<RenderCounters>,
) {
    let total = cubes.iter().count() as u64;
    let visible = cubes.iter().filter(|v| v.get()).count() as u64;

    counters.add_render_batches(visible);
    counters.add_triangle_faces(visible * 12);
    counters.add_frustum_culling(total - visible);
    counters.add_shader_calls(1);
    counters.set_sprite_count(total);
    counters.set_render_slow(time.delta_secs() > 1.0 / 30.0);
}

fn handle_input(
    keys: Res<ButtonInput<KeyCode>>,
    overlay: Res<StatOverlay>,
    cubes: Query<(), With<DemoCube>>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if keys.just_pressed(KeyCode::F3) {
        if overlay.is_visible() {
            commands.hide_stat_overlay();
        } else {
            commands.show_stat_overlay(8.0, 8.0);
        }
    }
    if keys.just_pressed(KeyCode::Space) {
        let row = cubes.iter().count() / 10;
        spawn_row(&mut commands, &mut meshes, &mut materials, row);
    }
    if keys.just_pressed(KeyCode::KeyC) {
        commands.clear_stat_counters();
    }
}
