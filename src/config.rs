//! Configuration structures for the stat overlay.
//!
//! Layout numbers are logical pixels; backends multiply them by the device
//! pixel ratio when they attach.

use std::time::Duration;

use bevy::{color::Color, prelude::Resource};

use crate::constants::*;

/// Main configuration resource for the stat overlay.
///
/// Insert it before or after adding the plugin. Changes take effect the next
/// time the overlay is shown.
///
/// # Example
/// ```rust
/// use bevy::prelude::*;
/// use bevy_stat_overlay::StatOverlaySettings;
///
/// App::new().insert_resource(StatOverlaySettings {
///     font_size: 14.0,
///     ..default()
/// });
/// ```
#[derive(Debug, Clone, Resource)]
pub struct StatOverlaySettings {
    /// Length of one sampling window
    pub window_length: Duration,
    /// Row font size before pixel-ratio scaling
    pub font_size: f32,
    /// Layout of the raster surface
    pub immediate: ImmediateSettings,
    /// Layout of the UI node panel
    pub retained: RetainedSettings,
    /// Global z-index of the overlay root
    pub z_index: i32,
    /// Copy the primary window's scale factor into the host pixel ratio
    pub follow_window_scale: bool,
}

impl Default for StatOverlaySettings {
    fn default() -> Self {
        Self {
            window_length: DEFAULT_WINDOW_LENGTH,
            font_size: BASE_FONT_SIZE,
            immediate: ImmediateSettings {
                width: 180.0,
                value_column: 120.0,
                background: Color::srgba(150.0 / 255.0, 150.0 / 255.0, 150.0 / 255.0, 0.8),
                title_color: Color::WHITE,
            },
            retained: RetainedSettings {
                width: 138.0,
                value_column: 80.0,
                background: Color::srgba(0.6, 0.6, 0.6, 0.5),
                text_color: Color::WHITE,
            },
            z_index: 1000,
            follow_window_scale: false,
        }
    }
}

/// Raster surface layout.
#[derive(Debug, Clone)]
pub struct ImmediateSettings {
    /// Surface width
    pub width: f32,
    /// Left edge of the value column
    pub value_column: f32,
    /// Color behind the surface
    pub background: Color,
    /// Color of the title column
    pub title_color: Color,
}

/// UI panel layout.
#[derive(Debug, Clone)]
pub struct RetainedSettings {
    /// Panel width
    pub width: f32,
    /// Left edge of the value text block
    pub value_column: f32,
    /// Panel background
    pub background: Color,
    /// Color of both text blocks
    pub text_color: Color,
}
