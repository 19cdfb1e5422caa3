//! Constants used throughout the bevy_stat_overlay plugin.
//!
//! This module centralizes compile-time constants, layout numbers, and
//! sizing factors shared by the sampler and both overlay backends.

use std::time::Duration;

/// Default length of one sampling window
pub const DEFAULT_WINDOW_LENGTH: Duration = Duration::from_millis(1000);

/// Milliseconds per second, used by the FPS and frame-delay formulas
pub const MILLIS_PER_SECOND: f64 = 1000.0;

/// Divisor for the `M` display unit
pub const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Divisor for the `K` display unit
pub const BYTES_PER_KILOBYTE: f64 = 1024.0;

/// Bytes in one GiB, used to convert sysinfo diagnostics back to bytes
pub const BYTES_PER_GIGABYTE: f64 = 1024.0 * 1024.0 * 1024.0;

/// Base font size (logical pixels) for overlay rows
pub const BASE_FONT_SIZE: f32 = 12.0;

/// Sprites drawn by the overlay itself when the immediate surface is active
pub const IMMEDIATE_SPRITE_OFFSET: i64 = 1;

/// Sprites drawn by the overlay itself when retained nodes are active
pub const RETAINED_SPRITE_OFFSET: i64 = 4;

/// Draw submissions issued by the immediate surface every frame
pub const IMMEDIATE_BATCH_OFFSET: i64 = 1;

/// Number of rows present in every view model regardless of render mode
pub const FIXED_ROW_COUNT: usize = 7;

/// Left inset of the title column on the immediate surface (physical pixels)
pub const IMMEDIATE_TITLE_X: u32 = 4;

/// Width in pixels of one glyph cell at scale 1 (5 px glyph + 1 px spacing)
pub const GLYPH_CELL_WIDTH: u32 = 6;

/// Height in pixels of one glyph cell at scale 1 (7 px glyph + 1 px spacing)
pub const GLYPH_CELL_HEIGHT: u32 = 8;

/// Inset of both text blocks inside the retained container (logical pixels)
pub const RETAINED_TEXT_INSET: f32 = 5.0;
