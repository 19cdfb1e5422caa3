//! Derived metrics for one closed sampling window.
//!
//! Everything here is a pure function of raw counters, the window's frame
//! count and duration, a memory reading, and the active backend kind.

use std::time::Duration;

use bevy::prelude::Resource;

use crate::{
    backend::BackendKind,
    constants::*,
    counters::{Counter, RenderCounters},
    memory::MemorySample,
};

/// Read-only metrics valid for exactly one window.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub fps: u32,
    pub render_batches: i64,
    pub saved_render_batches: i64,
    pub shader_calls: i64,
    pub triangle_faces: i64,
    pub sprite_render_use_cache: i64,
    pub frustum_culling: i64,
    pub octree_node_culling: i64,
    pub canvas_normal: i64,
    pub canvas_bitmap: i64,
    pub canvas_recache: i64,
    pub sprite_count: u64,
    pub render_slow: bool,
    pub cpu_bytes: u64,
    pub gpu_bytes: u64,
    pub fps_label: String,
    pub sprite_label: String,
    pub canvas_label: String,
}

impl Default for MetricSnapshot {
    fn default() -> Self {
        Self {
            fps: 0,
            render_batches: 0,
            saved_render_batches: 0,
            shader_calls: 0,
            triangle_faces: 0,
            sprite_render_use_cache: 0,
            frustum_culling: 0,
            octree_node_culling: 0,
            canvas_normal: 0,
            canvas_bitmap: 0,
            canvas_recache: 0,
            sprite_count: 0,
            render_slow: false,
            cpu_bytes: 0,
            gpu_bytes: 0,
            fps_label: fps_label(0, false),
            sprite_label: "0".into(),
            canvas_label: canvas_label(0, 0, 0),
        }
    }
}

impl MetricSnapshot {
    /// Build the snapshot for a window that just closed.
    ///
    /// `backend` is `None` while sampling runs without a shown overlay.
    pub fn from_window(
        frames: u32,
        elapsed: Duration,
        counters: &RenderCounters,
        memory: MemorySample,
        backend: Option<BackendKind>,
    ) -> Self {
        let avg = |counter: Counter| round_average(counters.get(counter), frames);

        let batch_offset = match backend {
            Some(BackendKind::ImmediateSurface) => IMMEDIATE_BATCH_OFFSET,
            _ => 0,
        };

        let fps = window_fps(frames, elapsed);
        let sprite_render_use_cache = avg(Counter::SpriteRenderUseCache);
        let canvas_normal = avg(Counter::CanvasNormal);
        let canvas_bitmap = avg(Counter::CanvasBitmap);
        let canvas_recache = ceil_average(counters.get(Counter::CanvasRecache), frames);

        Self {
            fps,
            render_batches: avg(Counter::RenderBatches) - batch_offset,
            saved_render_batches: avg(Counter::SavedRenderBatches),
            shader_calls: avg(Counter::ShaderCalls),
            triangle_faces: avg(Counter::TriangleFaces),
            sprite_render_use_cache,
            frustum_culling: avg(Counter::FrustumCulling),
            octree_node_culling: avg(Counter::OctreeNodeCulling),
            canvas_normal,
            canvas_bitmap,
            canvas_recache,
            sprite_count: counters.sprite_count(),
            render_slow: counters.render_slow(),
            cpu_bytes: memory.cpu_bytes,
            gpu_bytes: memory.gpu_bytes,
            fps_label: fps_label(fps, counters.render_slow()),
            sprite_label: sprite_label(counters.sprite_count(), sprite_render_use_cache, backend),
            canvas_label: canvas_label(canvas_recache, canvas_normal, canvas_bitmap),
        }
    }
}

/// Frames per second over a window; 0 when nothing can be measured.
pub fn window_fps(frames: u32, elapsed: Duration) -> u32 {
    let elapsed_ms = elapsed.as_secs_f64() * MILLIS_PER_SECOND;
    if frames == 0 || elapsed_ms <= 0.0 {
        return 0;
    }
    (f64::from(frames) * MILLIS_PER_SECOND / elapsed_ms).round() as u32
}

/// `round(raw / frames)`, 0 for an empty window.
pub fn round_average(raw: u64, frames: u32) -> i64 {
    if frames == 0 {
        return 0;
    }
    (raw as f64 / f64::from(frames)).round() as i64
}

/// `ceil(raw / frames)`, 0 for an empty window.
pub fn ceil_average(raw: u64, frames: u32) -> i64 {
    if frames == 0 {
        return 0;
    }
    (raw as f64 / f64::from(frames)).ceil() as i64
}

/// `"{fps}[ slow] {frame_delay}"`; the delay is empty when fps is 0.
pub fn fps_label(fps: u32, render_slow: bool) -> String {
    let slow = if render_slow { " slow" } else { "" };
    let delay = if fps > 0 {
        (MILLIS_PER_SECOND / f64::from(fps)).floor().to_string()
    } else {
        String::new()
    };
    format!("{fps}{slow} {delay}")
}

/// Sprite total minus the overlay's own sprites, with the cache count appended
/// when any sprite was served from cache.
pub fn sprite_label(sprite_count: u64, cache_count: i64, backend: Option<BackendKind>) -> String {
    let offset = match backend {
        Some(BackendKind::ImmediateSurface) => IMMEDIATE_SPRITE_OFFSET,
        Some(BackendKind::RetainedNodes) => RETAINED_SPRITE_OFFSET,
        None => 0,
    };
    let visible = sprite_count as i64 - offset;
    if cache_count > 0 {
        format!("{visible}/{cache_count}")
    } else {
        visible.to_string()
    }
}

/// `"{recache}/{normal}/{bitmap}"`
pub fn canvas_label(recache: i64, normal: i64, bitmap: i64) -> String {
    format!("{recache}/{normal}/{bitmap}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_is_zero_for_empty_window() {
        assert_eq!(window_fps(0, Duration::from_millis(1000)), 0);
        assert_eq!(window_fps(10, Duration::ZERO), 0);
    }

    #[test]
    fn fps_rounds_to_nearest() {
        assert_eq!(window_fps(59, Duration::from_millis(1001)), 59);
        assert_eq!(window_fps(61, Duration::from_millis(1016)), 60);
    }

    #[test]
    fn recache_uses_ceiling_others_round() {
        assert_eq!(round_average(10, 4), 3); // 2.5 rounds up
        assert_eq!(round_average(9, 4), 2);
        assert_eq!(ceil_average(9, 4), 3);
        assert_eq!(ceil_average(1, 60), 1);
        assert_eq!(round_average(1, 60), 0);
    }

    #[test]
    fn fps_label_with_slow_flag() {
        assert_eq!(fps_label(30, true), "30 slow 33");
        assert_eq!(fps_label(60, false), "60 16");
        assert_eq!(fps_label(0, false), "0 ");
    }

    #[test]
    fn sprite_label_offsets_by_backend() {
        assert_eq!(sprite_label(10, 0, Some(BackendKind::ImmediateSurface)), "9");
        assert_eq!(sprite_label(10, 0, Some(BackendKind::RetainedNodes)), "6");
        assert_eq!(sprite_label(10, 3, Some(BackendKind::ImmediateSurface)), "9/3");
        assert_eq!(sprite_label(10, 0, None), "10");
    }

    #[test]
    fn snapshot_applies_batch_offset_only_for_immediate_surface() {
        let mut counters = RenderCounters::default();
        counters.add_render_batches(300);
        let elapsed = Duration::from_millis(1000);

        let immediate = MetricSnapshot::from_window(
            60,
            elapsed,
            &counters,
            MemorySample::default(),
            Some(BackendKind::ImmediateSurface),
        );
        let retained = MetricSnapshot::from_window(
            60,
            elapsed,
            &counters,
            MemorySample::default(),
            Some(BackendKind::RetainedNodes),
        );

        assert_eq!(immediate.render_batches, 4);
        assert_eq!(retained.render_batches, 5);
        assert_eq!(immediate.fps, 60);
    }

    #[test]
    fn canvas_label_uses_averaged_values() {
        let mut counters = RenderCounters::default();
        counters.add_canvas_recache(1);
        counters.add_canvas_normal(20);
        counters.add_canvas_bitmap(40);

        let snapshot = MetricSnapshot::from_window(
            20,
            Duration::from_millis(1000),
            &counters,
            MemorySample::default(),
            None,
        );

        assert_eq!(snapshot.canvas_label, "1/1/2");
    }
}
