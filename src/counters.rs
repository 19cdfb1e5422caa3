//! Render counters incremented by the host renderer.
//!
//! Renderer call sites bump these counters any number of times per frame.
//! The sampling window reads them once per closed window, turns them into
//! per-frame averages, and resets the counted subset.

use bevy::prelude::Resource;

/// Counters accumulated over a sampling window and averaged per frame.
///
/// `sprite_count` and `render_slow` are not part of this set: the renderer
/// overwrites them directly and they survive window resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    /// GPU submissions issued
    RenderBatches,
    /// Submissions avoided by batching
    SavedRenderBatches,
    /// Shader program binds
    ShaderCalls,
    /// Triangles submitted
    TriangleFaces,
    /// Sprites rendered from a cache
    SpriteRenderUseCache,
    /// Objects rejected by frustum culling
    FrustumCulling,
    /// Octree nodes rejected by culling
    OctreeNodeCulling,
    /// Canvases drawn with the "normal" cache mode
    CanvasNormal,
    /// Canvases drawn with the "bitmap" cache mode
    CanvasBitmap,
    /// Canvas cache buffers redrawn
    CanvasRecache,
}

impl Counter {
    /// Number of counted fields
    pub const COUNT: usize = 10;

    /// Every counted field, in storage order
    pub const ALL: [Counter; Counter::COUNT] = [
        Counter::RenderBatches,
        Counter::SavedRenderBatches,
        Counter::ShaderCalls,
        Counter::TriangleFaces,
        Counter::SpriteRenderUseCache,
        Counter::FrustumCulling,
        Counter::OctreeNodeCulling,
        Counter::CanvasNormal,
        Counter::CanvasBitmap,
        Counter::CanvasRecache,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-frame engine counters shared between the renderer and the sampler.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderCounters {
    counted: [u64; Counter::COUNT],
    sprite_count: u64,
    render_slow: bool,
}

impl RenderCounters {
    /// Add `amount` to a counted field.
    pub fn increment(&mut self, counter: Counter, amount: u64) {
        let slot = &mut self.counted[counter.index()];
        *slot = slot.saturating_add(amount);
    }

    /// Current raw (not averaged) value of a counted field.
    pub fn get(&self, counter: Counter) -> u64 {
        self.counted[counter.index()]
    }

    /// Overwrite the live sprite total.
    pub fn set_sprite_count(&mut self, count: u64) {
        self.sprite_count = count;
    }

    /// Live sprite total as last set by the renderer.
    pub fn sprite_count(&self) -> u64 {
        self.sprite_count
    }

    /// Flag whether the renderer fell back to its slow path.
    pub fn set_render_slow(&mut self, slow: bool) {
        self.render_slow = slow;
    }

    /// Whether the renderer reported its slow path.
    pub fn render_slow(&self) -> bool {
        self.render_slow
    }

    /// Zero every counted field. Sprite count and the slow flag are kept.
    pub fn reset_window_counters(&mut self) {
        self.counted = [0; Counter::COUNT];
    }
}

macro_rules! counter_entry_points {
    ($($(#[$doc:meta])* $method:ident => $counter:ident),* $(,)?) => {
        impl RenderCounters {
            $(
                $(#[$doc])*
                #[inline]
                pub fn $method(&mut self, amount: u64) {
                    self.increment(Counter::$counter, amount);
                }
            )*
        }
    };
}

counter_entry_points! {
    /// Record GPU submissions.
    add_render_batches => RenderBatches,
    /// Record submissions merged away by batching.
    add_saved_render_batches => SavedRenderBatches,
    /// Record shader binds.
    add_shader_calls => ShaderCalls,
    /// Record submitted triangles.
    add_triangle_faces => TriangleFaces,
    /// Record sprites served from a render cache.
    add_sprite_render_use_cache => SpriteRenderUseCache,
    /// Record frustum-culled objects.
    add_frustum_culling => FrustumCulling,
    /// Record culled octree nodes.
    add_octree_node_culling => OctreeNodeCulling,
    /// Record canvases drawn in "normal" cache mode.
    add_canvas_normal => CanvasNormal,
    /// Record canvases drawn in "bitmap" cache mode.
    add_canvas_bitmap => CanvasBitmap,
    /// Record canvas cache redraws.
    add_canvas_recache => CanvasRecache,
}
