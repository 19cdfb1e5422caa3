//! Row descriptors that decide what the overlay shows and how.
//!
//! A [`ViewModel`] is built once per `show()` from the render mode and stays
//! immutable until the overlay is shown again.

use bevy::{color::Color, prelude::Resource};

use crate::{
    constants::{BYTES_PER_KILOBYTE, BYTES_PER_MEGABYTE, FIXED_ROW_COUNT},
    environment::RenderMode,
    snapshot::MetricSnapshot,
};

const YELLOW: Color = Color::srgb(1.0, 1.0, 0.0);
const WHITE: Color = Color::WHITE;

/// Display unit of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    /// Printed as-is
    Int,
    /// Bytes shown in mebibytes with two truncated decimals
    Mega,
    /// Bytes shown in kibibytes with two truncated decimals
    Kilo,
}

/// Typed accessor into a [`MetricSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricField {
    Fps,
    Sprites,
    RenderBatches,
    SavedRenderBatches,
    CpuMemory,
    GpuMemory,
    ShaderCalls,
    Canvas,
    TriangleFaces,
    FrustumCulling,
    OctreeNodeCulling,
}

/// A value read out of a snapshot, before unit formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricValue<'a> {
    Count(i64),
    Bytes(u64),
    Label(&'a str),
}

impl MetricField {
    pub fn read(self, snapshot: &MetricSnapshot) -> MetricValue<'_> {
        match self {
            MetricField::Fps => MetricValue::Label(&snapshot.fps_label),
            MetricField::Sprites => MetricValue::Label(&snapshot.sprite_label),
            MetricField::RenderBatches => MetricValue::Count(snapshot.render_batches),
            MetricField::SavedRenderBatches => MetricValue::Count(snapshot.saved_render_batches),
            MetricField::CpuMemory => MetricValue::Bytes(snapshot.cpu_bytes),
            MetricField::GpuMemory => MetricValue::Bytes(snapshot.gpu_bytes),
            MetricField::ShaderCalls => MetricValue::Count(snapshot.shader_calls),
            MetricField::Canvas => MetricValue::Label(&snapshot.canvas_label),
            MetricField::TriangleFaces => MetricValue::Count(snapshot.triangle_faces),
            MetricField::FrustumCulling => MetricValue::Count(snapshot.frustum_culling),
            MetricField::OctreeNodeCulling => MetricValue::Count(snapshot.octree_node_culling),
        }
    }
}

/// One overlay row.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptor {
    /// Text drawn in the title column
    pub title: String,
    /// Which snapshot value the row displays
    pub field: MetricField,
    /// Color of the value text on the immediate surface
    pub color: Color,
    /// How the value is formatted
    pub unit: MetricUnit,
    /// Zero-based row position
    pub row: usize,
}

impl MetricDescriptor {
    /// Current display string of this row.
    pub fn format(&self, snapshot: &MetricSnapshot) -> String {
        format_value(self.field.read(snapshot), self.unit)
    }
}

/// Format a raw value according to its unit.
pub fn format_value(value: MetricValue<'_>, unit: MetricUnit) -> String {
    match (value, unit) {
        (MetricValue::Label(label), _) => label.to_owned(),
        (MetricValue::Count(count), _) => count.to_string(),
        (MetricValue::Bytes(bytes), MetricUnit::Int) => bytes.to_string(),
        (MetricValue::Bytes(bytes), MetricUnit::Mega) => format_bytes(bytes, BYTES_PER_MEGABYTE, "M"),
        (MetricValue::Bytes(bytes), MetricUnit::Kilo) => format_bytes(bytes, BYTES_PER_KILOBYTE, "K"),
    }
}

fn format_bytes(bytes: u64, divisor: f64, suffix: &str) -> String {
    let scaled = (bytes as f64 / divisor * 100.0).floor() / 100.0;
    format!("{scaled} {suffix}")
}

/// Ordered rows painted by the active backend.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ViewModel {
    rows: Vec<MetricDescriptor>,
}

impl ViewModel {
    /// Seven fixed rows followed by the rows of the given render mode.
    pub fn build(mode: RenderMode) -> Self {
        let fps_title = match mode {
            RenderMode::TwoD => "FPS(2D)",
            RenderMode::ThreeD => "FPS(3D)",
        };

        let mut rows: Vec<(&str, MetricField, Color, MetricUnit)> = vec![
            (fps_title, MetricField::Fps, YELLOW, MetricUnit::Int),
            ("Sprite", MetricField::Sprites, WHITE, MetricUnit::Int),
            ("RenderBatches", MetricField::RenderBatches, WHITE, MetricUnit::Int),
            ("SavedRenderBatches", MetricField::SavedRenderBatches, WHITE, MetricUnit::Int),
            ("CPUMemory", MetricField::CpuMemory, YELLOW, MetricUnit::Mega),
            ("GPUMemory", MetricField::GpuMemory, YELLOW, MetricUnit::Mega),
            ("Shader", MetricField::ShaderCalls, WHITE, MetricUnit::Int),
        ];
        debug_assert_eq!(rows.len(), FIXED_ROW_COUNT);

        match mode {
            RenderMode::TwoD => {
                rows.push(("Canvas", MetricField::Canvas, WHITE, MetricUnit::Int));
            }
            RenderMode::ThreeD => {
                rows.push(("TriFaces", MetricField::TriangleFaces, WHITE, MetricUnit::Int));
                rows.push(("FrustumCulling", MetricField::FrustumCulling, WHITE, MetricUnit::Int));
                rows.push((
                    "OctreeNodeCulling",
                    MetricField::OctreeNodeCulling,
                    WHITE,
                    MetricUnit::Int,
                ));
            }
        }

        Self {
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(row, (title, field, color, unit))| MetricDescriptor {
                    title: title.to_owned(),
                    field,
                    color,
                    unit,
                    row,
                })
                .collect(),
        }
    }

    pub fn rows(&self) -> &[MetricDescriptor] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Titles joined into one newline-terminated block.
    pub fn title_block(&self) -> String {
        self.rows.iter().map(|row| format!("{}\n", row.title)).collect()
    }

    /// Current values joined into one newline-terminated block.
    pub fn value_block(&self, snapshot: &MetricSnapshot) -> String {
        self.rows
            .iter()
            .map(|row| format!("{}\n", row.format(snapshot)))
            .collect()
    }
}
