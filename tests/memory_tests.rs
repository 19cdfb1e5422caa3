//! Tests for the memory rows and custom memory accountants

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_stat_overlay::{
    enable, show, MemoryAccountant, MemorySample, MemorySampleContext, MetricField, MetricSnapshot,
    ReportedMemory, StatOverlay, StatOverlayAppExt, StatOverlayPlugin, ViewModel,
};

fn test_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(250)))
        .add_plugins(StatOverlayPlugin::default());
    app
}

/// Accountant returning a growing CPU figure so every read is visible.
struct CountingAccountant {
    reads: u64,
}

impl MemoryAccountant for CountingAccountant {
    fn sample(&mut self, ctx: MemorySampleContext) -> MemorySample {
        self.reads += 1;
        MemorySample {
            cpu_bytes: self.reads * 1024,
            gpu_bytes: ctx.reported.gpu_bytes,
        }
    }
}

#[test]
fn reported_memory_reaches_the_memory_rows() {
    let mut app = test_app();
    app.insert_resource(ReportedMemory {
        cpu_bytes: 3_145_728,
        gpu_bytes: 1_572_864,
    });
    show(app.world_mut(), 0.0, 0.0);

    let before = app.world().resource::<StatOverlay>().paint_count();
    for _ in 0..20 {
        app.update();
        if app.world().resource::<StatOverlay>().paint_count() > before {
            break;
        }
    }

    let world = app.world();
    let snapshot = world.resource::<MetricSnapshot>();
    let view = world.resource::<ViewModel>();
    let row = |field: MetricField| {
        view.rows()
            .iter()
            .find(|row| row.field == field)
            .map(|row| row.format(snapshot))
    };

    assert_eq!(row(MetricField::CpuMemory).as_deref(), Some("3 M"));
    assert_eq!(row(MetricField::GpuMemory).as_deref(), Some("1.5 M"));
}

#[test]
fn custom_accountant_is_read_once_per_window() {
    let mut app = test_app();
    app.set_memory_accountant(CountingAccountant { reads: 0 });
    enable(app.world_mut());

    let mut seen = Vec::new();
    for _ in 0..40 {
        app.update();
        let cpu = app.world().resource::<MetricSnapshot>().cpu_bytes;
        if cpu != 0 && seen.last() != Some(&cpu) {
            seen.push(cpu);
        }
    }

    assert!(seen.len() >= 2, "expected several closed windows, saw {seen:?}");
    assert_eq!(&seen[..2], &[1024, 2048]);
}
