//! Memory accountant seam for the CPU/GPU memory rows.
//!
//! The engine's own memory accountant lives outside this crate. It is plugged
//! in through [`MemoryAccountant`]; two built-in accountants cover the common
//! setups.

use bevy::{
    app::App,
    diagnostic::{DiagnosticsStore, SystemInformationDiagnosticsPlugin},
    prelude::Resource,
};

use crate::constants::BYTES_PER_GIGABYTE;

/// Byte counts reported by the host engine.
///
/// Hosts that track their own allocations write into this resource; the
/// default accountant simply reads it back at every window close.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportedMemory {
    /// Bytes held in main memory by engine resources
    pub cpu_bytes: u64,
    /// Bytes held in GPU memory by engine resources
    pub gpu_bytes: u64,
}

/// One fresh memory reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    pub cpu_bytes: u64,
    pub gpu_bytes: u64,
}

/// Context passed to memory accountants when a window closes.
#[derive(Clone, Copy)]
pub struct MemorySampleContext<'a> {
    /// Bevy's diagnostics store, when a diagnostics plugin is installed
    pub diagnostics: Option<&'a DiagnosticsStore>,
    /// Values the host wrote into [`ReportedMemory`]
    pub reported: ReportedMemory,
}

/// Source of the memory figures shown by the overlay.
///
/// # Example
/// ```rust
/// use bevy_stat_overlay::{MemoryAccountant, MemorySample, MemorySampleContext};
///
/// struct FixedBudget;
///
/// impl MemoryAccountant for FixedBudget {
///     fn sample(&mut self, _ctx: MemorySampleContext) -> MemorySample {
///         MemorySample { cpu_bytes: 64 << 20, gpu_bytes: 128 << 20 }
///     }
/// }
/// ```
pub trait MemoryAccountant: Send + Sync + 'static {
    /// Read the current byte counts. Called once per closed window.
    fn sample(&mut self, ctx: MemorySampleContext) -> MemorySample;
}

/// Accountant that mirrors [`ReportedMemory`].
#[derive(Default, Clone)]
pub struct ReportedMemoryAccountant;

impl MemoryAccountant for ReportedMemoryAccountant {
    fn sample(&mut self, ctx: MemorySampleContext) -> MemorySample {
        MemorySample {
            cpu_bytes: ctx.reported.cpu_bytes,
            gpu_bytes: ctx.reported.gpu_bytes,
        }
    }
}

/// Accountant that takes CPU bytes from the process memory diagnostic.
///
/// Requires [`SystemInformationDiagnosticsPlugin`]; falls back to the
/// reported CPU figure while the diagnostic has no value yet. GPU bytes always
/// come from [`ReportedMemory`].
#[derive(Default, Clone)]
pub struct ProcessMemoryAccountant;

impl MemoryAccountant for ProcessMemoryAccountant {
    fn sample(&mut self, ctx: MemorySampleContext) -> MemorySample {
        let cpu_bytes = ctx
            .diagnostics
            .and_then(|store| store.get(&SystemInformationDiagnosticsPlugin::PROCESS_MEM_USAGE))
            .and_then(|diagnostic| diagnostic.value())
            // Diagnostic is reported in GiB
            .map(|gib| (gib.max(0.0) * BYTES_PER_GIGABYTE) as u64)
            .unwrap_or(ctx.reported.cpu_bytes);

        MemorySample {
            cpu_bytes,
            gpu_bytes: ctx.reported.gpu_bytes,
        }
    }
}

/// Resource holding the active memory accountant.
#[derive(Resource)]
pub struct MemorySource {
    accountant: Box<dyn MemoryAccountant>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new(ReportedMemoryAccountant)
    }
}

impl MemorySource {
    pub fn new<A: MemoryAccountant>(accountant: A) -> Self {
        Self {
            accountant: Box::new(accountant),
        }
    }

    /// Replace the active accountant.
    pub fn set<A: MemoryAccountant>(&mut self, accountant: A) {
        self.accountant = Box::new(accountant);
    }

    /// Take a fresh reading from the active accountant.
    pub fn sample(&mut self, ctx: MemorySampleContext) -> MemorySample {
        self.accountant.sample(ctx)
    }
}

/// Extension trait for [`App`] to plug in a memory accountant.
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use bevy_stat_overlay::{ProcessMemoryAccountant, StatOverlayAppExt, StatOverlayPlugin};
///
/// App::new()
///     .add_plugins((DefaultPlugins, StatOverlayPlugin::default()))
///     .set_memory_accountant(ProcessMemoryAccountant)
///     .run();
/// ```
pub trait StatOverlayAppExt {
    /// Route the memory rows through `accountant`.
    fn set_memory_accountant<A: MemoryAccountant>(&mut self, accountant: A) -> &mut Self;
}

impl StatOverlayAppExt for App {
    fn set_memory_accountant<A: MemoryAccountant>(&mut self, accountant: A) -> &mut Self {
        self.init_resource::<MemorySource>();
        self.world_mut().resource_mut::<MemorySource>().set(accountant);
        self
    }
}
