//! Facts about the host the overlay runs inside.
//!
//! The host fills [`HostEnvironment`] once at startup (or lets the plugin
//! track the window scale). The overlay only reads it.

use bevy::prelude::Resource;

use crate::backend::BackendKind;

/// Rendering mode of the host engine; decides which mode rows are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    TwoD,
    ThreeD,
}

/// Restricted embedded hosts that cannot attach a raster surface to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSandbox {
    MiniGame,
    Limixiu,
    BaiduMiniGame,
    KgMiniGame,
    QgMiniGame,
}

/// Environment flags consumed by the overlay when it is shown.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct HostEnvironment {
    /// Device pixel ratio used to scale surfaces and fonts
    pub pixel_ratio: f32,
    /// 2D or 3D rendering mode
    pub render_mode: RenderMode,
    /// Restricted sandbox the engine runs in, if any
    pub sandbox: Option<HostSandbox>,
    /// Engine runs natively instead of inside a browser-like host
    pub native: bool,
}

impl Default for HostEnvironment {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            render_mode: RenderMode::TwoD,
            sandbox: None,
            native: false,
        }
    }
}

impl HostEnvironment {
    /// Pick the overlay backend for this host.
    ///
    /// The immediate raster surface is preferred; sandboxed and native hosts
    /// fall back to retained scene nodes.
    pub fn select_backend(&self) -> BackendKind {
        if self.sandbox.is_some() || self.native {
            BackendKind::RetainedNodes
        } else {
            BackendKind::ImmediateSurface
        }
    }

    /// Pixel ratio clamped to something a surface can be sized with.
    pub fn effective_pixel_ratio(&self) -> f32 {
        if self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0 {
            self.pixel_ratio
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_host_uses_immediate_surface() {
        assert_eq!(
            HostEnvironment::default().select_backend(),
            BackendKind::ImmediateSurface
        );
    }

    #[test]
    fn sandboxed_or_native_hosts_use_retained_nodes() {
        let sandboxed = HostEnvironment {
            sandbox: Some(HostSandbox::BaiduMiniGame),
            ..Default::default()
        };
        let native = HostEnvironment {
            native: true,
            ..Default::default()
        };

        assert_eq!(sandboxed.select_backend(), BackendKind::RetainedNodes);
        assert_eq!(native.select_backend(), BackendKind::RetainedNodes);
    }

    #[test]
    fn invalid_pixel_ratio_falls_back_to_one() {
        let env = HostEnvironment {
            pixel_ratio: 0.0,
            ..Default::default()
        };
        assert_eq!(env.effective_pixel_ratio(), 1.0);
    }
}
