// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Device creation parameters, loadable from host configuration files.

use crate::math::{Extent2D, Origin2D};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The native context flavour a device is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Desktop OpenGL 2.0, compatibility profile.
    #[serde(rename = "gl_2_0")]
    Gl2_0,
    /// Desktop OpenGL 3.2, core profile.
    #[serde(rename = "gl_3_2_core")]
    Gl3_2Core,
    /// OpenGL ES 2.0.
    #[serde(rename = "gles_2_0")]
    Gles2_0,
}

impl DeviceKind {
    /// Every kind, from the most to the least capable baseline.
    pub const ALL: [DeviceKind; 3] = [
        DeviceKind::Gl3_2Core,
        DeviceKind::Gl2_0,
        DeviceKind::Gles2_0,
    ];

    /// Minimum `(major, minor)` context version of this kind.
    pub const fn required_version(self) -> (u32, u32) {
        match self {
            DeviceKind::Gl2_0 => (2, 0),
            DeviceKind::Gl3_2Core => (3, 2),
            DeviceKind::Gles2_0 => (2, 0),
        }
    }

    /// Returns `true` for OpenGL ES kinds.
    pub const fn is_embedded(self) -> bool {
        matches!(self, DeviceKind::Gles2_0)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceKind::Gl2_0 => "GL 2.0",
            DeviceKind::Gl3_2Core => "GL 3.2 core",
            DeviceKind::Gles2_0 => "GLES 2.0",
        };
        f.write_str(name)
    }
}

/// Anti-aliasing technique requested for the default framebuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntiAliasingKind {
    /// No anti-aliasing.
    #[default]
    None,
    /// Multisample anti-aliasing through an offscreen framebuffer.
    Msaa,
}

/// Requested anti-aliasing: a kind and its strength (sample count for MSAA).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiAliasing {
    /// The technique.
    pub kind: AntiAliasingKind,
    /// Sample count for [`AntiAliasingKind::Msaa`]; ignored otherwise.
    pub value: u32,
}

impl AntiAliasing {
    /// No anti-aliasing.
    pub const NONE: Self = Self {
        kind: AntiAliasingKind::None,
        value: 1,
    };

    /// MSAA with the given sample count.
    pub const fn msaa(samples: u32) -> Self {
        Self {
            kind: AntiAliasingKind::Msaa,
            value: samples,
        }
    }

    /// Returns `true` when the request actually asks for multisampling.
    pub const fn wants_msaa(&self) -> bool {
        matches!(self.kind, AntiAliasingKind::Msaa) && self.value > 1
    }
}

impl Default for AntiAliasing {
    fn default() -> Self {
        Self::NONE
    }
}

/// Window placement, size and flags handed to the host's windowing glue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Title shown by the window manager.
    pub title: String,
    /// Explicit position, or `None` to let the window manager decide.
    pub position: Option<Origin2D>,
    /// Client area size in pixels.
    pub size: Extent2D,
    /// If `true`, the window is shown immediately.
    pub is_visible: bool,
    /// If `true`, the window has no decorations.
    pub is_borderless: bool,
    /// If `true`, the window covers the desktop at its native resolution.
    pub is_fullscreen_desktop: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        Self {
            title: String::from("ren3d"),
            position: None,
            size: Extent2D::new(640, 480),
            is_visible: true,
            is_borderless: false,
            is_fullscreen_desktop: false,
        }
    }
}

/// Everything needed to create a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceCreateParams {
    /// The requested context flavour.
    pub kind: DeviceKind,
    /// Window parameters.
    pub window: WindowParams,
    /// Requested anti-aliasing. Degrades to none when unsupported.
    pub anti_aliasing: AntiAliasing,
    /// If `true`, presentation waits for vertical sync when the surface allows it.
    pub vsync: bool,
}

impl Default for DeviceCreateParams {
    fn default() -> Self {
        Self {
            kind: DeviceKind::Gl3_2Core,
            window: WindowParams::default(),
            anti_aliasing: AntiAliasing::NONE,
            vsync: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_load_from_partial_json() {
        let json = r#"{
            "kind": "gles_2_0",
            "window": { "size": { "width": 1280, "height": 720 } },
            "anti_aliasing": { "kind": "msaa", "value": 4 }
        }"#;

        let params: DeviceCreateParams = serde_json::from_str(json).expect("valid config");

        assert_eq!(params.kind, DeviceKind::Gles2_0);
        assert_eq!(params.window.size, Extent2D::new(1280, 720));
        assert_eq!(params.window.title, "ren3d", "missing fields fall back to defaults");
        assert!(params.anti_aliasing.wants_msaa());
        assert!(params.vsync);
    }

    #[test]
    fn single_sample_msaa_is_not_multisampling() {
        assert!(!AntiAliasing::msaa(1).wants_msaa());
        assert!(!AntiAliasing::NONE.wants_msaa());
    }

    #[test]
    fn required_versions_match_kinds() {
        assert_eq!(DeviceKind::Gl3_2Core.required_version(), (3, 2));
        assert!(DeviceKind::Gles2_0.is_embedded());
        assert!(!DeviceKind::Gl2_0.is_embedded());
    }
}
