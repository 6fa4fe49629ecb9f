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

//! 8-bit-per-channel color, the native color format of the game's palette.

use serde::{Deserialize, Serialize};

/// An RGBA color with one byte per channel.
///
/// `#[repr(C)]` and `Pod` so that slices of colors can be uploaded as vertex
/// attributes without conversion.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
#[repr(C)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black.
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a new color from its four channels.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Returns the channels normalized to `0.0..=1.0`, in RGBA order.
    pub fn to_normalized(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normalization_maps_extremes_to_unit_range() {
        let [r, g, b, a] = Rgba8::new(255, 0, 51, 255).to_normalized();
        assert_relative_eq!(r, 1.0);
        assert_relative_eq!(g, 0.0);
        assert_relative_eq!(b, 0.2);
        assert_relative_eq!(a, 1.0);
    }

    #[test]
    fn colors_cast_to_bytes_in_channel_order() {
        let colors = [Rgba8::rgb(1, 2, 3), Rgba8::TRANSPARENT];
        let bytes: &[u8] = bytemuck::cast_slice(&colors);
        assert_eq!(bytes, &[1, 2, 3, 255, 0, 0, 0, 0]);
    }
}
