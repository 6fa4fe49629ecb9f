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

//! Defines data structures related to 2D texture resources.

/// Pixel layout of texture data supplied by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Three bytes per pixel: red, green, blue.
    Rgb8Unorm,
    /// Four bytes per pixel: red, green, blue, alpha.
    Rgba8Unorm,
}

impl PixelFormat {
    /// Size of one pixel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb8Unorm => 3,
            PixelFormat::Rgba8Unorm => 4,
        }
    }

    /// Size in bytes of a tightly packed `width` x `height` image.
    pub const fn image_size(self, width: u32, height: u32) -> usize {
        self.bytes_per_pixel() * width as usize * height as usize
    }
}

/// A descriptor used to create a [`TextureId`].
#[derive(Debug, Clone)]
pub struct Texture2dDescriptor<'a> {
    /// Pixel layout of uploads.
    pub pixel_format: PixelFormat,
    /// Width of level 0 in pixels.
    pub width: u32,
    /// Height of level 0 in pixels.
    pub height: u32,
    /// Number of mip levels, from 1 up to the full chain.
    pub mipmap_count: u32,
    /// Optional contents of level 0, tightly packed.
    pub data: Option<&'a [u8]>,
}

/// Size of mip `level` of a texture whose level 0 is `width` x `height`.
pub fn mip_level_size(width: u32, height: u32, level: u32) -> (u32, u32) {
    let shrink = |side: u32| side.checked_shr(level).unwrap_or(0).max(1);
    (shrink(width), shrink(height))
}

resource_id! {
    /// An opaque handle to a 2D texture resource.
    TextureId => Texture2d
}
