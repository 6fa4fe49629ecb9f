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

//! CPU mipmap generation for contexts without `glGenerateMipmap`.

/// Halves an 8-bit-per-channel image with a 2x2 box filter.
///
/// Odd or unit dimensions clamp the sampled footprint to the last row or
/// column, so a 1-pixel-wide image shrinks along its other axis only.
pub fn downsample(src: &[u8], width: u32, height: u32, channels: usize) -> (Vec<u8>, u32, u32) {
    let out_width = (width / 2).max(1);
    let out_height = (height / 2).max(1);
    let (width, height) = (width as usize, height as usize);
    let mut out = Vec::with_capacity(out_width as usize * out_height as usize * channels);

    for y in 0..out_height as usize {
        let y0 = (y * 2).min(height - 1);
        let y1 = (y * 2 + 1).min(height - 1);
        for x in 0..out_width as usize {
            let x0 = (x * 2).min(width - 1);
            let x1 = (x * 2 + 1).min(width - 1);
            for channel in 0..channels {
                let texel =
                    |px: usize, py: usize| u32::from(src[(py * width + px) * channels + channel]);
                let sum = texel(x0, y0) + texel(x1, y0) + texel(x0, y1) + texel(x1, y1);
                // Rounded average of four 8-bit samples always fits in a byte.
                out.push(((sum + 2) / 4) as u8);
            }
        }
    }

    (out, out_width, out_height)
}

/// Builds levels `1..level_count` from level 0. Level 0 itself is not returned.
pub fn build_chain(
    base: &[u8],
    width: u32,
    height: u32,
    channels: usize,
    level_count: u32,
) -> Vec<(Vec<u8>, u32, u32)> {
    let mut levels: Vec<(Vec<u8>, u32, u32)> = Vec::new();
    for _ in 1..level_count {
        let next = match levels.last() {
            Some((pixels, w, h)) => downsample(pixels, *w, *h, channels),
            None => downsample(base, width, height, channels),
        };
        levels.push(next);
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_each_quad() {
        // 2x2 RGBA: one opaque white texel, three transparent black.
        let src = [255, 255, 255, 255, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        let (out, w, h) = downsample(&src, 2, 2, 4);

        assert_eq!((w, h), (1, 1));
        assert_eq!(out, vec![64, 64, 64, 64]);
    }

    #[test]
    fn thin_images_shrink_along_one_axis() {
        // 1x4 RGB column.
        let src = [0, 0, 0, 100, 100, 100, 200, 200, 200, 40, 40, 40];
        let (out, w, h) = downsample(&src, 1, 4, 3);

        assert_eq!((w, h), (1, 2));
        assert_eq!(out, vec![50, 50, 50, 120, 120, 120]);
    }

    #[test]
    fn chain_has_one_entry_per_extra_level() {
        let base = vec![128_u8; 8 * 4 * 4];
        let chain = build_chain(&base, 8, 4, 4, 4);

        let sizes: Vec<(u32, u32)> = chain.iter().map(|(_, w, h)| (*w, *h)).collect();
        assert_eq!(sizes, vec![(4, 2), (2, 1), (1, 1)]);
        assert!(chain.iter().all(|(pixels, _, _)| pixels.iter().all(|p| *p == 128)));
    }
}
