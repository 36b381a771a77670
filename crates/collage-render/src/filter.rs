//! Pixel-level filters applied to a node's cached raster.
//!
//! Brightness and contrast work on straight-alpha RGBA and never touch the
//! alpha channel. The box blur works on any 4-channel buffer and is used
//! for soft shadows.

use collage_core::Bitmap;

/// Brightness/contrast pair applied to a node raster.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FilterSet {
    /// -1.0 ..= 1.0, added as `brightness × 255` per channel.
    pub brightness: f64,
    /// -100.0 ..= 100.0
    pub contrast: f64,
}

impl FilterSet {
    pub fn is_identity(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0
    }

    /// Filter a bitmap into a new one. The input is left untouched.
    pub fn apply(&self, bitmap: &Bitmap) -> Bitmap {
        let mut pixels = bitmap.pixels().to_vec();
        if self.brightness != 0.0 {
            brighten(&mut pixels, self.brightness);
        }
        if self.contrast != 0.0 {
            contrast(&mut pixels, self.contrast);
        }
        // Same dimensions and length as the source, so this cannot fail.
        Bitmap::from_rgba(bitmap.width, bitmap.height, pixels).unwrap_or_else(|| bitmap.clone())
    }
}

/// Shift every color channel by `brightness × 255`.
pub fn brighten(rgba: &mut [u8], brightness: f64) {
    let delta = brightness * 255.0;
    for px in rgba.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            *c = (*c as f64 + delta).clamp(0.0, 255.0) as u8;
        }
    }
}

/// Stretch every color channel around mid-grey by `((c + 100) / 100)²`.
pub fn contrast(rgba: &mut [u8], contrast: f64) {
    let adjust = ((contrast + 100.0) / 100.0).powi(2);
    for px in rgba.chunks_exact_mut(4) {
        for c in &mut px[..3] {
            let v = ((*c as f64 / 255.0 - 0.5) * adjust + 0.5) * 255.0;
            *c = v.round().clamp(0.0, 255.0) as u8;
        }
    }
}

/// Three-pass box blur approximating a gaussian of the given radius.
pub fn box_blur(data: &mut [u8], width: usize, height: usize, radius: usize) {
    if radius == 0 || width == 0 || height == 0 || data.len() < width * height * 4 {
        return;
    }
    let mut scratch = vec![0u8; data.len()];
    for _ in 0..3 {
        blur_pass(data, &mut scratch, width, height, radius, true);
        blur_pass(&scratch, data, width, height, radius, false);
    }
}

fn blur_pass(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    radius: usize,
    horizontal: bool,
) {
    let (lines, len) = if horizontal {
        (height, width)
    } else {
        (width, height)
    };
    let offset = |line: usize, i: usize| {
        if horizontal {
            (line * width + i) * 4
        } else {
            (i * width + line) * 4
        }
    };
    let window = (2 * radius + 1) as u32;

    for line in 0..lines {
        let mut sum = [0u32; 4];
        // seed the window with clamped edge samples
        for k in 0..=2 * radius {
            let i = k.saturating_sub(radius).min(len - 1);
            let o = offset(line, i);
            for ch in 0..4 {
                sum[ch] += src[o + ch] as u32;
            }
        }
        for i in 0..len {
            let o = offset(line, i);
            for ch in 0..4 {
                dst[o + ch] = (sum[ch] / window) as u8;
            }
            let out = offset(line, i.saturating_sub(radius));
            let inc = offset(line, (i + radius + 1).min(len - 1));
            for ch in 0..4 {
                sum[ch] = sum[ch] + src[inc + ch] as u32 - src[out + ch] as u32;
            }
        }
    }
}
