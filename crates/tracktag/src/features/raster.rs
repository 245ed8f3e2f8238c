//! Spectrogram rasterization for the genre model
//!
//! The genre classifier was trained on rendered spectrogram images, so its
//! input contract is a fixed-size square RGB grid with channel values in
//! [0, 1]. This module maps a dB mel matrix through a deterministic
//! inferno-style colormap and bilinearly resizes it to the target
//! resolution. The mapping is deterministic; pixel-for-pixel parity with
//! any particular plotting library is not a goal.

use ndarray::{Array2, Array3, Axis};

/// Inferno colormap anchors at t = 0.0, 0.1, ..., 1.0 (RGB in [0, 1])
const INFERNO: [[f32; 3]; 11] = [
    [0.001462, 0.000466, 0.013866],
    [0.087411, 0.044556, 0.224813],
    [0.258234, 0.038571, 0.406485],
    [0.416331, 0.090203, 0.432943],
    [0.578304, 0.148039, 0.404411],
    [0.735683, 0.215906, 0.330245],
    [0.865006, 0.316822, 0.226055],
    [0.954506, 0.468744, 0.099874],
    [0.987622, 0.645320, 0.039886],
    [0.964394, 0.843848, 0.273391],
    [0.988362, 0.998364, 0.644924],
];

/// Rasterize a dB mel matrix into a `[size, size, 3]` RGB grid
///
/// The matrix is min-max normalized, flipped so low frequencies sit at the
/// bottom of the image, resized, and colored. All channel values lie in
/// [0, 1].
pub fn rasterize(mel_db: &Array2<f32>, size: usize) -> Array3<f32> {
    let normalized = normalize_unit(mel_db);

    // Low mel bands render at the bottom of the image
    let mut flipped = normalized;
    flipped.invert_axis(Axis(0));

    let resized = resize_bilinear(&flipped, size, size);

    let mut image = Array3::<f32>::zeros((size, size, 3));
    for y in 0..size {
        for x in 0..size {
            let rgb = colormap(resized[[y, x]]);
            image[[y, x, 0]] = rgb[0];
            image[[y, x, 1]] = rgb[1];
            image[[y, x, 2]] = rgb[2];
        }
    }

    ensure_rgb(image)
}

/// Coerce a rendered grid to exactly three channels
///
/// The model contract is strict RGB: an alpha channel is dropped and a
/// degenerate single-channel render is broadcast to three channels.
pub fn ensure_rgb(image: Array3<f32>) -> Array3<f32> {
    let channels = image.shape()[2];
    match channels {
        3 => image,
        c if c > 3 => image.slice_axis(Axis(2), ndarray::Slice::from(0..3)).to_owned(),
        1 => {
            let (h, w) = (image.shape()[0], image.shape()[1]);
            let mut rgb = Array3::<f32>::zeros((h, w, 3));
            for y in 0..h {
                for x in 0..w {
                    let v = image[[y, x, 0]];
                    rgb[[y, x, 0]] = v;
                    rgb[[y, x, 1]] = v;
                    rgb[[y, x, 2]] = v;
                }
            }
            rgb
        }
        // 2-channel grids cannot occur from our renderer; pad with zeros
        _ => {
            let (h, w) = (image.shape()[0], image.shape()[1]);
            let mut rgb = Array3::<f32>::zeros((h, w, 3));
            for y in 0..h {
                for x in 0..w {
                    for c in 0..channels.min(3) {
                        rgb[[y, x, c]] = image[[y, x, c]];
                    }
                }
            }
            rgb
        }
    }
}

/// Min-max normalize a matrix to [0, 1]; a flat matrix maps to all zeros
fn normalize_unit(matrix: &Array2<f32>) -> Array2<f32> {
    let min = matrix.iter().copied().fold(f32::MAX, f32::min);
    let max = matrix.iter().copied().fold(f32::MIN, f32::max);
    let range = max - min;

    if range <= 0.0 {
        return Array2::zeros(matrix.raw_dim());
    }
    matrix.mapv(|v| (v - min) / range)
}

/// Sample the inferno colormap at `t` in [0, 1] with linear interpolation
fn colormap(t: f32) -> [f32; 3] {
    let t = t.clamp(0.0, 1.0);
    let scaled = t * (INFERNO.len() - 1) as f32;
    let idx = (scaled as usize).min(INFERNO.len() - 2);
    let frac = scaled - idx as f32;

    let lo = INFERNO[idx];
    let hi = INFERNO[idx + 1];
    [
        lo[0] + (hi[0] - lo[0]) * frac,
        lo[1] + (hi[1] - lo[1]) * frac,
        lo[2] + (hi[2] - lo[2]) * frac,
    ]
}

/// Bilinear resize of a scalar grid
fn resize_bilinear(grid: &Array2<f32>, out_h: usize, out_w: usize) -> Array2<f32> {
    let (in_h, in_w) = (grid.shape()[0], grid.shape()[1]);
    let mut out = Array2::<f32>::zeros((out_h, out_w));

    let scale_y = if out_h > 1 { (in_h - 1) as f32 / (out_h - 1) as f32 } else { 0.0 };
    let scale_x = if out_w > 1 { (in_w - 1) as f32 / (out_w - 1) as f32 } else { 0.0 };

    for y in 0..out_h {
        let src_y = y as f32 * scale_y;
        let y0 = src_y as usize;
        let y1 = (y0 + 1).min(in_h - 1);
        let fy = src_y - y0 as f32;

        for x in 0..out_w {
            let src_x = x as f32 * scale_x;
            let x0 = src_x as usize;
            let x1 = (x0 + 1).min(in_w - 1);
            let fx = src_x - x0 as f32;

            let top = grid[[y0, x0]] * (1.0 - fx) + grid[[y0, x1]] * fx;
            let bottom = grid[[y1, x0]] * (1.0 - fx) + grid[[y1, x1]] * fx;
            out[[y, x]] = top * (1.0 - fy) + bottom * fy;
        }
    }

    out
}
