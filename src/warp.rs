// Geometric warping of an `Image` through a `Homography`.
//
// Destination pixels whose source location falls outside the source image are
// not written at all (transparent border): whatever the destination already
// held shows through.

use crate::error::Error;
use crate::geometry::{Homography, Point};
use crate::types::Image;

/// How far outside the last sample row/column a location may land and still
/// count as inside. Absorbs rounding in the transform solve.
const EDGE_TOLERANCE: f64 = 1e-3;

/// Keys cubic convolution parameter.
const CUBIC_A: f64 = -0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Nearest,
    Bilinear,
    Bicubic,
}

/// Read one sample, clamping the coordinates to the image.
#[inline]
fn sample(img: &Image, x: isize, y: isize, c: usize) -> f64 {
    let xi = x.clamp(0, img.width() as isize - 1) as usize;
    let yi = y.clamp(0, img.height() as isize - 1) as usize;
    img.pixel(xi, yi)[c] as f64
}

fn cubic_weights(t: f64) -> [f64; 4] {
    let a = CUBIC_A;
    let near = |d: f64| ((a + 2.0) * d - (a + 3.0)) * d * d + 1.0;
    let far = |d: f64| ((a * d - 5.0 * a) * d + 8.0 * a) * d - 4.0 * a;
    [far(t + 1.0), near(t), near(1.0 - t), far(2.0 - t)]
}

fn interpolate(img: &Image, u: f64, v: f64, out: &mut [f64], mode: Interpolation) {
    match mode {
        Interpolation::Nearest => {
            let (x, y) = (u.round() as isize, v.round() as isize);
            for (c, o) in out.iter_mut().enumerate() {
                *o = sample(img, x, y, c);
            }
        }
        Interpolation::Bilinear => {
            let (x0, y0) = (u.floor(), v.floor());
            let (fx, fy) = (u - x0, v - y0);
            let (x0, y0) = (x0 as isize, y0 as isize);
            for (c, o) in out.iter_mut().enumerate() {
                let top = sample(img, x0, y0, c) * (1.0 - fx) + sample(img, x0 + 1, y0, c) * fx;
                let bot =
                    sample(img, x0, y0 + 1, c) * (1.0 - fx) + sample(img, x0 + 1, y0 + 1, c) * fx;
                *o = top * (1.0 - fy) + bot * fy;
            }
        }
        Interpolation::Bicubic => {
            let (x0, y0) = (u.floor(), v.floor());
            let wx = cubic_weights(u - x0);
            let wy = cubic_weights(v - y0);
            let (x0, y0) = (x0 as isize, y0 as isize);
            for (c, o) in out.iter_mut().enumerate() {
                let mut acc = 0.0;
                for (j, wyj) in wy.iter().enumerate() {
                    let yy = y0 + j as isize - 1;
                    let row: f64 = wx
                        .iter()
                        .enumerate()
                        .map(|(i, wxi)| wxi * sample(img, x0 + i as isize - 1, yy, c))
                        .sum();
                    acc += wyj * row;
                }
                *o = acc;
            }
        }
    }
}

/// Warp `src` into `dst` with the forward transform `m` (src -> dst).
///
/// Every destination pixel is mapped back through `m⁻¹`. Pixels that land
/// inside `src` are interpolated and overwritten; the rest keep their value.
///
/// # Errors
///
/// [`Error::ChannelMismatch`] / [`Error::DepthMismatch`] when `src` and `dst`
/// differ in layout, [`Error::SingularTransform`] when `m` cannot be inverted.
pub fn warp(
    src: &Image,
    dst: &mut Image,
    m: &Homography,
    interpolation: Interpolation,
) -> Result<(), Error> {
    if src.channels() != dst.channels() {
        return Err(Error::ChannelMismatch(src.channels(), dst.channels()));
    }
    if src.depth() != dst.depth() {
        return Err(Error::DepthMismatch(src.depth().bits(), dst.depth().bits()));
    }
    let inv = m.inverse().ok_or(Error::SingularTransform)?;

    if src.width() == 0 || src.height() == 0 {
        return Ok(());
    }
    let max_u = (src.width() - 1) as f64 + EDGE_TOLERANCE;
    let max_v = (src.height() - 1) as f64 + EDGE_TOLERANCE;
    let max_val = dst.depth().max_value() as f64;

    let mut buf = vec![0.0; src.channels()];
    for y in 0..dst.height() {
        for x in 0..dst.width() {
            let Some(p) = inv.transform_point(Point::new(x as f64, y as f64)) else {
                continue;
            };
            if !(p.x >= -EDGE_TOLERANCE && p.x <= max_u && p.y >= -EDGE_TOLERANCE && p.y <= max_v) {
                continue;
            }
            let u = p.x.clamp(0.0, max_u - EDGE_TOLERANCE);
            let v = p.y.clamp(0.0, max_v - EDGE_TOLERANCE);

            interpolate(src, u, v, &mut buf, interpolation);
            for (d, s) in dst.pixel_mut(x, y).iter_mut().zip(&buf) {
                *d = s.round().clamp(0.0, max_val) as u16;
            }
        }
    }

    Ok(())
}
