// Perspective alpha compositing: warp an RGBA overlay onto an RGB background
// and blend it with its own alpha channel.
//
// This never fails. Anything it cannot work with turns into a small white
// image so an interactive loop can keep drawing.

use crate::geometry::{Homography, Point, Quad};
use crate::types::Image;
use crate::warp::{Interpolation, warp};

pub const FALLBACK_SIZE: usize = 100;

/// 100x100, 3-channel, 8-bit, all white.
pub fn fallback_image() -> Image {
    Image::filled_u8(FALLBACK_SIZE, FALLBACK_SIZE, &[u8::MAX; 3])
}

/// The foreground rectangle centered inside the background.
/// Offsets use integer division, so odd differences round toward zero.
pub fn default_placement(fg_w: usize, fg_h: usize, bg_w: usize, bg_h: usize) -> Quad {
    let ltx = (bg_w as i64 - fg_w as i64) / 2;
    let lty = (bg_h as i64 - fg_h as i64) / 2;
    Quad::rect(ltx as f64, lty as f64, fg_w as f64, fg_h as f64)
}

/// Composite `foreground` (RGBA) onto `background` (RGB) so that the
/// foreground's corners land on `dest_corners`.
///
/// With fewer than 4 corners the foreground is centered. The result has the
/// background's size and depth and 3 channels. Missing inputs, too few
/// channels, differing bit depths or a degenerate quad give [`fallback_image`].
pub fn composite(
    foreground: Option<&Image>,
    background: Option<&Image>,
    dest_corners: &[Point],
) -> Image {
    let (Some(fg), Some(bg)) = (foreground, background) else {
        log::warn!("composite: missing input image");
        return fallback_image();
    };
    if fg.channels() < 4 || bg.channels() < 3 || fg.depth() != bg.depth() {
        log::warn!(
            "composite: unsupported inputs (fg {}ch/{}bit, bg {}ch/{}bit)",
            fg.channels(),
            fg.depth().bits(),
            bg.channels(),
            bg.depth().bits()
        );
        return fallback_image();
    }

    let dst_quad = Quad::from_slice(dest_corners)
        .unwrap_or_else(|| default_placement(fg.width(), fg.height(), bg.width(), bg.height()));

    let (w, h) = (fg.width() as f64, fg.height() as f64);
    let src_quad = Quad([
        Point::new(0.0, 0.0),
        Point::new(w - 1.0, 0.0),
        Point::new(w - 1.0, h - 1.0),
        Point::new(0.0, h - 1.0),
    ]);
    let Some(m) = Homography::from_quad_to_quad(&src_quad, &dst_quad) else {
        log::warn!("composite: degenerate destination quad {:?}", dst_quad.corners());
        return fallback_image();
    };

    let mut warped = Image::from_size_val(bg.width(), bg.height(), fg.channels(), fg.depth(), 0);
    if let Err(e) = warp(fg, &mut warped, &m, Interpolation::Bicubic) {
        log::warn!("composite: warp failed: {e}");
        return fallback_image();
    }

    blend(&warped, bg)
}

/// `out = rgb * a / max + bg * (max - a) / max` per channel, each term rounded
/// and the sum saturated. `warped` and `bg` share size and depth.
fn blend(warped: &Image, bg: &Image) -> Image {
    let depth = bg.depth();
    let max = depth.max_value() as f64;
    let term = |v: u16, w: f64| (v as f64 * w / max).round().min(max);

    let mut out = Image::from_size_val(bg.width(), bg.height(), 3, depth, 0);
    let pixels = warped
        .as_slice()
        .chunks_exact(warped.channels())
        .zip(bg.as_slice().chunks_exact(bg.channels()))
        .zip(out.as_slice_mut().chunks_exact_mut(3));
    for ((fg_px, bg_px), out_px) in pixels {
        let alpha = fg_px[3] as f64;
        let inv_alpha = max - alpha;
        for c in 0..3 {
            let v = term(fg_px[c], alpha) + term(bg_px[c], inv_alpha);
            out_px[c] = v.min(max) as u16;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{FALLBACK_SIZE, composite, default_placement, fallback_image};
    use crate::geometry::{Point, Quad};
    use crate::types::{BitDepth, Image};

    fn background() -> Image {
        // every pixel different so a misplaced blend shows up
        let mut data = Vec::new();
        for y in 0..10u16 {
            for x in 0..12u16 {
                data.extend([x * 10, y * 10, 7]);
            }
        }
        Image::new(12, 10, 3, BitDepth::Eight, data).unwrap()
    }

    fn assert_white_fallback(img: &Image) {
        assert_eq!(img, &fallback_image());
        assert_eq!(img.width(), FALLBACK_SIZE);
        assert_eq!(img.height(), FALLBACK_SIZE);
        assert_eq!(img.channels(), 3);
        assert!(img.as_slice().iter().all(|&v| v == 255));
    }

    #[test]
    fn transparent_overlay_keeps_background() {
        let bg = background();
        let fg = Image::filled_u8(4, 4, &[200, 100, 50, 0]);
        let out = composite(Some(&fg), Some(&bg), &[]);
        assert_eq!(out, bg);
    }

    #[test]
    fn opaque_overlay_replaces_covered_pixels() {
        let bg = background();
        let fg = Image::filled_u8(4, 4, &[200, 100, 50, 255]);
        // source corners (0,0)..(3,3) onto (2,2)..(5,5): a pure shift
        let corners = Quad::rect(2.0, 2.0, 3.0, 3.0);
        let out = composite(Some(&fg), Some(&bg), corners.corners());

        assert_eq!(out.width(), bg.width());
        assert_eq!(out.height(), bg.height());
        for (x, y) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
            assert_eq!(out.pixel(x, y), &[200, 100, 50], "at ({x}, {y})");
        }
        for (x, y) in [(0, 0), (1, 1), (7, 7), (11, 9), (0, 9)] {
            assert_eq!(out.pixel(x, y), bg.pixel(x, y), "at ({x}, {y})");
        }
    }

    #[test]
    fn half_alpha_mixes() {
        let bg = Image::filled_u8(4, 4, &[0, 0, 0]);
        let fg = Image::filled_u8(4, 4, &[255, 255, 255, 128]);
        let corners = Quad::rect(0.0, 0.0, 3.0, 3.0);
        let out = composite(Some(&fg), Some(&bg), corners.corners());
        assert_eq!(out.pixel(1, 1), &[128, 128, 128]);
    }

    #[test]
    fn sixteen_bit_uses_full_range() {
        let bg = Image::from_size_val(4, 4, 3, BitDepth::Sixteen, 1000);
        let mut fg = Image::from_size_val(4, 4, 4, BitDepth::Sixteen, 40000);
        for px in fg.as_slice_mut().chunks_exact_mut(4) {
            px[3] = u16::MAX;
        }
        let corners = Quad::rect(0.0, 0.0, 3.0, 3.0);
        let out = composite(Some(&fg), Some(&bg), corners.corners());
        assert_eq!(out.depth(), BitDepth::Sixteen);
        assert_eq!(out.pixel(2, 2), &[40000, 40000, 40000]);
    }

    #[test]
    fn invalid_inputs_fall_back() {
        let bg = background();
        let rgba = Image::filled_u8(4, 4, &[1, 2, 3, 255]);
        let rgb = Image::filled_u8(4, 4, &[1, 2, 3]);
        let gray_bg = Image::filled_u8(12, 10, &[9]);
        let deep = Image::from_size_val(4, 4, 4, BitDepth::Sixteen, 0);

        assert_white_fallback(&composite(None, Some(&bg), &[]));
        assert_white_fallback(&composite(Some(&rgba), None, &[]));
        assert_white_fallback(&composite(Some(&rgb), Some(&bg), &[]));
        assert_white_fallback(&composite(Some(&rgba), Some(&gray_bg), &[]));
        assert_white_fallback(&composite(Some(&deep), Some(&bg), &[]));
    }

    #[test]
    fn degenerate_corners_fall_back() {
        let bg = background();
        let fg = Image::filled_u8(4, 4, &[1, 2, 3, 255]);
        let collinear = [
            Point::new(1.0, 1.0),
            Point::new(3.0, 3.0),
            Point::new(5.0, 5.0),
            Point::new(7.0, 7.0),
        ];
        assert_white_fallback(&composite(Some(&fg), Some(&bg), &collinear));

        // a one pixel wide overlay has no area to map from
        let thin = Image::filled_u8(1, 4, &[1, 2, 3, 255]);
        assert_white_fallback(&composite(Some(&thin), Some(&bg), &[]));
    }

    #[test]
    fn default_placement_centers() {
        let quad = default_placement(4, 2, 12, 10);
        assert_eq!(
            quad.corners(),
            &[
                Point::new(4.0, 4.0),
                Point::new(8.0, 4.0),
                Point::new(8.0, 6.0),
                Point::new(4.0, 6.0),
            ]
        );
        // odd difference truncates, larger overlay gives a negative offset
        assert_eq!(default_placement(3, 3, 10, 10).corners()[0], Point::new(3.0, 3.0));
        assert_eq!(default_placement(15, 4, 10, 10).corners()[0], Point::new(-2.0, 3.0));
    }

    #[test]
    fn too_few_corners_uses_default_placement() {
        let bg = background();
        let mut fg = Image::filled_u8(4, 4, &[200, 100, 50, 255]);
        fg.pixel_mut(0, 0)[0] = 10;

        let explicit = default_placement(4, 4, 12, 10);
        let with_default = composite(Some(&fg), Some(&bg), &[Point::new(0.0, 0.0); 3]);
        assert_eq!(with_default, composite(Some(&fg), Some(&bg), explicit.corners()));
        assert_eq!(with_default, composite(Some(&fg), Some(&bg), &[]));
        // top-left overlay pixel lands on the placement's top-left corner
        assert_eq!(with_default.pixel(4, 3)[0], 10);
    }
}
