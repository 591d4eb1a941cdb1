// The three demos. Each one opens a window sized to the background and runs
// until ESC (or the window is closed).
//
// editor      drag the overlay's corners, perspective alpha composite live
// transparent the overlay alpha-composited at the center, once
// pinp        four affine picture-in-picture frames, any key advances

use std::path::Path;

use crate::composite::{composite, default_placement};
use crate::draw::{Drawer, draw_quad_outline};
use crate::editor::{self, EditorSession, HANDLE_HALF_SIZE, Outline, Redraw};
use crate::error::Error;
use crate::geometry::{Homography, Point};
use crate::input::PointerTracker;
use crate::types::{FrameBuffer, Image};
use crate::warp::{Interpolation, warp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demo {
    Editor,
    Transparent,
    Pinp,
}

impl Demo {
    /// (background, overlay) used when no path is given on the command line.
    pub fn default_images(self) -> (&'static str, &'static str) {
        match self {
            Demo::Editor | Demo::Transparent => ("images/lena.jpg", "images/OpenCV_Logo.png"),
            Demo::Pinp => ("images/biei.jpg", "images/lena_small.jpg"),
        }
    }

    /// Printed once the images are loaded.
    pub fn hint(self) -> &'static str {
        match self {
            Demo::Editor => "Press ESC key to quit",
            Demo::Transparent => "Press ANY key to quit",
            Demo::Pinp => "Press ANY key to progress",
        }
    }

    /// The editor and the still composite need the overlay's alpha channel;
    /// picture-in-picture pastes an opaque colour image.
    pub fn load(self, background: &Path, overlay: &Path) -> Result<(Image, Image), Error> {
        let bg = load_color(background)?;
        let fg = match self {
            Demo::Editor | Demo::Transparent => load_unchanged(overlay)?,
            Demo::Pinp => load_color(overlay)?,
        };
        log::info!(
            "background {:?}: {}x{} {}ch, overlay {:?}: {}x{} {}ch/{}bit",
            background,
            bg.width(),
            bg.height(),
            bg.channels(),
            overlay,
            fg.width(),
            fg.height(),
            fg.channels(),
            fg.depth().bits()
        );
        Ok((bg, fg))
    }

    pub fn run(self, background: &Image, overlay: &Image) -> Result<(), Error> {
        match self {
            Demo::Editor => run_editor(background, overlay),
            Demo::Transparent => run_transparent(background, overlay),
            Demo::Pinp => run_pinp(background, overlay),
        }
    }
}

/// Decode as 8-bit RGB whatever the file holds.
pub fn load_color(path: &Path) -> Result<Image, Error> {
    let img = image::open(path)
        .map_err(|source| Error::ImageLoad { path: path.to_path_buf(), source })?;
    Ok(Image::from_dynamic(image::DynamicImage::ImageRgb8(img.to_rgb8())))
}

/// Decode keeping channels (alpha included) and bit depth.
pub fn load_unchanged(path: &Path) -> Result<Image, Error> {
    let img = image::open(path)
        .map_err(|source| Error::ImageLoad { path: path.to_path_buf(), source })?;
    Ok(Image::from_dynamic(img))
}

fn render(
    drawer: &mut Drawer,
    overlay: &Image,
    background: &Image,
    session: &EditorSession,
    outline: Outline,
) -> Result<(), Error> {
    let frame = composite(Some(overlay), Some(background), session.quad().corners());
    let mut fb = FrameBuffer::from_image(&frame);
    if let Outline::Visible(color) = outline {
        draw_quad_outline(&mut fb, session.quad(), HANDLE_HALF_SIZE, color);
    }
    drawer.present(&fb)
}

fn run_editor(background: &Image, overlay: &Image) -> Result<(), Error> {
    let (w, h) = (background.width(), background.height());
    let mut drawer = Drawer::new("Perspective overlay", w, h)?;

    let start = default_placement(overlay.width(), overlay.height(), w, h);
    let mut session = EditorSession::new(start, w, h);
    let mut redraw = Redraw::new();
    let mut pointer = PointerTracker::new();

    render(&mut drawer, overlay, background, &session, redraw.initial())?;

    while drawer.is_open() && !drawer.esc_pressed() {
        if let Some(event) = pointer.poll(drawer.mouse_pos(), drawer.left_mouse_down()) {
            session = editor::handle(session, event);
        }

        match redraw.poll(&mut session) {
            Some(outline) => render(&mut drawer, overlay, background, &session, outline)?,
            None => drawer.poll(),
        }
    }

    log::info!("final corners: {:?}", session.quad().corners());
    Ok(())
}

/// Keep `fb` on screen until a key goes down. Returns false when the user asked
/// to stop (ESC or window closed).
fn show_until_key(drawer: &mut Drawer, fb: &FrameBuffer) -> Result<bool, Error> {
    while drawer.is_open() {
        drawer.present(fb)?;
        if drawer.any_key_pressed_once() {
            return Ok(!drawer.esc_pressed());
        }
    }
    Ok(false)
}

fn run_transparent(background: &Image, overlay: &Image) -> Result<(), Error> {
    let mut drawer = Drawer::new("Transparent overlay", background.width(), background.height())?;
    let frame = composite(Some(overlay), Some(background), &[]);
    show_until_key(&mut drawer, &FrameBuffer::from_image(&frame))?;
    Ok(())
}

/// The four picture-in-picture placements for a `w` x `h` overlay.
pub fn pinp_transforms(w: usize, h: usize) -> Result<[(&'static str, Homography); 4], Error> {
    let center = Point::new((w / 2) as f64, (h / 2) as f64);
    let rotation = Homography::rotation(center, 45.0, 1.0);
    let (w, h) = (w as f64, h as f64);
    let corners = Homography::from_affine_points(
        [Point::new(0.0, 0.0), Point::new(w, 0.0), Point::new(w, h)],
        [Point::new(100.0, 100.0), Point::new(450.0, 100.0), Point::new(450.0, 380.0)],
    )
    .ok_or(Error::SingularTransform)?;

    Ok([
        ("translate", Homography::translation(100.0, 100.0)),
        ("rotate", rotation),
        ("rotate + translate", rotation.then_translate(100.0, 100.0)),
        ("corners", corners),
    ])
}

fn run_pinp(background: &Image, overlay: &Image) -> Result<(), Error> {
    let mut drawer = Drawer::new("Picture in picture", background.width(), background.height())?;

    for (name, m) in pinp_transforms(overlay.width(), overlay.height())? {
        log::info!("picture in picture: {name}");
        let mut frame = background.clone();
        warp(overlay, &mut frame, &m, Interpolation::Bilinear)?;
        if !show_until_key(&mut drawer, &FrameBuffer::from_image(&frame))? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Demo, load_color, load_unchanged, pinp_transforms};
    use crate::error::Error;
    use crate::geometry::Point;
    use crate::types::BitDepth;
    use approx::assert_abs_diff_eq;
    use std::path::Path;

    #[test]
    fn pinp_corner_frame_spans_target_box() -> Result<(), Error> {
        let frames = pinp_transforms(200, 100)?;
        let (_, corners) = frames[3];
        let p = corners.transform_point(Point::new(200.0, 100.0)).unwrap();
        assert_abs_diff_eq!(p.x, 450.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, 380.0, epsilon = 1e-9);

        let (_, moved) = frames[0];
        assert_eq!(moved.transform_point(Point::new(0.0, 0.0)), Some(Point::new(100.0, 100.0)));

        // rotation keeps the overlay center fixed
        let (_, rot) = frames[1];
        let c = rot.transform_point(Point::new(100.0, 50.0)).unwrap();
        assert_abs_diff_eq!(c.x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y, 50.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let res = load_color(Path::new("images/does-not-exist.jpg"));
        assert!(matches!(res, Err(Error::ImageLoad { .. })));
        let res = Demo::Editor.load(Path::new("nope.jpg"), Path::new("nope.png"));
        assert!(res.is_err());
    }

    #[test]
    fn load_keeps_alpha_only_when_unchanged() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("overlay.png");
        image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 4])).save(&path)?;

        let unchanged = load_unchanged(&path)?;
        assert_eq!(unchanged.channels(), 4);
        assert_eq!(unchanged.pixel(0, 0), &[1, 2, 3, 4]);

        let color = load_color(&path)?;
        assert_eq!(color.channels(), 3);
        assert_eq!(color.depth(), BitDepth::Eight);
        Ok(())
    }
}
