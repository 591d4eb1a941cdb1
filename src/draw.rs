// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the composited frame.
// 2) The quadrilateral outline with square corner handles on top of it.

use crate::error::Error;
use crate::geometry::Quad;
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a window sized to the background image, polled at ~60 Hz.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Process window events without changing what is shown.
    pub fn poll(&mut self) {
        self.window.update();
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// True while ESC is held down (we exit when this is pressed).
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// True on the frame any key goes down.
    pub fn any_key_pressed_once(&self) -> bool {
        !self.window.get_keys_pressed(KeyRepeat::No).is_empty()
    }

    /// Mouse position in window pixels. Outside the window it is clamped to the
    /// nearest edge, so a drag carried past the border still ends on it.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Clamp)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }
}

/* ---------- Software drawing: pixels, lines, handles ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Draw a thin line between (x0,y0) and (x1,y1) using Bresenham.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0, x1, y1) = (x0, y0, x1, y1);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Filled square of ±`half` pixels around (cx,cy).
fn fill_square(fb: &mut FrameBuffer, cx: i32, cy: i32, half: i32, color: u32) {
    for y in (cy - half)..=(cy + half) {
        for x in (cx - half)..=(cx + half) {
            put_pixel(fb, x, y, color);
        }
    }
}

/// The quad as a closed polygon plus a filled handle at each corner.
pub fn draw_quad_outline(fb: &mut FrameBuffer, quad: &Quad, handle_half: i32, color: u32) {
    for (a, b) in quad.edges() {
        let (ax, ay) = (a.x.round() as i32, a.y.round() as i32);
        draw_line(fb, ax, ay, b.x.round() as i32, b.y.round() as i32, color);
        fill_square(fb, ax, ay, handle_half, color);
    }
}
