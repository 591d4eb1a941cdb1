// Core pixel containers: decoded images and the window framebuffer.

use crate::error::Error;

/// Bits per channel of an [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }

    /// Largest sample value, `2^bits - 1`. Fully opaque alpha has this value.
    pub fn max_value(self) -> u16 {
        match self {
            BitDepth::Eight => u8::MAX as u16,
            BitDepth::Sixteen => u16::MAX,
        }
    }
}

/// Interleaved, row-major image with 1 (gray), 3 (RGB) or 4 (RGBA) channels.
///
/// Samples are stored as `u16` whatever the depth; `depth` tells which range is in use.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    depth: BitDepth,
    data: Vec<u16>,
}

impl Image {
    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidDataLength`] when `data.len() != width * height * channels`.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        depth: BitDepth,
        data: Vec<u16>,
    ) -> Result<Self, Error> {
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(Error::InvalidDataLength(data.len(), expected));
        }
        Ok(Self { width, height, channels, depth, data })
    }

    /// An image with every sample set to `val`.
    pub fn from_size_val(
        width: usize,
        height: usize,
        channels: usize,
        depth: BitDepth,
        val: u16,
    ) -> Self {
        Self {
            width,
            height,
            channels,
            depth,
            data: vec![val; width * height * channels],
        }
    }

    /// An 8-bit image filled with one colour per pixel.
    pub fn filled_u8(width: usize, height: usize, color: &[u8]) -> Self {
        let mut data = Vec::with_capacity(width * height * color.len());
        for _ in 0..width * height {
            data.extend(color.iter().map(|&c| c as u16));
        }
        Self { width, height, channels: color.len(), depth: BitDepth::Eight, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.data
    }

    pub fn as_slice_mut(&mut self) -> &mut [u16] {
        &mut self.data
    }

    /// All channels of the pixel at (x, y). Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u16] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    #[inline]
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> &mut [u16] {
        let start = (y * self.width + x) * self.channels;
        &mut self.data[start..start + self.channels]
    }

    /// Convert a decoded image keeping its channel layout and depth where possible.
    /// Gray+alpha is widened to RGBA; float images are stored as 16-bit.
    pub fn from_dynamic(img: image::DynamicImage) -> Self {
        use image::DynamicImage as D;

        let (w, h) = (img.width() as usize, img.height() as usize);
        let widen = |v: Vec<u8>| v.into_iter().map(u16::from).collect::<Vec<_>>();
        let (channels, depth, data) = match img {
            D::ImageLuma8(b) => (1, BitDepth::Eight, widen(b.into_raw())),
            D::ImageRgb8(b) => (3, BitDepth::Eight, widen(b.into_raw())),
            D::ImageRgba8(b) => (4, BitDepth::Eight, widen(b.into_raw())),
            D::ImageLumaA8(b) => {
                let rgba = D::ImageLumaA8(b).to_rgba8();
                (4, BitDepth::Eight, widen(rgba.into_raw()))
            }
            D::ImageLuma16(b) => (1, BitDepth::Sixteen, b.into_raw()),
            D::ImageRgb16(b) => (3, BitDepth::Sixteen, b.into_raw()),
            D::ImageRgba16(b) => (4, BitDepth::Sixteen, b.into_raw()),
            other if other.color().has_alpha() => {
                (4, BitDepth::Sixteen, other.to_rgba16().into_raw())
            }
            other => (3, BitDepth::Sixteen, other.to_rgb16().into_raw()),
        };
        Self { width: w, height: h, channels, depth, data }
    }
}

/// What the window displays.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// Pack an image into `0x00RRGGBB`. 16-bit samples keep their high byte;
    /// gray is replicated and anything past the third channel is ignored.
    pub fn from_image(img: &Image) -> Self {
        let shift = img.depth().bits() - 8;
        let mut pixels = Vec::with_capacity(img.width() * img.height());
        for px in img.as_slice().chunks_exact(img.channels()) {
            let (r, g, b) = match px {
                [v] | [v, _] => (*v, *v, *v),
                [r, g, b, ..] => (*r, *g, *b),
                [] => (0, 0, 0),
            };
            let (r, g, b) = ((r >> shift) as u32, (g >> shift) as u32, (b >> shift) as u32);
            pixels.push((r << 16) | (g << 8) | b);
        }
        Self { width: img.width(), height: img.height(), pixels }
    }
}
