// One error type for the whole program.
// Every variant states *where* things went wrong.
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Creating the window failed.
    #[error("Window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed.
    #[error("Window update error: {0}")]
    WindowUpdate(String),

    /// Reading or decoding an input image failed.
    #[error("Cannot load image {path:?}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Sample buffer length does not match width * height * channels.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidDataLength(usize, usize),

    /// Two images that must share a channel count do not.
    #[error("Channel count mismatch: {0} vs {1}")]
    ChannelMismatch(usize, usize),

    /// Two images that must share a bit depth do not.
    #[error("Bit depth mismatch: {0} vs {1} bits")]
    DepthMismatch(u32, u32),

    /// The transform matrix cannot be inverted.
    #[error("Transform matrix is singular")]
    SingularTransform,
}
