// Perspective picture-in-picture: alpha-composite an overlay onto a
// background through a homography, and edit the overlay's corners with the
// mouse.

pub mod composite;
pub mod demo;
pub mod draw;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod types;
pub mod warp;
