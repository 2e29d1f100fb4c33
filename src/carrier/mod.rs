//! The carrier collaborator (spec section 6): reads and writes the still
//! image the payload is hidden inside. Out of the codec core's scope, but a
//! concrete BMP implementation is provided so the crate is actually usable
//! end to end.

pub mod bmp;

use crate::color::Rgba8;
use crate::error::SteganoResult;

/// A decoded still image: dimensions, original bit depth, an optional
/// palette (present for bit depths of 8 or less), always-expanded true-color
/// pixel data in row-major, top-down order, and — for already-paletted
/// (<=8bpp) carriers — the original per-pixel palette index plane, so callers
/// can reuse the carrier's own palette instead of building a new one (spec
/// section 4.3's ">8bpp" scope note).
#[derive(Debug, Clone)]
pub struct StillImage {
  pub width: u32,
  pub height: u32,
  pub bits_per_pixel: u16,
  pub palette: Option<Vec<Rgba8>>,
  pub pixels: Vec<Rgba8>,
  pub indices: Option<Vec<u8>>,
}

/// `read_still(path) -> (W, H, bpp, palette?, pixels)`, per spec section 6.
pub fn read_still(path: &std::path::Path) -> SteganoResult<StillImage> {
  let bytes = std::fs::read(path)?;
  bmp::decode(&bytes)
}

/// `write_still(path, frame)`, writing a 256-color indexed BMP.
pub fn write_still(path: &std::path::Path, frame: &crate::frame::Frame) -> SteganoResult<()> {
  let bytes = bmp::encode(frame);
  std::fs::write(path, bytes)?;
  Ok(())
}
