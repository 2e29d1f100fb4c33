//! The frame representation shared by the codec core and both external
//! collaborators (spec section 3: `(width, height, palette[256], indices)`).

use std::collections::HashMap;

use crate::color::Rgb8;
use crate::error::SteganoError;

/// One indexed-color frame. `palette` need not be exactly 256 entries — a
/// container's per-frame color table can be shorter — but every value in
/// `indices` must be in range for it.
#[derive(Debug, Clone)]
pub struct Frame {
  pub width: u32,
  pub height: u32,
  pub palette: Vec<Rgb8>,
  pub indices: Vec<u8>,
}

impl Frame {
  pub fn new(width: u32, height: u32, palette: Vec<Rgb8>, indices: Vec<u8>) -> Result<Self, SteganoError> {
    let expected = width as usize * height as usize;
    if indices.len() != expected {
      return Err(SteganoError::Carrier("frame index-plane length does not match width*height"));
    }
    for &i in &indices {
      if (i as usize) >= palette.len() {
        return Err(SteganoError::Carrier("frame index references a color outside its palette"));
      }
    }
    Ok(Self { width, height, palette, indices })
  }

  #[must_use]
  pub fn pixel_count(&self) -> usize {
    self.width as usize * self.height as usize
  }

  #[must_use]
  pub fn color_at(&self, pos: usize) -> Rgb8 {
    self.palette[self.indices[pos] as usize]
  }

  /// First-occurrence-wins reverse lookup, used by the frame codec to turn a
  /// computed output color back into a palette index.
  #[must_use]
  pub fn color_index_map(&self) -> HashMap<Rgb8, u8> {
    let mut map = HashMap::with_capacity(self.palette.len());
    for (i, &c) in self.palette.iter().enumerate() {
      map.entry(c).or_insert(i as u8);
    }
    map
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_mismatched_index_plane_length() {
    let palette = vec![Rgb8::new(0, 0, 0), Rgb8::new(1, 1, 1)];
    let indices = vec![0u8; 3];
    assert!(Frame::new(2, 2, palette, indices).is_err());
  }

  #[test]
  fn rejects_out_of_range_index() {
    let palette = vec![Rgb8::new(0, 0, 0)];
    let indices = vec![0u8, 1u8];
    assert!(Frame::new(2, 1, palette, indices).is_err());
  }

  #[test]
  fn color_index_map_prefers_first_occurrence() {
    let palette = vec![Rgb8::new(1, 1, 1), Rgb8::new(1, 1, 1)];
    let frame = Frame::new(1, 1, palette, vec![0]).unwrap();
    let map = frame.color_index_map();
    assert_eq!(map.get(&Rgb8::new(1, 1, 1)), Some(&0));
  }
}
