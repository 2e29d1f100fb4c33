//! Per-pixel bit embedding (spec section 4.5): the shared Fisher-Yates
//! permutation, the swap-mask bit, and the twin-pair read/write that stores
//! or recovers one payload bit per pixel.
//!
//! Grounded on `original_source/include/steganogif.h`'s per-pixel encode/decode
//! loop — the draw order (permutation index, then swap bit) and the
//! pixel-list rebuild per frame are carried over exactly.

use std::collections::HashMap;

use crate::color::Rgb8;
use crate::error::{SteganoError, SteganoResult};
use crate::frame::Frame;
use crate::rng::Mt19937;
use crate::twin::TwinMap;

#[inline]
fn get_bit(byte: u8, bit_index: u32) -> bool {
  (byte >> bit_index) & 1 != 0
}

#[inline]
fn set_bit(byte: &mut u8, bit_index: u32, value: bool) {
  if value {
    *byte |= 1 << bit_index;
  } else {
    *byte &= !(1 << bit_index);
  }
}

fn row_major_positions(width: u32, height: u32) -> Vec<(u32, u32)> {
  (0..height).flat_map(|y| (0..width).map(move |x| (x, y))).collect()
}

fn check_geometry(frame: &Frame) -> SteganoResult<usize> {
  let total = frame.pixel_count();
  if total == 0 || total % 8 != 0 {
    return Err(SteganoError::BadGeometry { width: frame.width, height: frame.height });
  }
  Ok(total)
}

/// Stripe `data[off..]` into `frame` in place, advancing `off` by
/// `pixel_count / 8`. Bytes beyond `data`'s end are filled from `pad_rng`
/// (spec section 4.5 step 2) and never from `rng`.
pub fn encode_frame(
  frame: &mut Frame,
  rng: &mut Mt19937,
  twin: &TwinMap,
  color_index: &HashMap<Rgb8, u8>,
  data: &[u8],
  off: &mut usize,
  pad_rng: &mut Mt19937,
) -> SteganoResult<()> {
  let total = check_geometry(frame)?;
  let mut perm = row_major_positions(frame.width, frame.height);

  for i in 0..total {
    let bound = (total - i) as u32;
    let j = i + rng.next_bounded(bound) as usize;
    perm.swap(i, j);

    let byte_index = *off + i / 8;
    let bit_index = (i % 8) as u32;
    let data_bit = if byte_index < data.len() { get_bit(data[byte_index], bit_index) } else { pad_rng.next_bit() };
    let swap = rng.next_bit();

    let (x, y) = perm[i];
    let pos = y as usize * frame.width as usize + x as usize;
    let c = frame.color_at(pos);
    let t = twin.twin(c);
    let (low, high) = if c < t { (c, t) } else { (t, c) };
    let out_color = if data_bit ^ swap { high } else { low };
    let out_index = *color_index
      .get(&out_color)
      .unwrap_or_else(|| panic!("{out_color:?} is not present in this frame's palette"));
    frame.indices[pos] = out_index;
  }

  *off += total / 8;
  Ok(())
}

/// Recover `pixel_count / 8` bytes from `frame`, consuming `rng` exactly the
/// way [`encode_frame`] did.
pub fn decode_frame(frame: &Frame, rng: &mut Mt19937, twin: &TwinMap) -> SteganoResult<Vec<u8>> {
  let total = check_geometry(frame)?;
  let mut perm = row_major_positions(frame.width, frame.height);
  let mut out = vec![0u8; total / 8];

  for i in 0..total {
    let bound = (total - i) as u32;
    let j = i + rng.next_bounded(bound) as usize;
    perm.swap(i, j);
    let swap = rng.next_bit();

    let (x, y) = perm[i];
    let pos = y as usize * frame.width as usize + x as usize;
    let c = frame.color_at(pos);
    let t = twin.twin(c);
    let bit = (t < c) ^ swap;
    set_bit(&mut out[i / 8], (i % 8) as u32, bit);
  }

  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::hashing::password_seed_words;

  fn checkerboard_frame(width: u32, height: u32) -> (Frame, TwinMap) {
    let palette = vec![Rgb8::new(0, 0, 0), Rgb8::new(0, 0, 1), Rgb8::new(255, 255, 254), Rgb8::new(255, 255, 255)];
    let twin = TwinMap::build(&palette).unwrap();
    let indices: Vec<u8> = (0..width as usize * height as usize).map(|i| (i % 2) as u8 * 2).collect();
    let frame = Frame::new(width, height, palette, indices).unwrap();
    (frame, twin)
  }

  #[test]
  fn rejects_geometry_not_a_multiple_of_eight() {
    let (mut frame, twin) = checkerboard_frame(3, 1);
    let mut rng = Mt19937::from_u32_seed(1);
    let mut pad = Mt19937::from_u32_seed(2);
    let map = frame.color_index_map();
    let mut off = 0;
    let err = encode_frame(&mut frame, &mut rng, &twin, &map, b"x", &mut off, &mut pad).unwrap_err();
    assert!(matches!(err, SteganoError::BadGeometry { .. }));
  }

  #[test]
  fn round_trips_a_byte_through_one_frame() {
    let (mut frame, twin) = checkerboard_frame(8, 8);
    let seed = password_seed_words("pw");
    let data = [0b1011_0010u8; 8];

    let mut enc_rng = Mt19937::from_seed_seq(&seed);
    let mut pad = Mt19937::from_u32_seed(123);
    let map = frame.color_index_map();
    let mut off = 0;
    encode_frame(&mut frame, &mut enc_rng, &twin, &map, &data, &mut off, &mut pad).unwrap();
    assert_eq!(off, 8);

    let mut dec_rng = Mt19937::from_seed_seq(&seed);
    let recovered = decode_frame(&frame, &mut dec_rng, &twin).unwrap();
    assert_eq!(recovered, data);
  }

  #[test]
  fn padding_bits_come_from_the_pad_generator_not_the_main_stream() {
    let (mut frame, twin) = checkerboard_frame(8, 8);
    let seed = password_seed_words("pw");
    let data: [u8; 0] = [];

    let mut enc_rng = Mt19937::from_seed_seq(&seed);
    let mut pad_a = Mt19937::from_u32_seed(1);
    let map = frame.color_index_map();
    let mut off = 0;
    encode_frame(&mut frame, &mut enc_rng, &twin, &map, &data, &mut off, &mut pad_a).unwrap();

    let (mut frame2, twin2) = checkerboard_frame(8, 8);
    let mut enc_rng2 = Mt19937::from_seed_seq(&seed);
    let mut pad_b = Mt19937::from_u32_seed(2);
    let map2 = frame2.color_index_map();
    let mut off2 = 0;
    encode_frame(&mut frame2, &mut enc_rng2, &twin2, &map2, &data, &mut off2, &mut pad_b).unwrap();

    // Different pad seeds may (not must) pick different bits, but the
    // consumed main-stream offset and frame geometry must agree regardless.
    assert_eq!(off, off2);
  }
}
