//! The orchestrator (spec section 4.7): drives per-frame encode/decode and
//! computes the number of frames a payload needs.
//!
//! Grounded on `original_source/src/main_steganogif.cpp` and the `encode()`/
//! `decode()` bodies in `steganogif.h` for the overall open-carrier,
//! build-palette, stream-frames shape. The `bits_per_pixel > 8` branch below
//! mirrors `steganogif.h:135`'s `if (l_bmp.get_nb_bits_per_pixel() > 8)`.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::color::Rgb8;
use crate::envelope::{self, DecodedEnvelope};
use crate::error::{SteganoError, SteganoResult};
use crate::frame::Frame;
use crate::frame_codec;
use crate::hashing::password_seed_words;
use crate::palette::{self, PaletteMapper};
use crate::rng::Mt19937;
use crate::twin::TwinMap;

/// `⌈8·envelope_len / pixels_per_frame⌉`, with at least one frame.
#[must_use]
fn frame_count_for(envelope_len: usize, pixels_per_frame: usize) -> usize {
  let bits = 8 * envelope_len;
  (bits + pixels_per_frame - 1) / pixels_per_frame
}

/// Pads an already-paletted carrier's native color table to an even length
/// so every color has a twin-pairing partner (spec section 4.4), appending
/// one synthesized color distinct from every existing entry when the native
/// table has an odd length. Real BMP color tables are conventionally sized
/// as powers of two, so this is a defensive top-up rather than a normal path.
fn pad_for_twin_pairing(native: &[Rgb8]) -> SteganoResult<Vec<Rgb8>> {
  if native.is_empty() {
    return Err(SteganoError::Carrier("native carrier palette is empty"));
  }
  let mut palette = native.to_vec();
  if palette.len() % 2 != 0 {
    let base = *palette.last().expect("checked non-empty above");
    let existing: HashSet<Rgb8> = palette.iter().copied().collect();
    let mut delta: u32 = 1;
    loop {
      if delta > 255 {
        return Err(SteganoError::Carrier(
          "could not synthesize a distinct color to pad an odd-length native palette",
        ));
      }
      let candidate = base.with_channel(0, ((u32::from(base.r) + delta) % 256) as u8);
      if !existing.contains(&candidate) {
        palette.push(candidate);
        break;
      }
      delta += 1;
    }
  }
  Ok(palette)
}

/// Encode `payload` into `frame_count` frames built from a carrier of
/// `width * height` pixels (row-major). `carrier_pixels` supplies the
/// expanded true-color samples; `bits_per_pixel` and `native_palette` (the
/// carrier's own `(palette, index plane)`, present whenever the carrier is
/// already paletted) decide how the frame palette is produced:
///
/// - `bits_per_pixel > 8`: a fresh 256-color palette is built from the whole
///   carrier image and every pixel is remapped onto it (spec section 4.3).
/// - `bits_per_pixel <= 8`: the carrier's own palette and index plane are
///   reused directly — no new palette is built and no pixel is re-quantized.
pub fn encode(
  password: &str,
  width: u32,
  height: u32,
  carrier_pixels: &[Rgb8],
  bits_per_pixel: u16,
  native_palette: Option<(&[Rgb8], &[u8])>,
  payload: &[u8],
) -> SteganoResult<Vec<Frame>> {
  let pixels_per_frame = width as usize * height as usize;
  if pixels_per_frame == 0 || pixels_per_frame % 8 != 0 {
    return Err(SteganoError::BadGeometry { width, height });
  }
  if carrier_pixels.len() != pixels_per_frame {
    return Err(SteganoError::Carrier("carrier pixel count does not match width*height"));
  }

  let envelope = envelope::build_envelope(payload);
  info!("built envelope: {} bytes for a {}-byte payload", envelope.len(), payload.len());

  let (palette, indices): (Vec<Rgb8>, Vec<u8>) = if bits_per_pixel > 8 {
    let palette = palette::build_palette()?;
    let mut mapper = PaletteMapper::new(&palette, carrier_pixels);
    let indices: Vec<u8> = carrier_pixels.iter().map(|&c| mapper.map(c)).collect();
    debug!("reduced carrier to {} palette entries", palette.len());
    (palette.to_vec(), indices)
  } else {
    let (native_colors, native_indices) = native_palette
      .ok_or(SteganoError::Carrier("carrier is <=8bpp but no native palette was supplied"))?;
    if native_indices.len() != pixels_per_frame {
      return Err(SteganoError::Carrier("native index plane length does not match width*height"));
    }
    let palette = pad_for_twin_pairing(native_colors)?;
    debug!("reusing the carrier's own {}-color palette", palette.len());
    (palette, native_indices.to_vec())
  };

  let twin = TwinMap::build(&palette)?;

  let frame_count = frame_count_for(envelope.len(), pixels_per_frame);
  info!("streaming {frame_count} frame(s)");

  let seed = password_seed_words(password);
  let mut rng = Mt19937::from_seed_seq(&seed);
  let mut pad_rng = Mt19937::from_wall_clock();
  let mut off = 0usize;

  let mut frames = Vec::with_capacity(frame_count);
  for frame_index in 0..frame_count {
    let mut frame = Frame::new(width, height, palette.clone(), indices.clone())?;
    let color_index = frame.color_index_map();
    frame_codec::encode_frame(&mut frame, &mut rng, &twin, &color_index, &envelope, &mut off, &mut pad_rng)?;
    debug!("encoded frame {frame_index} ({} bytes consumed of {})", off, envelope.len());
    frames.push(frame);
  }

  Ok(frames)
}

/// Decode a password-hidden payload from a sequence of already-parsed
/// container frames. Each frame's palette is taken as its own "active
/// palette" (global or local, per spec section 4.7) and a fresh twin
/// involution is rebuilt for it every time, since consecutive frames are not
/// guaranteed to share one.
///
/// Header parsing is attempted as soon as any bytes have been decoded,
/// rather than strictly gating on "only after frame one" — spec section 9
/// calls this an open question that does not affect wire compatibility, and
/// attempting early is strictly more robust to payloads whose header lands
/// entirely within the first frame (the common case) while still falling
/// back correctly when it doesn't.
pub fn decode(password: &str, frames: impl IntoIterator<Item = Frame>) -> SteganoResult<DecodedEnvelope> {
  let seed = password_seed_words(password);
  let mut rng = Mt19937::from_seed_seq(&seed);
  let mut acc: Vec<u8> = Vec::new();
  let mut header: Option<(usize, u32)> = None;

  for (frame_index, frame) in frames.into_iter().enumerate() {
    if frame.pixel_count() == 0 || frame.pixel_count() % 8 != 0 {
      return Err(SteganoError::BadGeometry { width: frame.width, height: frame.height });
    }
    let twin = TwinMap::build(&frame.palette)?;
    let bytes = frame_codec::decode_frame(&frame, &mut rng, &twin)?;
    acc.extend_from_slice(&bytes);
    debug!("decoded frame {frame_index}, {} bytes accumulated", acc.len());

    if header.is_none() && !acc.is_empty() {
      if let Ok((payload_size, header_len)) = envelope::parse_header(&acc) {
        header = Some((header_len, payload_size));
      }
    }

    if let Some((header_len, payload_size)) = header {
      let needed = header_len + payload_size as usize + 20;
      if acc.len() >= needed {
        return Ok(envelope::finish_decode(&acc, header_len, payload_size as usize));
      }
    }
  }

  warn!("ran out of frames before the envelope completed");
  Ok(DecodedEnvelope::NoContent)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn gradient_carrier(width: u32, height: u32) -> Vec<Rgb8> {
    (0..width * height)
      .map(|i| Rgb8::new((i % 256) as u8, ((i * 3) % 256) as u8, ((i * 7) % 256) as u8))
      .collect()
  }

  #[test]
  fn frame_count_matches_the_spec_formula() {
    // spec section 8, scenario 2: 40x40 carrier, 1024-byte payload.
    let envelope_len = 2 + 1024 + 20;
    assert_eq!(frame_count_for(envelope_len, 1600), 6);
  }

  #[test]
  fn tiny_payload_round_trips() {
    let width = 32;
    let height = 32;
    let carrier = gradient_carrier(width, height);
    let payload = b"ok".to_vec();

    let frames = encode("pw", width, height, &carrier, 24, None, &payload).unwrap();
    assert!(!frames.is_empty());

    match decode("pw", frames).unwrap() {
      DecodedEnvelope::Payload(p) => assert_eq!(p, payload),
      DecodedEnvelope::NoContent => panic!("expected a payload"),
    }
  }

  #[test]
  fn wrong_password_yields_no_content() {
    let width = 32;
    let height = 32;
    let carrier = gradient_carrier(width, height);
    let payload = b"ok".to_vec();

    let frames = encode("pw", width, height, &carrier, 24, None, &payload).unwrap();
    match decode("not-pw", frames).unwrap() {
      DecodedEnvelope::NoContent => {}
      DecodedEnvelope::Payload(_) => panic!("wrong password should not decode"),
    }
  }

  #[test]
  fn odd_geometry_fails_before_writing_anything() {
    let carrier = gradient_carrier(33, 32);
    let err = encode("pw", 33, 32, &carrier, 24, None, b"x").unwrap_err();
    assert!(matches!(err, SteganoError::BadGeometry { width: 33, height: 32 }));
  }

  #[test]
  fn indexed_carrier_reuses_its_own_palette_instead_of_building_a_fresh_one() {
    // spec section 4.3: "applies only when the carrier has more than 8 bits
    // per pixel" — an <=8bpp carrier's native palette and index plane pass
    // straight through untouched.
    let width = 8;
    let height = 8;
    let native_palette = [
      Rgb8::new(0, 0, 0),
      Rgb8::new(10, 10, 10),
      Rgb8::new(20, 20, 20),
      Rgb8::new(30, 30, 30),
    ];
    let native_indices: Vec<u8> = (0..width * height).map(|i| (i % native_palette.len() as u32) as u8).collect();
    let carrier_pixels: Vec<Rgb8> = native_indices.iter().map(|&i| native_palette[i as usize]).collect();
    let payload = b"ok".to_vec();

    let frames = encode(
      "pw",
      width,
      height,
      &carrier_pixels,
      8,
      Some((&native_palette, &native_indices)),
      &payload,
    )
    .unwrap();
    assert_eq!(frames[0].palette[..native_palette.len()], native_palette[..]);
    assert_eq!(frames[0].indices, native_indices);

    match decode("pw", frames).unwrap() {
      DecodedEnvelope::Payload(p) => assert_eq!(p, payload),
      DecodedEnvelope::NoContent => panic!("expected a payload"),
    }
  }

  #[test]
  fn indexed_carrier_without_a_native_palette_is_an_error() {
    let width = 8;
    let height = 8;
    let carrier = gradient_carrier(width, height);
    let err = encode("pw", width, height, &carrier, 8, None, b"x").unwrap_err();
    assert!(matches!(err, SteganoError::Carrier(_)));
  }
}
