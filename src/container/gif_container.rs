//! Wraps the `gif` crate to satisfy the container interface of spec section
//! 6: encode appends a paletted still per frame and emits a trailer; decode
//! parses graphic blocks bearing `(left, top, width, height, local_palette?,
//! indices)` plus each block's disposal method.
//!
//! The disposal-ordering rule in spec section 9 — save the affected
//! rectangle *before* drawing the incoming frame when `disposal == Previous`,
//! restore it *after* that frame has been fully processed — is implemented
//! literally in [`decode_animation`]'s per-frame loop.

use gif::{DisposalMethod, Encoder};
use log::warn;

use crate::color::Rgb8;
use crate::error::SteganoError;
use crate::frame::Frame;

fn palette_to_bytes(palette: &[Rgb8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(palette.len() * 3);
  for c in palette {
    out.extend_from_slice(&[c.r, c.g, c.b]);
  }
  out
}

fn bytes_to_palette(bytes: &[u8]) -> Vec<Rgb8> {
  bytes.chunks_exact(3).map(|c| Rgb8::new(c[0], c[1], c[2])).collect()
}

/// Stream `frames` into an in-memory GIF. Every frame is expected to share
/// one palette (the codec core only ever builds one per run) and to cover
/// the full canvas, so every frame is written with [`DisposalMethod::Keep`]
/// — nothing needs restoring between frames of our own output.
pub fn encode_animation(frames: &[Frame]) -> Result<Vec<u8>, SteganoError> {
  let Some(first) = frames.first() else {
    return Err(SteganoError::Carrier("cannot encode a GIF with zero frames"));
  };
  let width = first.width as u16;
  let height = first.height as u16;
  let global_palette = palette_to_bytes(&first.palette);

  let mut out = Vec::new();
  {
    let mut encoder = Encoder::new(&mut out, width, height, &global_palette)?;
    for frame in frames {
      let mut gif_frame = gif::Frame::from_indexed_pixels(width, height, &frame.indices, None);
      gif_frame.dispose = DisposalMethod::Keep;
      encoder.write_frame(&gif_frame)?;
    }
  }
  Ok(out)
}

#[derive(Clone, Copy)]
struct Rect {
  left: usize,
  top: usize,
  width: usize,
  height: usize,
}

fn clear_rect(canvas: &mut [u8], canvas_width: usize, rect: Rect, background: u8) {
  for row in 0..rect.height {
    let y = rect.top + row;
    let start = y * canvas_width + rect.left;
    canvas[start..start + rect.width].fill(background);
  }
}

fn capture_rect(canvas: &[u8], canvas_width: usize, rect: Rect) -> Vec<u8> {
  let mut out = Vec::with_capacity(rect.width * rect.height);
  for row in 0..rect.height {
    let y = rect.top + row;
    let start = y * canvas_width + rect.left;
    out.extend_from_slice(&canvas[start..start + rect.width]);
  }
  out
}

fn restore_rect(canvas: &mut [u8], canvas_width: usize, rect: Rect, snapshot: &[u8]) {
  for row in 0..rect.height {
    let y = rect.top + row;
    let start = y * canvas_width + rect.left;
    canvas[start..start + rect.width].copy_from_slice(&snapshot[row * rect.width..(row + 1) * rect.width]);
  }
}

fn draw_rect(canvas: &mut [u8], canvas_width: usize, rect: Rect, pixels: &[u8], transparent: Option<u8>) {
  for row in 0..rect.height {
    let y = rect.top + row;
    for col in 0..rect.width {
      let x = rect.left + col;
      let index = pixels[row * rect.width + col];
      if Some(index) == transparent {
        continue;
      }
      canvas[y * canvas_width + x] = index;
    }
  }
}

/// Decode a GIF into the sequence of full-canvas [`Frame`]s the orchestrator
/// consumes, honoring disposal methods 0/1 (leave as-is), 2 (clear to
/// background), and 3 (restore); other disposal values are logged and
/// treated like "leave as-is".
pub fn decode_animation(bytes: &[u8]) -> Result<Vec<Frame>, SteganoError> {
  let mut options = gif::DecodeOptions::new();
  options.set_color_output(gif::ColorOutput::Indexed);
  let mut decoder = options.read_info(bytes).map_err(SteganoError::Container)?;

  let canvas_width = decoder.width() as usize;
  let canvas_height = decoder.height() as usize;
  let global_palette: Vec<Rgb8> =
    decoder.global_palette().map(bytes_to_palette).unwrap_or_default();

  let mut canvas = vec![0u8; canvas_width * canvas_height];
  let mut frames = Vec::new();
  let mut pending: Option<(DisposalMethod, Rect)> = None;
  let mut restore_snapshot: Option<(Rect, Vec<u8>)> = None;

  while let Some(raw) = decoder.read_next_frame().map_err(SteganoError::Container)? {
    let rect = Rect {
      left: raw.left as usize,
      top: raw.top as usize,
      width: raw.width as usize,
      height: raw.height as usize,
    };

    if let Some((dispose, prev_rect)) = pending.take() {
      match dispose {
        DisposalMethod::Background => clear_rect(&mut canvas, canvas_width, prev_rect, 0),
        DisposalMethod::Previous => {
          if let Some((r, snap)) = restore_snapshot.take() {
            restore_rect(&mut canvas, canvas_width, r, &snap);
          }
        }
        DisposalMethod::Any | DisposalMethod::Keep => {}
        // `gif::DisposalMethod` only names these four values today, but per
        // spec section 6 any disposal method this core does not special-case
        // is logged and treated like "leave as-is" rather than silently
        // matched away.
        #[allow(unreachable_patterns)]
        _ => warn!("unrecognized GIF disposal method {dispose:?}, leaving the canvas as-is"),
      }
    }

    if raw.dispose == DisposalMethod::Previous {
      restore_snapshot = Some((rect, capture_rect(&canvas, canvas_width, rect)));
    }

    draw_rect(&mut canvas, canvas_width, rect, &raw.buffer, raw.transparent);

    let palette = raw.palette.as_deref().map(bytes_to_palette).unwrap_or_else(|| global_palette.clone());
    frames.push(Frame::new(canvas_width as u32, canvas_height as u32, palette, canvas.clone())?);

    pending = Some((raw.dispose, rect));
  }

  Ok(frames)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn encode_then_decode_round_trips_indices_and_palette() {
    let palette = vec![Rgb8::new(0, 0, 0), Rgb8::new(255, 0, 0), Rgb8::new(0, 255, 0), Rgb8::new(0, 0, 255)];
    let indices = vec![0u8, 1, 2, 3, 0, 1, 2, 3];
    let frame = Frame::new(4, 2, palette.clone(), indices.clone()).unwrap();
    let bytes = encode_animation(&[frame]).unwrap();

    let decoded = decode_animation(&bytes).unwrap();
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].indices, indices);
    assert_eq!(decoded[0].palette[..4], palette[..]);
  }

  #[test]
  fn rejects_empty_frame_list() {
    assert!(encode_animation(&[]).is_err());
  }
}
