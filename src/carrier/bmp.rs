#![forbid(unsafe_code)]

//! A trimmed BMP reader/writer: the 14-byte file header, the 40-byte
//! `BITMAPINFOHEADER`, an optional BGRA color table, and uncompressed pixel
//! data at 1, 4, 8, 24, or 32 bits per pixel.
//!
//! Grounded on the helper style of `bmp.rs` in the teacher crate
//! (`u16_le`/`u32_le`/`try_split_off_byte_array`, [`AsciiArray`] for the file
//! tag) but only the single-header, uncompressed subset the codec core
//! actually needs — the teacher's OS/2 and `BITMAPV2..V5` header variants and
//! its RLE/bitfield compression handling are out of scope here.

use crate::ascii_array::AsciiArray;
use crate::color::Rgba8;
use crate::error::SteganoError;
use crate::frame::Frame;

use super::StillImage;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;
const BI_RGB: u32 = 0;

#[inline]
fn u16_le(bytes: &[u8]) -> u16 {
  u16::from_le_bytes(bytes.try_into().expect("2-byte slice"))
}

#[inline]
fn u32_le(bytes: &[u8]) -> u32 {
  u32::from_le_bytes(bytes.try_into().expect("4-byte slice"))
}

#[inline]
fn i32_le(bytes: &[u8]) -> i32 {
  i32::from_le_bytes(bytes.try_into().expect("4-byte slice"))
}

fn take<'a>(bytes: &'a [u8], n: usize) -> Result<(&'a [u8], &'a [u8]), SteganoError> {
  if bytes.len() < n {
    return Err(SteganoError::Carrier("truncated BMP file"));
  }
  Ok(bytes.split_at(n))
}

/// Decode a BMP file's bytes into a [`StillImage`].
pub fn decode(bytes: &[u8]) -> Result<StillImage, SteganoError> {
  let (file_header, rest) = take(bytes, FILE_HEADER_LEN)?;
  let tag = AsciiArray(file_header[0..2].try_into().expect("2 bytes"));
  if tag.0 != *b"BM" {
    return Err(SteganoError::Carrier("not a BMP file (missing 'BM' tag)"));
  }
  let pixel_data_offset = u32_le(&file_header[10..14]) as usize;

  let (info_header, _) = take(rest, INFO_HEADER_LEN)?;
  let header_size = u32_le(&info_header[0..4]);
  if header_size != INFO_HEADER_LEN as u32 {
    return Err(SteganoError::Carrier("only the 40-byte BITMAPINFOHEADER is supported"));
  }
  let width = i32_le(&info_header[4..8]);
  let height_field = i32_le(&info_header[8..12]);
  let bits_per_pixel = u16_le(&info_header[14..16]);
  let compression = u32_le(&info_header[16..20]);
  let colors_used = u32_le(&info_header[32..36]);

  if compression != BI_RGB {
    return Err(SteganoError::Carrier("compressed BMP pixel data is not supported"));
  }
  if width <= 0 {
    return Err(SteganoError::Carrier("non-positive BMP width"));
  }
  let top_down = height_field < 0;
  let height = height_field.unsigned_abs();
  if height == 0 {
    return Err(SteganoError::Carrier("zero-height BMP"));
  }
  let width = width as u32;

  let palette = match bits_per_pixel {
    1 | 4 | 8 => {
      let count = if colors_used != 0 { colors_used } else { 1u32 << bits_per_pixel };
      let table_len = count as usize * 4;
      let table_start = FILE_HEADER_LEN + INFO_HEADER_LEN;
      if bytes.len() < table_start + table_len {
        return Err(SteganoError::Carrier("truncated BMP color table"));
      }
      let table = &bytes[table_start..table_start + table_len];
      Some(
        table
          .chunks_exact(4)
          .map(|e| Rgba8::new(e[2], e[1], e[0], 255))
          .collect::<Vec<_>>(),
      )
    }
    24 | 32 => None,
    _ => return Err(SteganoError::Carrier("unsupported bit depth (must be 1, 4, 8, 24, or 32)")),
  };

  if bytes.len() < pixel_data_offset {
    return Err(SteganoError::Carrier("pixel data offset past end of file"));
  }
  let pixel_data = &bytes[pixel_data_offset..];
  let row_bytes = (((width as usize * bits_per_pixel as usize) + 31) / 32) * 4;
  if pixel_data.len() < row_bytes * height as usize {
    return Err(SteganoError::Carrier("truncated BMP pixel data"));
  }

  let mut pixels = vec![Rgba8::new(0, 0, 0, 255); width as usize * height as usize];
  let mut indices = if bits_per_pixel <= 8 { Some(vec![0u8; width as usize * height as usize]) } else { None };
  for file_row in 0..height as usize {
    let y = if top_down { file_row } else { height as usize - 1 - file_row };
    let row = &pixel_data[file_row * row_bytes..file_row * row_bytes + row_bytes];
    for x in 0..width as usize {
      let (color, index) = match bits_per_pixel {
        1 => {
          let byte = row[x / 8];
          let bit = 7 - (x % 8);
          let index = (byte >> bit) & 1;
          (palette.as_ref().expect("indexed bpp always has a palette")[index as usize], Some(index))
        }
        4 => {
          let byte = row[x / 2];
          let index = if x % 2 == 0 { byte >> 4 } else { byte & 0x0f };
          (palette.as_ref().expect("indexed bpp always has a palette")[index as usize], Some(index))
        }
        8 => {
          let index = row[x];
          (palette.as_ref().expect("indexed bpp always has a palette")[index as usize], Some(index))
        }
        24 => {
          let o = x * 3;
          (Rgba8::new(row[o + 2], row[o + 1], row[o], 255), None)
        }
        32 => {
          let o = x * 4;
          (Rgba8::new(row[o + 2], row[o + 1], row[o], row[o + 3]), None)
        }
        _ => unreachable!(),
      };
      pixels[y * width as usize + x] = color;
      if let (Some(plane), Some(index)) = (indices.as_mut(), index) {
        plane[y * width as usize + x] = index;
      }
    }
  }

  Ok(StillImage { width, height, bits_per_pixel, palette, pixels, indices })
}

/// Encode a [`Frame`] as a 256-color (or fewer) indexed BMP.
#[must_use]
pub fn encode(frame: &Frame) -> Vec<u8> {
  let bpp = 8u16;
  let row_bytes = ((frame.width as usize * bpp as usize + 31) / 32) * 4;
  let palette_len = frame.palette.len().max(1);
  let pixel_data_offset = FILE_HEADER_LEN + INFO_HEADER_LEN + palette_len * 4;
  let pixel_data_len = row_bytes * frame.height as usize;
  let total_size = pixel_data_offset + pixel_data_len;

  let mut out = Vec::with_capacity(total_size);

  out.extend_from_slice(b"BM");
  out.extend_from_slice(&(total_size as u32).to_le_bytes());
  out.extend_from_slice(&[0u8; 4]);
  out.extend_from_slice(&(pixel_data_offset as u32).to_le_bytes());

  out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
  out.extend_from_slice(&(frame.width as i32).to_le_bytes());
  out.extend_from_slice(&(frame.height as i32).to_le_bytes());
  out.extend_from_slice(&1u16.to_le_bytes());
  out.extend_from_slice(&bpp.to_le_bytes());
  out.extend_from_slice(&BI_RGB.to_le_bytes());
  out.extend_from_slice(&(pixel_data_len as u32).to_le_bytes());
  out.extend_from_slice(&2835i32.to_le_bytes());
  out.extend_from_slice(&2835i32.to_le_bytes());
  out.extend_from_slice(&(frame.palette.len() as u32).to_le_bytes());
  out.extend_from_slice(&0u32.to_le_bytes());

  for color in &frame.palette {
    out.extend_from_slice(&[color.b, color.g, color.r, 0]);
  }
  if frame.palette.is_empty() {
    out.extend_from_slice(&[0, 0, 0, 0]);
  }

  for file_row in 0..frame.height as usize {
    let y = frame.height as usize - 1 - file_row;
    let start = out.len();
    for x in 0..frame.width as usize {
      out.push(frame.indices[y * frame.width as usize + x]);
    }
    out.resize(start + row_bytes, 0);
  }

  out
}
