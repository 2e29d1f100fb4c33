//! Varint encoding and the envelope (header ∥ payload ∥ integrity tail) —
//! spec section 4.6.

use sha1::{Digest, Sha1};

use crate::error::SteganoError;

const ENVELOPE_VERSION: u32 = 0;
const HASH_LEN: usize = 20;

/// LEB128-unsigned varint: low 7 bits per byte, high bit set on every byte but
/// the last. Decoding rejects a 6th continuation byte (value space is capped
/// at 28 shift bits, i.e. 5 bytes max).
pub fn encode_varint(mut value: u32, out: &mut Vec<u8>) {
  loop {
    let mut byte = (value & 0x7f) as u8;
    value >>= 7;
    if value != 0 {
      byte |= 0x80;
    }
    out.push(byte);
    if value == 0 {
      break;
    }
  }
}

#[must_use]
pub fn varint_len(value: u32) -> usize {
  let mut buf = Vec::with_capacity(5);
  encode_varint(value, &mut buf);
  buf.len()
}

/// Decode one varint from the front of `bytes`, returning the value and the
/// number of bytes consumed.
pub fn decode_varint(bytes: &[u8]) -> Result<(u32, usize), SteganoError> {
  let mut result: u32 = 0;
  let mut shift: u32 = 0;
  for (consumed, &byte) in bytes.iter().enumerate() {
    result |= ((byte & 0x7f) as u32) << shift;
    if byte & 0x80 == 0 {
      return Ok((result, consumed + 1));
    }
    shift += 7;
    if shift > 28 {
      return Err(SteganoError::BadHeader("varint uses more than 5 continuation bytes"));
    }
  }
  Err(SteganoError::BadHeader("varint truncated before a terminating byte"))
}

/// Build the full envelope byte stream: `varint(0) ∥ varint(len) ∥ payload ∥ sha1(payload)`.
#[must_use]
pub fn build_envelope(payload: &[u8]) -> Vec<u8> {
  let mut out = Vec::with_capacity(varint_len(ENVELOPE_VERSION) + varint_len(payload.len() as u32) + payload.len() + HASH_LEN);
  encode_varint(ENVELOPE_VERSION, &mut out);
  encode_varint(payload.len() as u32, &mut out);
  out.extend_from_slice(payload);
  let digest = Sha1::digest(payload);
  out.extend_from_slice(&digest);
  out
}

/// Total length in bytes of the envelope that would wrap a payload of
/// `payload_len` bytes: `varint(0) + varint(payload_len) + payload_len + 20`.
#[must_use]
pub fn envelope_len(payload_len: usize) -> usize {
  varint_len(ENVELOPE_VERSION) + varint_len(payload_len as u32) + payload_len + HASH_LEN
}

/// The outcome of trying to recover a payload from a decoded byte stream.
pub enum DecodedEnvelope {
  /// Header parsed, version matched, and the integrity hash over the payload
  /// matched the trailing 20 bytes.
  Payload(Vec<u8>),
  /// Header parsed and the version matched, but the hash did not — wrong
  /// password or a tampered/truncated container. Not an error: the caller
  /// reports "no content matches this password" and exits cleanly.
  NoContent,
}

/// Parse the header out of `bits`, determine `payload_size`, and report how
/// many total bytes (incl. header and tail) the full envelope needs — so the
/// orchestrator knows how many frames to keep decoding before calling
/// [`finish_decode`].
pub fn parse_header(bits: &[u8]) -> Result<(u32, usize), SteganoError> {
  let (version, header_len) = decode_varint(bits)?;
  if version != ENVELOPE_VERSION {
    return Err(SteganoError::BadHeader("nonzero envelope version"));
  }
  let (payload_size, size_len) = decode_varint(&bits[header_len..])?;
  Ok((payload_size, header_len + size_len))
}

/// Given the full decoded bit stream (at least `header_len + payload_size +
/// 20` bytes) and the header length already parsed, verify the hash and
/// return the payload — or `NoContent` on mismatch.
pub fn finish_decode(bits: &[u8], header_len: usize, payload_size: usize) -> DecodedEnvelope {
  let needed = header_len + payload_size + HASH_LEN;
  if bits.len() < needed {
    return DecodedEnvelope::NoContent;
  }
  let payload = &bits[header_len..header_len + payload_size];
  let tail = &bits[header_len + payload_size..needed];
  let digest = Sha1::digest(payload);
  if digest.as_slice() == tail {
    DecodedEnvelope::Payload(payload.to_vec())
  } else {
    DecodedEnvelope::NoContent
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn varint_roundtrip_small_values() {
    for v in [0u32, 1, 42, 127, 128, 300, 16384, 2_000_000] {
      let mut buf = Vec::new();
      encode_varint(v, &mut buf);
      let (decoded, consumed) = decode_varint(&buf).unwrap();
      assert_eq!(decoded, v);
      assert_eq!(consumed, buf.len());
    }
  }

  #[test]
  fn known_varint_widths() {
    assert_eq!(varint_len(127), 1);
    let mut buf = Vec::new();
    encode_varint(128, &mut buf);
    assert_eq!(buf, vec![0x80, 0x01]);
  }

  #[test]
  fn decode_rejects_overlong_varint() {
    let overlong = [0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
    assert!(decode_varint(&overlong).is_err());
  }

  #[test]
  fn decode_rejects_truncated_varint() {
    let truncated = [0x80, 0x80];
    assert!(decode_varint(&truncated).is_err());
  }

  #[test]
  fn envelope_roundtrip() {
    let payload = b"ok".to_vec();
    let envelope = build_envelope(&payload);
    assert_eq!(envelope.len(), envelope_len(payload.len()));
    let (size, header_len) = parse_header(&envelope).unwrap();
    assert_eq!(size as usize, payload.len());
    match finish_decode(&envelope, header_len, size as usize) {
      DecodedEnvelope::Payload(p) => assert_eq!(p, payload),
      DecodedEnvelope::NoContent => panic!("expected payload"),
    }
  }

  #[test]
  fn tampered_byte_yields_no_content() {
    let payload = b"secret data".to_vec();
    let mut envelope = build_envelope(&payload);
    let last = envelope.len() - 1;
    envelope[last] ^= 0xff;
    let (size, header_len) = parse_header(&envelope).unwrap();
    match finish_decode(&envelope, header_len, size as usize) {
      DecodedEnvelope::NoContent => {}
      DecodedEnvelope::Payload(_) => panic!("tampered tail should not verify"),
    }
  }

  #[test]
  fn rejects_nonzero_version() {
    let mut buf = Vec::new();
    encode_varint(1, &mut buf);
    encode_varint(0, &mut buf);
    assert!(parse_header(&buf).is_err());
  }
}
