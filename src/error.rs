use thiserror::Error;

/// Errors produced by the steganographic codec and its carrier/container
/// collaborators.
///
/// `NoContent` (wrong password / tampered frame / damaged first frame) is
/// deliberately *not* a variant here: per the wire contract that outcome is a
/// clean, successful "nothing decoded" result, not a failure.
#[derive(Error, Debug)]
pub enum SteganoError {
  /// A frame's pixel count (`width * height`) is not a multiple of 8, so the
  /// frame codec cannot stripe whole bytes across it.
  #[error("frame geometry {width}x{height} is not a multiple of 8 pixels")]
  BadGeometry { width: u32, height: u32 },

  /// Twin pairing was asked to match an odd-sized color set.
  #[error("twin pairing received an odd-sized palette ({0} colors)")]
  OddPalette(usize),

  /// Palette extension (indices 128..256) produced a duplicate color.
  #[error("palette extension produced a duplicate color at index {0}")]
  DuplicatePalette(usize),

  /// The envelope header failed to parse: bad version or an overlong/short varint.
  #[error("bad envelope header: {0}")]
  BadHeader(&'static str),

  /// A carrier or container file could not be read or written.
  #[error("I/O error reading/writing image data")]
  Io(#[from] std::io::Error),

  /// The BMP carrier could not be parsed.
  #[error("malformed BMP carrier: {0}")]
  Carrier(&'static str),

  /// The GIF container could not be parsed.
  #[error("GIF container error: {0}")]
  Container(#[from] gif::DecodingError),

  /// The GIF container could not be written.
  #[error("GIF container write error: {0}")]
  ContainerWrite(#[from] gif::EncodingError),
}

pub type SteganoResult<T> = Result<T, SteganoError>;
