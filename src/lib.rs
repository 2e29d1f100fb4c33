//! Hides a payload file inside an animated GIF built from a BMP carrier
//! image, recoverable only by a peer holding the same password.
//!
//! The codec core lives in [`hashing`], [`rng`], [`histogram`], [`palette`],
//! [`twin`], [`frame_codec`], and [`envelope`], orchestrated by [`codec`].
//! [`carrier`] and [`container`] are the external still-image and animation
//! collaborators the core reads and writes through.

pub mod ascii_array;
pub mod carrier;
pub mod codec;
pub mod color;
pub mod container;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod frame_codec;
pub mod hashing;
pub mod histogram;
pub mod palette;
pub mod rng;
pub mod twin;

pub use error::{SteganoError, SteganoResult};
