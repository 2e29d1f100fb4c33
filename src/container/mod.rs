//! The container collaborator (spec section 6): the animated GIF that holds
//! the stream of modified carrier frames. Out of the codec core's scope, but
//! a concrete implementation on top of the `gif` crate is provided here.

pub mod gif_container;

pub use gif_container::{decode_animation, encode_animation};
