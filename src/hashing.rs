//! Password -> PRNG seed derivation (spec section 4.1).

use sha1::{Digest, Sha1};

/// SHA-1 of the raw password bytes, split into five big-endian 32-bit words.
/// No salt, no length prefix — the hash is exactly `sha1(password_bytes)`.
#[must_use]
pub fn password_seed_words(password: &str) -> [u32; 5] {
  let digest = Sha1::digest(password.as_bytes());
  let mut words = [0u32; 5];
  for (word, chunk) in words.iter_mut().zip(digest.chunks_exact(4)) {
    let bytes: [u8; 4] = chunk.try_into().expect("sha1 digest is 20 bytes, chunks of 4");
    *word = u32::from_be_bytes(bytes);
  }
  words
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn same_password_gives_same_seed() {
    assert_eq!(password_seed_words("pw"), password_seed_words("pw"));
  }

  #[test]
  fn different_password_gives_different_seed() {
    assert_ne!(password_seed_words("pw"), password_seed_words("pw2"));
  }
}
