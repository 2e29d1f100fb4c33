//! Twin pairing (spec section 4.4): greedy minimum-distance matching over an
//! even-sized palette, producing a total involution `τ`.

use std::collections::HashMap;

use crate::color::Rgb8;
use crate::error::SteganoError;

/// A palette-level involution: `τ(τ(c)) == c` and `τ(c) != c` for every color
/// in the palette it was built from.
///
/// Stored as a single open-addressed map (a `HashMap` keyed by the packed
/// color), matching the "store once as an involutive function" guidance in
/// spec section 9 rather than two separate forward/backward maps.
pub struct TwinMap {
  map: HashMap<Rgb8, Rgb8>,
}

impl TwinMap {
  /// Greedy minimum-distance matching: repeatedly find the globally closest
  /// remaining pair, record it both ways, and remove both colors. Ties are
  /// broken by iteration order over the input slice, which for a fixed input
  /// order is deterministic — spec section 9 calls out that this greedy
  /// order, not optimality, is what encode/decode interoperability depends
  /// on, so it must never be swapped for a proper minimum-weight matching.
  pub fn build(colors: &[Rgb8]) -> Result<Self, SteganoError> {
    if colors.len() % 2 != 0 {
      return Err(SteganoError::OddPalette(colors.len()));
    }

    let mut remaining: Vec<Rgb8> = colors.to_vec();
    let mut map = HashMap::with_capacity(colors.len());

    while !remaining.is_empty() {
      let mut best_dist = f32::MAX;
      let mut best = (0usize, 0usize);
      for i in 0..remaining.len() {
        for j in 0..remaining.len() {
          if i == j {
            continue;
          }
          let d = remaining[i].distance_squared(remaining[j]);
          if d < best_dist {
            best_dist = d;
            best = (i, j);
          }
        }
      }
      let (i, j) = best;
      let (a, b) = (remaining[i], remaining[j]);
      map.insert(a, b);
      map.insert(b, a);
      // Remove the higher index first so the lower index stays valid.
      let (hi, lo) = if i > j { (i, j) } else { (j, i) };
      remaining.remove(hi);
      remaining.remove(lo);
    }

    Ok(Self { map })
  }

  /// `τ(color)`. Panics if `color` is not in the palette this map was built
  /// from — every pixel the frame codec visits is expected to already be a
  /// palette color, so a miss indicates a corrupt frame, not a recoverable
  /// condition for this internal helper.
  #[must_use]
  pub fn twin(&self, color: Rgb8) -> Rgb8 {
    *self.map.get(&color).unwrap_or_else(|| panic!("{color:?} is not a member of this palette"))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.map.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn is_a_total_involution() {
    let colors = [
      Rgb8::new(0, 0, 0),
      Rgb8::new(10, 10, 10),
      Rgb8::new(200, 5, 5),
      Rgb8::new(201, 5, 5),
      Rgb8::new(255, 255, 255),
      Rgb8::new(250, 250, 250),
    ];
    let twins = TwinMap::build(&colors).unwrap();
    assert_eq!(twins.len(), colors.len());
    for &c in &colors {
      let t = twins.twin(c);
      assert_ne!(t, c);
      assert_eq!(twins.twin(t), c);
    }
  }

  #[test]
  fn rejects_odd_sized_palette() {
    let colors = [Rgb8::new(0, 0, 0), Rgb8::new(1, 1, 1), Rgb8::new(2, 2, 2)];
    assert!(matches!(TwinMap::build(&colors), Err(SteganoError::OddPalette(3))));
  }

  #[test]
  fn pairs_the_closest_neighbors_on_four_colors() {
    // spec section 8, scenario 6.
    let colors = [
      Rgb8::new(0, 0, 0),
      Rgb8::new(0, 0, 1),
      Rgb8::new(255, 255, 254),
      Rgb8::new(255, 255, 255),
    ];
    let twins = TwinMap::build(&colors).unwrap();
    assert_eq!(twins.twin(Rgb8::new(0, 0, 0)), Rgb8::new(0, 0, 1));
    assert_eq!(twins.twin(Rgb8::new(255, 255, 254)), Rgb8::new(255, 255, 255));
  }
}
