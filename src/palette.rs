//! Palette construction (spec section 4.3): the fixed 128-color base, the
//! wall-clock-seeded extension to 256 unique colors, and the histogram-
//! assisted remap of a true-color image onto the resulting palette.
//!
//! Grounded on `original_source/include/steganogif.h`'s `encode()` palette
//! build (the fixed nested-loop base and the `l_componant_index = rng() % 3`,
//! `offset = 1 + (rng() % 14)` extension loop) and, for the remap step, on
//! the unused-by-`encode()` `compute_simplified_colors` helper in the same
//! file — SPEC_FULL.md section C documents why that function is repurposed
//! here as an acceleration structure rather than the step-1 base itself.

use std::collections::{BTreeMap, HashMap};

use crate::color::Rgb8;
use crate::error::SteganoError;
use crate::histogram::Histogram;
use crate::rng::Mt19937;

const RED_LEVELS: [u8; 4] = [0, 64, 128, 255];
const GREEN_LEVELS: [u8; 8] = [0, 32, 64, 96, 128, 160, 192, 255];
// The blue axis reuses the red component set, per the wire contract.
const BLUE_LEVELS: [u8; 4] = RED_LEVELS;

const BASE_LEN: usize = RED_LEVELS.len() * GREEN_LEVELS.len() * BLUE_LEVELS.len();
pub const PALETTE_LEN: usize = 256;
const EXTENSION_OFFSET_SPAN: u32 = 14;
const MAX_EXTENSION_ATTEMPTS: u32 = 8;

/// Step 1: the fixed 128-color Cartesian base, in the exact iteration order
/// (red outer, green middle, blue inner) the wire format requires.
#[must_use]
pub fn build_base_palette() -> [Rgb8; BASE_LEN] {
  let mut out = [Rgb8::new(0, 0, 0); BASE_LEN];
  let mut i = 0;
  for &r in &RED_LEVELS {
    for &g in &GREEN_LEVELS {
      for &b in &BLUE_LEVELS {
        out[i] = Rgb8::new(r, g, b);
        i += 1;
      }
    }
  }
  debug_assert_eq!(i, BASE_LEN);
  out
}

/// Step 2: extend a 128-color base to 256 colors using an auxiliary,
/// wall-clock-seeded generator. For each new index `i`, the perturbation
/// source is `base[i - 128]` — the untouched fixed base, re-read every
/// iteration, never a previously extended color (`steganogif.h`'s
/// `l_original_color = get_palette().get_color(l_index - 128)` reads straight
/// from the unmodified palette array). Three words are drawn from `aux`: the
/// first picks which channel of that source color to perturb (`c1 % 3`), the
/// second picks the perturbation size (`1 + c2 % 14`), and the third is drawn
/// but not consumed — matching the original's draw count exactly even though
/// only two of the three values feed the formula.
///
/// The perturbed channel value is computed exactly as the original does:
/// as a wider integer that is then narrowed to `u8`, so an overflow wraps
/// rather than saturates. That narrowing is part of the wire contract, not a
/// bug — decoders never run this step, so it only has to be *deterministic*
/// relative to `aux`'s stream, not numerically tidy.
pub fn extend_palette(base: [Rgb8; BASE_LEN], aux: &mut Mt19937) -> [Rgb8; PALETTE_LEN] {
  let mut out = [Rgb8::new(0, 0, 0); PALETTE_LEN];
  out[..BASE_LEN].copy_from_slice(&base);

  for (slot_position, slot) in out.iter_mut().skip(BASE_LEN).enumerate() {
    let source = base[slot_position];

    let c1 = aux.next_u32();
    let c2 = aux.next_u32();
    let _c3 = aux.next_u32();

    let channel = c1 % 3;
    let delta = 1 + (c2 % EXTENSION_OFFSET_SPAN);
    let s = source.channel(channel);
    let perturbed = if s == 255 {
      (u32::from(s) - delta) as u8
    } else {
      (u32::from(s) + delta) as u8
    };
    *slot = source.with_channel(channel, perturbed);
  }
  out
}

fn find_duplicate(palette: &[Rgb8; PALETTE_LEN]) -> Option<usize> {
  let mut seen = HashMap::with_capacity(PALETTE_LEN);
  for (i, &c) in palette.iter().enumerate() {
    if seen.insert(c, i).is_some() {
      return Some(i);
    }
  }
  None
}

/// Build a full 256-color palette, retrying the wall-clock-seeded extension
/// a bounded number of times if it happens to produce a duplicate (spec
/// section 9 notes the design tolerates rare retries rather than forbidding
/// collisions outright).
pub fn build_palette() -> Result<[Rgb8; PALETTE_LEN], SteganoError> {
  let base = build_base_palette();
  let mut last_err = 0usize;
  for _ in 0..MAX_EXTENSION_ATTEMPTS {
    let mut aux = Mt19937::from_wall_clock();
    let palette = extend_palette(base, &mut aux);
    match find_duplicate(&palette) {
      None => return Ok(palette),
      Some(i) => last_err = i,
    }
  }
  Err(SteganoError::DuplicatePalette(last_err))
}

/// Maps every pixel of a true-color image onto the nearest color of a fixed
/// 256-entry palette, using per-channel histograms of the *image's own*
/// pixel values as an acceleration structure: many distinct source colors
/// collapse onto the same per-channel bucket representative, so the (much
/// more expensive) brute-force nearest-palette search only has to run once
/// per distinct reduced color rather than once per distinct source color.
pub struct PaletteMapper<'a> {
  palette: &'a [Rgb8],
  r_hist: Histogram,
  g_hist: Histogram,
  b_hist: Histogram,
  cache: HashMap<Rgb8, u8>,
}

impl<'a> PaletteMapper<'a> {
  /// Bucket counts mirror the original's unused `compute_simplified_colors`
  /// helper: 16 for red, 8 for green, 6 for blue.
  const RED_BUCKETS: usize = 16;
  const GREEN_BUCKETS: usize = 8;
  const BLUE_BUCKETS: usize = 6;

  #[must_use]
  pub fn new(palette: &'a [Rgb8], pixels: &[Rgb8]) -> Self {
    let mut r_counts: BTreeMap<i32, u32> = BTreeMap::new();
    let mut g_counts: BTreeMap<i32, u32> = BTreeMap::new();
    let mut b_counts: BTreeMap<i32, u32> = BTreeMap::new();
    for &p in pixels {
      *r_counts.entry(i32::from(p.r)).or_insert(0) += 1;
      *g_counts.entry(i32::from(p.g)).or_insert(0) += 1;
      *b_counts.entry(i32::from(p.b)).or_insert(0) += 1;
    }
    Self {
      palette,
      r_hist: Histogram::build(r_counts, Self::RED_BUCKETS),
      g_hist: Histogram::build(g_counts, Self::GREEN_BUCKETS),
      b_hist: Histogram::build(b_counts, Self::BLUE_BUCKETS),
      cache: HashMap::new(),
    }
  }

  fn nearest_palette_color(&self, target: Rgb8) -> u8 {
    let mut best_index = 0usize;
    let mut best_dist = f32::MAX;
    for (i, &candidate) in self.palette.iter().enumerate() {
      let d = candidate.distance_squared(target);
      if d < best_dist {
        best_dist = d;
        best_index = i;
      }
    }
    best_index as u8
  }

  /// Map a single pixel to a palette index, reducing it through the
  /// per-channel histograms first so that repeated reduced colors reuse a
  /// cached nearest-neighbor lookup.
  pub fn map(&mut self, color: Rgb8) -> u8 {
    let reduced = Rgb8::new(
      self.r_hist.representative(i32::from(color.r)).expect("color.r was counted into r_hist") as u8,
      self.g_hist.representative(i32::from(color.g)).expect("color.g was counted into g_hist") as u8,
      self.b_hist.representative(i32::from(color.b)).expect("color.b was counted into b_hist") as u8,
    );
    if let Some(&index) = self.cache.get(&reduced) {
      return index;
    }
    let index = self.nearest_palette_color(reduced);
    self.cache.insert(reduced, index);
    index
  }
}
