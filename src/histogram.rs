//! The 1-D histogram bisection splitter (spec section 4.2) — partitions a
//! value→count histogram into `N` contiguous, roughly-equal-weight buckets
//! and reports a representative (truncated weighted mean) per bucket.
//!
//! Grounded on `original_source/include/{splittable,splittable_list,
//! splitted_list}.h`: `Bucket` is `splittable`, `BucketList` is
//! `splittable_list`, and `Histogram::representative` plays the role of
//! `splitted_list::get_average`.

use std::collections::BTreeMap;

/// An ordered-by-value set of `(value, count)` pairs with a cached total.
#[derive(Debug, Clone, Default)]
pub struct Bucket {
  items: BTreeMap<i32, u32>,
  total: u64,
}

impl Bucket {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn from_counts(items: BTreeMap<i32, u32>) -> Self {
    let total = items.values().map(|&c| c as u64).sum();
    Self { items, total }
  }

  pub fn add_item(&mut self, value: i32, count: u32) {
    *self.items.entry(value).or_insert(0) += count;
    self.total += count as u64;
  }

  #[must_use]
  pub fn total(&self) -> u64 {
    self.total
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.items.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  #[must_use]
  pub fn is_splittable(&self) -> bool {
    self.items.len() > 1
  }

  #[must_use]
  pub fn contains(&self, value: i32) -> bool {
    self.items.contains_key(&value)
  }

  #[must_use]
  pub fn first_value(&self) -> i32 {
    *self.items.keys().next().expect("bucket is non-empty")
  }

  #[must_use]
  pub fn last_value(&self) -> i32 {
    *self.items.keys().next_back().expect("bucket is non-empty")
  }

  /// Truncated weighted mean of the bucket's values.
  #[must_use]
  pub fn representative(&self) -> i32 {
    let weighted: i64 = self.items.iter().map(|(&v, &c)| v as i64 * c as i64).sum();
    (weighted / self.total as i64) as i32
  }

  /// Split into two halves by walking items in ascending order, switching the
  /// accumulation target from left to right the first time doing so would
  /// bring the running split closer to balanced than keeping it on the left
  /// (spec section 4.2, step 2). Both halves are non-empty whenever the
  /// bucket has more than one distinct value.
  #[must_use]
  pub fn split(&self) -> (Bucket, Bucket) {
    assert!(self.is_splittable());
    let total = self.total as i64;
    let mut left = Bucket::new();
    let mut right = Bucket::new();
    let mut target_is_right = false;
    for (&value, &count) in &self.items {
      if !target_is_right {
        let remaining_if_unchanged = total - left.total as i64;
        let would_be = 2 * (left.total as i64 + count as i64) - total;
        let current = left.total as i64 - remaining_if_unchanged;
        if would_be.abs() > current.abs() {
          target_is_right = true;
        }
      }
      if target_is_right {
        right.add_item(value, count);
      } else {
        left.add_item(value, count);
      }
    }
    (left, right)
  }

  /// The bucket with its smallest and largest values removed — used only by
  /// the bootstrap step.
  #[must_use]
  fn without_extrema(&self) -> Bucket {
    let mut items = self.items.clone();
    if items.len() > 2 {
      let first = *items.keys().next().unwrap();
      let last = *items.keys().next_back().unwrap();
      items.remove(&first);
      items.remove(&last);
    } else {
      items.clear();
    }
    Bucket::from_counts(items)
  }
}

/// A multiset of buckets, refined by repeatedly bisecting the largest
/// splittable bucket until the target count is reached.
pub struct BucketList {
  buckets: Vec<Bucket>,
}

impl BucketList {
  #[must_use]
  pub fn new(initial: Bucket) -> Self {
    Self { buckets: vec![initial] }
  }

  /// Refine in place toward `target` buckets (spec section 4.2: bootstrap,
  /// then greedy largest-bucket bisection).
  pub fn split(&mut self, target: usize) {
    if self.buckets.len() == 1 {
      let only = &self.buckets[0];
      let mut first = Bucket::new();
      first.add_item(only.first_value(), *only.items.get(&only.first_value()).unwrap());
      let mut last = Bucket::new();
      last.add_item(only.last_value(), *only.items.get(&only.last_value()).unwrap());
      let intermediate = only.without_extrema();
      self.buckets = vec![first, intermediate, last];
    }

    while self.buckets.len() < target {
      let Some(largest) = self.index_of_largest_splittable() else { break };
      let chosen = self.buckets.remove(largest);
      let (a, b) = chosen.split();
      self.buckets.push(a);
      self.buckets.push(b);
    }
  }

  fn index_of_largest_splittable(&self) -> Option<usize> {
    self
      .buckets
      .iter()
      .enumerate()
      .filter(|(_, b)| b.is_splittable())
      .max_by_key(|(_, b)| (b.total(), b.len()))
      .map(|(i, _)| i)
  }

  /// Flatten, sorted ascending by each bucket's smallest value.
  #[must_use]
  pub fn into_sorted_vec(mut self) -> Vec<Bucket> {
    self.buckets.sort_by_key(Bucket::first_value);
    self.buckets
  }
}

/// A flattened, queryable set of buckets produced by [`BucketList::split`] +
/// [`BucketList::into_sorted_vec`].
pub struct Histogram {
  buckets: Vec<Bucket>,
}

impl Histogram {
  /// Build a histogram of `counts` split into `target` buckets.
  #[must_use]
  pub fn build(counts: BTreeMap<i32, u32>, target: usize) -> Self {
    let mut list = BucketList::new(Bucket::from_counts(counts));
    list.split(target);
    Self { buckets: list.into_sorted_vec() }
  }

  #[must_use]
  pub fn bucket_count(&self) -> usize {
    self.buckets.len()
  }

  #[must_use]
  pub fn buckets(&self) -> &[Bucket] {
    &self.buckets
  }

  /// The representative value of the bucket containing `value`, or `None` if
  /// `value` is outside every bucket's member set.
  #[must_use]
  pub fn representative(&self, value: i32) -> Option<i32> {
    self.buckets.iter().find(|b| b.contains(value)).map(Bucket::representative)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn counts_from(values: &[i32]) -> BTreeMap<i32, u32> {
    let mut map = BTreeMap::new();
    for &v in values {
      *map.entry(v).or_insert(0) += 1;
    }
    map
  }

  #[test]
  fn every_input_item_lands_in_exactly_one_bucket() {
    let values: Vec<i32> = (0..=255).collect();
    let counts = counts_from(&values);
    let total_in: u64 = counts.values().map(|&c| c as u64).sum();
    let histogram = Histogram::build(counts, 16);
    let total_out: u64 = histogram.buckets().iter().map(Bucket::total).sum();
    assert_eq!(total_in, total_out);
    for v in values {
      assert!(histogram.representative(v).is_some());
    }
  }

  #[test]
  fn bucket_count_bounded_by_target_and_distinct_value_floor() {
    let counts = counts_from(&[5, 5, 5, 5, 10, 20]);
    let histogram = Histogram::build(counts, 1);
    // 3 distinct values, so the bootstrap alone yields at least 3 buckets
    // even when the caller asked for 1.
    assert!(histogram.bucket_count() >= 3);
  }

  #[test]
  fn representative_is_truncated_weighted_mean() {
    let mut counts = BTreeMap::new();
    counts.insert(0, 1);
    counts.insert(3, 2);
    let bucket = Bucket::from_counts(counts);
    // (0*1 + 3*2) / 3 = 2
    assert_eq!(bucket.representative(), 2);
  }

  #[test]
  fn value_outside_every_bucket_is_not_found() {
    let counts = counts_from(&[1, 2, 3, 100, 101]);
    let histogram = Histogram::build(counts, 4);
    assert_eq!(histogram.representative(50), None);
  }
}
