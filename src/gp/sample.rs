//! Uniform random selection over traversals of unknown length.

use rand::Rng;

/// Select one item uniformly at random in a single pass.
///
/// The `k`th item (0-indexed) replaces the current selection with probability `1 / (k + 1)`.
/// Returns `None` if the iterator is empty.
pub fn reservoir<R, I>(rng: &mut R, items: I) -> Option<I::Item>
where
    R: Rng,
    I: IntoIterator,
{
    let mut selected = None;
    for (k, item) in items.into_iter().enumerate() {
        if rng.gen_range(0, k + 1) == 0 {
            selected = Some(item);
        }
    }
    selected
}
