use rand::seq::IndexedRandom;

/// Uniformly random element of `items`.
pub fn pick<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::rng())
}

/// Uniformly random element of a static reply list, owned.
pub fn pick_str(items: &[&str]) -> Option<String> {
    pick(items).map(|s| s.to_string())
}
