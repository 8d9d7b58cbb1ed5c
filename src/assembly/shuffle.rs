use crate::assembly::rng::SeededRng;

/// Fisher-Yates over a copy of `items`, driven by [`SeededRng`] seeded with `seed`.
pub fn shuffle<T: Clone>(items: &[T], seed: &str) -> Vec<T> {
    let mut shuffled = items.to_vec();
    shuffle_in_place(&mut shuffled, seed);
    shuffled
}

pub fn shuffle_in_place<T>(items: &mut [T], seed: &str) {
    let mut rng = SeededRng::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_index(i + 1);
        items.swap(i, j);
    }
}
