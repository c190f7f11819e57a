use crate::prng::Mulberry32;

/// Seed for one full pass ("deck") over a language's pool.
pub fn deck_seed(language: &str, deck_index: u64) -> String {
    format!("{language}_deck_{deck_index}")
}

/// Deterministic Fisher-Yates permutation of `0..pool_size`.
pub fn shuffle_indices(pool_size: usize, seed: &str) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..pool_size).collect();
    if pool_size <= 1 {
        return indices;
    }

    let mut rng = Mulberry32::new(seed);
    for i in (1..pool_size).rev() {
        let j = (rng.next_f64() * (i + 1) as f64).floor() as usize;
        indices.swap(i, j);
    }
    indices
}
