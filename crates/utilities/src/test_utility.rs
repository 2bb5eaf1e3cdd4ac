use log::debug;
use rand::distr::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;

/// Runs the given test `iterations` times, every time with a random number
/// generator seeded by the iteration number, such that a failing iteration can
/// be reproduced.
pub fn random_test<F>(iterations: u64, mut test: F)
where
    F: FnMut(&mut StdRng),
{
    for seed in 0..iterations {
        debug!("Random test iteration with seed {seed}");
        let mut rng = StdRng::seed_from_u64(seed);
        test(&mut rng);
    }
}

/// Returns a vector of the given length with random values (from 0..max_value).
pub fn random_vector<T, R>(rng: &mut R, length: usize, max_value: T) -> Vec<T>
where
    T: Copy + Default + SampleUniform + PartialOrd,
    R: Rng,
{
    let mut vector: Vec<T> = Vec::with_capacity(length);
    for _ in 0..length {
        vector.push(rng.random_range(T::default()..max_value));
    }

    vector
}
