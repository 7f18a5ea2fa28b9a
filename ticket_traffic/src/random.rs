//! Random names, capacities and sleep jitter.
//!
//! Every function here draws from a caller-supplied random source. Stages own
//! their sources, derived from one root seed, so a seeded run is repeatable.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};

pub(crate) const ALPHA: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Build the root random source. Without a seed the operating system supplies
/// entropy.
pub(crate) fn root(seed: Option<[u8; 32]>) -> StdRng {
    match seed {
        Some(seed) => StdRng::from_seed(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Derive an independent random source for one stage.
pub(crate) fn fork<R>(rng: &mut R) -> StdRng
where
    R: Rng + ?Sized,
{
    StdRng::seed_from_u64(rng.random())
}

/// A string of ASCII letters with length drawn from `[0, maximum_length)`.
pub(crate) fn name<R>(rng: &mut R, maximum_length: usize) -> String
where
    R: Rng + ?Sized,
{
    if maximum_length == 0 {
        return String::new();
    }
    let length = rng.random_range(0..maximum_length);
    (0..length)
        .map(|_| char::from(ALPHA[rng.random_range(0..ALPHA.len())]))
        .collect()
}

/// A capacity drawn from `[0, maximum)`.
pub(crate) fn capacity<R>(rng: &mut R, maximum: u16) -> i32
where
    R: Rng + ?Sized,
{
    if maximum == 0 {
        return 0;
    }
    i32::from(rng.random_range(0..maximum))
}

/// A sleep duration drawn from `[0, maximum_millis)` milliseconds.
pub(crate) fn jitter<R>(rng: &mut R, maximum_millis: u64) -> Duration
where
    R: Rng + ?Sized,
{
    if maximum_millis == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rng.random_range(0..maximum_millis))
}
