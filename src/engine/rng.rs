//! Per-path random streams for Monte Carlo simulation.
//!
//! Each path owns an independent `StdRng` seeded from a splitmix64 mix of
//! the run's base seed and the path index. Path `i` therefore sees the same
//! normal draws no matter how rows are partitioned across threads or chunks.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};

/// Random stream dedicated to one simulated path
pub struct PathRng {
    inner: StdRng,
}

impl PathRng {
    /// Stream for `path_index` under `base_seed`
    #[inline]
    pub fn for_path(base_seed: u64, path_index: usize) -> Self {
        Self {
            inner: StdRng::seed_from_u64(stream_seed(base_seed, path_index)),
        }
    }

    /// Fill `buffer` with standard normal variates (Ziggurat via `rand_distr`)
    #[inline]
    pub fn fill_normal(&mut self, buffer: &mut [f64]) {
        for value in buffer.iter_mut() {
            *value = StandardNormal.sample(&mut self.inner);
        }
    }
}

/// Base seed for unseeded runs, drawn from the thread-local entropy source
pub fn entropy_seed() -> u64 {
    rand::random::<u64>()
}

/// Seed of the stream owned by `path_index`
pub fn stream_seed(base_seed: u64, path_index: usize) -> u64 {
    splitmix64(base_seed ^ splitmix64(path_index as u64))
}

#[inline]
fn splitmix64(x: u64) -> u64 {
    let mut z = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
