//! Deterministic randomness for fallback label colors.
//!
//! Each project gets its own generator seeded from its name, so a label without
//! an explicit color keeps the same palette color from one run to the next.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

/// A generator seeded from the SHA-256 digest of the project name.
pub fn project_rng(name: &str) -> StdRng {
    let seed: [u8; 32] = Sha256::digest(name.as_bytes()).into();
    StdRng::from_seed(seed)
}

/// Adapt a generator to the `[0, 1)` source the color resolver draws from.
pub fn unit_source(rng: &mut StdRng) -> impl FnMut() -> f64 + '_ {
    move || rng.gen::<f64>()
}
