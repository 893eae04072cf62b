//! Injectable random sources
//!
//! Generators never touch a global RNG directly: each one receives a boxed
//! [`RandomSource`] handed out by the [`RngManager`], one stream per layer and
//! refresh round.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::layers::Layer;

/// A supply of uniform draws in `[0, 1)`.
pub trait RandomSource: Send {
    fn next_unit(&mut self) -> f64;

    /// Uniform draw in `[0, max)`.
    fn uniform(&mut self, max: f64) -> f64 {
        self.next_unit() * max
    }
}

/// Fresh thread-local entropy on every draw.
#[derive(Debug, Default, Clone, Copy)]
pub struct EntropySource;

impl RandomSource for EntropySource {
    fn next_unit(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

pub struct SeededSource {
    inner: ChaCha8Rng,
}

impl SeededSource {
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededSource {
    fn next_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Cycles through a fixed list of values. An empty list always yields `0.0`.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, cursor: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

#[derive(Debug, Clone)]
enum Mode {
    Entropy,
    Seeded(u64),
    Scripted(Vec<f64>),
}

/// Hands out an independent random stream per (layer, round).
#[derive(Debug, Clone)]
pub struct RngManager {
    mode: Mode,
}

impl RngManager {
    pub fn entropy() -> Self {
        Self {
            mode: Mode::Entropy,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            mode: Mode::Seeded(seed),
        }
    }

    /// Every stream replays `values` from the start.
    pub fn scripted(values: Vec<f64>) -> Self {
        Self {
            mode: Mode::Scripted(values),
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::entropy(),
        }
    }

    pub fn is_deterministic(&self) -> bool {
        !matches!(self.mode, Mode::Entropy)
    }

    pub fn stream(&self, layer: Layer, round: u64) -> Box<dyn RandomSource> {
        match &self.mode {
            Mode::Entropy => Box::new(EntropySource),
            Mode::Seeded(seed) => Box::new(SeededSource::new(derive_seed(*seed, layer, round))),
            Mode::Scripted(values) => Box::new(ScriptedSource::new(values.clone())),
        }
    }
}

impl Default for RngManager {
    fn default() -> Self {
        Self::entropy()
    }
}

fn derive_seed(master: u64, layer: Layer, round: u64) -> u64 {
    let mut seed = master;
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= (layer.stream_id() as u64).wrapping_mul(1103515245);
    seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    seed ^= round.wrapping_mul(69069);
    seed
}
