//! Named random number streams. Each concern of the simulation (placement, outbreak gates, case
//! generation) draws from its own generator so that adding draws to one concern does not shift
//! the sequence seen by another. A stream is keyed by a type implementing [`RngId`], usually
//! declared with [`define_rng!`], and is seeded from the base seed plus a stable hash of the
//! stream's name.
mod macros;

use std::any::{Any, TypeId};

use log::trace;

pub use macros::define_rng;

use crate::hashing::{hash_str, HashMap};
use crate::rand::distr::uniform::{SampleRange, SampleUniform};
use crate::rand::{Rng, RngCore, SeedableRng};

pub trait RngId: Copy + Clone + 'static {
    type RngType: SeedableRng + RngCore + Send + 'static;
    fn get_name() -> &'static str;
}

/// Owns every stream used by one simulation instance. Streams are created lazily on first use.
pub struct RandomStreams {
    base_seed: u64,
    rng_holders: HashMap<TypeId, Box<dyn Any + Send>>,
}

impl RandomStreams {
    #[must_use]
    pub fn new(base_seed: u64) -> Self {
        trace!("initializing random streams with base seed {base_seed}");
        RandomStreams {
            base_seed,
            rng_holders: HashMap::default(),
        }
    }

    #[must_use]
    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    fn get_rng<R: RngId>(&mut self) -> &mut R::RngType {
        let base_seed = self.base_seed;
        self.rng_holders
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                trace!("creating new RNG (seed={base_seed}) for {}", R::get_name());
                let seed_offset = hash_str(R::get_name());
                Box::new(R::RngType::seed_from_u64(base_seed.wrapping_add(seed_offset)))
            })
            .downcast_mut::<R::RngType>()
            .expect("RNG holder keyed by a different type")
    }

    /// Applies `sampler` to the stream associated with `R`.
    pub fn sample<R: RngId, T>(
        &mut self,
        _rng_id: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        sampler(self.get_rng::<R>())
    }

    /// Draws a value uniformly from `range`.
    pub fn sample_range<R: RngId, S, T>(&mut self, rng_id: R, range: S) -> T
    where
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    /// Draws a value uniformly from `[0, 1)`.
    pub fn sample_unit<R: RngId>(&mut self, rng_id: R) -> f64 {
        self.sample(rng_id, |rng| rng.random::<f64>())
    }
}
