use rayon::prelude::*;
use serde::Serialize;

use crate::error::NetworkError;
use crate::network::{LayerSizes, Network};
use crate::random::RandomSource;

#[derive(Clone, Debug)]
pub struct Individual {
    pub network: Network,
    pub fitness: f32,
}

pub struct Population {
    pub individuals: Vec<Individual>,
    pub generation: u32,
}

/// Fitness summary of one generation
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GenerationStats {
    pub generation: u32,
    pub best: f32,
    pub mean: f32,
    pub worst: f32,
}

impl Population {
    pub fn new_random(size: usize, sizes: LayerSizes, rng: &mut RandomSource) -> Result<Self, NetworkError> {
        let individuals = (0..size)
            .map(|_| -> Result<Individual, NetworkError> {
                Ok(Individual {
                    network: Network::with_sizes(sizes, rng)?,
                    fitness: 0.0,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            individuals,
            generation: 0,
        })
    }

    /// Scores every network in parallel. Each call of `fitness` owns its
    /// network exclusively.
    pub fn evaluate<F>(&mut self, fitness: F)
    where
        F: Fn(&mut Network) -> f32 + Sync,
    {
        self.individuals
            .par_iter_mut()
            .for_each(|ind| ind.fitness = fitness(&mut ind.network));
    }

    /// Keeps the `retain_top` fittest unchanged and refills the rest with
    /// mutated clones of uniformly chosen survivors.
    ///
    /// # Panics
    ///
    /// Panics if `retain_top` is zero or larger than the population.
    pub fn evolve(
        &mut self,
        retain_top: usize,
        mutations_per_child: usize,
        rng: &mut RandomSource,
    ) -> Result<(), NetworkError> {
        let size = self.individuals.len();
        assert!(
            retain_top > 0 && retain_top <= size,
            "retain_top {retain_top} must be within 1..={size}"
        );

        self.individuals.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        self.individuals.truncate(retain_top);

        let mut children = Vec::with_capacity(size - retain_top);
        while retain_top + children.len() < size {
            let parent = &self.individuals[rng.range(0, retain_top - 1)];
            children.push((parent.network.try_clone()?, rng.fork()));
        }

        let children: Vec<Individual> = children
            .into_par_iter()
            .map(|(mut network, mut child_rng)| {
                for _ in 0..mutations_per_child {
                    network.mutate(&mut child_rng);
                }
                Individual { network, fitness: 0.0 }
            })
            .collect();

        self.individuals.extend(children);
        self.generation += 1;
        log::debug!("generation {} bred from {} survivors", self.generation, retain_top);
        Ok(())
    }

    pub fn best(&self) -> Option<&Individual> {
        self.individuals
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
    }

    pub fn stats(&self) -> GenerationStats {
        let mut best = f32::NEG_INFINITY;
        let mut worst = f32::INFINITY;
        let mut sum = 0.0f32;
        for ind in &self.individuals {
            best = best.max(ind.fitness);
            worst = worst.min(ind.fitness);
            sum += ind.fitness;
        }
        let mean = if self.individuals.is_empty() { 0.0 } else { sum / self.individuals.len() as f32 };
        GenerationStats { generation: self.generation, best, mean, worst }
    }
}
