use std::time::Instant;

use anyhow::Context;

use crate::config::EvolutionConfig;
use crate::evolution::{GenerationStats, Individual, Population};
use crate::logging;
use crate::network::Network;
use crate::propagate::{Propagation, Propagator};
use crate::random::RandomSource;

/// One input vector and the outputs the agent should produce for it.
/// `targets` covers the leading outputs only.
#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    pub inputs: Vec<f32>,
    pub targets: Vec<f32>,
}

#[derive(Clone, Debug, Default)]
pub struct CaseSet {
    pub cases: Vec<Case>,
}

/// Sensors filled by [`CaseSet::flap_decisions`].
pub const FLAP_SENSORS: usize = 4;

impl CaseSet {
    /// Synthetic flap decisions. The first four inputs are bird height, gap
    /// height, vertical speed and distance to the gap, all in `[-1, 1]`; any
    /// further inputs stay zero. The agent should flap (output 0 high, output
    /// 1 low) when the bird is below the gap, and glide otherwise.
    ///
    /// # Panics
    ///
    /// Panics if `input_len` is below [`FLAP_SENSORS`].
    pub fn flap_decisions(count: usize, input_len: usize, rng: &mut RandomSource) -> Self {
        assert!(
            input_len >= FLAP_SENSORS,
            "flap decisions need at least {FLAP_SENSORS} inputs, got {input_len}"
        );
        let cases = (0..count)
            .map(|_| {
                let mut inputs = vec![0.0; input_len];
                for v in &mut inputs[..FLAP_SENSORS] {
                    *v = rng.value();
                }
                let flap = if inputs[0] < inputs[1] { 1.0 } else { 0.0 };
                Case { inputs, targets: vec![flap, 1.0 - flap] }
            })
            .collect();
        Self { cases }
    }

    /// Negative mean squared error over every case and target.
    pub fn fitness<P: Propagator + ?Sized>(&self, network: &mut Network, propagator: &P) -> f32 {
        let mut error = 0.0f32;
        let mut terms = 0usize;
        for case in &self.cases {
            network.set_inputs(&case.inputs);
            network.process_with(propagator);
            for (i, &target) in case.targets.iter().enumerate() {
                let diff = network.get_output(i) - target;
                error += diff * diff;
                terms += 1;
            }
        }
        if terms == 0 { 0.0 } else { -error / terms as f32 }
    }
}

pub struct TrainingOutcome {
    pub best: Individual,
    pub history: Vec<GenerationStats>,
}

pub fn run_training(config: &EvolutionConfig) -> anyhow::Result<TrainingOutcome> {
    config.validate()?;

    let seed = config.seed.unwrap_or_else(|| RandomSource::from_entropy().range(0, u64::MAX));
    log::info!(
        "training {} networks {:?} for {} generations (seed {seed}, {:?} propagation)",
        config.population_size,
        config.layer_sizes.0,
        config.generations,
        config.propagation
    );

    let mut rng = RandomSource::new(seed);
    let cases = CaseSet::flap_decisions(config.case_count, config.layer_sizes.inputs(), &mut rng);
    let mut population = Population::new_random(config.population_size, config.layer_sizes, &mut rng)
        .context("could not allocate the population")?;
    let propagation: Propagation = config.propagation;
    let mut history = Vec::with_capacity(config.generations);

    for generation in 0..config.generations {
        let start_time = Instant::now();
        population.evaluate(|network| cases.fitness(network, &propagation));

        let stats = population.stats();
        log::info!(
            "Gen {:>3} | Best Fit: {:>8.5} | Mean: {:>8.5} | Worst: {:>8.5} | Time: {:?}",
            generation,
            stats.best,
            stats.mean,
            stats.worst,
            start_time.elapsed()
        );
        logging::scalar(generation as u64, "best_fitness", stats.best);
        logging::scalar(generation as u64, "mean_fitness", stats.mean);
        log::debug!("stats {}", serde_json::to_string(&stats)?);
        history.push(stats);

        if generation + 1 < config.generations {
            population
                .evolve(config.retain_top, config.mutations_per_child, &mut rng)
                .context("could not breed the next generation")?;
        }
    }

    let best = population
        .best()
        .cloned()
        .context("population is empty")?;
    Ok(TrainingOutcome { best, history })
}
