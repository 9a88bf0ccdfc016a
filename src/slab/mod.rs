mod boundary;
mod spin;
mod step;

use crate::histogram::{GridSpec, Histogram};
use crate::layer::LayerStack;
use crate::photon::Photon;
use crate::random::{McRng, UniformSource};
use rayon::prelude::{ParallelIterator, IntoParallelIterator};
use indicatif::{ProgressBar, ParallelProgressIterator, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Critical weight for roulette.
pub const WEIGHT: f64 = 1e-4;
/// Chance of roulette survival.
pub const CHANCE: f64 = 0.1;

/// What happens to a packet reaching the top or bottom surface of the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossingMode {
    /// The whole packet is either transmitted or reflected.
    Stochastic,
    /// The packet is split into a transmitted and a reflected part.
    PartialReflection,
}

impl Default for CrossingMode {
    fn default() -> Self {
        CrossingMode::Stochastic
    }
}

/// Whether absorbed weight is scored into the absorption grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsorptionScoring {
    Recorded,
    Discarded,
}

impl Default for AbsorptionScoring {
    fn default() -> Self {
        AbsorptionScoring::Recorded
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Play roulette if the photon weight drops below this.
    pub weight_threshold: f64,
    pub roulette_chance: f64,
    pub grid: GridSpec,
    pub crossing: CrossingMode,
    pub absorption: AbsorptionScoring,
}

impl SimulationParams {
    pub fn new(grid: GridSpec) -> SimulationParams {
        SimulationParams {
            weight_threshold: WEIGHT,
            roulette_chance: CHANCE,
            grid,
            crossing: CrossingMode::default(),
            absorption: AbsorptionScoring::default(),
        }
    }
}

/// A multi-layered medium that photon packets are traced through.
pub struct LayeredSlab {
    layers: LayerStack,
    params: SimulationParams,
    rspecular: f64,
}

impl LayeredSlab {
    pub fn new(layers: LayerStack, params: SimulationParams) -> LayeredSlab {
        let rspecular = layers.specular_reflectance();
        LayeredSlab { layers, params, rspecular }
    }

    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn specular_reflectance(&self) -> f64 {
        self.rspecular
    }

    pub fn new_histogram(&self) -> Histogram {
        Histogram::new(self.params.grid, self.rspecular)
    }

    /// Trace `number_of_packets` photons with `rng`, accumulating into `histogram`.
    pub fn simulate<R: UniformSource>(&self, number_of_packets: u64, rng: &mut R, histogram: &mut Histogram) {
        for _ in 0..number_of_packets {
            self.trace_photon(rng, histogram);
        }
    }

    /// Launch one photon and follow it until it dies.
    pub fn trace_photon<R: UniformSource>(&self, rng: &mut R, histogram: &mut Histogram) {
        let mut photon = Photon::launch(self.rspecular, &self.layers);
        while photon.alive {
            self.hop_drop_spin(&mut photon, histogram, rng);
        }
        histogram.num_photons += 1;
    }

    pub fn raytrace_photon_packets<R: UniformSource>(&self, number_of_packets: u64, rng: &mut R) -> Histogram {
        let mut result = self.new_histogram();
        self.simulate(number_of_packets, rng, &mut result);
        result
    }

    /// Trace `number_of_packets` photons split over `number_of_jobs` parallel jobs. Job `i`
    /// draws from its own stream seeded with `base_seed + i`, so a run is reproducible for a
    /// fixed job count and seed whatever the number of threads.
    pub fn run_mcrt(&self, number_of_packets: u64, number_of_jobs: u64, base_seed: u64, show_progress: bool) -> Histogram {
        let number_of_jobs = number_of_jobs.max(1);
        let number_of_packets_per_job = number_of_packets / number_of_jobs;
        let remainder = number_of_packets % number_of_jobs;

        let pb = if show_progress { ProgressBar::new(number_of_jobs) } else { ProgressBar::hidden() };
        pb.set_style(ProgressStyle::default_bar().template("[{elapsed_precise}] [{bar:40}] [{percent}%]").progress_chars("##-"));
        pb.enable_steady_tick(1000);
        log::info!(
            "Launching {} photon packets in {} jobs (seed {})",
            number_of_packets, number_of_jobs, base_seed
        );
        let start = Instant::now();

        let all_results: Vec<Histogram> = (0..number_of_jobs).into_par_iter().progress_with(pb).map(|job| {
            let packets = number_of_packets_per_job + if job < remainder { 1 } else { 0 };
            let mut rng = McRng::for_job(base_seed, job);
            log::debug!("job {}: {} packets, seed {}", job, packets, rng.seed());
            self.raytrace_photon_packets(packets, &mut rng)
        }).collect();

        // merge in job order so the sums do not depend on scheduling
        let mut result = self.new_histogram();
        for job_result in all_results {
            result += job_result;
        }

        log::info!(
            "Finished {} packets in {:.2?}: absorbed {:.6}, reflected {:.6}, transmitted {:.6}",
            result.num_photons,
            start.elapsed(),
            result.absorbed() / number_of_packets.max(1) as f64,
            result.reflected() / number_of_packets.max(1) as f64,
            result.transmitted() / number_of_packets.max(1) as f64
        );
        result
    }

    /// One step of a photon: move it through glass, or hop, drop and spin it in tissue. Plays
    /// roulette afterwards if the weight became too small.
    pub(crate) fn hop_drop_spin<R: UniformSource>(&self, photon: &mut Photon, histogram: &mut Histogram, rng: &mut R) {
        if self.layers.layer(photon.layer).is_glass() {
            self.hop_in_glass(photon, histogram, rng);
        } else {
            self.hop_drop_spin_in_tissue(photon, histogram, rng);
        }

        if photon.weight < self.params.weight_threshold && photon.alive {
            step::roulette(photon, self.params.roulette_chance, rng);
        }
    }

    // When a step is long enough to reach an interface it is divided in two: the photon is
    // moved to the boundary free of absorption or scattering, then reflected or transmitted.
    // The unfinished part of the step is taken on the next call.
    fn hop_drop_spin_in_tissue<R: UniformSource>(&self, photon: &mut Photon, histogram: &mut Histogram, rng: &mut R) {
        let layer = self.layers.layer(photon.layer);
        step::step_size_in_tissue(photon, layer, rng);

        if step::hit_boundary(photon, layer) {
            photon.hop();
            self.cross_or_not(photon, histogram, rng);
        } else {
            photon.hop();
            step::drop_weight(photon, layer, self.params.absorption, histogram);
            spin::spin(layer.g, photon, rng);
        }
    }
}
