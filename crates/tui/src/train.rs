use anyhow::{ensure, Result};
use chrono::Utc;
use onfs_core::{LoadedCar, LoadedTrack, TrainingSession};
use tracing::info;

/// Genetic-algorithm parameters for a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingParams {
    pub population: usize,
    pub generations: usize,
    pub ticks: usize,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            population: 20,
            generations: 1000,
            ticks: 500,
        }
    }
}

/// Training frontend without a window. Validates the loaded handles and
/// reports the run it was asked to perform.
#[derive(Debug, Default)]
pub struct HeadlessTrainer {
    params: TrainingParams,
    runs: usize,
}

impl HeadlessTrainer {
    pub fn new(params: TrainingParams) -> Self {
        Self { params, runs: 0 }
    }

    pub fn runs(&self) -> usize {
        self.runs
    }
}

impl TrainingSession<LoadedTrack, LoadedCar> for HeadlessTrainer {
    fn train(&mut self, track: &LoadedTrack, car: &LoadedCar) -> Result<()> {
        ensure!(self.params.population > 0, "training population must be positive");
        ensure!(self.params.ticks > 0, "training ticks must be positive");

        info!(
            population = self.params.population,
            generations = self.params.generations,
            ticks = self.params.ticks,
            "Starting training"
        );
        info!(
            "Training {} on {} ({} / {})",
            car.name,
            track.name,
            car.path.display(),
            track.path.display()
        );

        self.runs += 1;
        let elapsed = Utc::now() - track.loaded_at;
        info!(
            "Training run {} finished, assets loaded {}ms ago",
            self.runs,
            elapsed.num_milliseconds()
        );
        Ok(())
    }
}
