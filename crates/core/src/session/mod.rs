#![allow(missing_docs)]

//! Load/render/reselect orchestration and its collaborator seams.

pub mod loader;
mod models;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{AssetCatalog, AssetSelection, EditionTag};

pub use loader::DiskAssetLoader;
pub use models::{LoadedCar, LoadedTrack};

/// Turns catalog identifiers into loaded handles.
pub trait AssetLoader {
    type Track;
    type Car;

    fn load_track(&mut self, tag: EditionTag, track: &str) -> Result<Self::Track>;
    fn load_car(&mut self, tag: EditionTag, car: &str) -> Result<Self::Car>;
}

/// Interactive session over loaded assets. Returns the next selection when the
/// operator picks new assets, or a terminal selection to quit.
pub trait RenderSession<T, C> {
    fn render(&mut self, track: &T, car: &C, catalog: &AssetCatalog) -> Result<AssetSelection>;
}

/// One training run over loaded assets.
pub trait TrainingSession<T, C> {
    fn train(&mut self, track: &T, car: &C) -> Result<()>;
}

impl<L: AssetLoader + ?Sized> AssetLoader for &mut L {
    type Track = L::Track;
    type Car = L::Car;

    fn load_track(&mut self, tag: EditionTag, track: &str) -> Result<Self::Track> {
        (**self).load_track(tag, track)
    }

    fn load_car(&mut self, tag: EditionTag, car: &str) -> Result<Self::Car> {
        (**self).load_car(tag, car)
    }
}

impl<T, C, R: RenderSession<T, C> + ?Sized> RenderSession<T, C> for &mut R {
    fn render(&mut self, track: &T, car: &C, catalog: &AssetCatalog) -> Result<AssetSelection> {
        (**self).render(track, car, catalog)
    }
}

/// Selection loop state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    /// Assets chosen; the next step loads and renders them.
    Selecting(AssetSelection),
    /// A session returned the sentinel selection.
    Terminated,
}

/// Drives load → render → reselect cycles until a session asks to stop.
pub struct SelectionLoop<'a, L, R> {
    loader: L,
    session: R,
    catalog: &'a AssetCatalog,
    state: LoopState,
    cycles: usize,
}

impl<'a, L, R> SelectionLoop<'a, L, R>
where
    L: AssetLoader,
    R: RenderSession<L::Track, L::Car>,
{
    pub fn new(loader: L, session: R, catalog: &'a AssetCatalog, seed: AssetSelection) -> Self {
        let state = if seed.is_terminal() {
            LoopState::Terminated
        } else {
            LoopState::Selecting(seed)
        };
        Self {
            loader,
            session,
            catalog,
            state,
            cycles: 0,
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    /// Completed render sessions.
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Run one load + render cycle. A terminated loop stays terminated.
    pub fn step(&mut self) -> Result<&LoopState> {
        let selection = match &self.state {
            LoopState::Selecting(selection) => selection.clone(),
            LoopState::Terminated => return Ok(&self.state),
        };

        info!("Loading {}", selection);
        let next = {
            let track = self
                .loader
                .load_track(selection.track_tag, &selection.track)
                .with_context(|| format!("failed to load track {}", selection.track))?;
            let car = self
                .loader
                .load_car(selection.car_tag, &selection.car)
                .with_context(|| format!("failed to load car {}", selection.car))?;
            self.session.render(&track, &car, self.catalog)?
        };
        self.cycles += 1;

        self.state = if next.is_terminal() {
            info!("Session ended after {} cycles", self.cycles);
            LoopState::Terminated
        } else {
            LoopState::Selecting(next)
        };
        Ok(&self.state)
    }

    /// Step until terminated, returning the number of completed sessions.
    pub fn run(mut self) -> Result<usize> {
        while self.state != LoopState::Terminated {
            self.step()?;
        }
        Ok(self.cycles)
    }
}

/// Load `selection` once and hand it to the trainer. There is no reselection.
pub fn run_training<L, T>(loader: &mut L, trainer: &mut T, selection: &AssetSelection) -> Result<()>
where
    L: AssetLoader,
    T: TrainingSession<L::Track, L::Car>,
{
    info!("Training on {}", selection);
    let track = loader
        .load_track(selection.track_tag, &selection.track)
        .with_context(|| format!("failed to load training track {}", selection.track))?;
    let car = loader
        .load_car(selection.car_tag, &selection.car)
        .with_context(|| format!("failed to load training car {}", selection.car))?;
    trainer.train(&track, &car)
}
