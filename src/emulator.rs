use std::hash::Hash;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{DriverError, TransportError};
use crate::input::{InputTranslator, KeyMap};
use crate::loader::{CartridgeLoader, LoadOutcome, LoadToken, PresetRequest};
use crate::notice::{Notice, Notifier};
use crate::renderer::{DisplaySurface, Renderer};
use crate::scheduler::{FrameScheduler, Tick};

/// Owns the engine and everything that talks to it.
///
/// Hosts feed it refresh ticks, key events and finished cartridge reads; it
/// never schedules anything itself.
pub struct Emulator<E, S, N, K> {
    engine: E,
    surface: S,
    notifier: N,
    renderer: Renderer,
    input: InputTranslator<K>,
    loader: CartridgeLoader,
    scheduler: FrameScheduler,
}

impl<E, S, N, K> Emulator<E, S, N, K>
where
    E: Engine,
    S: DisplaySurface,
    N: Notifier,
    K: Eq + Hash,
{
    pub fn new(engine: E, surface: S, notifier: N, keymap: KeyMap<K>, config: &Config) -> Self {
        Self {
            engine,
            surface,
            notifier,
            renderer: Renderer::new(config.width, config.height),
            input: InputTranslator::new(keymap),
            loader: CartridgeLoader::new(config.catalog.clone()),
            scheduler: FrameScheduler::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn loader(&self) -> &CartridgeLoader {
        &self.loader
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn is_loaded(&self) -> bool {
        self.loader.is_loaded()
    }

    pub fn tick(&mut self) -> Tick {
        match self.scheduler.tick(
            self.loader.is_loaded(),
            &mut self.engine,
            &mut self.renderer,
            &mut self.surface,
        ) {
            Ok(tick) => tick,
            Err(err) => {
                self.notifier.notify(&Notice::Halted(err));
                Tick::Halted
            }
        }
    }

    pub fn key_down(&mut self, key: &K, repeat: bool) -> bool {
        self.input.key_down(key, repeat, &mut self.engine)
    }

    pub fn key_up(&mut self, key: &K) -> bool {
        self.input.key_up(key, &mut self.engine)
    }

    pub fn request_local(&mut self, name: Option<&str>) -> Option<LoadToken> {
        self.loader.request_local(name)
    }

    pub fn request_preset(&mut self, name: &str) -> Result<PresetRequest, DriverError> {
        self.loader.request_preset(name)
    }

    pub fn request_preset_at(&mut self, index: usize) -> Result<PresetRequest, DriverError> {
        self.loader.request_preset_at(index)
    }

    /// Hands a finished read to the loader and tells the user if it failed.
    pub fn complete_load(
        &mut self,
        token: LoadToken,
        result: Result<Vec<u8>, TransportError>,
    ) -> LoadOutcome {
        let outcome = self.loader.complete(token, result, &mut self.engine);
        match &outcome {
            LoadOutcome::Rejected { source } => {
                self.notifier.notify(&Notice::UnsupportedCartridge {
                    source: source.clone(),
                });
            }
            LoadOutcome::TransportFailed { source, error } => {
                self.notifier.notify(&Notice::TransportFailure {
                    source: source.clone(),
                    error: error.clone(),
                });
            }
            LoadOutcome::Loaded { .. } | LoadOutcome::Stale { .. } => {}
        }
        outcome
    }
}
