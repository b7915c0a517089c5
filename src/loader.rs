//! Cartridge acquisition.
//!
//! Images arrive from one of two places: a file the user picked, or a preset
//! fetched from a fixed path. Hosts do the actual I/O and report back through
//! [`CartridgeLoader::complete`] with the token they were given.
//!
//! Only the newest request counts. Asking for another cartridge while one is
//! still in flight supersedes it, and the older result is dropped when it
//! finally shows up.

use std::fmt;

use crate::engine::Engine;
use crate::error::{DriverError, TransportError};

/// Identifies one acquisition. Tokens only ever go up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(u64);

impl LoadToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    LocalFile { name: String },
    Preset { name: String, path: String },
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::LocalFile { name } => write!(f, "file {name}"),
            Source::Preset { name, path } => write!(f, "preset {name} ({path})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    pub path: String,
}

impl Preset {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_owned(),
            path: path.to_owned(),
        }
    }
}

/// The fixed list of cartridges that can be fetched by name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    presets: Vec<Preset>,
}

impl Catalog {
    pub fn new(presets: Vec<Preset>) -> Self {
        Self { presets }
    }

    pub fn find(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&Preset> {
        self.presets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(vec![
            Preset::new("nestest", "roms/nestest.nes"),
            Preset::new("color-test", "roms/color_test.nes"),
            Preset::new("controller-test", "roms/controller_test.nes"),
        ])
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Acquisition {
    Idle,
    Acquiring { token: LoadToken, source: Source },
}

/// A preset fetch the host has to carry out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PresetRequest {
    pub token: LoadToken,
    pub path: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded { source: Source },
    Rejected { source: Source },
    TransportFailed { source: Source, error: TransportError },
    Stale { token: LoadToken },
}

pub struct CartridgeLoader {
    catalog: Catalog,
    last_token: u64,
    acquisition: Acquisition,
    loaded: bool,
}

impl CartridgeLoader {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            last_token: 0,
            acquisition: Acquisition::Idle,
            loaded: false,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn acquisition(&self) -> &Acquisition {
        &self.acquisition
    }

    /// Set once load and reset have both gone through; never cleared.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn pending(&self) -> Option<LoadToken> {
        match self.acquisition {
            Acquisition::Acquiring { token, .. } => Some(token),
            Acquisition::Idle => None,
        }
    }

    /// A file selection. `None` means the picker was dismissed, which is not
    /// an error and leaves everything as it was.
    pub fn request_local(&mut self, name: Option<&str>) -> Option<LoadToken> {
        let name = name?;
        Some(self.begin(Source::LocalFile {
            name: name.to_owned(),
        }))
    }

    pub fn request_preset(&mut self, name: &str) -> Result<PresetRequest, DriverError> {
        let preset = self
            .catalog
            .find(name)
            .cloned()
            .ok_or_else(|| DriverError::UnknownPreset(name.to_owned()))?;
        Ok(self.begin_preset(preset))
    }

    pub fn request_preset_at(&mut self, index: usize) -> Result<PresetRequest, DriverError> {
        let preset = self
            .catalog
            .get(index)
            .cloned()
            .ok_or(DriverError::NoPresetAt(index))?;
        Ok(self.begin_preset(preset))
    }

    fn begin_preset(&mut self, preset: Preset) -> PresetRequest {
        let path = preset.path.clone();
        let token = self.begin(Source::Preset {
            name: preset.name,
            path: preset.path,
        });
        PresetRequest { token, path }
    }

    fn begin(&mut self, source: Source) -> LoadToken {
        if let Some(stale) = self.pending() {
            log::debug!("Request {stale} superseded");
        }
        self.last_token += 1;
        let token = LoadToken(self.last_token);
        log::debug!("Request {token}: acquiring {source}");
        self.acquisition = Acquisition::Acquiring { token, source };
        token
    }

    /// Commits the result of an acquisition. Loading and resetting happen
    /// here back to back, so a frame tick can never see a cartridge that
    /// is in the engine but not yet reset.
    pub fn complete<E: Engine>(
        &mut self,
        token: LoadToken,
        result: Result<Vec<u8>, TransportError>,
        engine: &mut E,
    ) -> LoadOutcome {
        let source = match &self.acquisition {
            Acquisition::Acquiring {
                token: pending,
                source,
            } if *pending == token => source.clone(),
            _ => {
                log::debug!("Request {token}: result discarded");
                return LoadOutcome::Stale { token };
            }
        };
        self.acquisition = Acquisition::Idle;

        let rom = match result {
            Ok(rom) => rom,
            Err(error) => {
                log::warn!("Request {token}: {source} failed: {error}");
                return LoadOutcome::TransportFailed { source, error };
            }
        };

        let size = rom.len();
        if !engine.load_cartridge(rom) {
            log::warn!("Request {token}: engine rejected {source}");
            return LoadOutcome::Rejected { source };
        }
        engine.reset();
        self.loaded = true;
        log::info!("Loaded {source} ({size} bytes)");

        LoadOutcome::Loaded { source }
    }
}
