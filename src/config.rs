use std::path::PathBuf;

use eyre::{eyre, Result};

use crate::input::KeyScheme;
use crate::loader::{Catalog, Preset};

pub const SCREEN_WIDTH: usize = 256;
pub const SCREEN_HEIGHT: usize = 240;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    /// Integer magnification applied by the display surface.
    pub scale: u32,
    pub scheme: KeyScheme,
    pub catalog: Catalog,
    /// Base directory for preset paths on the desktop host.
    pub rom_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            height: SCREEN_HEIGHT,
            scale: 2,
            scheme: KeyScheme::default(),
            catalog: Catalog::default(),
            rom_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads `--scale N`, `--keycodes`, `--rom-dir DIR` and any number of
    /// `--preset NAME=PATH`. Presets given here replace the built-in list.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut presets = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--keycodes" => config.scheme = KeyScheme::KeyCode,
                "--scale" => {
                    let value = Self::value_of(&arg, args.next())?;
                    config.scale = value
                        .parse()
                        .map_err(|_| eyre!("Invalid scale \"{value}\""))?;
                    if config.scale == 0 {
                        return Err(eyre!("Scale must be at least 1"));
                    }
                }
                "--rom-dir" => config.rom_dir = PathBuf::from(Self::value_of(&arg, args.next())?),
                "--preset" => {
                    let value = Self::value_of(&arg, args.next())?;
                    let (name, path) = value
                        .split_once('=')
                        .ok_or_else(|| eyre!("Preset must look like NAME=PATH, got \"{value}\""))?;
                    presets.push(Preset::new(name, path));
                }
                _ => log::debug!("Ignoring argument {arg}"),
            }
        }

        if !presets.is_empty() {
            config.catalog = Catalog::new(presets);
        }

        Ok(config)
    }

    fn value_of(flag: &str, value: Option<String>) -> Result<String> {
        value.ok_or_else(|| eyre!("{flag} needs a value"))
    }
}
