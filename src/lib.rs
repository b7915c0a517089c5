//! Host-side driver for an NES emulation engine.
//!
//! The engine itself is opaque and reached only through [`engine::Engine`].
//! This crate pumps its frames, converts them for display, routes key input
//! to it and gets cartridges into it. Browser and SDL2 hosts sit behind the
//! `web` and `desktop` features.

#![warn(trivial_numeric_casts)]

pub mod config;
pub mod controller;
pub mod emulator;
pub mod engine;
pub mod error;
pub mod host;
pub mod input;
pub mod loader;
pub mod notice;
pub mod renderer;
pub mod scheduler;

pub use config::Config;
pub use controller::{Binding, Button, MetaAction};
pub use emulator::Emulator;
pub use engine::Engine;
pub use error::{DriverError, TransportError};
pub use input::{HostKey, KeyMap, KeyScheme};
pub use loader::{LoadOutcome, LoadToken, Source};
pub use notice::{Notice, Notifier};
pub use renderer::{DisplaySurface, Renderer};
pub use scheduler::Tick;
