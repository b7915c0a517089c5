use crate::engine::Engine;
use crate::error::DriverError;
use crate::renderer::{DisplaySurface, Renderer};

/// What a tick did, and whether the host should schedule another one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Nothing loaded yet.
    Idle,
    Presented,
    /// A frame ran but the surface refused it, so nothing waited on the
    /// display either.
    Dropped,
    /// The loop is dead. Hosts must not re-register.
    Halted,
}

impl Tick {
    pub fn reschedule(&self) -> bool {
        !matches!(self, Tick::Halted)
    }

    /// True when no present call throttled this tick and a host pacing on
    /// vsync has to wait out the refresh period itself.
    pub fn needs_delay(&self) -> bool {
        matches!(self, Tick::Idle | Tick::Dropped)
    }
}

/// The per-refresh advance-and-present step.
pub struct FrameScheduler {
    frames: u64,
    halted: Option<DriverError>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            frames: 0,
            halted: None,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn halted(&self) -> Option<&DriverError> {
        self.halted.as_ref()
    }

    /// Runs one frame when a cartridge is loaded. A fatal error is returned
    /// once, on the tick that hit it; later ticks just report `Halted`.
    pub fn tick<E, S>(
        &mut self,
        loaded: bool,
        engine: &mut E,
        renderer: &mut Renderer,
        surface: &mut S,
    ) -> Result<Tick, DriverError>
    where
        E: Engine,
        S: DisplaySurface,
    {
        if self.halted.is_some() {
            return Ok(Tick::Halted);
        }
        if !loaded {
            return Ok(Tick::Idle);
        }

        let (width, height) = (renderer.width(), renderer.height());
        engine.advance_frame();
        let image = match renderer.render(engine.frame_buffer()) {
            Ok(image) => image,
            Err(err) => {
                log::error!("Frame {}: {err}", self.frames);
                self.halted = Some(err.clone());
                return Err(err);
            }
        };

        let blitted = surface.blit(image, width, height);
        self.frames += 1;

        match blitted {
            Ok(()) => Ok(Tick::Presented),
            Err(err) => {
                log::warn!("Frame {}: blit failed: {err}", self.frames - 1);
                Ok(Tick::Dropped)
            }
        }
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}
