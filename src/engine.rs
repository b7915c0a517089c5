//! The emulation engine as seen from the driver.
//!
//! Everything behind this trait (CPU, PPU, APU, mappers) lives elsewhere.
//! Hosts construct an engine and hand it over; from then on the driver is
//! its only caller.

use crate::controller::Button;

pub trait Engine {
    fn reset(&mut self);

    /// Hands the cartridge image to the engine. Returns `false` when the
    /// engine cannot run it (unknown mapper, bad header, ...).
    fn load_cartridge(&mut self, rom: Vec<u8>) -> bool;

    fn advance_frame(&mut self);

    /// Packed RGB triples for the last finished frame, row-major. The slice
    /// is only valid until the next call into the engine.
    fn frame_buffer(&mut self) -> &[u8];

    fn set_button_state(&mut self, button: Button, pressed: bool);

    fn save_state(&mut self);

    fn restore_state(&mut self);
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn reset(&mut self) {
        (**self).reset()
    }

    fn load_cartridge(&mut self, rom: Vec<u8>) -> bool {
        (**self).load_cartridge(rom)
    }

    fn advance_frame(&mut self) {
        (**self).advance_frame()
    }

    fn frame_buffer(&mut self) -> &[u8] {
        (**self).frame_buffer()
    }

    fn set_button_state(&mut self, button: Button, pressed: bool) {
        (**self).set_button_state(button, pressed)
    }

    fn save_state(&mut self) {
        (**self).save_state()
    }

    fn restore_state(&mut self) {
        (**self).restore_state()
    }
}
