#![allow(dead_code)]

use std::collections::VecDeque;

use eyre::{eyre, Result};
use rnes_host::{Button, DisplaySurface, Engine, Notice, Notifier};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Reset,
    LoadCartridge(Vec<u8>),
    AdvanceFrame,
    ReadFrameBuffer,
    SetButtonState(u8, bool),
    SaveState,
    RestoreState,
}

/// Records every call; frames are a counter byte repeated over the raster.
pub struct RecordingEngine {
    pub calls: Vec<Call>,
    /// Answers for successive `load_cartridge` calls; accepts once exhausted.
    pub verdicts: VecDeque<bool>,
    pub frame_len: usize,
    frame: Vec<u8>,
    frames: u8,
}

impl RecordingEngine {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            calls: Vec::new(),
            verdicts: VecDeque::new(),
            frame_len: width * height * 3,
            frame: Vec::new(),
            frames: 0,
        }
    }

    pub fn with_verdicts(mut self, verdicts: &[bool]) -> Self {
        self.verdicts = verdicts.iter().copied().collect();
        self
    }

    pub fn with_frame_len(mut self, frame_len: usize) -> Self {
        self.frame_len = frame_len;
        self
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn button_calls(&self) -> Vec<(u8, bool)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::SetButtonState(code, pressed) => Some((*code, *pressed)),
                _ => None,
            })
            .collect()
    }
}

impl Engine for RecordingEngine {
    fn reset(&mut self) {
        self.calls.push(Call::Reset);
    }

    fn load_cartridge(&mut self, rom: Vec<u8>) -> bool {
        self.calls.push(Call::LoadCartridge(rom));
        self.verdicts.pop_front().unwrap_or(true)
    }

    fn advance_frame(&mut self) {
        self.calls.push(Call::AdvanceFrame);
        self.frames = self.frames.wrapping_add(1);
    }

    fn frame_buffer(&mut self) -> &[u8] {
        self.calls.push(Call::ReadFrameBuffer);
        self.frame = vec![self.frames; self.frame_len];
        &self.frame
    }

    fn set_button_state(&mut self, button: Button, pressed: bool) {
        self.calls.push(Call::SetButtonState(button.code(), pressed));
    }

    fn save_state(&mut self) {
        self.calls.push(Call::SaveState);
    }

    fn restore_state(&mut self) {
        self.calls.push(Call::RestoreState);
    }
}

#[derive(Default)]
pub struct MemorySurface {
    pub images: Vec<Vec<u8>>,
    pub fail: bool,
}

impl DisplaySurface for MemorySurface {
    fn blit(&mut self, image: &[u8], width: usize, height: usize) -> Result<()> {
        if self.fail {
            return Err(eyre!("surface lost"));
        }
        assert_eq!(image.len(), width * height * 4);
        self.images.push(image.to_vec());
        Ok(())
    }
}

#[derive(Default)]
pub struct CollectingNotifier {
    pub notices: Vec<Notice>,
}

impl Notifier for CollectingNotifier {
    fn notify(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
