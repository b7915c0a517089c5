//! SDL2 host. Runs the frame loop on vsync, takes cartridges from
//! drag-and-drop, the file picker (I) or the preset keys (F1..F12), and
//! shows notices in a message box.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use eyre::{eyre, Result};
use native_dialog::FileDialog;
use sdl2::{
    event::Event,
    keyboard::Keycode,
    messagebox::{show_simple_message_box, MessageBoxFlag},
    pixels::PixelFormatEnum,
    render::{Canvas, TextureCreator},
    video::{Window, WindowContext},
};

use crate::config::Config;
use crate::controller::{Binding, Button, MetaAction};
use crate::emulator::Emulator;
use crate::engine::Engine;
use crate::error::TransportError;
use crate::input::KeyMap;
use crate::loader::LoadToken;
use crate::notice::{Notice, Notifier};
use crate::renderer::DisplaySurface;
use crate::scheduler::Tick;

const PRESET_KEYS: [Keycode; 12] = [
    Keycode::F1,
    Keycode::F2,
    Keycode::F3,
    Keycode::F4,
    Keycode::F5,
    Keycode::F6,
    Keycode::F7,
    Keycode::F8,
    Keycode::F9,
    Keycode::F10,
    Keycode::F11,
    Keycode::F12,
];

const FRAME_DELAY: Duration = Duration::from_millis(17); // 1000ms / ~60fps

type Completion = (LoadToken, std::result::Result<Vec<u8>, TransportError>);

pub struct SdlSurface {
    canvas: Canvas<Window>,
    tex_creator: TextureCreator<WindowContext>,
}

impl DisplaySurface for SdlSurface {
    fn blit(&mut self, image: &[u8], width: usize, height: usize) -> Result<()> {
        let mut texture = self.tex_creator.create_texture_streaming(
            PixelFormatEnum::ABGR8888,
            width as u32,
            height as u32,
        )?;
        texture.update(None, image, width * 4)?;

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .map_err(|e| eyre!(e))?;
        self.canvas.present();
        Ok(())
    }
}

pub struct MessageBoxNotifier;

impl Notifier for MessageBoxNotifier {
    fn notify(&mut self, notice: &Notice) {
        log::warn!("{notice}");
        if let Err(err) = show_simple_message_box(
            MessageBoxFlag::WARNING,
            "rNES",
            &notice.to_string(),
            None::<&Window>,
        ) {
            log::error!("Could not show message box: {err}");
        }
    }
}

pub fn build_keymap() -> KeyMap<Keycode> {
    KeyMap::from([
        (Keycode::Down, Binding::Button(Button::Down)),
        (Keycode::Up, Binding::Button(Button::Up)),
        (Keycode::Right, Binding::Button(Button::Right)),
        (Keycode::Left, Binding::Button(Button::Left)),
        (Keycode::Space, Binding::Button(Button::Select)),
        (Keycode::Return, Binding::Button(Button::Start)),
        (Keycode::A, Binding::Button(Button::A)),
        (Keycode::S, Binding::Button(Button::B)),
        (Keycode::O, Binding::Meta(MetaAction::SaveState)),
        (Keycode::P, Binding::Meta(MetaAction::RestoreState)),
    ])
}

/// Reads a cartridge off the main thread; the result comes back through the
/// channel and is committed by the frame loop.
fn spawn_read(path: PathBuf, token: LoadToken, tx: &Sender<Completion>) {
    let tx = tx.clone();
    thread::spawn(move || {
        let result = std::fs::read(&path)
            .map_err(|err| TransportError::Read(format!("{}: {err}", path.display())));
        // The loop may already be gone; nothing to do then.
        let _ = tx.send((token, result));
    });
}

/// `None` when the dialog was cancelled.
fn pick_rom() -> Result<Option<PathBuf>> {
    let path = FileDialog::new()
        .add_filter(".nes ROM", &["nes"])
        .show_open_single_file()?;
    Ok(path)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Opens a window and drives `engine` until the window closes or the frame
/// loop halts. `rom` is loaded as if it had been dropped on the window.
pub fn run<E: Engine>(engine: E, config: &Config, rom: Option<PathBuf>) -> Result<()> {
    let _ = env_logger::try_init();

    let sdl = sdl2::init().map_err(|e| eyre!(e))?;
    let video = sdl.video().map_err(|e| eyre!(e))?;
    sdl2::hint::set("SDL_RENDER_SCALE_QUALITY", "0");

    let window = video
        .window(
            "rNES",
            config.width as u32 * config.scale,
            config.height as u32 * config.scale,
        )
        .position_centered()
        .build()?;
    let canvas = window.into_canvas().present_vsync().build()?;
    let tex_creator = canvas.texture_creator();
    let mut event_pump = sdl.event_pump().map_err(|e| eyre!(e))?;

    let surface = SdlSurface {
        canvas,
        tex_creator,
    };
    let mut emulator = Emulator::new(engine, surface, MessageBoxNotifier, build_keymap(), config);

    let (tx, rx): (Sender<Completion>, Receiver<Completion>) = mpsc::channel();

    if let Some(path) = rom {
        if let Some(token) = emulator.request_local(Some(&file_name(&path))) {
            spawn_read(path, token, &tx);
        }
    }

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main,
                Event::KeyDown {
                    keycode: Some(Keycode::I),
                    repeat: false,
                    ..
                } => match pick_rom() {
                    Ok(path) => {
                        let name = path.as_deref().map(file_name);
                        if let (Some(path), Some(token)) =
                            (path, emulator.request_local(name.as_deref()))
                        {
                            spawn_read(path, token, &tx);
                        }
                    }
                    Err(err) => log::error!("Could not open file dialog: {err}"),
                },
                Event::KeyDown {
                    keycode: Some(keycode),
                    repeat,
                    ..
                } => {
                    if let Some(index) = PRESET_KEYS.iter().position(|key| *key == keycode) {
                        if repeat {
                            continue;
                        }
                        match emulator.request_preset_at(index) {
                            Ok(request) => {
                                spawn_read(config.rom_dir.join(&request.path), request.token, &tx)
                            }
                            Err(err) => log::debug!("{err}"),
                        }
                    } else {
                        emulator.key_down(&keycode, repeat);
                    }
                }
                Event::KeyUp {
                    keycode: Some(keycode),
                    ..
                } => {
                    emulator.key_up(&keycode);
                }
                Event::DropFile { filename, .. } => {
                    let path = PathBuf::from(filename);
                    if let Some(token) = emulator.request_local(Some(&file_name(&path))) {
                        spawn_read(path, token, &tx);
                    }
                }
                _ => { /* do nothing */ }
            }
        }

        while let Ok((token, result)) = rx.try_recv() {
            emulator.complete_load(token, result);
        }

        match emulator.tick() {
            Tick::Halted => break 'main,
            tick if tick.needs_delay() => thread::sleep(FRAME_DELAY),
            _ => {}
        }
    }

    match emulator.scheduler().halted() {
        Some(err) => Err(eyre!("Emulation halted: {err}")),
        None => Ok(()),
    }
}
