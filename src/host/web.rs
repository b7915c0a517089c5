//! Browser host.
//!
//! The page builds an engine object and passes it in together with the
//! canvas to draw on. Frames are pumped from `requestAnimationFrame`;
//! cartridges come from a file input or from `fetch` on a catalog path.

use std::cell::RefCell;
use std::rc::Rc;

use eyre::eyre;
use js_sys::{Array, ArrayBuffer, Promise, Uint8Array};
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    console, CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlInputElement, ImageData,
    KeyboardEvent, Response, Window,
};

use crate::config::Config;
use crate::controller::Button;
use crate::emulator::Emulator;
use crate::engine::Engine;
use crate::error::TransportError;
use crate::input::{HostKey, KeyScheme};
use crate::loader::{LoadToken, PresetRequest};
use crate::notice::{Notice, Notifier};
use crate::renderer::DisplaySurface;

#[wasm_bindgen]
extern "C" {
    /// An engine instance constructed by the page.
    pub type JsEngine;

    #[wasm_bindgen(structural, method)]
    fn reset(this: &JsEngine);

    #[wasm_bindgen(structural, method, js_name = loadCartridge)]
    fn load_cartridge(this: &JsEngine, rom: &Uint8Array) -> JsValue;

    #[wasm_bindgen(structural, method, js_name = advanceFrame)]
    fn advance_frame(this: &JsEngine);

    #[wasm_bindgen(structural, method, js_name = readFrameBuffer)]
    fn read_frame_buffer(this: &JsEngine) -> Uint8Array;

    #[wasm_bindgen(structural, method, js_name = setButtonState)]
    fn set_button_state(this: &JsEngine, code: u8, pressed: bool);

    #[wasm_bindgen(structural, method, js_name = saveState)]
    fn save_state(this: &JsEngine);

    #[wasm_bindgen(structural, method, js_name = restoreState)]
    fn restore_state(this: &JsEngine);
}

pub struct WebEngine {
    handle: JsEngine,
    frame: Vec<u8>,
}

impl WebEngine {
    pub fn new(handle: JsEngine) -> Self {
        Self {
            handle,
            frame: Vec::new(),
        }
    }
}

impl Engine for WebEngine {
    fn reset(&mut self) {
        self.handle.reset();
    }

    fn load_cartridge(&mut self, rom: Vec<u8>) -> bool {
        let rom = Uint8Array::from(rom.as_slice());
        // Older engines return nothing here and never refuse a cartridge.
        self.handle.load_cartridge(&rom).as_bool().unwrap_or(true)
    }

    fn advance_frame(&mut self) {
        self.handle.advance_frame();
    }

    fn frame_buffer(&mut self) -> &[u8] {
        let buffer = self.handle.read_frame_buffer();
        self.frame.resize(buffer.length() as usize, 0);
        buffer.copy_to(&mut self.frame);
        &self.frame
    }

    fn set_button_state(&mut self, button: Button, pressed: bool) {
        self.handle.set_button_state(button.code(), pressed);
    }

    fn save_state(&mut self) {
        self.handle.save_state();
    }

    fn restore_state(&mut self) {
        self.handle.restore_state();
    }
}

/// Paints into an off-screen canvas at native size, then draws that onto the
/// visible one magnified without smoothing.
pub struct CanvasSurface {
    display: CanvasRenderingContext2d,
    buffer_canvas: HtmlCanvasElement,
    buffer: CanvasRenderingContext2d,
    scale: f64,
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| JsValue::from_str("2d context has an unexpected type"))
}

impl CanvasSurface {
    pub fn new(
        window: &Window,
        canvas: &HtmlCanvasElement,
        config: &Config,
    ) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        canvas.set_width(config.width as u32 * config.scale);
        canvas.set_height(config.height as u32 * config.scale);
        let display = context_2d(canvas)?;
        display.set_image_smoothing_enabled(false);

        let buffer_canvas = document
            .create_element("canvas")?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| JsValue::from_str("could not create canvas"))?;
        buffer_canvas.set_width(config.width as u32);
        buffer_canvas.set_height(config.height as u32);
        let buffer = context_2d(&buffer_canvas)?;

        Ok(Self {
            display,
            buffer_canvas,
            buffer,
            scale: f64::from(config.scale),
        })
    }
}

fn describe(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

impl DisplaySurface for CanvasSurface {
    fn blit(&mut self, image: &[u8], width: usize, height: usize) -> eyre::Result<()> {
        let data =
            ImageData::new_with_u8_clamped_array_and_sh(Clamped(image), width as u32, height as u32)
                .map_err(|e| eyre!("ImageData: {}", describe(&e)))?;
        self.buffer
            .put_image_data(&data, 0.0, 0.0)
            .map_err(|e| eyre!("putImageData: {}", describe(&e)))?;
        self.display
            .draw_image_with_html_canvas_element_and_dw_and_dh(
                &self.buffer_canvas,
                0.0,
                0.0,
                width as f64 * self.scale,
                height as f64 * self.scale,
            )
            .map_err(|e| eyre!("drawImage: {}", describe(&e)))?;
        Ok(())
    }
}

pub struct AlertNotifier {
    window: Window,
}

impl Notifier for AlertNotifier {
    fn notify(&mut self, notice: &Notice) {
        log::warn!("{notice}");
        if let Err(err) = self.window.alert_with_message(&notice.to_string()) {
            log::error!("alert failed: {}", describe(&err));
        }
    }
}

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn init_logging() {
    console_error_panic_hook::set_once();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

type Shared = Rc<RefCell<Emulator<WebEngine, CanvasSurface, AlertNotifier, HostKey>>>;

fn host_key(scheme: KeyScheme, event: &KeyboardEvent) -> HostKey {
    match scheme {
        KeyScheme::Code => HostKey::Code(event.code()),
        KeyScheme::KeyCode => HostKey::KeyCode(event.key_code()),
    }
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = Promise)]
    type ThenablePromise;

    #[wasm_bindgen(method, js_name = then)]
    fn then_either(this: &ThenablePromise, resolve: &JsValue, reject: &JsValue) -> Promise;
}

/// Runs `callback` once with whatever `promise` settles to, fulfilled value
/// or rejection reason. The callback frees itself after that call.
fn settle_with<F>(promise: &Promise, callback: F)
where
    F: FnOnce(JsValue) + 'static,
{
    let callback = Closure::once_into_js(callback);
    let _ = promise
        .unchecked_ref::<ThenablePromise>()
        .then_either(&callback, &callback);
}

/// Waits for `body` to settle to an `ArrayBuffer` and commits it.
fn deliver(inner: &Shared, token: LoadToken, body: Promise) {
    let inner = inner.clone();
    settle_with(&body, move |value: JsValue| {
        let result = match value.dyn_into::<ArrayBuffer>() {
            Ok(buffer) => Ok(Uint8Array::new(&buffer).to_vec()),
            Err(err) => Err(TransportError::Read(describe(&err))),
        };
        inner.borrow_mut().complete_load(token, result);
    });
}

fn open_file(inner: &Shared, input: &HtmlInputElement) {
    let file = input.files().and_then(|files| files.get(0));
    let name = file.as_ref().map(|file| file.name());
    let token = inner.borrow_mut().request_local(name.as_deref());
    if let (Some(file), Some(token)) = (file, token) {
        deliver(inner, token, file.array_buffer());
    }
}

fn fetch_preset(inner: &Shared, window: &Window, request: PresetRequest) {
    let PresetRequest { token, path } = request;
    let inner = inner.clone();
    settle_with(&window.fetch_with_str(&path), move |value: JsValue| {
        let response = match value.dyn_into::<Response>() {
            Ok(response) => response,
            Err(err) => {
                let error = TransportError::Read(describe(&err));
                inner.borrow_mut().complete_load(token, Err(error));
                return;
            }
        };
        if !response.ok() {
            let error = TransportError::Status(response.status());
            inner.borrow_mut().complete_load(token, Err(error));
            return;
        }
        match response.array_buffer() {
            Ok(body) => deliver(&inner, token, body),
            Err(err) => {
                let error = TransportError::Read(describe(&err));
                inner.borrow_mut().complete_load(token, Err(error));
            }
        }
    });
}

/// The driver as exported to JavaScript.
#[wasm_bindgen]
pub struct WebEmulator {
    inner: Shared,
    window: Window,
    frame_loop: Rc<RefCell<Option<Closure<dyn FnMut()>>>>,
    // Listeners stay registered only as long as their closures live
    _key_listeners: Vec<Closure<dyn FnMut(KeyboardEvent)>>,
    _file_listener: Option<Closure<dyn FnMut(Event)>>,
}

#[wasm_bindgen]
impl WebEmulator {
    /// `scheme` is `"code"` (default) or `"keycode"`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        engine: JsEngine,
        canvas: HtmlCanvasElement,
        scheme: Option<String>,
    ) -> Result<WebEmulator, JsValue> {
        init_logging();

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let mut config = Config::default();
        if let Some(scheme) = scheme {
            config.scheme = scheme
                .parse()
                .map_err(|err| JsValue::from_str(&format!("{err}")))?;
        }

        let surface = CanvasSurface::new(&window, &canvas, &config)?;
        let notifier = AlertNotifier {
            window: window.clone(),
        };
        let inner: Shared = Rc::new(RefCell::new(Emulator::new(
            WebEngine::new(engine),
            surface,
            notifier,
            config.scheme.key_map(),
            &config,
        )));

        // Key events only reach the canvas when it can take focus.
        canvas.set_tab_index(0);

        let on_down = {
            let inner = inner.clone();
            let scheme = config.scheme;
            Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                let key = host_key(scheme, &event);
                if key.is_navigation() {
                    event.prevent_default();
                }
                inner.borrow_mut().key_down(&key, event.repeat());
            })
        };
        let on_up = {
            let inner = inner.clone();
            let scheme = config.scheme;
            Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
                let key = host_key(scheme, &event);
                if key.is_navigation() {
                    event.prevent_default();
                }
                inner.borrow_mut().key_up(&key);
            })
        };
        canvas.add_event_listener_with_callback("keydown", on_down.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("keyup", on_up.as_ref().unchecked_ref())?;

        log::info!("Driver ready, {:?} key scheme", config.scheme);

        Ok(WebEmulator {
            inner,
            window,
            frame_loop: Rc::new(RefCell::new(None)),
            _key_listeners: vec![on_down, on_up],
            _file_listener: None,
        })
    }

    /// Starts the animation-frame loop. Calling it again does nothing.
    pub fn start(&mut self) -> Result<(), JsValue> {
        if self.frame_loop.borrow().is_some() {
            return Ok(());
        }

        let inner = self.inner.clone();
        let window = self.window.clone();
        let frame_loop = self.frame_loop.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            if !inner.borrow_mut().tick().reschedule() {
                log::error!("Frame loop stopped");
                return;
            }
            if let Some(callback) = frame_loop.borrow().as_ref() {
                let requested = window.request_animation_frame(callback.as_ref().unchecked_ref());
                if let Err(err) = requested {
                    log::error!("requestAnimationFrame failed: {}", describe(&err));
                }
            }
        });

        self.window
            .request_animation_frame(callback.as_ref().unchecked_ref())?;
        *self.frame_loop.borrow_mut() = Some(callback);
        Ok(())
    }

    /// Loads whatever gets picked in `input` from now on. Only one input can
    /// be attached.
    pub fn attach_file_input(&mut self, input: HtmlInputElement) -> Result<(), JsValue> {
        if self._file_listener.is_some() {
            return Err(JsValue::from_str("a file input is already attached"));
        }
        let inner = self.inner.clone();
        let target = input.clone();
        let listener = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            open_file(&inner, &target);
        });
        input.add_event_listener_with_callback("change", listener.as_ref().unchecked_ref())?;
        self._file_listener = Some(listener);
        Ok(())
    }

    pub fn load_preset(&self, name: &str) -> Result<(), JsValue> {
        let request = self
            .inner
            .borrow_mut()
            .request_preset(name)
            .map_err(|err| JsValue::from_str(&format!("{err}")))?;
        fetch_preset(&self.inner, &self.window, request);
        Ok(())
    }

    pub fn presets(&self) -> Array {
        self.inner
            .borrow()
            .loader()
            .catalog()
            .iter()
            .map(|preset| JsValue::from_str(&preset.name))
            .collect()
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.borrow().is_loaded()
    }

    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().scheduler().frames()
    }
}
