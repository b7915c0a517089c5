use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;

use lazy_static::lazy_static;

use crate::controller::{Binding, Button, MetaAction};
use crate::engine::Engine;
use crate::error::DriverError;

/// A key as reported by the browser.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HostKey {
    /// `KeyboardEvent.code`, e.g. `"ArrowUp"`.
    Code(String),
    /// Legacy numeric `KeyboardEvent.keyCode`.
    KeyCode(u32),
}

impl HostKey {
    pub fn code(code: &str) -> Self {
        HostKey::Code(code.to_owned())
    }

    /// Keys the page would otherwise use for scrolling.
    pub fn is_navigation(&self) -> bool {
        match self {
            HostKey::Code(code) => matches!(
                code.as_str(),
                "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight" | "Space"
            ),
            HostKey::KeyCode(code) => matches!(code, 32 | 37..=40),
        }
    }
}

const DOM_VK_RETURN: u32 = 13;
const DOM_VK_SPACE: u32 = 32;
const DOM_VK_LEFT: u32 = 37;
const DOM_VK_UP: u32 = 38;
const DOM_VK_RIGHT: u32 = 39;
const DOM_VK_DOWN: u32 = 40;
const DOM_VK_A: u32 = 65;
const DOM_VK_O: u32 = 79;
const DOM_VK_P: u32 = 80;
const DOM_VK_S: u32 = 83;

lazy_static! {
    static ref CODE_KEYS: KeyMap<HostKey> = KeyMap::from([
        (HostKey::code("ArrowDown"), Binding::Button(Button::Down)),
        (HostKey::code("ArrowUp"), Binding::Button(Button::Up)),
        (HostKey::code("ArrowRight"), Binding::Button(Button::Right)),
        (HostKey::code("ArrowLeft"), Binding::Button(Button::Left)),
        (HostKey::code("Space"), Binding::Button(Button::Select)),
        (HostKey::code("Enter"), Binding::Button(Button::Start)),
        (HostKey::code("KeyA"), Binding::Button(Button::A)),
        (HostKey::code("KeyS"), Binding::Button(Button::B)),
        (HostKey::code("KeyO"), Binding::Meta(MetaAction::SaveState)),
        (HostKey::code("KeyP"), Binding::Meta(MetaAction::RestoreState)),
    ]);
    static ref KEYCODE_KEYS: KeyMap<HostKey> = KeyMap::from([
        (HostKey::KeyCode(DOM_VK_DOWN), Binding::Button(Button::Down)),
        (HostKey::KeyCode(DOM_VK_UP), Binding::Button(Button::Up)),
        (HostKey::KeyCode(DOM_VK_RIGHT), Binding::Button(Button::Right)),
        (HostKey::KeyCode(DOM_VK_LEFT), Binding::Button(Button::Left)),
        (HostKey::KeyCode(DOM_VK_SPACE), Binding::Button(Button::Select)),
        (HostKey::KeyCode(DOM_VK_RETURN), Binding::Button(Button::Start)),
        (HostKey::KeyCode(DOM_VK_A), Binding::Button(Button::A)),
        (HostKey::KeyCode(DOM_VK_S), Binding::Button(Button::B)),
        (HostKey::KeyCode(DOM_VK_O), Binding::Meta(MetaAction::SaveState)),
        (HostKey::KeyCode(DOM_VK_P), Binding::Meta(MetaAction::RestoreState)),
    ]);
}

/// Which of the two browser key tables is active. Only one is ever used
/// for a given driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyScheme {
    #[default]
    Code,
    KeyCode,
}

impl KeyScheme {
    pub fn key_map(self) -> KeyMap<HostKey> {
        match self {
            KeyScheme::Code => CODE_KEYS.clone(),
            KeyScheme::KeyCode => KEYCODE_KEYS.clone(),
        }
    }
}

impl FromStr for KeyScheme {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(KeyScheme::Code),
            "keycode" => Ok(KeyScheme::KeyCode),
            _ => Err(DriverError::UnknownScheme(s.to_owned())),
        }
    }
}

/// Maps host keys to pad buttons and meta actions.
#[derive(Clone, Debug)]
pub struct KeyMap<K> {
    map: HashMap<K, Binding>,
}

impl<K: Eq + Hash> KeyMap<K> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, key: &K) -> Option<Binding> {
        self.map.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn bindings(&self) -> impl Iterator<Item = (&K, Binding)> {
        self.map.iter().map(|(key, binding)| (key, *binding))
    }
}

impl<K: Eq + Hash> Default for KeyMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, const N: usize> From<[(K, Binding); N]> for KeyMap<K> {
    fn from(entries: [(K, Binding); N]) -> Self {
        Self {
            map: HashMap::from(entries),
        }
    }
}

/// Turns key events into engine calls. Holds nothing but its table.
pub struct InputTranslator<K> {
    keymap: KeyMap<K>,
}

impl<K: Eq + Hash> InputTranslator<K> {
    pub fn new(keymap: KeyMap<K>) -> Self {
        Self { keymap }
    }

    pub fn keymap(&self) -> &KeyMap<K> {
        &self.keymap
    }

    /// Returns `false` when the key is not bound. Auto-repeated presses are
    /// swallowed, so holding a meta key fires it once.
    pub fn key_down<E: Engine>(&self, key: &K, repeat: bool, engine: &mut E) -> bool {
        let binding = self.keymap.get(key);
        if repeat {
            return binding.is_some();
        }
        match binding {
            Some(Binding::Button(button)) => {
                engine.set_button_state(button, true);
                true
            }
            Some(Binding::Meta(MetaAction::SaveState)) => {
                log::info!("Saving state");
                engine.save_state();
                true
            }
            Some(Binding::Meta(MetaAction::RestoreState)) => {
                log::info!("Restoring state");
                engine.restore_state();
                true
            }
            None => false,
        }
    }

    /// Meta actions are one-shot, so releasing their key does nothing.
    pub fn key_up<E: Engine>(&self, key: &K, engine: &mut E) -> bool {
        match self.keymap.get(key) {
            Some(Binding::Button(button)) => {
                engine.set_button_state(button, false);
                true
            }
            Some(Binding::Meta(_)) => true,
            None => false,
        }
    }
}
